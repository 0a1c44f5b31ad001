//! Self-contained SVG output. Every style is inlined on the element so the
//! document renders identically with no external stylesheet, which is what
//! lets the raster exporters feed it straight to an SVG rasterizer.

use crate::bounds::{BoundsMode, export_bounds};
use crate::scene::SceneGraph;
use crate::RenderError;
use erdling_core::EngineConfig;

const ENTITY_FILL: &str = "#ECECFF";
const ATTRIBUTE_FILL: &str = "#FFFFFF";
const DIAMOND_FILL: &str = "#FFF5E6";
const SHAPE_STROKE: &str = "#9370DB";
const CONNECTOR_STROKE: &str = "#888888";
const TEXT_COLOR: &str = "#333333";
const HIGHLIGHT_STROKE: &str = "#FF8C00";

#[derive(Debug, Clone)]
pub struct SvgOptions {
    pub mode: BoundsMode,
    /// `None` keeps the background transparent.
    pub background: Option<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            mode: BoundsMode::WholeDiagram,
            background: None,
        }
    }
}

pub fn render_svg(
    scene: &SceneGraph,
    cfg: &EngineConfig,
    opts: &SvgOptions,
) -> Result<String, RenderError> {
    if scene.is_empty() {
        return Err(RenderError::EmptyScene);
    }
    let bounds =
        export_bounds(scene, opts.mode, &cfg.export).ok_or(RenderError::EmptyScene)?;

    let mut out = String::with_capacity(4096);
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
        fmt_number(bounds.min_x),
        fmt_number(bounds.min_y),
        fmt_number(bounds.width()),
        fmt_number(bounds.height()),
        fmt_number(bounds.width()),
        fmt_number(bounds.height()),
    ));
    if let Some(bg) = &opts.background {
        out.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            fmt_number(bounds.min_x),
            fmt_number(bounds.min_y),
            fmt_number(bounds.width()),
            fmt_number(bounds.height()),
            escape_xml(bg),
        ));
    }

    // Paint order: connectors under shapes, shapes under their labels.
    for c in scene.attribute_connectors() {
        push_line(&mut out, c.from.x, c.from.y, c.to.x, c.to.y);
    }
    if scene.relationships_visible() {
        for c in scene.relationship_connectors() {
            push_line(&mut out, c.from.x, c.from.y, c.to.x, c.to.y);
        }
        for d in scene.diamonds() {
            let highlighted =
                scene.is_highlighted(crate::scene::SceneId::Relationship(d.id));
            let pts = erdling_layout::route::diamond_points(d.center, d.size);
            let points = pts
                .iter()
                .map(|p| format!("{},{}", fmt_number(p.x), fmt_number(p.y)))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!(
                r#"<polygon points="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
                points,
                DIAMOND_FILL,
                stroke_color(highlighted),
                stroke_width(highlighted),
            ));
            push_text(
                &mut out,
                d.center.x,
                d.center.y,
                &d.label,
                cfg.fonts.relationship_size,
                &cfg.fonts.family,
                TextDecor::None,
            );
        }
        for c in scene.relationship_connectors() {
            push_cardinality(&mut out, c.label_pos.x, c.label_pos.y, c.label, cfg);
        }
    }
    for e in scene.entities() {
        let highlighted = scene.is_highlighted(crate::scene::SceneId::Entity(e.id));
        out.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_number(e.rect.x),
            fmt_number(e.rect.y),
            fmt_number(e.rect.width),
            fmt_number(e.rect.height),
            ENTITY_FILL,
            stroke_color(highlighted),
            stroke_width(highlighted),
        ));
        let c = e.rect.center();
        push_text(
            &mut out,
            c.x,
            c.y,
            &e.label,
            cfg.fonts.entity_size,
            &cfg.fonts.family,
            TextDecor::Bold,
        );
    }
    for a in scene.attributes() {
        let highlighted = scene.is_highlighted(crate::scene::SceneId::Attribute(a.id));
        out.push_str(&format!(
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_number(a.center.x),
            fmt_number(a.center.y),
            fmt_number(a.rx),
            fmt_number(a.ry),
            ATTRIBUTE_FILL,
            stroke_color(highlighted),
            stroke_width(highlighted),
        ));
        // Key attributes carry the classic ER notation: primary keys are
        // underlined, foreign keys italic.
        let decor = if a.is_pk {
            TextDecor::Underline
        } else if a.is_fk {
            TextDecor::Italic
        } else {
            TextDecor::None
        };
        push_text(
            &mut out,
            a.center.x,
            a.center.y,
            &a.label,
            cfg.fonts.attribute_size,
            &cfg.fonts.family,
            decor,
        );
    }

    out.push_str("</svg>");
    Ok(out)
}

enum TextDecor {
    None,
    Bold,
    Underline,
    Italic,
}

fn push_line(out: &mut String, x1: f64, y1: f64, x2: f64, y2: f64) {
    out.push_str(&format!(
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="1.5"/>"#,
        fmt_number(x1),
        fmt_number(y1),
        fmt_number(x2),
        fmt_number(y2),
        CONNECTOR_STROKE,
    ));
}

fn push_text(
    out: &mut String,
    x: f64,
    y: f64,
    text: &str,
    font_size: f64,
    family: &str,
    decor: TextDecor,
) {
    let extra = match decor {
        TextDecor::None => String::new(),
        TextDecor::Bold => r#" font-weight="bold""#.to_string(),
        TextDecor::Underline => r#" text-decoration="underline""#.to_string(),
        TextDecor::Italic => r#" font-style="italic""#.to_string(),
    };
    out.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" font-family="{}" font-size="{}" fill="{}"{}>{}</text>"#,
        fmt_number(x),
        fmt_number(y),
        escape_xml(family),
        fmt_number(font_size),
        TEXT_COLOR,
        extra,
        escape_xml(text),
    ));
}

/// Cardinality glyphs sit directly on a connector line, so each one gets a
/// small solid box behind it to stay legible.
fn push_cardinality(out: &mut String, x: f64, y: f64, label: &str, cfg: &EngineConfig) {
    let box_size = cfg.fonts.label_size * 1.4;
    out.push_str(&format!(
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
        fmt_number(x - box_size / 2.0),
        fmt_number(y - box_size / 2.0),
        fmt_number(box_size),
        fmt_number(box_size),
        ATTRIBUTE_FILL,
    ));
    push_text(
        out,
        x,
        y,
        label,
        cfg.fonts.label_size,
        &cfg.fonts.family,
        TextDecor::None,
    );
}

fn stroke_color(highlighted: bool) -> &'static str {
    if highlighted { HIGHLIGHT_STROKE } else { SHAPE_STROKE }
}

fn stroke_width(highlighted: bool) -> &'static str {
    if highlighted { "3" } else { "1.5" }
}

/// Coordinates rounded to three decimals with trailing zeros trimmed, to
/// keep the output stable and small.
pub fn fmt_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let mut s = format!("{rounded:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
