use crate::config::EngineConfig;
use crate::text::{TextMeasurer, TextStyle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: Point, size: Size) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.include(x, y);
        }
        Some(b)
    }

    pub fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn include_rect(&mut self, rect: Rect) {
        self.include(rect.x, rect.y);
        self.include(rect.x + rect.width, rect.y + rect.height);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    pub fn expanded(&self, padding: f64) -> Self {
        Self {
            min_x: self.min_x - padding,
            min_y: self.min_y - padding,
            max_x: self.max_x + padding,
            max_y: self.max_y + padding,
        }
    }

    /// Grows the bounds symmetrically around their center until both
    /// dimensions meet the given minimums.
    pub fn with_min_size(&self, min_width: f64, min_height: f64) -> Self {
        let mut b = *self;
        if b.width() < min_width {
            let grow = (min_width - b.width()) / 2.0;
            b.min_x -= grow;
            b.max_x += grow;
        }
        if b.height() < min_height {
            let grow = (min_height - b.height()) / 2.0;
            b.min_y -= grow;
            b.max_y += grow;
        }
        b
    }
}

fn clamp_range(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

pub fn entity_text_style(cfg: &EngineConfig) -> TextStyle {
    TextStyle {
        font_family: Some(cfg.fonts.family.clone()),
        font_size: cfg.fonts.entity_size,
        font_weight: Some("bold".to_string()),
    }
}

pub fn attribute_text_style(cfg: &EngineConfig) -> TextStyle {
    TextStyle {
        font_family: Some(cfg.fonts.family.clone()),
        font_size: cfg.fonts.attribute_size,
        font_weight: None,
    }
}

pub fn relationship_text_style(cfg: &EngineConfig) -> TextStyle {
    TextStyle {
        font_family: Some(cfg.fonts.family.clone()),
        font_size: cfg.fonts.relationship_size,
        font_weight: None,
    }
}

/// Entity box size from its display name. Width is measured text plus
/// padding, clamped to the configured range; height is fixed. Names longer
/// than the maximum are accepted and visually truncated.
pub fn entity_size(display_name: &str, cfg: &EngineConfig, measurer: &dyn TextMeasurer) -> Size {
    let m = measurer.measure(display_name, &entity_text_style(cfg));
    Size {
        width: clamp_range(
            m.width + cfg.entity.padding,
            cfg.entity.min_width,
            cfg.entity.max_width,
        ),
        height: cfg.entity.height,
    }
}

/// Attribute ellipse radii from its display name. `rx` is clamped to the
/// configured range; `ry` is fixed.
pub fn attribute_radii(
    display_name: &str,
    cfg: &EngineConfig,
    measurer: &dyn TextMeasurer,
) -> (f64, f64) {
    let m = measurer.measure(display_name, &attribute_text_style(cfg));
    let rx = clamp_range(
        (m.width + cfg.attribute.padding) / 2.0,
        cfg.attribute.min_rx,
        cfg.attribute.max_rx,
    );
    (rx, cfg.attribute.ry)
}

/// Relationship diamond extents from its display name; same clamp policy as
/// entities, different constants.
pub fn relationship_size(
    display_name: &str,
    cfg: &EngineConfig,
    measurer: &dyn TextMeasurer,
) -> Size {
    let m = measurer.measure(display_name, &relationship_text_style(cfg));
    Size {
        width: clamp_range(
            m.width + cfg.relationship.padding,
            cfg.relationship.min_width,
            cfg.relationship.max_width,
        ),
        height: cfg.relationship.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DeterministicTextMeasurer;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn entity_size_respects_clamp_range() {
        let cfg = cfg();
        let m = DeterministicTextMeasurer::default();
        let tiny = entity_size("A", &cfg, &m);
        assert_eq!(tiny.width, cfg.entity.min_width);

        let huge = entity_size(&"x".repeat(200), &cfg, &m);
        assert_eq!(huge.width, cfg.entity.max_width);
        assert_eq!(huge.height, cfg.entity.height);
    }

    #[test]
    fn entity_width_is_monotone_within_clamp_range() {
        let cfg = cfg();
        let m = DeterministicTextMeasurer::default();
        let mut prev = 0.0;
        for len in 1..40 {
            let w = entity_size(&"x".repeat(len), &cfg, &m).width;
            assert!(w >= prev, "width must be non-decreasing in text width");
            prev = w;
        }
    }

    #[test]
    fn attribute_radii_clamp_and_fixed_ry() {
        let cfg = cfg();
        let m = DeterministicTextMeasurer::default();
        let (rx_min, ry) = attribute_radii("a", &cfg, &m);
        assert_eq!(rx_min, cfg.attribute.min_rx);
        assert_eq!(ry, cfg.attribute.ry);

        let (rx_max, _) = attribute_radii(&"a".repeat(120), &cfg, &m);
        assert_eq!(rx_max, cfg.attribute.max_rx);
    }

    #[test]
    fn bounds_min_size_grows_symmetrically() {
        let b = Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 100.0,
            max_y: 50.0,
        };
        let grown = b.with_min_size(200.0, 150.0);
        assert_eq!(grown.width(), 200.0);
        assert_eq!(grown.height(), 150.0);
        assert_eq!(grown.center(), b.center());
    }
}
