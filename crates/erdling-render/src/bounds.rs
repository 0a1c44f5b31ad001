//! Content and export bounds over the visible scene.

use crate::scene::SceneGraph;
use erdling_core::config::ExportConfig;
use erdling_core::{Bounds, Rect};

/// What an export covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundsMode {
    /// The caller supplies the currently visible world rect.
    CurrentView(Rect),
    /// Everything in the scene, regardless of viewport.
    WholeDiagram,
}

/// Tight bounds of every visible node, connector endpoints included.
/// `None` for an empty scene. Hidden relationship geometry is excluded, so
/// exports of a diagram with relationships toggled off do not reserve space
/// for them.
pub fn content_bounds(scene: &SceneGraph) -> Option<Bounds> {
    let mut points: Vec<(f64, f64)> = Vec::new();

    for e in scene.entities() {
        points.push((e.rect.x, e.rect.y));
        points.push((e.rect.x + e.rect.width, e.rect.y + e.rect.height));
    }
    for a in scene.attributes() {
        points.push((a.center.x - a.rx, a.center.y - a.ry));
        points.push((a.center.x + a.rx, a.center.y + a.ry));
    }
    for c in scene.attribute_connectors() {
        points.push((c.from.x, c.from.y));
        points.push((c.to.x, c.to.y));
    }
    if scene.relationships_visible() {
        for d in scene.diamonds() {
            points.push((d.center.x - d.size.width / 2.0, d.center.y - d.size.height / 2.0));
            points.push((d.center.x + d.size.width / 2.0, d.center.y + d.size.height / 2.0));
        }
        for c in scene.relationship_connectors() {
            points.push((c.from.x, c.from.y));
            points.push((c.to.x, c.to.y));
        }
    }
    Bounds::from_points(points)
}

/// World rect an export covers: padded content bounds grown to the
/// configured minimum so tiny diagrams do not produce degenerate images.
pub fn export_bounds(scene: &SceneGraph, mode: BoundsMode, cfg: &ExportConfig) -> Option<Bounds> {
    match mode {
        BoundsMode::CurrentView(rect) => Some(Bounds {
            min_x: rect.x,
            min_y: rect.y,
            max_x: rect.x + rect.width,
            max_y: rect.y + rect.height,
        }),
        BoundsMode::WholeDiagram => Some(
            content_bounds(scene)?
                .expanded(cfg.padding)
                .with_min_size(cfg.min_width, cfg.min_height),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use erdling_core::{DeterministicTextMeasurer, EngineConfig, Model, Point, SchemaInput};

    fn single_entity_scene() -> SceneGraph {
        let input: SchemaInput =
            serde_json::from_str(r#"{"entities":[{"name":"Solo"}]}"#).unwrap();
        let mut model = Model::from_schema(
            &input,
            &EngineConfig::default(),
            &DeterministicTextMeasurer::default(),
        )
        .unwrap();
        let id = model.entities().next().unwrap().id;
        model.set_entity_position(id, Point::new(100.0, 100.0)).unwrap();
        let mut scene = SceneGraph::new();
        scene.rebuild(&model);
        scene
    }

    #[test]
    fn empty_scene_has_no_bounds() {
        assert!(content_bounds(&SceneGraph::new()).is_none());
    }

    #[test]
    fn whole_diagram_bounds_apply_padding_and_minimums() {
        let scene = single_entity_scene();
        let cfg = ExportConfig::default();
        // Entity at (100,100) sized 120x60: content (100,100)-(220,160),
        // padded by 40 to (60,60)-(260,200), then height grown to 150.
        let b = export_bounds(&scene, BoundsMode::WholeDiagram, &cfg).unwrap();
        assert_eq!((b.min_x, b.max_x), (60.0, 260.0));
        assert_eq!(b.width(), 200.0);
        assert_eq!(b.height(), 150.0);
        assert_eq!(b.center().y, 130.0);
    }

    #[test]
    fn current_view_bounds_are_passed_through() {
        let scene = single_entity_scene();
        let view = Rect::new(-5.0, 10.0, 640.0, 480.0);
        let b = export_bounds(&scene, BoundsMode::CurrentView(view), &ExportConfig::default())
            .unwrap();
        assert_eq!(b.min_x, -5.0);
        assert_eq!(b.width(), 640.0);
        assert_eq!(b.height(), 480.0);
    }

    #[test]
    fn hidden_relationships_shrink_the_bounds() {
        let input: SchemaInput = serde_json::from_str(
            r#"{
              "entities": [{"name": "A"}, {"name": "B"}],
              "relationships": [{"from": "A", "to": "B", "type": "1:1"}]
            }"#,
        )
        .unwrap();
        let cfg = EngineConfig::default();
        let mut model =
            Model::from_schema(&input, &cfg, &DeterministicTextMeasurer::default()).unwrap();
        erdling_layout::auto_layout(&mut model, &cfg).unwrap();
        let mut scene = SceneGraph::new();
        scene.rebuild(&model);

        let with = content_bounds(&scene).unwrap();
        scene.set_relationships_visible(false);
        let without = content_bounds(&scene).unwrap();
        assert!(without.width() <= with.width());
        assert!(without.height() <= with.height());
    }
}
