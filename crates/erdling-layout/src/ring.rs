//! Radial attribute placement (the second layout phase). Each entity's
//! attributes sit on an ellipse concentric with the entity box; the ring
//! grows when the labels would not fit its circumference, clamped near
//! close-by neighbors so one crowded entity cannot invade another's space.

use erdling_core::config::LayoutSpacing;
use erdling_core::{Attribute, EngineConfig, Model, Point, Result, Size};
use std::f64::consts::PI;

/// Ring radii before any growth: entity half-extents plus the base offset.
pub fn ring_radii(entity_size: Size, spacing: &LayoutSpacing) -> (f64, f64) {
    (
        entity_size.width / 2.0 + spacing.ring_offset,
        entity_size.height / 2.0 + spacing.ring_offset,
    )
}

/// Circumference the labels of one entity's ring require, each with padding.
pub fn label_perimeter<'a>(
    attrs: impl IntoIterator<Item = &'a Attribute>,
    padding: f64,
) -> f64 {
    attrs.into_iter().map(|a| 2.0 * a.rx + padding).sum()
}

/// Full extent an entity occupies including its attribute ring, used by the
/// first phase to space entities. The radii carry the same perimeter growth
/// `place_rings` applies, uncapped: the proximity clamp can only shrink the
/// real ring, so this is an upper bound and placed rings stay inside it.
pub fn inflated_extent(
    entity_size: Size,
    max_attr_rx: f64,
    attr_ry: f64,
    needed_perimeter: f64,
    spacing: &LayoutSpacing,
) -> Size {
    let (rx, ry) = ring_radii(entity_size, spacing);
    let growth = (needed_perimeter / ellipse_circumference(rx, ry)).max(1.0);
    Size::new(
        2.0 * (rx * growth + max_attr_rx),
        2.0 * (ry * growth + attr_ry),
    )
}

/// Ramanujan's approximation, plenty accurate for sizing decisions.
fn ellipse_circumference(rx: f64, ry: f64) -> f64 {
    PI * (3.0 * (rx + ry) - ((3.0 * rx + ry) * (rx + 3.0 * ry)).sqrt())
}

/// Evenly distributed ring angles. Small counts get hand-picked starts so the
/// common shapes look right: a lone attribute sits on top, a pair flanks the
/// entity left and right.
fn ring_angles(count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![-PI / 2.0],
        2 => vec![PI, 0.0],
        n => {
            let start = if n == 3 { PI / 2.0 } else { -PI / 2.0 };
            let step = 2.0 * PI / n as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Places every attribute on its owner's ring. Entity positions must already
/// be final; this runs after entity placement and again is *not* re-run on
/// drags (attributes travel with their entity instead).
pub fn place_rings(model: &mut Model, cfg: &EngineConfig) -> Result<()> {
    let spacing = &cfg.layout;
    let entity_centers: Vec<(erdling_core::EntityId, Point)> =
        model.entities().map(|e| (e.id, e.center())).collect();

    let mut placements = Vec::new();
    for entity in model.entities() {
        let attrs: Vec<_> = model.attributes_of(entity.id).collect();
        if attrs.is_empty() {
            continue;
        }

        let (mut rx, mut ry) = ring_radii(entity.size, spacing);

        // Grow the ring until the labels fit its circumference.
        let needed = label_perimeter(attrs.iter().copied(), cfg.attribute.padding);
        let mut growth = (needed / ellipse_circumference(rx, ry)).max(1.0);

        // A close neighbor caps the growth; overlap between long labels is
        // accepted rather than letting the ring reach into the neighbor.
        let center = entity.center();
        let crowded = entity_centers
            .iter()
            .filter(|(id, _)| *id != entity.id)
            .any(|(_, c)| center.distance_to(*c) < spacing.ring_proximity);
        if crowded {
            growth = growth.min(spacing.ring_growth_max);
        }
        rx *= growth;
        ry *= growth;

        for (attr, angle) in attrs.iter().zip(ring_angles(attrs.len())) {
            placements.push((
                attr.id,
                Point::new(center.x + rx * angle.cos(), center.y + ry * angle.sin()),
            ));
        }
    }

    for (id, pos) in placements {
        model.set_attribute_position(id, pos)?;
    }
    Ok(())
}
