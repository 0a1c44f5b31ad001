//! Connector routing math. Everything here is pure geometry on core types so
//! the renderer can recompute connectors after any drag without touching the
//! layout pipeline.

use erdling_core::{Point, Rect, Size};

const ALIGN_EPS: f64 = 1.0;

/// Point where the segment from the rect center toward `toward` crosses the
/// rect border. Falls back to the center when `toward` coincides with it.
pub fn clip_to_rect(rect: Rect, toward: Point) -> Point {
    let c = rect.center();
    let dx = toward.x - c.x;
    let dy = toward.y - c.y;
    if dx == 0.0 && dy == 0.0 {
        return c;
    }
    let w = rect.width / 2.0;
    let h = rect.height / 2.0;
    let (sx, sy) = if dy.abs() * w > dx.abs() * h {
        // Exits through the top or bottom border.
        let sy = if dy < 0.0 { -h } else { h };
        (sy * dx / dy, sy)
    } else {
        let sx = if dx < 0.0 { -w } else { w };
        (sx, sx * dy / dx)
    };
    Point::new(c.x + sx, c.y + sy)
}

/// Point where the segment from the ellipse center toward `toward` crosses
/// the ellipse outline.
pub fn clip_to_ellipse(center: Point, rx: f64, ry: f64, toward: Point) -> Point {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    if (dx == 0.0 && dy == 0.0) || rx <= 0.0 || ry <= 0.0 {
        return center;
    }
    let t = 1.0 / ((dx / rx).powi(2) + (dy / ry).powi(2)).sqrt();
    Point::new(center.x + dx * t, center.y + dy * t)
}

/// Diamond corner points in top, right, bottom, left order.
pub fn diamond_points(center: Point, size: Size) -> [Point; 4] {
    let w = size.width / 2.0;
    let h = size.height / 2.0;
    [
        Point::new(center.x, center.y - h),
        Point::new(center.x + w, center.y),
        Point::new(center.x, center.y + h),
        Point::new(center.x - w, center.y),
    ]
}

/// Diamond corner a connector should attach to: the corner on the dominant
/// axis of the direction toward the other endpoint. Opposite directions get
/// opposite corners, so the two connectors of a relationship never share an
/// attachment point.
pub fn diamond_anchor(center: Point, size: Size, toward: Point) -> Point {
    let [top, right, bottom, left] = diamond_points(center, size);
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 { right } else { left }
    } else if dy >= 0.0 {
        bottom
    } else {
        top
    }
}

/// Diamond center for a relationship: the midpoint of the two entity
/// centers, nudged off-axis when the entities are aligned (or identical, for
/// self-referential relationships) so the diamond does not sit exactly on the
/// connector line.
pub fn diamond_center(a: Point, b: Point, nudge: f64) -> Point {
    let mid = a.midpoint(b);
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    if dx < ALIGN_EPS && dy < ALIGN_EPS {
        Point::new(mid.x + nudge * 2.0, mid.y - nudge)
    } else if dx < ALIGN_EPS {
        Point::new(mid.x + nudge, mid.y)
    } else if dy < ALIGN_EPS {
        Point::new(mid.x, mid.y + nudge)
    } else {
        mid
    }
}

/// Connector between an entity border and its attribute's ellipse outline.
pub fn entity_attribute_connector(
    entity: Rect,
    attr_center: Point,
    rx: f64,
    ry: f64,
) -> (Point, Point) {
    let start = clip_to_rect(entity, attr_center);
    let end = clip_to_ellipse(attr_center, rx, ry, entity.center());
    (start, end)
}

/// Connector between an entity border and a relationship diamond corner,
/// with the midpoint where the cardinality symbol is drawn.
pub fn entity_diamond_connector(
    entity: Rect,
    diamond_center: Point,
    diamond_size: Size,
) -> (Point, Point, Point) {
    let start = clip_to_rect(entity, diamond_center);
    let end = diamond_anchor(diamond_center, diamond_size, entity.center());
    (start, end, start.midpoint(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_clip_lands_on_the_facing_border() {
        let rect = Rect::new(0.0, 0.0, 100.0, 60.0);
        let right = clip_to_rect(rect, Point::new(500.0, 30.0));
        assert_eq!(right, Point::new(100.0, 30.0));

        let below = clip_to_rect(rect, Point::new(50.0, 400.0));
        assert_eq!(below, Point::new(50.0, 60.0));
    }

    #[test]
    fn rect_clip_degenerate_direction_returns_center() {
        let rect = Rect::new(0.0, 0.0, 100.0, 60.0);
        assert_eq!(clip_to_rect(rect, rect.center()), rect.center());
    }

    #[test]
    fn ellipse_clip_lies_on_the_outline() {
        let c = Point::new(10.0, 20.0);
        let p = clip_to_ellipse(c, 40.0, 22.0, Point::new(300.0, 170.0));
        let on = ((p.x - c.x) / 40.0).powi(2) + ((p.y - c.y) / 22.0).powi(2);
        assert!((on - 1.0).abs() < 1e-9);
    }

    #[test]
    fn opposite_endpoints_get_opposite_diamond_corners() {
        let center = Point::new(0.0, 0.0);
        let size = Size::new(100.0, 64.0);
        let a = diamond_anchor(center, size, Point::new(0.0, -200.0));
        let b = diamond_anchor(center, size, Point::new(0.0, 200.0));
        assert_eq!(a, Point::new(0.0, -32.0));
        assert_eq!(b, Point::new(0.0, 32.0));
    }

    #[test]
    fn aligned_entities_nudge_the_diamond_off_axis() {
        // Vertically stacked entities push the diamond sideways.
        let c = diamond_center(Point::new(50.0, 0.0), Point::new(50.0, 300.0), 40.0);
        assert_eq!(c, Point::new(90.0, 150.0));

        let plain = diamond_center(Point::new(0.0, 0.0), Point::new(200.0, 300.0), 40.0);
        assert_eq!(plain, Point::new(100.0, 150.0));
    }

    #[test]
    fn self_relationship_diamond_leaves_the_entity_center() {
        let p = Point::new(10.0, 10.0);
        let c = diamond_center(p, p, 40.0);
        assert!(c.distance_to(p) > 0.0);
    }
}
