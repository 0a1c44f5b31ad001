//! Viewport state: the world-to-screen transform plus zoom, pan, fit and
//! focus operations. Screen coordinates are pixels with the origin at the
//! view's top-left; `screen = world * scale + offset`.

use erdling_core::config::ViewportConfig;
use erdling_core::{Bounds, Point, Rect, Size};

/// An immutable world-to-screen transform, used as animation endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f64,
    pub offset: Point,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    scale: f64,
    offset: Point,
    view_size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Point::default(),
            view_size: Size::new(800.0, 600.0),
        }
    }
}

impl Viewport {
    pub fn new(view_size: Size) -> Self {
        Self {
            view_size,
            ..Default::default()
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    pub fn set_view_size(&mut self, size: Size) {
        self.view_size = size;
    }

    pub fn transform(&self) -> ViewportTransform {
        ViewportTransform {
            scale: self.scale,
            offset: self.offset,
        }
    }

    pub fn apply(&mut self, t: ViewportTransform) {
        self.scale = t.scale;
        self.offset = t.offset;
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.offset.x, p.y * self.scale + self.offset.y)
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }

    /// World rect currently visible on screen.
    pub fn world_rect(&self) -> Rect {
        let tl = self.screen_to_world(Point::default());
        Rect::new(
            tl.x,
            tl.y,
            self.view_size.width / self.scale,
            self.view_size.height / self.scale,
        )
    }

    /// Pans by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset = self.offset.translated(dx, dy);
    }

    /// Multiplies the scale, clamped to the configured range, keeping the
    /// given screen point fixed so zooming happens around the cursor.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64, cfg: &ViewportConfig) {
        let new_scale = (self.scale * factor).clamp(cfg.min_scale, cfg.max_scale);
        let ratio = new_scale / self.scale;
        self.offset = Point::new(
            anchor.x - (anchor.x - self.offset.x) * ratio,
            anchor.y - (anchor.y - self.offset.y) * ratio,
        );
        self.scale = new_scale;
    }

    /// Transform that centers the bounds and fills `fit_margin` of the view.
    pub fn fit_transform(&self, bounds: Bounds, cfg: &ViewportConfig) -> ViewportTransform {
        let (bw, bh) = (bounds.width().max(1.0), bounds.height().max(1.0));
        let scale = ((self.view_size.width / bw).min(self.view_size.height / bh)
            * cfg.fit_margin)
            .clamp(cfg.min_scale, cfg.max_scale);
        centered_on(bounds.center(), scale, self.view_size)
    }

    pub fn fit_to(&mut self, bounds: Bounds, cfg: &ViewportConfig) {
        self.apply(self.fit_transform(bounds, cfg));
    }

    /// Transform that centers a world point at the focus zoom level.
    pub fn focus_transform(&self, center: Point, cfg: &ViewportConfig) -> ViewportTransform {
        let scale = cfg.focus_zoom.clamp(cfg.min_scale, cfg.max_scale);
        centered_on(center, scale, self.view_size)
    }
}

fn centered_on(world_center: Point, scale: f64, view_size: Size) -> ViewportTransform {
    ViewportTransform {
        scale,
        offset: Point::new(
            view_size.width / 2.0 - world_center.x * scale,
            view_size.height / 2.0 - world_center.y * scale,
        ),
    }
}

/// A linear interpolation between two viewport transforms. The caller drives
/// it with elapsed wall time; the engine has no clock of its own.
#[derive(Debug, Clone)]
pub struct ViewportAnimation {
    from: ViewportTransform,
    to: ViewportTransform,
    duration_ms: u64,
    elapsed_ms: u64,
}

impl ViewportAnimation {
    pub fn new(from: ViewportTransform, to: ViewportTransform, duration_ms: u64) -> Self {
        Self {
            from,
            to,
            duration_ms,
            elapsed_ms: 0,
        }
    }

    pub fn target(&self) -> ViewportTransform {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    /// Advances by `dt_ms` and returns the transform to show now.
    pub fn advance(&mut self, dt_ms: u64) -> ViewportTransform {
        self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.duration_ms);
        let t = if self.duration_ms == 0 {
            1.0
        } else {
            self.elapsed_ms as f64 / self.duration_ms as f64
        };
        ViewportTransform {
            scale: lerp(self.from.scale, self.to.scale, t),
            offset: Point::new(
                lerp(self.from.offset.x, self.to.offset.x, t),
                lerp(self.from.offset.y, self.to.offset.y, t),
            ),
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
