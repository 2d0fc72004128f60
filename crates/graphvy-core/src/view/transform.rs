use glam::DVec2;

/// Graph space (unit square) <-> view space (pixels).
///
/// `view = (graph * scale + offset) * viewport`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    pub offset: DVec2,
    pub scale: f64,
    viewport: DVec2,
}

pub const MIN_SCALE: f64 = 1e-3;
pub const MAX_SCALE: f64 = 1e3;

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::new(DVec2::splat(0.25), 0.5, DVec2::new(800.0, 600.0))
    }
}

impl CoordinateTransform {
    pub fn new(offset: DVec2, scale: f64, viewport: DVec2) -> Self {
        Self {
            offset,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
            viewport: viewport.max(DVec2::ONE),
        }
    }

    pub fn viewport(&self) -> DVec2 {
        self.viewport
    }

    /// Viewport sizes below one pixel are clamped so the inverse stays finite.
    pub fn resize(&mut self, viewport: DVec2) {
        self.viewport = viewport.max(DVec2::ONE);
    }

    pub fn reset(&mut self, offset: DVec2, scale: f64) {
        self.offset = offset;
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn to_view(&self, p: DVec2) -> DVec2 {
        (p * self.scale + self.offset) * self.viewport
    }

    pub fn to_graph(&self, v: DVec2) -> DVec2 {
        (v / self.viewport - self.offset) / self.scale
    }

    /// Inverse for displacements; ignores `offset`.
    pub fn delta_to_graph(&self, dv: DVec2) -> DVec2 {
        dv / self.viewport / self.scale
    }

    pub fn to_view_all(&self, points: &[DVec2]) -> Vec<DVec2> {
        let s = self.scale * self.viewport;
        let o = self.offset * self.viewport;
        points.iter().map(|p| *p * s + o).collect()
    }

    /// Pan by a pointer displacement in pixels.
    pub fn pan(&mut self, view_delta: DVec2) {
        self.offset += view_delta / self.viewport;
    }

    /// Multiply `scale` by `factor` keeping the view position of `anchor` fixed.
    pub fn zoom_about(&mut self, anchor: DVec2, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let fixed = self.to_graph(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        // Solve to_view(fixed) == anchor for offset.
        self.offset = anchor / self.viewport - fixed * self.scale;
    }

    /// Two-pointer pinch: `anchor` stays put, scale follows the ratio of the
    /// `current` to `previous` distance from the anchor.
    pub fn pinch(&mut self, anchor: DVec2, current: DVec2, previous: DVec2) {
        let before = anchor.distance(previous);
        let after = anchor.distance(current);
        if before <= f64::EPSILON {
            return;
        }
        self.zoom_about(anchor, after / before);
    }
}
