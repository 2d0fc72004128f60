use glam::DVec2;

use crate::view::colormap::Rgba;

/// Stable key of one drawable group on the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

/// Draw order, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Edges,
    Vertices,
    Overlay,
}

/// View-space draw primitive. Widths are line widths in pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Circle {
        center: DVec2,
        radius: f64,
        width: f64,
        color: Rgba,
    },
    Segment {
        from: DVec2,
        to: DVec2,
        width: f64,
        color: Rgba,
    },
    /// Closed outline through three points.
    Triangle {
        points: [DVec2; 3],
        width: f64,
        color: Rgba,
    },
    /// Axis-aligned rectangle outline.
    Rect {
        min: DVec2,
        max: DVec2,
        width: f64,
        color: Rgba,
    },
}

/// Retained-mode drawing target. `upsert` replaces every primitive of the
/// group, so recoloring one element never touches the rest of the scene.
pub trait RenderSurface {
    fn upsert(&mut self, group: GroupId, layer: Layer, primitives: &[Primitive]);
    fn remove(&mut self, group: GroupId);
}

/// Arrow head for the segment `from -> to`. Its tip sits a little short of
/// `to` so the head stays visible next to the target vertex.
pub fn arrow_head(from: DVec2, to: DVec2, size: f64) -> [DVec2; 3] {
    let dir = to - from;
    let rot = if dir.length_squared() > 0.0 {
        dir.normalize()
    } else {
        DVec2::X
    };
    let base = [
        DVec2::new(-3.0, 0.0),
        DVec2::new(-6.0, 1.0),
        DVec2::new(-6.0, -1.0),
    ];
    base.map(|p| rot.rotate(p * size) + to)
}
