pub mod camera;

use bevy::prelude::*;
use graphvy_core::view::{palette, Primitive, Rgba};

use crate::app::resources::CanvasRes;

pub use camera::{setup_scene, view_to_world};

pub fn background() -> Color {
    color(palette::BACKGROUND)
}

fn color(c: Rgba) -> Color {
    Color::srgba(c.r, c.g, c.b, c.a)
}

/// Replays the retained scene through immediate-mode gizmos every frame.
pub fn draw_scene(st: NonSend<CanvasRes>, windows: Query<&Window>, mut gizmos: Gizmos) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    let w = |p| view_to_world(p, size);

    for primitive in st.scene.iter() {
        match primitive {
            Primitive::Circle {
                center,
                radius,
                color: c,
                ..
            } => {
                gizmos.circle_2d(w(*center), *radius as f32, color(*c));
            }
            Primitive::Segment {
                from, to, color: c, ..
            } => {
                gizmos.line_2d(w(*from), w(*to), color(*c));
            }
            Primitive::Triangle {
                points, color: c, ..
            } => {
                let [a, b, d] = points.map(w);
                gizmos.linestrip_2d([a, b, d, a], color(*c));
            }
            Primitive::Rect {
                min, max, color: c, ..
            } => {
                let (lo, hi) = (w(*min), w(*max));
                gizmos.linestrip_2d(
                    [
                        lo,
                        Vec2::new(hi.x, lo.y),
                        hi,
                        Vec2::new(lo.x, hi.y),
                        lo,
                    ],
                    color(*c),
                );
            }
        }
    }
}
