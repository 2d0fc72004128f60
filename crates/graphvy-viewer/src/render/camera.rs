use bevy::math::DVec2;
use bevy::prelude::*;

use crate::app::resources::CanvasRes;

pub fn setup_scene(
    mut commands: Commands,
    mut config_store: ResMut<GizmoConfigStore>,
    st: NonSend<CanvasRes>,
) {
    commands.spawn(Camera2dBundle::default());

    let (gizmos, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    gizmos.line_width = st.canvas.config().style.edge_width as f32;
}

/// Canvas coordinates are window pixels with y down; the 2d camera puts the
/// origin at the window center with y up.
pub fn view_to_world(p: DVec2, window: Vec2) -> Vec2 {
    Vec2::new(p.x as f32 - window.x * 0.5, window.y * 0.5 - p.y as f32)
}
