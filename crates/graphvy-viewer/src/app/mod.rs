use bevy::math::DVec2;
use bevy::prelude::*;
use rand::thread_rng;

use crate::app::resources::{CanvasRes, PanelState, ViewerSettings};
use crate::util::config::ViewerConfig;
use crate::util::demo;
use graphvy_core::GraphCanvas;

pub mod resources;

pub struct GraphvyViewerPlugin {
    pub config: ViewerConfig,
}

impl Plugin for GraphvyViewerPlugin {
    fn build(&self, app: &mut App) {
        let cfg = self.config.clone();
        let canvas = startup_canvas(&cfg);
        app.insert_non_send_resource(CanvasRes::new(canvas))
            .insert_resource(PanelState::from_config(&cfg))
            .insert_resource(ViewerSettings(cfg))
            .add_systems(Startup, crate::render::setup_scene)
            .add_systems(
                Update,
                (
                    crate::ui::ui_panel,
                    crate::input::forward_keys,
                    crate::input::forward_pointer,
                    crate::input::forward_touch,
                    crate::input::forward_wheel,
                    tick_canvas,
                    crate::render::draw_scene,
                )
                    .chain(),
            );
    }
}

fn startup_canvas(cfg: &ViewerConfig) -> GraphCanvas {
    let mut canvas = GraphCanvas::new(cfg.engine.clone());
    let loaded = match &cfg.graph_path {
        Some(path) => match canvas.load_path(path) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %path.display(), "falling back to demo graph: {err:#}");
                false
            }
        },
        None => false,
    };
    if !loaded {
        let graph = demo::random_graph(cfg.demo_vertices, cfg.demo_edges, &mut thread_rng());
        if let Err(err) = canvas.load_graph(graph) {
            error!("demo graph rejected: {err}");
        }
    }
    if let Some(rule) = &cfg.startup_rule {
        if let Err(err) = canvas.load_rule_by_name(rule) {
            warn!(rule = %rule, "startup rule not loaded: {err:#}");
        }
    }
    canvas
}

/// Follow the window size, advance the engine by the frame time, and stop
/// the app on the first consistency failure.
fn tick_canvas(
    time: Res<Time>,
    windows: Query<&Window>,
    mut st: NonSendMut<CanvasRes>,
    mut exit: EventWriter<AppExit>,
) {
    if let Ok(window) = windows.get_single() {
        let size = DVec2::new(window.width() as f64, window.height() as f64);
        if size.x >= 1.0 && size.y >= 1.0 && size != st.canvas.transform().viewport() {
            st.canvas.resize(size);
        }
    }

    if st.fatal.is_none() {
        let CanvasRes {
            canvas,
            scene,
            fatal,
            ..
        } = &mut *st;
        if let Err(err) = canvas.tick(time.delta(), scene) {
            *fatal = Some(err);
        }
    }

    if let Some(err) = st.fatal.take() {
        error!("graph and visuals diverged: {err}");
        exit.send(AppExit::error());
    }
}
