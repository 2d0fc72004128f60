use std::path::PathBuf;

use bevy::math::DVec2;
use bevy::prelude::Resource;
use graphvy_core::view::SceneBuffer;
use graphvy_core::{GraphCanvas, InvariantViolation};

use crate::util::config::ViewerConfig;

/// The engine plus the primitives it last drew. Held as a non-send resource:
/// loaded dynamics rules are plain trait objects.
pub struct CanvasRes {
    pub canvas: GraphCanvas,
    pub scene: SceneBuffer,
    /// Last cursor position inside the window, in view pixels.
    pub last_cursor: Option<DVec2>,
    pub fatal: Option<InvariantViolation>,
}

impl CanvasRes {
    pub fn new(canvas: GraphCanvas) -> Self {
        Self {
            canvas,
            scene: SceneBuffer::new(),
            last_cursor: None,
            fatal: None,
        }
    }

    /// Keep the first violation; the frame system shuts the app down on it.
    pub fn check(&mut self, result: Result<(), InvariantViolation>) {
        if let Err(err) = result {
            self.fatal.get_or_insert(err);
        }
    }
}

/// Editable side-panel fields that are not engine state.
#[derive(Resource)]
pub struct PanelState {
    pub rule: String,
    pub property: String,
    pub states: usize,
    pub continuous_end: f64,
    pub continuous: bool,
    pub graph_path: String,
    pub status: Option<String>,
}

impl PanelState {
    pub fn from_config(cfg: &ViewerConfig) -> Self {
        Self {
            rule: cfg
                .startup_rule
                .clone()
                .unwrap_or_else(|| "edge_centric_gasep".to_string()),
            property: String::new(),
            states: 2,
            continuous_end: 1.0,
            continuous: false,
            graph_path: cfg
                .graph_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "graph.json".to_string()),
            status: None,
        }
    }

    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.graph_path.trim())
    }
}

#[derive(Resource)]
pub struct ViewerSettings(pub ViewerConfig);
