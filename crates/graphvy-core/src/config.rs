use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::sched::layout::LayoutParams;

/// Sizes of the drawn elements in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub node_radius: f64,
    pub node_width: f64,
    pub edge_width: f64,
    pub head_size: f64,
    pub source_radius: f64,
    pub source_width: f64,
    pub select_width: f64,
    /// Half side of the square a pointer must fall in to hit a vertex.
    pub bounds: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            node_radius: 3.0,
            node_width: 3.0,
            edge_width: 2.0,
            head_size: 5.0,
            source_radius: 7.0,
            source_width: 7.0,
            select_width: 1.2,
            bounds: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout_interval_ms: u64,
    pub layout: LayoutParams,
    /// Zero ticks the rule once per frame.
    pub dynamics_interval_ms: u64,
    pub dynamics_niter: usize,
    pub redraw_interval_ms: u64,
    pub resize_delay_ms: u64,
    pub multigraph: bool,
    pub self_loops: bool,
    pub directed: bool,
    pub initial_offset: [f64; 2],
    pub initial_scale: f64,
    pub style: Style,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout_interval_ms: 16,
            layout: LayoutParams::default(),
            dynamics_interval_ms: 0,
            dynamics_niter: 1,
            redraw_interval_ms: 16,
            resize_delay_ms: 50,
            multigraph: false,
            self_loops: true,
            directed: true,
            initial_offset: [0.25, 0.25],
            initial_scale: 0.5,
            style: Style::default(),
        }
    }
}

impl EngineConfig {
    pub fn layout_interval(&self) -> Duration {
        Duration::from_millis(self.layout_interval_ms)
    }

    pub fn dynamics_interval(&self) -> Duration {
        Duration::from_millis(self.dynamics_interval_ms)
    }

    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.redraw_interval_ms)
    }

    pub fn resize_delay(&self) -> Duration {
        Duration::from_millis(self.resize_delay_ms)
    }
}
