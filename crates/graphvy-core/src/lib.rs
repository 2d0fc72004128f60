//! Synchronized graph/view engine for an interactive graph editor.
//!
//! The graph, its per-element visuals, and the interaction state are kept
//! consistent under structural mutation, force-directed re-layout, and a
//! rate-limited redraw loop. Windowing, input delivery and drawing belong to
//! the host; see [`view::RenderSurface`] and [`interact::PointerEvent`].

pub mod canvas;
pub mod config;
pub mod error;
pub mod graph;
pub mod handle;
pub mod interact;
pub mod persist;
pub mod rules;
pub mod sched;
pub mod view;

pub use canvas::{GraphCanvas, Scene};
pub use config::EngineConfig;
pub use error::{InvariantViolation, StructuralError};
pub use graph::{Delta, GraphStore, Scalar};
pub use handle::{EdgeHandle, VertexHandle};
pub use interact::Tool;
