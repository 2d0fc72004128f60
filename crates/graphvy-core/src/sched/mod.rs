pub mod dynamics;
pub mod layout;
pub mod redraw;
pub mod timer;

pub use dynamics::{
    DynamicsRule, DynamicsScheduler, DynamicsState, DynamicsStep, DynamicsTick, PropertyRange,
};
pub use layout::{ForceDirected, LayoutAlgorithm, LayoutParams, LayoutScheduler, RunState};
pub use redraw::RedrawLimiter;
pub use timer::IntervalTimer;
