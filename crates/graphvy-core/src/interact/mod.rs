pub mod input;
pub mod machine;
pub mod marks;
pub mod tool;

pub use input::{Key, KeyEvent, Modifiers, PointerButton, PointerEvent, PointerKind};
pub use machine::{Effect, InteractionStateMachine};
pub use marks::{apply_state_change, Marks};
pub use tool::Tool;
