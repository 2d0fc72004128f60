pub mod panel;

pub use panel::ui_panel;
