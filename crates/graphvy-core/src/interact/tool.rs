use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Grab,
    Select,
    Pin,
    ShowPath,
    AddNode,
    DeleteNode,
    AddEdge,
    DeleteEdge,
}

impl Tool {
    pub const ALL: [Tool; 8] = [
        Tool::Grab,
        Tool::Select,
        Tool::Pin,
        Tool::ShowPath,
        Tool::AddNode,
        Tool::DeleteNode,
        Tool::AddEdge,
        Tool::DeleteEdge,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Grab => "Grab",
            Tool::Select => "Select",
            Tool::Pin => "Pin",
            Tool::ShowPath => "Show Path",
            Tool::AddNode => "Add Node",
            Tool::DeleteNode => "Delete Node",
            Tool::AddEdge => "Add Edge",
            Tool::DeleteEdge => "Delete Edge",
        }
    }

    /// Tools whose click picks a Source first and acts on the second click.
    pub fn is_two_click(self) -> bool {
        matches!(self, Tool::ShowPath | Tool::AddEdge | Tool::DeleteEdge)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
