use thiserror::Error;

use crate::handle::{EdgeHandle, VertexHandle};

/// Why a structural edit was rejected. Rejected edits leave the graph untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("unknown vertex {0}")]
    UnknownVertex(VertexHandle),
    #[error("unknown edge {0}")]
    UnknownEdge(EdgeHandle),
    #[error("self-loop on {0} is not allowed")]
    SelfLoop(VertexHandle),
}

/// The handle table and the visual registry disagree. Hit testing and
/// mutation are unsound past this point, so callers treat it as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("vertex {0} has no visual element")]
    MissingVertexVisual(VertexHandle),
    #[error("vertex {0} already has a visual element")]
    DuplicateVertexVisual(VertexHandle),
    #[error("edge {0} has no visual element")]
    MissingEdgeVisual(EdgeHandle),
    #[error("edge {0} already has a visual element")]
    DuplicateEdgeVisual(EdgeHandle),
    #[error("visual for {handle} caches index {cached}, graph has {actual:?}")]
    StaleVertexIndex {
        handle: VertexHandle,
        cached: usize,
        actual: Option<usize>,
    },
    #[error("visual for {0} caches stale endpoint indices")]
    StaleEdgeEndpoints(EdgeHandle),
    #[error("{kind}: {visuals} visual elements for {elements} graph elements")]
    CountMismatch {
        kind: &'static str,
        visuals: usize,
        elements: usize,
    },
    #[error("graph changes were not applied to the view before redraw")]
    UnsyncedJournal,
}
