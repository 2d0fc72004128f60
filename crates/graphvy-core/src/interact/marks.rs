use std::collections::HashSet;

use crate::graph::GraphStore;
use crate::handle::VertexHandle;
use crate::view::{VertexState, VisualRegistry};

/// Selection, pin, highlight and source membership.
///
/// Membership changes never touch visuals directly: each mutation compares the
/// resolved [`VertexState`] before and after and hands the difference to
/// [`apply_state_change`].
#[derive(Debug, Clone, Default)]
pub struct Marks {
    selected: HashSet<VertexHandle>,
    pinned: HashSet<VertexHandle>,
    highlighted: Option<VertexHandle>,
    source: Option<VertexHandle>,
}

/// Recolor `v` and freeze it in the layout while it is in a non-default state.
pub fn apply_state_change(
    v: VertexHandle,
    old: VertexState,
    new: VertexState,
    graph: &mut GraphStore,
    registry: &mut VisualRegistry,
) {
    if old == new {
        return;
    }
    registry.set_state(v, new);
    graph.set_pinned(v, new.is_frozen());
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, v: VertexHandle) -> VertexState {
        if self.source == Some(v) {
            VertexState::Source
        } else if self.highlighted == Some(v) {
            VertexState::Highlighted
        } else if self.selected.contains(&v) {
            VertexState::Selected
        } else if self.pinned.contains(&v) {
            VertexState::Pinned
        } else {
            VertexState::Default
        }
    }

    pub fn selected(&self) -> &HashSet<VertexHandle> {
        &self.selected
    }

    pub fn pinned(&self) -> &HashSet<VertexHandle> {
        &self.pinned
    }

    pub fn highlighted(&self) -> Option<VertexHandle> {
        self.highlighted
    }

    pub fn source(&self) -> Option<VertexHandle> {
        self.source
    }

    pub fn is_selected(&self, v: VertexHandle) -> bool {
        self.selected.contains(&v)
    }

    pub fn is_pinned(&self, v: VertexHandle) -> bool {
        self.pinned.contains(&v)
    }

    fn transition(
        &mut self,
        affected: &[VertexHandle],
        graph: &mut GraphStore,
        registry: &mut VisualRegistry,
        change: impl FnOnce(&mut Self),
    ) {
        let before: Vec<_> = affected.iter().map(|v| self.state_of(*v)).collect();
        change(self);
        for (v, old) in affected.iter().zip(before) {
            apply_state_change(*v, old, self.state_of(*v), graph, registry);
        }
    }

    pub fn set_highlighted(
        &mut self,
        v: Option<VertexHandle>,
        graph: &mut GraphStore,
        registry: &mut VisualRegistry,
    ) {
        if v == self.highlighted {
            return;
        }
        let affected: Vec<_> = self.highlighted.into_iter().chain(v).collect();
        self.transition(&affected, graph, registry, |m| m.highlighted = v);
    }

    pub fn set_source(
        &mut self,
        v: Option<VertexHandle>,
        graph: &mut GraphStore,
        registry: &mut VisualRegistry,
    ) {
        if v == self.source {
            return;
        }
        let affected: Vec<_> = self.source.into_iter().chain(v).collect();
        self.transition(&affected, graph, registry, |m| m.source = v);
    }

    /// Flip selection of `v`; pinned vertices are left alone.
    pub fn toggle_selected(
        &mut self,
        v: VertexHandle,
        graph: &mut GraphStore,
        registry: &mut VisualRegistry,
    ) -> bool {
        if self.pinned.contains(&v) || !graph.contains_vertex(v) {
            return false;
        }
        self.transition(&[v], graph, registry, |m| {
            if !m.selected.remove(&v) {
                m.selected.insert(v);
            }
        });
        true
    }

    /// Flip pin of `v`, leaving the selection first when pinning.
    pub fn toggle_pinned(
        &mut self,
        v: VertexHandle,
        graph: &mut GraphStore,
        registry: &mut VisualRegistry,
    ) -> bool {
        if !graph.contains_vertex(v) {
            return false;
        }
        self.transition(&[v], graph, registry, |m| {
            if !m.pinned.remove(&v) {
                m.selected.remove(&v);
                m.pinned.insert(v);
            }
        });
        true
    }

    /// Replace the selection with `target` minus pinned vertices.
    pub fn set_selection(
        &mut self,
        target: &HashSet<VertexHandle>,
        graph: &mut GraphStore,
        registry: &mut VisualRegistry,
    ) {
        let target: HashSet<_> = target
            .iter()
            .copied()
            .filter(|v| !self.pinned.contains(v) && graph.contains_vertex(*v))
            .collect();
        let affected: Vec<_> = self.selected.symmetric_difference(&target).copied().collect();
        self.transition(&affected, graph, registry, |m| m.selected = target);
    }

    /// Drop a removed vertex from every set. The vertex has no visual left.
    pub fn forget(&mut self, v: VertexHandle) {
        self.selected.remove(&v);
        self.pinned.remove(&v);
        if self.highlighted == Some(v) {
            self.highlighted = None;
        }
        if self.source == Some(v) {
            self.source = None;
        }
    }

    /// Return every marked vertex to the default state.
    pub fn clear(&mut self, graph: &mut GraphStore, registry: &mut VisualRegistry) {
        let affected: Vec<_> = self
            .selected
            .iter()
            .chain(self.pinned.iter())
            .copied()
            .chain(self.highlighted)
            .chain(self.source)
            .collect();
        self.transition(&affected, graph, registry, |m| *m = Marks::default());
    }
}
