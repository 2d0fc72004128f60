use glam::DVec2;
use smallvec::SmallVec;

use crate::error::StructuralError;
use crate::graph::props::{Properties, Scalar};
use crate::handle::{EdgeHandle, HandleTable, Relocation, VertexHandle};

pub type EdgeList = SmallVec<[EdgeHandle; 4]>;

#[derive(Debug, Clone)]
pub struct VertexData {
    pub pos: DVec2,
    pub pinned: bool,
    pub props: Properties,
    out_edges: EdgeList,
    in_edges: EdgeList,
}

impl VertexData {
    fn at(pos: DVec2) -> Self {
        Self {
            pos,
            pinned: false,
            props: Properties::new(),
            out_edges: EdgeList::new(),
            in_edges: EdgeList::new(),
        }
    }

    pub fn out_edges(&self) -> &[EdgeHandle] {
        &self.out_edges
    }

    pub fn in_edges(&self) -> &[EdgeHandle] {
        &self.in_edges
    }
}

#[derive(Debug, Clone)]
pub struct EdgeData {
    pub source: VertexHandle,
    pub target: VertexHandle,
    pub directed: bool,
    pub props: Properties,
}

/// One structural change, recorded with the storage indices valid at the
/// moment it happened. Replaying the journal in order reproduces every
/// intermediate index assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    VertexAdded {
        handle: VertexHandle,
        index: usize,
    },
    VertexRemoved {
        handle: VertexHandle,
        index: usize,
        relocated: Option<Relocation<VertexHandle>>,
    },
    EdgeAdded {
        handle: EdgeHandle,
        index: usize,
        source: VertexHandle,
        target: VertexHandle,
        source_index: usize,
        target_index: usize,
    },
    EdgeRemoved {
        handle: EdgeHandle,
        index: usize,
        relocated: Option<Relocation<EdgeHandle>>,
    },
}

/// Mutable directed graph with dense storage behind stable handles.
///
/// Every structural mutation updates the handle tables before it returns and
/// appends a [`Delta`] to the journal; the view drains the journal.
#[derive(Debug, Clone)]
pub struct GraphStore {
    vertex_ids: HandleTable<VertexHandle>,
    edge_ids: HandleTable<EdgeHandle>,
    vertices: Vec<VertexData>,
    edges: Vec<EdgeData>,
    multigraph: bool,
    self_loops: bool,
    directed: bool,
    journal: Vec<Delta>,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(false)
    }
}

impl GraphStore {
    pub fn new(multigraph: bool) -> Self {
        Self {
            vertex_ids: HandleTable::new(),
            edge_ids: HandleTable::new(),
            vertices: Vec::new(),
            edges: Vec::new(),
            multigraph,
            self_loops: true,
            directed: true,
            journal: Vec::new(),
        }
    }

    pub fn multigraph(&self) -> bool {
        self.multigraph
    }

    pub fn set_multigraph(&mut self, multigraph: bool) {
        self.multigraph = multigraph;
    }

    pub fn allows_self_loops(&self) -> bool {
        self.self_loops
    }

    pub fn set_allow_self_loops(&mut self, allow: bool) {
        self.self_loops = allow;
    }

    /// Directed flag given to edges created from now on.
    pub fn set_default_directed(&mut self, directed: bool) {
        self.directed = directed;
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    // ----- structure -----

    /// Add a vertex at the centre of the unit square.
    pub fn add_vertex(&mut self) -> VertexHandle {
        self.add_vertex_at(DVec2::splat(0.5))
    }

    pub fn add_vertex_at(&mut self, pos: DVec2) -> VertexHandle {
        let (handle, index) = self.vertex_ids.issue();
        self.vertices.push(VertexData::at(pos));
        self.journal.push(Delta::VertexAdded { handle, index });
        handle
    }

    /// Remove a vertex together with all incident edges. Returns `false` for
    /// an unknown handle.
    pub fn remove_vertex(&mut self, handle: VertexHandle) -> bool {
        match self.try_remove_vertex(handle) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, "remove_vertex rejected");
                false
            }
        }
    }

    pub fn try_remove_vertex(&mut self, handle: VertexHandle) -> Result<(), StructuralError> {
        let incident = self
            .incident_edges(handle)
            .ok_or(StructuralError::UnknownVertex(handle))?;
        for edge in incident {
            self.try_remove_edge(edge)?;
        }
        let (index, relocated) = self
            .vertex_ids
            .remove(handle)
            .ok_or(StructuralError::UnknownVertex(handle))?;
        self.vertices.swap_remove(index);
        self.journal.push(Delta::VertexRemoved {
            handle,
            index,
            relocated,
        });
        Ok(())
    }

    /// Add `source -> target`. Without the multigraph flag an existing edge
    /// between the same pair is returned instead of a new one.
    pub fn add_edge(&mut self, source: VertexHandle, target: VertexHandle) -> Option<EdgeHandle> {
        match self.try_add_edge(source, target) {
            Ok(edge) => Some(edge),
            Err(err) => {
                tracing::debug!(%err, "add_edge rejected");
                None
            }
        }
    }

    pub fn try_add_edge(
        &mut self,
        source: VertexHandle,
        target: VertexHandle,
    ) -> Result<EdgeHandle, StructuralError> {
        let source_index = self
            .vertex_ids
            .resolve(source)
            .ok_or(StructuralError::UnknownVertex(source))?;
        let target_index = self
            .vertex_ids
            .resolve(target)
            .ok_or(StructuralError::UnknownVertex(target))?;
        if source == target && !self.self_loops {
            return Err(StructuralError::SelfLoop(source));
        }
        if !self.multigraph {
            if let Some(existing) = self.edge(source, target) {
                return Ok(existing);
            }
        }

        let (handle, index) = self.edge_ids.issue();
        self.edges.push(EdgeData {
            source,
            target,
            directed: self.directed,
            props: Properties::new(),
        });
        if let Some(v) = self.vertices.get_mut(source_index) {
            v.out_edges.push(handle);
        }
        if let Some(v) = self.vertices.get_mut(target_index) {
            v.in_edges.push(handle);
        }
        self.journal.push(Delta::EdgeAdded {
            handle,
            index,
            source,
            target,
            source_index,
            target_index,
        });
        Ok(handle)
    }

    pub fn remove_edge(&mut self, handle: EdgeHandle) -> bool {
        match self.try_remove_edge(handle) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, "remove_edge rejected");
                false
            }
        }
    }

    pub fn try_remove_edge(&mut self, handle: EdgeHandle) -> Result<(), StructuralError> {
        let (index, relocated) = self
            .edge_ids
            .remove(handle)
            .ok_or(StructuralError::UnknownEdge(handle))?;
        let data = self.edges.swap_remove(index);
        if let Some(v) = self.vertex_mut(data.source) {
            v.out_edges.retain(|e| *e != handle);
        }
        if let Some(v) = self.vertex_mut(data.target) {
            v.in_edges.retain(|e| *e != handle);
        }
        self.journal.push(Delta::EdgeRemoved {
            handle,
            index,
            relocated,
        });
        Ok(())
    }

    /// First edge `source -> target`, if any.
    pub fn edge(&self, source: VertexHandle, target: VertexHandle) -> Option<EdgeHandle> {
        self.vertex(source)?
            .out_edges
            .iter()
            .copied()
            .find(|e| self.endpoints(*e).map(|(_, t)| t) == Some(target))
    }

    // ----- lookup -----

    pub fn contains_vertex(&self, handle: VertexHandle) -> bool {
        self.vertex_ids.contains(handle)
    }

    pub fn contains_edge(&self, handle: EdgeHandle) -> bool {
        self.edge_ids.contains(handle)
    }

    pub fn vertex_index(&self, handle: VertexHandle) -> Option<usize> {
        self.vertex_ids.resolve(handle)
    }

    pub fn edge_index(&self, handle: EdgeHandle) -> Option<usize> {
        self.edge_ids.resolve(handle)
    }

    pub fn vertex_at(&self, index: usize) -> Option<VertexHandle> {
        self.vertex_ids.handle_at(index)
    }

    pub fn edge_at(&self, index: usize) -> Option<EdgeHandle> {
        self.edge_ids.handle_at(index)
    }

    pub fn vertex(&self, handle: VertexHandle) -> Option<&VertexData> {
        self.vertices.get(self.vertex_ids.resolve(handle)?)
    }

    fn vertex_mut(&mut self, handle: VertexHandle) -> Option<&mut VertexData> {
        let index = self.vertex_ids.resolve(handle)?;
        self.vertices.get_mut(index)
    }

    pub fn edge_data(&self, handle: EdgeHandle) -> Option<&EdgeData> {
        self.edges.get(self.edge_ids.resolve(handle)?)
    }

    /// Vertex handles in index order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexHandle> + '_ {
        self.vertex_ids.iter()
    }

    /// Edge handles in index order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeHandle> + '_ {
        self.edge_ids.iter()
    }

    pub fn endpoints(&self, handle: EdgeHandle) -> Option<(VertexHandle, VertexHandle)> {
        self.edge_data(handle).map(|e| (e.source, e.target))
    }

    pub fn out_edges(&self, handle: VertexHandle) -> &[EdgeHandle] {
        self.vertex(handle).map(VertexData::out_edges).unwrap_or(&[])
    }

    pub fn in_edges(&self, handle: VertexHandle) -> &[EdgeHandle] {
        self.vertex(handle).map(VertexData::in_edges).unwrap_or(&[])
    }

    pub fn out_degree(&self, handle: VertexHandle) -> usize {
        self.out_edges(handle).len()
    }

    pub fn out_neighbors(&self, handle: VertexHandle) -> Vec<VertexHandle> {
        self.out_edges(handle)
            .iter()
            .filter_map(|e| self.endpoints(*e).map(|(_, t)| t))
            .collect()
    }

    /// Every edge touching `handle` in either direction, self-loops once.
    pub fn incident_edges(&self, handle: VertexHandle) -> Option<EdgeList> {
        let v = self.vertex(handle)?;
        let mut all: EdgeList = v.out_edges.iter().copied().collect();
        for e in v.in_edges.iter() {
            if !all.contains(e) {
                all.push(*e);
            }
        }
        Some(all)
    }

    // ----- properties -----

    pub fn position(&self, handle: VertexHandle) -> Option<DVec2> {
        self.vertex(handle).map(|v| v.pos)
    }

    pub fn set_position(&mut self, handle: VertexHandle, pos: DVec2) -> bool {
        match self.vertex_mut(handle) {
            Some(v) => {
                v.pos = pos;
                true
            }
            None => false,
        }
    }

    pub fn is_pinned(&self, handle: VertexHandle) -> bool {
        self.vertex(handle).map(|v| v.pinned).unwrap_or(false)
    }

    pub fn set_pinned(&mut self, handle: VertexHandle, pinned: bool) -> bool {
        match self.vertex_mut(handle) {
            Some(v) => {
                v.pinned = pinned;
                true
            }
            None => false,
        }
    }

    pub fn vertex_property(&self, handle: VertexHandle, name: &str) -> Option<Scalar> {
        self.vertex(handle)?.props.get(name).copied()
    }

    pub fn set_vertex_property(&mut self, handle: VertexHandle, name: &str, value: Scalar) -> bool {
        match self.vertex_mut(handle) {
            Some(v) => {
                v.props.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn edge_property(&self, handle: EdgeHandle, name: &str) -> Option<Scalar> {
        self.edge_data(handle)?.props.get(name).copied()
    }

    pub fn set_edge_property(&mut self, handle: EdgeHandle, name: &str, value: Scalar) -> bool {
        let Some(index) = self.edge_ids.resolve(handle) else {
            return false;
        };
        match self.edges.get_mut(index) {
            Some(e) => {
                e.props.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn is_directed(&self, handle: EdgeHandle) -> bool {
        self.edge_data(handle).map(|e| e.directed).unwrap_or(false)
    }

    pub fn set_directed(&mut self, handle: EdgeHandle, directed: bool) -> bool {
        let Some(index) = self.edge_ids.resolve(handle) else {
            return false;
        };
        match self.edges.get_mut(index) {
            Some(e) => {
                e.directed = directed;
                true
            }
            None => false,
        }
    }

    // ----- batch views for layout -----

    /// Positions in index order.
    pub fn positions(&self) -> Vec<DVec2> {
        self.vertices.iter().map(|v| v.pos).collect()
    }

    pub fn pinned_mask(&self) -> Vec<bool> {
        self.vertices.iter().map(|v| v.pinned).collect()
    }

    /// `(source_index, target_index)` per edge, in edge index order.
    pub fn edge_index_pairs(&self) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .filter_map(|e| {
                Some((
                    self.vertex_ids.resolve(e.source)?,
                    self.vertex_ids.resolve(e.target)?,
                ))
            })
            .collect()
    }

    /// Overwrite positions in index order; extra entries are ignored.
    pub fn write_positions(&mut self, positions: &[DVec2]) {
        for (v, p) in self.vertices.iter_mut().zip(positions) {
            v.pos = *p;
        }
    }

    // ----- journal -----

    pub fn has_pending_deltas(&self) -> bool {
        !self.journal.is_empty()
    }

    pub fn drain_journal(&mut self) -> Vec<Delta> {
        std::mem::take(&mut self.journal)
    }

    /// Journal entries that would recreate the current graph from empty.
    pub(crate) fn rebuild_journal(&mut self) {
        self.journal.clear();
        for (index, handle) in self.vertex_ids.iter().enumerate() {
            self.journal.push(Delta::VertexAdded { handle, index });
        }
        for (index, handle) in self.edge_ids.iter().enumerate() {
            let Some(e) = self.edges.get(index) else {
                continue;
            };
            let (Some(source_index), Some(target_index)) = (
                self.vertex_ids.resolve(e.source),
                self.vertex_ids.resolve(e.target),
            ) else {
                continue;
            };
            self.journal.push(Delta::EdgeAdded {
                handle,
                index,
                source: e.source,
                target: e.target,
                source_index,
                target_index,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> (GraphStore, Vec<VertexHandle>) {
        let mut g = GraphStore::new(false);
        let vs: Vec<_> = (0..n)
            .map(|i| g.add_vertex_at(DVec2::new(i as f64 / n as f64, 0.5)))
            .collect();
        for w in vs.windows(2) {
            g.add_edge(w[0], w[1]);
        }
        (g, vs)
    }

    #[test]
    fn remove_vertex_takes_incident_edges_in_both_directions() {
        let (mut g, vs) = path_graph(3);
        g.add_edge(vs[2], vs[1]);
        g.add_edge(vs[1], vs[1]);
        assert_eq!(g.num_edges(), 4);

        assert!(g.remove_vertex(vs[1]));

        assert_eq!(g.num_vertices(), 2);
        assert_eq!(g.num_edges(), 0);
        assert!(g.out_edges(vs[0]).is_empty());
        assert!(g.in_edges(vs[2]).is_empty());
    }

    #[test]
    fn handles_survive_unrelated_removals() {
        let (mut g, vs) = path_graph(5);
        for (i, v) in vs.iter().enumerate() {
            g.set_vertex_property(*v, "tag", Scalar::Int(i as i64));
        }

        g.remove_vertex(vs[0]);
        g.remove_vertex(vs[2]);

        for (i, v) in vs.iter().enumerate() {
            if i == 0 || i == 2 {
                assert!(!g.contains_vertex(*v));
            } else {
                assert_eq!(g.vertex_property(*v, "tag"), Some(Scalar::Int(i as i64)));
            }
        }
    }

    #[test]
    fn swap_with_last_reports_single_relocation() {
        let (mut g, vs) = path_graph(5);
        g.drain_journal();

        g.remove_vertex(vs[1]);
        let journal = g.drain_journal();

        let relocations: Vec<_> = journal
            .iter()
            .filter_map(|d| match d {
                Delta::VertexRemoved { relocated, .. } => *relocated,
                _ => None,
            })
            .collect();
        assert_eq!(
            relocations,
            vec![Relocation {
                handle: vs[4],
                from: 4,
                to: 1
            }]
        );
        assert_eq!(g.vertex_index(vs[4]), Some(1));
        assert_eq!(g.edge_index_pairs().len(), g.num_edges());
    }

    #[test]
    fn duplicate_edge_is_noop_without_multigraph() {
        let (mut g, vs) = path_graph(2);
        let first = g.edge(vs[0], vs[1]);
        let again = g.add_edge(vs[0], vs[1]);

        assert_eq!(first, again);
        assert_eq!(g.num_edges(), 1);

        g.set_multigraph(true);
        let parallel = g.add_edge(vs[0], vs[1]);
        assert_ne!(parallel, first);
        assert_eq!(g.num_edges(), 2);
    }

    #[test]
    fn rejected_edits_leave_graph_untouched() {
        let (mut g, vs) = path_graph(2);
        g.remove_vertex(vs[1]);
        g.drain_journal();

        assert!(!g.remove_vertex(vs[1]));
        assert!(g.add_edge(vs[0], vs[1]).is_none());
        assert!(g.allows_self_loops());
        g.set_allow_self_loops(false);
        assert!(!g.allows_self_loops());
        assert_eq!(
            g.try_add_edge(vs[0], vs[0]),
            Err(StructuralError::SelfLoop(vs[0]))
        );
        assert!(!g.has_pending_deltas());
        assert_eq!(g.num_edges(), 0);
    }
}
