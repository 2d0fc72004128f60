use std::collections::{HashMap, HashSet};

use glam::DVec2;
use smallvec::SmallVec;

use crate::config::Style;
use crate::error::InvariantViolation;
use crate::graph::{Delta, GraphStore};
use crate::handle::{EdgeHandle, VertexHandle};
use crate::view::colormap::{palette, Colormap, Rgba};
use crate::view::primitive::{arrow_head, GroupId, Layer, Primitive, RenderSurface};
use crate::view::transform::CoordinateTransform;

const MARQUEE_GROUP: GroupId = GroupId(0);
const SOURCE_RING_GROUP: GroupId = GroupId(1);
const FIRST_ELEMENT_GROUP: u64 = 2;

/// Visual state of a vertex, highest priority last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum VertexState {
    #[default]
    Default,
    Pinned,
    Selected,
    Highlighted,
    Source,
}

impl VertexState {
    /// Frozen vertices are held still by the layout.
    pub fn is_frozen(self) -> bool {
        self != VertexState::Default
    }

    fn color(self) -> Option<Rgba> {
        match self {
            VertexState::Default => None,
            VertexState::Pinned => Some(palette::PINNED),
            VertexState::Selected => Some(palette::SELECTED),
            VertexState::Highlighted | VertexState::Source => Some(palette::HIGHLIGHTED_NODE),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VertexVisual {
    pub handle: VertexHandle,
    pub group: GroupId,
    /// Storage index of the vertex as last reported by the graph.
    pub index: usize,
    pub state: VertexState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeVisual {
    pub handle: EdgeHandle,
    pub group: GroupId,
    pub index: usize,
    pub source: VertexHandle,
    pub target: VertexHandle,
    pub source_index: usize,
    pub target_index: usize,
}

/// One visual element per live graph element, kept in lockstep with the
/// graph by replaying its [`Delta`] journal.
#[derive(Debug, Clone)]
pub struct VisualRegistry {
    vertices: HashMap<VertexHandle, VertexVisual>,
    edges: HashMap<EdgeHandle, EdgeVisual>,
    incident: HashMap<VertexHandle, SmallVec<[EdgeHandle; 4]>>,
    retired: Vec<GroupId>,
    next_group: u64,
    vertex_colormap: Colormap,
    vertex_color_property: Option<String>,
    edge_colormap: Colormap,
    edge_color_property: Option<String>,
    source: Option<VertexHandle>,
    marquee: Option<(DVec2, DVec2)>,
    path_edges: HashSet<EdgeHandle>,
    style: Style,
}

impl VisualRegistry {
    pub fn new(style: Style) -> Self {
        Self {
            vertices: HashMap::new(),
            edges: HashMap::new(),
            incident: HashMap::new(),
            retired: Vec::new(),
            next_group: FIRST_ELEMENT_GROUP,
            vertex_colormap: Colormap::default_for(true),
            vertex_color_property: None,
            edge_colormap: Colormap::default_for(false),
            edge_color_property: None,
            source: None,
            marquee: None,
            path_edges: HashSet::new(),
            style,
        }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, handle: VertexHandle) -> Option<&VertexVisual> {
        self.vertices.get(&handle)
    }

    pub fn edge(&self, handle: EdgeHandle) -> Option<&EdgeVisual> {
        self.edges.get(&handle)
    }

    pub fn vertex_state(&self, handle: VertexHandle) -> VertexState {
        self.vertices
            .get(&handle)
            .map(|v| v.state)
            .unwrap_or_default()
    }

    /// Drop every element and queue their groups for removal.
    pub fn clear(&mut self) {
        self.retired.extend(self.vertices.values().map(|v| v.group));
        self.retired.extend(self.edges.values().map(|e| e.group));
        self.vertices.clear();
        self.edges.clear();
        self.incident.clear();
        self.source = None;
        self.marquee = None;
        self.path_edges.clear();
    }

    fn issue_group(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    /// Replay one journal entry. The indices carried by the entry are the ones
    /// the graph assigned at mutation time, so entries must be applied in order.
    pub fn apply(&mut self, delta: &Delta) -> Result<(), InvariantViolation> {
        match *delta {
            Delta::VertexAdded { handle, index } => {
                if self.vertices.contains_key(&handle) {
                    return Err(InvariantViolation::DuplicateVertexVisual(handle));
                }
                let group = self.issue_group();
                self.vertices.insert(
                    handle,
                    VertexVisual {
                        handle,
                        group,
                        index,
                        state: VertexState::Default,
                    },
                );
            }
            Delta::VertexRemoved {
                handle,
                index,
                relocated,
            } => {
                let visual = self
                    .vertices
                    .remove(&handle)
                    .ok_or(InvariantViolation::MissingVertexVisual(handle))?;
                if visual.index != index {
                    return Err(InvariantViolation::StaleVertexIndex {
                        handle,
                        cached: visual.index,
                        actual: Some(index),
                    });
                }
                if let Some(dangling) = self
                    .incident
                    .remove(&handle)
                    .and_then(|edges| edges.first().copied())
                {
                    return Err(InvariantViolation::StaleEdgeEndpoints(dangling));
                }
                self.retired.push(visual.group);
                if self.source == Some(handle) {
                    self.source = None;
                }

                if let Some(reloc) = relocated {
                    let moved = self
                        .vertices
                        .get_mut(&reloc.handle)
                        .ok_or(InvariantViolation::MissingVertexVisual(reloc.handle))?;
                    if moved.index != reloc.from {
                        return Err(InvariantViolation::StaleVertexIndex {
                            handle: reloc.handle,
                            cached: moved.index,
                            actual: Some(reloc.to),
                        });
                    }
                    moved.index = reloc.to;
                    self.repair_endpoints(reloc.handle, reloc.to);
                }
            }
            Delta::EdgeAdded {
                handle,
                index,
                source,
                target,
                source_index,
                target_index,
            } => {
                if self.edges.contains_key(&handle) {
                    return Err(InvariantViolation::DuplicateEdgeVisual(handle));
                }
                self.expect_vertex_at(source, source_index)?;
                self.expect_vertex_at(target, target_index)?;
                let group = self.issue_group();
                self.edges.insert(
                    handle,
                    EdgeVisual {
                        handle,
                        group,
                        index,
                        source,
                        target,
                        source_index,
                        target_index,
                    },
                );
                self.incident.entry(source).or_default().push(handle);
                if target != source {
                    self.incident.entry(target).or_default().push(handle);
                }
            }
            Delta::EdgeRemoved {
                handle,
                index,
                relocated,
            } => {
                let visual = self
                    .edges
                    .remove(&handle)
                    .ok_or(InvariantViolation::MissingEdgeVisual(handle))?;
                if visual.index != index {
                    return Err(InvariantViolation::StaleEdgeEndpoints(handle));
                }
                for v in [visual.source, visual.target] {
                    if let Some(list) = self.incident.get_mut(&v) {
                        list.retain(|e| *e != handle);
                        if list.is_empty() {
                            self.incident.remove(&v);
                        }
                    }
                }
                self.path_edges.remove(&handle);
                self.retired.push(visual.group);

                if let Some(reloc) = relocated {
                    let moved = self
                        .edges
                        .get_mut(&reloc.handle)
                        .ok_or(InvariantViolation::MissingEdgeVisual(reloc.handle))?;
                    if moved.index != reloc.from {
                        return Err(InvariantViolation::StaleEdgeEndpoints(reloc.handle));
                    }
                    moved.index = reloc.to;
                }
            }
        }
        Ok(())
    }

    fn expect_vertex_at(&self, handle: VertexHandle, index: usize) -> Result<(), InvariantViolation> {
        let visual = self
            .vertices
            .get(&handle)
            .ok_or(InvariantViolation::MissingVertexVisual(handle))?;
        if visual.index != index {
            return Err(InvariantViolation::StaleVertexIndex {
                handle,
                cached: visual.index,
                actual: Some(index),
            });
        }
        Ok(())
    }

    /// Point cached endpoint indices of edges touching `vertex` at `index`.
    fn repair_endpoints(&mut self, vertex: VertexHandle, index: usize) {
        let Some(list) = self.incident.get(&vertex) else {
            return;
        };
        for e in list.iter() {
            if let Some(edge) = self.edges.get_mut(e) {
                if edge.source == vertex {
                    edge.source_index = index;
                }
                if edge.target == vertex {
                    edge.target_index = index;
                }
            }
        }
    }

    /// Full cross-check against the graph.
    pub fn verify(&self, graph: &GraphStore) -> Result<(), InvariantViolation> {
        if graph.has_pending_deltas() {
            return Err(InvariantViolation::UnsyncedJournal);
        }
        if self.vertices.len() != graph.num_vertices() {
            return Err(InvariantViolation::CountMismatch {
                kind: "vertices",
                visuals: self.vertices.len(),
                elements: graph.num_vertices(),
            });
        }
        if self.edges.len() != graph.num_edges() {
            return Err(InvariantViolation::CountMismatch {
                kind: "edges",
                visuals: self.edges.len(),
                elements: graph.num_edges(),
            });
        }
        for (index, handle) in graph.vertices().enumerate() {
            let visual = self
                .vertices
                .get(&handle)
                .ok_or(InvariantViolation::MissingVertexVisual(handle))?;
            if visual.index != index {
                return Err(InvariantViolation::StaleVertexIndex {
                    handle,
                    cached: visual.index,
                    actual: Some(index),
                });
            }
        }
        for (index, handle) in graph.edges().enumerate() {
            let visual = self
                .edges
                .get(&handle)
                .ok_or(InvariantViolation::MissingEdgeVisual(handle))?;
            let consistent = visual.index == index
                && graph.endpoints(handle) == Some((visual.source, visual.target))
                && graph.vertex_index(visual.source) == Some(visual.source_index)
                && graph.vertex_index(visual.target) == Some(visual.target_index);
            if !consistent {
                return Err(InvariantViolation::StaleEdgeEndpoints(handle));
            }
        }
        Ok(())
    }

    // ----- transient visual state -----

    pub fn set_state(&mut self, handle: VertexHandle, state: VertexState) {
        if let Some(v) = self.vertices.get_mut(&handle) {
            v.state = state;
        }
        if state == VertexState::Source {
            self.source = Some(handle);
        } else if self.source == Some(handle) {
            self.source = None;
        }
    }

    /// View-space corners of the drag rectangle, `None` hides it.
    pub fn set_marquee(&mut self, corners: Option<(DVec2, DVec2)>) {
        self.marquee = corners;
    }

    pub fn set_path(&mut self, edges: impl IntoIterator<Item = EdgeHandle>) {
        self.path_edges = edges.into_iter().collect();
    }

    pub fn path_edges(&self) -> &HashSet<EdgeHandle> {
        &self.path_edges
    }

    pub fn set_vertex_colormap(&mut self, property: Option<String>, colormap: Colormap) {
        self.vertex_color_property = property;
        self.vertex_colormap = colormap;
    }

    pub fn set_edge_colormap(&mut self, property: Option<String>, colormap: Colormap) {
        self.edge_color_property = property;
        self.edge_colormap = colormap;
    }

    fn vertex_color(&self, graph: &GraphStore, visual: &VertexVisual) -> Rgba {
        if let Some(c) = visual.state.color() {
            return c;
        }
        let value = self
            .vertex_color_property
            .as_deref()
            .and_then(|name| graph.vertex_property(visual.handle, name));
        self.vertex_colormap.color(value)
    }

    /// Line and head color of an edge.
    fn edge_colors(&self, graph: &GraphStore, visual: &EdgeVisual) -> (Rgba, Rgba) {
        let emphasized = self.vertex_state(visual.source).is_frozen()
            || self.path_edges.contains(&visual.handle);
        if emphasized {
            return (palette::HIGHLIGHTED_EDGE, palette::HIGHLIGHTED_HEAD);
        }
        match &self.edge_color_property {
            None => (palette::EDGE, palette::HEAD),
            Some(name) => {
                let c = self
                    .edge_colormap
                    .color(graph.edge_property(visual.handle, name));
                (c, c.with_alpha(1.0))
            }
        }
    }

    /// Recompute view positions and colors and push every group to `surface`.
    pub fn refresh(
        &mut self,
        graph: &GraphStore,
        transform: &CoordinateTransform,
        surface: &mut dyn RenderSurface,
    ) -> Result<(), InvariantViolation> {
        self.verify(graph)?;

        for group in self.retired.drain(..) {
            surface.remove(group);
        }

        let coords = transform.to_view_all(&graph.positions());
        let style = self.style;

        for handle in graph.edges() {
            let visual = self
                .edges
                .get(&handle)
                .ok_or(InvariantViolation::MissingEdgeVisual(handle))?;
            let (Some(from), Some(to)) = (
                coords.get(visual.source_index).copied(),
                coords.get(visual.target_index).copied(),
            ) else {
                return Err(InvariantViolation::StaleEdgeEndpoints(handle));
            };
            let (line, head) = self.edge_colors(graph, visual);
            let mut prims = vec![Primitive::Segment {
                from,
                to,
                width: style.edge_width,
                color: line,
            }];
            if graph.is_directed(handle) {
                prims.push(Primitive::Triangle {
                    points: arrow_head(from, to, style.head_size),
                    width: style.edge_width,
                    color: head,
                });
            }
            surface.upsert(visual.group, Layer::Edges, &prims);
        }

        for handle in graph.vertices() {
            let visual = self
                .vertices
                .get(&handle)
                .ok_or(InvariantViolation::MissingVertexVisual(handle))?;
            let center = coords.get(visual.index).copied().ok_or(
                InvariantViolation::StaleVertexIndex {
                    handle,
                    cached: visual.index,
                    actual: graph.vertex_index(handle),
                },
            )?;
            surface.upsert(
                visual.group,
                Layer::Vertices,
                &[Primitive::Circle {
                    center,
                    radius: style.node_radius,
                    width: style.node_width,
                    color: self.vertex_color(graph, visual),
                }],
            );
        }

        match self
            .source
            .and_then(|s| self.vertices.get(&s))
            .and_then(|v| coords.get(v.index))
        {
            Some(center) => surface.upsert(
                SOURCE_RING_GROUP,
                Layer::Overlay,
                &[Primitive::Circle {
                    center: *center,
                    radius: style.source_radius,
                    width: style.source_width,
                    color: palette::SOURCE.with_alpha(1.0),
                }],
            ),
            None => surface.remove(SOURCE_RING_GROUP),
        }

        match self.marquee {
            Some((a, b)) => surface.upsert(
                MARQUEE_GROUP,
                Layer::Overlay,
                &[Primitive::Rect {
                    min: a.min(b),
                    max: a.max(b),
                    width: style.select_width,
                    color: palette::SELECT_RECT,
                }],
            ),
            None => surface.remove(MARQUEE_GROUP),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::scene::SceneBuffer;

    fn synced(graph: &mut GraphStore, registry: &mut VisualRegistry) {
        for d in graph.drain_journal() {
            registry.apply(&d).expect("apply");
        }
        registry.verify(graph).expect("consistent");
    }

    #[test]
    fn relocated_vertex_keeps_its_group_and_state() {
        let mut g = GraphStore::new(false);
        let mut r = VisualRegistry::new(Style::default());
        let vs: Vec<_> = (0..4).map(|_| g.add_vertex()).collect();
        let e = g.add_edge(vs[0], vs[3]).expect("edge");
        synced(&mut g, &mut r);
        r.set_state(vs[3], VertexState::Selected);
        let group = r.vertex(vs[3]).map(|v| v.group);

        g.remove_vertex(vs[1]);
        synced(&mut g, &mut r);

        let moved = r.vertex(vs[3]).expect("still present");
        assert_eq!(Some(moved.group), group);
        assert_eq!(moved.index, 1);
        assert_eq!(moved.state, VertexState::Selected);
        assert_eq!(r.edge(e).map(|v| v.target_index), Some(1));
    }

    #[test]
    fn skipped_delta_is_detected() {
        let mut g = GraphStore::new(false);
        let mut r = VisualRegistry::new(Style::default());
        g.add_vertex();
        synced(&mut g, &mut r);

        g.add_vertex();
        g.drain_journal();

        assert_eq!(
            r.verify(&g),
            Err(InvariantViolation::CountMismatch {
                kind: "vertices",
                visuals: 1,
                elements: 2
            })
        );
    }

    #[test]
    fn removal_before_edge_cleanup_is_rejected() {
        let mut g = GraphStore::new(false);
        let mut r = VisualRegistry::new(Style::default());
        let a = g.add_vertex();
        let b = g.add_vertex();
        let e = g.add_edge(a, b).expect("edge");
        synced(&mut g, &mut r);

        g.remove_vertex(b);
        let journal = g.drain_journal();
        let vertex_removed = journal
            .iter()
            .find(|d| matches!(d, Delta::VertexRemoved { .. }))
            .expect("vertex delta");

        assert_eq!(
            r.apply(vertex_removed),
            Err(InvariantViolation::StaleEdgeEndpoints(e))
        );
    }

    #[test]
    fn refresh_emits_and_retires_groups() {
        let mut g = GraphStore::new(false);
        let mut r = VisualRegistry::new(Style::default());
        let t = CoordinateTransform::default();
        let mut scene = SceneBuffer::new();
        let a = g.add_vertex_at(DVec2::new(0.0, 0.0));
        let b = g.add_vertex_at(DVec2::new(1.0, 1.0));
        let e = g.add_edge(a, b).expect("edge");
        synced(&mut g, &mut r);

        r.refresh(&g, &t, &mut scene).expect("refresh");
        assert_eq!(scene.layer_len(Layer::Vertices), 2);
        assert_eq!(scene.layer_len(Layer::Edges), 1);
        let edge_group = r.edge(e).map(|v| v.group).expect("edge visual");
        assert_eq!(scene.group(edge_group).map(<[Primitive]>::len), Some(2));

        r.set_state(a, VertexState::Source);
        r.refresh(&g, &t, &mut scene).expect("refresh");
        assert_eq!(scene.layer_len(Layer::Overlay), 1);
        match scene.group(edge_group).and_then(|p| p.first()) {
            Some(Primitive::Segment { color, .. }) => assert_eq!(*color, palette::HIGHLIGHTED_EDGE),
            other => panic!("unexpected {other:?}"),
        }

        g.remove_vertex(a);
        synced(&mut g, &mut r);
        r.refresh(&g, &t, &mut scene).expect("refresh");
        assert_eq!(scene.layer_len(Layer::Vertices), 1);
        assert_eq!(scene.layer_len(Layer::Edges), 0);
        assert_eq!(scene.layer_len(Layer::Overlay), 0);
    }
}
