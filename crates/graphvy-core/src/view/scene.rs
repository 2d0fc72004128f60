use std::collections::BTreeMap;

use crate::view::primitive::{GroupId, Layer, Primitive, RenderSurface};

/// In-memory [`RenderSurface`] that keeps the last primitives of every group.
///
/// Hosts with immediate-mode drawing replay it every frame.
#[derive(Debug, Default, Clone)]
pub struct SceneBuffer {
    groups: BTreeMap<GroupId, (Layer, Vec<Primitive>)>,
    upserts: u64,
}

impl SceneBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, id: GroupId) -> Option<&[Primitive]> {
        self.groups.get(&id).map(|(_, p)| p.as_slice())
    }

    /// Groups on `layer`.
    pub fn layer_len(&self, layer: Layer) -> usize {
        self.groups.values().filter(|(l, _)| *l == layer).count()
    }

    /// Number of `upsert` calls received so far.
    pub fn upserts(&self) -> u64 {
        self.upserts
    }

    /// Every primitive, back layer first.
    pub fn iter(&self) -> impl Iterator<Item = &Primitive> + '_ {
        [Layer::Edges, Layer::Vertices, Layer::Overlay]
            .into_iter()
            .flat_map(move |layer| {
                self.groups
                    .values()
                    .filter(move |(l, _)| *l == layer)
                    .flat_map(|(_, p)| p.iter())
            })
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}

impl RenderSurface for SceneBuffer {
    fn upsert(&mut self, group: GroupId, layer: Layer, primitives: &[Primitive]) {
        self.upserts += 1;
        self.groups.insert(group, (layer, primitives.to_vec()));
    }

    fn remove(&mut self, group: GroupId) {
        self.groups.remove(&group);
    }
}
