use anyhow::Context;
use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::graph::{GraphStore, Properties};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub props: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Position of the endpoint in `vertices`.
    pub source: usize,
    pub target: usize,
    #[serde(default = "default_directed")]
    pub directed: bool,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub props: Properties,
}

fn default_directed() -> bool {
    true
}

/// On-disk graph. Handles are not persisted; edges refer to vertex order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub multigraph: bool,
    #[serde(default)]
    pub vertices: Vec<VertexRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphDocument {
    pub fn from_graph(graph: &GraphStore) -> Self {
        let vertices = graph
            .vertices()
            .filter_map(|v| graph.vertex(v))
            .map(|v| VertexRecord {
                pos: Some([v.pos.x, v.pos.y]),
                props: v.props.clone(),
            })
            .collect();
        let edges = graph
            .edges()
            .filter_map(|e| {
                let data = graph.edge_data(e)?;
                Some(EdgeRecord {
                    source: graph.vertex_index(data.source)?,
                    target: graph.vertex_index(data.target)?,
                    directed: data.directed,
                    props: data.props.clone(),
                })
            })
            .collect();
        Self {
            multigraph: graph.multigraph(),
            vertices,
            edges,
        }
    }

    /// Build a graph; vertices without a stored position get a random one in
    /// the unit square. Edges with out-of-range endpoints are an error.
    pub fn into_graph(self, rng: &mut impl Rng) -> anyhow::Result<GraphStore> {
        let mut graph = GraphStore::new(self.multigraph);
        let mut handles = Vec::with_capacity(self.vertices.len());
        for record in self.vertices {
            let pos = match record.pos {
                Some([x, y]) if x.is_finite() && y.is_finite() => DVec2::new(x, y),
                _ => DVec2::new(rng.gen(), rng.gen()),
            };
            let v = graph.add_vertex_at(pos);
            for (name, value) in record.props {
                graph.set_vertex_property(v, &name, value);
            }
            handles.push(v);
        }
        for (i, record) in self.edges.into_iter().enumerate() {
            let source = *handles
                .get(record.source)
                .with_context(|| format!("edge {i}: no vertex {}", record.source))?;
            let target = *handles
                .get(record.target)
                .with_context(|| format!("edge {i}: no vertex {}", record.target))?;
            let e = graph
                .try_add_edge(source, target)
                .with_context(|| format!("edge {i}"))?;
            graph.set_directed(e, record.directed);
            for (name, value) in record.props {
                graph.set_edge_property(e, &name, value);
            }
        }
        Ok(graph)
    }
}

pub fn save_graph(graph: &GraphStore, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create graph dir {}", parent.display()))?;
        }
    }
    let doc = GraphDocument::from_graph(graph);
    let s = serde_json::to_string_pretty(&doc).context("serialize graph")?;
    fs::write(path, s).with_context(|| format!("write graph {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        vertices = doc.vertices.len(),
        edges = doc.edges.len(),
        "graph saved"
    );
    Ok(())
}

pub fn load_document(path: &Path) -> anyhow::Result<GraphDocument> {
    let s = fs::read_to_string(path).with_context(|| format!("read graph {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse graph {}", path.display()))
}
