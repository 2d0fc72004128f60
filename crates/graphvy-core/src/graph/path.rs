use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::store::GraphStore;
use crate::handle::{EdgeHandle, VertexHandle};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphPath {
    pub vertices: Vec<VertexHandle>,
    pub edges: Vec<EdgeHandle>,
}

/// Breadth-first shortest directed path `a -> b`, following out-edges only.
pub fn shortest_path(graph: &GraphStore, a: VertexHandle, b: VertexHandle) -> Option<GraphPath> {
    if !graph.contains_vertex(a) || !graph.contains_vertex(b) {
        return None;
    }
    if a == b {
        return Some(GraphPath {
            vertices: vec![a],
            edges: Vec::new(),
        });
    }

    let mut visited: HashSet<VertexHandle> = HashSet::new();
    let mut prev: HashMap<VertexHandle, (VertexHandle, EdgeHandle)> = HashMap::new();
    let mut q: VecDeque<VertexHandle> = VecDeque::new();
    visited.insert(a);
    q.push_back(a);

    while let Some(cur) = q.pop_front() {
        for edge in graph.out_edges(cur) {
            let Some((_, next)) = graph.endpoints(*edge) else {
                continue;
            };
            if !visited.insert(next) {
                continue;
            }
            prev.insert(next, (cur, *edge));
            if next == b {
                return Some(reconstruct_path(&prev, a, b));
            }
            q.push_back(next);
        }
    }

    None
}

fn reconstruct_path(
    prev: &HashMap<VertexHandle, (VertexHandle, EdgeHandle)>,
    start: VertexHandle,
    end: VertexHandle,
) -> GraphPath {
    let mut path = GraphPath::default();
    let mut cur = end;
    path.vertices.push(cur);
    while cur != start {
        let Some((p, edge)) = prev.get(&cur) else {
            break;
        };
        path.edges.push(*edge);
        path.vertices.push(*p);
        cur = *p;
    }
    path.vertices.reverse();
    path.edges.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_edge_direction() {
        let mut g = GraphStore::new(false);
        let a = g.add_vertex();
        let b = g.add_vertex();
        let c = g.add_vertex();
        let ab = g.add_edge(a, b).expect("edge");
        let bc = g.add_edge(b, c).expect("edge");

        let path = shortest_path(&g, a, c).expect("reachable");
        assert_eq!(path.vertices, vec![a, b, c]);
        assert_eq!(path.edges, vec![ab, bc]);

        assert!(shortest_path(&g, c, a).is_none());
    }

    #[test]
    fn prefers_fewest_hops() {
        let mut g = GraphStore::new(false);
        let vs: Vec<_> = (0..4).map(|_| g.add_vertex()).collect();
        g.add_edge(vs[0], vs[1]);
        g.add_edge(vs[1], vs[2]);
        g.add_edge(vs[2], vs[3]);
        let shortcut = g.add_edge(vs[0], vs[3]).expect("edge");

        let path = shortest_path(&g, vs[0], vs[3]).expect("reachable");
        assert_eq!(path.edges, vec![shortcut]);
    }
}
