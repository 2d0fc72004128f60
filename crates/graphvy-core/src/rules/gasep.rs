//! Graph exclusion processes: edges act as particles hopping along out-edges,
//! a hop is excluded when the edge it would create already exists.

use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::GraphStore;
use crate::handle::VertexHandle;
use crate::sched::dynamics::{DynamicsRule, DynamicsStep};

#[derive(Debug, Clone, Copy)]
enum Move {
    Head,
    Tail,
    Flip,
}

/// Pick a random edge, then move its source (head move) or its target (tail
/// move) one step along an out-edge, weighted by out-degree.
#[derive(Debug, Clone)]
pub struct EdgeCentricGasep {
    pub niter: usize,
    pub seed: Option<u64>,
}

/// [`EdgeCentricGasep`] plus a unit-weight move flipping the edge.
#[derive(Debug, Clone)]
pub struct EdgeFlipGasep {
    pub niter: usize,
    pub seed: Option<u64>,
}

impl EdgeCentricGasep {
    pub fn new(niter: usize) -> Self {
        Self { niter, seed: None }
    }
}

impl EdgeFlipGasep {
    pub fn new(niter: usize) -> Self {
        Self { niter, seed: None }
    }
}

fn bind_gasep(
    graph: &GraphStore,
    niter: usize,
    seed: Option<u64>,
    flip: bool,
) -> anyhow::Result<Box<dyn DynamicsStep>> {
    if graph.num_edges() == 0 {
        bail!("exclusion process needs at least one edge");
    }
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(Box::new(GasepStep {
        rng,
        niter: niter.max(1),
        flip,
    }))
}

impl DynamicsRule for EdgeCentricGasep {
    fn name(&self) -> &str {
        "edge_centric_gasep"
    }

    fn bind(&self, graph: &GraphStore) -> anyhow::Result<Box<dyn DynamicsStep>> {
        bind_gasep(graph, self.niter, self.seed, false)
    }
}

impl DynamicsRule for EdgeFlipGasep {
    fn name(&self) -> &str {
        "edge_flip_gasep"
    }

    fn bind(&self, graph: &GraphStore) -> anyhow::Result<Box<dyn DynamicsStep>> {
        bind_gasep(graph, self.niter, self.seed, true)
    }
}

struct GasepStep {
    rng: StdRng,
    niter: usize,
    flip: bool,
}

impl GasepStep {
    fn random_out_neighbor(&mut self, graph: &GraphStore, v: VertexHandle) -> Option<VertexHandle> {
        let out = graph.out_neighbors(v);
        if out.is_empty() {
            return None;
        }
        out.get(self.rng.gen_range(0..out.len())).copied()
    }

    fn choose_move(&mut self, source_out: usize, target_out: usize) -> Option<Move> {
        let flip = usize::from(self.flip);
        let total = source_out + target_out + flip;
        if total == 0 {
            return None;
        }
        let r = self.rng.gen_range(0..total);
        Some(if r < source_out {
            Move::Head
        } else if r < source_out + target_out {
            Move::Tail
        } else {
            Move::Flip
        })
    }

    fn hop(&mut self, graph: &mut GraphStore) -> anyhow::Result<()> {
        let n = graph.num_edges();
        if n == 0 {
            bail!("graph has no edges left");
        }
        let edge = graph
            .edge_at(self.rng.gen_range(0..n))
            .context("edge index out of range")?;
        let data = graph.edge_data(edge).cloned().context("edge vanished")?;
        let (source, target) = (data.source, data.target);
        graph.remove_edge(edge);

        let source_out = graph.out_degree(source);
        let target_out = graph.out_degree(target);

        let candidate = match self.choose_move(source_out, target_out) {
            None => None,
            Some(Move::Head) => self
                .random_out_neighbor(graph, source)
                .map(|s| (s, target)),
            Some(Move::Tail) => self
                .random_out_neighbor(graph, target)
                .map(|t| (source, t)),
            Some(Move::Flip) => Some((target, source)),
        };

        let (s, t) = match candidate {
            Some((s, t)) if graph.edge(s, t).is_none() => (s, t),
            _ => (source, target),
        };
        // Self-loops may be rejected; fall back to the original edge.
        let added = match graph.add_edge(s, t) {
            Some(e) => e,
            None => graph
                .add_edge(source, target)
                .context("could not restore excluded edge")?,
        };
        graph.set_directed(added, data.directed);
        for (name, value) in data.props.iter() {
            graph.set_edge_property(added, name, *value);
        }
        Ok(())
    }
}

impl DynamicsStep for GasepStep {
    fn step(&mut self, graph: &mut GraphStore) -> anyhow::Result<()> {
        for _ in 0..self.niter {
            self.hop(graph)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ring(n: usize) -> GraphStore {
        let mut g = GraphStore::new(false);
        let vs: Vec<_> = (0..n).map(|_| g.add_vertex()).collect();
        for i in 0..n {
            g.add_edge(vs[i], vs[(i + 1) % n]);
            g.add_edge(vs[i], vs[(i + 3) % n]);
        }
        g
    }

    fn assert_simple(g: &GraphStore) {
        let pairs: HashSet<_> = g.edges().filter_map(|e| g.endpoints(e)).collect();
        assert_eq!(pairs.len(), g.num_edges());
    }

    #[test]
    fn conserves_vertices_and_edges() {
        for flip in [false, true] {
            let mut g = ring(12);
            let (nv, ne) = (g.num_vertices(), g.num_edges());
            let mut step: Box<dyn DynamicsStep> = if flip {
                EdgeFlipGasep {
                    niter: 5,
                    seed: Some(11),
                }
                .bind(&g)
                .expect("bind")
            } else {
                EdgeCentricGasep {
                    niter: 5,
                    seed: Some(11),
                }
                .bind(&g)
                .expect("bind")
            };

            for _ in 0..200 {
                step.step(&mut g).expect("step");
            }

            assert_eq!(g.num_vertices(), nv);
            assert_eq!(g.num_edges(), ne);
            assert_simple(&g);
        }
    }

    #[test]
    fn refuses_graph_without_edges() {
        let mut g = GraphStore::new(false);
        g.add_vertex();
        assert!(EdgeCentricGasep::new(1).bind(&g).is_err());
    }

    #[test]
    fn same_seed_same_trajectory() {
        let run = || {
            let mut g = ring(8);
            let mut step = EdgeFlipGasep {
                niter: 3,
                seed: Some(42),
            }
            .bind(&g)
            .expect("bind");
            for _ in 0..50 {
                step.step(&mut g).expect("step");
            }
            let mut pairs: Vec<_> = g
                .edges()
                .filter_map(|e| g.endpoints(e))
                .map(|(s, t)| (s.0, t.0))
                .collect();
            pairs.sort_unstable();
            pairs
        };
        assert_eq!(run(), run());
    }
}
