use bevy::math::DVec2;
use graphvy_core::GraphStore;
use rand::Rng;

/// Random simple graph with vertices scattered over the unit square.
/// Fewer than `edges` edges come out when the vertex count cannot hold them.
pub fn random_graph(vertices: usize, edges: usize, rng: &mut impl Rng) -> GraphStore {
    let mut g = GraphStore::new(false);
    let vs: Vec<_> = (0..vertices)
        .map(|_| g.add_vertex_at(DVec2::new(rng.gen(), rng.gen())))
        .collect();
    if vs.len() < 2 {
        return g;
    }
    let mut attempts = edges.saturating_mul(10);
    while g.num_edges() < edges && attempts > 0 {
        attempts -= 1;
        let s = vs[rng.gen_range(0..vs.len())];
        let t = vs[rng.gen_range(0..vs.len())];
        if s != t {
            g.add_edge(s, t);
        }
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn demo_graph_has_requested_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = random_graph(50, 80, &mut rng);
        assert_eq!(g.num_vertices(), 50);
        assert_eq!(g.num_edges(), 80);
        for e in g.edges() {
            let (s, t) = g.endpoints(e).expect("endpoints");
            assert_ne!(s, t);
        }
        for v in g.vertices() {
            let p = g.position(v).expect("pos");
            assert!((0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y));
        }
    }

    #[test]
    fn tiny_graphs_do_not_spin() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(random_graph(1, 10, &mut rng).num_edges(), 0);
        // Two vertices hold at most two directed edges.
        assert!(random_graph(2, 10, &mut rng).num_edges() <= 2);
    }
}
