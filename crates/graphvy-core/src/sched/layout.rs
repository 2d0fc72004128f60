use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::graph::GraphStore;
use crate::sched::timer::IntervalTimer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Distance a vertex moves per iteration.
    pub init_step: f64,
    /// Preferred edge length.
    pub k: f64,
    /// Relative strength of repulsion.
    pub c: f64,
    /// Repulsion exponent.
    pub p: f64,
    pub max_iter: usize,
    pub max_step: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            init_step: 0.005,
            k: 0.5,
            c: 0.3,
            p: 2.0,
            max_iter: 2,
            max_step: 0.05,
        }
    }
}

/// One layout pass over positions in storage order. Implementations may move
/// any vertex; the scheduler restores pinned ones afterwards.
pub trait LayoutAlgorithm {
    fn step(
        &mut self,
        positions: &mut [DVec2],
        pinned: &[bool],
        edges: &[(usize, usize)],
        params: &LayoutParams,
    );
}

/// Spring-electrical step: repulsion `C K^(1+p) / d^p` between all pairs,
/// attraction `d^2 / K` along edges, every free vertex moved a fixed step
/// along its net force.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForceDirected;

const MIN_DIST: f64 = 1e-6;

impl LayoutAlgorithm for ForceDirected {
    fn step(
        &mut self,
        positions: &mut [DVec2],
        pinned: &[bool],
        edges: &[(usize, usize)],
        params: &LayoutParams,
    ) {
        let n = positions.len();
        if n == 0 {
            return;
        }
        let k = params.k.max(MIN_DIST);
        let repulse = params.c * k.powf(1.0 + params.p);
        let step = params.init_step.min(params.max_step.max(0.0));
        let mut forces = vec![DVec2::ZERO; n];

        for _ in 0..params.max_iter {
            forces.iter_mut().for_each(|f| *f = DVec2::ZERO);

            for i in 0..n {
                for j in (i + 1)..n {
                    let mut dir = positions[i] - positions[j];
                    let mut d = dir.length();
                    if d < MIN_DIST {
                        // Split coincident vertices along x.
                        dir = DVec2::X;
                        d = MIN_DIST;
                    } else {
                        dir /= d;
                    }
                    let f = dir * (repulse / d.powf(params.p));
                    forces[i] += f;
                    forces[j] -= f;
                }
            }

            for &(s, t) in edges {
                if s == t || s >= n || t >= n {
                    continue;
                }
                let delta = positions[t] - positions[s];
                let d = delta.length();
                if d < MIN_DIST {
                    continue;
                }
                let f = delta / d * (d * d / k);
                forces[s] += f;
                forces[t] -= f;
            }

            for (i, p) in positions.iter_mut().enumerate() {
                if pinned.get(i).copied().unwrap_or(false) {
                    continue;
                }
                *p += forces[i].normalize_or_zero() * step;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

pub struct LayoutScheduler {
    timer: IntervalTimer,
    state: RunState,
    algorithm: Box<dyn LayoutAlgorithm>,
    pub params: LayoutParams,
}

impl LayoutScheduler {
    pub fn new(interval: Duration, params: LayoutParams) -> Self {
        Self::with_algorithm(interval, params, Box::new(ForceDirected))
    }

    pub fn with_algorithm(
        interval: Duration,
        params: LayoutParams,
        algorithm: Box<dyn LayoutAlgorithm>,
    ) -> Self {
        Self {
            timer: IntervalTimer::new(interval),
            state: RunState::Running,
            algorithm,
            params,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            self.timer.cancel();
            tracing::info!("layout paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
            self.timer.arm();
            tracing::info!("layout resumed");
        }
    }

    pub fn toggle(&mut self) -> RunState {
        match self.state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
        }
        self.state
    }

    /// Returns `true` when a layout iteration ran.
    pub fn tick(&mut self, dt: Duration, graph: &mut GraphStore) -> bool {
        if !self.timer.advance(dt) {
            return false;
        }
        self.run_step(graph);
        true
    }

    /// One iteration regardless of timer and pause state.
    pub fn run_step(&mut self, graph: &mut GraphStore) {
        let before = graph.positions();
        let pinned = graph.pinned_mask();
        let edges = graph.edge_index_pairs();
        let mut next = before.clone();

        self.algorithm.step(&mut next, &pinned, &edges, &self.params);

        for (i, p) in next.iter_mut().enumerate() {
            let Some(prev) = before.get(i) else {
                continue;
            };
            if pinned.get(i).copied().unwrap_or(false) {
                *p = *prev;
            } else if !p.is_finite() {
                tracing::warn!(
                    vertex = ?graph.vertex_at(i),
                    "layout produced a non-finite position; keeping the previous one"
                );
                *p = *prev;
            }
        }
        graph.write_positions(&next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    struct Explode;

    impl LayoutAlgorithm for Explode {
        fn step(
            &mut self,
            positions: &mut [DVec2],
            _: &[bool],
            _: &[(usize, usize)],
            _: &LayoutParams,
        ) {
            for p in positions.iter_mut() {
                *p = DVec2::splat(f64::NAN);
            }
        }
    }

    fn random_graph(seed: u64) -> GraphStore {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut g = GraphStore::new(false);
        let vs: Vec<_> = (0..20)
            .map(|_| g.add_vertex_at(DVec2::new(rng.gen(), rng.gen())))
            .collect();
        for _ in 0..30 {
            let a = vs[rng.gen_range(0..vs.len())];
            let b = vs[rng.gen_range(0..vs.len())];
            g.add_edge(a, b);
        }
        g
    }

    #[test]
    fn pinned_positions_are_bitwise_unchanged() {
        let mut g = random_graph(7);
        let pinned: Vec<_> = g.vertices().step_by(3).collect();
        for v in &pinned {
            g.set_pinned(*v, true);
        }
        let before: Vec<_> = pinned.iter().map(|v| g.position(*v)).collect();
        let free = g.vertices().nth(1).expect("vertex");
        let free_before = g.position(free);

        let mut s = LayoutScheduler::new(Duration::ZERO, LayoutParams::default());
        assert!(s.tick(Duration::from_millis(16), &mut g));

        for (v, p) in pinned.iter().zip(before) {
            let (now, was) = (g.position(*v).expect("live"), p.expect("live"));
            assert_eq!(now.x.to_bits(), was.x.to_bits());
            assert_eq!(now.y.to_bits(), was.y.to_bits());
        }
        assert_ne!(g.position(free), free_before);
    }

    #[test]
    fn non_finite_output_is_reset() {
        let mut g = random_graph(3);
        let before = g.positions();
        let mut s = LayoutScheduler::with_algorithm(
            Duration::ZERO,
            LayoutParams::default(),
            Box::new(Explode),
        );
        s.run_step(&mut g);
        assert_eq!(g.positions(), before);
    }

    #[test]
    fn paused_scheduler_does_not_tick() {
        let mut g = random_graph(1);
        let before = g.positions();
        let mut s = LayoutScheduler::new(Duration::ZERO, LayoutParams::default());
        assert_eq!(s.toggle(), RunState::Paused);
        assert!(!s.tick(Duration::from_secs(1), &mut g));
        assert_eq!(g.positions(), before);
        assert_eq!(s.toggle(), RunState::Running);
        assert!(s.tick(Duration::ZERO, &mut g));
    }
}
