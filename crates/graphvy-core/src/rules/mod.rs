pub mod gasep;

pub use gasep::{EdgeCentricGasep, EdgeFlipGasep};

use crate::sched::dynamics::DynamicsRule;

/// A dynamics rule compiled into the binary.
#[derive(Clone, Copy)]
pub struct RuleEntry {
    pub name: &'static str,
    pub label: &'static str,
    build: fn(usize) -> Box<dyn DynamicsRule>,
}

impl RuleEntry {
    pub fn build(&self, niter: usize) -> Box<dyn DynamicsRule> {
        (self.build)(niter)
    }
}

fn edge_centric(niter: usize) -> Box<dyn DynamicsRule> {
    Box::new(EdgeCentricGasep::new(niter))
}

fn edge_flip(niter: usize) -> Box<dyn DynamicsRule> {
    Box::new(EdgeFlipGasep::new(niter))
}

pub static RULES: &[RuleEntry] = &[
    RuleEntry {
        name: "edge_centric_gasep",
        label: "Edge-centric GASEP",
        build: edge_centric,
    },
    RuleEntry {
        name: "edge_flip_gasep",
        label: "Edge-flip GASEP",
        build: edge_flip,
    },
];

pub fn rule_by_name(name: &str, niter: usize) -> Option<Box<dyn DynamicsRule>> {
    RULES.iter().find(|r| r.name == name).map(|r| r.build(niter))
}
