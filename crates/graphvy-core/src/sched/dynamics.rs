use std::time::Duration;

use crate::graph::GraphStore;
use crate::sched::timer::IntervalTimer;

/// Value range a rule expects a property to take, used to calibrate colormaps.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRange {
    pub property: String,
    pub for_vertices: bool,
    pub states: usize,
    pub end: Option<f64>,
}

/// A rule bound to one graph.
pub trait DynamicsStep {
    fn step(&mut self, graph: &mut GraphStore) -> anyhow::Result<()>;

    fn expected_ranges(&self) -> Vec<PropertyRange> {
        Vec::new()
    }
}

/// Factory for [`DynamicsStep`]s. Rules are linked into the binary and looked
/// up by name; nothing is loaded from disk.
pub trait DynamicsRule {
    fn name(&self) -> &str;

    fn bind(&self, graph: &GraphStore) -> anyhow::Result<Box<dyn DynamicsStep>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicsState {
    /// No rule loaded.
    Idle,
    Paused,
    Running,
    /// The rule failed; only loading a rule again leaves this state.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicsTick {
    Idle,
    Stepped,
    Failed(String),
}

pub struct DynamicsScheduler {
    timer: IntervalTimer,
    state: DynamicsState,
    step: Option<Box<dyn DynamicsStep>>,
    rule_name: Option<String>,
    last_error: Option<String>,
}

impl DynamicsScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            timer: IntervalTimer::disarmed(interval),
            state: DynamicsState::Idle,
            step: None,
            rule_name: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> DynamicsState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DynamicsState::Running
    }

    pub fn rule_name(&self) -> Option<&str> {
        self.rule_name.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn expected_ranges(&self) -> Vec<PropertyRange> {
        self.step
            .as_ref()
            .map(|s| s.expected_ranges())
            .unwrap_or_default()
    }

    /// Install a bound rule in the paused state.
    pub fn load(&mut self, name: impl Into<String>, step: Box<dyn DynamicsStep>) {
        self.timer.cancel();
        let name = name.into();
        tracing::info!(rule = %name, "dynamics rule loaded");
        self.step = Some(step);
        self.rule_name = Some(name);
        self.last_error = None;
        self.state = DynamicsState::Paused;
    }

    pub fn unload(&mut self) {
        self.timer.cancel();
        self.step = None;
        self.rule_name = None;
        self.state = DynamicsState::Idle;
    }

    pub fn pause(&mut self) {
        if self.state == DynamicsState::Running {
            self.timer.cancel();
            self.state = DynamicsState::Paused;
            tracing::info!("dynamics paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == DynamicsState::Paused && self.step.is_some() {
            self.timer.arm();
            self.state = DynamicsState::Running;
            tracing::info!("dynamics resumed");
        }
    }

    pub fn toggle(&mut self) -> DynamicsState {
        match self.state {
            DynamicsState::Running => self.pause(),
            DynamicsState::Paused => self.resume(),
            DynamicsState::Idle | DynamicsState::Failed => {}
        }
        self.state
    }

    pub fn tick(&mut self, dt: Duration, graph: &mut GraphStore) -> DynamicsTick {
        if self.state != DynamicsState::Running || !self.timer.advance(dt) {
            return DynamicsTick::Idle;
        }
        let Some(step) = self.step.as_mut() else {
            return DynamicsTick::Idle;
        };
        match step.step(graph) {
            Ok(()) => DynamicsTick::Stepped,
            Err(err) => {
                let msg = format!("{err:#}");
                tracing::warn!(
                    rule = self.rule_name.as_deref().unwrap_or("?"),
                    error = %msg,
                    "dynamics rule failed; dynamics stopped"
                );
                self.timer.cancel();
                self.state = DynamicsState::Failed;
                self.last_error = Some(msg.clone());
                DynamicsTick::Failed(msg)
            }
        }
    }
}
