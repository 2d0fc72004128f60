use anyhow::Context;
use glam::DVec2;
use std::path::Path;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::error::InvariantViolation;
use crate::graph::{Delta, GraphStore};
use crate::handle::VertexHandle;
use crate::interact::{Effect, InteractionStateMachine, KeyEvent, Marks, PointerEvent, Tool};
use crate::persist::{self, GraphDocument};
use crate::rules;
use crate::sched::{
    DynamicsRule, DynamicsScheduler, DynamicsState, DynamicsTick, LayoutScheduler, RedrawLimiter,
    RunState,
};
use crate::view::{Colormap, CoordinateTransform, RenderSurface, VisualRegistry};

/// The graph together with everything that must agree with it.
pub struct Scene {
    pub graph: GraphStore,
    pub registry: VisualRegistry,
    pub transform: CoordinateTransform,
    pub marks: Marks,
}

impl Scene {
    fn empty(graph: GraphStore, config: &EngineConfig) -> Self {
        Self {
            graph,
            registry: VisualRegistry::new(config.style),
            transform: CoordinateTransform::new(
                DVec2::from(config.initial_offset),
                config.initial_scale,
                DVec2::new(800.0, 600.0),
            ),
            marks: Marks::new(),
        }
    }

    /// Replay pending graph changes into the registry and the marks.
    pub fn sync(&mut self) -> Result<(), InvariantViolation> {
        for delta in self.graph.drain_journal() {
            self.registry.apply(&delta)?;
            if let Delta::VertexRemoved { handle, .. } = delta {
                self.marks.forget(handle);
            }
        }
        Ok(())
    }

    pub fn refresh(&mut self, surface: &mut dyn RenderSurface) -> Result<(), InvariantViolation> {
        self.sync()?;
        self.registry.refresh(&self.graph, &self.transform, surface)
    }
}

/// Engine facade: owns the scene, both schedulers and the redraw limiter and
/// is driven by the host through events and [`GraphCanvas::tick`].
pub struct GraphCanvas {
    scene: Scene,
    interaction: InteractionStateMachine,
    layout: LayoutScheduler,
    dynamics: DynamicsScheduler,
    redraw: RedrawLimiter,
    rule: Option<Box<dyn DynamicsRule>>,
    config: EngineConfig,
    resize_pending: Option<Duration>,
}

impl GraphCanvas {
    pub fn new(config: EngineConfig) -> Self {
        let mut graph = GraphStore::new(config.multigraph);
        graph.set_allow_self_loops(config.self_loops);
        graph.set_default_directed(config.directed);
        let scene = Scene::empty(graph, &config);
        let mut redraw = RedrawLimiter::new(config.redraw_interval());
        redraw.request();
        Self {
            scene,
            interaction: InteractionStateMachine::new(),
            layout: LayoutScheduler::new(config.layout_interval(), config.layout),
            dynamics: DynamicsScheduler::new(config.dynamics_interval()),
            redraw,
            rule: None,
            config,
            resize_pending: None,
        }
    }

    // ----- accessors -----

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn graph(&self) -> &GraphStore {
        &self.scene.graph
    }

    pub fn registry(&self) -> &VisualRegistry {
        &self.scene.registry
    }

    pub fn marks(&self) -> &Marks {
        &self.scene.marks
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.scene.transform
    }

    pub fn interaction(&self) -> &InteractionStateMachine {
        &self.interaction
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tool(&self) -> Tool {
        self.interaction.tool()
    }

    pub fn layout_state(&self) -> RunState {
        self.layout.state()
    }

    pub fn dynamics_state(&self) -> DynamicsState {
        self.dynamics.state()
    }

    pub fn dynamics_error(&self) -> Option<&str> {
        self.dynamics.last_error()
    }

    pub fn rule_name(&self) -> Option<&str> {
        self.dynamics.rule_name()
    }

    pub fn request_redraw(&mut self) {
        self.redraw.request();
    }

    // ----- loading -----

    /// Replace the graph. Schedulers are paused for the swap and resumed
    /// afterwards if they were running; interaction state and the view
    /// transform start over.
    pub fn load_graph(&mut self, mut graph: GraphStore) -> Result<(), InvariantViolation> {
        let layout_was_running = self.layout.is_running();
        let dynamics_was_running = self.dynamics.is_running();
        self.layout.pause();
        self.dynamics.pause();

        graph.set_allow_self_loops(self.config.self_loops);
        graph.set_default_directed(self.config.directed);
        let vertices: Vec<_> = graph.vertices().collect();
        for v in vertices {
            graph.set_pinned(v, false);
        }
        graph.rebuild_journal();

        self.interaction.reset();
        self.scene.marks = Marks::new();
        self.scene.registry.clear();
        self.scene
            .registry
            .set_vertex_colormap(None, Colormap::default_for(true));
        self.scene
            .registry
            .set_edge_colormap(None, Colormap::default_for(false));
        self.scene.transform.reset(
            DVec2::from(self.config.initial_offset),
            self.config.initial_scale,
        );
        self.scene.graph = graph;
        self.scene.sync()?;

        if let Some(rule) = self.rule.as_ref() {
            match rule.bind(&self.scene.graph) {
                Ok(step) => self.dynamics.load(rule.name(), step),
                Err(err) => {
                    tracing::warn!(
                        rule = rule.name(),
                        error = %format!("{err:#}"),
                        "rule does not fit the new graph"
                    );
                    self.dynamics.unload();
                }
            }
        }

        if layout_was_running {
            self.layout.resume();
        }
        if dynamics_was_running {
            self.dynamics.resume();
        }
        self.redraw.request();
        tracing::info!(
            vertices = self.scene.graph.num_vertices(),
            edges = self.scene.graph.num_edges(),
            "graph loaded"
        );
        Ok(())
    }

    /// Load a persisted graph; vertices stored without a position are placed
    /// at random.
    pub fn load_document(&mut self, doc: GraphDocument) -> anyhow::Result<()> {
        let graph = doc.into_graph(&mut rand::thread_rng())?;
        self.load_graph(graph)?;
        Ok(())
    }

    pub fn load_path(&mut self, path: &Path) -> anyhow::Result<()> {
        let doc = persist::load_document(path)?;
        self.load_document(doc)
    }

    pub fn save_path(&self, path: &Path) -> anyhow::Result<()> {
        persist::save_graph(&self.scene.graph, path)
    }

    /// Bind `rule` to the current graph. The rule is installed paused; a
    /// running rule is paused first.
    pub fn load_rule(&mut self, rule: Box<dyn DynamicsRule>) -> anyhow::Result<()> {
        self.dynamics.pause();
        let step = rule
            .bind(&self.scene.graph)
            .with_context(|| format!("bind rule {}", rule.name()))?;
        self.dynamics.load(rule.name(), step);
        for range in self.dynamics.expected_ranges() {
            let map = Colormap::build(range.states, range.end, range.for_vertices);
            if range.for_vertices {
                self.scene
                    .registry
                    .set_vertex_colormap(Some(range.property), map);
            } else {
                self.scene
                    .registry
                    .set_edge_colormap(Some(range.property), map);
            }
        }
        self.rule = Some(rule);
        self.redraw.request();
        Ok(())
    }

    pub fn load_rule_by_name(&mut self, name: &str) -> anyhow::Result<()> {
        let rule = rules::rule_by_name(name, self.config.dynamics_niter)
            .with_context(|| format!("unknown rule {name:?}"))?;
        self.load_rule(rule)
    }

    // ----- input -----

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Redraw => self.redraw.request(),
            Effect::ToggleLayout => {
                self.layout.toggle();
            }
            Effect::ToggleDynamics => {
                self.dynamics.toggle();
            }
        }
    }

    pub fn handle_pointer(&mut self, ev: PointerEvent) -> Result<(), InvariantViolation> {
        let effect = self.interaction.handle_pointer(ev, &mut self.scene)?;
        self.apply_effect(effect);
        Ok(())
    }

    pub fn handle_key(&mut self, ev: KeyEvent) {
        let effect = self.interaction.handle_key(ev, &mut self.scene);
        self.apply_effect(effect);
    }

    pub fn set_tool(&mut self, tool: Tool) {
        let effect = self.interaction.set_tool(tool, &mut self.scene);
        self.apply_effect(effect);
    }

    /// Apply the current tool to `v`, as picked from a list rather than by pointer.
    pub fn activate_vertex(&mut self, v: VertexHandle) -> Result<(), InvariantViolation> {
        let effect = self.interaction.activate_vertex(v, &mut self.scene)?;
        self.apply_effect(effect);
        Ok(())
    }

    pub fn toggle_layout(&mut self) -> RunState {
        self.layout.toggle()
    }

    pub fn toggle_dynamics(&mut self) -> DynamicsState {
        self.dynamics.toggle()
    }

    /// Mutate the graph directly; the view is synced before returning.
    pub fn edit<R>(
        &mut self,
        f: impl FnOnce(&mut GraphStore) -> R,
    ) -> Result<R, InvariantViolation> {
        let out = f(&mut self.scene.graph);
        self.scene.sync()?;
        self.redraw.request();
        Ok(out)
    }

    pub fn set_multigraph(&mut self, multigraph: bool) {
        self.config.multigraph = multigraph;
        self.scene.graph.set_multigraph(multigraph);
    }

    // ----- view -----

    /// The refresh after a resize waits until the size settles.
    pub fn resize(&mut self, viewport: DVec2) {
        self.scene.transform.resize(viewport);
        self.resize_pending = Some(self.config.resize_delay());
        self.redraw.request();
    }

    pub fn zoom_at(&mut self, anchor: DVec2, factor: f64) {
        self.scene.transform.zoom_about(anchor, factor);
        self.redraw.request();
    }

    pub fn set_vertex_colormap(&mut self, property: Option<&str>, states: usize, end: Option<f64>) {
        self.scene.registry.set_vertex_colormap(
            property.map(str::to_string),
            Colormap::build(states, end, true),
        );
        self.redraw.request();
    }

    pub fn set_edge_colormap(&mut self, property: Option<&str>, states: usize, end: Option<f64>) {
        self.scene.registry.set_edge_colormap(
            property.map(str::to_string),
            Colormap::build(states, end, false),
        );
        self.redraw.request();
    }

    /// `"<index>: <out-neighbour indices>"` per vertex, in index order.
    pub fn adjacency_lines(&self) -> Vec<(VertexHandle, String)> {
        let g = &self.scene.graph;
        g.vertices()
            .enumerate()
            .map(|(i, v)| {
                let out: Vec<String> = g
                    .out_neighbors(v)
                    .into_iter()
                    .filter_map(|n| g.vertex_index(n))
                    .map(|n| n.to_string())
                    .collect();
                (v, format!("{i}: {}", out.join(", ")))
            })
            .collect()
    }

    // ----- frame -----

    /// Advance timers by `dt`: layout, then dynamics, then the rate-limited
    /// refresh. Returns `true` when `surface` was updated.
    pub fn tick(
        &mut self,
        dt: Duration,
        surface: &mut dyn RenderSurface,
    ) -> Result<bool, InvariantViolation> {
        if self.layout.tick(dt, &mut self.scene.graph) {
            self.redraw.request();
        }

        match self.dynamics.tick(dt, &mut self.scene.graph) {
            DynamicsTick::Idle => {}
            // A failed step may have mutated the graph before failing.
            DynamicsTick::Stepped | DynamicsTick::Failed(_) => {
                self.scene.sync()?;
                self.redraw.request();
            }
        }

        if let Some(remaining) = self.resize_pending {
            if dt < remaining {
                self.resize_pending = Some(remaining - dt);
                return Ok(false);
            }
            self.resize_pending = None;
        }

        if !self.redraw.poll(dt) {
            return Ok(false);
        }
        self.scene.refresh(surface)?;
        Ok(true)
    }

    /// Refresh now, bypassing the limiter.
    pub fn refresh(&mut self, surface: &mut dyn RenderSurface) -> Result<(), InvariantViolation> {
        self.scene.refresh(surface)
    }
}
