use std::collections::HashSet;

use glam::DVec2;

use crate::canvas::Scene;
use crate::error::InvariantViolation;
use crate::graph::{shortest_path, GraphPath};
use crate::handle::VertexHandle;
use crate::interact::input::{Key, KeyEvent, PointerButton, PointerEvent, PointerKind};
use crate::interact::tool::Tool;

/// What the caller should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Redraw,
    ToggleLayout,
    ToggleDynamics,
}

#[derive(Debug, Clone, Copy)]
struct Pointer {
    id: u64,
    button: PointerButton,
    origin: DVec2,
    pos: DVec2,
}

/// Routes pointer and key events to the active tool.
#[derive(Debug, Clone, Default)]
pub struct InteractionStateMachine {
    tool: Tool,
    pointers: Vec<Pointer>,
    /// Selection at the start of the current marquee drag.
    marquee_baseline: Option<HashSet<VertexHandle>>,
    path: Option<GraphPath>,
}

impl InteractionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn path(&self) -> Option<&GraphPath> {
        self.path.as_ref()
    }

    pub fn pointers_down(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_down(&self, id: u64) -> bool {
        self.pointers.iter().any(|p| p.id == id)
    }

    /// Switching tools abandons any half-finished gesture.
    pub fn set_tool(&mut self, tool: Tool, scene: &mut Scene) -> Effect {
        if tool == self.tool {
            return Effect::None;
        }
        tracing::debug!(%tool, "tool changed");
        self.tool = tool;
        self.clear_path(scene);
        self.end_marquee(scene);
        scene
            .marks
            .set_source(None, &mut scene.graph, &mut scene.registry);
        Effect::Redraw
    }

    /// Forget pointers and transient gesture state, keeping the tool.
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.marquee_baseline = None;
        self.path = None;
    }

    pub fn handle_pointer(
        &mut self,
        ev: PointerEvent,
        scene: &mut Scene,
    ) -> Result<Effect, InvariantViolation> {
        match ev.kind {
            PointerKind::Down => self.pointer_down(ev, scene),
            PointerKind::Move => Ok(self.pointer_move(ev, scene)),
            PointerKind::Up => Ok(self.pointer_up(ev, scene)),
        }
    }

    pub fn handle_key(&mut self, ev: KeyEvent, scene: &mut Scene) -> Effect {
        match (ev.key, ev.pressed) {
            (Key::Shift, true) => self.set_tool(Tool::Select, scene),
            (Key::Ctrl, true) => self.set_tool(Tool::Pin, scene),
            (Key::Shift | Key::Ctrl, false) => self.set_tool(Tool::Grab, scene),
            (Key::Space, true) => {
                if self.tool == Tool::Pin || ev.modifiers.ctrl {
                    Effect::ToggleDynamics
                } else {
                    Effect::ToggleLayout
                }
            }
            _ => Effect::None,
        }
    }

    /// Apply the current tool to `v` as if it had been clicked.
    pub fn activate_vertex(
        &mut self,
        v: VertexHandle,
        scene: &mut Scene,
    ) -> Result<Effect, InvariantViolation> {
        if !scene.graph.contains_vertex(v) {
            return Ok(Effect::None);
        }
        match self.tool {
            Tool::Grab | Tool::AddNode => {
                scene
                    .marks
                    .set_highlighted(Some(v), &mut scene.graph, &mut scene.registry);
            }
            _ => self.click(Some(v), None, scene)?,
        }
        Ok(Effect::Redraw)
    }

    fn pointer_down(
        &mut self,
        ev: PointerEvent,
        scene: &mut Scene,
    ) -> Result<Effect, InvariantViolation> {
        // Hover is frozen while a pointer is down; touches never hovered.
        if self.pointers.is_empty() {
            self.hover(ev.pos, scene);
        }
        self.pointers.retain(|p| p.id != ev.id);
        self.pointers.push(Pointer {
            id: ev.id,
            button: ev.button,
            origin: ev.pos,
            pos: ev.pos,
        });

        // Right button only places a pinch anchor.
        if ev.button == PointerButton::Right || self.pointers.len() > 1 {
            return Ok(Effect::None);
        }

        let target = scene.marks.highlighted();
        self.click(target, Some(ev.pos), scene)?;
        if self.tool == Tool::Select {
            self.marquee_baseline = Some(scene.marks.selected().clone());
        }
        Ok(Effect::Redraw)
    }

    fn pointer_move(&mut self, ev: PointerEvent, scene: &mut Scene) -> Effect {
        if self.pointers.is_empty() {
            return if self.hover(ev.pos, scene) {
                Effect::Redraw
            } else {
                Effect::None
            };
        }

        let Some(pointer) = self.pointers.iter_mut().find(|p| p.id == ev.id) else {
            return Effect::None;
        };
        let prev = pointer.pos;
        pointer.pos = ev.pos;
        let pointer = *pointer;

        if self.pointers.len() > 1 {
            if let Some(anchor) = self.pointers.iter().rev().find(|p| p.id != ev.id) {
                scene.transform.pinch(anchor.pos, ev.pos, prev);
            }
            return Effect::Redraw;
        }

        if pointer.button == PointerButton::Right {
            return Effect::None;
        }

        match self.tool {
            Tool::Select => {
                self.drag_marquee(pointer.origin, ev.pos, scene);
                Effect::Redraw
            }
            Tool::Grab => {
                self.drag(prev, ev.pos, scene);
                Effect::Redraw
            }
            _ => Effect::None,
        }
    }

    fn pointer_up(&mut self, ev: PointerEvent, scene: &mut Scene) -> Effect {
        let before = self.pointers.len();
        self.pointers.retain(|p| p.id != ev.id);
        if before == self.pointers.len() {
            return Effect::None;
        }
        if self.pointers.is_empty() {
            self.end_marquee(scene);
        }
        Effect::Redraw
    }

    /// Grab: move the selection, else the highlighted vertex, else the view.
    fn drag(&mut self, prev: DVec2, pos: DVec2, scene: &mut Scene) {
        let selected: Vec<_> = scene.marks.selected().iter().copied().collect();
        if !selected.is_empty() {
            let d = scene.transform.delta_to_graph(pos - prev);
            for v in selected {
                if let Some(p) = scene.graph.position(v) {
                    scene.graph.set_position(v, p + d);
                }
            }
        } else if let Some(v) = scene.marks.highlighted() {
            let p = scene.transform.to_graph(pos);
            scene.graph.set_position(v, p);
        } else {
            scene.transform.pan(pos - prev);
        }
    }

    fn drag_marquee(&mut self, origin: DVec2, pos: DVec2, scene: &mut Scene) {
        let Some(baseline) = self.marquee_baseline.as_ref() else {
            return;
        };
        scene.registry.set_marquee(Some((origin, pos)));
        let (min, max) = (origin.min(pos), origin.max(pos));
        let coords = scene.transform.to_view_all(&scene.graph.positions());
        let inside: HashSet<_> = coords
            .iter()
            .enumerate()
            .filter(|(_, c)| c.cmpge(min).all() && c.cmple(max).all())
            .filter_map(|(i, _)| scene.graph.vertex_at(i))
            .collect();
        let target: HashSet<_> = baseline.symmetric_difference(&inside).copied().collect();
        scene
            .marks
            .set_selection(&target, &mut scene.graph, &mut scene.registry);
    }

    fn end_marquee(&mut self, scene: &mut Scene) {
        self.marquee_baseline = None;
        scene.registry.set_marquee(None);
    }

    fn clear_path(&mut self, scene: &mut Scene) {
        if self.path.take().is_some() {
            scene.registry.set_path(std::iter::empty());
        }
    }

    fn collides(scene: &Scene, v: VertexHandle, pos: DVec2) -> bool {
        let bounds = scene.registry.style().bounds;
        scene
            .graph
            .position(v)
            .map(|p| {
                let d = (scene.transform.to_view(p) - pos).abs();
                d.x <= bounds && d.y <= bounds
            })
            .unwrap_or(false)
    }

    /// Update the highlighted vertex for a pointer at `pos`; `true` if it changed.
    fn hover(&mut self, pos: DVec2, scene: &mut Scene) -> bool {
        let current = scene.marks.highlighted();
        if let Some(v) = current {
            if Self::collides(scene, v, pos) {
                return false;
            }
        }

        let bounds = scene.registry.style().bounds;
        let coords = scene.transform.to_view_all(&scene.graph.positions());
        let hit = coords
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                let d = (*c - pos).abs();
                (d.x <= bounds && d.y <= bounds).then(|| (i, d.length_squared()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(i, _)| scene.graph.vertex_at(i));

        if hit == current {
            return false;
        }
        scene
            .marks
            .set_highlighted(hit, &mut scene.graph, &mut scene.registry);
        true
    }

    /// Per-tool click on `target` (the highlighted vertex, if any) at view
    /// position `pos`. Ends with the view synced to the graph.
    fn click(
        &mut self,
        target: Option<VertexHandle>,
        pos: Option<DVec2>,
        scene: &mut Scene,
    ) -> Result<(), InvariantViolation> {
        self.clear_path(scene);

        match self.tool {
            Tool::Grab => {}
            Tool::Select => {
                if let Some(v) = target {
                    scene
                        .marks
                        .toggle_selected(v, &mut scene.graph, &mut scene.registry);
                }
            }
            Tool::Pin => {
                if let Some(v) = target {
                    scene
                        .marks
                        .toggle_pinned(v, &mut scene.graph, &mut scene.registry);
                }
            }
            Tool::AddNode => {
                if let (None, Some(pos)) = (target, pos) {
                    let at = scene.transform.to_graph(pos);
                    let v = scene.graph.add_vertex_at(at);
                    // The new vertex needs its visual before it can be highlighted.
                    scene.sync()?;
                    scene
                        .marks
                        .set_highlighted(Some(v), &mut scene.graph, &mut scene.registry);
                }
            }
            Tool::DeleteNode => {
                if let Some(v) = target {
                    scene.graph.remove_vertex(v);
                }
            }
            tool if tool.is_two_click() => self.two_click(target, scene),
            _ => {}
        }
        scene.sync()
    }

    fn two_click(&mut self, target: Option<VertexHandle>, scene: &mut Scene) {
        let Some(v) = target else {
            scene
                .marks
                .set_source(None, &mut scene.graph, &mut scene.registry);
            return;
        };
        let Some(source) = scene.marks.source() else {
            scene
                .marks
                .set_source(Some(v), &mut scene.graph, &mut scene.registry);
            return;
        };

        match self.tool {
            Tool::AddEdge => {
                scene.graph.add_edge(source, v);
            }
            Tool::DeleteEdge => {
                if let Some(e) = scene.graph.edge(source, v) {
                    scene.graph.remove_edge(e);
                }
            }
            Tool::ShowPath => {
                if let Some(path) = shortest_path(&scene.graph, source, v) {
                    scene.registry.set_path(path.edges.iter().copied());
                    self.path = Some(path);
                }
            }
            _ => {}
        }
        scene
            .marks
            .set_source(None, &mut scene.graph, &mut scene.registry);
    }
}
