use std::collections::{HashMap, HashSet};
use std::time::Duration;

use glam::DVec2;
use graphvy_core::interact::{Key, KeyEvent, PointerButton, PointerEvent};
use graphvy_core::sched::RunState;
use graphvy_core::view::{palette, GroupId, Layer, Primitive, RenderSurface, VertexState};
use graphvy_core::{EngineConfig, GraphCanvas, GraphStore, Tool, VertexHandle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Render surface that keeps live groups and counts calls.
#[derive(Default)]
struct Recording {
    live: HashMap<GroupId, (Layer, Vec<Primitive>)>,
    upserts: usize,
    removes: usize,
}

impl RenderSurface for Recording {
    fn upsert(&mut self, group: GroupId, layer: Layer, primitives: &[Primitive]) {
        self.upserts += 1;
        self.live.insert(group, (layer, primitives.to_vec()));
    }

    fn remove(&mut self, group: GroupId) {
        self.removes += 1;
        self.live.remove(&group);
    }
}

impl Recording {
    fn count(&self, layer: Layer) -> usize {
        self.live.values().filter(|(l, _)| *l == layer).count()
    }
}

const MOUSE: u64 = 0;

fn canvas() -> GraphCanvas {
    let mut c = GraphCanvas::new(EngineConfig::default());
    // Keep positions still so clicks land where expected.
    assert_eq!(c.toggle_layout(), RunState::Paused);
    c
}

fn click(c: &mut GraphCanvas, pos: DVec2) {
    c.handle_pointer(PointerEvent::down(MOUSE, pos, PointerButton::Left))
        .expect("down");
    c.handle_pointer(PointerEvent::up(MOUSE, pos, PointerButton::Left))
        .expect("up");
}

fn drag(c: &mut GraphCanvas, from: DVec2, to: DVec2) {
    c.handle_pointer(PointerEvent::down(MOUSE, from, PointerButton::Left))
        .expect("down");
    let steps = 4;
    for i in 1..=steps {
        let p = from + (to - from) * (i as f64 / steps as f64);
        c.handle_pointer(PointerEvent::moved(MOUSE, p, PointerButton::Left))
            .expect("move");
    }
    c.handle_pointer(PointerEvent::up(MOUSE, to, PointerButton::Left))
        .expect("up");
}

fn view_of(c: &GraphCanvas, v: VertexHandle) -> DVec2 {
    let p = c.graph().position(v).expect("live vertex");
    c.transform().to_view(p)
}

/// `n` vertices on a diagonal, far enough apart to hit individually.
fn diagonal(n: usize) -> (GraphStore, Vec<VertexHandle>) {
    let mut g = GraphStore::new(false);
    let vs = (0..n)
        .map(|i| g.add_vertex_at(DVec2::splat(0.1 + 0.8 * i as f64 / n.max(1) as f64)))
        .collect();
    (g, vs)
}

#[test]
fn add_node_then_abandon_edge() {
    let mut c = canvas();
    c.set_tool(Tool::AddNode);

    let at = c.transform().to_view(DVec2::splat(0.5));
    click(&mut c, at);

    assert_eq!(c.graph().num_vertices(), 1);
    assert_eq!(c.registry().num_vertices(), 1);
    let v = c.graph().vertex_at(0).expect("vertex");
    assert!((c.graph().position(v).expect("pos") - DVec2::splat(0.5)).length() < 1e-9);
    assert_eq!(c.marks().highlighted(), Some(v));
    assert_eq!(c.registry().vertex_state(v), VertexState::Highlighted);

    c.set_tool(Tool::AddEdge);
    click(&mut c, at);
    assert_eq!(c.marks().source(), Some(v));
    click(&mut c, DVec2::new(10.0, 10.0));
    assert_eq!(c.marks().source(), None);
    assert_eq!(c.graph().num_edges(), 0);
}

#[test]
fn delete_edge_twice_and_self_loop_noop() {
    let mut c = canvas();
    let mut g = GraphStore::new(false);
    let a = g.add_vertex_at(DVec2::new(0.2, 0.2));
    let b = g.add_vertex_at(DVec2::new(0.8, 0.8));
    g.add_edge(a, b);
    c.load_graph(g).expect("load");
    assert_eq!(c.layout_state(), RunState::Paused);
    c.set_tool(Tool::DeleteEdge);

    let from = view_of(&c, a);
    click(&mut c, from);
    let from = view_of(&c, b);
    click(&mut c, from);
    assert_eq!(c.graph().num_edges(), 0);
    assert_eq!(c.registry().num_edges(), 0);
    assert_eq!(c.marks().source(), None);

    let from = view_of(&c, a);
    click(&mut c, from);
    let from = view_of(&c, a);
    click(&mut c, from);
    assert_eq!(c.graph().num_edges(), 0);
    assert_eq!(c.graph().num_vertices(), 2);
}

#[test]
fn add_edge_between_two_clicks() {
    let mut c = canvas();
    let (g, vs) = diagonal(2);
    c.load_graph(g).expect("load");
    c.set_tool(Tool::AddEdge);

    let from = view_of(&c, vs[0]);
    click(&mut c, from);
    let from = view_of(&c, vs[1]);
    click(&mut c, from);
    let from = view_of(&c, vs[0]);
    click(&mut c, from);
    let from = view_of(&c, vs[1]);
    click(&mut c, from);

    assert_eq!(c.graph().num_edges(), 1);
    assert!(c.graph().edge(vs[0], vs[1]).is_some());

    c.set_multigraph(true);
    let from = view_of(&c, vs[0]);
    click(&mut c, from);
    let from = view_of(&c, vs[1]);
    click(&mut c, from);
    assert_eq!(c.graph().num_edges(), 2);
    assert_eq!(c.registry().num_edges(), 2);
}

#[test]
fn removing_inner_vertex_relocates_last() {
    let mut c = canvas();
    let (mut g, vs) = diagonal(5);
    let last_edge = g.add_edge(vs[4], vs[0]).expect("edge");
    let into_last = g.add_edge(vs[2], vs[4]).expect("edge");
    c.load_graph(g).expect("load");
    c.set_tool(Tool::DeleteNode);

    let from = view_of(&c, vs[1]);
    click(&mut c, from);

    assert_eq!(c.graph().num_vertices(), 4);
    assert_eq!(c.registry().num_vertices(), 4);
    assert_eq!(c.graph().vertex_index(vs[4]), Some(1));
    assert_eq!(c.registry().vertex(vs[4]).map(|v| v.index), Some(1));
    let out = c.registry().edge(last_edge).expect("edge visual");
    assert_eq!((out.source, out.source_index), (vs[4], 1));
    let inc = c.registry().edge(into_last).expect("edge visual");
    assert_eq!((inc.target, inc.target_index), (vs[4], 1));

    let mut surface = Recording::default();
    c.refresh(&mut surface).expect("consistent");
}

#[test]
fn vertex_removal_takes_every_incident_edge() {
    let mut c = canvas();
    let (mut g, vs) = diagonal(6);
    for v in &vs[1..] {
        g.add_edge(vs[0], *v);
    }
    g.add_edge(vs[3], vs[0]);
    g.add_edge(vs[0], vs[0]);
    g.add_edge(vs[1], vs[2]);
    let k = g.incident_edges(vs[0]).map(|e| e.len()).expect("live");
    assert_eq!(k, 7);
    let edges_before = g.num_edges();
    c.load_graph(g).expect("load");

    let mut surface = Recording::default();
    c.refresh(&mut surface).expect("refresh");
    assert_eq!(surface.count(Layer::Edges), edges_before);

    c.edit(|g| g.remove_vertex(vs[0])).expect("edit");
    assert_eq!(c.graph().num_edges(), edges_before - k);
    assert_eq!(c.registry().num_edges(), edges_before - k);
    assert_eq!(c.registry().num_vertices(), 5);

    c.refresh(&mut surface).expect("refresh");
    assert_eq!(surface.count(Layer::Edges), edges_before - k);
    assert_eq!(surface.count(Layer::Vertices), 5);
}

#[test]
fn select_and_pin_stay_disjoint() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut c = canvas();
    let (g, vs) = diagonal(6);
    c.load_graph(g).expect("load");

    for _ in 0..200 {
        let tool = if rng.gen_bool(0.5) {
            Tool::Select
        } else {
            Tool::Pin
        };
        c.set_tool(tool);
        let v = vs[rng.gen_range(0..vs.len())];
        let from = view_of(&c, v);
        click(&mut c, from);
        assert!(c.marks().selected().is_disjoint(c.marks().pinned()));
    }
}

#[test]
fn marquee_toggles_relative_to_drag_start() {
    let mut c = canvas();
    let (g, vs) = diagonal(5);
    c.load_graph(g).expect("load");

    c.handle_key(KeyEvent::press(Key::Shift));
    assert_eq!(c.tool(), Tool::Select);

    // Pre-select the last vertex, outside the marquee.
    let from = view_of(&c, vs[4]);
    click(&mut c, from);
    let baseline: HashSet<_> = [vs[4]].into_iter().collect();
    assert_eq!(c.marks().selected(), &baseline);

    let corner = view_of(&c, vs[2]) + DVec2::splat(20.0);
    let origin = DVec2::new(1.0, 1.0);
    drag(&mut c, origin, corner);
    let expected: HashSet<_> = [vs[0], vs[1], vs[2], vs[4]].into_iter().collect();
    assert_eq!(c.marks().selected(), &expected);

    drag(&mut c, origin, corner);
    assert_eq!(c.marks().selected(), &baseline);

    c.handle_key(KeyEvent::release(Key::Shift));
    assert_eq!(c.tool(), Tool::Grab);

    let mut surface = Recording::default();
    c.refresh(&mut surface).expect("refresh");
    assert_eq!(surface.count(Layer::Overlay), 0);
}

#[test]
fn grab_moves_vertex_selection_or_view() {
    let mut c = canvas();
    let (g, vs) = diagonal(3);
    c.load_graph(g).expect("load");

    let target = DVec2::new(700.0, 100.0);
    let from = view_of(&c, vs[0]);
    drag(&mut c, from, target);
    assert!((view_of(&c, vs[0]) - target).length() < 1e-9);

    let offset = c.transform().offset;
    drag(&mut c, DVec2::new(790.0, 590.0), DVec2::new(750.0, 590.0));
    assert!((c.transform().offset.x - (offset.x - 40.0 / 800.0)).abs() < 1e-12);

    c.set_tool(Tool::Select);
    let from = view_of(&c, vs[1]);
    click(&mut c, from);
    let from = view_of(&c, vs[2]);
    click(&mut c, from);
    c.set_tool(Tool::Grab);
    let before: Vec<_> = vs.iter().map(|v| c.graph().position(*v)).collect();
    drag(&mut c, DVec2::new(790.0, 10.0), DVec2::new(710.0, 10.0));
    for (i, v) in vs.iter().enumerate() {
        let moved = c.graph().position(*v).expect("pos") - before[i].expect("pos");
        if i == 0 {
            assert_eq!(moved, DVec2::ZERO);
        } else {
            assert!((moved - DVec2::new(-0.2, 0.0)).length() < 1e-9);
        }
    }
}

#[test]
fn pinch_keeps_anchor_fixed() {
    let mut c = canvas();
    let (g, _) = diagonal(2);
    c.load_graph(g).expect("load");
    let anchor = DVec2::new(300.0, 300.0);
    let under = c.transform().to_graph(anchor);
    let scale = c.transform().scale;

    c.handle_pointer(PointerEvent::down(1, anchor, PointerButton::Left))
        .expect("down");
    c.handle_pointer(PointerEvent::down(2, DVec2::new(400.0, 300.0), PointerButton::Left))
        .expect("down");
    c.handle_pointer(PointerEvent::moved(2, DVec2::new(500.0, 300.0), PointerButton::Left))
        .expect("move");

    assert!((c.transform().scale - scale * 2.0).abs() < 1e-12);
    assert!((c.transform().to_view(under) - anchor).length() < 1e-9);
}

#[test]
fn show_path_highlights_route() {
    let mut c = canvas();
    let (mut g, vs) = diagonal(4);
    let ab = g.add_edge(vs[0], vs[1]).expect("edge");
    let bc = g.add_edge(vs[1], vs[2]).expect("edge");
    let side = g.add_edge(vs[3], vs[0]).expect("edge");
    c.load_graph(g).expect("load");
    c.set_tool(Tool::ShowPath);

    let from = view_of(&c, vs[0]);
    click(&mut c, from);
    let from = view_of(&c, vs[2]);
    click(&mut c, from);
    let path: HashSet<_> = [ab, bc].into_iter().collect();
    assert_eq!(c.registry().path_edges(), &path);
    let route = c.interaction().path().expect("route");
    assert_eq!(route.vertices, vec![vs[0], vs[1], vs[2]]);
    assert_eq!(route.edges, vec![ab, bc]);

    let mut surface = Recording::default();
    c.refresh(&mut surface).expect("refresh");
    let color = |e| {
        let group = c.registry().edge(e).expect("visual").group;
        match surface.live.get(&group).and_then(|(_, p)| p.first()) {
            Some(Primitive::Segment { color, .. }) => *color,
            other => panic!("unexpected {other:?}"),
        }
    };
    assert_eq!(color(bc), palette::HIGHLIGHTED_EDGE);
    assert_eq!(color(side), palette::EDGE);

    c.set_tool(Tool::Grab);
    assert!(c.registry().path_edges().is_empty());
    assert!(c.interaction().path().is_none());
}

#[test]
fn space_toggles_layout_outside_pin() {
    let mut c = GraphCanvas::new(EngineConfig::default());
    c.handle_key(KeyEvent::press(Key::Space));
    assert_eq!(c.layout_state(), RunState::Paused);
    c.handle_key(KeyEvent::press(Key::Other));
    assert_eq!(c.tool(), Tool::Grab);
    c.handle_key(KeyEvent::press(Key::Ctrl));
    assert_eq!(c.tool(), Tool::Pin);
    c.handle_key(KeyEvent::press(Key::Space));
    assert_eq!(c.layout_state(), RunState::Paused);
}

#[test]
fn refresh_is_rate_limited() {
    let mut c = canvas();
    let (g, vs) = diagonal(3);
    c.load_graph(g).expect("load");
    let mut surface = Recording::default();

    assert!(c.tick(Duration::from_millis(16), &mut surface).expect("tick"));
    let mut refreshes = 0;
    for _ in 0..10 {
        c.handle_pointer(PointerEvent::moved(MOUSE, view_of(&c, vs[0]), PointerButton::Left))
            .expect("move");
        c.handle_pointer(PointerEvent::moved(MOUSE, DVec2::ZERO, PointerButton::Left))
            .expect("move");
        if c.tick(Duration::from_millis(1), &mut surface).expect("tick") {
            refreshes += 1;
        }
    }
    assert_eq!(refreshes, 0);
    assert!(c.tick(Duration::from_millis(16), &mut surface).expect("tick"));
    assert_eq!(surface.count(Layer::Vertices), 3);
}

#[test]
fn release_off_canvas_ends_drag() {
    let mut c = canvas();
    let (g, _) = diagonal(2);
    c.load_graph(g).expect("load");

    c.handle_pointer(PointerEvent::down(MOUSE, DVec2::new(10.0, 10.0), PointerButton::Left))
        .expect("down");
    assert!(c.interaction().is_down(MOUSE));
    // Released somewhere outside the window.
    c.handle_pointer(PointerEvent::up(MOUSE, DVec2::new(-40.0, 900.0), PointerButton::Left))
        .expect("up");
    assert!(!c.interaction().is_down(MOUSE));
    assert_eq!(c.interaction().pointers_down(), 0);

    let offset = c.transform().offset;
    c.handle_pointer(PointerEvent::moved(MOUSE, DVec2::new(200.0, 10.0), PointerButton::Left))
        .expect("move");
    assert_eq!(c.transform().offset, offset);
}

#[test]
fn hover_sticks_to_current_highlight() {
    let mut c = canvas();
    let mut g = GraphStore::new(false);
    let near = g.add_vertex_at(DVec2::new(0.5, 0.5));
    let next = g.add_vertex_at(DVec2::new(0.51, 0.5));
    c.load_graph(g).expect("load");
    assert!((view_of(&c, next) - DVec2::new(404.0, 300.0)).length() < 1e-9);

    let hover = |c: &mut GraphCanvas, x: f64| {
        c.handle_pointer(PointerEvent::moved(MOUSE, DVec2::new(x, 300.0), PointerButton::Left))
            .expect("move");
    };
    hover(&mut c, 400.0);
    assert_eq!(c.marks().highlighted(), Some(near));

    // `next` is closer now, but the pointer is still on `near`.
    hover(&mut c, 403.0);
    assert_eq!(c.marks().highlighted(), Some(near));

    hover(&mut c, 409.0);
    assert_eq!(c.marks().highlighted(), Some(next));

    hover(&mut c, 450.0);
    assert_eq!(c.marks().highlighted(), None);
}
