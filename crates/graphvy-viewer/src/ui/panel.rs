use bevy::prelude::{NonSendMut, ResMut};
use bevy_egui::{egui, EguiContexts};
use graphvy_core::rules::RULES;
use graphvy_core::sched::{DynamicsState, RunState};
use graphvy_core::Tool;

use crate::app::resources::{CanvasRes, PanelState, ViewerSettings};
use crate::util::config;

const HELP: &[(&str, &str)] = &[
    ("Shift (hold)", "Select tool"),
    ("Ctrl (hold)", "Pin tool"),
    ("Space", "pause/resume layout"),
    ("Ctrl+Space", "pause/resume dynamics"),
    ("Wheel / pinch", "zoom"),
    ("Drag empty space", "pan (Grab)"),
];

pub fn ui_panel(
    mut contexts: EguiContexts,
    mut st: NonSendMut<CanvasRes>,
    mut panel: ResMut<PanelState>,
    mut settings: ResMut<ViewerSettings>,
) {
    egui::SidePanel::left("left").show(contexts.ctx_mut(), |ui| {
        ui.heading("Graphvy");
        ui.label(format!("vertices: {}", st.canvas.graph().num_vertices()));
        ui.label(format!("edges: {}", st.canvas.graph().num_edges()));
        ui.separator();

        ui.heading("Tool");
        let current = st.canvas.tool();
        ui.horizontal_wrapped(|ui| {
            for tool in Tool::ALL {
                if ui.selectable_label(current == tool, tool.label()).clicked() {
                    st.canvas.set_tool(tool);
                }
            }
        });

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Layout");
        let layout_label = match st.canvas.layout_state() {
            RunState::Running => "Pause layout",
            RunState::Paused => "Resume layout",
        };
        if ui.button(layout_label).clicked() {
            st.canvas.toggle_layout();
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Dynamics");
        egui::ComboBox::from_label("rule")
            .selected_text(
                RULES
                    .iter()
                    .find(|r| r.name == panel.rule)
                    .map(|r| r.label)
                    .unwrap_or("(none)"),
            )
            .show_ui(ui, |ui| {
                for entry in RULES {
                    ui.selectable_value(&mut panel.rule, entry.name.to_string(), entry.label);
                }
            });
        ui.horizontal(|ui| {
            if ui.button("Load rule").clicked() {
                let rule = panel.rule.clone();
                panel.status = Some(match st.canvas.load_rule_by_name(&rule) {
                    Ok(()) => format!("loaded {rule}"),
                    Err(err) => format!("{err:#}"),
                });
            }
            let state = st.canvas.dynamics_state();
            let label = if state == DynamicsState::Running {
                "Pause"
            } else {
                "Run"
            };
            let runnable = matches!(state, DynamicsState::Paused | DynamicsState::Running);
            if ui.add_enabled(runnable, egui::Button::new(label)).clicked() {
                st.canvas.toggle_dynamics();
            }
        });
        match (st.canvas.rule_name(), st.canvas.dynamics_state()) {
            (Some(name), state) => ui.label(format!("{name}: {state:?}")),
            (None, _) => ui.label("no rule loaded"),
        };
        if let Some(err) = st.canvas.dynamics_error() {
            ui.colored_label(egui::Color32::LIGHT_RED, err);
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Colors");
        ui.horizontal(|ui| {
            ui.label("property:");
            ui.text_edit_singleline(&mut panel.property);
        });
        ui.add(egui::Slider::new(&mut panel.states, 1..=32).text("states"));
        ui.checkbox(&mut panel.continuous, "continuous");
        if panel.continuous {
            ui.add(egui::Slider::new(&mut panel.continuous_end, 0.1..=100.0).text("end"));
        }
        ui.horizontal(|ui| {
            let property = panel.property.trim().to_string();
            let property = (!property.is_empty()).then_some(property.as_str());
            let end = panel.continuous.then_some(panel.continuous_end);
            if ui.button("Vertices").clicked() {
                st.canvas.set_vertex_colormap(property, panel.states, end);
            }
            if ui.button("Edges").clicked() {
                st.canvas.set_edge_colormap(property, panel.states, end);
            }
        });

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Graph");
        let mut multigraph = st.canvas.graph().multigraph();
        if ui.checkbox(&mut multigraph, "multigraph").changed() {
            st.canvas.set_multigraph(multigraph);
        }
        ui.horizontal(|ui| {
            ui.label("file:");
            ui.text_edit_singleline(&mut panel.graph_path);
        });
        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                let path = panel.path();
                panel.status = Some(match st.canvas.save_path(&path) {
                    Ok(()) => format!("saved {}", path.display()),
                    Err(err) => format!("{err:#}"),
                });
            }
            if ui.button("Load").clicked() {
                let path = panel.path();
                panel.status = Some(match st.canvas.load_path(&path) {
                    Ok(()) => format!("loaded {}", path.display()),
                    Err(err) => format!("{err:#}"),
                });
            }
            if ui.button("Save settings").clicked() {
                settings.0.engine.multigraph = st.canvas.graph().multigraph();
                settings.0.startup_rule = st.canvas.rule_name().map(str::to_string);
                let graph = panel.path();
                settings.0.graph_path = Some(std::fs::canonicalize(&graph).unwrap_or(graph));
                panel.status = Some(match config::save(&settings.0) {
                    Ok(path) => format!("settings saved to {}", path.display()),
                    Err(err) => format!("{err:#}"),
                });
            }
        });
        if let Some(status) = &panel.status {
            ui.label(status);
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Adjacency");
        let lines = st.canvas.adjacency_lines();
        egui::ScrollArea::vertical()
            .max_height(240.0)
            .show(ui, |ui| {
                for (v, line) in lines {
                    let marked = st.canvas.marks().highlighted() == Some(v);
                    if ui.selectable_label(marked, line).clicked() {
                        let result = st.canvas.activate_vertex(v);
                        st.check(result);
                    }
                }
            });

        ui.add_space(8.0);
        ui.separator();
        egui::CollapsingHeader::new("Help").show(ui, |ui| {
            egui::Grid::new("help").show(ui, |ui| {
                for (keys, action) in HELP {
                    ui.label(*keys);
                    ui.label(*action);
                    ui.end_row();
                }
            });
        });
    });
}
