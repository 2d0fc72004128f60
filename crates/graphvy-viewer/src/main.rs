mod app;
mod input;
mod render;
mod ui;
mod util;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

fn main() {
    let cfg = util::config::load_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: cfg.window_title.clone(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .insert_resource(ClearColor(render::background()))
        .add_plugins(app::GraphvyViewerPlugin { config: cfg })
        .run();
}
