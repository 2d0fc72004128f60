use anyhow::Context;
use bevy::log::{info, warn};
use directories::ProjectDirs;
use graphvy_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_title: String,
    /// Size of the random graph shown when no `graph_path` is set.
    pub demo_vertices: usize,
    pub demo_edges: usize,
    pub startup_rule: Option<String>,
    pub graph_path: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: "Graphvy".to_string(),
            demo_vertices: 50,
            demo_edges: 80,
            startup_rule: None,
            graph_path: None,
            engine: EngineConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// A relative `graph_path` is read relative to the directory of the config file.
    fn resolve_paths(&mut self, base: Option<&Path>) {
        if let (Some(base), Some(graph)) = (base, self.graph_path.as_mut()) {
            if graph.is_relative() {
                *graph = base.join(&*graph);
            }
        }
    }
}

/// `$GRAPHVY_CONFIG` if set, else `viewer.toml` in the platform config directory.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("GRAPHVY_CONFIG") {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("", "", "graphvy").map(|dirs| dirs.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    config_path()
        .map(|path| read_config(&path))
        .unwrap_or_default()
}

/// Missing file means defaults; a broken one is reported and replaced by defaults.
fn read_config(path: &Path) -> ViewerConfig {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return ViewerConfig::default(),
        Err(err) => {
            warn!(path = %path.display(), "cannot read viewer config: {err}");
            return ViewerConfig::default();
        }
    };
    let mut cfg: ViewerConfig = match toml::from_str(&contents) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(path = %path.display(), "ignoring malformed viewer config: {err}");
            return ViewerConfig::default();
        }
    };
    cfg.resolve_paths(path.parent());
    cfg
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<PathBuf> {
    let path = config_path().context("no config directory available")?;
    write_config(cfg, &path)?;
    info!(path = %path.display(), "viewer config saved");
    Ok(path)
}

/// Written next to the target and renamed over it, so a crash never leaves half a file.
fn write_config(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config dir {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("serialize viewer config")?;
    let staged = path.with_extension("toml.partial");
    fs::write(&staged, data).with_context(|| format!("write {}", staged.display()))?;
    fs::rename(&staged, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn viewer_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("viewer.toml");
        let mut cfg = ViewerConfig::default();
        cfg.startup_rule = Some("edge_flip_gasep".to_string());
        cfg.engine.multigraph = true;
        cfg.engine.style.bounds = 9.0;

        write_config(&cfg, &path).expect("save config");
        let loaded = read_config(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(
            &path,
            r#"
demo_vertices = 12

[engine]
redraw_interval_ms = 33

[engine.layout]
k = 0.25
"#,
        )
        .expect("write");

        let cfg = read_config(&path);
        assert_eq!(cfg.demo_vertices, 12);
        assert_eq!(cfg.demo_edges, 80);
        assert_eq!(cfg.engine.redraw_interval_ms, 33);
        assert_eq!(cfg.engine.layout.k, 0.25);
        assert_eq!(cfg.engine.layout.c, 0.3);
        assert_eq!(cfg.window_title, "Graphvy");
    }

    #[test]
    fn garbage_falls_back_to_default() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "demo_vertices = \"many\"").expect("write");
        assert_eq!(read_config(&path), ViewerConfig::default());
        assert_eq!(
            read_config(&dir.path().join("missing.toml")),
            ViewerConfig::default()
        );
    }

    #[test]
    fn relative_graph_path_follows_config_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        let cfg = ViewerConfig {
            graph_path: Some(PathBuf::from("graphs").join("demo.json")),
            ..ViewerConfig::default()
        };
        write_config(&cfg, &path).expect("save config");
        assert!(!path.with_extension("toml.partial").exists());

        let cfg = read_config(&path);
        assert_eq!(cfg.graph_path, Some(dir.path().join("graphs").join("demo.json")));
    }
}
