use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use flowdeck_core::BACKOFF_MAX_RETRIES;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    pub workspace: WorkspaceFileConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkspaceFileConfig {
    /// Path to the workspace manifest; `~` expands to the home directory.
    pub manifest: String,
    #[serde(default)]
    pub refresh_max_retries: Option<u32>,
}

impl Config {
    pub fn default_for_project(project_id: &str) -> Self {
        Self {
            project: ProjectConfig { id: project_id.to_string() },
            workspace: WorkspaceFileConfig {
                manifest: ".flowdeck/workspace.yaml".to_string(),
                refresh_max_retries: Some(BACKOFF_MAX_RETRIES),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| "parse flowdeck.toml")?;
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn manifest_path(&self, project_root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&self.workspace.manifest).to_string();
        let p = PathBuf::from(expanded);
        if p.is_absolute() {
            p
        } else {
            project_root.join(p)
        }
    }

    pub fn refresh_max_retries(&self) -> u32 {
        self.workspace.refresh_max_retries.unwrap_or(BACKOFF_MAX_RETRIES)
    }

    pub fn config_path(project_root: &Path) -> PathBuf {
        project_root.join(".flowdeck").join("flowdeck.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let path = Config::config_path(dir.path());
        let cfg = Config::default_for_project("demo");
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.project.id, "demo");
        assert_eq!(loaded.workspace.manifest, ".flowdeck/workspace.yaml");
        assert_eq!(loaded.refresh_max_retries(), BACKOFF_MAX_RETRIES);
    }

    #[test]
    fn test_relative_manifest_resolves_under_project_root() {
        let cfg = Config::default_for_project("demo");
        let root = Path::new("/srv/deploy");
        assert_eq!(
            cfg.manifest_path(root),
            PathBuf::from("/srv/deploy/.flowdeck/workspace.yaml")
        );
    }

    #[test]
    fn test_absolute_manifest_is_kept() {
        let mut cfg = Config::default_for_project("demo");
        cfg.workspace.manifest = "/etc/flowdeck/workspace.yaml".to_string();
        assert_eq!(
            cfg.manifest_path(Path::new("/srv/deploy")),
            PathBuf::from("/etc/flowdeck/workspace.yaml")
        );
    }
}
