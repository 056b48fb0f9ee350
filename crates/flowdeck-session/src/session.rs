use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use flowdeck_core::SessionId;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("run config is not valid yaml: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
    #[error("run config must be a yaml mapping")]
    NotAMapping,
}

/// One launch-configuration session: the run config being edited plus the
/// knobs the launch screen exposes. Lives in memory only; nothing here
/// survives a reload of the hosting dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSession {
    pub key: SessionId,
    pub name: String,
    pub run_config_yaml: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub solid_selection: Option<Vec<String>>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub needs_refresh: bool,
}

/// Partial form of a session: fields left `None` carry over on save.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSessionChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub run_config_yaml: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub solid_selection: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub needs_refresh: Option<bool>,
}

impl ExecutionSession {
    /// Shallow-merge `changes` into this session, producing the successor.
    /// The key never changes; saving does not validate the YAML, since the
    /// launch screen allows scratch edits mid-session.
    pub fn save(&self, changes: &ExecutionSessionChanges) -> ExecutionSession {
        ExecutionSession {
            key: self.key.clone(),
            name: changes.name.clone().unwrap_or_else(|| self.name.clone()),
            run_config_yaml: changes
                .run_config_yaml
                .clone()
                .unwrap_or_else(|| self.run_config_yaml.clone()),
            mode: changes.mode.clone().or_else(|| self.mode.clone()),
            solid_selection: changes
                .solid_selection
                .clone()
                .or_else(|| self.solid_selection.clone()),
            tags: changes.tags.clone().unwrap_or_else(|| self.tags.clone()),
            needs_refresh: changes.needs_refresh.unwrap_or(self.needs_refresh),
        }
    }
}

/// Build a fresh session: presets applied over defaults, then the initial
/// run config installed.
pub fn create_single_session(
    presets: &ExecutionSessionChanges,
    run_config_yaml: impl Into<String>,
) -> ExecutionSession {
    let base = ExecutionSession {
        key: SessionId::new(),
        name: "New run".to_string(),
        run_config_yaml: String::new(),
        mode: None,
        solid_selection: None,
        tags: BTreeMap::new(),
        needs_refresh: false,
    };
    let mut session = base.save(presets);
    session.run_config_yaml = run_config_yaml.into();
    session
}

/// Holds the single current session for a transient launch screen. Saving
/// swaps in the shallow-merged successor.
#[derive(Clone, Debug)]
pub struct TransientSession {
    current: ExecutionSession,
}

impl TransientSession {
    pub fn new(presets: &ExecutionSessionChanges, run_config_yaml: impl Into<String>) -> Self {
        Self { current: create_single_session(presets, run_config_yaml) }
    }

    pub fn current(&self) -> &ExecutionSession {
        &self.current
    }

    pub fn save(&mut self, changes: &ExecutionSessionChanges) -> &ExecutionSession {
        self.current = self.current.save(changes);
        &self.current
    }
}

/// Explicit pre-launch check: the run config must parse as yaml and be a
/// mapping (or empty).
pub fn validate_run_config_yaml(yaml: &str) -> Result<(), SessionError> {
    if yaml.trim().is_empty() {
        return Ok(());
    }
    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    match value {
        serde_yaml::Value::Null | serde_yaml::Value::Mapping(_) => Ok(()),
        _ => Err(SessionError::NotAMapping),
    }
}
