use std::collections::HashSet;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use flowdeck_core::{PipelineDef, RepoAddress, RepositoryOption};

use crate::retry::with_backoff;

/// On-disk workspace manifest: locations, each hosting repositories, each
/// defining pipelines. Pipelines may omit `snapshot_id`; a content-derived
/// one is computed at load time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkspaceManifest {
    pub locations: Vec<LocationManifest>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocationManifest {
    pub name: String,
    #[serde(default)]
    pub repositories: Vec<RepositoryManifest>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepositoryManifest {
    pub name: String,
    #[serde(default)]
    pub pipelines: Vec<PipelineManifest>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineManifest {
    pub name: String,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub parent_snapshot_id: Option<String>,
}

pub fn load_workspace(path: &Path) -> Result<Vec<RepositoryOption>> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read workspace manifest: {}", path.display()))?;
    let manifest: WorkspaceManifest =
        serde_yaml::from_str(&s).with_context(|| "parse workspace manifest yaml")?;
    let options = manifest_to_options(&manifest)?;
    debug!(path = %path.display(), repos = options.len(), "workspace manifest loaded");
    Ok(options)
}

/// Same as `load_workspace`, retrying I/O-shaped failures with the default
/// backoff schedule. Parse and validation errors fail immediately.
pub fn load_workspace_with_retry(path: &Path, max_retries: u32) -> Result<Vec<RepositoryOption>> {
    with_backoff(
        || load_workspace(path),
        |err| err.downcast_ref::<std::io::Error>().is_some(),
        max_retries,
    )
}

pub fn manifest_to_options(manifest: &WorkspaceManifest) -> Result<Vec<RepositoryOption>> {
    let mut seen: HashSet<RepoAddress> = HashSet::new();
    let mut options = Vec::new();
    for location in &manifest.locations {
        for repository in &location.repositories {
            let address = RepoAddress::new(repository.name.clone(), location.name.clone());
            if !seen.insert(address.clone()) {
                return Err(anyhow!(
                    "duplicate repository {}@{} in workspace manifest",
                    address.repository_name,
                    address.location_name
                ));
            }
            let pipelines = repository
                .pipelines
                .iter()
                .map(|p| PipelineDef {
                    name: p.name.clone(),
                    snapshot_id: p
                        .snapshot_id
                        .clone()
                        .unwrap_or_else(|| pipeline_snapshot_hash(p)),
                    parent_snapshot_id: p.parent_snapshot_id.clone(),
                })
                .collect();
            options.push(RepositoryOption { address, pipelines });
        }
    }
    Ok(options)
}

/// Content-derived snapshot id: sha256 over the key-sorted JSON encoding of
/// the pipeline definition, hex-encoded.
pub fn pipeline_snapshot_hash(pipeline: &PipelineManifest) -> String {
    let v = serde_json::to_value(pipeline).expect("PipelineManifest serializable");
    let bytes = serde_json::to_vec(&sort_json(v)).expect("json bytes");
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Recursively sort object keys for stable hashing.
fn sort_json(v: serde_json::Value) -> serde_json::Value {
    match v {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new_map = serde_json::Map::new();
            for k in keys {
                let child = map.get(&k).cloned().unwrap_or(serde_json::Value::Null);
                new_map.insert(k, sort_json(child));
            }
            serde_json::Value::Object(new_map)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(sort_json).collect())
        }
        other => other,
    }
}
