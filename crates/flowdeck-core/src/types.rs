use serde::{Deserialize, Serialize};

use crate::ids::RunId;

/// Unique key of a loaded repository: a repository name plus the code
/// location (deployment unit) hosting it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoAddress {
    pub repository_name: String,
    pub location_name: String,
}

impl RepoAddress {
    pub fn new(repository_name: impl Into<String>, location_name: impl Into<String>) -> Self {
        Self {
            repository_name: repository_name.into(),
            location_name: location_name.into(),
        }
    }
}

/// One pipeline/job definition inside a repository. `snapshot_id` is the
/// content hash of the definition; `parent_snapshot_id` is set for subsetted
/// definitions and points at the un-subsetted original.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDef {
    pub name: String,
    pub snapshot_id: String,
    #[serde(default)]
    pub parent_snapshot_id: Option<String>,
}

/// A loaded repository definition. Within one workspace snapshot the
/// `address` is unique.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOption {
    pub address: RepoAddress,
    pub pipelines: Vec<PipelineDef>,
}

/// One past or in-progress execution, as recorded by the run store.
///
/// `repository_origin` may be absent (older data, ad hoc runs). For subsetted
/// runs `parent_pipeline_snapshot_id` identifies the snapshot of the original
/// pipeline the subset was derived from, and takes precedence over
/// `pipeline_snapshot_id` when matching against loaded definitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: RunId,
    pub pipeline_name: String,
    #[serde(default)]
    pub repository_origin: Option<RepoAddress>,
    #[serde(default)]
    pub pipeline_snapshot_id: Option<String>,
    #[serde(default)]
    pub parent_pipeline_snapshot_id: Option<String>,
}

impl RunRecord {
    /// The snapshot id usable for matching: the parent (un-subsetted)
    /// snapshot when present, else the run's own.
    pub fn effective_snapshot_id(&self) -> Option<&str> {
        self.parent_pipeline_snapshot_id
            .as_deref()
            .or(self.pipeline_snapshot_id.as_deref())
    }
}

/// Per-asset liveness data backing the staleness predicates.
///
/// `projected_logical_version` is absent for partitioned assets;
/// `current_logical_version` is absent for assets that have never
/// materialized.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveDataForNode {
    #[serde(default)]
    pub current_logical_version: Option<String>,
    #[serde(default)]
    pub projected_logical_version: Option<String>,
}
