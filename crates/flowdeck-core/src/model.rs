use serde::{Deserialize, Serialize};

/// How a run was associated with a loaded repository, strongest evidence
/// first. Origin is an explicit pointer recorded at launch but can go stale;
/// a snapshot id proves structural identity of the executed graph; a bare
/// pipeline-name match is the fallback of last resort.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    OriginAndSnapshot,
    OriginOnly,
    SnapshotOnly,
    PipelineNameOnly,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::OriginAndSnapshot => "origin-and-snapshot",
            MatchType::OriginOnly => "origin-only",
            MatchType::SnapshotOnly => "snapshot-only",
            MatchType::PipelineNameOnly => "pipeline-name-only",
        }
    }
}
