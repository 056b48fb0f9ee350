use serde::{Deserialize, Serialize};

use crate::model::MatchType;
use crate::types::{RepositoryOption, RunRecord};

/// Result of matching a run against the loaded repositories: the winning
/// option plus the strategy that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoMatch<'a> {
    pub repo: &'a RepositoryOption,
    pub match_type: MatchType,
}

/// Owned form of a match, for callers that outlive the options slice
/// (the workspace memo cache, CLI output).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRepo {
    pub repo: RepositoryOption,
    pub match_type: MatchType,
}

impl RepoMatch<'_> {
    pub fn to_resolved(&self) -> ResolvedRepo {
        ResolvedRepo {
            repo: self.repo.clone(),
            match_type: self.match_type,
        }
    }
}

pub fn repo_contains_pipeline(option: &RepositoryOption, pipeline_name: &str) -> bool {
    option.pipelines.iter().any(|p| p.name == pipeline_name)
}

/// All options containing a pipeline with the given name and, when a snapshot
/// id is supplied, whose `snapshot_id` or `parent_snapshot_id` equals it.
/// Input order is preserved.
pub fn find_repos_containing_pipeline<'a>(
    options: &'a [RepositoryOption],
    pipeline_name: &str,
    snapshot_id: Option<&str>,
) -> Vec<&'a RepositoryOption> {
    options
        .iter()
        .filter(|option| {
            option.pipelines.iter().any(|p| {
                p.name == pipeline_name
                    && snapshot_id.map_or(true, |id| {
                        p.snapshot_id == id || p.parent_snapshot_id.as_deref() == Some(id)
                    })
            })
        })
        .collect()
}

/// Strategy 1: the option the run's recorded origin points at, provided that
/// repository still contains the named pipeline. An origin pointing at a
/// repository that has since dropped or renamed the pipeline is no match,
/// not an error.
pub fn origin_match<'a>(
    run: &RunRecord,
    options: &'a [RepositoryOption],
) -> Option<&'a RepositoryOption> {
    let origin = run.repository_origin.as_ref()?;
    let candidate = options.iter().find(|option| option.address == *origin)?;
    repo_contains_pipeline(candidate, &run.pipeline_name).then_some(candidate)
}

/// Strategy 2: every option containing a pipeline whose name matches the run
/// and whose snapshot lineage contains the run's effective snapshot id.
/// Subsetted runs carry the parent pipeline's snapshot id, which is what the
/// repository actually advertises, so the effective id is preferred.
pub fn snapshot_matches<'a>(
    run: &RunRecord,
    options: &'a [RepositoryOption],
) -> Vec<&'a RepositoryOption> {
    if run.pipeline_name.is_empty() {
        return Vec::new();
    }
    match run.effective_snapshot_id() {
        Some(id) if !id.is_empty() => find_repos_containing_pipeline(options, &run.pipeline_name, Some(id)),
        _ => Vec::new(),
    }
}

/// Strategy 3: every option containing any pipeline with the run's name,
/// ignoring snapshot identity.
pub fn pipeline_name_matches<'a>(
    run: &RunRecord,
    options: &'a [RepositoryOption],
) -> Vec<&'a RepositoryOption> {
    find_repos_containing_pipeline(options, &run.pipeline_name, None)
}

/// Match a run against the loaded repository options, strongest evidence
/// first:
///
/// 1. origin confirmed by snapshot identity -> `OriginAndSnapshot`
/// 2. origin alone -> `OriginOnly`
/// 3. first snapshot match in supplied order -> `SnapshotOnly`
/// 4. first pipeline-name match in supplied order -> `PipelineNameOnly`
///
/// Absence of a match is a normal outcome (`None`): the run may reference a
/// repository no longer loaded in the workspace. Missing optional fields on
/// the run degrade to no-match.
pub fn resolve_run_repository<'a>(
    run: Option<&RunRecord>,
    options: &'a [RepositoryOption],
) -> Option<RepoMatch<'a>> {
    let run = run?;

    let by_origin = origin_match(run, options);
    let by_snapshot = snapshot_matches(run, options);

    if let Some(repo) = by_origin {
        let confirmed = by_snapshot.iter().any(|o| o.address == repo.address);
        let match_type = if confirmed {
            MatchType::OriginAndSnapshot
        } else {
            MatchType::OriginOnly
        };
        return Some(RepoMatch { repo, match_type });
    }

    if let Some(repo) = by_snapshot.first().copied() {
        return Some(RepoMatch { repo, match_type: MatchType::SnapshotOnly });
    }

    if let Some(repo) = pipeline_name_matches(run, options).first().copied() {
        return Some(RepoMatch { repo, match_type: MatchType::PipelineNameOnly });
    }

    None
}
