use std::collections::HashSet;
use std::sync::Mutex;

use flowdeck_core::{RepoAddress, RepositoryOption};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("duplicate repository {0}@{1} in workspace")]
    DuplicateRepository(String, String),
}

/// Read-only view of the loaded workspace at one instant. The epoch
/// increases on every reload, so (run id, epoch) identifies one resolution.
#[derive(Clone, Debug, Default)]
pub struct WorkspaceSnapshot {
    pub epoch: u64,
    pub options: Vec<RepositoryOption>,
}

/// Owns the live list of loaded repository options. Reloads replace the
/// whole list; readers work on cloned snapshots, never the live list.
#[derive(Default)]
pub struct WorkspaceContext {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    epoch: u64,
    options: Vec<RepositoryOption>,
}

impl WorkspaceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly loaded option list, sorted by (repository name,
    /// location name) so "first match" is stable across reloads. Rejects
    /// duplicate addresses; the previous list is kept on error.
    pub fn replace_options(
        &self,
        mut options: Vec<RepositoryOption>,
    ) -> Result<u64, WorkspaceError> {
        let mut seen: HashSet<&RepoAddress> = HashSet::new();
        for option in &options {
            if !seen.insert(&option.address) {
                return Err(WorkspaceError::DuplicateRepository(
                    option.address.repository_name.clone(),
                    option.address.location_name.clone(),
                ));
            }
        }
        options.sort_by(|a, b| {
            (&a.address.repository_name, &a.address.location_name)
                .cmp(&(&b.address.repository_name, &b.address.location_name))
        });

        let mut inner = self.inner.lock().unwrap();
        inner.epoch += 1;
        inner.options = options;
        debug!(epoch = inner.epoch, repos = inner.options.len(), "workspace reloaded");
        Ok(inner.epoch)
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        let inner = self.inner.lock().unwrap();
        WorkspaceSnapshot {
            epoch: inner.epoch,
            options: inner.options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdeck_core::PipelineDef;

    fn repo(name: &str, location: &str) -> RepositoryOption {
        RepositoryOption {
            address: RepoAddress::new(name, location),
            pipelines: vec![PipelineDef {
                name: "job1".to_string(),
                snapshot_id: "s1".to_string(),
                parent_snapshot_id: None,
            }],
        }
    }

    #[test]
    fn test_empty_context_snapshot() {
        let ctx = WorkspaceContext::new();
        let snap = ctx.snapshot();
        assert_eq!(snap.epoch, 0);
        assert!(snap.options.is_empty());
    }

    #[test]
    fn test_replace_bumps_epoch() {
        let ctx = WorkspaceContext::new();
        assert_eq!(ctx.replace_options(vec![repo("r1", "l1")]).unwrap(), 1);
        assert_eq!(ctx.replace_options(vec![repo("r1", "l1")]).unwrap(), 2);
        assert_eq!(ctx.snapshot().epoch, 2);
    }

    #[test]
    fn test_options_are_sorted_on_install() {
        let ctx = WorkspaceContext::new();
        ctx.replace_options(vec![repo("zeta", "l1"), repo("alpha", "l2"), repo("alpha", "l1")])
            .unwrap();
        let snap = ctx.snapshot();
        let names: Vec<(String, String)> = snap
            .options
            .iter()
            .map(|o| (o.address.repository_name.clone(), o.address.location_name.clone()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("alpha".to_string(), "l1".to_string()),
                ("alpha".to_string(), "l2".to_string()),
                ("zeta".to_string(), "l1".to_string()),
            ]
        );
    }

    #[test]
    fn test_duplicate_address_is_rejected() {
        let ctx = WorkspaceContext::new();
        ctx.replace_options(vec![repo("r1", "l1")]).unwrap();
        let err = ctx
            .replace_options(vec![repo("r1", "l1"), repo("r1", "l1")])
            .unwrap_err();
        assert_eq!(
            err,
            WorkspaceError::DuplicateRepository("r1".to_string(), "l1".to_string())
        );
        // previous list and epoch survive a rejected reload
        let snap = ctx.snapshot();
        assert_eq!(snap.epoch, 1);
        assert_eq!(snap.options.len(), 1);
    }

    #[test]
    fn test_same_name_different_location_allowed() {
        let ctx = WorkspaceContext::new();
        ctx.replace_options(vec![repo("r1", "l1"), repo("r1", "l2")]).unwrap();
        assert_eq!(ctx.snapshot().options.len(), 2);
    }
}
