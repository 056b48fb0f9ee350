use std::collections::HashMap;
use std::sync::Mutex;

use flowdeck_core::{resolve_run_repository, ResolvedRepo, RunId, RunRecord};
use tracing::debug;

use crate::context::WorkspaceSnapshot;

/// Memoizes run/repository resolution keyed by (run id, workspace epoch).
/// A reload bumps the epoch, so stale entries are never served; entries from
/// superseded epochs are dropped the next time a newer epoch is resolved.
#[derive(Default)]
pub struct RepositoryForRunCache {
    inner: Mutex<HashMap<(RunId, u64), Option<ResolvedRepo>>>,
}

impl RepositoryForRunCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &self,
        run: Option<&RunRecord>,
        snapshot: &WorkspaceSnapshot,
    ) -> Option<ResolvedRepo> {
        let run = run?;
        let key = (run.id.clone(), snapshot.epoch);

        let mut inner = self.inner.lock().unwrap();
        if let Some(hit) = inner.get(&key) {
            debug!(run = run.id.as_str(), epoch = snapshot.epoch, "resolver cache hit");
            return hit.clone();
        }

        let resolved =
            resolve_run_repository(Some(run), &snapshot.options).map(|m| m.to_resolved());
        inner.retain(|(_, epoch), _| *epoch == snapshot.epoch);
        inner.insert(key, resolved.clone());
        debug!(run = run.id.as_str(), epoch = snapshot.epoch, "resolver cache miss");
        resolved
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}
