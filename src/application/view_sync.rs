use crate::application::entry_store::EntryStore;
use crate::domain::aggregate::{aggregate, decorate_entries, EntryView, ProjectView};
use crate::infrastructure::error::CoreError;
use crate::infrastructure::remote_store::RemoteStore;
use std::sync::Arc;
use tracing::debug;

/// Denormalized result of one resynchronization cycle, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub projects: Vec<ProjectView>,
    pub entries: Vec<EntryView>,
}

/// The single recovery and consistency path: re-fetch all records for the
/// user, re-run aggregation and rebuild the Entry Store from the
/// authoritative result. Deterministic and idempotent, so reconciliation
/// after a failed mutation and change-feed notifications both funnel through
/// the same `resync` with no incremental patching to keep in sync.
pub struct ViewSyncService<R: RemoteStore> {
    remote: Arc<R>,
    entries: Arc<EntryStore>,
    user_id: String,
}

impl<R: RemoteStore> ViewSyncService<R> {
    pub fn new(remote: Arc<R>, entries: Arc<EntryStore>, user_id: impl Into<String>) -> Self {
        Self {
            remote,
            entries,
            user_id: user_id.into(),
        }
    }

    pub fn entry_store(&self) -> &Arc<EntryStore> {
        &self.entries
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn resync(&self) -> Result<SyncOutcome, CoreError> {
        let projects = self.remote.list_projects(&self.user_id).await?;
        let project_ids: Vec<String> = projects.iter().map(|project| project.id.clone()).collect();
        let tasks = self.remote.list_tasks(&project_ids).await?;
        let raw_entries = self.remote.list_entries(&project_ids, true).await?;

        let views = aggregate(&projects, &tasks, &raw_entries);
        let decorated = decorate_entries(&raw_entries, &projects, &tasks);
        self.entries.reset(decorated.clone())?;

        debug!(
            user_id = %self.user_id,
            projects = projects.len(),
            tasks = tasks.len(),
            entries = raw_entries.len(),
            "resynchronized client view"
        );

        Ok(SyncOutcome {
            projects: views,
            entries: decorated,
        })
    }
}
