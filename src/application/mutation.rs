use crate::application::view_sync::ViewSyncService;
use crate::domain::aggregate::{entry_display_name, EntryView};
use crate::domain::interval::duration_ms;
use crate::domain::models::{EntryDraft, EntryUpdate, TimeEntry};
use crate::infrastructure::error::CoreError;
use crate::infrastructure::remote_store::RemoteStore;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    let sequence = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{sequence}", Utc::now().timestamp_micros())
}

/// Wraps each remote command in a three-phase protocol: apply the result to
/// the Entry Store immediately, issue the command, then reconcile. Success
/// needs no further work because the local apply computed exactly what was
/// sent; failure triggers one full resynchronization instead of attempting to
/// invert the optimistic apply, so the store never keeps an uncommitted
/// optimistic state.
pub struct EntryMutationService<R: RemoteStore> {
    remote: Arc<R>,
    sync: Arc<ViewSyncService<R>>,
}

impl<R: RemoteStore> EntryMutationService<R> {
    pub fn new(remote: Arc<R>, sync: Arc<ViewSyncService<R>>) -> Self {
        Self { remote, sync }
    }

    /// Commits a stopped timer as a closed entry. The entry becomes visible
    /// at the front of the Entry Store under a placeholder id before the
    /// remote insert resolves; confirmation rebinds it to the server-assigned
    /// id in place.
    pub async fn create_entry(&self, draft: EntryDraft) -> Result<TimeEntry, CoreError> {
        let fields = draft.validate()?;
        let placeholder_id = next_id("entry");

        let record = TimeEntry {
            id: placeholder_id.clone(),
            project_id: fields.project_id.clone(),
            task_id: fields.task_id.clone(),
            user_id: self.sync.user_id().to_string(),
            start_time: fields.start_time,
            end_time: Some(fields.end_time),
            description: fields.description.clone(),
            created_at: Utc::now(),
        };
        let optimistic = EntryView {
            id: placeholder_id.clone(),
            display_name: entry_display_name(
                Some(draft.project_name.trim()),
                draft
                    .task_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty()),
            ),
            start_time_ms: fields.start_time.timestamp_millis(),
            end_time_ms: Some(fields.end_time.timestamp_millis()),
            duration_ms: duration_ms(Some(fields.start_time), Some(fields.end_time)),
            description: fields.description.clone(),
        };
        self.sync.entry_store().insert_front(optimistic.clone())?;

        match self.remote.insert_entry(&record).await {
            Ok(confirmed) => {
                let mut confirmed_view = optimistic;
                confirmed_view.id = confirmed.id.clone();
                self.sync
                    .entry_store()
                    .replace_by_id(&placeholder_id, confirmed_view)?;
                Ok(confirmed)
            }
            Err(error) => Err(self.reconcile_failure("create_entry", error).await),
        }
    }

    /// Edits start, end and description of an existing entry. The recomputed
    /// record is spliced into the Entry Store at its existing position before
    /// the remote update is issued.
    pub async fn update_entry(
        &self,
        entry_id: &str,
        update: EntryUpdate,
    ) -> Result<TimeEntry, CoreError> {
        let change = update.validate()?;

        let snapshot = self.sync.entry_store().snapshot()?;
        if let Some(existing) = snapshot.iter().find(|entry| entry.id == entry_id) {
            let mut updated = existing.clone();
            updated.start_time_ms = change.start_time.timestamp_millis();
            updated.end_time_ms = Some(change.end_time.timestamp_millis());
            updated.duration_ms = duration_ms(Some(change.start_time), Some(change.end_time));
            updated.description = change.description.clone();
            self.sync.entry_store().replace_by_id(entry_id, updated)?;
        }

        match self
            .remote
            .update_entry(entry_id, self.sync.user_id(), &change)
            .await
        {
            Ok(confirmed) => Ok(confirmed),
            Err(error) => Err(self.reconcile_failure("update_entry", error).await),
        }
    }

    pub async fn delete_entry(&self, entry_id: &str) -> Result<(), CoreError> {
        self.sync.entry_store().remove_by_id(entry_id)?;

        match self.remote.delete_entry(entry_id, self.sync.user_id()).await {
            Ok(()) => Ok(()),
            Err(error) => Err(self.reconcile_failure("delete_entry", error).await),
        }
    }

    /// A failed commit is never inverted locally; one resynchronization
    /// replaces the optimistic state with the authoritative one, and the
    /// original error is surfaced once the store is corrected.
    async fn reconcile_failure(&self, action: &str, error: CoreError) -> CoreError {
        warn!(action, error = %error, "remote commit failed; resynchronizing");
        if let Err(resync_error) = self.sync.resync().await {
            warn!(
                action,
                error = %resync_error,
                "resynchronization after failed commit also failed"
            );
        }
        error
    }
}
