use crate::domain::models::{EntryChange, Project, Task, TimeEntry};
use crate::infrastructure::error::CoreError;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Query/command interface over the remote durable store. Every operation is
/// scoped to an authenticated user identity supplied by the caller; update and
/// delete must match zero rows outside that scope.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Projects owned by the user, ordered by name.
    async fn list_projects(&self, user_id: &str) -> Result<Vec<Project>, CoreError>;

    /// Tasks belonging to any of the given projects, ordered by name.
    async fn list_tasks(&self, project_ids: &[String]) -> Result<Vec<Task>, CoreError>;

    /// Time entries belonging to any of the given projects, newest first by
    /// creation instant. With `closed_only` set, rows without an end instant
    /// are excluded.
    async fn list_entries(
        &self,
        project_ids: &[String],
        closed_only: bool,
    ) -> Result<Vec<TimeEntry>, CoreError>;

    /// Inserts a closed entry and returns the stored row with its
    /// server-assigned id.
    async fn insert_entry(&self, entry: &TimeEntry) -> Result<TimeEntry, CoreError>;

    /// Updates start, end and description of the user's entry. Zero matched
    /// rows under the user scope signal `AccessDenied`.
    async fn update_entry(
        &self,
        entry_id: &str,
        user_id: &str,
        change: &EntryChange,
    ) -> Result<TimeEntry, CoreError>;

    /// Deletes the user's entry; zero matched rows signal `AccessDenied`.
    async fn delete_entry(&self, entry_id: &str, user_id: &str) -> Result<(), CoreError>;
}

#[derive(Debug, Default)]
struct StoreState {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    entries: Vec<TimeEntry>,
}

/// Mutex-backed store used by tests and local runs. Mirrors the remote
/// dialect's visible behavior: name-ordered project/task listings,
/// creation-descending entry listings, user-scoped update/delete.
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    state: Mutex<StoreState>,
    next_row: AtomicU64,
}

impl InMemoryRemoteStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, CoreError> {
        self.state
            .lock()
            .map_err(|error| CoreError::Internal(format!("remote store lock poisoned: {error}")))
    }

    pub fn add_project(&self, project: Project) -> Result<(), CoreError> {
        self.lock()?.projects.push(project);
        Ok(())
    }

    pub fn add_task(&self, task: Task) -> Result<(), CoreError> {
        self.lock()?.tasks.push(task);
        Ok(())
    }

    pub fn add_entry(&self, entry: TimeEntry) -> Result<(), CoreError> {
        self.lock()?.entries.push(entry);
        Ok(())
    }

    pub fn entry_by_id(&self, entry_id: &str) -> Result<Option<TimeEntry>, CoreError> {
        Ok(self
            .lock()?
            .entries
            .iter()
            .find(|entry| entry.id == entry_id)
            .cloned())
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn list_projects(&self, user_id: &str) -> Result<Vec<Project>, CoreError> {
        let state = self.lock()?;
        let mut projects: Vec<Project> = state
            .projects
            .iter()
            .filter(|project| project.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(projects)
    }

    async fn list_tasks(&self, project_ids: &[String]) -> Result<Vec<Task>, CoreError> {
        let state = self.lock()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|task| project_ids.contains(&task.project_id))
            .cloned()
            .collect();
        tasks.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(tasks)
    }

    async fn list_entries(
        &self,
        project_ids: &[String],
        closed_only: bool,
    ) -> Result<Vec<TimeEntry>, CoreError> {
        let state = self.lock()?;
        let mut entries: Vec<TimeEntry> = state
            .entries
            .iter()
            .filter(|entry| project_ids.contains(&entry.project_id))
            .filter(|entry| !closed_only || entry.is_closed())
            .cloned()
            .collect();
        entries.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(entries)
    }

    async fn insert_entry(&self, entry: &TimeEntry) -> Result<TimeEntry, CoreError> {
        let row_id = format!("row-{}", self.next_row.fetch_add(1, Ordering::Relaxed) + 1);
        let mut stored = entry.clone();
        stored.id = row_id;
        self.lock()?.entries.push(stored.clone());
        Ok(stored)
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        user_id: &str,
        change: &EntryChange,
    ) -> Result<TimeEntry, CoreError> {
        let mut state = self.lock()?;
        let Some(entry) = state.entries.iter_mut().find(|entry| entry.id == entry_id) else {
            return Err(CoreError::NotFound(format!("time entry {entry_id}")));
        };
        if entry.user_id != user_id {
            return Err(CoreError::AccessDenied(
                "time entry not found or access denied".to_string(),
            ));
        }
        entry.start_time = change.start_time;
        entry.end_time = Some(change.end_time);
        entry.description = change.description.clone();
        Ok(entry.clone())
    }

    async fn delete_entry(&self, entry_id: &str, user_id: &str) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        let Some(position) = state.entries.iter().position(|entry| entry.id == entry_id) else {
            return Err(CoreError::NotFound(format!("time entry {entry_id}")));
        };
        if state.entries[position].user_id != user_id {
            return Err(CoreError::AccessDenied(
                "time entry not found or access denied".to_string(),
            ));
        }
        state.entries.remove(position);
        Ok(())
    }
}
