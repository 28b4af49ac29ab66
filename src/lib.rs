//! Aggregation and synchronization core of the Timetally time tracker.
//!
//! The crate derives per-project and per-task time totals from closed
//! interval records, keeps a client-side entry view consistent with a remote
//! store, and applies user mutations optimistically with reconciliation by
//! full resynchronization on failure. Authentication, rendering and the
//! realtime transport are external collaborators behind the [`RemoteStore`]
//! and [`ChangeFeed`] seams.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::entry_store::EntryStore;
pub use application::listener::ChangeFeedListener;
pub use application::mutation::EntryMutationService;
pub use application::view_sync::{SyncOutcome, ViewSyncService};
pub use domain::aggregate::{aggregate, decorate_entries, EntryView, ProjectView, TaskView};
pub use domain::interval::{duration_ms, sum_durations_ms};
pub use domain::models::{
    EntryChange, EntryDraft, EntryUpdate, Project, Task, TimeEntry,
};
pub use infrastructure::change_feed::{
    ChangeFeed, ChangeHandler, InMemoryChangeFeed, RecordKind, SubscriptionHandle,
};
pub use infrastructure::config::{ensure_default_config, load_remote_config, RemoteConfig};
pub use infrastructure::error::CoreError;
pub use infrastructure::postgrest_client::PostgrestRemoteStore;
pub use infrastructure::remote_store::{InMemoryRemoteStore, RemoteStore};
