use crate::infrastructure::error::CoreError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// The three record kinds the remote store publishes change notifications for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Projects,
    Tasks,
    TimeEntries,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Projects,
        RecordKind::Tasks,
        RecordKind::TimeEntries,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Tasks => "tasks",
            Self::TimeEntries => "time_entries",
        }
    }
}

pub type ChangeHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    id: u64,
    kind: RecordKind,
}

impl SubscriptionHandle {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }
}

/// External publish/subscribe feed of change notifications. Implementations
/// wrap whatever realtime transport the deployment uses; the core only needs
/// subscribe and unsubscribe.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(
        &self,
        kind: RecordKind,
        on_change: ChangeHandler,
    ) -> Result<SubscriptionHandle, CoreError>;

    fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<(), CoreError>;
}

#[derive(Default)]
pub struct InMemoryChangeFeed {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, (RecordKind, ChangeHandler)>>,
}

impl InMemoryChangeFeed {
    /// Delivers one notification for `kind` to every current subscriber and
    /// returns how many handlers ran. Handlers are invoked outside the lock.
    pub fn emit(&self, kind: RecordKind) -> Result<usize, CoreError> {
        let handlers: Vec<ChangeHandler> = {
            let subscribers = self
                .subscribers
                .lock()
                .map_err(|error| CoreError::Internal(format!("change feed lock poisoned: {error}")))?;
            subscribers
                .values()
                .filter(|(subscribed_kind, _)| *subscribed_kind == kind)
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };

        for handler in &handlers {
            handler();
        }
        Ok(handlers.len())
    }

    pub fn subscriber_count(&self) -> Result<usize, CoreError> {
        let subscribers = self
            .subscribers
            .lock()
            .map_err(|error| CoreError::Internal(format!("change feed lock poisoned: {error}")))?;
        Ok(subscribers.len())
    }
}

impl ChangeFeed for InMemoryChangeFeed {
    fn subscribe(
        &self,
        kind: RecordKind,
        on_change: ChangeHandler,
    ) -> Result<SubscriptionHandle, CoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self
            .subscribers
            .lock()
            .map_err(|error| CoreError::Internal(format!("change feed lock poisoned: {error}")))?;
        subscribers.insert(id, (kind, on_change));
        Ok(SubscriptionHandle { id, kind })
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<(), CoreError> {
        let mut subscribers = self
            .subscribers
            .lock()
            .map_err(|error| CoreError::Internal(format!("change feed lock poisoned: {error}")))?;
        subscribers.remove(&handle.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn emit_reaches_only_matching_subscribers() {
        let feed = InMemoryChangeFeed::default();
        let project_hits = Arc::new(AtomicUsize::new(0));
        let task_hits = Arc::new(AtomicUsize::new(0));

        let hits = Arc::clone(&project_hits);
        feed.subscribe(RecordKind::Projects, Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("subscribe projects");
        let hits = Arc::clone(&task_hits);
        feed.subscribe(RecordKind::Tasks, Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("subscribe tasks");

        assert_eq!(feed.emit(RecordKind::Projects).expect("emit"), 1);
        assert_eq!(project_hits.load(Ordering::SeqCst), 1);
        assert_eq!(task_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribed_handler_is_not_invoked() {
        let feed = InMemoryChangeFeed::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let handler_hits = Arc::clone(&hits);
        let handle = feed
            .subscribe(RecordKind::TimeEntries, Arc::new(move || {
                handler_hits.fetch_add(1, Ordering::SeqCst);
            }))
            .expect("subscribe");

        feed.unsubscribe(&handle).expect("unsubscribe");
        assert_eq!(feed.emit(RecordKind::TimeEntries).expect("emit"), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(feed.subscriber_count().expect("count"), 0);
    }
}
