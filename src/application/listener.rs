use crate::infrastructure::change_feed::{ChangeFeed, ChangeHandler, RecordKind, SubscriptionHandle};
use crate::infrastructure::error::CoreError;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Subscribes one resynchronization callback to change notifications for all
/// three record kinds as a unit. Any event of any origin, the current
/// session's own mutations included, invokes the same callback; incremental
/// patching of the denormalized view from event payloads is deliberately
/// avoided in favor of the single full-rebuild path.
///
/// Handles share the consuming view's lifetime: `detach` releases them
/// together and `Drop` detaches as a safety net.
pub struct ChangeFeedListener<F: ChangeFeed> {
    feed: Arc<F>,
    handles: Mutex<Vec<SubscriptionHandle>>,
}

impl<F: ChangeFeed> ChangeFeedListener<F> {
    pub fn attach(feed: Arc<F>, on_change: ChangeHandler) -> Result<Self, CoreError> {
        let mut handles = Vec::with_capacity(RecordKind::ALL.len());
        for kind in RecordKind::ALL {
            match feed.subscribe(kind, Arc::clone(&on_change)) {
                Ok(handle) => handles.push(handle),
                Err(error) => {
                    // Subscriptions stand or fall together; release the
                    // partial set before reporting the failure.
                    for handle in &handles {
                        if let Err(unsubscribe_error) = feed.unsubscribe(handle) {
                            warn!(
                                kind = handle.kind().as_str(),
                                error = %unsubscribe_error,
                                "failed releasing partial subscription"
                            );
                        }
                    }
                    return Err(error);
                }
            }
        }
        Ok(Self {
            feed,
            handles: Mutex::new(handles),
        })
    }

    /// Releases all subscriptions. Idempotent; a second call is a no-op.
    pub fn detach(&self) {
        let drained: Vec<SubscriptionHandle> = match self.handles.lock() {
            Ok(mut handles) => handles.drain(..).collect(),
            Err(_) => return,
        };
        for handle in drained {
            if let Err(error) = self.feed.unsubscribe(&handle) {
                warn!(
                    kind = handle.kind().as_str(),
                    error = %error,
                    "failed releasing change feed subscription"
                );
            }
        }
    }
}

impl<F: ChangeFeed> Drop for ChangeFeedListener<F> {
    fn drop(&mut self) {
        self.detach();
    }
}
