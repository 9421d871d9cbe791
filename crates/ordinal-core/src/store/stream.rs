use std::sync::Arc;

use tokio::sync::watch;

use crate::model::Rule;

/// A subscription to one collection's stored rule sequence.
///
/// Holds the snapshot seen at creation or at the last `changed()` call.
pub struct RuleStream {
    current: Arc<Vec<Rule>>,
    receiver: watch::Receiver<Arc<Vec<Rule>>>,
}

impl RuleStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<Rule>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    pub fn current(&self) -> &Arc<Vec<Rule>> {
        &self.current
    }

    /// The newest stored sequence, which may be ahead of `current()`.
    pub fn latest(&self) -> Arc<Vec<Rule>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next replacement.
    /// Returns `None` once the store has dropped the collection.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Rule>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }
}
