// ── Ordered rule store ──
//
// Authoritative rule sequences keyed by collection identity. Sequences
// are replaced wholesale on every successful fetch and never patched.
// A failed fetch keeps the last good sequence and records the error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::stream::RuleStream;
use crate::backend::RuleBackend;
use crate::error::CoreError;
use crate::model::{CollectionIdentity, Rule};

/// Per-identity storage slot.
struct Slot {
    rules: watch::Sender<Arc<Vec<Rule>>>,
    loaded: bool,
    fetched_at: Option<DateTime<Utc>>,
    last_error: Option<CoreError>,
}

impl Slot {
    fn new() -> Self {
        let (rules, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            rules,
            loaded: false,
            fetched_at: None,
            last_error: None,
        }
    }
}

/// Outcome of one background refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    /// Collections left alone because a reorder session is open on them.
    pub skipped: usize,
    pub failed: usize,
}

impl std::ops::AddAssign for RefreshSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.refreshed += rhs.refreshed;
        self.skipped += rhs.skipped;
        self.failed += rhs.failed;
    }
}

/// Ordered rule sequences for every collection of one kind.
///
/// Safe to share between reorder controllers and the background refresh
/// task. An identity is *held* while any controller has a session open on
/// it (pinned) or a reorder submission outstanding (saving); background
/// refreshes skip held identities. Both holds are counted, so several
/// controllers on one identity release it only when the last one lets go.
pub struct RuleStore<I: CollectionIdentity> {
    slots: DashMap<I, Slot>,
    pinned: DashMap<I, usize>,
    saving: DashMap<I, usize>,
}

impl<I: CollectionIdentity> RuleStore<I> {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            pinned: DashMap::new(),
            saving: DashMap::new(),
        }
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Return the cached sequence, or fetch it when absent or forced.
    pub async fn load<B: RuleBackend<I>>(
        &self,
        backend: &B,
        identity: &I,
        force_refresh: bool,
    ) -> Result<Arc<Vec<Rule>>, CoreError> {
        if !force_refresh {
            if let Some(rules) = self.cached(identity) {
                return Ok(rules);
            }
        }

        match backend.fetch_rules(identity, force_refresh).await {
            Ok(rules) => Ok(self.replace(identity, rules)),
            Err(e) => {
                self.record_error(identity, &e);
                Err(e)
            }
        }
    }

    /// Refetch every loaded collection that is not held.
    pub async fn refresh_background<B: RuleBackend<I>>(&self, backend: &B) -> RefreshSummary {
        let mut summary = RefreshSummary::default();
        let loaded: Vec<I> = self
            .slots
            .iter()
            .filter(|slot| slot.loaded)
            .map(|slot| slot.key().clone())
            .collect();

        for identity in loaded {
            if self.is_held(&identity) {
                summary.skipped += 1;
                continue;
            }

            match backend.fetch_rules(&identity, false).await {
                // A drag or save may have started while the fetch was in flight.
                Ok(_) if self.is_held(&identity) => summary.skipped += 1,
                Ok(rules) => {
                    self.replace(&identity, rules);
                    summary.refreshed += 1;
                }
                Err(e) => {
                    warn!(collection = %identity, error = %e, "background refresh failed");
                    self.record_error(&identity, &e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Replace the stored sequence for `identity` wholesale.
    pub fn replace(&self, identity: &I, rules: Vec<Rule>) -> Arc<Vec<Rule>> {
        let rules = Arc::new(rules);
        let mut slot = self
            .slots
            .entry(identity.clone())
            .or_insert_with(Slot::new);
        slot.rules.send_replace(Arc::clone(&rules));
        slot.loaded = true;
        slot.fetched_at = Some(Utc::now());
        slot.last_error = None;
        debug!(collection = %identity, rules = rules.len(), "rule sequence replaced");
        rules
    }

    fn record_error(&self, identity: &I, error: &CoreError) {
        self.slots
            .entry(identity.clone())
            .or_insert_with(Slot::new)
            .last_error = Some(error.clone());
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The stored sequence, if a fetch has ever succeeded.
    pub fn cached(&self, identity: &I) -> Option<Arc<Vec<Rule>>> {
        self.slots
            .get(identity)
            .filter(|slot| slot.loaded)
            .map(|slot| slot.rules.borrow().clone())
    }

    /// The stored sequence, or an empty one when never loaded.
    pub fn snapshot(&self, identity: &I) -> Arc<Vec<Rule>> {
        self.cached(identity).unwrap_or_default()
    }

    pub fn is_loaded(&self, identity: &I) -> bool {
        self.slots.get(identity).is_some_and(|slot| slot.loaded)
    }

    /// Error of the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self, identity: &I) -> Option<CoreError> {
        self.slots
            .get(identity)
            .and_then(|slot| slot.last_error.clone())
    }

    pub fn fetched_at(&self, identity: &I) -> Option<DateTime<Utc>> {
        self.slots.get(identity).and_then(|slot| slot.fetched_at)
    }

    /// Subscribe to sequence replacements for `identity`.
    pub fn subscribe(&self, identity: &I) -> RuleStream {
        let receiver = self
            .slots
            .entry(identity.clone())
            .or_insert_with(Slot::new)
            .rules
            .subscribe();
        RuleStream::new(receiver)
    }

    /// Drop everything known about `identity`.
    pub fn forget(&self, identity: &I) {
        self.slots.remove(identity);
        self.pinned.remove(identity);
        self.saving.remove(identity);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // ── Pinning ──────────────────────────────────────────────────────

    pub(crate) fn pin(&self, identity: &I) {
        acquire(&self.pinned, identity);
    }

    pub(crate) fn unpin(&self, identity: &I) {
        release(&self.pinned, identity);
    }

    /// True while at least one reorder session is open on `identity`.
    pub fn is_pinned(&self, identity: &I) -> bool {
        self.pinned.contains_key(identity)
    }

    pub(crate) fn begin_saving(&self, identity: &I) {
        acquire(&self.saving, identity);
    }

    pub(crate) fn end_saving(&self, identity: &I) {
        release(&self.saving, identity);
    }

    /// True while a reorder of `identity` awaits the console's answer.
    pub fn is_saving(&self, identity: &I) -> bool {
        self.saving.contains_key(identity)
    }

    fn is_held(&self, identity: &I) -> bool {
        self.is_pinned(identity) || self.is_saving(identity)
    }
}

fn acquire<I: CollectionIdentity>(holds: &DashMap<I, usize>, identity: &I) {
    *holds.entry(identity.clone()).or_insert(0) += 1;
}

fn release<I: CollectionIdentity>(holds: &DashMap<I, usize>, identity: &I) {
    if let Some(mut count) = holds.get_mut(identity) {
        *count = count.saturating_sub(1);
    }
    holds.remove_if(identity, |_, count| *count == 0);
}

impl<I: CollectionIdentity> Default for RuleStore<I> {
    fn default() -> Self {
        Self::new()
    }
}
