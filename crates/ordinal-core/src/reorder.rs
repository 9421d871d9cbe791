// ── Reorder controller ──
//
// Drives one collection's reorder lifecycle:
//
//   Clean ──drag──▶ Dirty ──save──▶ Saving ──ok──▶ Clean
//                    ▲  │cancel        │
//                    │  ▼             err
//                    │ Clean           │
//                    └─────────────────┘
//
// While Dirty or Saving the working sequence is what gets displayed and
// the store is pinned against background refresh. Drags are refused on
// any identity whose reorder is still awaiting the console, including
// one this controller switched away from and back to.

use std::mem;
use std::sync::Arc;

use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::RuleBackend;
use crate::error::CoreError;
use crate::model::{CollectionIdentity, Rule, RuleNumber};
use crate::renumber::RenumberTransaction;
use crate::session::{ReorderSession, resolve_drag};
use crate::store::RuleStore;

// ── Phases and outcomes ──────────────────────────────────────────────

/// Observable reorder lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReorderPhase {
    Clean,
    Dirty,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// The working order changed.
    Moved,
    /// Nothing to do: same row, no drop target, or unknown rule.
    Ignored,
    /// A save is in flight; edits are locked until it settles.
    Locked,
}

/// A submission handed out by [`ReorderController::begin_save`].
///
/// Carries everything needed to call the backend without borrowing the
/// controller, plus the session epoch used to detect identity switches.
/// Its identity stays locked until the result reaches `finish_save`.
#[derive(Debug, Clone)]
pub struct PendingSave<I> {
    identity: I,
    epoch: u64,
    transaction: RenumberTransaction,
}

impl<I> PendingSave<I> {
    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn transaction(&self) -> &RenumberTransaction {
        &self.transaction
    }
}

#[derive(Debug)]
pub enum BeginSave<I> {
    /// No session open.
    Clean,
    /// A save of this identity is already in flight; nothing new was
    /// started.
    InFlight,
    /// The working order renumbers nothing; the session was closed
    /// without contacting the console.
    Unchanged,
    /// The stored sequence was replaced after the session opened, so its
    /// rule numbers no longer match the console. The session was dropped.
    Stale,
    /// Submit this, then hand the result to `finish_save`.
    Submit(PendingSave<I>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    NothingToSave,
    InFlight,
    Unchanged,
    /// Session dropped because the console's order changed under it.
    Stale,
    /// Reorder applied. `refreshed` is false when the follow-up fetch
    /// failed and the store still holds the pre-save sequence.
    Saved { entries: usize, refreshed: bool },
    /// Applied remotely, but the controller had already moved to another
    /// collection; only the store was refreshed.
    Detached,
}

enum SessionState {
    Clean,
    Dirty(ReorderSession),
    Saving(ReorderSession),
}

impl SessionState {
    fn phase(&self) -> ReorderPhase {
        match self {
            Self::Clean => ReorderPhase::Clean,
            Self::Dirty(_) => ReorderPhase::Dirty,
            Self::Saving(_) => ReorderPhase::Saving,
        }
    }

    fn session(&self) -> Option<&ReorderSession> {
        match self {
            Self::Clean => None,
            Self::Dirty(s) | Self::Saving(s) => Some(s),
        }
    }
}

// ── ReorderController ────────────────────────────────────────────────

/// Reconciles an interactive reordering with the remote collection.
///
/// Owns at most one [`ReorderSession`], always bound to the active
/// identity. Switching identity while Dirty discards the session.
pub struct ReorderController<I: CollectionIdentity, B: RuleBackend<I>> {
    identity: I,
    store: Arc<RuleStore<I>>,
    backend: Arc<B>,
    state: SessionState,
    /// Bumped whenever a session ends; stale `PendingSave`s are detected
    /// by comparing against it.
    epoch: u64,
    last_error: Option<CoreError>,
    phase: watch::Sender<ReorderPhase>,
}

impl<I: CollectionIdentity, B: RuleBackend<I>> ReorderController<I, B> {
    pub fn new(identity: I, store: Arc<RuleStore<I>>, backend: Arc<B>) -> Self {
        let (phase, _) = watch::channel(ReorderPhase::Clean);
        Self {
            identity,
            store,
            backend,
            state: SessionState::Clean,
            epoch: 0,
            last_error: None,
            phase,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn store(&self) -> &Arc<RuleStore<I>> {
        &self.store
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn phase(&self) -> ReorderPhase {
        self.state.phase()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<ReorderPhase> {
        self.phase.subscribe()
    }

    pub fn session(&self) -> Option<&ReorderSession> {
        self.state.session()
    }

    /// The most recent failed save, cleared by the next edit or success.
    pub fn last_error(&self) -> Option<&CoreError> {
        self.last_error.as_ref()
    }

    /// What the user should see: the working order while a session is
    /// open, the stored sequence otherwise.
    pub fn displayed(&self) -> Vec<Rule> {
        match self.state.session() {
            Some(session) => session.working().to_vec(),
            None => self.store.snapshot(&self.identity).to_vec(),
        }
    }

    /// The transaction a save would submit right now.
    pub fn preview(&self) -> Option<RenumberTransaction> {
        self.state
            .session()
            .map(|s| s.transaction(self.identity.numbering_policy()))
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load the active collection into the store.
    pub async fn load(&self, force_refresh: bool) -> Result<Arc<Vec<Rule>>, CoreError> {
        self.store
            .load(self.backend.as_ref(), &self.identity, force_refresh)
            .await
    }

    /// Make `identity` the active collection.
    ///
    /// Any open session is discarded without saving. A save in flight
    /// keeps running; its result is applied to the store only, and its
    /// identity refuses drags until then.
    pub fn select(&mut self, identity: I) {
        if identity == self.identity {
            return;
        }

        if let Some(session) = self.state.session() {
            warn!(
                collection = %self.identity,
                phase = %self.state.phase(),
                moved = session.is_dirty(),
                "discarding unsaved reorder on collection switch"
            );
        }
        self.close_session();
        self.identity = identity;
        self.last_error = None;
    }

    /// Apply a drag from the visible rows.
    ///
    /// `visible` lists the rule numbers in display order, which may be a
    /// filtered subset of the collection.
    pub fn drag(
        &mut self,
        visible: &[RuleNumber],
        source: usize,
        target: Option<usize>,
    ) -> DragOutcome {
        if self.is_locked() {
            return DragOutcome::Locked;
        }
        match resolve_drag(visible, source, target) {
            Some((dragged, onto)) => self.move_rule(dragged, onto),
            None => DragOutcome::Ignored,
        }
    }

    /// Move rule `dragged` into the slot held by rule `target`.
    pub fn move_rule(&mut self, dragged: RuleNumber, target: RuleNumber) -> DragOutcome {
        if self.is_locked() {
            return DragOutcome::Locked;
        }

        if let SessionState::Dirty(session) = &mut self.state {
            if !session.move_rule(dragged, target) {
                return DragOutcome::Ignored;
            }
            self.last_error = None;
            return DragOutcome::Moved;
        }

        let snapshot = self.store.snapshot(&self.identity);
        let mut session = ReorderSession::begin(&snapshot);
        if !session.move_rule(dragged, target) {
            return DragOutcome::Ignored;
        }

        debug!(collection = %self.identity, rules = snapshot.len(), "reorder session opened");
        self.store.pin(&self.identity);
        self.last_error = None;
        self.transition(SessionState::Dirty(session));
        DragOutcome::Moved
    }

    /// Drop the open session. Refused while a save is in flight.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            SessionState::Dirty(_) => {
                debug!(collection = %self.identity, "reorder cancelled");
                self.close_session();
                self.last_error = None;
                true
            }
            SessionState::Clean | SessionState::Saving(_) => false,
        }
    }

    // ── Saving ───────────────────────────────────────────────────────

    /// Enter Saving and hand out the transaction to submit.
    pub fn begin_save(&mut self) -> BeginSave<I> {
        let session = match mem::replace(&mut self.state, SessionState::Clean) {
            SessionState::Clean => return BeginSave::Clean,
            SessionState::Saving(session) => {
                self.state = SessionState::Saving(session);
                return BeginSave::InFlight;
            }
            SessionState::Dirty(session) => session,
        };

        if self.store.is_saving(&self.identity) {
            self.state = SessionState::Dirty(session);
            return BeginSave::InFlight;
        }

        if session.original() != self.store.snapshot(&self.identity).as_slice() {
            warn!(
                collection = %self.identity,
                "stored order changed since the reorder began; discarding it"
            );
            self.state = SessionState::Dirty(session);
            self.close_session();
            self.last_error = None;
            return BeginSave::Stale;
        }

        let transaction = session.transaction(self.identity.numbering_policy());
        if transaction.is_noop() {
            debug!(collection = %self.identity, "working order renumbers nothing; skipping save");
            self.state = SessionState::Dirty(session);
            self.close_session();
            self.last_error = None;
            return BeginSave::Unchanged;
        }

        self.last_error = None;
        self.store.begin_saving(&self.identity);
        self.transition(SessionState::Saving(session));
        BeginSave::Submit(PendingSave {
            identity: self.identity.clone(),
            epoch: self.epoch,
            transaction,
        })
    }

    /// Settle a submission started by [`begin_save`](Self::begin_save).
    ///
    /// On success the store is force-refreshed from the console before
    /// the session closes. On failure the session returns to Dirty with
    /// its working order intact.
    pub async fn finish_save(
        &mut self,
        pending: PendingSave<I>,
        result: Result<(), CoreError>,
    ) -> Result<SaveOutcome, CoreError> {
        self.store.end_saving(&pending.identity);

        let attached = pending.epoch == self.epoch
            && pending.identity == self.identity
            && matches!(self.state, SessionState::Saving(_));

        if !attached {
            result?;
            info!(collection = %pending.identity, "reorder saved after collection switch");
            if let Err(e) = self
                .store
                .load(self.backend.as_ref(), &pending.identity, true)
                .await
            {
                warn!(collection = %pending.identity, error = %e, "post-save refresh failed");
            }
            return Ok(SaveOutcome::Detached);
        }

        match result {
            Ok(()) => {
                let entries = pending.transaction.len();
                info!(collection = %self.identity, entries, "reorder saved");
                let refreshed = match self
                    .store
                    .load(self.backend.as_ref(), &self.identity, true)
                    .await
                {
                    Ok(_) => true,
                    Err(e) => {
                        warn!(collection = %self.identity, error = %e, "post-save refresh failed");
                        false
                    }
                };
                self.close_session();
                self.last_error = None;
                Ok(SaveOutcome::Saved { entries, refreshed })
            }
            Err(e) => {
                warn!(
                    collection = %self.identity,
                    error = %e,
                    retryable = e.is_retryable(),
                    "reorder save failed"
                );
                if let SessionState::Saving(session) =
                    mem::replace(&mut self.state, SessionState::Clean)
                {
                    self.transition(SessionState::Dirty(session));
                }
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Submit the open session and wait for the outcome.
    pub async fn save(&mut self) -> Result<SaveOutcome, CoreError> {
        let pending = match self.begin_save() {
            BeginSave::Clean => return Ok(SaveOutcome::NothingToSave),
            BeginSave::InFlight => return Ok(SaveOutcome::InFlight),
            BeginSave::Unchanged => return Ok(SaveOutcome::Unchanged),
            BeginSave::Stale => return Ok(SaveOutcome::Stale),
            BeginSave::Submit(pending) => pending,
        };

        let backend = Arc::clone(&self.backend);
        let result = backend
            .submit_reorder(&pending.identity, &pending.transaction)
            .await;
        self.finish_save(pending, result).await
    }

    // ── Internals ────────────────────────────────────────────────────

    fn is_locked(&self) -> bool {
        matches!(self.state, SessionState::Saving(_)) || self.store.is_saving(&self.identity)
    }

    fn transition(&mut self, state: SessionState) {
        self.state = state;
        self.phase.send_replace(self.state.phase());
    }

    fn close_session(&mut self) {
        if self.state.session().is_some() {
            self.store.unpin(&self.identity);
            self.epoch += 1;
        }
        self.transition(SessionState::Clean);
    }
}
