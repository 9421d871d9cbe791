// ── In-memory backend for unit tests ──

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use crate::backend::RuleBackend;
use crate::error::CoreError;
use crate::model::{CollectionIdentity, Rule};
use crate::renumber::RenumberTransaction;

/// Serves one rule sequence for every identity and applies submitted
/// transactions to it the way the appliance does.
#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    rules: Vec<Rule>,
    fetches: usize,
    last_force: Option<bool>,
    fetch_failure: Option<CoreError>,
    submit_failure: Option<CoreError>,
    submissions: Vec<(String, RenumberTransaction)>,
}

impl FakeBackend {
    pub(crate) fn with_rules(rules: Vec<Rule>) -> Self {
        let backend = Self::default();
        backend.set_rules(rules);
        backend
    }

    pub(crate) fn set_rules(&self, rules: Vec<Rule>) {
        self.state.lock().unwrap().rules = rules;
    }

    pub(crate) fn fail_next_fetch(&self, error: CoreError) {
        self.state.lock().unwrap().fetch_failure = Some(error);
    }

    pub(crate) fn fail_next_submit(&self, error: CoreError) {
        self.state.lock().unwrap().submit_failure = Some(error);
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches
    }

    pub(crate) fn last_force_flag(&self) -> Option<bool> {
        self.state.lock().unwrap().last_force
    }

    /// Submitted transactions with the display name of their target.
    pub(crate) fn submissions(&self) -> Vec<(String, RenumberTransaction)> {
        self.state.lock().unwrap().submissions.clone()
    }
}

impl<I: CollectionIdentity> RuleBackend<I> for FakeBackend {
    async fn fetch_rules(&self, _identity: &I, force_refresh: bool) -> Result<Vec<Rule>, CoreError> {
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        state.last_force = Some(force_refresh);
        match state.fetch_failure.take() {
            Some(e) => Err(e),
            None => Ok(state.rules.clone()),
        }
    }

    async fn submit_reorder(
        &self,
        identity: &I,
        transaction: &RenumberTransaction,
    ) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state
            .submissions
            .push((identity.to_string(), transaction.clone()));
        if let Some(e) = state.submit_failure.take() {
            return Err(e);
        }

        let mut applied: Vec<Rule> = transaction
            .entries()
            .iter()
            .map(|e| Rule::new(e.new_number, e.payload.clone()))
            .collect();
        applied.sort_by_key(|r| r.number);
        state.rules = applied;
        Ok(())
    }
}
