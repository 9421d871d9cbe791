// ── Reorder sessions ──
//
// Transient edit buffer for an unsaved reordering of one collection.
// `original` is frozen at the first drag; `working` absorbs every move.

use serde::Serialize;

use crate::model::{Rule, RuleNumber};
use crate::renumber::{NumberingPolicy, RenumberTransaction};

/// Map a drag on the visible (possibly filtered) rows to rule numbers.
///
/// Returns `(dragged, target)` or `None` for a no-op drag: same row,
/// dropped outside any row, or a position past the end of `visible`.
pub fn resolve_drag(
    visible: &[RuleNumber],
    source: usize,
    target: Option<usize>,
) -> Option<(RuleNumber, RuleNumber)> {
    let target = target?;
    if source == target {
        return None;
    }
    let dragged = *visible.get(source)?;
    let onto = *visible.get(target)?;
    (dragged != onto).then_some((dragged, onto))
}

/// An in-progress, unsaved reordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReorderSession {
    original: Vec<Rule>,
    working: Vec<Rule>,
    dirty: bool,
}

impl ReorderSession {
    /// Start a session from the sequence as it stands before any drag.
    pub fn begin(snapshot: &[Rule]) -> Self {
        Self {
            original: snapshot.to_vec(),
            working: snapshot.to_vec(),
            dirty: false,
        }
    }

    pub fn original(&self) -> &[Rule] {
        &self.original
    }

    pub fn working(&self) -> &[Rule] {
        &self.working
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Move `dragged` to the slot currently held by `target`.
    ///
    /// Indices are resolved against the full working sequence, so a drag
    /// inside a filtered view lands correctly. Returns `false` (and leaves
    /// the session untouched) when either rule is absent.
    pub fn move_rule(&mut self, dragged: RuleNumber, target: RuleNumber) -> bool {
        if dragged == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(dragged), self.position(target)) else {
            return false;
        };

        let rule = self.working.remove(from);
        self.working.insert(to, rule);
        self.dirty = true;
        true
    }

    /// Build the renumbering transaction for the current working order.
    pub fn transaction(&self, policy: NumberingPolicy) -> RenumberTransaction {
        RenumberTransaction::build(policy, &self.original, &self.working)
    }

    fn position(&self, number: RuleNumber) -> Option<usize> {
        self.working.iter().position(|r| r.number == number)
    }
}
