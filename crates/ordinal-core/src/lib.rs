//! Ordered rule collections and their interactive reordering.
//!
//! Sits between `ordinal-api` and the CLI:
//!
//! - **[`RuleStore`]**: authoritative rule sequences per collection,
//!   replaced wholesale on each fetch (`DashMap` + `tokio::sync::watch`).
//!   Collections with an open reorder session are pinned against
//!   background refresh.
//!
//! - **[`ReorderSession`]**: the unsaved edit buffer. Frozen `original`
//!   plus a `working` order that absorbs each drag.
//!
//! - **[`RenumberTransaction`]**: the `(old, new, payload)` triples that
//!   realise a working order, built under a [`NumberingPolicy`]
//!   (permutation for firewall chains, compaction for policy lists).
//!
//! - **[`ReorderController`]**: the Clean / Dirty / Saving state machine
//!   that owns a session, submits the transaction as one request through a
//!   [`RuleBackend`], and re-reads the collection afterwards.
//!
//! - **[`Console`]**: facade tying the HTTP client, the stores and the
//!   periodic refresh task together.

pub mod backend;
pub mod config;
pub mod console;
mod convert;
pub mod error;
pub mod model;
pub mod renumber;
pub mod reorder;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{ApiBackend, RuleBackend};
pub use config::{ConsoleConfig, TlsVerification};
pub use console::Console;
pub use error::CoreError;
pub use renumber::{NumberingPolicy, RenumberEntry, RenumberTransaction};
pub use reorder::{BeginSave, DragOutcome, PendingSave, ReorderController, ReorderPhase, SaveOutcome};
pub use session::{ReorderSession, resolve_drag};
pub use store::{RefreshSummary, RuleStore, RuleStores, RuleStream, StoredCollection};

pub use model::{
    CollectionIdentity, CollectionKind, ExtCommunityList, FirewallChain, IpProtocol,
    LocalRouteFamily, LocalRoutePolicy, Rule, RuleNumber, RulePayload,
};
