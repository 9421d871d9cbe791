// ── Console facade ──
//
// Connection to one appliance: the HTTP client, one rule store per
// collection kind, and an optional background task that keeps loaded,
// unpinned collections fresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ordinal_api::{ConsoleClient, TlsMode, TransportConfig};

use crate::backend::{ApiBackend, RuleBackend};
use crate::config::{ConsoleConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::Rule;
use crate::reorder::ReorderController;
use crate::store::{RefreshSummary, RuleStores, StoredCollection};

/// Entry point for consumers.
///
/// Cheaply cloneable. Creating a `Console` does no I/O; collections are
/// fetched on first [`load`](Self::load) or controller use.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    backend: Arc<ApiBackend>,
    stores: RuleStores,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Console {
    pub fn new(config: ConsoleConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = ConsoleClient::from_api_key(config.url.as_str(), &config.api_key, &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Build around an existing client (tests, custom transports).
    pub fn with_client(config: ConsoleConfig, client: ConsoleClient) -> Self {
        Self {
            inner: Arc::new(ConsoleInner {
                config,
                backend: Arc::new(ApiBackend::new(Arc::new(client))),
                stores: RuleStores::new(),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    pub fn stores(&self) -> &RuleStores {
        &self.inner.stores
    }

    pub fn backend(&self) -> &Arc<ApiBackend> {
        &self.inner.backend
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the background refresh task, if an interval is configured.
    pub async fn start(&self) {
        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs == 0 {
            debug!("background refresh disabled");
            return;
        }

        let console = self.clone();
        let cancel = self.inner.cancel.child_token();
        self.inner
            .task_handles
            .lock()
            .await
            .push(tokio::spawn(refresh_task(console, interval_secs, cancel)));
        info!(interval_secs, "background refresh started");
    }

    /// Stop background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("console shut down");
    }

    // ── Collections ──────────────────────────────────────────────────

    /// Fetch (or return the cached) rule sequence for `identity`.
    pub async fn load<I>(&self, identity: &I, force_refresh: bool) -> Result<Arc<Vec<Rule>>, CoreError>
    where
        I: StoredCollection,
        ApiBackend: RuleBackend<I>,
    {
        self.inner
            .stores
            .of::<I>()
            .load(self.inner.backend.as_ref(), identity, force_refresh)
            .await
    }

    /// A reorder controller bound to `identity`, sharing this console's
    /// store and client.
    pub fn reorder<I>(&self, identity: I) -> ReorderController<I, ApiBackend>
    where
        I: StoredCollection,
        ApiBackend: RuleBackend<I>,
    {
        ReorderController::new(
            identity,
            Arc::clone(self.inner.stores.of::<I>()),
            Arc::clone(&self.inner.backend),
        )
    }

    /// Refetch every loaded collection that has no open reorder session.
    pub async fn refresh_all(&self) -> RefreshSummary {
        let backend = self.inner.backend.as_ref();
        let stores = &self.inner.stores;

        let mut summary = stores.firewall_chains.refresh_background(backend).await;
        summary += stores.local_routes.refresh_background(backend).await;
        summary += stores.ext_community_lists.refresh_background(backend).await;
        summary
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn refresh_task(console: Console, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let summary = console.refresh_all().await;
                if summary.failed > 0 {
                    warn!(failed = summary.failed, "periodic refresh had failures");
                } else {
                    debug!(
                        refreshed = summary.refreshed,
                        skipped = summary.skipped,
                        "periodic refresh complete"
                    );
                }
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &ConsoleConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}
