use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use job_board::api::Backend;
use job_board::board::{InMemoryBoardRepository, JobBoardService};
use job_board::config::{AuthConfig, LedgerConfig};
use job_board::session::SessionRegistry;
use job_board::talent::{InMemoryLedgerStore, InMemoryProfileStore, TalentService};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryBackend =
    Backend<InMemoryBoardRepository, InMemoryProfileStore, InMemoryLedgerStore>;

/// Wire every service over process-local stores.
pub(crate) fn memory_backend(auth: &AuthConfig, ledger: LedgerConfig) -> MemoryBackend {
    Backend {
        registry: Arc::new(SessionRegistry::new(auth)),
        board: Arc::new(JobBoardService::new(Arc::new(
            InMemoryBoardRepository::default(),
        ))),
        talent: Arc::new(TalentService::new(
            Arc::new(InMemoryProfileStore::default()),
            Arc::new(InMemoryLedgerStore::new(ledger.unlock_cost)),
        )),
    }
}
