use crate::config;
use crate::events::AppEvent;
use async_channel::Sender;
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::runtime::Runtime;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Shared runtime for the crate's background tasks (slider polling
/// loop, config watcher). Built lazily on first use.
pub(crate) fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("rondel-services")
            .enable_all()
            .build()
            .expect("Failed to create Tokio runtime")
    })
}

/// Watch the persisted field store for out-of-band edits, forwarding
/// `AppEvent::ConfigReload` to the host's event loop.
pub fn start_background_services(store_path: PathBuf, tx: Sender<AppEvent>) {
    runtime().spawn(config::run_async_watcher(store_path, tx));
}
