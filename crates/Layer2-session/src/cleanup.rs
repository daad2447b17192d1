//! Cleanup scheduler - periodic idle-session sweep

use crate::registry::RegistryInner;
use parking_lot::Mutex;
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Owns the background sweep loop.
///
/// The loop holds only a weak reference to the registry and exits on its own
/// once the registry is gone.
#[derive(Default)]
pub(crate) struct CleanupScheduler {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CleanupScheduler {
    /// Spawn the loop. No-op while a loop is already running.
    pub(crate) fn start(&self, registry: Weak<RegistryInner>, interval: Duration) -> bool {
        let mut handle = self.handle.lock();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("Cleanup scheduler already running");
            return false;
        }

        *handle = Some(tokio::spawn(sweep_loop(registry, interval)));
        info!("Cleanup scheduler started (every {:?})", interval);
        true
    }

    /// Cancel the loop and wait for it to wind down. No-op if never started.
    pub(crate) async fn stop(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };

        handle.abort();
        match handle.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!("Cleanup scheduler ended abnormally: {}", e),
        }
        info!("Cleanup scheduler stopped");
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

async fn sweep_loop(registry: Weak<RegistryInner>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;

        let Some(registry) = registry.upgrade() else {
            debug!("Session registry dropped, cleanup loop exiting");
            return;
        };
        let evicted = registry.sweep();
        if evicted > 0 {
            info!("Evicted {} idle session(s)", evicted);
        }
    }
}
