//! Session Registry - owns every live interpreter session

use crate::cleanup::CleanupScheduler;
use crate::session::{ExecutionOutput, InterpreterSession, SessionId};
use parking_lot::{Mutex, RwLock};
use repl_foundation::{Error, Result, SessionSettings};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Configuration for the session registry
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle time after which a session is evicted
    pub idle_timeout: Duration,

    /// Time between cleanup sweeps
    pub sweep_interval: Duration,

    /// Interpreter executable started for each session
    pub interpreter: String,
}

impl SessionConfig {
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self {
            idle_timeout: settings.idle_timeout(),
            sweep_interval: settings.sweep_interval(),
            interpreter: settings.interpreter().to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(&SessionSettings::default())
    }
}

/// One registry entry.
///
/// `last_active` sits outside the session lock so the sweep can read it
/// while an execution is in flight.
struct SessionSlot {
    last_active: Mutex<Instant>,
    session: tokio::sync::Mutex<InterpreterSession>,
}

impl SessionSlot {
    fn touch(&self) {
        *self.last_active.lock() = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_active.lock())
    }
}

pub(crate) struct RegistryInner {
    sessions: RwLock<HashMap<SessionId, Arc<SessionSlot>>>,
    config: SessionConfig,
}

impl RegistryInner {
    /// Evict idle sessions; returns how many were removed.
    ///
    /// A session with an execution in flight is never evicted.
    pub(crate) fn sweep(&self) -> usize {
        let now = Instant::now();
        let idle_timeout = self.config.idle_timeout;

        let evicted: Vec<Arc<SessionSlot>> = {
            let mut sessions = self.sessions.write();
            let expired: Vec<SessionId> = sessions
                .iter()
                .filter(|(id, slot)| {
                    if slot.idle_for(now) <= idle_timeout {
                        return false;
                    }
                    if slot.session.try_lock().is_err() {
                        debug!("Session {} is idle but busy, keeping it", id);
                        return false;
                    }
                    true
                })
                .map(|(id, _)| *id)
                .collect();

            expired
                .iter()
                .filter_map(|id| {
                    info!("Evicting idle session {}", id);
                    sessions.remove(id)
                })
                .collect()
        };

        // Workers are killed here, outside the map lock
        let count = evicted.len();
        drop(evicted);
        count
    }
}

/// Session Registry
///
/// Cheap to clone; every clone refers to the same set of sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
    scheduler: Arc<CleanupScheduler>,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                sessions: RwLock::new(HashMap::new()),
                config,
            }),
            scheduler: Arc::new(CleanupScheduler::default()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Start the cleanup scheduler. Calling it again while running is a no-op.
    pub fn start(&self) {
        self.scheduler
            .start(Arc::downgrade(&self.inner), self.inner.config.sweep_interval);
    }

    /// Cancel the cleanup scheduler, wait for it, then drop every session.
    pub async fn stop(&self) {
        self.scheduler.stop().await;

        let sessions: Vec<_> = self.inner.sessions.write().drain().collect();
        if !sessions.is_empty() {
            info!("Closing {} session(s)", sessions.len());
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Allocate a new session with an empty namespace
    pub fn create_session(&self) -> SessionId {
        let id = SessionId::new();
        let slot = Arc::new(SessionSlot {
            last_active: Mutex::new(Instant::now()),
            session: tokio::sync::Mutex::new(InterpreterSession::new(
                id,
                self.inner.config.interpreter.clone(),
            )),
        });

        self.inner.sessions.write().insert(id, slot);
        info!("Created session {}", id);
        id
    }

    /// Run code in a session.
    ///
    /// Calls on the same session run one at a time in arrival order; calls
    /// on different sessions don't wait on each other.
    pub async fn execute(&self, id: SessionId, code: &str) -> Result<ExecutionOutput> {
        let slot = self.checkout(id)?;
        let mut session = slot.session.lock().await;
        Ok(session.execute(code).await)
    }

    /// Look up a slot and mark it active under the same read guard, so a
    /// sweep sees either no entry or a fresh timestamp
    fn checkout(&self, id: SessionId) -> Result<Arc<SessionSlot>> {
        let sessions = self.inner.sessions.read();
        let slot = sessions
            .get(&id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;
        slot.touch();
        Ok(Arc::clone(slot))
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.inner.sessions.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.sessions.read().is_empty()
    }

    /// One cleanup pass; returns the number of evicted sessions
    pub fn sweep(&self) -> usize {
        self.inner.sweep()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(SessionConfig {
            idle_timeout: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
            interpreter: "python3".into(),
        })
    }

    #[test]
    fn test_create_sessions_are_distinct() {
        let registry = registry();
        let a = registry.create_session();
        let b = registry.create_session();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(a));
    }

    #[tokio::test]
    async fn test_execute_unknown_session() {
        let registry = registry();
        let err = registry.execute(SessionId::new(), "1").await.unwrap_err();
        assert!(err.is_lookup());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_only_idle() {
        let registry = registry();
        let old = registry.create_session();

        tokio::time::advance(Duration::from_secs(200)).await;
        let recent = registry.create_session();
        assert_eq!(registry.sweep(), 0);

        tokio::time::advance(Duration::from_secs(101)).await;
        assert_eq!(registry.sweep(), 1);
        assert!(!registry.contains(old));
        assert!(registry.contains(recent));

        let err = registry.execute(old, "1").await.unwrap_err();
        assert!(err.is_lookup());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_skips_busy_session() {
        let registry = registry();
        let id = registry.create_session();
        let slot = registry.inner.sessions.read().get(&id).cloned().unwrap();

        let guard = slot.session.lock().await;
        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(registry.sweep(), 0);
        assert!(registry.contains(id));

        drop(guard);
        assert_eq!(registry.sweep(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_refreshes_before_sweep() {
        let registry = registry();
        let id = registry.create_session();
        tokio::time::advance(Duration::from_secs(301)).await;

        // Resolved but not yet locked: a sweep must not evict it
        let slot = registry.checkout(id).unwrap();
        assert_eq!(registry.sweep(), 0);
        assert!(registry.contains(id));
        assert_eq!(slot.idle_for(Instant::now()), Duration::ZERO);

        assert!(matches!(
            registry.checkout(SessionId::new()),
            Err(e) if e.is_lookup()
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_evicts_in_background() {
        let registry = registry();
        registry.start();
        assert!(registry.is_running());

        let id = registry.create_session();
        // Sweeps at 60..300 keep it, the one at 360 evicts it
        tokio::time::sleep(Duration::from_secs(330)).await;
        assert!(registry.contains(id));
        tokio::time::sleep(Duration::from_secs(40)).await;
        assert!(!registry.contains(id));

        registry.stop().await;
        assert!(!registry.is_running());
    }

    #[tokio::test]
    async fn test_start_twice_and_stop_unstarted() {
        let registry = registry();
        registry.stop().await;
        assert!(!registry.is_running());

        registry.start();
        registry.start();
        assert!(registry.is_running());

        registry.stop().await;
        registry.stop().await;
        assert!(!registry.is_running());
    }

    #[tokio::test]
    async fn test_stop_drops_sessions() {
        let registry = registry();
        registry.start();
        registry.create_session();
        registry.stop().await;
        assert!(registry.is_empty());
    }
}
