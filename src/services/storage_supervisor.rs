//! Keeps a storage backend installed in the shared state.
//!
//! The supervisor connects in the background, polls the backend's health and
//! flips degraded mode while the connection is lost. After repeated failed
//! reconnects the store is dropped and a fresh connection is attempted.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{game_store::GameStore, storage::StorageError},
    state::SharedState,
};

/// Timing knobs of the supervision loop.
#[derive(Debug, Clone, Copy)]
pub struct SupervisorPolicy {
    /// First backoff delay after a failed connect or reconnect.
    pub initial_delay: Duration,
    /// Upper bound of the doubling backoff.
    pub max_delay: Duration,
    /// Pause between two health checks of a healthy store.
    pub health_poll_interval: Duration,
    /// Reconnects tried before the store is dropped and a fresh connect starts.
    pub max_reconnect_attempts: u32,
}

impl Default for SupervisorPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_secs(10),
            health_poll_interval: Duration::from_secs(5),
            max_reconnect_attempts: 3,
        }
    }
}

/// Exponential backoff capped at the policy maximum.
struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    fn new(policy: &SupervisorPolicy) -> Self {
        Self {
            initial: policy.initial_delay,
            max: policy.max_delay,
            current: policy.initial_delay,
        }
    }

    async fn wait(&mut self) {
        sleep(self.current).await;
        self.current = (self.current * 2).min(self.max);
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Run the supervisor forever with the default timings.
pub async fn run<F, Fut>(state: SharedState, connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn GameStore>, StorageError>> + Send,
{
    run_with_policy(state, connect, SupervisorPolicy::default()).await
}

/// Run the supervisor forever, connecting through `connect` whenever no healthy store is installed.
pub async fn run_with_policy<F, Fut>(state: SharedState, mut connect: F, policy: SupervisorPolicy)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn GameStore>, StorageError>> + Send,
{
    let mut backoff = Backoff::new(&policy);

    loop {
        match connect().await {
            Ok(store) => {
                state.set_game_store(store.clone()).await;
                info!(
                    backend = state.config().storage().as_str(),
                    "storage connection established; leaving degraded mode"
                );
                backoff.reset();

                watch_store(&state, store.as_ref(), &policy).await;

                state.clear_game_store().await;
                warn!("storage dropped after failed reconnects; connecting again");
                backoff.wait().await;
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                backoff.wait().await;
            }
        }
    }
}

/// Poll `store` until it stays unreachable for every reconnect attempt.
async fn watch_store(state: &SharedState, store: &dyn GameStore, policy: &SupervisorPolicy) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded().await {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false).await;
                }
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                if !reconnect(state, store, policy).await {
                    warn!("exhausted storage reconnect attempts; staying in degraded mode");
                    return;
                }
                state.update_degraded(false).await;
            }
        }
        sleep(policy.health_poll_interval).await;
    }
}

async fn reconnect(state: &SharedState, store: &dyn GameStore, policy: &SupervisorPolicy) -> bool {
    let mut backoff = Backoff::new(policy);

    for attempt in 0..policy.max_reconnect_attempts {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    state.update_degraded(true).await;
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                backoff.wait().await;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::atomic::{AtomicU32, Ordering},
    };

    use tokio::time::timeout;

    use super::*;
    use crate::{config::AppConfig, dao::game_store::memory::InMemoryGameStore, state::AppState};

    fn fast_policy() -> SupervisorPolicy {
        SupervisorPolicy {
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            health_poll_interval: Duration::from_millis(10),
            max_reconnect_attempts: 2,
        }
    }

    #[tokio::test]
    async fn installs_store_after_failed_attempts() {
        let state = AppState::new(AppConfig::default());
        let attempts = Arc::new(AtomicU32::new(0));

        let connect = {
            let attempts = attempts.clone();
            move || {
                let attempts = attempts.clone();
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(StorageError::unavailable(
                            "backend down".into(),
                            io::Error::other("refused"),
                        ))
                    } else {
                        Ok(Arc::new(InMemoryGameStore::new()) as Arc<dyn GameStore>)
                    }
                }
            }
        };

        let mut degraded = state.degraded_watcher();
        let task = tokio::spawn(run_with_policy(state.clone(), connect, fast_policy()));

        timeout(Duration::from_secs(2), degraded.wait_for(|value| !*value))
            .await
            .expect("supervisor should leave degraded mode")
            .unwrap();
        task.abort();

        assert!(state.game_store().await.is_some());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn backoff_doubles_up_to_the_cap() {
        let mut backoff = Backoff::new(&fast_policy());
        backoff.wait().await;
        assert_eq!(backoff.current, Duration::from_millis(10));
        backoff.wait().await;
        backoff.wait().await;
        assert_eq!(backoff.current, Duration::from_millis(20));
        backoff.reset();
        assert_eq!(backoff.current, Duration::from_millis(5));
    }
}
