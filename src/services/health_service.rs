use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the installed store and report whether the service is degraded.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_game_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    HealthResponse::new(
        state.is_degraded().await,
        state.config().storage().as_str(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::game_store::memory::InMemoryGameStore,
        dto::health::HealthStatus,
        state::AppState,
    };

    #[tokio::test]
    async fn reports_degraded_without_store() {
        let state = AppState::new(AppConfig::default());
        let health = health_status(&state).await;
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.storage, "firebase");
    }

    #[tokio::test]
    async fn reports_ok_with_healthy_store() {
        let state =
            AppState::with_game_store(AppConfig::default(), Arc::new(InMemoryGameStore::new()));
        assert_eq!(health_status(&state).await.status, HealthStatus::Ok);
    }
}
