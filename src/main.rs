//! Yobi Back binary entrypoint wiring the REST API to the configured game store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yobi_back::{
    config::{AppConfig, StorageBackend},
    dao::game_store::{GameStore, memory::InMemoryGameStore},
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let backend = config.storage();
    let app_state = AppState::new(config);

    tokio::spawn(log_degraded_transitions(app_state.clone()));
    start_storage(app_state.clone(), backend).await?;

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, storage = %backend, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the memory store right away, or supervise a remote backend in the background.
async fn start_storage(state: SharedState, backend: StorageBackend) -> anyhow::Result<()> {
    match backend {
        StorageBackend::Memory => {
            warn!("using in-memory storage; games are lost on restart");
            state
                .set_game_store(Arc::new(InMemoryGameStore::new()))
                .await;
        }
        #[cfg(feature = "firebase-store")]
        StorageBackend::Firebase => {
            use yobi_back::{
                dao::{
                    game_store::firebase::{FirebaseConfig, FirebaseGameStore},
                    storage::StorageError,
                },
                services::storage_supervisor,
            };

            let firebase = FirebaseConfig::from_env().context("reading Firebase configuration")?;
            tokio::spawn(storage_supervisor::run(state, move || {
                let firebase = firebase.clone();
                async move {
                    FirebaseGameStore::connect(firebase)
                        .await
                        .map(|store| Arc::new(store) as Arc<dyn GameStore>)
                        .map_err(StorageError::from)
                }
            }));
        }
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            use yobi_back::{
                dao::{
                    game_store::mongodb::{MongoConfig, MongoGameStore},
                    storage::StorageError,
                },
                services::storage_supervisor,
            };

            let mongo = MongoConfig::from_env()
                .await
                .context("reading MongoDB configuration")?;
            tokio::spawn(storage_supervisor::run(state, move || {
                let mongo = mongo.clone();
                async move {
                    MongoGameStore::connect(mongo)
                        .await
                        .map(|store| Arc::new(store) as Arc<dyn GameStore>)
                        .map_err(StorageError::from)
                }
            }));
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("storage backend `{other}` is not compiled into this binary"),
    }

    Ok(())
}

/// Log every change of the degraded flag.
async fn log_degraded_transitions(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    while watcher.changed().await.is_ok() {
        if *watcher.borrow_and_update() {
            warn!("service entered degraded mode");
        } else {
            info!("service left degraded mode");
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
