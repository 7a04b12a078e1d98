//! Access layer over the installed [`GameStore`](crate::dao::game_store::GameStore).
//!
//! Every operation resolves the store from the shared state, so a missing
//! backend surfaces as [`ServiceError::Degraded`] instead of empty data.

use std::time::SystemTime;

use tracing::{debug, info};

use crate::{
    dao::models::{GameEntity, GamePatch, NewGameEntity},
    dto::game::{CreateGameRequest, CreatedGameResponse, GameView, UpdateGameRequest},
    error::ServiceError,
    state::SharedState,
};

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("game `{id}` not found"))
}

/// Persist a new game and return its store-assigned identifier.
pub async fn add_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<CreatedGameResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let game: NewGameEntity = request.into();
    let created = store.create_game(game, SystemTime::now()).await?;
    info!(id = %created.id, title = %created.title, "game added");
    Ok(CreatedGameResponse { id: created.id })
}

/// Raw records, used by the catalog before projecting them.
pub(crate) async fn all_entities(state: &SharedState) -> Result<Vec<GameEntity>, ServiceError> {
    let store = state.require_game_store().await?;
    Ok(store.list_games().await?)
}

/// Every game in the catalog, in no particular order.
pub async fn get_all_games(state: &SharedState) -> Result<Vec<GameView>, ServiceError> {
    let games = all_entities(state).await?;
    debug!(count = games.len(), "listed games");
    Ok(games.into_iter().map(GameView::from).collect())
}

/// Games flagged as featured.
pub async fn get_featured_games(state: &SharedState) -> Result<Vec<GameView>, ServiceError> {
    let games = all_entities(state).await?;
    Ok(games
        .into_iter()
        .filter(|game| game.featured)
        .map(GameView::from)
        .collect())
}

/// The game stored under `id`; an unknown id is `Ok(None)`, not an error.
pub async fn get_game_by_id(
    state: &SharedState,
    id: &str,
) -> Result<Option<GameView>, ServiceError> {
    let store = state.require_game_store().await?;
    Ok(store.find_game(id).await?.map(GameView::from))
}

/// Merge the provided fields into an existing game.
///
/// Fields absent from `request` keep their stored value; an empty request is rejected.
pub async fn update_game(
    state: &SharedState,
    id: &str,
    request: UpdateGameRequest,
) -> Result<GameView, ServiceError> {
    let patch: GamePatch = request.into();
    if patch.is_empty() {
        return Err(ServiceError::InvalidInput(
            "update must change at least one field".into(),
        ));
    }

    let store = state.require_game_store().await?;
    let updated = store
        .update_game(id, patch, SystemTime::now())
        .await?
        .ok_or_else(|| not_found(id))?;
    info!(id = %id, "game updated");
    Ok(updated.into())
}

/// Hard-delete a game. Deleting an unknown id succeeds.
pub async fn delete_game(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    let store = state.require_game_store().await?;
    if store.delete_game(id).await? {
        info!(id = %id, "game deleted");
    } else {
        debug!(id = %id, "delete requested for unknown game");
    }
    Ok(())
}

/// Count one more play of the game.
pub async fn increment_play_count(state: &SharedState, id: &str) -> Result<GameView, ServiceError> {
    let store = state.require_game_store().await?;
    let updated = store
        .increment_play_count(id, SystemTime::now())
        .await?
        .ok_or_else(|| not_found(id))?;
    debug!(id = %id, play_count = updated.play_count, "play recorded");
    Ok(updated.into())
}

/// Fold `rating` into the game's running mean.
pub async fn rate_game(
    state: &SharedState,
    id: &str,
    rating: f64,
) -> Result<GameView, ServiceError> {
    if !rating.is_finite() || rating < 0.0 {
        return Err(ServiceError::InvalidInput(format!(
            "rating must be a non-negative number, got {rating}"
        )));
    }

    let store = state.require_game_store().await?;
    let updated = store
        .record_rating(id, rating, SystemTime::now())
        .await?
        .ok_or_else(|| not_found(id))?;
    debug!(
        id = %id,
        rating = updated.rating,
        rating_count = updated.rating_count,
        "rating recorded"
    );
    Ok(updated.into())
}
