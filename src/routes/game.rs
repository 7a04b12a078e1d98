use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        game::{GameView, RateGameRequest},
        query::GameListQuery,
    },
    error::AppError,
    services::{catalog, game_service},
    state::SharedState,
};

/// Public catalog routes: browsing, play counting and rating.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/featured", get(list_featured_games))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/play", post(play_game))
        .route("/games/{id}/rating", post(rate_game))
        .route("/categories", get(list_categories))
}

/// Browse the catalog with optional search, filters and ordering.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    params(GameListQuery),
    responses(
        (status = 200, description = "Matching games", body = [GameView]),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Query(query): Query<GameListQuery>,
) -> Result<Json<Vec<GameView>>, AppError> {
    Ok(Json(catalog::list_games(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/games/featured",
    tag = "games",
    responses(
        (status = 200, description = "Featured games", body = [GameView]),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn list_featured_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameView>>, AppError> {
    Ok(Json(game_service::get_featured_games(&state).await?))
}

/// Fetch a single game.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game", body = GameView),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameView>, AppError> {
    game_service::get_game_by_id(&state, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("game `{id}` not found")))
}

/// Record that the game was started.
#[utoipa::path(
    post,
    path = "/games/{id}/play",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Updated game", body = GameView),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn play_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(game_service::increment_play_count(&state, &id).await?))
}

/// Submit a rating between 0 and 5.
#[utoipa::path(
    post,
    path = "/games/{id}/rating",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = RateGameRequest,
    responses(
        (status = 200, description = "Updated game", body = GameView),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn rate_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<RateGameRequest>>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(
        game_service::rate_game(&state, &id, payload.rating).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = "games",
    responses((status = 200, description = "Known categories", body = [String]))
)]
pub async fn list_categories(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(catalog::list_categories(&state))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig, dao::game_store::memory::InMemoryGameStore, state::AppState,
    };

    async fn seeded() -> (Router, String) {
        let state =
            AppState::with_game_store(AppConfig::default(), Arc::new(InMemoryGameStore::new()));
        let request = serde_json::from_value(json!({
            "title": "Snake",
            "url": "https://games.example/snake",
            "category": "Arcade"
        }))
        .unwrap();
        let id = game_service::add_game(&state, request).await.unwrap().id;
        (router().with_state(state), id)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unknown_game_is_404() {
        let (app, _) = seeded().await;
        let response = app
            .oneshot(Request::get("/games/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rating_round_trip_through_http() {
        let (app, id) = seeded().await;
        let response = app
            .oneshot(
                Request::post(format!("/games/{id}/rating"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"rating": 4}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["rating"], json!(4.0));
        assert_eq!(body["ratingCount"], json!(1));
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let (app, id) = seeded().await;
        let response = app
            .oneshot(
                Request::post(format!("/games/{id}/rating"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"rating": 9}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn degraded_listing_is_503() {
        let app = router().with_state(AppState::new(AppConfig::default()));
        let response = app
            .oneshot(Request::get("/games").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn listing_accepts_query_filters() {
        let (app, id) = seeded().await;
        let response = app
            .oneshot(
                Request::get("/games?search=snake&category=Arcade&sort=popular")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["id"], json!(id));
    }
}
