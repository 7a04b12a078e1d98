use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{patch, post},
};
use axum_valid::Valid;

use crate::{
    dto::game::{CreateGameRequest, CreatedGameResponse, GameView, UpdateGameRequest},
    error::AppError,
    services::game_service,
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Catalog management endpoints, guarded by the configured admin token.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/games", post(create_game))
        .route("/admin/games/{id}", patch(update_game).delete(delete_game))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Add a game to the catalog.
#[utoipa::path(
    post,
    path = "/admin/games",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token")),
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = CreatedGameResponse),
        (status = 400, description = "Invalid game data"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<(StatusCode, Json<CreatedGameResponse>), AppError> {
    let created = game_service::add_game(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Change some fields of a game; omitted fields are left untouched.
#[utoipa::path(
    patch,
    path = "/admin/games/{id}",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Configured admin token"),
        ("id" = String, Path, description = "Game identifier")
    ),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Updated game", body = GameView),
        (status = 400, description = "Invalid or empty update"),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UpdateGameRequest>>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(game_service::update_game(&state, &id, payload).await?))
}

/// Remove a game. Unknown ids are accepted.
#[utoipa::path(
    delete,
    path = "/admin/games/{id}",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Configured admin token"),
        ("id" = String, Path, description = "Game identifier")
    ),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    game_service::delete_game(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    match state.config().admin_token() {
        Some(expected) if expected == provided => Ok(next.run(req).await),
        Some(_) => Err(AppError::Unauthorized("invalid admin token".into())),
        None => Err(AppError::Unauthorized(
            "admin access is disabled: no admin token configured".into(),
        )),
    }
}
