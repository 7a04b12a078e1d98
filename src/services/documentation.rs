use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Yobi Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::list_games,
        crate::routes::game::list_featured_games,
        crate::routes::game::get_game,
        crate::routes::game::play_game,
        crate::routes::game::rate_game,
        crate::routes::game::list_categories,
        crate::routes::admin::create_game,
        crate::routes::admin::update_game,
        crate::routes::admin::delete_game,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::game::GameView,
            crate::dto::game::KeyboardControlDto,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::UpdateGameRequest,
            crate::dto::game::RateGameRequest,
            crate::dto::game::CreatedGameResponse,
            crate::dto::query::SortOrder,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Public catalog browsing, plays and ratings"),
        (name = "admin", description = "Catalog management, requires `X-Admin-Token`"),
    )
)]
/// OpenAPI document of the whole HTTP API.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/healthcheck",
            "/games",
            "/games/featured",
            "/games/{id}",
            "/games/{id}/play",
            "/games/{id}/rating",
            "/categories",
            "/admin/games",
            "/admin/games/{id}",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
