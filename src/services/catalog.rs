//! Catalog browsing: search, filtering and ordering on top of the full game list.

use std::cmp::Reverse;

use crate::{
    dao::models::GameEntity,
    dto::{
        game::GameView,
        query::{GameListQuery, SortOrder},
    },
    error::ServiceError,
    services::game_service,
    state::SharedState,
};

/// Games matching `query`, in the requested order.
pub async fn list_games(
    state: &SharedState,
    query: GameListQuery,
) -> Result<Vec<GameView>, ServiceError> {
    let games = game_service::all_entities(state).await?;
    Ok(apply_query(games, &query)
        .into_iter()
        .map(GameView::from)
        .collect())
}

/// Configured category names.
pub fn list_categories(state: &SharedState) -> Vec<String> {
    state.config().categories().to_vec()
}

fn apply_query(games: Vec<GameEntity>, query: &GameListQuery) -> Vec<GameEntity> {
    let search = non_blank(query.search.as_deref()).map(str::to_lowercase);
    let category = non_blank(query.category.as_deref());

    let mut games = games
        .into_iter()
        .filter(|game| query.featured.is_none_or(|featured| game.featured == featured))
        .filter(|game| category.is_none_or(|category| game.category == category))
        .filter(|game| {
            search
                .as_deref()
                .is_none_or(|needle| matches_search(game, needle))
        })
        .collect::<Vec<_>>();

    match query.sort.unwrap_or_default() {
        SortOrder::Newest => games.sort_by_key(|game| Reverse(game.created_at)),
        SortOrder::Oldest => games.sort_by_key(|game| game.created_at),
        SortOrder::Popular => games.sort_by_key(|game| Reverse(game.play_count)),
        SortOrder::Rating => games.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortOrder::Title => games.sort_by_cached_key(|game| game.title.to_lowercase()),
    }

    games
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// `needle` must already be lowercase.
fn matches_search(game: &GameEntity, needle: &str) -> bool {
    game.title.to_lowercase().contains(needle)
        || game.description.to_lowercase().contains(needle)
        || game
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::{config::AppConfig, dao::models::NewGameEntity, state::AppState};

    fn entity(id: &str, title: &str, category: &str, created_secs: u64) -> GameEntity {
        NewGameEntity {
            title: title.into(),
            description: format!("All about {title}"),
            url: format!("https://games.example/{id}"),
            thumbnail: String::new(),
            category: category.into(),
            tags: vec![],
            featured: false,
            keyboard_controls: vec![],
        }
        .into_entity(
            id.into(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(created_secs),
        )
    }

    fn catalog() -> Vec<GameEntity> {
        let mut snake = entity("g1", "Snake", "Arcade", 10);
        snake.tags = vec!["Retro".into()];
        snake.play_count = 7;
        snake.rating = 3.5;

        let mut chess = entity("g2", "chess", "Strategy", 30);
        chess.featured = true;
        chess.play_count = 2;
        chess.rating = 4.8;

        let mut racer = entity("g3", "Racer", "Racing", 20);
        racer.play_count = 12;
        racer.rating = 1.0;

        vec![snake, chess, racer]
    }

    fn ids(games: &[GameEntity]) -> Vec<&str> {
        games.iter().map(|game| game.id.as_str()).collect()
    }

    #[test]
    fn default_order_is_newest_first() {
        let games = apply_query(catalog(), &GameListQuery::default());
        assert_eq!(ids(&games), ["g2", "g3", "g1"]);
    }

    #[test]
    fn each_sort_order() {
        let sorted = |sort| {
            let query = GameListQuery {
                sort: Some(sort),
                ..GameListQuery::default()
            };
            apply_query(catalog(), &query)
        };

        assert_eq!(ids(&sorted(SortOrder::Oldest)), ["g1", "g3", "g2"]);
        assert_eq!(ids(&sorted(SortOrder::Popular)), ["g3", "g1", "g2"]);
        assert_eq!(ids(&sorted(SortOrder::Rating)), ["g2", "g1", "g3"]);
        assert_eq!(ids(&sorted(SortOrder::Title)), ["g2", "g3", "g1"]);
    }

    #[test]
    fn search_matches_title_description_and_tags_case_insensitively() {
        let search = |text: &str| {
            let query = GameListQuery {
                search: Some(text.into()),
                ..GameListQuery::default()
            };
            apply_query(catalog(), &query)
        };

        assert_eq!(ids(&search("SNA")), ["g1"]);
        assert_eq!(ids(&search("retro")), ["g1"]);
        assert_eq!(ids(&search("about racer")), ["g3"]);
        assert!(search("tetris").is_empty());
        assert_eq!(search("   ").len(), 3);
    }

    #[test]
    fn category_and_featured_filters() {
        let query = GameListQuery {
            category: Some("Racing".into()),
            ..GameListQuery::default()
        };
        assert_eq!(ids(&apply_query(catalog(), &query)), ["g3"]);

        let query = GameListQuery {
            featured: Some(true),
            ..GameListQuery::default()
        };
        assert_eq!(ids(&apply_query(catalog(), &query)), ["g2"]);

        let query = GameListQuery {
            featured: Some(false),
            sort: Some(SortOrder::Oldest),
            ..GameListQuery::default()
        };
        assert_eq!(ids(&apply_query(catalog(), &query)), ["g1", "g3"]);
    }

    #[test]
    fn categories_come_from_config() {
        let state = AppState::new(AppConfig::default());
        let categories = list_categories(&state);
        assert!(categories.contains(&"Puzzle".to_string()));
        assert_eq!(categories.len(), 8);
    }
}
