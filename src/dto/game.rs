use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{GameEntity, GamePatch, KeyboardControlEntity, NewGameEntity},
    dto::{
        format_system_time,
        validation::{validate_keyboard_controls, validate_not_blank, validate_optional_url},
    },
};

/// Input binding displayed on the game page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct KeyboardControlDto {
    /// Key name as reported by the browser (`w`, `ArrowUp`, `Space`...).
    pub key: String,
    /// What the key does in the game.
    pub action: String,
}

impl From<KeyboardControlDto> for KeyboardControlEntity {
    fn from(value: KeyboardControlDto) -> Self {
        Self {
            key: value.key.trim().to_owned(),
            action: value.action.trim().to_owned(),
        }
    }
}

impl From<KeyboardControlEntity> for KeyboardControlDto {
    fn from(value: KeyboardControlEntity) -> Self {
        Self {
            key: value.key,
            action: value.action,
        }
    }
}

/// Payload used by administrators to add a game to the catalog.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateGameRequest {
    /// Display title, must not be blank.
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Absolute URL of the embedded game.
    #[validate(url)]
    pub url: String,
    /// Preview image URL, empty when the game has none.
    #[serde(default)]
    #[validate(custom(function = "validate_optional_url"))]
    pub thumbnail: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// Search tags; blank entries are dropped. Defaults to no tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Highlight the game on the home page.
    #[serde(default)]
    pub featured: bool,
    /// Ordered input bindings with unique keys.
    #[serde(default)]
    #[validate(custom(function = "validate_keyboard_controls"))]
    pub keyboard_controls: Vec<KeyboardControlDto>,
}

impl From<CreateGameRequest> for NewGameEntity {
    fn from(value: CreateGameRequest) -> Self {
        Self {
            title: value.title.trim().to_owned(),
            description: value.description,
            url: value.url,
            thumbnail: value.thumbnail,
            category: value.category.trim().to_owned(),
            tags: normalize_tags(value.tags),
            featured: value.featured,
            keyboard_controls: value.keyboard_controls.into_iter().map(Into::into).collect(),
        }
    }
}

/// Partial update of a game. Omitted fields keep their stored value.
///
/// Identifier, creation date and counters are not patchable; sending them is rejected.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateGameRequest {
    /// New title, must not be blank.
    #[validate(custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New game URL.
    #[validate(url)]
    pub url: Option<String>,
    /// New preview image URL, empty to remove it.
    #[validate(custom(function = "validate_optional_url"))]
    pub thumbnail: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// Replaces the whole tag list when present; an empty list clears it.
    pub tags: Option<Vec<String>>,
    /// New highlight flag.
    pub featured: Option<bool>,
    /// Replaces every input binding.
    #[validate(custom(function = "validate_keyboard_controls"))]
    pub keyboard_controls: Option<Vec<KeyboardControlDto>>,
}

impl From<UpdateGameRequest> for GamePatch {
    fn from(value: UpdateGameRequest) -> Self {
        Self {
            title: value.title.map(|title| title.trim().to_owned()),
            description: value.description,
            url: value.url,
            thumbnail: value.thumbnail,
            category: value.category.map(|category| category.trim().to_owned()),
            tags: value.tags.map(normalize_tags),
            featured: value.featured,
            keyboard_controls: value
                .keyboard_controls
                .map(|controls| controls.into_iter().map(Into::into).collect()),
        }
    }
}

/// A single user rating.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RateGameRequest {
    /// Stars between 0 and 5.
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
}

/// Identifier of a freshly created game.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedGameResponse {
    /// Store-assigned identifier.
    pub id: String,
}

/// Public projection of a game, shaped like the web client's `Game` type.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Store-assigned identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// URL of the embedded game.
    pub url: String,
    /// Preview image URL, empty when absent.
    pub thumbnail: String,
    /// Category label.
    pub category: String,
    /// Search tags.
    pub tags: Vec<String>,
    /// Highlighted on the home page.
    pub featured: bool,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp.
    pub updated_at: String,
    /// Number of recorded plays.
    pub play_count: u64,
    /// Mean of every rating, 0 when unrated.
    pub rating: f64,
    /// Number of ratings behind `rating`.
    pub rating_count: u64,
    /// Ordered input bindings.
    pub keyboard_controls: Vec<KeyboardControlDto>,
}

impl From<GameEntity> for GameView {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            title: game.title,
            description: game.description,
            url: game.url,
            thumbnail: game.thumbnail,
            category: game.category,
            tags: game.tags,
            featured: game.featured,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
            play_count: game.play_count,
            rating: game.rating,
            rating_count: game.rating_count,
            keyboard_controls: game.keyboard_controls.into_iter().map(Into::into).collect(),
        }
    }
}

/// Trim tags and drop the blank ones, keeping order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_owned())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_request_defaults_optional_fields() {
        let request: CreateGameRequest = serde_json::from_value(json!({
            "title": "A",
            "url": "https://games.example/a"
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let entity = NewGameEntity::from(request);
        assert!(entity.tags.is_empty());
        assert!(entity.keyboard_controls.is_empty());
        assert!(!entity.featured);
    }

    #[test]
    fn create_request_normalizes_tags() {
        let request: CreateGameRequest = serde_json::from_value(json!({
            "title": "A",
            "url": "https://games.example/a",
            "tags": [" fun ", "", "  ", "retro"]
        }))
        .unwrap();
        let entity = NewGameEntity::from(request);
        assert_eq!(entity.tags, vec!["fun".to_string(), "retro".to_string()]);
    }

    #[test]
    fn create_request_rejects_bad_input() {
        let request: CreateGameRequest = serde_json::from_value(json!({
            "title": "  ",
            "url": "nope",
            "thumbnail": "also nope",
            "keyboardControls": [{"key": "w", "action": "Up"}, {"key": "W", "action": "Jump"}]
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("url"));
        assert!(fields.contains_key("thumbnail"));
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn update_request_rejects_counter_fields() {
        let result = serde_json::from_value::<UpdateGameRequest>(json!({
            "title": "X",
            "playCount": 100
        }));
        assert!(result.is_err());
    }

    #[test]
    fn update_request_leaves_omitted_fields_unset() {
        let request: UpdateGameRequest = serde_json::from_value(json!({"title": "X"})).unwrap();
        let patch = GamePatch::from(request);
        assert_eq!(patch.title.as_deref(), Some("X"));
        assert!(patch.tags.is_none());
        assert!(patch.featured.is_none());
    }

    #[test]
    fn rating_outside_range_is_rejected() {
        assert!(RateGameRequest { rating: 4.5 }.validate().is_ok());
        assert!(RateGameRequest { rating: 0.0 }.validate().is_ok());
        assert!(RateGameRequest { rating: 5.5 }.validate().is_err());
        assert!(RateGameRequest { rating: -1.0 }.validate().is_err());
    }

    #[test]
    fn view_uses_camel_case_keys() {
        let game = NewGameEntity {
            title: "A".into(),
            description: String::new(),
            url: "https://games.example/a".into(),
            thumbnail: String::new(),
            category: "Puzzle".into(),
            tags: vec!["fun".into()],
            featured: true,
            keyboard_controls: vec![],
        }
        .into_entity("g1".into(), std::time::SystemTime::UNIX_EPOCH);

        let value = serde_json::to_value(GameView::from(game)).unwrap();
        assert_eq!(value["playCount"], json!(0));
        assert_eq!(value["ratingCount"], json!(0));
        assert_eq!(value["createdAt"], json!("1970-01-01T00:00:00Z"));
        assert_eq!(value["keyboardControls"], json!([]));
    }
}
