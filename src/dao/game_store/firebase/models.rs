use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

use crate::dao::models::{GameEntity, KeyboardControlEntity, NewGameEntity};

/// Node holding every game, keyed by push id.
pub const GAMES_PATH: &str = "games";

/// Characters Firebase refuses inside a key.
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '$', '#', '[', ']', '/'];

/// Answer to a `POST` on a list: the generated push id.
#[derive(Debug, Deserialize)]
pub struct PushResponse {
    /// Key of the new child.
    pub name: String,
}

/// Game node stored under `games/{id}`.
///
/// Firebase drops empty arrays and `null` values, so every optional field
/// tolerates being absent.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseGameDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub category: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub featured: bool,
    #[serde(default, with = "super::timestamp")]
    pub created_at: Option<SystemTime>,
    #[serde(default, with = "super::timestamp")]
    pub updated_at: Option<SystemTime>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub play_count: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub rating: f64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub rating_count: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub keyboard_controls: Vec<KeyboardControlEntity>,
}

impl FirebaseGameDocument {
    /// Document written for a freshly created game.
    pub fn new_game(game: NewGameEntity, now: SystemTime) -> Self {
        Self {
            title: game.title,
            description: game.description,
            url: game.url,
            thumbnail: game.thumbnail,
            category: game.category,
            tags: game.tags,
            featured: game.featured,
            created_at: Some(now),
            updated_at: Some(now),
            play_count: 0,
            rating: 0.0,
            rating_count: 0,
            keyboard_controls: game.keyboard_controls,
        }
    }

    /// Convert into an entity; missing timestamps read as `now`.
    pub fn into_entity(self, id: String, now: SystemTime) -> GameEntity {
        GameEntity {
            id,
            title: self.title,
            description: self.description,
            url: self.url,
            thumbnail: self.thumbnail,
            category: self.category,
            tags: self.tags,
            featured: self.featured,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
            play_count: self.play_count,
            rating: self.rating,
            rating_count: self.rating_count,
            keyboard_controls: self.keyboard_controls,
        }
    }
}

impl From<GameEntity> for FirebaseGameDocument {
    fn from(game: GameEntity) -> Self {
        Self {
            title: game.title,
            description: game.description,
            url: game.url,
            thumbnail: game.thumbnail,
            category: game.category,
            tags: game.tags,
            featured: game.featured,
            created_at: Some(game.created_at),
            updated_at: Some(game.updated_at),
            play_count: game.play_count,
            rating: game.rating,
            rating_count: game.rating_count,
            keyboard_controls: game.keyboard_controls,
        }
    }
}

/// Whether `id` can be used as a single path segment.
pub fn is_valid_key(id: &str) -> bool {
    !id.is_empty() && !id.contains(FORBIDDEN_KEY_CHARS) && !id.chars().any(char::is_control)
}

/// Node of a single game.
pub fn game_path(id: &str) -> String {
    format!("{GAMES_PATH}/{id}")
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use serde_json::json;

    use super::*;
    use crate::dto::game::GameView;

    #[test]
    fn sparse_document_reads_with_defaults() {
        let doc: FirebaseGameDocument = serde_json::from_value(json!({
            "title": "Tetris",
            "category": "Puzzle",
            "featured": true,
            "tags": null,
            "rating": null
        }))
        .unwrap();

        let now = UNIX_EPOCH + Duration::from_secs(42);
        let game = doc.into_entity("-Nabc".into(), now);
        assert_eq!(game.title, "Tetris");
        assert!(game.featured);
        assert!(game.tags.is_empty());
        assert!(game.keyboard_controls.is_empty());
        assert_eq!(game.play_count, 0);
        assert_eq!(game.rating, 0.0);
        assert_eq!(game.rating_count, 0);
        assert_eq!(game.created_at, now);
        assert_eq!(game.updated_at, now);
    }

    #[test]
    fn timestamps_accept_millis_and_rfc3339() {
        let doc: FirebaseGameDocument = serde_json::from_value(json!({
            "createdAt": 1_700_000_000_000u64,
            "updatedAt": "2023-11-14T22:13:20.000Z"
        }))
        .unwrap();

        let expected = UNIX_EPOCH + Duration::from_millis(1_700_000_000_000);
        assert_eq!(doc.created_at, Some(expected));
        assert_eq!(doc.updated_at, Some(expected));
    }

    #[test]
    fn out_of_range_millis_read_as_now() {
        let doc: FirebaseGameDocument = serde_json::from_value(json!({
            "title": "T",
            "createdAt": 1.0e15,
            "updatedAt": -1.0e15
        }))
        .unwrap();
        assert!(doc.created_at.is_none());

        let now = UNIX_EPOCH + Duration::from_secs(42);
        let game = doc.into_entity("-Nabc".into(), now);
        assert_eq!(game.created_at, now);
        assert_eq!(game.updated_at, now);

        let view = GameView::from(game);
        assert_eq!(view.created_at, "1970-01-01T00:00:42Z");
    }

    #[test]
    fn written_documents_use_camel_case_and_millis() {
        let created = UNIX_EPOCH + Duration::from_millis(1_500);
        let doc = FirebaseGameDocument::new_game(
            NewGameEntity {
                title: "A".into(),
                description: String::new(),
                url: "https://a.example".into(),
                thumbnail: String::new(),
                category: "Puzzle".into(),
                tags: vec!["fun".into()],
                featured: false,
                keyboard_controls: vec![KeyboardControlEntity {
                    key: "Space".into(),
                    action: "Jump".into(),
                }],
            },
            created,
        );

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["createdAt"], json!(1_500));
        assert_eq!(value["playCount"], json!(0));
        assert_eq!(value["ratingCount"], json!(0));
        assert_eq!(value["tags"], json!(["fun"]));
        assert_eq!(
            value["keyboardControls"],
            json!([{"key": "Space", "action": "Jump"}])
        );
    }

    #[test]
    fn keys_with_path_characters_are_rejected() {
        assert!(is_valid_key("-NwXyZ123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("a/b"));
        assert!(!is_valid_key("a.b"));
        assert!(!is_valid_key("[0]"));
    }
}
