use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Input binding advertised for a game (e.g. `ArrowUp` → "Jump").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyboardControlEntity {
    /// Key name as reported by the browser (`w`, `ArrowLeft`, `Space`...).
    pub key: String,
    /// Human readable description of what the key does.
    pub action: String,
}

/// Game record persisted by the storage layer.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEntity {
    /// Opaque identifier assigned by the store on creation.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Free-text description shown on the game page.
    pub description: String,
    /// URL of the embedded game.
    pub url: String,
    /// URL of the preview image.
    pub thumbnail: String,
    /// Category label (see the configured category list).
    pub category: String,
    /// Ordered search tags.
    pub tags: Vec<String>,
    /// Editorial flag used to highlight a game.
    pub featured: bool,
    /// Creation timestamp, never rewritten after insertion.
    pub created_at: SystemTime,
    /// Last time any field of the record changed.
    pub updated_at: SystemTime,
    /// Number of times the game page tried to start the game.
    pub play_count: u64,
    /// Cumulative mean of every submitted rating.
    pub rating: f64,
    /// Number of ratings contributing to [`GameEntity::rating`].
    pub rating_count: u64,
    /// Ordered input bindings, display only.
    pub keyboard_controls: Vec<KeyboardControlEntity>,
}

impl GameEntity {
    /// Count one more play.
    pub fn record_play(&mut self, now: SystemTime) {
        self.play_count += 1;
        self.updated_at = now;
    }

    /// Fold a new rating into the running mean.
    pub fn record_rating(&mut self, rating: f64, now: SystemTime) {
        self.rating = running_mean(self.rating, self.rating_count, rating);
        self.rating_count += 1;
        self.updated_at = now;
    }
}

/// Fields supplied when inserting a game; the store owns id, timestamps and counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameEntity {
    /// Display title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// URL of the embedded game.
    pub url: String,
    /// Preview image URL, possibly empty.
    pub thumbnail: String,
    /// Category label.
    pub category: String,
    /// Normalised search tags.
    pub tags: Vec<String>,
    /// Editorial highlight flag.
    pub featured: bool,
    /// Ordered input bindings.
    pub keyboard_controls: Vec<KeyboardControlEntity>,
}

impl NewGameEntity {
    /// Materialise the full record with zeroed counters.
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
            created_at: now,
            updated_at: now,
            play_count: 0,
            rating: 0.0,
            rating_count: 0,
            keyboard_controls: self.keyboard_controls,
        }
    }
}

/// Partial update of a game. `None` means "leave the stored value alone".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamePatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New game URL.
    pub url: Option<String>,
    /// New preview image URL.
    pub thumbnail: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// Replaces the whole list; `Some(vec![])` clears it.
    pub tags: Option<Vec<String>>,
    /// New highlight flag.
    pub featured: Option<bool>,
    /// Replaces every input binding.
    pub keyboard_controls: Option<Vec<KeyboardControlEntity>>,
}

impl GamePatch {
    /// Whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.url.is_none()
            && self.thumbnail.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.featured.is_none()
            && self.keyboard_controls.is_none()
    }

    /// Merge the provided fields into `game` and refresh its update timestamp.
    pub fn apply_to(self, game: &mut GameEntity, now: SystemTime) {
        if let Some(title) = self.title {
            game.title = title;
        }
        if let Some(description) = self.description {
            game.description = description;
        }
        if let Some(url) = self.url {
            game.url = url;
        }
        if let Some(thumbnail) = self.thumbnail {
            game.thumbnail = thumbnail;
        }
        if let Some(category) = self.category {
            game.category = category;
        }
        if let Some(tags) = self.tags {
            game.tags = tags;
        }
        if let Some(featured) = self.featured {
            game.featured = featured;
        }
        if let Some(controls) = self.keyboard_controls {
            game.keyboard_controls = controls;
        }
        game.updated_at = now;
    }
}

/// Mean of `count` values averaging `mean`, extended with `value`.
pub fn running_mean(mean: f64, count: u64, value: f64) -> f64 {
    (mean * count as f64 + value) / (count + 1) as f64
}
