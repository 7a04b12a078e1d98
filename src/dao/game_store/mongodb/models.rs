use std::time::SystemTime;

use mongodb::bson::{Bson, DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

use crate::dao::models::{GameEntity, GamePatch, KeyboardControlEntity, NewGameEntity};

/// Game document stored in the `games` collection.
///
/// Reads are lenient: missing or `null` fields fall back to empty values and
/// missing timestamps are filled in by [`MongoGameDocument::into_entity`].
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    description: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    url: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    thumbnail: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    category: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    tags: Vec<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    created_at: Option<DateTime>,
    #[serde(default)]
    updated_at: Option<DateTime>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    play_count: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    rating: f64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    rating_count: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    keyboard_controls: Vec<KeyboardControlEntity>,
}

impl MongoGameDocument {
    /// Stored `_id`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Convert into an entity; missing timestamps read as `now`.
    pub fn into_entity(self, now: SystemTime) -> GameEntity {
        GameEntity {
            id: self.id,
            title: self.title,
            description: self.description,
            url: self.url,
            thumbnail: self.thumbnail,
            category: self.category,
            tags: self.tags,
            featured: self.featured,
            created_at: self.created_at.map_or(now, DateTime::to_system_time),
            updated_at: self.updated_at.map_or(now, DateTime::to_system_time),
            play_count: self.play_count,
            rating: self.rating,
            rating_count: self.rating_count,
            keyboard_controls: self.keyboard_controls,
        }
    }
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            url: value.url,
            thumbnail: value.thumbnail,
            category: value.category,
            tags: value.tags,
            featured: value.featured,
            created_at: Some(DateTime::from_system_time(value.created_at)),
            updated_at: Some(DateTime::from_system_time(value.updated_at)),
            play_count: value.play_count,
            rating: value.rating,
            rating_count: value.rating_count,
            keyboard_controls: value.keyboard_controls,
        }
    }
}

/// Document for a freshly created game.
pub fn new_document(id: String, game: NewGameEntity, now: SystemTime) -> MongoGameDocument {
    game.into_entity(id, now).into()
}

/// Filter matching the game stored under `id`.
pub fn doc_id(id: &str) -> Document {
    doc! {"_id": id}
}

/// `$set` document writing only the fields present in `patch`.
pub fn patch_update(patch: GamePatch, now: SystemTime) -> Document {
    let mut set = doc! {"updatedAt": DateTime::from_system_time(now)};
    if let Some(title) = patch.title {
        set.insert("title", title);
    }
    if let Some(description) = patch.description {
        set.insert("description", description);
    }
    if let Some(url) = patch.url {
        set.insert("url", url);
    }
    if let Some(thumbnail) = patch.thumbnail {
        set.insert("thumbnail", thumbnail);
    }
    if let Some(category) = patch.category {
        set.insert("category", category);
    }
    if let Some(tags) = patch.tags {
        set.insert("tags", tags);
    }
    if let Some(featured) = patch.featured {
        set.insert("featured", featured);
    }
    if let Some(controls) = patch.keyboard_controls {
        let controls = controls
            .into_iter()
            .map(|control| Bson::Document(doc! {"key": control.key, "action": control.action}))
            .collect::<Vec<_>>();
        set.insert("keyboardControls", controls);
    }
    doc! {"$set": set}
}

/// Atomic play counter bump.
pub fn play_update(now: SystemTime) -> Document {
    doc! {
        "$inc": {"playCount": 1_i64},
        "$set": {"updatedAt": DateTime::from_system_time(now)},
    }
}

/// Pipeline update folding `rating` into the stored mean.
///
/// Both expressions of the `$set` stage see the pre-update document, so the
/// mean is computed against the old count.
pub fn rating_update(rating: f64, now: SystemTime) -> Vec<Document> {
    let old_count = doc! {"$ifNull": ["$ratingCount", 0_i64]};
    let old_mean = doc! {"$ifNull": ["$rating", 0.0]};
    vec![doc! {
        "$set": {
            "rating": {
                "$divide": [
                    {"$add": [{"$multiply": [old_mean, old_count.clone()]}, rating]},
                    {"$add": [old_count.clone(), 1_i64]},
                ]
            },
            "ratingCount": {"$add": [old_count, 1_i64]},
            "updatedAt": DateTime::from_system_time(now),
        }
    }]
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn patch_update_sets_only_present_fields() {
        let update = patch_update(
            GamePatch {
                title: Some("X".into()),
                ..GamePatch::default()
            },
            SystemTime::UNIX_EPOCH,
        );

        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("title").unwrap(), "X");
        assert!(set.contains_key("updatedAt"));
        assert!(!set.contains_key("tags"));
        assert!(!set.contains_key("featured"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn null_and_missing_fields_read_as_defaults() {
        let document = mongodb::bson::deserialize_from_document::<MongoGameDocument>(doc! {
            "_id": "g1",
            "title": "A",
            "url": "https://a.example",
            "tags": null,
            "keyboardControls": null,
            "playCount": null,
            "category": null,
        })
        .unwrap();

        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
        let game = document.into_entity(now);
        assert_eq!(game.id, "g1");
        assert_eq!(game.title, "A");
        assert!(game.tags.is_empty());
        assert!(game.keyboard_controls.is_empty());
        assert_eq!(game.category, "");
        assert_eq!(game.play_count, 0);
        assert_eq!(game.rating_count, 0);
        assert_eq!(game.created_at, now);
        assert_eq!(game.updated_at, now);
    }

    #[test]
    fn stored_timestamps_are_kept() {
        let created = SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_000);
        let document = mongodb::bson::deserialize_from_document::<MongoGameDocument>(doc! {
            "_id": "g1",
            "createdAt": DateTime::from_system_time(created),
            "updatedAt": null,
        })
        .unwrap();

        let now = SystemTime::UNIX_EPOCH;
        let game = document.into_entity(now);
        assert_eq!(game.created_at, created);
        assert_eq!(game.updated_at, now);
        assert_eq!(game.title, "");
    }

    #[test]
    fn rating_update_uses_old_count_and_mean_in_one_stage() {
        let now = SystemTime::UNIX_EPOCH;
        let pipeline = rating_update(3.0, now);
        assert_eq!(pipeline.len(), 1);

        let old_count = doc! {"$ifNull": ["$ratingCount", 0_i64]};
        let old_mean = doc! {"$ifNull": ["$rating", 0.0]};
        let set = pipeline[0].get_document("$set").unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.get_document("ratingCount").unwrap(),
            &doc! {"$add": [old_count.clone(), 1_i64]}
        );
        assert_eq!(
            set.get_document("rating").unwrap(),
            &doc! {
                "$divide": [
                    {"$add": [{"$multiply": [old_mean, old_count.clone()]}, 3.0]},
                    {"$add": [old_count, 1_i64]},
                ]
            }
        );
        assert_eq!(
            set.get_datetime("updatedAt").unwrap(),
            &DateTime::from_system_time(now)
        );
    }

    #[test]
    fn play_update_increments_counter() {
        let update = play_update(SystemTime::UNIX_EPOCH);
        let inc = update.get_document("$inc").unwrap();
        assert_eq!(inc.get_i64("playCount").unwrap(), 1);
    }
}
