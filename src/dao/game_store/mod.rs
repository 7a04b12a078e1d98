/// Firebase Realtime Database backend.
#[cfg(feature = "firebase-store")]
pub mod firebase;
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;
pub mod push_id;

use std::time::SystemTime;

use crate::dao::models::{GameEntity, GamePatch, NewGameEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer holding the game catalog.
///
/// Every read-modify-write (`update_game`, `increment_play_count`,
/// `record_rating`) must be applied atomically by the backend. Operations on a
/// missing id resolve to `None` instead of creating a record.
pub trait GameStore: Send + Sync {
    /// Insert a new game with a store-assigned id, zeroed counters and both timestamps at `now`.
    fn create_game(
        &self,
        game: NewGameEntity,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<GameEntity>>;
    /// Every stored game, in no particular order.
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// The game stored under `id`, if any.
    fn find_game(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Merge `patch` into the stored game and return the result.
    fn update_game(
        &self,
        id: &str,
        patch: GamePatch,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Remove a game, reporting whether it existed.
    fn delete_game(&self, id: &str) -> BoxFuture<'static, StorageResult<bool>>;
    /// Add one play and return the updated game.
    fn increment_play_count(
        &self,
        id: &str,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Fold `rating` into the running mean and return the updated game.
    fn record_rating(
        &self,
        id: &str,
        rating: f64,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Cheap round-trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
