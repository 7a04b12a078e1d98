//! Process-local game store, used when no remote backend is configured and as
//! the substitute store in tests.

use std::{sync::Arc, time::SystemTime};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;

use crate::dao::{
    game_store::{GameStore, push_id},
    models::{GameEntity, GamePatch, NewGameEntity},
    storage::StorageResult,
};

/// Game store keeping every record in a concurrent map.
///
/// Mutations run while the map shard holding the record is locked, which makes
/// counter updates atomic with respect to each other.
#[derive(Clone, Default)]
pub struct InMemoryGameStore {
    games: Arc<DashMap<String, GameEntity>>,
}

impl InMemoryGameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, game: NewGameEntity, now: SystemTime) -> GameEntity {
        loop {
            let id = push_id::generate(now);
            if let Entry::Vacant(slot) = self.games.entry(id.clone()) {
                let entity = game.into_entity(id, now);
                slot.insert(entity.clone());
                return entity;
            }
        }
    }

    fn mutate<F>(&self, id: &str, mutate: F) -> Option<GameEntity>
    where
        F: FnOnce(&mut GameEntity),
    {
        let mut entry = self.games.get_mut(id)?;
        mutate(entry.value_mut());
        Some(entry.value().clone())
    }
}

impl GameStore for InMemoryGameStore {
    fn create_game(
        &self,
        game: NewGameEntity,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let entity = self.insert(game, now);
        Box::pin(async move { Ok(entity) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let games = self
            .games
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        Box::pin(async move { Ok(games) })
    }

    fn find_game(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let game = self.games.get(id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(game) })
    }

    fn update_game(
        &self,
        id: &str,
        patch: GamePatch,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let updated = self.mutate(id, |game| patch.apply_to(game, now));
        Box::pin(async move { Ok(updated) })
    }

    fn delete_game(&self, id: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let existed = self.games.remove(id).is_some();
        Box::pin(async move { Ok(existed) })
    }

    fn increment_play_count(
        &self,
        id: &str,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let updated = self.mutate(id, |game| game.record_play(now));
        Box::pin(async move { Ok(updated) })
    }

    fn record_rating(
        &self,
        id: &str,
        rating: f64,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let updated = self.mutate(id, |game| game.record_rating(rating, now));
        Box::pin(async move { Ok(updated) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
