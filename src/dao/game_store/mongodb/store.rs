use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, bson::doc, options::ReturnDocument};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoGameDocument, doc_id, new_document, patch_update, play_update, rating_update,
    },
};
use crate::dao::{
    game_store::{GameStore, push_id},
    models::{GameEntity, GamePatch, NewGameEntity},
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";

/// Game store backed by the `games` collection of a MongoDB database.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        Ok(Self { inner })
    }

    async fn collection(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn create_game(&self, game: NewGameEntity, now: SystemTime) -> MongoResult<GameEntity> {
        let document = new_document(push_id::generate(now), game, now);
        let collection = self.collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::InsertGame {
                id: document.id().to_owned(),
                source,
            })?;

        Ok(document.into_entity(now))
    }

    async fn list_games(&self) -> MongoResult<Vec<GameEntity>> {
        let collection = self.collection().await;

        let documents: Vec<MongoGameDocument> = collection
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        let now = SystemTime::now();
        Ok(documents
            .into_iter()
            .map(|document| document.into_entity(now))
            .collect())
    }

    async fn find_game(&self, id: &str) -> MongoResult<Option<GameEntity>> {
        let collection = self.collection().await;

        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame {
                id: id.to_owned(),
                source,
            })?;

        Ok(document.map(|document| document.into_entity(SystemTime::now())))
    }

    async fn update_game(
        &self,
        id: &str,
        patch: GamePatch,
        now: SystemTime,
    ) -> MongoResult<Option<GameEntity>> {
        let collection = self.collection().await;
        let document = collection
            .find_one_and_update(doc_id(id), patch_update(patch, now))
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateGame {
                id: id.to_owned(),
                source,
            })?;

        Ok(document.map(|document| document.into_entity(now)))
    }

    async fn increment_play_count(
        &self,
        id: &str,
        now: SystemTime,
    ) -> MongoResult<Option<GameEntity>> {
        let collection = self.collection().await;
        let document = collection
            .find_one_and_update(doc_id(id), play_update(now))
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateGame {
                id: id.to_owned(),
                source,
            })?;

        Ok(document.map(|document| document.into_entity(now)))
    }

    async fn record_rating(
        &self,
        id: &str,
        rating: f64,
        now: SystemTime,
    ) -> MongoResult<Option<GameEntity>> {
        let collection = self.collection().await;
        let document = collection
            .find_one_and_update(doc_id(id), rating_update(rating, now))
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateGame {
                id: id.to_owned(),
                source,
            })?;

        Ok(document.map(|document| document.into_entity(now)))
    }

    async fn delete_game(&self, id: &str) -> MongoResult<bool> {
        let collection = self.collection().await;
        let result = collection
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame {
                id: id.to_owned(),
                source,
            })?;
        Ok(result.deleted_count > 0)
    }
}

impl GameStore for MongoGameStore {
    fn create_game(
        &self,
        game: NewGameEntity,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_game(game, now).await.map_err(Into::into) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games().await.map_err(Into::into) })
    }

    fn find_game(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.find_game(&id).await.map_err(Into::into) })
    }

    fn update_game(
        &self,
        id: &str,
        patch: GamePatch,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.update_game(&id, patch, now).await.map_err(Into::into) })
    }

    fn delete_game(&self, id: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.delete_game(&id).await.map_err(Into::into) })
    }

    fn increment_play_count(
        &self,
        id: &str,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move {
            store
                .increment_play_count(&id, now)
                .await
                .map_err(Into::into)
        })
    }

    fn record_rating(
        &self,
        id: &str,
        rating: f64,
        now: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move {
            store
                .record_rating(&id, rating, now)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
