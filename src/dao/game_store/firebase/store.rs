use std::{collections::HashMap, sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode, header::IF_MATCH};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, from_value};
use tracing::debug;

use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GamePatch, NewGameEntity},
    storage::StorageResult,
};

use super::{
    config::FirebaseConfig,
    error::{FirebaseDaoError, FirebaseResult},
    models::{FirebaseGameDocument, GAMES_PATH, PushResponse, game_path, is_valid_key},
};

const ETAG_REQUEST_HEADER: &str = "X-Firebase-ETag";
const ETAG_RESPONSE_HEADER: &str = "ETag";
const MAX_TRANSACTION_ATTEMPTS: u32 = 8;

/// Game store talking to the Realtime Database REST API.
///
/// Read-modify-write operations run as ETag transactions.
#[derive(Clone)]
pub struct FirebaseGameStore {
    client: Client,
    base_url: Arc<str>,
    auth: Option<Arc<str>>,
}

impl FirebaseGameStore {
    /// Build the REST client and check that the database answers.
    pub async fn connect(config: FirebaseConfig) -> FirebaseResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| FirebaseDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::from(config.database_url.trim_end_matches('/')),
            auth: config.auth_token.map(Arc::from),
        };

        store.ping().await?;
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}.json", self.base_url, path);
        let builder = self.client.request(method, url);
        if let Some(ref auth) = self.auth {
            builder.query(&[("auth", auth.as_ref())])
        } else {
            builder
        }
    }

    async fn send(
        &self,
        path: &str,
        builder: reqwest::RequestBuilder,
    ) -> FirebaseResult<reqwest::Response> {
        builder
            .send()
            .await
            .map_err(|source| FirebaseDaoError::RequestSend {
                path: path.to_string(),
                source,
            })
    }

    async fn ping(&self) -> FirebaseResult<()> {
        let builder = self
            .request(Method::GET, GAMES_PATH)
            .query(&[("shallow", "true")]);
        let response = self.send(GAMES_PATH, builder).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(FirebaseDaoError::RequestStatus {
                path: GAMES_PATH.to_string(),
                status: response.status(),
            })
        }
    }

    async fn get_node<T>(&self, path: &str) -> FirebaseResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.send(path, self.request(Method::GET, path)).await?;

        if !response.status().is_success() {
            return Err(FirebaseDaoError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            });
        }

        // Absent nodes come back as a literal `null`.
        response
            .json::<Option<T>>()
            .await
            .map_err(|source| FirebaseDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    /// Read a node together with the ETag needed for a conditional write.
    async fn get_node_with_etag<T>(&self, path: &str) -> FirebaseResult<(Option<T>, String)>
    where
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::GET, path)
            .header(ETAG_REQUEST_HEADER, "true");
        let response = self.send(path, builder).await?;

        if !response.status().is_success() {
            return Err(FirebaseDaoError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            });
        }

        let etag = response
            .headers()
            .get(ETAG_RESPONSE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| FirebaseDaoError::MissingEtag {
                path: path.to_string(),
            })?;

        let node = response
            .json::<Option<T>>()
            .await
            .map_err(|source| FirebaseDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })?;

        Ok((node, etag))
    }

    /// Conditionally replace (or delete when `document` is `None`) a node.
    ///
    /// Returns `false` when the node changed since `etag` was read.
    async fn write_if_match<T>(
        &self,
        path: &str,
        etag: &str,
        document: Option<&T>,
    ) -> FirebaseResult<bool>
    where
        T: ?Sized + Serialize,
    {
        let builder = match document {
            Some(document) => self.request(Method::PUT, path).json(document),
            None => self.request(Method::DELETE, path),
        };
        let response = self.send(path, builder.header(IF_MATCH, etag)).await?;

        match response.status() {
            StatusCode::PRECONDITION_FAILED => Ok(false),
            status if status.is_success() => Ok(true),
            other => Err(FirebaseDaoError::RequestStatus {
                path: path.to_string(),
                status: other,
            }),
        }
    }

    /// Apply `mutate` to the stored game inside an ETag transaction.
    async fn transact<F>(
        &self,
        id: &str,
        now: SystemTime,
        mut mutate: F,
    ) -> FirebaseResult<Option<GameEntity>>
    where
        F: FnMut(&mut GameEntity),
    {
        if !is_valid_key(id) {
            return Ok(None);
        }

        let path = game_path(id);
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let (current, etag) = self
                .get_node_with_etag::<FirebaseGameDocument>(&path)
                .await?;
            let Some(document) = current else {
                return Ok(None);
            };

            let mut game = document.into_entity(id.to_owned(), now);
            mutate(&mut game);

            let document = FirebaseGameDocument::from(game.clone());
            if self.write_if_match(&path, &etag, Some(&document)).await? {
                return Ok(Some(game));
            }
            debug!(%path, attempt, "concurrent write detected; retrying transaction");
        }

        Err(FirebaseDaoError::TransactionConflict {
            path,
            attempts: MAX_TRANSACTION_ATTEMPTS,
        })
    }

    async fn create_game(
        &self,
        game: NewGameEntity,
        now: SystemTime,
    ) -> FirebaseResult<GameEntity> {
        let document = FirebaseGameDocument::new_game(game, now);
        let builder = self.request(Method::POST, GAMES_PATH).json(&document);
        let response = self.send(GAMES_PATH, builder).await?;

        if !response.status().is_success() {
            return Err(FirebaseDaoError::RequestStatus {
                path: GAMES_PATH.to_string(),
                status: response.status(),
            });
        }

        let pushed = response
            .json::<PushResponse>()
            .await
            .map_err(|source| FirebaseDaoError::DecodeResponse {
                path: GAMES_PATH.to_string(),
                source,
            })?;

        Ok(document.into_entity(pushed.name, now))
    }

    async fn list_games(&self) -> FirebaseResult<Vec<GameEntity>> {
        let now = SystemTime::now();
        let nodes = self
            .get_node::<HashMap<String, Value>>(GAMES_PATH)
            .await?
            .unwrap_or_default();

        let mut games = Vec::with_capacity(nodes.len());
        for (id, node) in nodes {
            let document = from_value::<FirebaseGameDocument>(node).map_err(|source| {
                FirebaseDaoError::DeserializeValue {
                    path: game_path(&id),
                    source,
                }
            })?;
            games.push(document.into_entity(id, now));
        }

        Ok(games)
    }

    async fn find_game(&self, id: &str) -> FirebaseResult<Option<GameEntity>> {
        if !is_valid_key(id) {
            return Ok(None);
        }

        let document = self
            .get_node::<FirebaseGameDocument>(&game_path(id))
            .await?;
        Ok(document.map(|doc| doc.into_entity(id.to_owned(), SystemTime::now())))
    }

    async fn delete_game(&self, id: &str) -> FirebaseResult<bool> {
        if !is_valid_key(id) {
            return Ok(false);
        }

        let path = game_path(id);
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let (current, etag) = self.get_node_with_etag::<Value>(&path).await?;
            if current.is_none() {
                return Ok(false);
            }
            if self.write_if_match::<Value>(&path, &etag, None).await? {
                return Ok(true);
            }
            debug!(%path, attempt, "concurrent write detected; retrying delete");
        }

        Err(FirebaseDaoError::TransactionConflict {
            path,
            attempts: MAX_TRANSACTION_ATTEMPTS,
        })
    }
}

impl GameStore for FirebaseGameStore {
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
        Box::pin(async move {
            store
                .transact(&id, now, |game| patch.clone().apply_to(game, now))
                .await
                .map_err(Into::into)
        })
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
                .transact(&id, now, |game| game.record_play(now))
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
                .transact(&id, now, |game| game.record_rating(rating, now))
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        // Stateless HTTP: reconnecting amounts to checking the database answers again.
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
