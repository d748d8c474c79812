use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::debug;

use crate::dao::{
    models::{GoalEventEntity, PlayerEntity, now_rfc3339, rank_players, unique_names},
    stats_store::StatsStore,
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchGoalDocument, CouchPlayerDocument, END_SUFFIX, PLAYER_PREFIX,
        goal_doc_id, player_doc_id,
    },
};

/// [`StatsStore`] backed by a CouchDB database over its HTTP API.
#[derive(Clone)]
pub struct CouchStatsStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchStatsStore {
    /// Build the HTTP client. No request is sent; call
    /// [`StatsStore::try_reconnect`] to create the database when missing.
    pub fn new(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        Ok(Self {
            client,
            base_url,
            database,
            auth,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            self.database,
            urlencoding::encode(path)
        );
        self.authorize(self.client.request(method, url))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = format!("{}/{}", self.base_url, self.database);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .authorize(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                // 412: created concurrently by someone else
                let status = create.status();
                if status.is_success() || status == StatusCode::PRECONDITION_FAILED {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus { database, status })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(CouchDaoError::Conflict {
                path: doc_id.to_string(),
            }),
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const ALL_DOCS: &str = "_all_docs";
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{}\"", prefix)),
            ("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        let mut documents = Vec::new();
        for row in payload.rows {
            if let Some(doc) = row.doc {
                let parsed = from_value(doc).map_err(|source| CouchDaoError::DeserializeValue {
                    path: ALL_DOCS.to_string(),
                    source,
                })?;
                documents.push(parsed);
            }
        }

        Ok(documents)
    }

    /// Read-modify-write of one player document, creating it when missing.
    async fn upsert_player(
        &self,
        name: &str,
        update: impl FnOnce(&mut PlayerEntity),
    ) -> CouchResult<()> {
        let doc_id = player_doc_id(name);
        let mut doc = match self.get_document::<CouchPlayerDocument>(&doc_id).await? {
            Some(existing) => existing,
            None => CouchPlayerDocument::from_entity(PlayerEntity::new(name)),
        };
        update(&mut doc.player);
        self.put_document(&doc_id, &doc).await
    }
}

impl StatsStore for CouchStatsStore {
    fn ensure_players(&self, names: Vec<String>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let now = now_rfc3339();
            for name in unique_names(names.iter()) {
                store
                    .upsert_player(&name, |player| player.last_seen = now.clone())
                    .await?;
            }
            Ok(())
        })
    }

    fn record_goal(&self, event: GoalEventEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = goal_doc_id(&event);
            if store
                .get_document::<CouchGoalDocument>(&doc_id)
                .await?
                .is_some()
            {
                debug!(event_id = %event.id, "goal event already stored");
                return Ok(());
            }

            let now = now_rfc3339();
            for name in event.players() {
                store
                    .upsert_player(&name, |player| {
                        if !player.credit_goal(&event) {
                            debug!(player = %name, event_id = %event.id, "goal already credited");
                        }
                        player.last_seen = now.clone();
                    })
                    .await?;
            }

            // written last: its presence lets a replay skip the player reads
            let doc = CouchGoalDocument::from_entity(event);
            store.put_document(&doc_id, &doc).await.map_err(Into::into)
        })
    }

    fn search_players(
        &self,
        query: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let docs = store
                .list_documents::<CouchPlayerDocument>(PLAYER_PREFIX)
                .await?;
            Ok(rank_players(
                docs.into_iter().map(CouchPlayerDocument::into_entity),
                &query,
                limit,
            ))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = format!("{}/{}", store.base_url, store.database);
            let response = store
                .authorize(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::RequestSend {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
