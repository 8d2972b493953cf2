use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::RemoteConfig,
    dao::{
        arena_store::{ArenaStore, BackendKind},
        models::{ContestEntity, ContestId, EntryEntity, EntryId},
        storage::StorageResult,
    },
};

use super::{
    error::{RemoteDaoError, RemoteResult},
    models::{
        CONTEST_COLUMNS, CONTEST_TABLE, ContestRow, ENTRY_TABLE, INCREMENT_VOTES_RPC,
        IncrementVotesArgs, busy_filter, eq_filter,
    },
};

const REST_PREFIX: &str = "rest/v1";
const PREFER_MINIMAL: &str = "return=minimal";

/// [`ArenaStore`] backed by a PostgREST-compatible HTTPS endpoint.
#[derive(Clone)]
pub struct RemoteArenaStore {
    client: Client,
    rest_url: Arc<str>,
    api_key: Arc<str>,
}

impl RemoteArenaStore {
    /// Build the HTTP client; no request is sent until the first operation.
    pub fn connect(config: &RemoteConfig) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| RemoteDaoError::ClientBuilder { source })?;

        let rest_url = Arc::<str>::from(format!(
            "{}/{}",
            config.base_url.trim().trim_end_matches('/'),
            REST_PREFIX
        ));
        let api_key = Arc::<str>::from(config.api_key.trim());

        Ok(Self {
            client,
            rest_url,
            api_key,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.rest_url, path);
        self.client
            .request(method, url)
            .header("apikey", self.api_key.as_ref())
            .bearer_auth(self.api_key.as_ref())
    }

    async fn fetch_rows<T>(&self, table: &str, query: &[(&str, String)]) -> RemoteResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, table)
            .query(query)
            .send()
            .await
            .map_err(|source| RemoteDaoError::RequestSend {
                path: table.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RemoteDaoError::RequestStatus {
                path: table.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| RemoteDaoError::DecodeResponse {
                path: table.to_string(),
                source,
            })
    }

    async fn insert_row<T>(&self, table: &str, row: &T) -> RemoteResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", PREFER_MINIMAL)
            .json(&[row])
            .send()
            .await
            .map_err(|source| RemoteDaoError::RequestSend {
                path: table.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(RemoteDaoError::Conflict {
                path: table.to_string(),
            }),
            status => Err(RemoteDaoError::RequestStatus {
                path: table.to_string(),
                status,
            }),
        }
    }

    async fn entries(&self) -> RemoteResult<Vec<EntryEntity>> {
        self.fetch_rows(
            ENTRY_TABLE,
            &[
                ("select", "*".to_string()),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn contests(&self) -> RemoteResult<Vec<ContestEntity>> {
        let rows = self
            .fetch_rows::<ContestRow>(CONTEST_TABLE, &[("select", CONTEST_COLUMNS.to_string())])
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn contest(&self, id: ContestId) -> RemoteResult<Option<ContestEntity>> {
        let rows = self
            .fetch_rows::<ContestRow>(
                CONTEST_TABLE,
                &[
                    ("select", CONTEST_COLUMNS.to_string()),
                    ("id", eq_filter(id.as_str())),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    /// Insert `contest` unless one of its entries is already referenced.
    ///
    /// The pre-check narrows the race window; the schema's uniqueness trigger
    /// closes it, surfacing as a 409 that maps to [`RemoteDaoError::Conflict`].
    async fn create_contest(&self, contest: ContestEntity) -> RemoteResult<()> {
        if contest.entry_a_id == contest.entry_b_id {
            return Err(RemoteDaoError::IdenticalEntries {
                entry_id: contest.entry_a_id,
            });
        }

        let busy = self
            .fetch_rows::<ContestRow>(
                CONTEST_TABLE,
                &[
                    ("select", CONTEST_COLUMNS.to_string()),
                    ("or", busy_filter(&contest.entry_a_id, &contest.entry_b_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        if let Some(existing) = busy.into_iter().next() {
            let entry_id = if existing.player_a_id == contest.entry_a_id
                || existing.player_b_id == contest.entry_a_id
            {
                contest.entry_a_id
            } else {
                contest.entry_b_id
            };
            return Err(RemoteDaoError::AlreadyPaired { entry_id });
        }

        let row = ContestRow::from(contest);
        self.insert_row(CONTEST_TABLE, &row).await?;
        debug!(contest_id = %row.id, "remote contest inserted");
        Ok(())
    }

    async fn bump_votes(&self, id: EntryId) -> RemoteResult<u32> {
        let response = self
            .request(Method::POST, INCREMENT_VOTES_RPC)
            .json(&IncrementVotesArgs { entry_id: &id })
            .send()
            .await
            .map_err(|source| RemoteDaoError::RequestSend {
                path: INCREMENT_VOTES_RPC.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RemoteDaoError::RequestStatus {
                path: INCREMENT_VOTES_RPC.to_string(),
                status: response.status(),
            });
        }

        let votes = response.json::<Option<u32>>().await.map_err(|source| {
            RemoteDaoError::DecodeResponse {
                path: INCREMENT_VOTES_RPC.to_string(),
                source,
            }
        })?;
        votes.ok_or(RemoteDaoError::EntryNotFound { entry_id: id })
    }

    async fn ping(&self) -> RemoteResult<()> {
        self.fetch_rows::<serde_json::Value>(
            ENTRY_TABLE,
            &[("select", "id".to_string()), ("limit", "1".to_string())],
        )
        .await
        .map(|_| ())
    }
}

impl ArenaStore for RemoteArenaStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn list_entries(&self) -> BoxFuture<'static, StorageResult<Vec<EntryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.entries().await.map_err(Into::into) })
    }

    fn list_contests(&self) -> BoxFuture<'static, StorageResult<Vec<ContestEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.contests().await.map_err(Into::into) })
    }

    fn find_contest(
        &self,
        id: ContestId,
    ) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.contest(id).await.map_err(Into::into) })
    }

    fn insert_entry(&self, entry: EntryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .insert_row(ENTRY_TABLE, &entry)
                .await
                .map_err(Into::into)
        })
    }

    fn insert_contest(&self, contest: ContestEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.create_contest(contest).await.map_err(Into::into) })
    }

    fn increment_votes(&self, id: EntryId) -> BoxFuture<'static, StorageResult<u32>> {
        let store = self.clone();
        Box::pin(async move { store.bump_votes(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
