//! In-process stand-in for the remote REST endpoint used by tests.
//!
//! It serves the subset of the PostgREST dialect the remote store speaks and
//! enforces the same pairing rule as `sql/remote_schema.sql`.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};

use crate::config::RemoteConfig;

use super::RemoteArenaStore;

/// Key the emulator expects in the `apikey` header.
pub const API_KEY: &str = "emulator-anon-key";

#[derive(Default)]
struct Tables {
    entries: Vec<Value>,
    contests: Vec<Value>,
    offline: bool,
    hide_contests: bool,
    requests: usize,
}

type Shared = Arc<Mutex<Tables>>;

/// Running emulator; the server task stops when this is dropped.
pub struct Emulator {
    base_url: String,
    tables: Shared,
    handle: JoinHandle<()>,
}

impl Emulator {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> Self {
        let tables: Shared = Arc::default();
        let app = Router::new()
            .route(
                "/rest/v1/battle_videos",
                get(list_entries).post(insert_entries),
            )
            .route("/rest/v1/battles", get(list_contests).post(insert_contests))
            .route("/rest/v1/rpc/increment_votes", post(increment_votes))
            .layer(middleware::from_fn_with_state(tables.clone(), gatekeeper))
            .with_state(tables.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            tables,
            handle,
        }
    }

    /// Parameters pointing at this emulator.
    pub fn config(&self) -> RemoteConfig {
        RemoteConfig::new(self.base_url.clone(), API_KEY)
    }

    /// Client connected to this emulator.
    pub fn store(&self) -> RemoteArenaStore {
        RemoteArenaStore::connect(&self.config()).unwrap()
    }

    /// Answer every request with 503 while `offline` is set.
    pub fn set_offline(&self, offline: bool) {
        self.tables.lock().unwrap().offline = offline;
    }

    /// Serve an empty `battles` relation on reads while still enforcing the
    /// pairing rule on inserts, as if a concurrent writer had just committed.
    pub fn hide_contests_from_reads(&self, hide: bool) {
        self.tables.lock().unwrap().hide_contests = hide;
    }

    /// Raw `battles` rows.
    pub fn contest_rows(&self) -> Vec<Value> {
        self.tables.lock().unwrap().contests.clone()
    }

    /// Raw `battle_videos` rows.
    pub fn entry_rows(&self) -> Vec<Value> {
        self.tables.lock().unwrap().entries.clone()
    }

    /// Requests received so far, rejected ones included.
    pub fn requests(&self) -> usize {
        self.tables.lock().unwrap().requests
    }
}

impl Drop for Emulator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn gatekeeper(State(tables): State<Shared>, request: Request, next: Next) -> Response {
    let offline = {
        let mut guard = tables.lock().unwrap();
        guard.requests += 1;
        guard.offline
    };
    if offline {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let headers = request.headers();
    let api_key_ok = headers
        .get("apikey")
        .is_some_and(|value| value.as_bytes() == API_KEY.as_bytes());
    let bearer_ok = headers
        .get(AUTHORIZATION)
        .is_some_and(|value| value.as_bytes() == format!("Bearer {API_KEY}").as_bytes());
    if !(api_key_ok && bearer_ok) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(request).await
}

async fn list_entries(State(tables): State<Shared>) -> Json<Vec<Value>> {
    Json(tables.lock().unwrap().entries.clone())
}

async fn insert_entries(State(tables): State<Shared>, Json(rows): Json<Vec<Value>>) -> Response {
    let mut guard = tables.lock().unwrap();
    for row in rows {
        if guard.entries.iter().any(|existing| existing["id"] == row["id"]) {
            return conflict();
        }
        guard.entries.push(row);
    }
    StatusCode::CREATED.into_response()
}

async fn list_contests(
    State(tables): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let guard = tables.lock().unwrap();
    if guard.hide_contests {
        return Json(Vec::new());
    }

    let id_filter = params.get("id").map(|filter| quoted_values(filter));
    let busy_filter = params.get("or").map(|filter| quoted_values(filter));
    let limit = params
        .get("limit")
        .and_then(|limit| limit.parse::<usize>().ok())
        .unwrap_or(usize::MAX);

    let rows = guard
        .contests
        .iter()
        .filter(|row| match &id_filter {
            Some(ids) => ids.iter().any(|id| row["id"] == id.as_str()),
            None => true,
        })
        .filter(|row| match &busy_filter {
            Some(ids) => references_any(row, ids),
            None => true,
        })
        .take(limit)
        .cloned()
        .collect();
    Json(rows)
}

async fn insert_contests(State(tables): State<Shared>, Json(rows): Json<Vec<Value>>) -> Response {
    let mut guard = tables.lock().unwrap();
    for row in rows {
        let ids = ["player_a_id", "player_b_id"]
            .iter()
            .filter_map(|column| row[*column].as_str().map(str::to_string))
            .collect::<Vec<_>>();
        if guard
            .contests
            .iter()
            .any(|existing| references_any(existing, &ids))
        {
            return conflict();
        }
        guard.contests.push(row);
    }
    StatusCode::CREATED.into_response()
}

async fn increment_votes(State(tables): State<Shared>, Json(args): Json<Value>) -> Json<Value> {
    let mut guard = tables.lock().unwrap();
    let target = args["entry_id"].clone();
    let Some(entry) = guard.entries.iter_mut().find(|row| row["id"] == target) else {
        return Json(Value::Null);
    };
    let votes = entry["votes"].as_u64().unwrap_or(0) + 1;
    entry["votes"] = json!(votes);
    Json(json!(votes))
}

fn references_any(row: &Value, ids: &[String]) -> bool {
    ids.iter()
        .any(|id| row["player_a_id"] == id.as_str() || row["player_b_id"] == id.as_str())
}

/// Values between double quotes, e.g. `("a","b")` yields `a` and `b`.
fn quoted_values(filter: &str) -> Vec<String> {
    filter
        .split('"')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .collect()
}

fn conflict() -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({ "code": "23505", "message": "entry already paired" })),
    )
        .into_response()
}
