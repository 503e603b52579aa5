//! In-memory stand-in for the slice of the Elasticsearch REST API the todo
//! CLI talks to: `_doc`, `_search`, `_update_by_query` and `_delete_by_query`
//! on a single node, with optional basic auth.

pub mod error;
pub mod query;

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use error::EsError;
use query::{Assignment, Matcher};

/// Hits returned when neither the body nor the query string sets `size`.
pub const DEFAULT_SIZE: usize = 10;

#[derive(Clone, Debug)]
pub struct Document {
    pub id: String,
    pub version: u64,
    pub source: Map<String, Value>,
}

/// Documents per index, in insertion order.
pub type Db = Arc<RwLock<HashMap<String, Vec<Document>>>>;

/// Basic-auth user the store accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Clone)]
struct AppState {
    db: Db,
    credentials: Option<Arc<Credentials>>,
}

#[derive(Deserialize, Default)]
struct Params {
    size: Option<usize>,
}

/// Open store, no authentication.
pub fn app() -> Router {
    router(None)
}

/// Store that rejects requests without matching basic-auth credentials.
pub fn app_with_auth(credentials: Credentials) -> Router {
    router(Some(credentials))
}

fn router(credentials: Option<Credentials>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(HashMap::new())),
        credentials: credentials.map(Arc::new),
    };
    Router::new()
        .route("/{index}/_doc", post(index_doc))
        .route("/{index}/_search", get(search).post(search))
        .route("/{index}/_update_by_query", post(update_by_query))
        .route("/{index}/_delete_by_query", post(delete_by_query))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

pub async fn run(
    listener: TcpListener,
    credentials: Option<Credentials>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, router(credentials)).await
}

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(expected) = &state.credentials {
        let supplied = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(decode_basic);
        let uri = request.uri().to_string();
        match supplied {
            None => {
                tracing::debug!(%uri, "rejecting unauthenticated request");
                return EsError::unauthorized(format!(
                    "missing authentication credentials for REST request [{uri}]"
                ))
                .into_response();
            }
            Some(got) if got != **expected => {
                tracing::debug!(%uri, user = %got.username, "rejecting bad credentials");
                return EsError::unauthorized(format!(
                    "unable to authenticate user [{}] for REST request [{uri}]",
                    got.username
                ))
                .into_response();
            }
            Some(_) => {}
        }
    }
    next.run(request).await
}

fn decode_basic(value: &str) -> Option<Credentials> {
    let token = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(token.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(Credentials::new(username, password))
}

fn parse_body(body: &Bytes) -> Result<Map<String, Value>, EsError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(EsError::parsing("request body must be an object")),
        Err(e) => Err(EsError::parsing(format!("failed to parse request body: {e}"))),
    }
}

async fn index_doc(
    State(state): State<AppState>,
    Path(index): Path<String>,
    Json(source): Json<Map<String, Value>>,
) -> (StatusCode, Json<Value>) {
    let id = Uuid::new_v4().simple().to_string();
    let mut db = state.db.write().await;
    let docs = db.entry(index.clone()).or_default();
    docs.push(Document {
        id: id.clone(),
        version: 1,
        source,
    });
    tracing::debug!(%index, %id, "indexed document");
    (
        StatusCode::CREATED,
        Json(json!({
            "_index": index,
            "_id": id,
            "_version": 1,
            "result": "created",
            "_shards": {"total": 1, "successful": 1, "failed": 0},
            "_seq_no": docs.len() - 1,
            "_primary_term": 1
        })),
    )
}

async fn search(
    State(state): State<AppState>,
    Path(index): Path<String>,
    Query(params): Query<Params>,
    body: Bytes,
) -> Result<Json<Value>, EsError> {
    let body = parse_body(&body)?;
    let matcher = Matcher::parse(body.get("query"))?;
    let size = match body.get("size") {
        Some(size) => size
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| EsError::parsing("[size] must be a non-negative integer"))?,
        None => params.size.unwrap_or(DEFAULT_SIZE),
    };

    let db = state.db.read().await;
    let docs = db.get(&index).ok_or_else(|| EsError::index_not_found(&index))?;
    let matched: Vec<&Document> = docs.iter().filter(|doc| matcher.matches(&doc.source)).collect();
    let hits: Vec<Value> = matched
        .iter()
        .take(size)
        .map(|doc| {
            json!({
                "_index": index,
                "_id": doc.id,
                "_score": 1.0,
                "_source": doc.source,
            })
        })
        .collect();
    let max_score = if hits.is_empty() { Value::Null } else { json!(1.0) };
    tracing::debug!(%index, matched = matched.len(), returned = hits.len(), "search");

    Ok(Json(json!({
        "took": 0,
        "timed_out": false,
        "_shards": {"total": 1, "successful": 1, "skipped": 0, "failed": 0},
        "hits": {
            "total": {"value": matched.len(), "relation": "eq"},
            "max_score": max_score,
            "hits": hits,
        }
    })))
}

async fn update_by_query(
    State(state): State<AppState>,
    Path(index): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, EsError> {
    let body = parse_body(&body)?;
    let matcher = Matcher::parse(body.get("query"))?;
    let script = body.get("script").map(Assignment::parse).transpose()?;

    let mut db = state.db.write().await;
    let docs = db.get_mut(&index).ok_or_else(|| EsError::index_not_found(&index))?;
    let mut updated = 0;
    for doc in docs.iter_mut().filter(|doc| matcher.matches(&doc.source)) {
        if let Some(script) = &script {
            script.apply(&mut doc.source);
        }
        doc.version += 1;
        updated += 1;
    }
    tracing::debug!(%index, updated, "update by query");
    Ok(Json(by_query_body(updated, updated, 0)))
}

async fn delete_by_query(
    State(state): State<AppState>,
    Path(index): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, EsError> {
    let body = parse_body(&body)?;
    if !body.contains_key("query") {
        return Err(EsError::validation("query is missing"));
    }
    let matcher = Matcher::parse(body.get("query"))?;

    let mut db = state.db.write().await;
    let docs = db.get_mut(&index).ok_or_else(|| EsError::index_not_found(&index))?;
    let before = docs.len();
    docs.retain(|doc| !matcher.matches(&doc.source));
    let deleted = before - docs.len();
    tracing::debug!(%index, deleted, "delete by query");
    Ok(Json(by_query_body(deleted, 0, deleted)))
}

fn by_query_body(total: usize, updated: usize, deleted: usize) -> Value {
    let batches = usize::from(total > 0);
    json!({
        "took": 0,
        "timed_out": false,
        "total": total,
        "updated": updated,
        "deleted": deleted,
        "batches": batches,
        "version_conflicts": 0,
        "noops": 0,
        "retries": {"bulk": 0, "search": 0},
        "throttled_millis": 0,
        "requests_per_second": -1.0,
        "throttled_until_millis": 0,
        "failures": []
    })
}
