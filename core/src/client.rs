//! Stateless HTTP request builder and response parser for the todo store.
//!
//! # Design
//! `StoreClient` holds the base URL, the index name and optional credentials,
//! and carries no mutable state between calls. Each store operation is split
//! into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`. The caller executes the actual
//! HTTP round-trip.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    ByQueryResponse, DeleteByQueryRequest, IndexResponse, Item, Query, Script, SearchRequest,
    SearchResponse, UpdateByQueryRequest,
};

/// Username and password for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
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

    /// Value for the `authorization` header.
    pub fn basic_auth(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Synchronous, stateless client for one index of the store.
#[derive(Debug, Clone)]
pub struct StoreClient {
    base_url: String,
    index: String,
    credentials: Option<Credentials>,
}

impl StoreClient {
    pub fn new(base_url: &str, index: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Search the index. `MatchAll` becomes a body-less GET; any other query
    /// is POSTed.
    pub fn build_search(&self, query: &Query, size: usize) -> Result<HttpRequest, ApiError> {
        if *query == Query::MatchAll {
            return Ok(HttpRequest {
                method: HttpMethod::Get,
                path: format!("{}?size={size}", self.url("_search")),
                headers: self.headers(false),
                body: None,
            });
        }
        self.post(self.url("_search"), &SearchRequest { query, size })
    }

    /// Index a new document; the store assigns its id.
    pub fn build_index(&self, item: &Item) -> Result<HttpRequest, ApiError> {
        self.post(format!("{}?refresh=true", self.url("_doc")), item)
    }

    pub fn build_update_by_query(
        &self,
        query: &Query,
        script: &Script,
    ) -> Result<HttpRequest, ApiError> {
        self.post(
            format!("{}?refresh=true", self.url("_update_by_query")),
            &UpdateByQueryRequest { query, script },
        )
    }

    pub fn build_delete_by_query(&self, query: &Query) -> Result<HttpRequest, ApiError> {
        self.post(
            format!("{}?refresh=true", self.url("_delete_by_query")),
            &DeleteByQueryRequest { query },
        )
    }

    pub fn parse_search(&self, response: HttpResponse) -> Result<SearchResponse, ApiError> {
        check_status(&response, &[200])?;
        decode(&response)
    }

    pub fn parse_index(&self, response: HttpResponse) -> Result<IndexResponse, ApiError> {
        check_status(&response, &[200, 201])?;
        decode(&response)
    }

    pub fn parse_update_by_query(
        &self,
        response: HttpResponse,
    ) -> Result<ByQueryResponse, ApiError> {
        check_status(&response, &[200])?;
        decode(&response)
    }

    pub fn parse_delete_by_query(
        &self,
        response: HttpResponse,
    ) -> Result<ByQueryResponse, ApiError> {
        check_status(&response, &[200])?;
        decode(&response)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}/{endpoint}", self.base_url, self.index)
    }

    fn headers(&self, with_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if with_body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(credentials) = &self.credentials {
            headers.push(("authorization".to_string(), credentials.basic_auth()));
        }
        headers
    }

    fn post<T: Serialize>(&self, path: String, body: &T) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path,
            headers: self.headers(true),
            body: Some(body),
        })
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    if let Ok(Value::Object(mut body)) = serde_json::from_str::<Value>(&response.body) {
        if let Some(Value::Object(detail)) = body.remove("error") {
            return Err(ApiError::Store {
                status: response.status,
                detail,
            });
        }
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
