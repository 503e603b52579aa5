//! Domain and wire DTOs for the todo store.
//!
//! # Design
//! `Item` is the document stored in the index. The request types mirror the
//! Elasticsearch query DSL only as far as the todo commands need it; the
//! response types keep the fields the CLI reads and let serde skip the rest.
//! The mock store defines its own view of the same JSON, and integration
//! tests catch any schema drift between the two crates.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Name of the document field holding the item text.
pub const TEXT_FIELD: &str = "text";

/// Script run by update-by-query to mark matching items done.
pub const CHECK_SCRIPT: &str = "ctx._source.done = true";

/// A single todo entry as stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl Item {
    /// A new, unchecked item.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.done { "X" } else { " " };
        write!(f, "[{mark}] {}", self.text)
    }
}

/// The subset of the query DSL used by the todo commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `{"match_all": {}}`
    MatchAll,
    /// `{"term": {"<field>": {"value": "<value>"}}}`
    Term { field: String, value: String },
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Term query on the item text. An empty term falls back to `MatchAll`,
    /// since a term query on `""` matches no analyzed text at all.
    pub fn text(term: &str) -> Self {
        if term.is_empty() {
            Query::MatchAll
        } else {
            Query::term(TEXT_FIELD, term)
        }
    }
}

#[derive(Serialize)]
struct Empty {}

#[derive(Serialize)]
struct TermValue<'a> {
    value: &'a str,
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Query::MatchAll => map.serialize_entry("match_all", &Empty {})?,
            Query::Term { field, value } => {
                let clause = BTreeMap::from([(field.as_str(), TermValue { value })]);
                map.serialize_entry("term", &clause)?;
            }
        }
        map.end()
    }
}

/// A server-side script.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Script {
    pub source: String,
    pub lang: String,
}

impl Script {
    pub fn painless(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            lang: "painless".to_string(),
        }
    }

    /// The script that sets `done = true`.
    pub fn check() -> Self {
        Self::painless(CHECK_SCRIPT)
    }
}

/// Body of a `_search` request.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a Query,
    pub size: usize,
}

/// Body of an `_update_by_query` request.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateByQueryRequest<'a> {
    pub query: &'a Query,
    pub script: &'a Script,
}

/// Body of a `_delete_by_query` request.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteByQueryRequest<'a> {
    pub query: &'a Query,
}

/// A `_search` response.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: u64,
    pub hits: Hits,
}

impl SearchResponse {
    /// The matched items in store order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.hits.hits.iter().map(|hit| &hit.source)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TotalHits {
    pub value: u64,
    pub relation: String,
}

/// One matched document.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: Item,
}

/// A `_doc` (index) response.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IndexResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version", default)]
    pub version: u64,
    pub result: String,
}

/// Response of `_update_by_query` and `_delete_by_query`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ByQueryResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    pub total: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub deleted: u64,
    #[serde(default)]
    pub noops: u64,
    #[serde(default)]
    pub version_conflicts: u64,
    #[serde(default)]
    pub failures: Vec<Value>,
}
