//! The four todo operations. Each issues exactly one request to the store.

use std::io::{self, Write};

use thiserror::Error;
use todo_core::types::TEXT_FIELD;
use todo_core::{
    ApiError, ByQueryResponse, HttpRequest, HttpResponse, IndexResponse, Item, Query, Script,
    StoreClient,
};

use crate::cli::Action;
use crate::report;
use crate::transport::{Transport, TransportError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to write output")]
    Output(#[from] io::Error),
}

pub struct Todo<T> {
    client: StoreClient,
    transport: T,
}

impl<T: Transport> Todo<T> {
    pub fn new(client: StoreClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn run(&self, action: &Action, out: &mut impl Write) -> Result<(), CommandError> {
        match action {
            Action::List { term, limit } => self.list(term, *limit, out).map(drop),
            Action::Add { text } => self.add(text).map(drop),
            Action::Check { term } => self.check(term).map(drop),
            Action::Clear => self.clear().map(drop),
        }
    }

    /// Print items whose text contains `term` as a word, or every item when
    /// `term` is empty. Returns the number printed.
    pub fn list(
        &self,
        term: &str,
        limit: usize,
        out: &mut impl Write,
    ) -> Result<usize, CommandError> {
        let request = self.client.build_search(&Query::text(term), limit)?;
        let response = self.client.parse_search(self.round_trip(request)?)?;
        if let Some(total) = &response.hits.total {
            tracing::debug!(total = total.value, relation = %total.relation, "search matched");
        }
        let shown = report::render_items(response.items(), out)?;
        Ok(shown)
    }

    pub fn add(&self, text: &str) -> Result<IndexResponse, CommandError> {
        let request = self.client.build_index(&Item::new(text))?;
        let response = self.client.parse_index(self.round_trip(request)?)?;
        tracing::info!(id = %response.id, index = %response.index, "item added");
        Ok(response)
    }

    /// Mark every item whose text contains `term` as done. An empty term
    /// matches nothing.
    pub fn check(&self, term: &str) -> Result<ByQueryResponse, CommandError> {
        let query = Query::term(TEXT_FIELD, term);
        let request = self.client.build_update_by_query(&query, &Script::check())?;
        let response = self.client.parse_update_by_query(self.round_trip(request)?)?;
        tracing::info!(
            matched = response.total,
            updated = response.updated,
            "items checked"
        );
        warn_failures(&response);
        Ok(response)
    }

    /// Delete every item in the index.
    pub fn clear(&self) -> Result<ByQueryResponse, CommandError> {
        let request = self.client.build_delete_by_query(&Query::MatchAll)?;
        let response = self.client.parse_delete_by_query(self.round_trip(request)?)?;
        tracing::info!(deleted = response.deleted, "items cleared");
        warn_failures(&response);
        Ok(response)
    }

    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, CommandError> {
        tracing::debug!(
            method = request.method.as_str(),
            url = %request.path,
            "sending request"
        );
        let response = self.transport.execute(&request)?;
        tracing::debug!(
            status = response.status,
            bytes = response.body.len(),
            "received response"
        );
        Ok(response)
    }
}

fn warn_failures(response: &ByQueryResponse) {
    if response.version_conflicts > 0 {
        tracing::warn!(
            conflicts = response.version_conflicts,
            "some items changed concurrently and were skipped"
        );
    }
    for failure in &response.failures {
        tracing::warn!(%failure, "store reported a failure");
    }
}
