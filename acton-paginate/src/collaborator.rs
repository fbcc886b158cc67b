//! Document-store port
//!
//! The pagination calculator never talks to a database directly. It drives a
//! [`PaginateSource`] (count + find) and the [`DocumentQuery`] builder that
//! `find` returns. Adapters for a concrete store implement both traits; the
//! in-memory adapter in [`crate::memory`] is one such implementation.
//!
//! Both traits use return-position `impl Future` (Rust 1.75+), so no
//! `async_trait` boxing is involved.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_paginate::{DocumentQuery, Filter, PaginateSource};
//!
//! struct ArticleCollection {
//!     client: StoreClient,
//! }
//!
//! impl PaginateSource for ArticleCollection {
//!     type Document = Article;
//!     type Error = StoreError;
//!     type Query = ArticleQuery;
//!
//!     async fn count_documents(&self, conditions: &Filter) -> Result<u64, StoreError> {
//!         self.client.count("articles", conditions).await
//!     }
//!
//!     fn find(&self, conditions: &Filter, projection: &str) -> ArticleQuery {
//!         ArticleQuery::new(self.client.clone(), conditions.clone(), projection)
//!     }
//! }
//! ```

use std::future::Future;

use serde_json::{Map, Value};

/// Filter conditions, a document-style match object. Empty matches everything.
pub type Filter = Map<String, Value>;

/// Collation settings passed through to the store
pub type Collation = Map<String, Value>;

/// A collection that can count and find documents
///
/// # Type Parameters
///
/// - `Document`: what the fetch yields (hydrated models or plain values)
/// - `Error`: the store's own error, surfaced to callers unchanged
/// - `Query`: the builder returned by [`find`](PaginateSource::find)
pub trait PaginateSource: Send + Sync {
    /// Document type produced by the fetch
    type Document: Send;

    /// Error raised by the count or the fetch
    type Error: std::error::Error + Send + Sync + 'static;

    /// Query builder for a single fetch
    type Query: DocumentQuery<Document = Self::Document, Error = Self::Error>;

    /// Count every document matching `conditions`, ignoring any window
    fn count_documents(
        &self,
        conditions: &Filter,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;

    /// Start a query over documents matching `conditions`
    fn find(&self, conditions: &Filter, projection: &str) -> Self::Query;
}

/// Builder for a single fetch
///
/// Every shaping method consumes and returns the builder. Call order is not
/// significant to implementors; [`exec`](DocumentQuery::exec) runs the query.
pub trait DocumentQuery: Send + Sized {
    /// Document type produced by the fetch
    type Document: Send;

    /// Error raised by the fetch
    type Error: std::error::Error + Send + Sync + 'static;

    /// Restrict the returned fields
    #[must_use]
    fn select(self, select: &str) -> Self;

    /// Order the results
    #[must_use]
    fn sort(self, sort: &Value) -> Self;

    /// Return plain documents instead of hydrated models
    #[must_use]
    fn lean(self, lean: bool) -> Self;

    /// Apply collation rules for string comparison
    #[must_use]
    fn collation(self, collation: &Collation) -> Self;

    /// Expand related documents
    #[must_use]
    fn populate(self, populate: &Value) -> Self;

    /// Skip the first `skip` matches
    #[must_use]
    fn skip(self, skip: u64) -> Self;

    /// Return at most `limit` documents
    #[must_use]
    fn limit(self, limit: u64) -> Self;

    /// Execute the query
    fn exec(self) -> impl Future<Output = Result<Vec<Self::Document>, Self::Error>> + Send;
}
