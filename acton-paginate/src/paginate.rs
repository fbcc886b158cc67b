//! Paginated listing over a [`PaginateSource`]
//!
//! [`paginate`] wires the pieces together for one call:
//!
//! 1. Counted mode only: count every matching document.
//! 2. Derive skip/limit from the options and that count.
//! 3. Build and execute the query on the collaborator.
//! 4. Describe the served page from the eager count (counted) or from the
//!    number of documents that came back (uncounted).
//!
//! Errors from the count or the fetch reach the caller as the collaborator's
//! own error type. Nothing is retried and no partial result is produced.
//!
//! # Example
//!
//! ```rust
//! use acton_paginate::memory::MemoryCollection;
//! use acton_paginate::{paginate, PaginateOptions};
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let articles = MemoryCollection::new((1..=25).map(|n| json!({ "n": n })).collect());
//! let options = PaginateOptions::new()
//!     .try_with_page(2)
//!     .unwrap()
//!     .with_ignore_total_pages(false);
//!
//! let page = paginate(&articles, None, options).await.unwrap();
//! assert_eq!(page.data.len(), 10);
//! assert_eq!(page.pagination.total_pages, Some(3));
//! assert_eq!(page.pagination.next_page, Some(3));
//! # });
//! ```

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::collaborator::{DocumentQuery, Filter, PaginateSource};
use crate::meta::{build_pagination, PaginationMeta};
use crate::options::PaginateOptions;
use crate::query::derive_query_params;

/// Documents of one page together with their pagination descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<D> {
    /// Documents returned by the fetch
    pub data: Vec<D>,
    /// Descriptor of the served page
    pub pagination: PaginationMeta,
}

impl<D> Paginated<D> {
    /// Pair fetched documents with their descriptor
    #[must_use]
    pub fn new(data: Vec<D>, pagination: PaginationMeta) -> Self {
        Self { data, pagination }
    }

    /// Transform the documents, keeping the descriptor
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(D) -> U,
    {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }

    /// Number of documents on this page
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this page holds no documents
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Fetch one page of documents matching `conditions`
///
/// `None` conditions match every document.
///
/// # Errors
///
/// Returns the collaborator's error unchanged when the count or the fetch fails.
#[tracing::instrument(
    name = "paginate",
    skip_all,
    fields(page = ?options.page_number(), per_page = options.per_page.get(), counted = options.is_counted())
)]
pub async fn paginate<S>(
    source: &S,
    conditions: Option<Filter>,
    options: PaginateOptions,
) -> Result<Paginated<S::Document>, S::Error>
where
    S: PaginateSource,
{
    let conditions = conditions.unwrap_or_default();

    let eager_count = if options.is_counted() {
        let total = source
            .count_documents(&conditions)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Document count failed");
                err
            })?;
        tracing::debug!(total, "Counted matching documents");
        total
    } else {
        0
    };

    let window = derive_query_params(&options, eager_count);

    let mut query = source
        .find(&conditions, &options.projection)
        .select(&options.select);
    if let Some(sort) = &options.sort {
        query = query.sort(sort);
    }
    query = query.lean(options.lean);
    if let Some(collation) = options.effective_collation() {
        query = query.collation(collation);
    }
    if let Some(populate) = &options.populate {
        query = query.populate(populate);
    }
    if let Some(window) = window {
        tracing::debug!(skip = window.skip, limit = window.limit, "Applying page window");
        query = query.skip(window.skip).limit(window.limit);
    }

    let data = query.exec().await.map_err(|err| {
        tracing::warn!(error = %err, "Document fetch failed");
        err
    })?;

    let count = if options.is_counted() {
        eager_count
    } else {
        data.len() as u64
    };
    let pagination = build_pagination(&options, count);
    tracing::debug!(
        returned = data.len(),
        has_next_page = pagination.has_next_page,
        total_pages = ?pagination.total_pages,
        "Page served"
    );

    Ok(Paginated::new(data, pagination))
}

/// Callback-style entry point
///
/// Runs [`paginate`] and hands the outcome, success or failure, to `callback`.
/// The call itself never fails; it returns whatever the callback returns.
///
/// # Example
///
/// ```rust
/// use acton_paginate::memory::MemoryCollection;
/// use acton_paginate::{paginate_with, PaginateOptions};
/// use serde_json::json;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let tags = MemoryCollection::new(vec![json!({"tag": "rust"}), json!({"tag": "go"})]);
///
/// let served = paginate_with(&tags, None, PaginateOptions::new(), |result| match result {
///     Ok(page) => page.len(),
///     Err(_) => 0,
/// })
/// .await;
/// assert_eq!(served, 2);
/// # });
/// ```
pub async fn paginate_with<S, F, R>(
    source: &S,
    conditions: Option<Filter>,
    options: PaginateOptions,
    callback: F,
) -> R
where
    S: PaginateSource,
    F: FnOnce(Result<Paginated<S::Document>, S::Error>) -> R,
{
    callback(paginate(source, conditions, options).await)
}

/// Method-call form of [`paginate`] for every collaborator
///
/// # Example
///
/// ```rust
/// use acton_paginate::memory::MemoryCollection;
/// use acton_paginate::{PaginateExt, PaginateOptions};
/// use serde_json::json;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let users = MemoryCollection::new((0..12).map(|id| json!({ "_id": id })).collect());
/// let options = PaginateOptions::new().try_with_page(2).unwrap();
/// let page = users.paginate(None, options).await.unwrap();
/// assert_eq!(page.len(), 2);
/// assert!(!page.pagination.has_next_page);
/// # });
/// ```
pub trait PaginateExt: PaginateSource + Sized {
    /// Fetch one page of documents matching `conditions`
    fn paginate(
        &self,
        conditions: Option<Filter>,
        options: PaginateOptions,
    ) -> impl Future<Output = Result<Paginated<Self::Document>, Self::Error>> + Send {
        paginate(self, conditions, options)
    }
}

impl<S: PaginateSource> PaginateExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::Collation;
    use serde_json::{json, Value};
    use std::num::NonZeroU64;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, thiserror::Error, PartialEq, Eq)]
    #[error("store unavailable: {0}")]
    struct StoreError(String);

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Count,
        Find(String),
        Select(String),
        Sort(Value),
        Lean(bool),
        Collation(Collation),
        Populate(Value),
        Skip(u64),
        Limit(u64),
        Exec,
    }

    type CallLog = Arc<Mutex<Vec<Call>>>;

    struct MockSource {
        total: u64,
        docs: Vec<u64>,
        fail_count: bool,
        fail_exec: bool,
        calls: CallLog,
    }

    impl MockSource {
        fn with_docs(count: u64) -> Self {
            Self {
                total: count,
                docs: (1..=count).collect(),
                fail_count: false,
                fail_exec: false,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    struct MockQuery {
        docs: Vec<u64>,
        skip: u64,
        limit: Option<u64>,
        fail: bool,
        calls: CallLog,
    }

    impl MockQuery {
        fn record(self, call: Call) -> Self {
            self.calls.lock().unwrap().push(call);
            self
        }
    }

    impl PaginateSource for MockSource {
        type Document = u64;
        type Error = StoreError;
        type Query = MockQuery;

        async fn count_documents(&self, _conditions: &Filter) -> Result<u64, StoreError> {
            self.calls.lock().unwrap().push(Call::Count);
            if self.fail_count {
                return Err(StoreError("count".to_string()));
            }
            Ok(self.total)
        }

        fn find(&self, _conditions: &Filter, projection: &str) -> MockQuery {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Find(projection.to_string()));
            MockQuery {
                docs: self.docs.clone(),
                skip: 0,
                limit: None,
                fail: self.fail_exec,
                calls: Arc::clone(&self.calls),
            }
        }
    }

    impl DocumentQuery for MockQuery {
        type Document = u64;
        type Error = StoreError;

        fn select(self, select: &str) -> Self {
            self.record(Call::Select(select.to_string()))
        }

        fn sort(self, sort: &Value) -> Self {
            self.record(Call::Sort(sort.clone()))
        }

        fn lean(self, lean: bool) -> Self {
            self.record(Call::Lean(lean))
        }

        fn collation(self, collation: &Collation) -> Self {
            self.record(Call::Collation(collation.clone()))
        }

        fn populate(self, populate: &Value) -> Self {
            self.record(Call::Populate(populate.clone()))
        }

        fn skip(mut self, skip: u64) -> Self {
            self.skip = skip;
            self.record(Call::Skip(skip))
        }

        fn limit(mut self, limit: u64) -> Self {
            self.limit = Some(limit);
            self.record(Call::Limit(limit))
        }

        async fn exec(self) -> Result<Vec<u64>, StoreError> {
            self.calls.lock().unwrap().push(Call::Exec);
            if self.fail {
                return Err(StoreError("fetch".to_string()));
            }
            let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
            let limit = self
                .limit
                .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
            Ok(self.docs.into_iter().skip(skip).take(limit).collect())
        }
    }

    fn options(page: u64, counted: bool) -> PaginateOptions {
        PaginateOptions::new()
            .with_page(NonZeroU64::new(page).unwrap())
            .with_per_page(NonZeroU64::new(10).unwrap())
            .with_ignore_total_pages(!counted)
    }

    #[tokio::test]
    async fn test_counted_scenario() {
        let source = MockSource::with_docs(25);
        let page = paginate(&source, None, options(2, true)).await.unwrap();

        assert_eq!(page.data, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.pagination.page, Some(2));
        assert_eq!(page.pagination.total_pages, Some(3));
        assert_eq!(page.pagination.prev_page, Some(1));
        assert_eq!(page.pagination.next_page, Some(3));
        assert!(page.pagination.has_prev_page && page.pagination.has_next_page);

        let calls = source.calls();
        assert_eq!(calls.first(), Some(&Call::Count));
        assert!(calls.contains(&Call::Skip(10)));
        assert!(calls.contains(&Call::Limit(10)));
        assert_eq!(calls.last(), Some(&Call::Exec));
    }

    #[tokio::test]
    async fn test_counted_count_precedes_fetch() {
        let source = MockSource::with_docs(5);
        paginate(&source, None, options(1, true)).await.unwrap();

        let calls = source.calls();
        let count_at = calls.iter().position(|c| *c == Call::Count).unwrap();
        let find_at = calls.iter().position(|c| matches!(c, Call::Find(_))).unwrap();
        let exec_at = calls.iter().position(|c| *c == Call::Exec).unwrap();
        assert!(count_at < find_at && find_at < exec_at);
    }

    #[tokio::test]
    async fn test_counted_past_last_page_fetches_last_page() {
        let source = MockSource::with_docs(25);
        let page = paginate(&source, None, options(7, true)).await.unwrap();

        assert!(source.calls().contains(&Call::Skip(20)));
        assert_eq!(page.data, (21..=25).collect::<Vec<_>>());
        assert_eq!(page.pagination.page, Some(7));
        assert!(!page.pagination.has_next_page);
    }

    #[tokio::test]
    async fn test_uncounted_full_page() {
        let source = MockSource::with_docs(55);
        let page = paginate(&source, None, options(5, false)).await.unwrap();

        assert!(!source.calls().contains(&Call::Count));
        assert_eq!(page.len(), 10);
        assert_eq!(page.pagination.prev_page, Some(4));
        assert!(page.pagination.has_next_page);
        assert_eq!(page.pagination.next_page, Some(6));
        assert_eq!(page.pagination.total_pages, None);
    }

    #[tokio::test]
    async fn test_uncounted_short_page_uses_observed_count() {
        let source = MockSource::with_docs(43);
        let page = paginate(&source, None, options(5, false)).await.unwrap();

        assert_eq!(page.len(), 3);
        assert!(!page.pagination.has_next_page);
        assert_eq!(page.pagination.next_page, Some(5));
    }

    #[tokio::test]
    async fn test_uncounted_page_past_end_is_empty() {
        let source = MockSource::with_docs(5);
        let page = paginate(&source, None, options(9, false)).await.unwrap();

        assert!(source.calls().contains(&Call::Skip(80)));
        assert!(page.is_empty());
        assert_eq!(page.pagination.page, Some(9));
    }

    #[tokio::test]
    async fn test_unpaginated_fetches_everything() {
        let source = MockSource::with_docs(37);
        let page = paginate(&source, None, PaginateOptions::new()).await.unwrap();

        assert_eq!(page.len(), 37);
        assert_eq!(page.pagination, PaginationMeta::unpaginated(10));
        let calls = source.calls();
        assert!(!calls.iter().any(|c| matches!(c, Call::Skip(_) | Call::Limit(_))));
        assert!(!calls.contains(&Call::Count));
    }

    #[tokio::test]
    async fn test_query_shaping_is_forwarded() {
        let source = MockSource::with_docs(3);
        let mut collation = Collation::new();
        collation.insert("locale".to_string(), json!("en"));
        let options = PaginateOptions::new()
            .with_projection("title")
            .with_select("-body")
            .with_sort(json!({"title": 1}))
            .with_lean(true)
            .with_collation(collation.clone())
            .with_populate("author");

        paginate(&source, None, options).await.unwrap();

        let calls = source.calls();
        assert!(calls.contains(&Call::Find("title".to_string())));
        assert!(calls.contains(&Call::Select("-body".to_string())));
        assert!(calls.contains(&Call::Sort(json!({"title": 1}))));
        assert!(calls.contains(&Call::Lean(true)));
        assert!(calls.contains(&Call::Collation(collation)));
        assert!(calls.contains(&Call::Populate(json!("author"))));
    }

    #[tokio::test]
    async fn test_empty_collation_and_missing_populate_are_not_applied() {
        let source = MockSource::with_docs(3);
        let options = PaginateOptions::new().with_collation(Collation::new());

        paginate(&source, None, options).await.unwrap();

        let calls = source.calls();
        assert!(!calls.iter().any(|c| matches!(c, Call::Collation(_))));
        assert!(!calls.iter().any(|c| matches!(c, Call::Populate(_))));
        assert!(!calls.iter().any(|c| matches!(c, Call::Sort(_))));
    }

    #[tokio::test]
    async fn test_count_error_is_returned_unchanged() {
        let mut source = MockSource::with_docs(10);
        source.fail_count = true;

        let err = paginate(&source, None, options(1, true)).await.unwrap_err();
        assert_eq!(err, StoreError("count".to_string()));
        assert!(!source.calls().contains(&Call::Exec));
    }

    #[tokio::test]
    async fn test_fetch_error_is_returned_unchanged() {
        let mut source = MockSource::with_docs(10);
        source.fail_exec = true;

        let err = paginate(&source, None, options(1, false)).await.unwrap_err();
        assert_eq!(err, StoreError("fetch".to_string()));
    }

    #[tokio::test]
    async fn test_callback_receives_error_without_raising() {
        let mut source = MockSource::with_docs(10);
        source.fail_exec = true;

        let delivered = paginate_with(&source, None, options(1, true), |result| {
            result.err().map(|err| err.to_string())
        })
        .await;
        assert_eq!(delivered, Some("store unavailable: fetch".to_string()));
    }

    #[tokio::test]
    async fn test_callback_receives_result() {
        let source = MockSource::with_docs(25);
        let pages = paginate_with(&source, None, options(1, true), |result| {
            result.map(|page| page.pagination.total_pages)
        })
        .await;
        assert_eq!(pages, Ok(Some(3)));
    }

    #[tokio::test]
    async fn test_extension_method() {
        let source = MockSource::with_docs(12);
        let page = source.paginate(None, options(2, false)).await.unwrap();
        assert_eq!(page.data, vec![11, 12]);
    }

    #[tokio::test]
    async fn test_paginate_future_is_send() {
        let source = Arc::new(MockSource::with_docs(30));
        let task_source = Arc::clone(&source);
        let handle = tokio::spawn(async move {
            paginate(task_source.as_ref(), None, options(3, true)).await
        });
        let page = handle.await.unwrap().unwrap();
        assert_eq!(page.data, (21..=30).collect::<Vec<_>>());
    }

    #[test]
    fn test_paginated_map_keeps_pagination() {
        let page = Paginated::new(vec![1, 2], PaginationMeta::unpaginated(10));
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.data, vec![10, 20]);
        assert_eq!(mapped.pagination, PaginationMeta::unpaginated(10));
    }
}
