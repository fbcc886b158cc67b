//! In-memory collaborator
//!
//! [`MemoryCollection`] implements [`PaginateSource`] over a vector of JSON
//! documents. It understands enough of the document-store vocabulary to serve
//! real pages:
//!
//! - **Filter**: field equality, dotted paths for nested fields. A `null`
//!   condition also matches a missing field.
//! - **Projection / select**: space-separated field lists; `-field` excludes.
//!   An inclusion list keeps `_id` unless `-_id` is given.
//! - **Sort**: `{"field": 1 | -1 | "asc" | "desc"}` or `"field -other"`.
//! - **Skip / limit**: applied after filtering and sorting.
//!
//! Collation, population and lean mode are recorded on the [`QueryPlan`] but
//! not interpreted. Every executed plan and every count is kept in a journal
//! that callers can inspect.
//!
//! # Example
//!
//! ```rust
//! use acton_paginate::memory::MemoryCollection;
//! use acton_paginate::{PaginateExt, PaginateOptions};
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let books = MemoryCollection::new(vec![
//!     json!({"_id": 1, "title": "Dune", "year": 1965}),
//!     json!({"_id": 2, "title": "Emma", "year": 1815}),
//!     json!({"_id": 3, "title": "Ubik", "year": 1969}),
//! ]);
//!
//! let options = PaginateOptions::new()
//!     .try_with_page(1)
//!     .unwrap()
//!     .with_sort(json!({"year": -1}))
//!     .with_select("title");
//! let page = books.paginate(None, options).await.unwrap();
//!
//! assert_eq!(page.data[0], json!({"_id": 3, "title": "Ubik"}));
//! assert_eq!(books.last_plan().unwrap().limit, Some(10));
//! # });
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::collaborator::{Collation, DocumentQuery, Filter, PaginateSource};
use crate::error::Result;

/// Operation being performed when a query error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperation {
    /// Counting matching documents
    Count,
    /// Executing a find
    Find,
}

impl fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::Find => write!(f, "find"),
        }
    }
}

/// Category of query error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    /// Sort specification could not be understood
    InvalidSort,
    /// The store could not be reached
    ConnectionFailed,
    /// Other unclassified error
    Other,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSort => write!(f, "invalid_sort"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured error raised by the in-memory collaborator
///
/// # Example
///
/// ```rust
/// use acton_paginate::memory::{QueryError, QueryErrorKind, QueryOperation};
///
/// let error = QueryError::connection_failed("connection refused");
/// assert_eq!(error.kind, QueryErrorKind::ConnectionFailed);
/// assert_eq!(
///     error.with_operation(QueryOperation::Count).to_string(),
///     "Query connection_failed error during count: connection refused"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The operation being performed when the error occurred
    pub operation: QueryOperation,
    /// The category of error
    pub kind: QueryErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl QueryError {
    /// Create a new query error
    pub fn new(operation: QueryOperation, kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// Create an invalid sort error
    pub fn invalid_sort(message: impl Into<String>) -> Self {
        Self::new(QueryOperation::Find, QueryErrorKind::InvalidSort, message)
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(QueryOperation::Find, QueryErrorKind::ConnectionFailed, message)
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: QueryOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Query {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for QueryError {}

/// Everything a query was asked to do before it ran
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    /// Filter conditions
    pub conditions: Filter,
    /// Projection given to the find
    pub projection: String,
    /// Field selection
    pub select: String,
    /// Sort specification
    pub sort: Option<Value>,
    /// Lean mode
    pub lean: bool,
    /// Collation, if one was applied
    pub collation: Option<Collation>,
    /// Population instruction, if one was applied
    pub populate: Option<Value>,
    /// Documents skipped
    pub skip: Option<u64>,
    /// Maximum documents returned
    pub limit: Option<u64>,
}

#[derive(Debug, Default)]
struct Journal {
    counts: usize,
    plans: Vec<QueryPlan>,
}

/// A collection of JSON documents held in memory
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    documents: Arc<Vec<Value>>,
    journal: Arc<Mutex<Journal>>,
    failure: Option<QueryError>,
}

impl MemoryCollection {
    /// Create a collection from documents
    pub fn new(documents: Vec<Value>) -> Self {
        Self {
            documents: Arc::new(documents),
            journal: Arc::default(),
            failure: None,
        }
    }

    /// Create a collection from a JSON array
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the input is not a JSON array.
    pub fn from_json(json: &str) -> Result<Self> {
        let documents: Vec<Value> = serde_json::from_str(json)?;
        Ok(Self::new(documents))
    }

    /// Load a collection from a file holding a JSON array
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the file cannot be read and
    /// [`Error::Json`](crate::Error::Json) if it is not a JSON array.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Make every count and fetch fail with `error`
    #[must_use]
    pub fn with_failure(mut self, error: QueryError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the collection holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of count operations served so far
    pub fn count_calls(&self) -> usize {
        self.journal().counts
    }

    /// Plans of every fetch executed so far, oldest first
    pub fn executed_plans(&self) -> Vec<QueryPlan> {
        self.journal().plans.clone()
    }

    /// Plan of the most recent fetch
    pub fn last_plan(&self) -> Option<QueryPlan> {
        self.journal().plans.last().cloned()
    }

    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn matching<'a>(&'a self, conditions: &'a Filter) -> impl Iterator<Item = &'a Value> + 'a {
        self.documents
            .iter()
            .filter(move |document| matches_filter(document, conditions))
    }
}

impl PaginateSource for MemoryCollection {
    type Document = Value;
    type Error = QueryError;
    type Query = MemoryQuery;

    async fn count_documents(&self, conditions: &Filter) -> std::result::Result<u64, QueryError> {
        self.journal().counts += 1;
        if let Some(error) = &self.failure {
            return Err(error.clone().with_operation(QueryOperation::Count));
        }
        Ok(self.matching(conditions).count() as u64)
    }

    fn find(&self, conditions: &Filter, projection: &str) -> MemoryQuery {
        MemoryQuery {
            collection: self.clone(),
            plan: QueryPlan {
                conditions: conditions.clone(),
                projection: projection.to_string(),
                ..QueryPlan::default()
            },
        }
    }
}

/// Pending query against a [`MemoryCollection`]
#[derive(Debug)]
pub struct MemoryQuery {
    collection: MemoryCollection,
    plan: QueryPlan,
}

impl MemoryQuery {
    /// The plan built so far
    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    fn run(&self) -> std::result::Result<Vec<Value>, QueryError> {
        let mut matched: Vec<&Value> = self.collection.matching(&self.plan.conditions).collect();

        if let Some(sort) = &self.plan.sort {
            let keys = parse_sort(sort)?;
            matched.sort_by(|a, b| compare_documents(a, b, &keys));
        }

        let skip = self.plan.skip.map_or(0, to_usize);
        let limit = self.plan.limit.map_or(usize::MAX, to_usize);

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|document| {
                let projected = project(document, &self.plan.projection);
                project(&projected, &self.plan.select)
            })
            .collect())
    }
}

impl DocumentQuery for MemoryQuery {
    type Document = Value;
    type Error = QueryError;

    fn select(mut self, select: &str) -> Self {
        self.plan.select = select.to_string();
        self
    }

    fn sort(mut self, sort: &Value) -> Self {
        self.plan.sort = Some(sort.clone());
        self
    }

    fn lean(mut self, lean: bool) -> Self {
        self.plan.lean = lean;
        self
    }

    fn collation(mut self, collation: &Collation) -> Self {
        self.plan.collation = Some(collation.clone());
        self
    }

    fn populate(mut self, populate: &Value) -> Self {
        self.plan.populate = Some(populate.clone());
        self
    }

    fn skip(mut self, skip: u64) -> Self {
        self.plan.skip = Some(skip);
        self
    }

    fn limit(mut self, limit: u64) -> Self {
        self.plan.limit = Some(limit);
        self
    }

    async fn exec(self) -> std::result::Result<Vec<Value>, QueryError> {
        self.collection.journal().plans.push(self.plan.clone());
        if let Some(error) = &self.collection.failure {
            return Err(error.clone().with_operation(QueryOperation::Find));
        }
        self.run()
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    if !path.contains('.') {
        return document.get(path);
    }
    // RFC 6901: '~' and '/' inside a segment must be escaped
    let pointer: String = path
        .split('.')
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect();
    document.pointer(&pointer)
}

fn matches_filter(document: &Value, conditions: &Filter) -> bool {
    conditions.iter().all(|(path, expected)| match lookup(document, path) {
        Some(actual) => actual == expected,
        None => expected.is_null(),
    })
}

type SortKey = (String, Ordering);

fn parse_sort(sort: &Value) -> std::result::Result<Vec<SortKey>, QueryError> {
    match sort {
        Value::String(spec) => Ok(spec
            .split_whitespace()
            .map(|field| match field.strip_prefix('-') {
                Some(field) => (field.to_string(), Ordering::Less),
                None => (field.to_string(), Ordering::Greater),
            })
            .collect()),
        Value::Object(fields) => fields
            .iter()
            .map(|(field, direction)| {
                let direction = match direction {
                    Value::Number(n) if n.as_i64() == Some(1) => Ordering::Greater,
                    Value::Number(n) if n.as_i64() == Some(-1) => Ordering::Less,
                    Value::String(s) if matches!(s.as_str(), "asc" | "ascending") => {
                        Ordering::Greater
                    }
                    Value::String(s) if matches!(s.as_str(), "desc" | "descending") => {
                        Ordering::Less
                    }
                    other => {
                        return Err(QueryError::invalid_sort(format!(
                            "unsupported direction {other} for field {field}"
                        )))
                    }
                };
                Ok((field.clone(), direction))
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(QueryError::invalid_sort(format!(
            "expected an object or a string, got {other}"
        ))),
    }
}

// Ordering::Greater marks an ascending key, Ordering::Less a descending one.
fn compare_documents(a: &Value, b: &Value, keys: &[SortKey]) -> Ordering {
    keys.iter()
        .map(|(field, direction)| {
            let ordering = compare_values(lookup(a, field), lookup(b, field));
            if *direction == Ordering::Less {
                ordering.reverse()
            } else {
                ordering
            }
        })
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) if type_rank(a) == type_rank(b) => x.to_string().cmp(&y.to_string()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn project(document: &Value, fields: &str) -> Value {
    let Value::Object(source) = document else {
        return document.clone();
    };
    if fields.trim().is_empty() {
        return document.clone();
    }

    let (excluded, included): (Vec<&str>, Vec<&str>) = fields
        .split_whitespace()
        .partition(|field| field.starts_with('-'));
    let excluded: Vec<&str> = excluded
        .into_iter()
        .map(|field| field.trim_start_matches('-'))
        .collect();

    let mut projected: Map<String, Value> = if included.is_empty() {
        source.clone()
    } else {
        source
            .iter()
            .filter(|(key, _)| key.as_str() == "_id" || included.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    };
    for field in excluded {
        projected.remove(field);
    }
    Value::Object(projected)
}
