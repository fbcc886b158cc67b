//! Paging options
//!
//! [`PaginateOptions`] is the explicit record of everything a caller can ask of
//! [`paginate`](crate::paginate): which page, how many items per page, which
//! counting strategy, and the query shaping that is handed to the collaborator
//! without interpretation.
//!
//! Every field has a documented default, so a bare `PaginateOptions::new()`
//! means "no pagination, 10 per page, uncounted".
//!
//! # Example
//!
//! ```rust
//! use acton_paginate::PaginateOptions;
//!
//! let options = PaginateOptions::new()
//!     .try_with_page(2)?
//!     .with_ignore_total_pages(false)
//!     .with_select("title author");
//!
//! assert_eq!(options.page_number(), Some(2));
//! assert_eq!(options.per_page.get(), 10);
//! assert!(options.is_counted());
//! # Ok::<(), acton_paginate::Error>(())
//! ```

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::PaginationDefaults;
use crate::error::{Error, Result};

/// Default number of items per page
pub const DEFAULT_PER_PAGE: NonZeroU64 = match NonZeroU64::new(10) {
    Some(per_page) => per_page,
    None => unreachable!(),
};

/// Default counting strategy (uncounted)
pub const DEFAULT_IGNORE_TOTAL_PAGES: bool = true;

/// Options controlling a single paginated listing
///
/// Deserializes from camelCase JSON (`perPage`, `ignoreTotalPages`), filling
/// any missing field with its default. `page: 0` and `perPage: 0` are rejected.
///
/// # Example
///
/// ```rust
/// use acton_paginate::PaginateOptions;
///
/// let options = PaginateOptions::from_json(r#"{"page": 3, "perPage": 25}"#).unwrap();
/// assert_eq!(options.page_number(), Some(3));
/// assert_eq!(options.per_page.get(), 25);
/// assert!(options.ignore_total_pages);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginateOptions {
    /// Requested page (1-indexed). `None` disables pagination entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<NonZeroU64>,

    /// Number of items per page
    pub per_page: NonZeroU64,

    /// `true` infers the next page from a full result (uncounted),
    /// `false` runs an eager count and reports total pages (counted)
    pub ignore_total_pages: bool,

    /// Ask the collaborator for plain documents instead of hydrated models
    pub lean: bool,

    /// Field projection forwarded to the initial find
    pub projection: String,

    /// Field selection forwarded to the query
    pub select: String,

    /// Sort specification forwarded to the query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,

    /// Collation, applied only when it has at least one entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<Map<String, Value>>,

    /// Relation population instruction, applied only when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub populate: Option<Value>,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            page: None,
            per_page: DEFAULT_PER_PAGE,
            ignore_total_pages: DEFAULT_IGNORE_TOTAL_PAGES,
            lean: false,
            projection: String::new(),
            select: String::new(),
            sort: None,
            collation: None,
            populate: None,
        }
    }
}

impl PaginateOptions {
    /// Create options with every field at its default
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options seeded from configured defaults
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_paginate::{config::Config, PaginateOptions};
    ///
    /// let config = Config::default();
    /// let options = PaginateOptions::from_config(&config.pagination);
    /// assert_eq!(options.per_page.get(), 10);
    /// ```
    #[must_use]
    pub fn from_config(defaults: &PaginationDefaults) -> Self {
        Self {
            per_page: defaults.per_page,
            ignore_total_pages: defaults.ignore_total_pages,
            lean: defaults.lean,
            ..Self::default()
        }
    }

    /// Parse options from a JSON object
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed input, including `page: 0` and
    /// `perPage: 0`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the requested page
    #[must_use]
    pub fn with_page(mut self, page: NonZeroU64) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the requested page from an unchecked integer
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] when `page` is zero.
    pub fn try_with_page(self, page: u64) -> Result<Self> {
        let page = NonZeroU64::new(page)
            .ok_or_else(|| Error::InvalidOptions("page must be at least 1".to_string()))?;
        Ok(self.with_page(page))
    }

    /// Set the number of items per page
    #[must_use]
    pub fn with_per_page(mut self, per_page: NonZeroU64) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the number of items per page from an unchecked integer
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] when `per_page` is zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_paginate::PaginateOptions;
    ///
    /// assert!(PaginateOptions::new().try_with_per_page(0).is_err());
    /// assert_eq!(PaginateOptions::new().try_with_per_page(5).unwrap().per_page.get(), 5);
    /// ```
    pub fn try_with_per_page(self, per_page: u64) -> Result<Self> {
        let per_page = NonZeroU64::new(per_page)
            .ok_or_else(|| Error::InvalidOptions("perPage must be at least 1".to_string()))?;
        Ok(self.with_per_page(per_page))
    }

    /// Choose the counting strategy
    #[must_use]
    pub fn with_ignore_total_pages(mut self, ignore_total_pages: bool) -> Self {
        self.ignore_total_pages = ignore_total_pages;
        self
    }

    /// Request plain documents
    #[must_use]
    pub fn with_lean(mut self, lean: bool) -> Self {
        self.lean = lean;
        self
    }

    /// Set the projection
    #[must_use]
    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = projection.into();
        self
    }

    /// Set the field selection
    #[must_use]
    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = select.into();
        self
    }

    /// Set the sort specification
    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<Value>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Set the collation
    #[must_use]
    pub fn with_collation(mut self, collation: Map<String, Value>) -> Self {
        self.collation = Some(collation);
        self
    }

    /// Set the population instruction
    #[must_use]
    pub fn with_populate(mut self, populate: impl Into<Value>) -> Self {
        self.populate = Some(populate.into());
        self
    }

    /// Whether a page was requested
    pub fn is_paginated(&self) -> bool {
        self.page.is_some()
    }

    /// The requested page as a plain integer
    pub fn page_number(&self) -> Option<u64> {
        self.page.map(NonZeroU64::get)
    }

    /// Whether the counted strategy is selected
    pub fn is_counted(&self) -> bool {
        !self.ignore_total_pages
    }

    /// The collation to apply, if it has at least one entry
    pub fn effective_collation(&self) -> Option<&Map<String, Value>> {
        self.collation.as_ref().filter(|collation| !collation.is_empty())
    }
}
