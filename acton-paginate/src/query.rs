//! Skip/limit derivation
//!
//! Turns [`PaginateOptions`] plus a count into the window handed to the
//! collaborator's query builder. In counted mode the requested page is clamped
//! to the last existing page; in uncounted mode no total is known, so a page
//! past the end simply yields an empty fetch.
//!
//! # Example
//!
//! ```rust
//! use acton_paginate::{derive_query_params, PaginateOptions, QueryParams};
//!
//! let options = PaginateOptions::new()
//!     .try_with_page(2)
//!     .unwrap()
//!     .with_ignore_total_pages(false);
//! assert_eq!(derive_query_params(&options, 25), Some(QueryParams::new(10, 10)));
//! ```

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::options::PaginateOptions;

/// Offset and page size for a single fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Number of documents to skip
    pub skip: u64,
    /// Maximum number of documents to return
    pub limit: u64,
}

impl QueryParams {
    /// Create a window from explicit values
    #[must_use]
    pub const fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }

    /// Window for a 1-indexed page
    ///
    /// Page 0 is treated as page 1 and the skip saturates at `u64::MAX`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::num::NonZeroU64;
    /// use acton_paginate::QueryParams;
    ///
    /// let per_page = NonZeroU64::new(20).unwrap();
    /// assert_eq!(QueryParams::for_page(3, per_page), QueryParams::new(40, 20));
    /// ```
    #[must_use]
    pub const fn for_page(page: u64, per_page: NonZeroU64) -> Self {
        let per_page = per_page.get();
        Self {
            skip: page.saturating_sub(1).saturating_mul(per_page),
            limit: per_page,
        }
    }
}

/// Total number of pages for `count` items, never less than one
///
/// # Example
///
/// ```rust
/// use std::num::NonZeroU64;
/// use acton_paginate::total_pages;
///
/// let per_page = NonZeroU64::new(10).unwrap();
/// assert_eq!(total_pages(0, per_page), 1);
/// assert_eq!(total_pages(25, per_page), 3);
/// ```
#[must_use]
pub const fn total_pages(count: u64, per_page: NonZeroU64) -> u64 {
    let per_page = per_page.get();
    let pages = count / per_page + if count % per_page == 0 { 0 } else { 1 };
    if pages == 0 {
        1
    } else {
        pages
    }
}

/// Derive skip/limit for a fetch
///
/// Returns `None` when no page was requested: the caller fetches every
/// matching document. `count_for_clamping` is only consulted in counted mode.
pub fn derive_query_params(
    options: &PaginateOptions,
    count_for_clamping: u64,
) -> Option<QueryParams> {
    let page = options.page_number()?;
    let page = if options.is_counted() {
        page.min(total_pages(count_for_clamping, options.per_page))
    } else {
        page
    };
    Some(QueryParams::for_page(page, options.per_page))
}
