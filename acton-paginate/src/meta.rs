//! Pagination metadata
//!
//! [`build_pagination`] turns the options and a count into the descriptor
//! returned next to the fetched documents.
//!
//! The two counting strategies report neighbours differently:
//!
//! - **Counted**: `prevPage`/`nextPage` are `null` when there is no such page,
//!   and `totalPages` is reported.
//! - **Uncounted**: `prevPage` is `1` on the first page and `nextPage` repeats
//!   the current page when the fetch came back short. Consumers depend on both.
//!
//! # Example
//!
//! ```rust
//! use acton_paginate::{build_pagination, PaginateOptions};
//!
//! let options = PaginateOptions::new().try_with_page(5).unwrap();
//! let meta = build_pagination(&options, 3);
//! assert!(!meta.has_next_page);
//! assert_eq!(meta.next_page, Some(5));
//! assert_eq!(meta.total_pages, None);
//! ```

use serde::{Deserialize, Serialize};

use crate::options::PaginateOptions;
use crate::query::total_pages;

/// Descriptor of the page that was served
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Requested page, echoed unclamped. Absent when not paginating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    /// Items per page
    pub per_page: u64,
    /// Whether a previous page exists
    pub has_prev_page: bool,
    /// Whether a next page exists
    pub has_next_page: bool,
    /// Previous page number
    pub prev_page: Option<u64>,
    /// Next page number
    pub next_page: Option<u64>,
    /// Total number of pages, counted mode only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

impl PaginationMeta {
    /// Descriptor for an unpaginated listing
    #[must_use]
    pub const fn unpaginated(per_page: u64) -> Self {
        Self {
            page: None,
            per_page,
            has_prev_page: false,
            has_next_page: false,
            prev_page: None,
            next_page: None,
            total_pages: None,
        }
    }
}

/// Build the descriptor for a served page
///
/// `count` is the eager total in counted mode and the number of documents
/// actually returned in uncounted mode.
pub fn build_pagination(options: &PaginateOptions, count: u64) -> PaginationMeta {
    let per_page = options.per_page.get();
    let mut meta = PaginationMeta::unpaginated(per_page);

    let Some(page) = options.page_number() else {
        return meta;
    };
    meta.page = Some(page);
    meta.has_prev_page = page > 1;

    if options.is_counted() {
        let total = total_pages(count, options.per_page);
        let clamped = page.min(total);
        meta.total_pages = Some(total);
        if meta.has_prev_page {
            meta.prev_page = Some(page - 1);
        }
        if clamped < total {
            meta.has_next_page = true;
            meta.next_page = Some(clamped + 1);
        }
    } else {
        meta.prev_page = Some(if meta.has_prev_page { page - 1 } else { 1 });
        // u64::MAX has no successor, so it is always the last page
        let next = page.checked_add(1).filter(|_| count == per_page);
        meta.has_next_page = next.is_some();
        meta.next_page = Some(next.unwrap_or(page));
    }

    meta
}
