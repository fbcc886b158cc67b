//! # acton-paginate
//!
//! Page/skip/limit calculation and pagination metadata for paged listings
//! over document collections.
//!
//! ## Features
//!
//! - **Two counting strategies**: counted (eager count, total pages, clamped
//!   page window) and uncounted (next page inferred from a full fetch, no
//!   extra round-trip)
//! - **Store-agnostic**: works against any collaborator implementing
//!   [`PaginateSource`] and [`DocumentQuery`]
//! - **Explicit options**: [`PaginateOptions`] with documented defaults,
//!   loadable from JSON or seeded from [`config::Config`]
//! - **In-memory collaborator**: [`memory::MemoryCollection`] for tests and
//!   tooling (`memory` feature, on by default)
//!
//! ## Example
//!
//! ```rust
//! use acton_paginate::prelude::*;
//! use acton_paginate::memory::MemoryCollection;
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let orders = MemoryCollection::new((1..=42).map(|id| json!({ "_id": id })).collect());
//!
//! let options = PaginateOptions::new()
//!     .try_with_page(5)
//!     .unwrap()
//!     .with_ignore_total_pages(false);
//! let Paginated { data, pagination } = orders.paginate(None, options).await.unwrap();
//!
//! assert_eq!(data.len(), 2);
//! assert_eq!(pagination.total_pages, Some(5));
//! assert!(!pagination.has_next_page);
//! # });
//! ```

pub mod collaborator;
pub mod config;
pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod meta;
pub mod observability;
pub mod options;
pub mod paginate;
pub mod query;

pub use collaborator::{Collation, DocumentQuery, Filter, PaginateSource};
pub use error::{Error, Result};
pub use meta::{build_pagination, PaginationMeta};
pub use options::{PaginateOptions, DEFAULT_IGNORE_TOTAL_PAGES, DEFAULT_PER_PAGE};
pub use paginate::{paginate, paginate_with, PaginateExt, Paginated};
pub use query::{derive_query_params, total_pages, QueryParams};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collaborator::{Collation, DocumentQuery, Filter, PaginateSource};
    pub use crate::config::{Config, PaginationDefaults};
    pub use crate::error::{Error, Result};
    pub use crate::meta::{build_pagination, PaginationMeta};
    pub use crate::observability::init_tracing;
    pub use crate::options::PaginateOptions;
    pub use crate::paginate::{paginate, paginate_with, PaginateExt, Paginated};
    pub use crate::query::{derive_query_params, total_pages, QueryParams};
}
