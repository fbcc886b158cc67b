use acton_paginate::config::PaginationDefaults;
use acton_paginate::{build_pagination, derive_query_params, PaginationMeta, QueryParams};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use super::{build_options, PageArgs};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Number of documents matching the filter
    #[arg(short, long, value_name = "N")]
    pub count: u64,

    #[command(flatten)]
    pub page: PageArgs,
}

/// Window and descriptor for one simulated listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Plan {
    query: Option<QueryParams>,
    pagination: PaginationMeta,
}

/// Compute what a listing over `count` documents would fetch and report
///
/// In uncounted mode the descriptor is built from the number of documents
/// the window would return, as a real fetch would.
pub fn execute(args: &PlanArgs, defaults: &PaginationDefaults) -> Result<Value> {
    let options = build_options(&args.page, defaults)?;
    let query = derive_query_params(&options, args.count);

    let observed = if options.is_counted() {
        args.count
    } else {
        match query {
            Some(window) => args.count.saturating_sub(window.skip).min(window.limit),
            None => args.count,
        }
    };

    let plan = Plan {
        query,
        pagination: build_pagination(&options, observed),
    };
    Ok(serde_json::to_value(plan)?)
}
