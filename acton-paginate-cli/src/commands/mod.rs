pub mod plan;
pub mod query;

use acton_paginate::config::PaginationDefaults;
use acton_paginate::PaginateOptions;
use anyhow::Result;
use clap::Args;

/// Paging flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Page to serve (1-based, 0 rejected); omit to return everything
    #[arg(short, long)]
    pub page: Option<u64>,

    /// Items per page (defaults to `pagination.per_page`)
    #[arg(long, value_name = "N")]
    pub per_page: Option<u64>,

    /// Count matching documents and report total pages
    #[arg(long, conflicts_with = "uncounted")]
    pub counted: bool,

    /// Infer the next page from the fetch instead of counting
    #[arg(long)]
    pub uncounted: bool,
}

/// Turn CLI flags into options, falling back to configured defaults
pub fn build_options(args: &PageArgs, defaults: &PaginationDefaults) -> Result<PaginateOptions> {
    let mut options = PaginateOptions::from_config(defaults);

    if let Some(per_page) = args.per_page {
        options = options.try_with_per_page(per_page)?;
    }
    if let Some(page) = args.page {
        options = options.try_with_page(page)?;
    }
    if args.counted {
        options = options.with_ignore_total_pages(false);
    } else if args.uncounted {
        options = options.with_ignore_total_pages(true);
    }

    Ok(options)
}
