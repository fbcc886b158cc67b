use std::path::PathBuf;

use acton_paginate::config::PaginationDefaults;
use acton_paginate::memory::MemoryCollection;
use acton_paginate::{paginate, Filter, PaginateOptions};
use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};

use super::{build_options, PageArgs};

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// JSON file holding an array of documents
    #[arg(short, long, value_name = "PATH")]
    pub file: PathBuf,

    /// Filter as a JSON object of field/value equalities
    #[arg(long, value_name = "JSON")]
    pub filter: Option<String>,

    /// Sort as `"name -createdAt"` or a JSON object
    #[arg(long, value_name = "SPEC")]
    pub sort: Option<String>,

    /// Field selection applied after the fetch
    #[arg(long, value_name = "FIELDS")]
    pub select: Option<String>,

    /// Projection passed to the initial find
    #[arg(long, value_name = "FIELDS")]
    pub projection: Option<String>,

    /// Collation as a JSON object
    #[arg(long, value_name = "JSON")]
    pub collation: Option<String>,

    /// Population instruction
    #[arg(long, value_name = "PATHS")]
    pub populate: Option<String>,

    /// Request plain documents
    #[arg(long)]
    pub lean: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

fn parse_object(flag: &str, raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(raw).with_context(|| format!("--{flag} is not valid JSON"))? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("--{flag} must be a JSON object, got {other}"),
    }
}

fn parse_sort(raw: &str) -> Result<Value> {
    if raw.trim_start().starts_with('{') {
        Ok(Value::Object(parse_object("sort", raw)?))
    } else {
        Ok(Value::String(raw.to_string()))
    }
}

fn query_options(args: &QueryArgs, defaults: &PaginationDefaults) -> Result<PaginateOptions> {
    let mut options = build_options(&args.page, defaults)?;

    if args.lean {
        options = options.with_lean(true);
    }
    if let Some(projection) = &args.projection {
        options = options.with_projection(projection.as_str());
    }
    if let Some(select) = &args.select {
        options = options.with_select(select.as_str());
    }
    if let Some(sort) = &args.sort {
        options = options.with_sort(parse_sort(sort)?);
    }
    if let Some(collation) = &args.collation {
        options = options.with_collation(parse_object("collation", collation)?);
    }
    if let Some(populate) = &args.populate {
        options = options.with_populate(populate.as_str());
    }

    Ok(options)
}

/// Paginate the documents in `args.file` and return the page as JSON
pub async fn execute(args: &QueryArgs, defaults: &PaginationDefaults) -> Result<Value> {
    let collection = MemoryCollection::from_path(&args.file)
        .with_context(|| format!("Failed to read documents from {}", args.file.display()))?;

    let conditions: Option<Filter> = args
        .filter
        .as_deref()
        .map(|raw| parse_object("filter", raw))
        .transpose()?;
    let options = query_options(args, defaults)?;

    let page = paginate(&collection, conditions, options).await?;
    Ok(serde_json::to_value(page)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn documents_file() -> tempfile::NamedTempFile {
        let docs: Vec<Value> = (1..=12)
            .map(|n| json!({ "_id": n, "name": format!("item-{n:02}"), "even": n % 2 == 0 }))
            .collect();
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(serde_json::to_string(&docs).unwrap().as_bytes())
            .unwrap();
        file
    }

    fn args(file: &tempfile::NamedTempFile) -> QueryArgs {
        QueryArgs {
            file: file.path().to_path_buf(),
            filter: None,
            sort: None,
            select: None,
            projection: None,
            collation: None,
            populate: None,
            lean: false,
            page: PageArgs::default(),
        }
    }

    #[test]
    fn test_parse_sort_accepts_string_and_object() {
        assert_eq!(parse_sort("name -_id").unwrap(), json!("name -_id"));
        assert_eq!(parse_sort(r#"{"name": -1}"#).unwrap(), json!({ "name": -1 }));
        assert!(parse_sort("{not json").is_err());
    }

    #[test]
    fn test_parse_object_rejects_non_objects() {
        let err = parse_object("filter", "[1, 2]").unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[tokio::test]
    async fn test_query_counted_page() {
        let file = documents_file();
        let mut args = args(&file);
        args.page = PageArgs {
            page: Some(2),
            per_page: Some(5),
            counted: true,
            uncounted: false,
        };

        let value = execute(&args, &PaginationDefaults::default()).await.unwrap();
        assert_eq!(value["data"].as_array().unwrap().len(), 5);
        assert_eq!(value["data"][0]["_id"], json!(6));
        assert_eq!(value["pagination"]["totalPages"], json!(3));
        assert_eq!(value["pagination"]["nextPage"], json!(3));
    }

    #[tokio::test]
    async fn test_query_filter_sort_and_select() {
        let file = documents_file();
        let mut args = args(&file);
        args.filter = Some(r#"{"even": true}"#.to_string());
        args.sort = Some("-_id".to_string());
        args.select = Some("name".to_string());
        args.page = PageArgs {
            page: Some(1),
            per_page: Some(4),
            ..PageArgs::default()
        };

        let value = execute(&args, &PaginationDefaults::default()).await.unwrap();
        assert_eq!(
            value["data"],
            json!([
                { "_id": 12, "name": "item-12" },
                { "_id": 10, "name": "item-10" },
                { "_id": 8, "name": "item-08" },
                { "_id": 6, "name": "item-06" },
            ])
        );
        assert_eq!(value["pagination"]["hasNextPage"], json!(true));
        assert_eq!(value["pagination"]["prevPage"], json!(1));
    }

    #[tokio::test]
    async fn test_query_missing_file() {
        let mut args = args(&documents_file());
        args.file = PathBuf::from("/nonexistent/documents.json");

        let err = execute(&args, &PaginationDefaults::default()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read documents"));
    }
}
