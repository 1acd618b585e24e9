//! Query flags shared by `search`, `paginate` and `first`.

use anyhow::{Result, bail};
use clap::Args;
use doclify_sdk::{Documents, Operator, SortDirection};
use serde_json::Value;

#[derive(Args, Debug, Default, Clone)]
pub struct QueryArgs {
    /// Restrict to a collection (`sys.collection`)
    #[arg(long)]
    pub collection: Option<String>,

    /// Restrict to a content type (`sys.contentType`)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Filter as FIELD:OP:VALUE or FIELD:VALUE (eq); VALUE is JSON or a bare string
    #[arg(long = "where", value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Related fields to resolve (comma separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Fields to return (comma separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Sort key as FIELD or FIELD:asc|desc; repeatable
    #[arg(long, value_name = "ORDER")]
    pub order: Vec<String>,

    /// Content language
    #[arg(long)]
    pub lang: Option<String>,
}

impl QueryArgs {
    /// Applies the flags to `documents` in a fixed order: collection, content
    /// type, `--where` filters, include, select, `--order` keys, language.
    /// Repeated `--where` and `--order` flags keep their command line order.
    ///
    /// # Errors
    /// Returns an error for a malformed `--where` or `--order` value.
    pub fn apply(&self, mut documents: Documents) -> Result<Documents> {
        if let Some(collection) = &self.collection {
            documents = documents.collection(collection.as_str());
        }
        if let Some(content_type) = &self.content_type {
            documents = documents.content_type(content_type.as_str());
        }
        for raw in &self.filters {
            let filter = parse_filter(raw)?;
            documents = documents.filter(filter.field, filter.operator, filter.value);
        }
        if !self.include.is_empty() {
            documents = documents.include(self.include.iter().map(String::as_str));
        }
        if !self.select.is_empty() {
            documents = documents.select(self.select.iter().map(String::as_str));
        }
        for raw in &self.order {
            let (field, direction) = parse_order(raw)?;
            documents = documents.order_by(field, direction);
        }
        if let Some(lang) = &self.lang {
            documents = documents.lang(lang.as_str());
        }
        Ok(documents)
    }
}

#[derive(Debug, PartialEq)]
pub struct FilterArg {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

/// Parses `FIELD:OP:VALUE` or `FIELD:VALUE`.
///
/// The middle segment is an operator only when it is a known tag; otherwise
/// everything after the field is an `eq` value, so `data.url:https://x` works.
///
/// # Errors
/// Returns an error if the field is empty or there is no value.
pub fn parse_filter(raw: &str) -> Result<FilterArg> {
    let Some((field, rest)) = raw.split_once(':') else {
        bail!("filter '{raw}' must be FIELD:OP:VALUE or FIELD:VALUE");
    };
    if field.is_empty() {
        bail!("filter '{raw}' has no field name");
    }

    let (operator, value) = rest
        .split_once(':')
        .and_then(|(tag, value)| Operator::from_tag(tag).map(|op| (op, value)))
        .unwrap_or((Operator::Eq, rest));

    Ok(FilterArg {
        field: field.to_owned(),
        operator,
        value: parse_value(value),
    })
}

// JSON when it parses, otherwise the literal string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// Parses `FIELD` or `FIELD:asc|desc`.
///
/// # Errors
/// Returns an error for an unknown direction.
pub fn parse_order(raw: &str) -> Result<(String, SortDirection)> {
    match raw.rsplit_once(':') {
        None => Ok((raw.to_owned(), SortDirection::Asc)),
        Some((field, "asc")) => Ok((field.to_owned(), SortDirection::Asc)),
        Some((field, "desc")) => Ok((field.to_owned(), SortDirection::Desc)),
        Some((_, other)) => bail!("unknown sort direction '{other}' in '{raw}'"),
    }
}
