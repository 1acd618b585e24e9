//! Query model for the Doclify document API.
//!
//! A [`QuerySpec`] accumulates filter predicates, include/select projections,
//! ordering and a language tag. [`QuerySpec::compile`] flattens it into
//! [`QueryParams`], the string-valued parameter set sent on the wire:
//!
//! | key       | value                                      | present          |
//! |-----------|--------------------------------------------|------------------|
//! | `q`       | JSON array of `[field, operator, value]`   | always           |
//! | `include` | JSON array of field paths                  | when non-empty   |
//! | `select`  | JSON array of field paths                  | when non-empty   |
//! | `order`   | JSON array of `[field, direction]`         | when non-empty   |
//! | `lang`    | language tag                               | when set         |
//!
//! Per-call extras (`limit`, `page`, `perPage`) are merged last.
//! Compilation is deterministic, which keeps cache keys stable.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Value, json};
use std::fmt;

/// Filter operator understood by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Operator {
    #[default]
    Eq,
    Not,
    In,
    Nin,
    Gt,
    Gte,
    Lt,
    Lte,
    Fulltext,
    Match,
}

impl Operator {
    /// Wire tag of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Not => "not",
            Self::In => "in",
            Self::Nin => "nin",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Fulltext => "fulltext",
            Self::Match => "match",
        }
    }

    /// Parses a wire tag, as accepted on the command line.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "eq" => Self::Eq,
            "not" => Self::Not,
            "in" => Self::In,
            "nin" => Self::Nin,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "fulltext" => Self::Fulltext,
            "match" => Self::Match,
            _ => return None,
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `[field, operator, value]` filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Predicate {
    #[must_use]
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    fn to_json(&self) -> Value {
        json!([self.field, self.operator.as_str(), self.value])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderKey {
    fn to_json(&self) -> Value {
        json!([self.field, self.direction.as_str()])
    }
}

/// Insertion-ordered string parameters.
///
/// Re-inserting an existing key replaces its value in place, so the key keeps
/// its original position. Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Merges `other` into `self`; keys from `other` win.
    pub fn extend(&mut self, other: QueryParams) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compact JSON object in insertion order; the same form [`Serialize`]
    /// produces.
    #[must_use]
    pub fn to_canonical_json(&self) -> String {
        // String keys and values cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl Serialize for QueryParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Accumulated query state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub predicates: Vec<Predicate>,
    pub include: Vec<String>,
    pub select: Vec<String>,
    pub order: Vec<OrderKey>,
    pub lang: Option<String>,
}

impl QuerySpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens the accumulated query into wire parameters, then merges `extras`.
    #[must_use]
    pub fn compile(&self, extras: QueryParams) -> QueryParams {
        let mut params = QueryParams::new();

        params.insert(
            "q",
            json_array(self.predicates.iter().map(Predicate::to_json)),
        );
        if !self.include.is_empty() {
            let fields = self.include.iter().map(|f| Value::from(f.as_str()));
            params.insert("include", json_array(fields));
        }
        if !self.select.is_empty() {
            let fields = self.select.iter().map(|f| Value::from(f.as_str()));
            params.insert("select", json_array(fields));
        }
        if !self.order.is_empty() {
            params.insert("order", json_array(self.order.iter().map(OrderKey::to_json)));
        }
        if let Some(lang) = &self.lang {
            params.insert("lang", lang.as_str());
        }

        params.extend(extras);
        params
    }
}

fn json_array(items: impl Iterator<Item = Value>) -> String {
    Value::Array(items.collect()).to_string()
}
