//! Typed structured text model.
//!
//! Conversion from JSON is total: anything that does not look like a known
//! node becomes [`Node::Unknown`], anything that does not look like a known
//! mark becomes [`Mark::Unknown`].

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Node type tag, as found in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Image,
    Text,
    BulletList,
    OrderedList,
    ListItem,
    HardBreak,
    Table,
    TableRow,
    TableHeader,
    TableCell,
    Unknown,
}

impl NodeType {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "doc" => Self::Doc,
            "paragraph" => Self::Paragraph,
            "heading" => Self::Heading,
            "image" => Self::Image,
            "text" => Self::Text,
            "bullet_list" => Self::BulletList,
            "ordered_list" => Self::OrderedList,
            "list_item" => Self::ListItem,
            "hard_break" => Self::HardBreak,
            "table" => Self::Table,
            "table_row" => Self::TableRow,
            "table_header" => Self::TableHeader,
            "table_cell" => Self::TableCell,
            _ => Self::Unknown,
        }
    }
}

/// Mark type tag, as found in a mark's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkType {
    Bold,
    Italic,
    Underline,
    Link,
    Unknown,
}

impl MarkType {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "underline" => Self::Underline,
            "link" => Self::Link,
            _ => Self::Unknown,
        }
    }
}

/// Inline formatting applied to a text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Link {
        href: String,
        /// Only set when the source value was truthy.
        target: Option<String>,
    },
    Unknown,
}

impl Mark {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Unknown;
        };

        match MarkType::from_tag(type_tag(obj)) {
            MarkType::Bold => Self::Bold,
            MarkType::Italic => Self::Italic,
            MarkType::Underline => Self::Underline,
            MarkType::Link => {
                let attrs = attrs_of(obj);
                Self::Link {
                    href: attrs
                        .and_then(|a| a.get("href"))
                        .and_then(scalar_text)
                        .unwrap_or_default(),
                    target: attrs.and_then(|a| a.get("target")).and_then(truthy_text),
                }
            }
            MarkType::Unknown => Self::Unknown,
        }
    }

    #[must_use]
    pub fn mark_type(&self) -> MarkType {
        match self {
            Self::Bold => MarkType::Bold,
            Self::Italic => MarkType::Italic,
            Self::Underline => MarkType::Underline,
            Self::Link { .. } => MarkType::Link,
            Self::Unknown => MarkType::Unknown,
        }
    }
}

/// A structured text node.
///
/// Container variants carry their children; a missing `content` field is an
/// empty child list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Doc(Vec<Node>),
    Paragraph(Vec<Node>),
    Heading {
        /// Written as given, without range checks; 1 when missing or not an integer.
        level: i64,
        content: Vec<Node>,
    },
    Image {
        url: String,
    },
    Text {
        text: String,
        marks: Vec<Mark>,
    },
    BulletList(Vec<Node>),
    OrderedList(Vec<Node>),
    ListItem(Vec<Node>),
    HardBreak,
    Table(Vec<Node>),
    TableRow(Vec<Node>),
    TableHeader {
        /// Truthy attributes in source order, values already stringified.
        attrs: Vec<(String, String)>,
        content: Vec<Node>,
    },
    TableCell {
        attrs: Vec<(String, String)>,
        content: Vec<Node>,
    },
    Unknown,
}

impl Node {
    /// Read a node from untyped JSON. Never fails.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Unknown;
        };

        match NodeType::from_tag(type_tag(obj)) {
            NodeType::Doc => Self::Doc(children(obj)),
            NodeType::Paragraph => Self::Paragraph(children(obj)),
            NodeType::Heading => Self::Heading {
                level: heading_level(attrs_of(obj).and_then(|a| a.get("level"))),
                content: children(obj),
            },
            NodeType::Image => Self::Image {
                url: attrs_of(obj)
                    .and_then(|a| a.get("url"))
                    .and_then(scalar_text)
                    .unwrap_or_default(),
            },
            NodeType::Text => Self::Text {
                text: obj.get("text").and_then(scalar_text).unwrap_or_default(),
                marks: obj
                    .get("marks")
                    .and_then(Value::as_array)
                    .map(|marks| marks.iter().map(Mark::from_value).collect())
                    .unwrap_or_default(),
            },
            NodeType::BulletList => Self::BulletList(children(obj)),
            NodeType::OrderedList => Self::OrderedList(children(obj)),
            NodeType::ListItem => Self::ListItem(children(obj)),
            NodeType::HardBreak => Self::HardBreak,
            NodeType::Table => Self::Table(children(obj)),
            NodeType::TableRow => Self::TableRow(children(obj)),
            NodeType::TableHeader => Self::TableHeader {
                attrs: cell_attrs(obj),
                content: children(obj),
            },
            NodeType::TableCell => Self::TableCell {
                attrs: cell_attrs(obj),
                content: children(obj),
            },
            NodeType::Unknown => Self::Unknown,
        }
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Doc(_) => NodeType::Doc,
            Self::Paragraph(_) => NodeType::Paragraph,
            Self::Heading { .. } => NodeType::Heading,
            Self::Image { .. } => NodeType::Image,
            Self::Text { .. } => NodeType::Text,
            Self::BulletList(_) => NodeType::BulletList,
            Self::OrderedList(_) => NodeType::OrderedList,
            Self::ListItem(_) => NodeType::ListItem,
            Self::HardBreak => NodeType::HardBreak,
            Self::Table(_) => NodeType::Table,
            Self::TableRow(_) => NodeType::TableRow,
            Self::TableHeader { .. } => NodeType::TableHeader,
            Self::TableCell { .. } => NodeType::TableCell,
            Self::Unknown => NodeType::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

fn type_tag(obj: &Map<String, Value>) -> &str {
    obj.get("type").and_then(Value::as_str).unwrap_or_default()
}

fn attrs_of(obj: &Map<String, Value>) -> Option<&Map<String, Value>> {
    obj.get("attrs").and_then(Value::as_object)
}

fn children(obj: &Map<String, Value>) -> Vec<Node> {
    obj.get("content")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(Node::from_value).collect())
        .unwrap_or_default()
}

fn heading_level(value: Option<&Value>) -> i64 {
    let level = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    level.unwrap_or(1)
}

/// Stringify a scalar; `null`, arrays and objects have no text form.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Stringify a value only if it is truthy.
///
/// Falsy: `null`, `false`, `0`, `""`, `"0"`, `[]` and objects. `true` is
/// written as `1`. Arrays of scalars are joined with `,` (e.g.
/// `colwidth: [100, 200]` → `100,200`).
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) | Value::Object(_) => None,
        Value::Bool(true) => Some("1".to_owned()),
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|f| f.abs() >= f64::EPSILON)
            .then(|| n.to_string()),
        Value::String(s) => (!s.is_empty() && s != "0").then(|| s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join(","))
        }
    }
}

fn cell_attrs(obj: &Map<String, Value>) -> Vec<(String, String)> {
    attrs_of(obj)
        .map(|attrs| {
            attrs
                .iter()
                .filter_map(|(name, value)| truthy_text(value).map(|v| (name.clone(), v)))
                .collect()
        })
        .unwrap_or_default()
}
