#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Doclify structured text
//!
//! Structured text is the rich-text tree Doclify stores for rich-text fields:
//! nested `{type, content, attrs, marks, text}` objects. This crate reads that
//! tree leniently into a closed [`Node`] model and renders it to HTML.
//!
//! Rendering never fails. Unknown node types render as nothing, unknown
//! marks are skipped, and missing fields are treated as absent.
//!
//! ```
//! use serde_json::json;
//!
//! let doc = json!({
//!     "type": "doc",
//!     "content": [
//!         {"type": "paragraph", "content": [
//!             {"type": "text", "text": "Hello", "marks": [{"type": "bold"}]}
//!         ]}
//!     ]
//! });
//!
//! assert_eq!(
//!     doclify_structured_text::as_html(Some(&doc)),
//!     "<p><strong>Hello</strong></p>"
//! );
//! ```

mod node;
mod render;

pub use node::{Mark, MarkType, Node, NodeType};
pub use render::{HtmlRenderer, escape_html};

use serde_json::Value;

/// Render a typed node to HTML.
#[must_use]
pub fn serialize(node: &Node) -> String {
    HtmlRenderer::render(node)
}

/// Render an untyped JSON node to HTML.
#[must_use]
pub fn serialize_value(value: &Value) -> String {
    HtmlRenderer::render(&Node::from_value(value))
}

/// Render a document, treating an absent or `null` document as empty.
#[must_use]
pub fn as_html(document: Option<&Value>) -> String {
    match document {
        None | Some(Value::Null) => String::new(),
        Some(value) => serialize_value(value),
    }
}
