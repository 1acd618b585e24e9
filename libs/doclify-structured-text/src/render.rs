use crate::node::{Mark, Node};

/// HTML renderer for structured text.
pub struct HtmlRenderer;

impl HtmlRenderer {
    /// Render a node (and its subtree) to an HTML string
    #[must_use]
    pub fn render(node: &Node) -> String {
        let mut output = String::new();
        Self::render_node(node, &mut output);
        output
    }

    fn render_children(children: &[Node], output: &mut String) {
        for child in children {
            Self::render_node(child, output);
        }
    }

    fn render_wrapped(open: &str, children: &[Node], close: &str, output: &mut String) {
        output.push_str(open);
        Self::render_children(children, output);
        output.push_str(close);
    }

    fn render_node(node: &Node, output: &mut String) {
        match node {
            Node::Doc(children) => Self::render_children(children, output),
            Node::Paragraph(children) => Self::render_wrapped("<p>", children, "</p>", output),
            Node::Heading { level, content } => {
                let open = format!("<h{level}>");
                let close = format!("</h{level}>");
                Self::render_wrapped(&open, content, &close, output);
            }
            Node::Image { url } => {
                output.push_str("<p><img src=\"");
                output.push_str(&escape_html(url));
                output.push_str("\"></p>");
            }
            Node::Text { text, marks } => Self::render_text(text, marks, output),
            Node::BulletList(children) => Self::render_wrapped("<ul>", children, "</ul>", output),
            Node::OrderedList(children) => Self::render_wrapped("<ol>", children, "</ol>", output),
            Node::ListItem(children) => Self::render_wrapped("<li>", children, "</li>", output),
            Node::HardBreak => output.push_str("<br>"),
            Node::Table(children) => Self::render_wrapped(
                "<table><tbody>",
                children,
                "</tbody></table>",
                output,
            ),
            Node::TableRow(children) => Self::render_wrapped("<tr>", children, "</tr>", output),
            Node::TableHeader { attrs, content } => Self::render_cell("th", attrs, content, output),
            Node::TableCell { attrs, content } => Self::render_cell("td", attrs, content, output),
            Node::Unknown => {}
        }
    }

    /// Each mark wraps everything produced so far, so the first mark ends up innermost.
    fn render_text(text: &str, marks: &[Mark], output: &mut String) {
        let mut html = escape_html(text);

        for mark in marks {
            html = match mark {
                Mark::Bold => format!("<strong>{html}</strong>"),
                Mark::Italic => format!("<em>{html}</em>"),
                Mark::Underline => {
                    format!("<span style=\"text-decoration:underline\">{html}</span>")
                }
                Mark::Link { href, target } => {
                    let href = escape_html(href);
                    match target {
                        Some(target) => format!(
                            "<a href=\"{href}\" target=\"{}\" rel=\"noopener\">{html}</a>",
                            escape_html(target)
                        ),
                        None => format!("<a href=\"{href}\">{html}</a>"),
                    }
                }
                Mark::Unknown => continue,
            };
        }

        output.push_str(&html);
    }

    /// The tag name is always followed by a space, so a cell without
    /// attributes opens as `<td >`.
    fn render_cell(tag: &str, attrs: &[(String, String)], content: &[Node], output: &mut String) {
        output.push('<');
        output.push_str(tag);
        output.push(' ');
        for (i, (name, value)) in attrs.iter().enumerate() {
            if i > 0 {
                output.push(' ');
            }
            output.push_str(name);
            output.push_str("=\"");
            output.push_str(&escape_html(value));
            output.push('"');
        }
        output.push('>');
        Self::render_children(content, output);
        output.push_str("</");
        output.push_str(tag);
        output.push('>');
    }
}

/// Escape `&`, `<`, `>`, `"` and `'` for use in HTML text and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
