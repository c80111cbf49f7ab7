// src/document/html.rs
//
// HTML serialization of a Document subtree, for inspection and snapshots.

use super::tree::{Document, NodeId, NodeKind};

/// Elements serialized without a closing tag
const VOID_ELEMENTS: [&str; 6] = ["img", "br", "hr", "meta", "link", "input"];

impl Document {
    /// Serialize `node` and its subtree (outerHTML)
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Serialize the children of `node` (innerHTML)
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.node(node) else {
            return;
        };

        match &data.kind {
            NodeKind::Text(text) => {
                // <style> content is raw text
                if self.parent(node).and_then(|p| self.tag(p)) == Some("style") {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }

                for child in &data.children {
                    self.write_html(*child, out);
                }

                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
