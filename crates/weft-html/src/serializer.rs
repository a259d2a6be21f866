//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)

use std::fmt::Write;

use weft_dom::{Attribute, Namespace};

use crate::tree_sink::{NodeKind, TreeSink};

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
/// source, track, wbr", plus the legacy elements the serializer also treats
/// as void.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// "If the parent of current node is a style, script, xmp, iframe, noembed,
/// noframes, or plaintext element, or if the parent of current node is a
/// noscript element and scripting is enabled for the node, then append the
/// value of current node's data IDL attribute literally."
const RAW_TEXT_PARENTS: &[&str] = &["style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext"];

/// The HTML fragment serialization algorithm over any [`TreeSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlSerializer {
    /// Whether `noscript` content is written literally, matching how a
    /// parser with scripting enabled reads it back.
    pub scripting_enabled: bool,
}

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self {
            scripting_enabled: true,
        }
    }
}

impl HtmlSerializer {
    /// The serialization of `node`'s children (`innerHTML`). For a `template`
    /// element this is its template contents.
    #[must_use]
    pub fn serialize_children<S: TreeSink>(&self, sink: &S, node: &S::Handle) -> String {
        let mut out = String::new();
        self.write_children(sink, node, &mut out);
        out
    }

    /// The serialization of `node` itself (`outerHTML`). Documents and
    /// fragments serialize their children.
    #[must_use]
    pub fn serialize_node<S: TreeSink>(&self, sink: &S, node: &S::Handle) -> String {
        let mut out = String::new();
        self.write_node(sink, node, &mut out);
        out
    }

    fn write_children<S: TreeSink>(self, sink: &S, node: &S::Handle, out: &mut String) {
        // "If the node is a template element, then let the node instead be the
        // template element's template contents."
        let node = sink.template_contents(node).unwrap_or_else(|| node.clone());
        for child in sink.children(&node) {
            self.write_node(sink, &child, out);
        }
    }

    fn write_node<S: TreeSink>(self, sink: &S, node: &S::Handle, out: &mut String) {
        match sink.node_kind(node) {
            NodeKind::Document | NodeKind::DocumentFragment => self.write_children(sink, node, out),
            NodeKind::Element {
                tag_name,
                namespace,
                attributes,
            } => {
                // "If current node is an element in the HTML namespace, the
                // MathML namespace, or the SVG namespace, then let tagname be
                // current node's local name."
                out.push('<');
                out.push_str(tag_name);
                for attr in attributes {
                    let _ = write!(out, " {}=\"{}\"", serialized_attribute_name(attr), escape(&attr.value, true));
                }
                out.push('>');
                // "If current node serializes as void, then continue on to the
                // next child node at this point."
                if namespace == Namespace::Html && VOID_ELEMENTS.contains(&tag_name) {
                    return;
                }
                self.write_children(sink, node, out);
                let _ = write!(out, "</{tag_name}>");
            }
            NodeKind::Text(data) => {
                if self.is_raw_text_parent(sink, node) {
                    out.push_str(data);
                } else {
                    out.push_str(&escape(data, false));
                }
            }
            // "Append "<!--", the value of current node's data IDL attribute,
            // followed by the literal string "-->"."
            NodeKind::Comment(data) => {
                let _ = write!(out, "<!--{data}-->");
            }
            // "Append "<!DOCTYPE", a space, the value of current node's name
            // IDL attribute, followed by ">"."
            NodeKind::DocumentType { name, .. } => {
                let _ = write!(out, "<!DOCTYPE {name}>");
            }
        }
    }

    fn is_raw_text_parent<S: TreeSink>(self, sink: &S, node: &S::Handle) -> bool {
        let Some(parent) = sink.parent(node) else {
            return false;
        };
        if sink.namespace(&parent) != Some(Namespace::Html) {
            return false;
        }
        sink.tag_name(&parent).is_some_and(|tag| {
            RAW_TEXT_PARENTS.contains(&tag) || (tag == "noscript" && self.scripting_enabled)
        })
    }
}

/// [§ 13.3](https://html.spec.whatwg.org/multipage/parsing.html#attribute's-serialized-name)
/// "An attribute's serialized name for the purposes of the previous paragraph
/// must be determined as follows:"
fn serialized_attribute_name(attr: &Attribute) -> String {
    match attr.namespace {
        // "If the attribute is in the XML namespace: The attribute's serialized
        // name is the string "xml:" followed by the attribute's local name."
        Some(Namespace::Xml) => format!("xml:{}", attr.name),
        // "If the attribute is in the XMLNS namespace and the attribute's local
        // name is xmlns: The attribute's serialized name is the string "xmlns"."
        Some(Namespace::Xmlns) if attr.name == "xmlns" => "xmlns".to_string(),
        // "If the attribute is in the XMLNS namespace and the attribute's local
        // name is not xmlns: ... the string "xmlns:" followed by the
        // attribute's local name."
        Some(Namespace::Xmlns) => format!("xmlns:{}", attr.name),
        // "If the attribute is in the XLink namespace: ... the string "xlink:"
        // followed by the attribute's local name."
        Some(Namespace::XLink) => format!("xlink:{}", attr.name),
        _ => attr.qualified_name(),
    }
}

/// [§ 13.3](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
///
/// "1. Replace any occurrence of the "&" character by the string "&amp;".
/// 2. Replace any occurrences of the U+00A0 NO-BREAK SPACE character by the
/// string "&nbsp;".
/// 3. If the algorithm was invoked in the attribute mode, then replace any
/// occurrences of the """ character by the string "&quot;".
/// 4. If the algorithm was not invoked in the attribute mode, then replace any
/// occurrences of the "<" character by the string "&lt;", and any occurrences
/// of the ">" character by the string "&gt;"."
fn escape(text: &str, attribute_mode: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' if !attribute_mode => out.push_str("&lt;"),
            '>' if !attribute_mode => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize `node`'s children with the default settings.
#[must_use]
pub fn serialize_children<S: TreeSink>(sink: &S, node: &S::Handle) -> String {
    HtmlSerializer::default().serialize_children(sink, node)
}

/// Serialize `node` itself with the default settings.
#[must_use]
pub fn serialize_node<S: TreeSink>(sink: &S, node: &S::Handle) -> String {
    HtmlSerializer::default().serialize_node(sink, node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_escaping() {
        assert_eq!(escape("a < b & c > d", false), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape("\u{A0}", false), "&nbsp;");
    }

    #[test]
    fn test_attribute_escaping_keeps_angle_brackets() {
        assert_eq!(escape("say \"<hi>\"", true), "say &quot;<hi>&quot;");
    }

    #[test]
    fn test_foreign_attribute_names() {
        let mut href = Attribute::new("href", "#a");
        href.prefix = Some("xlink".to_string());
        href.namespace = Some(Namespace::XLink);
        assert_eq!(serialized_attribute_name(&href), "xlink:href");

        let mut xmlns = Attribute::new("xmlns", "http://www.w3.org/2000/svg");
        xmlns.namespace = Some(Namespace::Xmlns);
        assert_eq!(serialized_attribute_name(&xmlns), "xmlns");

        assert_eq!(serialized_attribute_name(&Attribute::new("class", "x")), "class");
    }
}
