//! Tree dumps in the html5lib tree-construction test format.
//!
//! ```text
//! | <!DOCTYPE html>
//! | <html>
//! |   <head>
//! |   <body>
//! |     <svg svg>
//! |       viewBox="0 0 1 1"
//! |     "text"
//! ```

use std::fmt::Write;

use weft_dom::{Attribute, Namespace};

use crate::tree_sink::{NodeKind, TreeSink};

/// Dump the children of `root` (a Document or `DocumentFragment`), one node
/// per line.
#[must_use]
pub fn dump_tree<S: TreeSink>(sink: &S, root: &S::Handle) -> String {
    let mut out = String::new();
    for child in sink.children(root) {
        dump_node(sink, &child, 0, &mut out);
    }
    out
}

fn line(out: &mut String, depth: usize, content: &str) {
    let _ = writeln!(out, "| {}{content}", "  ".repeat(depth));
}

/// How an attribute name is shown: `xlink href` for adjusted foreign
/// attributes, the plain name otherwise.
fn attribute_display_name(attr: &Attribute) -> String {
    match (attr.namespace, attr.prefix.as_deref()) {
        (Some(Namespace::XLink), _) => format!("xlink {}", attr.name),
        (Some(Namespace::Xml), _) => format!("xml {}", attr.name),
        (Some(Namespace::Xmlns), Some(_)) => format!("xmlns {}", attr.name),
        _ => attr.name.clone(),
    }
}

fn dump_node<S: TreeSink>(sink: &S, node: &S::Handle, depth: usize, out: &mut String) {
    match sink.node_kind(node) {
        NodeKind::Document | NodeKind::DocumentFragment => {}
        NodeKind::DocumentType {
            name,
            public_id,
            system_id,
        } => {
            if public_id.is_empty() && system_id.is_empty() {
                line(out, depth, &format!("<!DOCTYPE {name}>"));
            } else {
                line(out, depth, &format!("<!DOCTYPE {name} \"{public_id}\" \"{system_id}\">"));
            }
        }
        NodeKind::Text(data) => line(out, depth, &format!("\"{data}\"")),
        NodeKind::Comment(data) => line(out, depth, &format!("<!-- {data} -->")),
        NodeKind::Element {
            tag_name,
            namespace,
            attributes,
        } => {
            let name = match namespace {
                Namespace::Svg => format!("svg {tag_name}"),
                Namespace::MathMl => format!("math {tag_name}"),
                _ => tag_name.to_string(),
            };
            line(out, depth, &format!("<{name}>"));

            let mut shown: Vec<(String, &str)> = attributes
                .iter()
                .map(|attr| (attribute_display_name(attr), attr.value.as_str()))
                .collect();
            shown.sort();
            for (attr_name, value) in shown {
                line(out, depth + 1, &format!("{attr_name}=\"{value}\""));
            }

            if let Some(contents) = sink.template_contents(node) {
                line(out, depth + 1, "content");
                for child in sink.children(&contents) {
                    dump_node(sink, &child, depth + 2, out);
                }
            }
        }
    }
    for child in sink.children(node) {
        dump_node(sink, &child, depth + 1, out);
    }
}
