//! Weft CLI
//!
//! Parses an HTML document (or fragment) and prints the resulting tree.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use serde::Serialize;
use weft_dom::{DomTree, NodeId};
use weft_html::{
    HTMLParser, HtmlSerializer, NodeKind, ParseIssue, ParserOptions, ParserStep, TreeSink, create_context_element,
    dump_tree,
};

/// Weft: parse HTML the way a browser does and show the result
#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r"EXAMPLES:
    # Dump the tree of a file
    weft ./index.html

    # Parse inline HTML and list parse errors
    weft --html '<p><b>bold<i>both</b>italic' --issues

    # Parse a fragment in a table body context
    weft --fragment tbody --html '<tr><td>cell'

    # Re-serialize the parsed document
    weft --format html ./index.html
")]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Parse as a fragment of this context element (`td`, `svg path`, ...)
    #[arg(long, value_name = "CONTEXT")]
    fragment: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Print parse errors to stderr
    #[arg(long)]
    issues: bool,

    /// Parse with the scripting flag disabled
    #[arg(long)]
    no_scripting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// html5lib-style tree dump
    Tree,
    /// Serialized HTML
    Html,
    /// JSON node tree
    Json,
}

/// A node as printed by `--format json`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum JsonNode {
    Document {
        children: Vec<JsonNode>,
    },
    DocumentFragment {
        children: Vec<JsonNode>,
    },
    Doctype {
        name: String,
        #[serde(rename = "publicId")]
        public_id: String,
        #[serde(rename = "systemId")]
        system_id: String,
    },
    Element {
        #[serde(rename = "tagName")]
        tag_name: String,
        namespace: String,
        attributes: Vec<JsonAttribute>,
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<Box<JsonNode>>,
        children: Vec<JsonNode>,
    },
    Text {
        data: String,
    },
    Comment {
        data: String,
    },
}

#[derive(Debug, Serialize)]
struct JsonAttribute {
    name: String,
    value: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let html = load_input(&cli)?;

    let options = ParserOptions {
        scripting_enabled: !cli.no_scripting,
        ..ParserOptions::default()
    };
    let (tree, root, issues) = parse(&html, cli.fragment.as_deref(), options);

    if cli.issues {
        print_issues(&issues);
    }

    match cli.format {
        Format::Tree => print!("{}", dump_tree(&tree, &root)),
        Format::Html => {
            let serializer = HtmlSerializer {
                scripting_enabled: options.scripting_enabled,
            };
            println!("{}", serializer.serialize_children(&tree, &root));
        }
        Format::Json => {
            let json = to_json(&tree, root);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

/// Read the markup named on the command line.
fn load_input(cli: &Cli) -> Result<String> {
    if let Some(ref html) = cli.html {
        Ok(html.clone())
    } else if let Some(ref path) = cli.path {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        anyhow::bail!("expected a file path or --html")
    }
}

/// Run the parser to completion, keeping its error list.
fn parse(html: &str, fragment: Option<&str>, options: ParserOptions) -> (DomTree, NodeId, Vec<ParseIssue>) {
    let mut tree = DomTree::new();
    let mut parser = match fragment {
        Some(tag) => {
            let context = create_context_element(&mut tree, tag);
            HTMLParser::new_fragment(tree, Some(context), options)
        }
        None => HTMLParser::new(tree, options),
    };
    parser.write(html);
    parser.end();
    // No script engine: every suspension point is skipped.
    while let ParserStep::Continue | ParserStep::Script(_) = parser.run() {}

    let issues = parser.take_issues();
    let (tree, root) = parser.finish();
    (tree, root, issues)
}

fn print_issues(issues: &[ParseIssue]) {
    if issues.is_empty() {
        eprintln!("{}", "no parse errors".green());
        return;
    }
    eprintln!("{}", format!("{} parse error(s)", issues.len()).bold());
    for issue in issues {
        eprintln!("  {} {}", format!("@{}", issue.offset).dimmed(), issue.name().red());
    }
}

fn to_json(tree: &DomTree, node: NodeId) -> JsonNode {
    let children = || -> Vec<JsonNode> { tree.children(node).iter().map(|&child| to_json(tree, child)).collect() };
    match tree.node_kind(&node) {
        NodeKind::Document => JsonNode::Document { children: children() },
        NodeKind::DocumentFragment => JsonNode::DocumentFragment { children: children() },
        NodeKind::DocumentType {
            name,
            public_id,
            system_id,
        } => JsonNode::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        },
        NodeKind::Element {
            tag_name,
            namespace,
            attributes,
        } => JsonNode::Element {
            tag_name: tag_name.to_string(),
            namespace: namespace.to_string(),
            attributes: attributes
                .iter()
                .map(|attr| JsonAttribute {
                    name: attr.qualified_name(),
                    value: attr.value.clone(),
                })
                .collect(),
            content: tree
                .template_contents(node)
                .map(|contents| Box::new(to_json(tree, contents))),
            children: children(),
        },
        NodeKind::Text(data) => JsonNode::Text { data: data.to_string() },
        NodeKind::Comment(data) => JsonNode::Comment { data: data.to_string() },
    }
}
