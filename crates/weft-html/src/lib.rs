//! An HTML tokenizer and tree constructor following the WHATWG HTML Living
//! Standard.
//!
//! # Scope
//!
//! - **Input stream preprocessing** ([§ 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)):
//!   newline normalization, UTF-16 surrogate pairing, streaming chunks.
//! - **Tokenization** ([§ 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)):
//!   every tokenizer state, including script data escapes, CDATA sections and
//!   the full named character reference table.
//! - **Tree construction** ([§ 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)):
//!   all insertion modes, the adoption agency algorithm, foster parenting,
//!   foreign content, quirks mode and fragment parsing.
//! - **Serialization** ([§ 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)).
//!
//! The tree constructor builds through the [`TreeSink`] trait; [`weft_dom::DomTree`]
//! is the default sink.
//!
//! ```
//! let tree = weft_html::parse_document("<p>Hello<b>world</p>");
//! let body = tree.body().unwrap();
//! assert_eq!(weft_html::serialize_children(&tree, &body), "<p>Hello<b>world</b></p>");
//! ```

/// Suspendable parsing for script execution points.
pub mod controller;
/// html5lib-format tree dumps.
pub mod dump;
/// Parser configuration.
pub mod options;
/// Parse error codes.
pub mod parse_error;
/// Tree construction.
pub mod parser;
/// HTML serialization.
pub mod serializer;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;
/// The tree adapter trait and its `DomTree` implementation.
pub mod tree_sink;

use weft_dom::{DomTree, Namespace, NodeId};

pub use controller::{ControllerError, ParserController};
pub use dump::dump_tree;
pub use options::ParserOptions;
pub use parse_error::{ParseErrorCode, ParseIssue};
pub use parser::{HTMLParser, InsertionMode, ParserStep};
pub use serializer::{HtmlSerializer, serialize_children, serialize_node};
pub use tokenizer::{Attribute, HTMLTokenizer, SourceLocation, Token};
pub use tree_sink::{NodeKind, TreeSink};

/// Write all of `html`, then step until the end-of-file token is processed.
/// Script suspension points are passed straight through.
fn run_to_completion<S: TreeSink>(parser: &mut HTMLParser<S>, html: &str) {
    parser.write(html);
    parser.end();
    while let ParserStep::Continue | ParserStep::Script(_) = parser.run() {}
}

/// Parse a whole document into a [`DomTree`].
#[must_use]
pub fn parse_document(html: &str) -> DomTree {
    let (tree, _) = parse_document_with(DomTree::new(), html, ParserOptions::default());
    tree
}

/// Parse a whole document into `sink`. Returns the sink and its Document node.
#[must_use]
pub fn parse_document_with<S: TreeSink>(sink: S, html: &str, options: ParserOptions) -> (S, S::Handle) {
    let mut parser = HTMLParser::new(sink, options);
    run_to_completion(&mut parser, html);
    parser.finish()
}

/// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
///
/// Parse `html` as the contents of a `context_tag` element. The context is an
/// HTML tag name, or `svg name` / `math name` for a foreign element; without
/// one a `template` context is used. Returns the tree and the
/// `DocumentFragment` holding the result.
#[must_use]
pub fn parse_fragment(html: &str, context_tag: Option<&str>) -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let context = context_tag.map(|tag| create_context_element(&mut tree, tag));
    parse_fragment_with(tree, html, context, ParserOptions::default())
}

/// Create a detached fragment-parsing context element in `sink` from a tag
/// description: an HTML tag name, or `svg name` / `math name`.
pub fn create_context_element<S: TreeSink>(sink: &mut S, tag: &str) -> S::Handle {
    let (namespace, name) = match tag.split_once(' ') {
        Some(("svg", name)) => (Namespace::Svg, name),
        Some(("math", name)) => (Namespace::MathMl, name),
        _ => (Namespace::Html, tag),
    };
    sink.create_element(name, namespace, Vec::new())
}

/// Parse `html` as the contents of `context`, an element already created in
/// `sink`. Returns the sink and the `DocumentFragment` holding the result.
#[must_use]
pub fn parse_fragment_with<S: TreeSink>(
    sink: S,
    html: &str,
    context: Option<S::Handle>,
    options: ParserOptions,
) -> (S, S::Handle) {
    let mut parser = HTMLParser::new_fragment(sink, context, options);
    run_to_completion(&mut parser, html);
    parser.finish()
}
