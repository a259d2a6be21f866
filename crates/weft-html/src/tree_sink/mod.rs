//! The tree adapter the parser builds into.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//! only ever creates nodes, inserts them, moves them and reads a few of their
//! properties. [`TreeSink`] is exactly that capability set, so the same
//! tokenizer and tree constructor can target any tree representation.
//! [`weft_dom::DomTree`] implements it in [`dom`].

pub mod dom;

use std::fmt::Debug;
use std::hash::Hash;

use weft_dom::{Attribute, Namespace, QuirksMode};

/// A read-only view of one node, as handed out by [`TreeSink::node_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// The document node.
    Document,
    /// A `DocumentFragment` (fragment parsing result or template contents).
    DocumentFragment,
    /// A doctype.
    DocumentType {
        /// Doctype name.
        name: &'a str,
        /// Public identifier (empty when missing).
        public_id: &'a str,
        /// System identifier (empty when missing).
        system_id: &'a str,
    },
    /// An element.
    Element {
        /// Local name.
        tag_name: &'a str,
        /// Element namespace.
        namespace: Namespace,
        /// Attributes in source order.
        attributes: &'a [Attribute],
    },
    /// A text node.
    Text(&'a str),
    /// A comment node.
    Comment(&'a str),
}

/// A pluggable tree representation.
///
/// The parser holds the sink for the whole parse and hands it back when done.
/// Handles are cheap to clone and compare by node identity.
pub trait TreeSink {
    /// Identifies a node in the sink's tree.
    type Handle: Clone + Eq + Hash + Debug;

    // -- Creation ------------------------------------------------------------

    /// The document node, created on first request.
    fn create_document(&mut self) -> Self::Handle;

    /// A new, empty `DocumentFragment`.
    fn create_document_fragment(&mut self) -> Self::Handle;

    /// [§ 13.2.6.1 Create an element for a token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// A detached element. A `template` element in the HTML namespace must be
    /// created with its template contents fragment.
    fn create_element(&mut self, tag_name: &str, namespace: Namespace, attributes: Vec<Attribute>) -> Self::Handle;

    /// A detached comment node.
    fn create_comment(&mut self, data: &str) -> Self::Handle;

    // -- Mutation ------------------------------------------------------------

    /// Append `child` as the last child of `parent`, detaching it first.
    fn append_child(&mut self, parent: &Self::Handle, child: &Self::Handle);

    /// Insert `child` into `parent` just before `reference`.
    fn insert_before(&mut self, parent: &Self::Handle, child: &Self::Handle, reference: &Self::Handle);

    /// Remove `node` from its parent, if any.
    fn detach_node(&mut self, node: &Self::Handle);

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "If there is a Text node immediately before the adjusted insertion
    /// location, then append data to that Text node's data." Otherwise append
    /// a new text node to `parent`.
    fn insert_text(&mut self, parent: &Self::Handle, text: &str);

    /// Like [`insert_text`](Self::insert_text), but the location is just
    /// before `reference`; coalesces with the sibling preceding `reference`.
    fn insert_text_before(&mut self, parent: &Self::Handle, text: &str, reference: &Self::Handle);

    /// Add each attribute that `element` does not already have. Existing
    /// attributes keep their values.
    fn adopt_attributes(&mut self, element: &Self::Handle, attributes: &[Attribute]);

    /// Append a doctype node to `document`.
    fn set_document_type(&mut self, document: &Self::Handle, name: &str, public_id: &str, system_id: &str);

    /// Set the document's quirks mode.
    fn set_quirks_mode(&mut self, mode: QuirksMode);

    /// The document's quirks mode.
    #[must_use]
    fn quirks_mode(&self) -> QuirksMode;

    /// Whether the document is in (full) quirks mode.
    #[must_use]
    fn is_quirks_mode(&self) -> bool {
        self.quirks_mode() == QuirksMode::Quirks
    }

    /// Move all children of `from` to the end of `to`, keeping their order.
    fn move_children(&mut self, from: &Self::Handle, to: &Self::Handle) {
        for child in self.children(from) {
            self.append_child(to, &child);
        }
    }

    // -- Read accessors ------------------------------------------------------

    /// What kind of node `node` is, with its data.
    #[must_use]
    fn node_kind(&self, node: &Self::Handle) -> NodeKind<'_>;

    /// Children of `node` in tree order.
    #[must_use]
    fn children(&self, node: &Self::Handle) -> Vec<Self::Handle>;

    /// Parent of `node`.
    #[must_use]
    fn parent(&self, node: &Self::Handle) -> Option<Self::Handle>;

    /// [§ 4.12.3 The template element](https://html.spec.whatwg.org/multipage/scripting.html#template-contents)
    /// The contents fragment of a `template` element.
    #[must_use]
    fn template_contents(&self, template: &Self::Handle) -> Option<Self::Handle>;

    /// Local name of an element.
    #[must_use]
    fn tag_name(&self, node: &Self::Handle) -> Option<&str> {
        match self.node_kind(node) {
            NodeKind::Element { tag_name, .. } => Some(tag_name),
            _ => None,
        }
    }

    /// Namespace of an element.
    #[must_use]
    fn namespace(&self, node: &Self::Handle) -> Option<Namespace> {
        match self.node_kind(node) {
            NodeKind::Element { namespace, .. } => Some(namespace),
            _ => None,
        }
    }

    /// Attributes of an element (empty for other nodes).
    #[must_use]
    fn attributes(&self, node: &Self::Handle) -> &[Attribute] {
        match self.node_kind(node) {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Whether `node` is an element.
    #[must_use]
    fn is_element(&self, node: &Self::Handle) -> bool {
        matches!(self.node_kind(node), NodeKind::Element { .. })
    }

    /// Whether `node` is a text node.
    #[must_use]
    fn is_text(&self, node: &Self::Handle) -> bool {
        matches!(self.node_kind(node), NodeKind::Text(_))
    }

    /// Whether `node` is a comment node.
    #[must_use]
    fn is_comment(&self, node: &Self::Handle) -> bool {
        matches!(self.node_kind(node), NodeKind::Comment(_))
    }

    /// Whether `node` is a doctype node.
    #[must_use]
    fn is_document_type(&self, node: &Self::Handle) -> bool {
        matches!(self.node_kind(node), NodeKind::DocumentType { .. })
    }

    /// Whether `node` is a document fragment.
    #[must_use]
    fn is_document_fragment(&self, node: &Self::Handle) -> bool {
        matches!(self.node_kind(node), NodeKind::DocumentFragment)
    }
}
