//! [`TreeSink`] for the arena [`DomTree`].

use weft_dom::{
    Attribute, DocumentTypeData, DomTree, ElementData, Namespace, Node, NodeId, NodeType, QuirksMode,
};

use super::{NodeKind, TreeSink};

impl TreeSink for DomTree {
    type Handle = NodeId;

    fn create_document(&mut self) -> NodeId {
        self.root()
    }

    fn create_document_fragment(&mut self) -> NodeId {
        self.alloc(NodeType::DocumentFragment)
    }

    fn create_element(&mut self, tag_name: &str, namespace: Namespace, attributes: Vec<Attribute>) -> NodeId {
        let template_contents = (namespace == Namespace::Html && tag_name == "template")
            .then(|| self.alloc(NodeType::DocumentFragment));
        self.alloc(NodeType::Element(ElementData {
            tag_name: tag_name.to_string(),
            namespace,
            attrs: attributes,
            template_contents,
        }))
    }

    fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Comment(data.to_string()))
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        Self::append_child(self, *parent, *child);
    }

    fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: &NodeId) {
        Self::insert_before(self, *parent, *child, *reference);
    }

    fn detach_node(&mut self, node: &NodeId) {
        self.detach(*node);
    }

    fn insert_text(&mut self, parent: &NodeId, text: &str) {
        if let Some(last) = self.last_child(*parent)
            && let Some(Node { node_type: NodeType::Text(data), .. }) = self.get_mut(last)
        {
            data.push_str(text);
            return;
        }
        let node = self.alloc(NodeType::Text(text.to_string()));
        Self::append_child(self, *parent, node);
    }

    fn insert_text_before(&mut self, parent: &NodeId, text: &str, reference: &NodeId) {
        if let Some(previous) = self.prev_sibling(*reference)
            && let Some(Node { node_type: NodeType::Text(data), .. }) = self.get_mut(previous)
        {
            data.push_str(text);
            return;
        }
        let node = self.alloc(NodeType::Text(text.to_string()));
        Self::insert_before(self, *parent, node, *reference);
    }

    fn adopt_attributes(&mut self, element: &NodeId, attributes: &[Attribute]) {
        let Some(data) = self.as_element_mut(*element) else {
            return;
        };
        for attribute in attributes {
            if !data.attrs.iter().any(|existing| existing.name == attribute.name) {
                data.attrs.push(attribute.clone());
            }
        }
    }

    fn set_document_type(&mut self, document: &NodeId, name: &str, public_id: &str, system_id: &str) {
        let doctype = self.alloc(NodeType::DocumentType(DocumentTypeData {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }));
        Self::append_child(self, *document, doctype);
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        Self::set_quirks_mode(self, mode);
    }

    fn quirks_mode(&self) -> QuirksMode {
        Self::quirks_mode(self)
    }

    fn move_children(&mut self, from: &NodeId, to: &NodeId) {
        Self::move_children(self, *from, *to);
    }

    fn node_kind(&self, node: &NodeId) -> NodeKind<'_> {
        match self.get(*node).map(|n| &n.node_type) {
            Some(NodeType::DocumentFragment) => NodeKind::DocumentFragment,
            Some(NodeType::DocumentType(doctype)) => NodeKind::DocumentType {
                name: &doctype.name,
                public_id: &doctype.public_id,
                system_id: &doctype.system_id,
            },
            Some(NodeType::Element(data)) => NodeKind::Element {
                tag_name: &data.tag_name,
                namespace: data.namespace,
                attributes: &data.attrs,
            },
            Some(NodeType::Text(text)) => NodeKind::Text(text),
            Some(NodeType::Comment(text)) => NodeKind::Comment(text),
            Some(NodeType::Document) | None => NodeKind::Document,
        }
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        Self::children(self, *node).to_vec()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        Self::parent(self, *node)
    }

    fn template_contents(&self, template: &NodeId) -> Option<NodeId> {
        Self::template_contents(self, *template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_coalesced_with_trailing_text_node() {
        let mut tree = DomTree::new();
        let body = TreeSink::create_element(&mut tree, "body", Namespace::Html, Vec::new());
        TreeSink::append_child(&mut tree, &NodeId::ROOT, &body);
        tree.insert_text(&body, "a");
        tree.insert_text(&body, "b");
        assert_eq!(tree.children(body).len(), 1);
        assert_eq!(tree.as_text(tree.children(body)[0]), Some("ab"));
    }

    #[test]
    fn test_text_before_reference_coalesces_with_previous_sibling() {
        let mut tree = DomTree::new();
        let div = TreeSink::create_element(&mut tree, "div", Namespace::Html, Vec::new());
        let table = TreeSink::create_element(&mut tree, "table", Namespace::Html, Vec::new());
        TreeSink::append_child(&mut tree, &NodeId::ROOT, &div);
        TreeSink::append_child(&mut tree, &div, &table);
        tree.insert_text_before(&div, "A", &table);
        tree.insert_text_before(&div, "B", &table);
        let children = tree.children(div).to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(tree.as_text(children[0]), Some("AB"));
        assert_eq!(children[1], table);
    }

    #[test]
    fn test_adopt_attributes_keeps_existing_values() {
        let mut tree = DomTree::new();
        let html = TreeSink::create_element(&mut tree, "html", Namespace::Html, vec![Attribute::new("lang", "en")]);
        tree.adopt_attributes(&html, &[Attribute::new("lang", "fr"), Attribute::new("dir", "ltr")]);
        let data = tree.as_element(html).expect("element");
        assert_eq!(data.get_attribute("lang"), Some("en"));
        assert_eq!(data.get_attribute("dir"), Some("ltr"));
    }

    #[test]
    fn test_template_elements_get_contents() {
        let mut tree = DomTree::new();
        let template = TreeSink::create_element(&mut tree, "template", Namespace::Html, Vec::new());
        let contents = TreeSink::template_contents(&tree, &template).expect("contents");
        assert!(tree.is_document_fragment(&contents));
        let svg_template = TreeSink::create_element(&mut tree, "template", Namespace::Svg, Vec::new());
        assert_eq!(TreeSink::template_contents(&tree, &svg_template), None);
    }
}
