//! Tests for the tree mutation primitives the parser relies on:
//! append (with re-parenting), `insert_before`, `remove_child`, `move_children`.

use weft_dom::{Attribute, DomTree, ElementData, Namespace, NodeId, NodeType, QuirksMode};

fn element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag, Vec::new())))
}

/// A `div` attached to the document with children `tags`.
fn parent_with(tree: &mut DomTree, tags: &[&str]) -> (NodeId, Vec<NodeId>) {
    let parent = element(tree, "div");
    tree.append_child(NodeId::ROOT, parent);
    let children = tags
        .iter()
        .map(|tag| {
            let id = element(tree, tag);
            tree.append_child(parent, id);
            id
        })
        .collect();
    (parent, children)
}

fn assert_links_consistent(tree: &DomTree, parent: NodeId) {
    let children = tree.children(parent);
    for (i, &child) in children.iter().enumerate() {
        assert_eq!(tree.parent(child), Some(parent));
        let prev = i.checked_sub(1).map(|p| children[p]);
        let next = children.get(i + 1).copied();
        assert_eq!(tree.prev_sibling(child), prev, "prev of child {i}");
        assert_eq!(tree.next_sibling(child), next, "next of child {i}");
    }
}

// ========== remove_child ==========

#[test]
fn test_remove_only_child_clears_links() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["p"]);

    tree.remove_child(parent, kids[0]);

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.parent(kids[0]), None);
    assert_eq!(tree.prev_sibling(kids[0]), None);
    assert_eq!(tree.next_sibling(kids[0]), None);
}

#[test]
fn test_remove_each_position_keeps_siblings_linked() {
    for victim in 0..3 {
        let mut tree = DomTree::new();
        let (parent, kids) = parent_with(&mut tree, &["a", "b", "c"]);

        tree.remove_child(parent, kids[victim]);

        let expected: Vec<NodeId> = kids
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != victim)
            .map(|(_, &id)| id)
            .collect();
        assert_eq!(tree.children(parent), expected.as_slice());
        assert_links_consistent(&tree, parent);
    }
}

#[test]
fn test_remove_non_child_is_ignored() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a"]);
    let stranger = element(&mut tree, "x");

    tree.remove_child(parent, stranger);

    assert_eq!(tree.children(parent), kids.as_slice());
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_and_middle() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["b", "d"]);

    let a = element(&mut tree, "a");
    tree.insert_before(parent, a, kids[0]);
    let c = element(&mut tree, "c");
    tree.insert_before(parent, c, kids[1]);

    assert_eq!(tree.children(parent), &[a, kids[0], c, kids[1]]);
    assert_links_consistent(&tree, parent);
}

#[test]
fn test_insert_before_moves_node_from_old_parent() {
    let mut tree = DomTree::new();
    let (first, first_kids) = parent_with(&mut tree, &["a", "b"]);
    let (second, second_kids) = parent_with(&mut tree, &["c"]);

    tree.insert_before(second, first_kids[0], second_kids[0]);

    assert_eq!(tree.children(first), &[first_kids[1]]);
    assert_eq!(tree.children(second), &[first_kids[0], second_kids[0]]);
    assert_links_consistent(&tree, first);
    assert_links_consistent(&tree, second);
}

#[test]
fn test_insert_before_unknown_reference_appends() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a"]);
    let orphan = element(&mut tree, "orphan");
    let new_child = element(&mut tree, "b");

    tree.insert_before(parent, new_child, orphan);

    assert_eq!(tree.children(parent), &[kids[0], new_child]);
}

// ========== append_child / move_children ==========

#[test]
fn test_append_reparents_attached_node() {
    let mut tree = DomTree::new();
    let (first, kids) = parent_with(&mut tree, &["a", "b", "c"]);
    let (second, _) = parent_with(&mut tree, &[]);

    tree.append_child(second, kids[1]);

    assert_eq!(tree.children(first), &[kids[0], kids[2]]);
    assert_eq!(tree.children(second), &[kids[1]]);
    assert_links_consistent(&tree, first);
}

#[test]
fn test_move_children_appends_after_existing() {
    let mut tree = DomTree::new();
    let (from, moved) = parent_with(&mut tree, &["x", "y"]);
    let (to, existing) = parent_with(&mut tree, &["w"]);

    tree.move_children(from, to);

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing[0], moved[0], moved[1]]);
    assert_links_consistent(&tree, to);
}

// ========== queries ==========

#[test]
fn test_document_element_head_and_body() {
    let mut tree = DomTree::new();
    let doctype = tree.alloc(NodeType::DocumentType(Default::default()));
    tree.append_child(NodeId::ROOT, doctype);
    let html = element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let head = element(&mut tree, "head");
    let body = element(&mut tree, "body");
    tree.append_child(html, head);
    tree.append_child(html, body);

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.head(), Some(head));
    assert_eq!(tree.body(), Some(body));
    assert!(tree.doctype().is_some());
}

#[test]
fn test_body_ignores_foreign_body_tag() {
    let mut tree = DomTree::new();
    let html = element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let mut data = ElementData::new("body", Vec::new());
    data.namespace = Namespace::Svg;
    let svg_body = tree.alloc(NodeType::Element(data));
    tree.append_child(html, svg_body);

    assert_eq!(tree.body(), None);
}

#[test]
fn test_descendants_are_in_tree_order() {
    let mut tree = DomTree::new();
    let (outer, kids) = parent_with(&mut tree, &["a", "b"]);
    let inner = element(&mut tree, "i");
    tree.append_child(kids[0], inner);

    let order: Vec<NodeId> = tree.descendants(outer).collect();
    assert_eq!(order, vec![kids[0], inner, kids[1]]);
    assert_eq!(tree.ancestors(inner).collect::<Vec<_>>(), vec![kids[0], outer, NodeId::ROOT]);
}

#[test]
fn test_attributes_and_quirks_mode() {
    let mut tree = DomTree::new();
    let mut href = Attribute::new("href", "#a");
    href.prefix = Some("xlink".to_string());
    href.namespace = Some(Namespace::XLink);
    let data = ElementData::new("a", vec![Attribute::new("id", "main"), href]);
    let a = tree.alloc(NodeType::Element(data));

    let element = tree.as_element(a).expect("element");
    assert_eq!(element.id(), Some("main"));
    assert_eq!(element.attrs[1].qualified_name(), "xlink:href");

    assert_eq!(tree.quirks_mode(), QuirksMode::NoQuirks);
    tree.set_quirks_mode(QuirksMode::Quirks);
    assert_eq!(tree.quirks_mode(), QuirksMode::Quirks);
}
