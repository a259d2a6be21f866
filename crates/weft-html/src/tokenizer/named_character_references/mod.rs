//! Named character reference lookup.
//!
//! [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
//!
//! "Consume the maximum number of characters possible, where the consumed
//! characters are one of the identifiers in the named character references
//! table."
//!
//! The table is compiled once into a prefix trie so the tokenizer can walk it
//! one code point at a time and remember the longest match seen so far.

mod table;

use std::sync::LazyLock;

pub use table::NAMED_CHARACTER_REFERENCES;

/// Index of a node in [`EntityTrie`].
pub type TrieNodeId = usize;

#[derive(Debug, Default)]
struct TrieNode {
    /// Sorted by code point.
    children: Vec<(char, TrieNodeId)>,
    /// Set when the path to this node spells a complete reference name.
    value: Option<&'static str>,
}

/// A prefix trie over every named character reference.
#[derive(Debug)]
pub struct EntityTrie {
    nodes: Vec<TrieNode>,
}

/// The shared trie, built on first use.
pub static ENTITY_TRIE: LazyLock<EntityTrie> =
    LazyLock::new(|| EntityTrie::build(NAMED_CHARACTER_REFERENCES));

impl EntityTrie {
    /// The root node (the empty prefix).
    pub const ROOT: TrieNodeId = 0;

    fn build(entries: &[(&'static str, &'static str)]) -> Self {
        let mut trie = Self {
            nodes: vec![TrieNode::default()],
        };
        for &(name, value) in entries {
            let mut node = Self::ROOT;
            for c in name.chars() {
                node = match trie.child(node, c) {
                    Some(next) => next,
                    None => trie.add_child(node, c),
                };
            }
            trie.nodes[node].value = Some(value);
        }
        trie
    }

    fn add_child(&mut self, parent: TrieNodeId, c: char) -> TrieNodeId {
        let id = self.nodes.len();
        self.nodes.push(TrieNode::default());
        let children = &mut self.nodes[parent].children;
        let at = children.partition_point(|&(k, _)| k < c);
        children.insert(at, (c, id));
        id
    }

    /// Follow the edge labelled `c`.
    #[must_use]
    pub fn child(&self, node: TrieNodeId, c: char) -> Option<TrieNodeId> {
        let children = &self.nodes[node].children;
        children
            .binary_search_by_key(&c, |&(k, _)| k)
            .ok()
            .map(|i| children[i].1)
    }

    /// The replacement text if the path to `node` is a complete name.
    #[must_use]
    pub fn value(&self, node: TrieNodeId) -> Option<&'static str> {
        self.nodes[node].value
    }

    /// Whether any longer name continues through `node`.
    #[must_use]
    pub fn has_children(&self, node: TrieNodeId) -> bool {
        !self.nodes[node].children.is_empty()
    }

    /// The longest reference name that is a prefix of `input`, with its
    /// replacement text. The returned length is in bytes.
    #[must_use]
    pub fn longest_prefix_match(&self, input: &str) -> Option<(usize, &'static str)> {
        let mut node = Self::ROOT;
        let mut best = None;
        for (i, c) in input.char_indices() {
            let Some(next) = self.child(node, c) else {
                break;
            };
            node = next;
            if let Some(value) = self.value(node) {
                best = Some((i + c.len_utf8(), value));
            }
        }
        best
    }
}

/// Exact lookup of a reference name (without the leading `&`).
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED_CHARACTER_REFERENCES
        .binary_search_by_key(&name, |&(k, _)| k)
        .ok()
        .map(|i| NAMED_CHARACTER_REFERENCES[i].1)
}

/// Whether any reference name starts with `prefix`.
#[must_use]
pub fn any_entity_has_prefix(prefix: &str) -> bool {
    let mut node = EntityTrie::ROOT;
    for c in prefix.chars() {
        match ENTITY_TRIE.child(node, c) {
            Some(next) => node = next,
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_complete_and_sorted() {
        assert_eq!(NAMED_CHARACTER_REFERENCES.len(), 2231);
        assert!(
            NAMED_CHARACTER_REFERENCES
                .windows(2)
                .all(|pair| pair[0].0 < pair[1].0)
        );
    }

    #[test]
    fn test_exact_lookup() {
        assert_eq!(lookup_entity("amp;"), Some("&"));
        assert_eq!(lookup_entity("amp"), Some("&"));
        assert_eq!(lookup_entity("fjlig;"), Some("fj"));
        assert_eq!(lookup_entity("notanentity;"), None);
    }

    #[test]
    fn test_longest_prefix_prefers_semicolon_form() {
        assert_eq!(ENTITY_TRIE.longest_prefix_match("amp;x"), Some((4, "&")));
        assert_eq!(ENTITY_TRIE.longest_prefix_match("ampx"), Some((3, "&")));
        // "notin;" beats the legacy "not".
        assert_eq!(
            ENTITY_TRIE.longest_prefix_match("notin;"),
            Some((6, "\u{2209}"))
        );
        assert_eq!(ENTITY_TRIE.longest_prefix_match("notit;"), Some((3, "\u{AC}")));
        assert_eq!(ENTITY_TRIE.longest_prefix_match("xyz"), None);
    }

    #[test]
    fn test_prefix_queries() {
        assert!(any_entity_has_prefix("Aac"));
        assert!(!any_entity_has_prefix("Aaz"));
        let node = ENTITY_TRIE.child(EntityTrie::ROOT, 'l').and_then(|n| ENTITY_TRIE.child(n, 't'));
        let node = node.and_then(|n| ENTITY_TRIE.child(n, ';'));
        assert!(node.is_some_and(|n| !ENTITY_TRIE.has_children(n)));
    }
}
