//! Integration tests for named character reference lookup.

use weft_html::tokenizer::named_character_references::{
    ENTITY_TRIE, EntityTrie, NAMED_CHARACTER_REFERENCES, any_entity_has_prefix, lookup_entity,
};

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup_entity("amp;"), Some("&"));
    assert_eq!(lookup_entity("lt;"), Some("<"));
    assert_eq!(lookup_entity("gt;"), Some(">"));
    assert_eq!(lookup_entity("quot;"), Some("\""));
    assert_eq!(lookup_entity("nbsp;"), Some("\u{00A0}"));
}

#[test]
fn test_lookup_legacy_entities() {
    // Legacy entities without semicolon
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("lt"), Some("<"));
    assert_eq!(lookup_entity("gt"), Some(">"));
    assert_eq!(lookup_entity("notin"), None);
}

#[test]
fn test_lookup_unknown_entity() {
    assert_eq!(lookup_entity("notarealentity;"), None);
    assert_eq!(lookup_entity(""), None);
}

#[test]
fn test_multi_code_point_values() {
    assert_eq!(lookup_entity("NotEqualTilde;"), Some("\u{2242}\u{0338}"));
    assert_eq!(lookup_entity("fjlig;"), Some("fj"));
}

#[test]
fn test_prefix_matching() {
    assert!(any_entity_has_prefix("a")); // amp, apos, alpha, etc.
    assert!(any_entity_has_prefix("am")); // amp
    assert!(any_entity_has_prefix("amp")); // amp, amp;
    assert!(any_entity_has_prefix("amp;")); // amp;
    assert!(!any_entity_has_prefix("ampx")); // nothing
    assert!(!any_entity_has_prefix("xyz")); // nothing
}

#[test]
fn test_longest_prefix_match_prefers_longer_name() {
    // "not" is a legacy name, "notin;" a longer one.
    assert_eq!(ENTITY_TRIE.longest_prefix_match("notin;x"), Some((6, "\u{2209}")));
    assert_eq!(ENTITY_TRIE.longest_prefix_match("notit;"), Some((3, "\u{00AC}")));
    assert_eq!(ENTITY_TRIE.longest_prefix_match("zzz"), None);
}

#[test]
fn test_trie_contains_every_table_entry() {
    for &(name, value) in NAMED_CHARACTER_REFERENCES {
        assert_eq!(
            ENTITY_TRIE.longest_prefix_match(name),
            Some((name.len(), value)),
            "{name}"
        );
    }
}

#[test]
fn test_trie_walk() {
    let amp = "amp"
        .chars()
        .try_fold(EntityTrie::ROOT, |node, c| ENTITY_TRIE.child(node, c))
        .unwrap();
    assert_eq!(ENTITY_TRIE.value(amp), Some("&"));
    // "amp;" continues through the node.
    assert!(ENTITY_TRIE.has_children(amp));
}

#[test]
fn test_table_size() {
    assert_eq!(NAMED_CHARACTER_REFERENCES.len(), 2231);
}
