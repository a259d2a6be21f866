//! [§ 13.2.4.4 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
//!
//! "Initially, the list of active formatting elements is empty. It is used to
//! handle mis-nested formatting element tags."

use std::collections::HashSet;

use crate::tokenizer::Token;

/// An entry in the list of active formatting elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattingEntry<H> {
    /// "A marker is an entry in the list of active formatting elements that is
    /// distinct from any element."
    ///
    /// Pushed when entering applet, object, marquee, template, td, th and
    /// caption so formatting from outside does not leak in.
    Marker,
    /// A formatting element.
    Element {
        /// The element in the sink's tree.
        handle: H,
        /// "the token for which the element was created", kept to clone the
        /// element during reconstruction and the adoption agency algorithm.
        token: Token,
    },
}

impl<H> FormattingEntry<H> {
    /// The element handle, unless this is a marker.
    #[must_use]
    pub const fn handle(&self) -> Option<&H> {
        match self {
            Self::Element { handle, .. } => Some(handle),
            Self::Marker => None,
        }
    }

    /// The originating start tag, unless this is a marker.
    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        match self {
            Self::Element { token, .. } => Some(token),
            Self::Marker => None,
        }
    }
}

/// Whether two formatting tokens would create identical elements: same tag
/// name and the same attributes compared as an unordered set.
fn same_element(a: &Token, b: &Token) -> bool {
    if a.tag_name() != b.tag_name() || a.attributes().len() != b.attributes().len() {
        return false;
    }
    let set: HashSet<(&str, &str)> = a
        .attributes()
        .iter()
        .map(|attr| (attr.name.as_str(), attr.value.as_str()))
        .collect();
    b.attributes()
        .iter()
        .all(|attr| set.contains(&(attr.name.as_str(), attr.value.as_str())))
}

/// The list of active formatting elements.
#[derive(Debug, Clone)]
pub struct ActiveFormattingList<H> {
    entries: Vec<FormattingEntry<H>>,
}

impl<H> Default for ActiveFormattingList<H> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<H: Clone + PartialEq> ActiveFormattingList<H> {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, markers included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[FormattingEntry<H>] {
        &self.entries
    }

    /// The entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FormattingEntry<H>> {
        self.entries.get(index)
    }

    /// The last entry.
    #[must_use]
    pub fn last(&self) -> Option<&FormattingEntry<H>> {
        self.entries.last()
    }

    /// [§ 13.2.4.4](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// "When the steps below require the UA to push onto the list of active
    /// formatting elements an element element, the UA must perform the
    /// following steps:
    ///
    /// 1. If there are already three elements in the list of active formatting
    ///    elements after the last marker, if any, or anywhere in the list if
    ///    there are no markers, that have the same tag name, namespace, and
    ///    attributes as element, then remove the earliest such element from
    ///    the list of active formatting elements.
    /// 2. Add element to the list of active formatting elements."
    ///
    /// Formatting elements are always HTML elements, so the namespace check is
    /// implied by the tag name.
    pub fn push_element(&mut self, handle: H, token: Token) {
        let mut matching = Vec::new();
        for (index, entry) in self.entries.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => break,
                FormattingEntry::Element { token: existing, .. } if same_element(existing, &token) => {
                    matching.push(index);
                }
                FormattingEntry::Element { .. } => {}
            }
        }
        // Noah's Ark clause.
        if matching.len() >= 3
            && let Some(&earliest) = matching.last()
        {
            let _ = self.entries.remove(earliest);
        }
        self.entries.push(FormattingEntry::Element { handle, token });
    }

    /// "insert a marker at the end of the list of active formatting elements"
    pub fn insert_marker(&mut self) {
        self.entries.push(FormattingEntry::Marker);
    }

    /// [§ 13.2.4.4](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// "1. Let entry be the last (most recently added) entry in the list of
    /// active formatting elements.
    /// 2. Remove entry from the list of active formatting elements.
    /// 3. If entry was a marker, then stop the algorithm at this point.
    /// 4. Go to step 1."
    pub fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.entries.pop() {
            if entry == FormattingEntry::Marker {
                break;
            }
        }
    }

    /// The last element named `tag_name` between the end of the list and the
    /// last marker (or the start of the list), with its index.
    #[must_use]
    pub fn element_in_scope_with_tag_name(&self, tag_name: &str) -> Option<(usize, &H)> {
        for (index, entry) in self.entries.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => return None,
                FormattingEntry::Element { handle, token } if token.tag_name() == Some(tag_name) => {
                    return Some((index, handle));
                }
                FormattingEntry::Element { .. } => {}
            }
        }
        None
    }

    /// Index of the entry for `handle`.
    #[must_use]
    pub fn position(&self, handle: &H) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.handle() == Some(handle))
    }

    /// Whether `handle` is in the list.
    #[must_use]
    pub fn contains(&self, handle: &H) -> bool {
        self.position(handle).is_some()
    }

    /// The entry for `handle`.
    #[must_use]
    pub fn element_entry(&self, handle: &H) -> Option<&FormattingEntry<H>> {
        self.position(handle).map(|index| &self.entries[index])
    }

    /// Remove the entry for `handle`.
    pub fn remove_entry(&mut self, handle: &H) -> Option<FormattingEntry<H>> {
        self.position(handle).map(|index| self.entries.remove(index))
    }

    /// Replace the entry at `index` with an element entry.
    pub fn replace_at(&mut self, index: usize, handle: H, token: Token) {
        if let Some(entry) = self.entries.get_mut(index) {
            *entry = FormattingEntry::Element { handle, token };
        }
    }

    /// Insert an element entry at `index` (clamped to the list length).
    pub fn insert_at(&mut self, index: usize, handle: H, token: Token) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, FormattingEntry::Element { handle, token });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Attribute;

    fn font(color: &str) -> Token {
        Token::StartTag {
            name: "font".into(),
            self_closing: false,
            attributes: vec![Attribute::new("color", color)],
        }
    }

    #[test]
    fn test_noahs_ark_keeps_at_most_three_identical_entries() {
        let mut list = ActiveFormattingList::new();
        for handle in 0..5 {
            list.push_element(handle, font("red"));
        }
        assert_eq!(list.len(), 3);
        // The earliest ones were dropped.
        assert_eq!(list.get(0).and_then(FormattingEntry::handle), Some(&2));
    }

    #[test]
    fn test_noahs_ark_compares_attributes_as_a_set() {
        let mut list = ActiveFormattingList::new();
        let ab = Token::StartTag {
            name: "b".into(),
            self_closing: false,
            attributes: vec![Attribute::new("x", "1"), Attribute::new("y", "2")],
        };
        let ba = Token::StartTag {
            name: "b".into(),
            self_closing: false,
            attributes: vec![Attribute::new("y", "2"), Attribute::new("x", "1")],
        };
        list.push_element(0, ab.clone());
        list.push_element(1, ba);
        list.push_element(2, ab.clone());
        list.push_element(3, font("red"));
        list.push_element(4, ab);
        assert_eq!(list.len(), 4);
        assert!(!list.contains(&0));
    }

    #[test]
    fn test_markers_bound_noahs_ark_and_lookup() {
        let mut list = ActiveFormattingList::new();
        for handle in 0..3 {
            list.push_element(handle, font("red"));
        }
        list.insert_marker();
        list.push_element(10, font("red"));
        assert_eq!(list.len(), 5);
        assert!(list.element_in_scope_with_tag_name("font").is_some_and(|(_, h)| *h == 10));

        list.clear_to_last_marker();
        assert_eq!(list.len(), 3);
        assert_eq!(list.element_in_scope_with_tag_name("font").map(|(i, _)| i), Some(2));
        assert_eq!(list.element_in_scope_with_tag_name("b"), None);
    }

    #[test]
    fn test_identity_based_removal() {
        let mut list = ActiveFormattingList::new();
        list.push_element(7, font("red"));
        list.push_element(8, font("blue"));
        assert!(list.remove_entry(&7).is_some());
        assert!(list.remove_entry(&7).is_none());
        assert_eq!(list.position(&8), Some(0));
    }
}
