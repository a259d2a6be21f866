//! [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
//!
//! Repairs mis-nested formatting elements such as `<b><p></b></p>` by cloning
//! the formatting element around the content that outlived it.

use weft_dom::Namespace;

use super::core::HTMLParser;
use super::formatting_elements::FormattingEntry;
use super::open_elements::OpenElement;
use crate::parse_error::ParseErrorCode;
use crate::tokenizer::Token;
use crate::tree_sink::TreeSink;

/// Where the clone of the formatting element goes in the list of active
/// formatting elements.
enum Bookmark<H> {
    /// In place of the formatting element's own entry.
    Replace(H),
    /// Immediately after this element's entry.
    InsertAfter(H),
}

impl<S: TreeSink> HTMLParser<S> {
    /// Run the adoption agency algorithm for an end tag named `subject`.
    ///
    /// Returns `true` when the caller should instead "act as described in the
    /// "any other end tag" entry".
    pub(crate) fn run_adoption_agency(&mut self, subject: &str) -> bool {
        // "2. If the current node is an HTML element whose tag name is
        // subject, and the current node is not in the list of active
        // formatting elements, then pop the current node off the stack of open
        // elements and return."
        if let Some(current) = self.open_elements.current()
            && current.is_html(subject)
            && !self.active_formatting_elements.contains(&current.handle)
        {
            let _ = self.open_elements.pop();
            return false;
        }

        // "3. Let outer loop counter be 0."
        // "4. While true:"
        // "1. If outer loop counter is greater than or equal to 8, then return."
        for _ in 0..8 {
            // "3. Let formatting element be the last element in the list of
            // active formatting elements that: is between the end of the list
            // and the last marker in the list, if any, or the start of the list
            // otherwise, and has the tag name subject."
            // "If there is no such element, then return and instead act as
            // described in the "any other end tag" entry above."
            let Some((_, formatting_element)) = self.active_formatting_elements.element_in_scope_with_tag_name(subject)
            else {
                return true;
            };
            let formatting_element = formatting_element.clone();
            let Some(formatting_token) = self
                .active_formatting_elements
                .element_entry(&formatting_element)
                .and_then(FormattingEntry::token)
                .cloned()
            else {
                return true;
            };

            // "4. If formatting element is not in the stack of open elements,
            // then this is a parse error; remove the element from the list, and
            // return."
            let Some(formatting_index) = self.open_elements.position(&formatting_element) else {
                self.parse_error(ParseErrorCode::MisnestedFormattingElement);
                let _ = self.active_formatting_elements.remove_entry(&formatting_element);
                return false;
            };

            // "5. If formatting element is in the stack of open elements, but
            // the element is not in scope, then this is a parse error; return."
            if !self.open_elements.has_element_in_scope(&formatting_element) {
                self.parse_error(ParseErrorCode::MisnestedFormattingElement);
                return false;
            }

            // "6. If formatting element is not the current node, this is a
            // parse error. (But do not return.)"
            if self.open_elements.current_handle() != Some(&formatting_element) {
                self.parse_error(ParseErrorCode::MisnestedFormattingElement);
            }

            // "7. Let furthest block be the topmost node in the stack of open
            // elements that is lower in the stack than formatting element, and
            // is an element in the special category. There might not be one."
            let furthest_block_index = (formatting_index + 1..self.open_elements.len())
                .find(|&index| self.open_elements.get(index).is_some_and(OpenElement::is_special));

            // "8. If there is no furthest block, then the UA must first pop all
            // the nodes from the bottom of the stack of open elements, from the
            // current node up to and including formatting element, then remove
            // formatting element from the list of active formatting elements,
            // and finally return."
            let Some(furthest_block_index) = furthest_block_index else {
                self.open_elements.pop_until_handle(&formatting_element);
                let _ = self.active_formatting_elements.remove_entry(&formatting_element);
                return false;
            };
            let Some(furthest_block) = self
                .open_elements
                .get(furthest_block_index)
                .map(|entry| entry.handle.clone())
            else {
                return false;
            };

            // "9. Let common ancestor be the element immediately above
            // formatting element in the stack of open elements."
            let Some(common_ancestor) = formatting_index
                .checked_sub(1)
                .and_then(|index| self.open_elements.get(index))
                .map(|entry| entry.handle.clone())
            else {
                return false;
            };

            // "10. Let a bookmark note the position of formatting element in
            // the list of active formatting elements relative to the elements
            // on either side of it in the list."
            let mut bookmark = Bookmark::Replace(formatting_element.clone());

            // "11. Let node and last node be furthest block."
            let mut node_index = furthest_block_index;
            let mut last_node = furthest_block.clone();

            // "12. Let inner loop counter be 0."
            // "13. While true:"
            let mut inner_loop_counter = 0;
            loop {
                // "1. Increment inner loop counter by 1."
                inner_loop_counter += 1;

                // "2. Let node be the element immediately above node in the
                // stack of open elements, or if node is no longer in the stack
                // of open elements (e.g. because it got removed by this
                // algorithm), the element that was immediately above node in
                // the stack of open elements before node was removed."
                node_index -= 1;
                let Some(node) = self.open_elements.get(node_index).map(|entry| entry.handle.clone()) else {
                    break;
                };

                // "3. If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // "4. If inner loop counter is greater than 3 and node is in the
                // list of active formatting elements, then remove node from the
                // list of active formatting elements."
                if inner_loop_counter > 3 {
                    let _ = self.active_formatting_elements.remove_entry(&node);
                }

                // "5. If node is not in the list of active formatting elements,
                // then remove node from the stack of open elements and continue."
                let Some(list_index) = self.active_formatting_elements.position(&node) else {
                    let _ = self.open_elements.remove(&node);
                    continue;
                };
                let Some(node_token) = self
                    .active_formatting_elements
                    .get(list_index)
                    .and_then(FormattingEntry::token)
                    .cloned()
                else {
                    continue;
                };

                // "6. Create an element for the token for which the element
                // node was created, in the HTML namespace, with common ancestor
                // as the intended parent; replace the entry for node in the
                // list of active formatting elements with an entry for the new
                // element, replace the entry for node in the stack of open
                // elements with an entry for the new element, and let node be
                // the new element."
                let new_element = self.clone_formatting_element(&node_token);
                self.active_formatting_elements
                    .replace_at(list_index, new_element.clone(), node_token);
                let entry = self.describe_element(&new_element);
                self.open_elements.replace(&node, entry);

                // "7. If last node is furthest block, then move the
                // aforementioned bookmark to be immediately after the new node
                // in the list of active formatting elements."
                if last_node == furthest_block {
                    bookmark = Bookmark::InsertAfter(new_element.clone());
                }

                // "8. Append last node to node."
                self.sink.append_child(&new_element, &last_node);

                // "9. Set last node to node."
                last_node = new_element;
            }

            // "14. Insert whatever last node ended up being in the previous
            // step at the appropriate place for inserting a node, but using
            // common ancestor as the override target."
            self.sink.detach_node(&last_node);
            let location = self.appropriate_place_for_inserting(Some(&common_ancestor));
            self.insert_node_at(&location, &last_node);

            // "15. Create an element for the token for which formatting element
            // was created, in the HTML namespace, with furthest block as the
            // intended parent."
            let new_element = self.clone_formatting_element(&formatting_token);

            // "16. Take all of the child nodes of furthest block and append
            // them to the element created in the last step."
            self.sink.move_children(&furthest_block, &new_element);

            // "17. Append that new element to furthest block."
            self.sink.append_child(&furthest_block, &new_element);

            // "18. Remove formatting element from the list of active formatting
            // elements, and insert the new element into the list of active
            // formatting elements at the position of the aforementioned
            // bookmark."
            match bookmark {
                Bookmark::Replace(_) => {
                    if let Some(index) = self.active_formatting_elements.position(&formatting_element) {
                        self.active_formatting_elements
                            .replace_at(index, new_element.clone(), formatting_token);
                    }
                }
                Bookmark::InsertAfter(anchor) => {
                    let _ = self.active_formatting_elements.remove_entry(&formatting_element);
                    let index = self
                        .active_formatting_elements
                        .position(&anchor)
                        .map_or(self.active_formatting_elements.len(), |index| index + 1);
                    self.active_formatting_elements
                        .insert_at(index, new_element.clone(), formatting_token);
                }
            }

            // "19. Remove formatting element from the stack of open elements,
            // and insert the new element into the stack of open elements
            // immediately below the position of furthest block in that stack."
            let _ = self.open_elements.remove(&formatting_element);
            let entry = self.describe_element(&new_element);
            self.open_elements.insert_after(&furthest_block, entry);
        }
        false
    }

    fn clone_formatting_element(&mut self, token: &Token) -> S::Handle {
        let tag_name = token.tag_name().unwrap_or_default();
        self.create_element_for_token(token, tag_name, Namespace::Html, token.attributes().to_vec())
    }
}
