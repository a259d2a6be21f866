use crate::parse_error::ParseErrorCode;
use crate::parser::core::{HTMLParser, InsertionMode};
use crate::tokenizer::Token;
use crate::tree_sink::TreeSink;

const TABLE_TAGS: &[&str] = &["caption", "table", "tbody", "tfoot", "thead", "tr", "td", "th"];

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(crate) fn handle_in_select_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::NullCharacter { .. } => self.parse_error(ParseErrorCode::UnexpectedNullCharacter),

            // "Any other character token"
            // "Insert the token's character."
            Token::Character { data } | Token::Whitespace { data } => self.insert_characters(data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorCode::MisplacedDoctype),

            Token::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is "html""
                // "Process the token using the rules for the "in body" insertion mode."
                "html" => self.process_using_rules_for(InsertionMode::InBody, token),

                // "A start tag whose tag name is "option""
                // "If the current node is an option element, pop that node from
                // the stack of open elements."
                // "Insert an HTML element for the token."
                "option" => {
                    self.pop_current_if("option");
                    let _ = self.insert_html_element(token);
                }

                // "A start tag whose tag name is "optgroup""
                // "If the current node is an option element, pop that node from
                // the stack of open elements."
                // "If the current node is an optgroup element, pop that node
                // from the stack of open elements."
                // "Insert an HTML element for the token."
                "optgroup" => {
                    self.pop_current_if("option");
                    self.pop_current_if("optgroup");
                    let _ = self.insert_html_element(token);
                }

                // "A start tag whose tag name is "hr""
                // (as "optgroup", then) "Immediately pop the current node off
                // the stack of open elements."
                "hr" => {
                    self.pop_current_if("option");
                    self.pop_current_if("optgroup");
                    let _ = self.insert_html_element(token);
                    let _ = self.open_elements.pop();
                }

                // "A start tag whose tag name is "select""
                // "Parse error."
                // "If the stack of open elements does not have a select element
                // in select scope, ignore the token. (fragment case)"
                // "Otherwise: Pop elements from the stack of open elements
                // until a select element has been popped from the stack. Reset
                // the insertion mode appropriately."
                "select" => {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    if self.open_elements.has_in_select_scope("select") {
                        self.close_select();
                    }
                }

                // "A start tag whose tag name is one of: "input", "keygen", "textarea""
                // "Parse error."
                // "If the stack of open elements does not have a select element
                // in select scope, ignore the token. (fragment case)"
                // "Otherwise: ... Reprocess the token."
                "input" | "keygen" | "textarea" => {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    if self.open_elements.has_in_select_scope("select") {
                        self.close_select();
                        self.reprocess(token);
                    }
                }

                // "A start tag whose tag name is one of: "script", "template""
                // "Process the token using the rules for the "in head" insertion mode."
                "script" | "template" => self.process_using_rules_for(InsertionMode::InHead, token),

                // "Anything else"
                // "Parse error. Ignore the token."
                _ => self.parse_error(ParseErrorCode::UnexpectedTokenInSelect),
            },

            Token::EndTag { name, .. } => match name.as_str() {
                // "An end tag whose tag name is "optgroup""
                "optgroup" => {
                    // "First, if the current node is an option element, and the
                    // node immediately before it in the stack of open elements
                    // is an optgroup element, then pop the current node from
                    // the stack of open elements."
                    let len = self.open_elements.len();
                    let before_is_optgroup = len >= 2
                        && self
                            .open_elements
                            .get(len - 2)
                            .is_some_and(|entry| entry.is_html("optgroup"));
                    if self.open_elements.current_is("option") && before_is_optgroup {
                        let _ = self.open_elements.pop();
                    }
                    // "If the current node is an optgroup element, then pop that
                    // node from the stack of open elements. Otherwise, this is
                    // a parse error; ignore the token."
                    if self.open_elements.current_is("optgroup") {
                        let _ = self.open_elements.pop();
                    } else {
                        self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    }
                }

                // "An end tag whose tag name is "option""
                // "If the current node is an option element, then pop that node
                // from the stack of open elements. Otherwise, this is a parse
                // error; ignore the token."
                "option" => {
                    if self.open_elements.current_is("option") {
                        let _ = self.open_elements.pop();
                    } else {
                        self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    }
                }

                // "An end tag whose tag name is "select""
                // "If the stack of open elements does not have a select element
                // in select scope, this is a parse error; ignore the token.
                // (fragment case)"
                "select" => {
                    if self.open_elements.has_in_select_scope("select") {
                        self.close_select();
                    } else {
                        self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    }
                }

                // "An end tag whose tag name is "template""
                "template" => self.process_using_rules_for(InsertionMode::InHead, token),

                _ => self.parse_error(ParseErrorCode::UnexpectedTokenInSelect),
            },

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::EndOfFile => self.process_using_rules_for(InsertionMode::InBody, token),
        }
    }

    fn pop_current_if(&mut self, tag_name: &str) {
        if self.open_elements.current_is(tag_name) {
            let _ = self.open_elements.pop();
        }
    }

    /// "Pop elements from the stack of open elements until a select element
    /// has been popped from the stack. Reset the insertion mode appropriately."
    fn close_select(&mut self) {
        self.open_elements.pop_until_tag_popped("select");
        self.reset_insertion_mode_appropriately();
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(crate) fn handle_in_select_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: "caption", "table",
            // "tbody", "tfoot", "thead", "tr", "td", "th""
            // "Parse error."
            // "Pop elements from the stack of open elements until a select
            // element has been popped from the stack."
            // "Reset the insertion mode appropriately."
            // "Reprocess the token."
            Token::StartTag { name, .. } if TABLE_TAGS.contains(&name.as_str()) => {
                self.parse_error(ParseErrorCode::UnexpectedStartTag);
                self.close_select();
                self.reprocess(token);
            }

            // "An end tag whose tag name is one of: "caption", "table",
            // "tbody", "tfoot", "thead", "tr", "td", "th""
            // "Parse error."
            // "If the stack of open elements does not have an element in table
            // scope that is an HTML element with the same tag name as that of
            // the token, then ignore the token."
            // "Otherwise: ... Reprocess the token."
            Token::EndTag { name, .. } if TABLE_TAGS.contains(&name.as_str()) => {
                self.parse_error(ParseErrorCode::UnexpectedEndTag);
                if self.open_elements.has_in_table_scope(name) {
                    self.close_select();
                    self.reprocess(token);
                }
            }

            // "Anything else"
            // "Process the token using the rules for the "in select" insertion mode."
            _ => self.process_using_rules_for(InsertionMode::InSelect, token),
        }
    }
}
