use std::mem;

use crate::parse_error::ParseErrorCode;
use crate::parser::core::{HTMLParser, InsertionMode};
use crate::tokenizer::Token;
use crate::tree_sink::TreeSink;

const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    pub(crate) fn handle_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A character token, if the current node is table, tbody,
            // template, tfoot, thead, or tr element"
            // "Let the pending table character tokens be an empty list of
            // tokens."
            // "Let the original insertion mode be the current insertion mode."
            // "Switch the insertion mode to "in table text" and reprocess the
            // token."
            Token::Character { .. } | Token::Whitespace { .. } | Token::NullCharacter { .. }
                if self
                    .open_elements
                    .current_is_one_of(&["table", "tbody", "template", "tfoot", "thead", "tr"]) =>
            {
                self.pending_table_text.clear();
                self.pending_table_text_is_dirty = false;
                self.original_insertion_mode = Some(self.insertion_mode);
                self.switch_to(InsertionMode::InTableText);
                self.reprocess(token);
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorCode::MisplacedDoctype),

            Token::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is "caption""
                // "Clear the stack back to a table context."
                // "Insert a marker at the end of the list of active formatting
                // elements."
                // "Insert an HTML element for the token, then switch the
                // insertion mode to "in caption"."
                "caption" => {
                    self.open_elements.clear_back_to_table_context();
                    self.active_formatting_elements.insert_marker();
                    let _ = self.insert_html_element(token);
                    self.switch_to(InsertionMode::InCaption);
                }

                // "A start tag whose tag name is "colgroup""
                "colgroup" => {
                    self.open_elements.clear_back_to_table_context();
                    let _ = self.insert_html_element(token);
                    self.switch_to(InsertionMode::InColumnGroup);
                }

                // "A start tag whose tag name is "col""
                // "Clear the stack back to a table context."
                // "Insert an HTML element for a "colgroup" start tag token with
                // no attributes, then switch the insertion mode to "in column
                // group"."
                // "Reprocess the current token."
                "col" => {
                    self.open_elements.clear_back_to_table_context();
                    let _ = self.insert_synthetic_html_element("colgroup");
                    self.switch_to(InsertionMode::InColumnGroup);
                    self.reprocess(token);
                }

                // "A start tag whose tag name is one of: "tbody", "tfoot", "thead""
                "tbody" | "tfoot" | "thead" => {
                    self.open_elements.clear_back_to_table_context();
                    let _ = self.insert_html_element(token);
                    self.switch_to(InsertionMode::InTableBody);
                }

                // "A start tag whose tag name is one of: "td", "th", "tr""
                // "Clear the stack back to a table context."
                // "Insert an HTML element for a "tbody" start tag token with no
                // attributes, then switch the insertion mode to "in table body"."
                // "Reprocess the current token."
                "td" | "th" | "tr" => {
                    self.open_elements.clear_back_to_table_context();
                    let _ = self.insert_synthetic_html_element("tbody");
                    self.switch_to(InsertionMode::InTableBody);
                    self.reprocess(token);
                }

                // "A start tag whose tag name is "table""
                // "Parse error."
                // "If the stack of open elements does not have a table element
                // in table scope, ignore the token."
                // "Otherwise: Pop elements from this stack until a table
                // element has been popped from the stack. Reset the insertion
                // mode appropriately. Reprocess the token."
                "table" => {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    if self.open_elements.has_in_table_scope("table") {
                        self.open_elements.pop_until_tag_popped("table");
                        self.reset_insertion_mode_appropriately();
                        self.reprocess(token);
                    }
                }

                // "A start tag whose tag name is one of: "style", "script", "template""
                // "Process the token using the rules for the "in head" insertion mode."
                "style" | "script" | "template" => self.process_using_rules_for(InsertionMode::InHead, token),

                // "A start tag whose tag name is "input""
                // "If the token does not have an attribute with the name
                // "type", or if it does, but that attribute's value is not an
                // ASCII case-insensitive match for the string "hidden", then:
                // act as described in the "anything else" entry below."
                // "Otherwise: Parse error. Insert an HTML element for the
                // token. Pop that input element off the stack of open
                // elements. Acknowledge the token's self-closing flag, if it is
                // set."
                "input"
                    if token
                        .attribute("type")
                        .is_some_and(|value| value.eq_ignore_ascii_case("hidden")) =>
                {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    let _ = self.insert_html_element(token);
                    let _ = self.open_elements.pop();
                }

                // "A start tag whose tag name is "form""
                // "Parse error."
                // "If there is a template element on the stack of open
                // elements, or if the form element pointer is not null, ignore
                // the token."
                // "Otherwise: Insert an HTML element for the token, and set the
                // form element pointer to point to the element created. Pop
                // that form element off the stack of open elements."
                "form" => {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    if self.open_elements.contains_tag("template") || self.form_element_pointer.is_some() {
                        return;
                    }
                    let form = self.insert_html_element(token);
                    self.form_element_pointer = Some(form);
                    let _ = self.open_elements.pop();
                }

                _ => self.in_table_anything_else(token),
            },

            Token::EndTag { name, .. } => match name.as_str() {
                // "An end tag whose tag name is "table""
                // "If the stack of open elements does not have a table element
                // in table scope, this is a parse error; ignore the token."
                // "Otherwise: Pop elements from this stack until a table
                // element has been popped from the stack. Reset the insertion
                // mode appropriately."
                "table" => {
                    if !self.open_elements.has_in_table_scope("table") {
                        self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                        return;
                    }
                    self.open_elements.pop_until_tag_popped("table");
                    self.reset_insertion_mode_appropriately();
                }

                // "An end tag whose tag name is one of: "body", "caption",
                // "col", "colgroup", "html", "tbody", "td", "tfoot", "th",
                // "thead", "tr""
                // "Parse error. Ignore the token."
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr" => {
                    self.parse_error(ParseErrorCode::UnexpectedEndTag);
                }

                // "An end tag whose tag name is "template""
                "template" => self.process_using_rules_for(InsertionMode::InHead, token),

                _ => self.in_table_anything_else(token),
            },

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::EndOfFile => self.process_using_rules_for(InsertionMode::InBody, token),

            _ => self.in_table_anything_else(token),
        }
    }

    /// "Anything else"
    /// "Parse error. Enable foster parenting, process the token using the rules
    /// for the "in body" insertion mode, and then disable foster parenting."
    fn in_table_anything_else(&mut self, token: &Token) {
        self.parse_error(ParseErrorCode::FosterParentedContent);
        self.foster_parenting = true;
        self.process_using_rules_for(InsertionMode::InBody, token);
        self.foster_parenting = false;
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(crate) fn handle_in_table_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::NullCharacter { .. } => self.parse_error(ParseErrorCode::UnexpectedNullCharacter),

            // "Any other character token"
            // "Append the character token to the pending table character
            // tokens list."
            Token::Whitespace { data } => self.pending_table_text.push_str(data),
            Token::Character { data } => {
                self.pending_table_text.push_str(data);
                self.pending_table_text_is_dirty = true;
            }

            // "Anything else"
            _ => {
                // "If any of the tokens in the pending table character tokens
                // list are character tokens that are not ASCII whitespace, then
                // this is a parse error: reprocess the character tokens in the
                // pending table character tokens list using the rules given in
                // the "anything else" entry in the "in table" insertion mode."
                // "Otherwise, insert the characters given by the pending table
                // character tokens list."
                let text = mem::take(&mut self.pending_table_text);
                if mem::take(&mut self.pending_table_text_is_dirty) {
                    self.in_table_anything_else(&Token::Character { data: text });
                } else if !text.is_empty() {
                    self.insert_characters(&text);
                }
                // "Switch the insertion mode to the original insertion mode
                // and reprocess the token."
                self.switch_to_original_insertion_mode();
                self.reprocess(token);
            }
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(crate) fn handle_in_caption_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is "caption""
            Token::EndTag { name, .. } if name == "caption" => {
                let _ = self.close_caption();
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "An end tag whose tag name is "table""
            // "If the stack of open elements does not have a caption element
            // in table scope, this is a parse error; ignore the token.
            // (fragment case)"
            // "Otherwise: ... Reprocess the token."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                if self.close_caption() {
                    self.reprocess(token);
                }
            }
            Token::EndTag { name, .. } if name == "table" => {
                if self.close_caption() {
                    self.reprocess(token);
                }
            }

            // "An end tag whose tag name is one of: "body", "col", "colgroup",
            // "html", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                self.parse_error(ParseErrorCode::UnexpectedEndTag);
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion mode."
            _ => self.process_using_rules_for(InsertionMode::InBody, token),
        }
    }

    /// The shared "caption" end tag steps. Returns whether a caption was closed.
    fn close_caption(&mut self) -> bool {
        // "If the stack of open elements does not have a caption element in
        // table scope, this is a parse error; ignore the token. (fragment case)"
        if !self.open_elements.has_in_table_scope("caption") {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return false;
        }
        // "1. Generate implied end tags."
        // "2. Now, if the current node is not a caption element, then this is
        // a parse error."
        // "3. Pop elements from this stack until a caption element has been
        // popped from the stack."
        // "4. Clear the list of active formatting elements up to the last marker."
        // "5. Switch the insertion mode to "in table"."
        self.generate_implied_end_tags_and_pop("caption", None);
        self.active_formatting_elements.clear_to_last_marker();
        self.switch_to(InsertionMode::InTable);
        true
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup)
    pub(crate) fn handle_in_column_group_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "Insert the character."
            Token::Whitespace { data } => self.insert_characters(data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorCode::MisplacedDoctype),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }

            // "A start tag whose tag name is "col""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            Token::StartTag { name, .. } if name == "col" => {
                let _ = self.insert_html_element(token);
                let _ = self.open_elements.pop();
            }

            // "An end tag whose tag name is "colgroup""
            // "If the current node is not a colgroup element, then this is a
            // parse error; ignore the token."
            // "Otherwise, pop the current node from the stack of open
            // elements. Switch the insertion mode to "in table"."
            Token::EndTag { name, .. } if name == "colgroup" => {
                if !self.open_elements.current_is("colgroup") {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                let _ = self.open_elements.pop();
                self.switch_to(InsertionMode::InTable);
            }

            // "An end tag whose tag name is "col""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. } if name == "col" => self.parse_error(ParseErrorCode::UnexpectedEndTag),

            // "A start tag whose tag name is "template""
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::StartTag { name, .. } | Token::EndTag { name, .. } if name == "template" => {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::EndOfFile => self.process_using_rules_for(InsertionMode::InBody, token),

            // "Anything else"
            // "If the current node is not a colgroup element, then this is a
            // parse error; ignore the token."
            // "Otherwise, pop the current node from the stack of open elements."
            // "Switch the insertion mode to "in table"."
            // "Reprocess the token."
            _ => {
                if !self.open_elements.current_is("colgroup") {
                    self.parse_error(ParseErrorCode::UnexpectedTokenInTable);
                    return;
                }
                let _ = self.open_elements.pop();
                self.switch_to(InsertionMode::InTable);
                self.reprocess(token);
            }
        }
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    pub(crate) fn handle_in_table_body_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is "tr""
            // "Clear the stack back to a table body context."
            // "Insert an HTML element for the token, then switch the insertion
            // mode to "in row"."
            Token::StartTag { name, .. } if name == "tr" => {
                self.open_elements.clear_back_to_table_body_context();
                let _ = self.insert_html_element(token);
                self.switch_to(InsertionMode::InRow);
            }

            // "A start tag whose tag name is one of: "th", "td""
            // "Parse error."
            // "Clear the stack back to a table body context."
            // "Insert an HTML element for a "tr" start tag token with no
            // attributes, then switch the insertion mode to "in row"."
            // "Reprocess the current token."
            Token::StartTag { name, .. } if name == "th" || name == "td" => {
                self.parse_error(ParseErrorCode::UnexpectedStartTag);
                self.open_elements.clear_back_to_table_body_context();
                let _ = self.insert_synthetic_html_element("tr");
                self.switch_to(InsertionMode::InRow);
                self.reprocess(token);
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            // "If the stack of open elements does not have an element in table
            // scope that is an HTML element with the same tag name as the
            // token, this is a parse error; ignore the token."
            // "Otherwise: Clear the stack back to a table body context. Pop
            // the current node from the stack of open elements. Switch the
            // insertion mode to "in table"."
            Token::EndTag { name, .. } if TABLE_SECTIONS.contains(&name.as_str()) => {
                if !self.open_elements.has_in_table_scope(name) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                self.open_elements.clear_back_to_table_body_context();
                let _ = self.open_elements.pop();
                self.switch_to(InsertionMode::InTable);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "tfoot", "thead""
            // "An end tag whose tag name is "table""
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead") =>
            {
                self.close_table_body_and_reprocess(token);
            }
            Token::EndTag { name, .. } if name == "table" => self.close_table_body_and_reprocess(token),

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html", "td", "th", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.parse_error(ParseErrorCode::UnexpectedEndTag);
            }

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion mode."
            _ => self.process_using_rules_for(InsertionMode::InTable, token),
        }
    }

    /// "If the stack of open elements does not have a tbody, thead, or tfoot
    /// element in table scope, this is a parse error; ignore the token."
    /// "Otherwise: Clear the stack back to a table body context. Pop the
    /// current node from the stack of open elements. Switch the insertion mode
    /// to "in table". Reprocess the token."
    fn close_table_body_and_reprocess(&mut self, token: &Token) {
        if !self.open_elements.has_table_body_context_in_table_scope() {
            self.parse_error(ParseErrorCode::UnexpectedTokenInTable);
            return;
        }
        self.open_elements.clear_back_to_table_body_context();
        let _ = self.open_elements.pop();
        self.switch_to(InsertionMode::InTable);
        self.reprocess(token);
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    pub(crate) fn handle_in_row_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: "th", "td""
            // "Clear the stack back to a table row context."
            // "Insert an HTML element for the token, then switch the insertion
            // mode to "in cell"."
            // "Insert a marker at the end of the list of active formatting
            // elements."
            Token::StartTag { name, .. } if name == "th" || name == "td" => {
                self.open_elements.clear_back_to_table_row_context();
                let _ = self.insert_html_element(token);
                self.switch_to(InsertionMode::InCell);
                self.active_formatting_elements.insert_marker();
            }

            // "An end tag whose tag name is "tr""
            Token::EndTag { name, .. } if name == "tr" => {
                let _ = self.close_table_row();
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "tfoot", "thead", "tr""
            // "An end tag whose tag name is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                if self.close_table_row() {
                    self.reprocess(token);
                }
            }
            Token::EndTag { name, .. } if name == "table" => {
                if self.close_table_row() {
                    self.reprocess(token);
                }
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            // "If the stack of open elements does not have an element in table
            // scope that is an HTML element with the same tag name as the
            // token, this is a parse error; ignore the token."
            // "If the stack of open elements does not have a tr element in
            // table scope, ignore the token."
            // "Otherwise: ... Reprocess the token."
            Token::EndTag { name, .. } if TABLE_SECTIONS.contains(&name.as_str()) => {
                if !self.open_elements.has_in_table_scope(name) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                if !self.open_elements.has_in_table_scope("tr") {
                    return;
                }
                if self.close_table_row() {
                    self.reprocess(token);
                }
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html", "td", "th""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.parse_error(ParseErrorCode::UnexpectedEndTag);
            }

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion mode."
            _ => self.process_using_rules_for(InsertionMode::InTable, token),
        }
    }

    /// The "tr" end tag steps. Returns whether a row was closed.
    fn close_table_row(&mut self) -> bool {
        // "If the stack of open elements does not have a tr element in table
        // scope, this is a parse error; ignore the token."
        if !self.open_elements.has_in_table_scope("tr") {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return false;
        }
        // "Otherwise: Clear the stack back to a table row context. Pop the
        // current node (which will be a tr element) from the stack of open
        // elements. Switch the insertion mode to "in table body"."
        self.open_elements.clear_back_to_table_row_context();
        let _ = self.open_elements.pop();
        self.switch_to(InsertionMode::InTableBody);
        true
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    pub(crate) fn handle_in_cell_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is one of: "td", "th""
            Token::EndTag { name, .. } if name == "td" || name == "th" => {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // that of the token, then this is a parse error; ignore the
                // token."
                if !self.open_elements.has_in_table_scope(name) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "1. Generate implied end tags."
                // "2. Now, if the current node is not an HTML element with the
                // same tag name as the token, then this is a parse error."
                // "3. Pop elements from the stack of open elements until an
                // HTML element with the same tag name as the token has been
                // popped from the stack."
                // "4. Clear the list of active formatting elements up to the
                // last marker."
                // "5. Switch the insertion mode to "in row"."
                self.generate_implied_end_tags_and_pop(name, None);
                self.active_formatting_elements.clear_to_last_marker();
                self.switch_to(InsertionMode::InRow);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Assert: The stack of open elements has a td or th element in
            // table scope."
            // "Close the cell (see below) and reprocess the token."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                if !self.open_elements.has_cell_in_table_scope() {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    return;
                }
                self.close_the_cell();
                self.reprocess(token);
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. } if matches!(name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") => {
                self.parse_error(ParseErrorCode::UnexpectedEndTag);
            }

            // "An end tag whose tag name is one of: "table", "tbody", "tfoot",
            // "thead", "tr""
            // "If the stack of open elements does not have an element in table
            // scope that is an HTML element with the same tag name as that of
            // the token, then this is a parse error; ignore the token."
            // "Otherwise, close the cell (see below) and reprocess the token."
            Token::EndTag { name, .. } if matches!(name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") => {
                if !self.open_elements.has_in_table_scope(name) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                self.close_the_cell();
                self.reprocess(token);
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion mode."
            _ => self.process_using_rules_for(InsertionMode::InBody, token),
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "1. Generate implied end tags.
    /// 2. If the current node is not now a td element or a th element, then
    /// this is a parse error.
    /// 3. Pop elements from the stack of open elements until a td element or a
    /// th element has been popped from the stack.
    /// 4. Clear the list of active formatting elements up to the last marker.
    /// 5. Switch the insertion mode to "in row"."
    fn close_the_cell(&mut self) {
        self.open_elements.generate_implied_end_tags(None);
        if !self.open_elements.current_is_one_of(&["td", "th"]) {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        self.open_elements.pop_until_one_of_popped(&["td", "th"]);
        self.active_formatting_elements.clear_to_last_marker();
        self.switch_to(InsertionMode::InRow);
    }
}
