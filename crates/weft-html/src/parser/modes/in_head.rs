use weft_dom::Namespace;

use crate::parse_error::ParseErrorCode;
use crate::parser::core::{HTMLParser, InsertionMode};
use crate::tokenizer::{Token, TokenizerState};
use crate::tree_sink::TreeSink;

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(crate) fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
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

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            //
            // "A start tag whose tag name is "meta""
            // (same, plus encoding sniffing, which does not apply to strings)
            Token::StartTag { name, .. } if matches!(name.as_str(), "base" | "basefont" | "bgsound" | "link" | "meta") => {
                let _ = self.insert_html_element(token);
                let _ = self.open_elements.pop();
            }

            // "A start tag whose tag name is "title""
            // "Follow the generic RCDATA element parsing algorithm."
            Token::StartTag { name, .. } if name == "title" => {
                self.parse_text_only_element(token, TokenizerState::RCDATA);
            }

            // "A start tag whose tag name is "noscript", if the scripting flag
            // is enabled"
            // "A start tag whose tag name is one of: "noframes", "style""
            // "Follow the generic raw text element parsing algorithm."
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "noframes" | "style")
                    || (name == "noscript" && self.options.scripting_enabled) =>
            {
                self.parse_text_only_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "noscript", if the scripting flag
            // is disabled"
            // "Insert an HTML element for the token."
            // "Switch the insertion mode to "in head noscript"."
            Token::StartTag { name, .. } if name == "noscript" => {
                let _ = self.insert_html_element(token);
                self.switch_to(InsertionMode::InHeadNoscript);
            }

            // "A start tag whose tag name is "script""
            Token::StartTag { name, attributes, .. } if name == "script" => {
                // "1. Let the adjusted insertion location be the appropriate
                // place for inserting a node."
                let location = self.appropriate_place_for_inserting(None);
                // "2. Create an element for the token in the HTML namespace,
                // with the intended parent being the element in which the
                // adjusted insertion location finds itself."
                let script = self.create_element_for_token(token, name, Namespace::Html, attributes.clone());
                // "5. Insert the newly created element at the adjusted
                // insertion location."
                self.insert_node_at(&location, &script);
                // "6. Push the element onto the stack of open elements so that
                // it is the new current node."
                let entry = self.describe_element(&script);
                self.open_elements.push(entry);
                // "7. Switch the tokenizer to the script data state."
                self.tokenizer.set_state(TokenizerState::ScriptData);
                // "8. Set the original insertion mode to the current insertion mode."
                // "9. Switch the insertion mode to "text"."
                self.original_insertion_mode = Some(self.insertion_mode);
                self.switch_to(InsertionMode::Text);
            }

            // "An end tag whose tag name is "head""
            // "Pop the current node (which will be the head element) off the
            // stack of open elements."
            // "Switch the insertion mode to "after head"."
            Token::EndTag { name, .. } if name == "head" => {
                let _ = self.open_elements.pop();
                self.switch_to(InsertionMode::AfterHead);
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.handle_in_head_anything_else(token);
            }

            // "A start tag whose tag name is "template""
            Token::StartTag { name, .. } if name == "template" => {
                // "Insert an HTML element for the token."
                // "Insert a marker at the end of the list of active formatting
                // elements."
                // "Set the frameset-ok flag to "not ok"."
                // "Switch the insertion mode to "in template"."
                // "Push "in template" onto the stack of template insertion
                // modes so that it is the new current template insertion mode."
                let _ = self.insert_html_element(token);
                self.active_formatting_elements.insert_marker();
                self.frameset_ok = false;
                self.switch_to(InsertionMode::InTemplate);
                self.template_insertion_modes.push(InsertionMode::InTemplate);
            }

            // "An end tag whose tag name is "template""
            Token::EndTag { name, .. } if name == "template" => self.close_template_element(),

            // "A start tag whose tag name is "head""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error(ParseErrorCode::MisplacedStartTagForHeadElement);
            }
            Token::EndTag { .. } => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            _ => self.handle_in_head_anything_else(token),
        }
    }

    /// "Anything else"
    /// "Pop the current node (which will be the head element) off the stack of
    /// open elements."
    /// "Switch the insertion mode to "after head"."
    /// "Reprocess the token."
    fn handle_in_head_anything_else(&mut self, token: &Token) {
        let _ = self.open_elements.pop();
        self.switch_to(InsertionMode::AfterHead);
        self.reprocess(token);
    }

    /// The "in head" rules for `</template>`.
    pub(crate) fn close_template_element(&mut self) {
        // "If there is no template element on the stack of open elements, then
        // this is a parse error; ignore the token."
        if !self.open_elements.contains_tag("template") {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return;
        }
        // "1. Generate all implied end tags thoroughly."
        self.open_elements.generate_all_implied_end_tags_thoroughly();
        // "2. If the current node is not a template element, then this is a
        // parse error."
        if !self.open_elements.current_is("template") {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        // "3. Pop elements from the stack of open elements until a template
        // element has been popped from the stack."
        self.open_elements.pop_until_tag_popped("template");
        // "4. Clear the list of active formatting elements up to the last marker."
        self.active_formatting_elements.clear_to_last_marker();
        // "5. Pop the current template insertion mode off the stack of
        // template insertion modes."
        let _ = self.template_insertion_modes.pop();
        // "6. Reset the insertion mode appropriately."
        self.reset_insertion_mode_appropriately();
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(crate) fn handle_in_head_noscript_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorCode::MisplacedDoctype),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => {
                self.process_using_rules_for(InsertionMode::InBody, token);
            }

            // "An end tag whose tag name is "noscript""
            // "Pop the current node (which will be a noscript element) from the
            // stack of open elements; the new current node will be a head
            // element."
            // "Switch the insertion mode to "in head"."
            Token::EndTag { name, .. } if name == "noscript" => {
                let _ = self.open_elements.pop();
                self.switch_to(InsertionMode::InHead);
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "A comment token"
            // "A start tag whose tag name is one of: "basefont", "bgsound",
            // "link", "meta", "noframes", "style""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::Whitespace { .. } | Token::Comment { .. } => {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style") =>
            {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }

            // "An end tag whose tag name is "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. } if name == "br" => self.handle_in_head_noscript_anything_else(token),

            // "A start tag whose tag name is one of: "head", "noscript""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if matches!(name.as_str(), "head" | "noscript") => {
                self.parse_error(ParseErrorCode::NestedNoscriptInHead);
            }
            Token::EndTag { .. } => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            _ => self.handle_in_head_noscript_anything_else(token),
        }
    }

    /// "Anything else"
    /// "Parse error."
    /// "Pop the current node (which will be a noscript element) from the stack
    /// of open elements; the new current node will be a head element."
    /// "Switch the insertion mode to "in head"."
    /// "Reprocess the token."
    fn handle_in_head_noscript_anything_else(&mut self, token: &Token) {
        self.parse_error(ParseErrorCode::DisallowedContentInNoscriptInHead);
        let _ = self.open_elements.pop();
        self.switch_to(InsertionMode::InHead);
        self.reprocess(token);
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(crate) fn handle_after_head_mode(&mut self, token: &Token) {
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

            // "A start tag whose tag name is "body""
            // "Insert an HTML element for the token."
            // "Set the frameset-ok flag to "not ok"."
            // "Switch the insertion mode to "in body"."
            Token::StartTag { name, .. } if name == "body" => {
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.switch_to(InsertionMode::InBody);
            }

            // "A start tag whose tag name is "frameset""
            // "Insert an HTML element for the token."
            // "Switch the insertion mode to "in frameset"."
            Token::StartTag { name, .. } if name == "frameset" => {
                let _ = self.insert_html_element(token);
                self.switch_to(InsertionMode::InFrameset);
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "template"
                        | "title"
                ) =>
            {
                // "Parse error."
                // "Push the node pointed to by the head element pointer onto
                // the stack of open elements."
                // "Process the token using the rules for the "in head"
                // insertion mode."
                // "Remove the node pointed to by the head element pointer from
                // the stack of open elements. (It might not be the current
                // node at this point.)"
                self.parse_error(ParseErrorCode::AbandonedHeadElementChild);
                let Some(head) = self.head_element_pointer.clone() else {
                    return;
                };
                let entry = self.describe_element(&head);
                self.open_elements.push(entry);
                self.process_using_rules_for(InsertionMode::InHead, token);
                let _ = self.open_elements.remove(&head);
            }

            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::EndTag { name, .. } if name == "template" => {
                self.process_using_rules_for(InsertionMode::InHead, token);
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.handle_after_head_anything_else(token);
            }

            // "A start tag whose tag name is "head""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error(ParseErrorCode::MisplacedStartTagForHeadElement);
            }
            Token::EndTag { .. } => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            _ => self.handle_after_head_anything_else(token),
        }
    }

    /// "Anything else"
    /// "Insert an HTML element for a "body" start tag token with no attributes."
    /// "Switch the insertion mode to "in body"."
    /// "Reprocess the current token."
    fn handle_after_head_anything_else(&mut self, token: &Token) {
        let _ = self.insert_synthetic_html_element("body");
        self.switch_to(InsertionMode::InBody);
        self.reprocess(token);
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(crate) fn handle_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token"
            // "Insert the token's character."
            Token::Character { data } | Token::Whitespace { data } | Token::NullCharacter { data } => {
                self.insert_characters(data);
            }

            // "An end-of-file token"
            // "Parse error."
            // "If the current node is a script element, then set its already
            // started to true."
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode and
            // reprocess the token."
            Token::EndOfFile => {
                self.parse_error(ParseErrorCode::EofInElementThatCanContainOnlyText);
                let _ = self.open_elements.pop();
                self.switch_to_original_insertion_mode();
                self.reprocess(token);
            }

            // "An end tag whose tag name is "script""
            Token::EndTag { name, .. } if name == "script" => {
                // "Let script be the current node (which will be a script element)."
                // "Pop the current node off the stack of open elements."
                // "Switch the insertion mode to the original insertion mode."
                let script = self.open_elements.pop();
                self.switch_to_original_insertion_mode();
                // Scripts created by the fragment parsing algorithm are marked
                // "already started" and never run.
                if self.fragment_root.is_none() {
                    self.pending_script = script.map(|entry| entry.handle);
                }
            }

            // "Any other end tag"
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode."
            Token::EndTag { .. } => {
                let _ = self.open_elements.pop();
                self.switch_to_original_insertion_mode();
            }

            Token::StartTag { .. } | Token::Comment { .. } | Token::Doctype { .. } => {}
        }
    }

    pub(crate) fn switch_to_original_insertion_mode(&mut self) {
        let mode = self.original_insertion_mode.take().unwrap_or(InsertionMode::InBody);
        self.switch_to(mode);
    }
}
