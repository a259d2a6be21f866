use weft_dom::Namespace;

use crate::parse_error::ParseErrorCode;
use crate::parser::core::{HTMLParser, InsertionMode};
use crate::parser::foreign_content::{adjust_foreign_attributes, adjust_mathml_attributes, adjust_svg_attributes};
use crate::tokenizer::{Token, TokenizerState};
use crate::tree_sink::TreeSink;

/// Start tags that close a `p` in button scope and open a block.
const BLOCK_START_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "search",
    "section",
    "summary",
    "ul",
];

/// End tags that close a block element in scope.
const BLOCK_END_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "button",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "listing",
    "main",
    "menu",
    "nav",
    "ol",
    "pre",
    "search",
    "section",
    "summary",
    "ul",
];

const NUMBERED_HEADERS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Formatting elements other than `a` and `nobr`, which have their own rules.
const FORMATTING_START_TAGS: &[&str] = &[
    "b", "big", "code", "em", "font", "i", "s", "small", "strike", "strong", "tt", "u",
];

/// "An end tag whose tag name is one of: "a", "b", "big", "code", "em", "font",
/// "i", "nobr", "s", "small", "strike", "strong", "tt", "u""
const FORMATTING_END_TAGS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt", "u",
];

/// Elements that may legitimately still be open at end of file or at `</body>`.
const CLOSABLE_AT_END: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc", "tbody", "td", "tfoot", "th", "thead",
    "tr", "body", "html",
];

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(crate) fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::NullCharacter { .. } => self.parse_error(ParseErrorCode::UnexpectedNullCharacter),

            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "Reconstruct the active formatting elements, if any."
            // "Insert the token's character."
            Token::Whitespace { data } => {
                self.reconstruct_active_formatting_elements();
                self.insert_characters(data);
            }

            // "Any other character token"
            // "Reconstruct the active formatting elements, if any."
            // "Insert the token's character."
            // "Set the frameset-ok flag to "not ok"."
            Token::Character { data } => {
                self.reconstruct_active_formatting_elements();
                self.insert_characters(data);
                self.frameset_ok = false;
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorCode::MisplacedDoctype),

            Token::StartTag { name, .. } => self.handle_in_body_start_tag(name, token),
            Token::EndTag { name, .. } => self.handle_in_body_end_tag(name, token),

            // "An end-of-file token"
            Token::EndOfFile => {
                // "If the stack of template insertion modes is not empty, then
                // process the token using the rules for the "in template"
                // insertion mode."
                if !self.template_insertion_modes.is_empty() {
                    self.process_using_rules_for(InsertionMode::InTemplate, token);
                    return;
                }
                // "Otherwise, follow these steps:"
                // "1. If there is a node in the stack of open elements that is
                // not either a dd element, a dt element, an li element, an
                // optgroup element, an option element, a p element, an rb
                // element, an rp element, an rt element, an rtc element, a
                // tbody element, a td element, a tfoot element, a th element, a
                // thead element, a tr element, the body element, or the html
                // element, then this is a parse error."
                self.check_open_elements_at_end(ParseErrorCode::OpenElementsLeftAfterEof);
                // "2. Stop parsing."
                self.stop_parsing();
            }
        }
    }

    fn check_open_elements_at_end(&mut self, code: ParseErrorCode) {
        if self.open_elements.iter().any(|entry| !entry.is_html_one_of(CLOSABLE_AT_END)) {
            self.parse_error(code);
        }
    }

    fn handle_in_body_start_tag(&mut self, name: &str, token: &Token) {
        match name {
            // "A start tag whose tag name is "html""
            "html" => {
                // "Parse error."
                // "If there is a template element on the stack of open
                // elements, then ignore the token."
                // "Otherwise, for each attribute on the token, check to see if
                // the attribute is already present on the top element of the
                // stack of open elements. If it is not, add the attribute and
                // its corresponding value to that element."
                self.parse_error(ParseErrorCode::UnexpectedStartTag);
                if self.open_elements.contains_tag("template") {
                    return;
                }
                if let Some(html) = self.open_elements.get(0).map(|entry| entry.handle.clone()) {
                    self.sink.adopt_attributes(&html, token.attributes());
                }
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Process the token using the rules for the "in head" insertion mode."
            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style" | "template"
            | "title" => self.process_using_rules_for(InsertionMode::InHead, token),

            // "A start tag whose tag name is "body""
            "body" => {
                // "Parse error."
                // "If the stack of open elements has only one node on it, if
                // the second element on the stack of open elements is not a
                // body element, or if there is a template element on the stack
                // of open elements, then ignore the token. (fragment case or
                // there is a template element on the stack)"
                // "Otherwise, set the frameset-ok flag to "not ok"; then, for
                // each attribute on the token, check to see if the attribute is
                // already present on the body element (the second element) on
                // the stack of open elements, and if it is not, add the
                // attribute and its corresponding value to that element."
                self.parse_error(ParseErrorCode::UnexpectedStartTag);
                let body = self.open_elements.get(1).filter(|entry| entry.is_html("body"));
                let Some(body) = body.map(|entry| entry.handle.clone()) else {
                    return;
                };
                if self.open_elements.contains_tag("template") {
                    return;
                }
                self.frameset_ok = false;
                self.sink.adopt_attributes(&body, token.attributes());
            }

            // "A start tag whose tag name is "frameset""
            "frameset" => {
                // "Parse error."
                self.parse_error(ParseErrorCode::UnexpectedStartTag);
                // "If the stack of open elements has only one node on it, or if
                // the second element on the stack of open elements is not a
                // body element, then ignore the token. (fragment case or there
                // is a template element on the stack)"
                // "If the frameset-ok flag is set to "not ok", ignore the token."
                let body = self.open_elements.get(1).filter(|entry| entry.is_html("body"));
                let Some(body) = body.map(|entry| entry.handle.clone()) else {
                    return;
                };
                if !self.frameset_ok {
                    return;
                }
                // "1. Remove the second element on the stack of open elements
                // from its parent node, if it has one."
                // "2. Pop all the nodes from the bottom of the stack of open
                // elements, from the current node up to, but not including,
                // the root html element."
                // "3. Insert an HTML element for the token."
                // "4. Switch the insertion mode to "in frameset"."
                self.sink.detach_node(&body);
                self.open_elements.truncate(1);
                let _ = self.insert_html_element(token);
                self.switch_to(InsertionMode::InFrameset);
            }

            // "A start tag whose tag name is one of: "address", "article",
            // "aside", "blockquote", "center", "details", "dialog", "dir",
            // "div", "dl", "fieldset", "figcaption", "figure", "footer",
            // "header", "hgroup", "main", "menu", "nav", "ol", "p", "search",
            // "section", "summary", "ul""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token."
            _ if BLOCK_START_TAGS.contains(&name) => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            _ if NUMBERED_HEADERS.contains(&name) => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                // "If the current node is an HTML element whose tag name is one
                // of "h1", "h2", "h3", "h4", "h5", or "h6", then this is a
                // parse error; pop the current node off the stack of open
                // elements."
                // "Insert an HTML element for the token."
                self.close_p_element_in_button_scope();
                if self.open_elements.current_is_one_of(NUMBERED_HEADERS) {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    let _ = self.open_elements.pop();
                }
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            "pre" | "listing" => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                // "Insert an HTML element for the token."
                // "If the next token is a U+000A LINE FEED (LF) character
                // token, then ignore that token and move on to the next one.
                // (Newlines at the start of pre blocks are ignored as an
                // authoring convenience.)"
                // "Set the frameset-ok flag to "not ok"."
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
                self.skip_next_newline = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "form""
            "form" => {
                // "If the form element pointer is not null, and there is no
                // template element on the stack of open elements, then this is
                // a parse error; ignore the token."
                let in_template = self.open_elements.contains_tag("template");
                if self.form_element_pointer.is_some() && !in_template {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    return;
                }
                // "Otherwise: If the stack of open elements has a p element in
                // button scope, then close a p element. Insert an HTML element
                // for the token, and, if there is no template element on the
                // stack of open elements, set the form element pointer to point
                // to the element created."
                self.close_p_element_in_button_scope();
                let form = self.insert_html_element(token);
                if !in_template {
                    self.form_element_pointer = Some(form);
                }
            }

            // "A start tag whose tag name is "li""
            // "A start tag whose tag name is one of: "dd", "dt""
            "li" | "dd" | "dt" => self.handle_list_item_start_tag(name, token),

            // "A start tag whose tag name is "plaintext""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token."
            // "Switch the tokenizer to the PLAINTEXT state."
            "plaintext" => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
                self.tokenizer.set_state(TokenizerState::PLAINTEXT);
            }

            // "A start tag whose tag name is "button""
            "button" => {
                // "1. If the stack of open elements has a button element in
                // scope, then run these substeps:"
                // "Parse error."
                // "Generate implied end tags."
                // "Pop elements from the stack of open elements until a button
                // element has been popped from the stack."
                if self.open_elements.has_in_scope("button") {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    self.open_elements.generate_implied_end_tags(None);
                    self.open_elements.pop_until_tag_popped("button");
                }
                // "2. Reconstruct the active formatting elements, if any."
                // "3. Insert an HTML element for the token."
                // "4. Set the frameset-ok flag to "not ok"."
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "a""
            "a" => {
                // "If the list of active formatting elements contains an a
                // element between the end of the list and the last marker on
                // the list (or the start of the list if there is no marker on
                // the list), then this is a parse error; run the adoption
                // agency algorithm for the token, then remove that element from
                // the list of active formatting elements and the stack of open
                // elements if the adoption agency algorithm didn't already
                // remove it (it might not have if the element is not in table
                // scope)."
                let existing = self
                    .active_formatting_elements
                    .element_in_scope_with_tag_name("a")
                    .map(|(_, handle)| handle.clone());
                if let Some(existing) = existing {
                    self.parse_error(ParseErrorCode::MisnestedFormattingElement);
                    let _ = self.run_adoption_agency("a");
                    let _ = self.active_formatting_elements.remove_entry(&existing);
                    let _ = self.open_elements.remove(&existing);
                }
                // "Reconstruct the active formatting elements, if any."
                // "Insert an HTML element for the token. Push onto the list of
                // active formatting elements that element."
                self.reconstruct_active_formatting_elements();
                self.insert_formatting_element(token);
            }

            // "A start tag whose tag name is one of: "b", "big", "code", "em",
            // "font", "i", "s", "small", "strike", "strong", "tt", "u""
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token. Push onto the list of
            // active formatting elements that element."
            _ if FORMATTING_START_TAGS.contains(&name) => {
                self.reconstruct_active_formatting_elements();
                self.insert_formatting_element(token);
            }

            // "A start tag whose tag name is "nobr""
            "nobr" => {
                // "Reconstruct the active formatting elements, if any."
                // "If the stack of open elements has a nobr element in scope,
                // then this is a parse error; run the adoption agency algorithm
                // for the token, then once again reconstruct the active
                // formatting elements, if any."
                // "Insert an HTML element for the token. Push onto the list of
                // active formatting elements that element."
                self.reconstruct_active_formatting_elements();
                if self.open_elements.has_in_scope("nobr") {
                    self.parse_error(ParseErrorCode::MisnestedFormattingElement);
                    let _ = self.run_adoption_agency("nobr");
                    self.reconstruct_active_formatting_elements();
                }
                self.insert_formatting_element(token);
            }

            // "A start tag whose tag name is one of: "applet", "marquee", "object""
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token."
            // "Insert a marker at the end of the list of active formatting elements."
            // "Set the frameset-ok flag to "not ok"."
            "applet" | "marquee" | "object" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.active_formatting_elements.insert_marker();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "table""
            // "If the Document is not set to quirks mode, and the stack of
            // open elements has a p element in button scope, then close a p
            // element."
            // "Insert an HTML element for the token."
            // "Set the frameset-ok flag to "not ok"."
            // "Switch the insertion mode to "in table"."
            "table" => {
                if !self.sink.is_quirks_mode() {
                    self.close_p_element_in_button_scope();
                }
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.switch_to(InsertionMode::InTable);
            }

            // "A start tag whose tag name is one of: "area", "br", "embed",
            // "img", "keygen", "wbr""
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => self.insert_void_element(token, true),

            // "A start tag whose tag name is "input""
            "input" => {
                // "If the token does not have an attribute with the name
                // "type", or if it does, but that attribute's value is not an
                // ASCII case-insensitive match for the string "hidden", then:
                // set the frameset-ok flag to "not ok"."
                let hidden = token
                    .attribute("type")
                    .is_some_and(|value| value.eq_ignore_ascii_case("hidden"));
                self.insert_void_element(token, !hidden);
            }

            // "A start tag whose tag name is one of: "param", "source", "track""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            "param" | "source" | "track" => {
                let _ = self.insert_html_element(token);
                let _ = self.open_elements.pop();
            }

            // "A start tag whose tag name is "hr""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            // "Set the frameset-ok flag to "not ok"."
            "hr" => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
                let _ = self.open_elements.pop();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and reprocess
            // it. (Don't ask.)"
            "image" => {
                self.parse_error(ParseErrorCode::UnexpectedStartTag);
                let img = Token::StartTag {
                    name: "img".to_string(),
                    self_closing: token.is_self_closing(),
                    attributes: token.attributes().to_vec(),
                };
                self.reprocess(&img);
            }

            // "A start tag whose tag name is "textarea""
            "textarea" => {
                // "1. Insert an HTML element for the token."
                // "2. If the next token is a U+000A LINE FEED (LF) character
                // token, then ignore that token and move on to the next one."
                // "3. Switch the tokenizer to the RCDATA state."
                // "4. Set the original insertion mode to the current insertion mode."
                // "5. Set the frameset-ok flag to "not ok"."
                // "6. Switch the insertion mode to "text"."
                self.parse_text_only_element(token, TokenizerState::RCDATA);
                self.skip_next_newline = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "xmp""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Reconstruct the active formatting elements, if any."
            // "Set the frameset-ok flag to "not ok"."
            // "Follow the generic raw text element parsing algorithm."
            "xmp" => {
                self.close_p_element_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.parse_text_only_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "iframe""
            // "Set the frameset-ok flag to "not ok"."
            // "Follow the generic raw text element parsing algorithm."
            "iframe" => {
                self.frameset_ok = false;
                self.parse_text_only_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "noembed""
            // "A start tag whose tag name is "noscript", if the scripting flag
            // is enabled"
            // "Follow the generic raw text element parsing algorithm."
            "noembed" => self.parse_text_only_element(token, TokenizerState::RAWTEXT),
            "noscript" if self.options.scripting_enabled => {
                self.parse_text_only_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "select""
            "select" => {
                // "Reconstruct the active formatting elements, if any."
                // "Insert an HTML element for the token."
                // "Set the frameset-ok flag to "not ok"."
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                // "If the insertion mode is one of "in table", "in caption",
                // "in table body", "in row", or "in cell", then switch the
                // insertion mode to "in select in table". Otherwise, switch the
                // insertion mode to "in select"."
                let in_table = matches!(
                    self.insertion_mode,
                    InsertionMode::InTable
                        | InsertionMode::InCaption
                        | InsertionMode::InTableBody
                        | InsertionMode::InRow
                        | InsertionMode::InCell
                );
                self.switch_to(if in_table {
                    InsertionMode::InSelectInTable
                } else {
                    InsertionMode::InSelect
                });
            }

            // "A start tag whose tag name is one of: "optgroup", "option""
            // "If the current node is an option element, then pop the current
            // node off the stack of open elements."
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token."
            "optgroup" | "option" => {
                if self.open_elements.current_is("option") {
                    let _ = self.open_elements.pop();
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "rb", "rtc""
            // "If the stack of open elements has a ruby element in scope, then
            // generate implied end tags. If the current node is not now a ruby
            // element, this is a parse error."
            // "Insert an HTML element for the token."
            "rb" | "rtc" => {
                if self.open_elements.has_in_scope("ruby") {
                    self.open_elements.generate_implied_end_tags(None);
                    if !self.open_elements.current_is("ruby") {
                        self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    }
                }
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "rp", "rt""
            // "If the stack of open elements has a ruby element in scope, then
            // generate implied end tags, except for rtc elements. If the
            // current node is not now a rtc element or a ruby element, this is
            // a parse error."
            // "Insert an HTML element for the token."
            "rp" | "rt" => {
                if self.open_elements.has_in_scope("ruby") {
                    self.open_elements.generate_implied_end_tags(Some("rtc"));
                    if !self.open_elements.current_is_one_of(&["rtc", "ruby"]) {
                        self.parse_error(ParseErrorCode::UnexpectedStartTag);
                    }
                }
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is "math""
            // "Reconstruct the active formatting elements, if any."
            // "Adjust MathML attributes for the token. (This fixes the case of
            // MathML attributes that are not all lowercase.)"
            // "Adjust foreign attributes for the token. (This fixes the use of
            // namespaced attributes, in particular XLink.)"
            // "Insert a foreign element for the token, with MathML namespace."
            // "If the token has its self-closing flag set, pop the current node
            // off the stack of open elements and acknowledge the token's
            // self-closing flag."
            "math" => {
                self.reconstruct_active_formatting_elements();
                let mut attributes = token.attributes().to_vec();
                adjust_mathml_attributes(&mut attributes);
                adjust_foreign_attributes(&mut attributes);
                let _ = self.insert_foreign_element(token, name, Namespace::MathMl, attributes);
                if token.is_self_closing() {
                    let _ = self.open_elements.pop();
                }
            }

            // "A start tag whose tag name is "svg""
            // (as "math", with SVG attribute adjustment and the SVG namespace)
            "svg" => {
                self.reconstruct_active_formatting_elements();
                let mut attributes = token.attributes().to_vec();
                adjust_svg_attributes(&mut attributes);
                adjust_foreign_attributes(&mut attributes);
                let _ = self.insert_foreign_element(token, name, Namespace::Svg, attributes);
                if token.is_self_closing() {
                    let _ = self.open_elements.pop();
                }
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "frame", "head", "tbody", "td", "tfoot", "th",
            // "thead", "tr""
            // "Parse error. Ignore the token."
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr" => {
                self.parse_error(ParseErrorCode::UnexpectedStartTag);
            }

            // "Any other start tag"
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token."
            _ => {
                self.check_self_closing(token);
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
            }
        }
    }

    /// The "li" and "dd"/"dt" start tag steps.
    fn handle_list_item_start_tag(&mut self, name: &str, token: &Token) {
        // "1. Set the frameset-ok flag to "not ok"."
        self.frameset_ok = false;
        let closes: &[&str] = if name == "li" { &["li"] } else { &["dd", "dt"] };

        // "2. Initialize node to be the current node (the bottommost node of
        // the stack)."
        // "3. Loop: If node is an li element, then run these substeps:
        //    1. Generate implied end tags, except for li elements.
        //    2. If the current node is not an li element, then this is a parse
        //       error.
        //    3. Pop elements from the stack of open elements until an li
        //       element has been popped from the stack.
        //    4. Jump to the step labeled done below."
        // "4. If node is in the special category, but is not an address, div,
        // or p element, then jump to the step labeled done below."
        // "5. Otherwise, set node to the previous entry in the stack of open
        // elements and return to the step labeled loop."
        let mut found = None;
        for entry in self.open_elements.iter().rev() {
            if entry.is_html_one_of(closes) {
                found = Some(entry.tag_name.clone());
                break;
            }
            if entry.is_special() && !entry.is_html_one_of(&["address", "div", "p"]) {
                break;
            }
        }
        if let Some(tag_name) = found {
            self.open_elements.generate_implied_end_tags(Some(&tag_name));
            if !self.open_elements.current_is(&tag_name) {
                self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
            }
            self.open_elements.pop_until_tag_popped(&tag_name);
        }

        // "6. Done: If the stack of open elements has a p element in button
        // scope, then close a p element."
        // "7. Finally, insert an HTML element for the token."
        self.close_p_element_in_button_scope();
        let _ = self.insert_html_element(token);
    }

    fn insert_formatting_element(&mut self, token: &Token) {
        let element = self.insert_html_element(token);
        self.active_formatting_elements.push_element(element, token.clone());
    }

    /// "Reconstruct the active formatting elements, if any. Insert an HTML
    /// element for the token. Immediately pop the current node off the stack
    /// of open elements. Acknowledge the token's self-closing flag, if it is
    /// set. Set the frameset-ok flag to "not ok"."
    fn insert_void_element(&mut self, token: &Token, clear_frameset_ok: bool) {
        self.reconstruct_active_formatting_elements();
        let _ = self.insert_html_element(token);
        let _ = self.open_elements.pop();
        if clear_frameset_ok {
            self.frameset_ok = false;
        }
    }

    fn handle_in_body_end_tag(&mut self, name: &str, token: &Token) {
        match name {
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion mode."
            "template" => self.process_using_rules_for(InsertionMode::InHead, token),

            // "An end tag whose tag name is "body""
            // "An end tag whose tag name is "html""
            "body" | "html" => {
                // "If the stack of open elements does not have a body element
                // in scope, this is a parse error; ignore the token."
                if !self.open_elements.has_in_scope("body") {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "Otherwise, if there is a node in the stack of open elements
                // that is not either a dd element, ... then this is a parse
                // error."
                self.check_open_elements_at_end(ParseErrorCode::ClosingOfElementWithOpenChildElements);
                // "Switch the insertion mode to "after body"."
                self.switch_to(InsertionMode::AfterBody);
                // ("html" only) "Reprocess the token."
                if name == "html" {
                    self.reprocess(token);
                }
            }

            _ if BLOCK_END_TAGS.contains(&name) => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element with the same tag name as that
                // of the token, then this is a parse error; ignore the token."
                if !self.open_elements.has_in_scope(name) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "1. Generate implied end tags."
                // "2. If the current node is not an HTML element with the same
                // tag name as that of the token, then this is a parse error."
                // "3. Pop elements from the stack of open elements until an
                // HTML element with the same tag name as the token has been
                // popped from the stack."
                self.generate_implied_end_tags_and_pop(name, None);
            }

            // "An end tag whose tag name is "form""
            "form" => self.handle_form_end_tag(),

            // "An end tag whose tag name is "p""
            // "If the stack of open elements does not have a p element in
            // button scope, then this is a parse error; insert an HTML element
            // for a "p" start tag token with no attributes."
            // "Close a p element."
            "p" => {
                if !self.open_elements.has_in_button_scope("p") {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    let _ = self.insert_synthetic_html_element("p");
                }
                self.close_p_element();
            }

            // "An end tag whose tag name is "li""
            // "If the stack of open elements does not have an li element in
            // list item scope, then this is a parse error; ignore the token."
            // "Otherwise: 1. Generate implied end tags, except for li elements.
            // 2. If the current node is not an li element, then this is a
            // parse error. 3. Pop elements from the stack of open elements
            // until an li element has been popped from the stack."
            "li" => {
                if !self.open_elements.has_in_list_item_scope("li") {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                self.generate_implied_end_tags_and_pop("li", Some("li"));
            }

            // "An end tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => {
                if !self.open_elements.has_in_scope(name) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                self.generate_implied_end_tags_and_pop(name, Some(name));
            }

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            _ if NUMBERED_HEADERS.contains(&name) => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element and whose tag name is one of
                // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                // error; ignore the token."
                if !self.open_elements.has_numbered_header_in_scope() {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "1. Generate implied end tags."
                // "2. If the current node is not an HTML element with the same
                // tag name as that of the token, then this is a parse error."
                // "3. Pop elements from the stack of open elements until an
                // HTML element whose tag name is one of "h1", "h2", "h3", "h4",
                // "h5", or "h6" has been popped from the stack."
                self.open_elements.generate_implied_end_tags(None);
                if !self.open_elements.current_is(name) {
                    self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
                }
                self.open_elements.pop_until_numbered_header_popped();
            }

            // "An end tag whose tag name is one of: "a", "b", "big", "code",
            // "em", "font", "i", "nobr", "s", "small", "strike", "strong",
            // "tt", "u""
            // "Run the adoption agency algorithm for the token."
            _ if FORMATTING_END_TAGS.contains(&name) => {
                if self.run_adoption_agency(name) {
                    self.any_other_end_tag(name);
                }
            }

            // "An end tag token whose tag name is one of: "applet", "marquee",
            // "object""
            "applet" | "marquee" | "object" => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element with the same tag name as that
                // of the token, then this is a parse error; ignore the token."
                if !self.open_elements.has_in_scope(name) {
                    self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                    return;
                }
                // "1. Generate implied end tags."
                // "2. If the current node is not an HTML element with the same
                // tag name as that of the token, then this is a parse error."
                // "3. Pop elements from the stack of open elements until an
                // HTML element with the same tag name as the token has been
                // popped from the stack."
                // "4. Clear the list of active formatting elements up to the
                // last marker."
                self.generate_implied_end_tags_and_pop(name, None);
                self.active_formatting_elements.clear_to_last_marker();
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br"
            // start tag token with no attributes, rather than the end tag
            // token that it actually is."
            "br" => {
                self.parse_error(ParseErrorCode::UnexpectedEndTag);
                self.insert_void_element(&Token::synthetic_start_tag("br"), true);
            }

            _ => self.any_other_end_tag(name),
        }
    }

    /// Generate implied end tags (optionally excluding one), report a parse
    /// error if the current node is not `name`, then pop until `name` has been
    /// popped.
    pub(crate) fn generate_implied_end_tags_and_pop(&mut self, name: &str, exclude: Option<&str>) {
        self.open_elements.generate_implied_end_tags(exclude);
        if !self.open_elements.current_is(name) {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        self.open_elements.pop_until_tag_popped(name);
    }

    /// "An end tag whose tag name is "form""
    fn handle_form_end_tag(&mut self) {
        // "If there is no template element on the stack of open elements, then
        // run these substeps:"
        if !self.open_elements.contains_tag("template") {
            // "1. Let node be the element that the form element pointer is set to, or null."
            // "2. Set the form element pointer to null."
            // "3. If node is null or if the stack of open elements does not
            // have node in scope, then this is a parse error; return and
            // ignore the token."
            let node = self.form_element_pointer.take();
            let Some(node) = node.filter(|node| self.open_elements.has_element_in_scope(node)) else {
                self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
                return;
            };
            // "4. Generate implied end tags."
            // "5. If the current node is not node, then this is a parse error."
            // "6. Remove node from the stack of open elements."
            self.open_elements.generate_implied_end_tags(None);
            if self.open_elements.current_handle() != Some(&node) {
                self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
            }
            let _ = self.open_elements.remove(&node);
            return;
        }

        // "If there is a template element on the stack of open elements, then
        // run these substeps instead:"
        // "1. If the stack of open elements does not have a form element in
        // scope, then this is a parse error; return and ignore the token."
        if !self.open_elements.has_in_scope("form") {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return;
        }
        // "2. Generate implied end tags."
        // "3. If the current node is not a form element, then this is a parse error."
        // "4. Pop elements from the stack of open elements until a form
        // element has been popped from the stack."
        self.generate_implied_end_tags_and_pop("form", None);
    }

    /// "Any other end tag"
    pub(crate) fn any_other_end_tag(&mut self, name: &str) {
        // "1. Initialize node to be the current node (the bottommost node of
        // the stack)."
        // "2. Loop: If node is an HTML element with the same tag name as the
        // token, then:
        //    1. Generate implied end tags, except for HTML elements with the
        //       same tag name as the token.
        //    2. If node is not the current node, then this is a parse error.
        //    3. Pop all the nodes from the current node up to node, including
        //       node, then stop these steps."
        // "3. Otherwise, if node is in the special category, then this is a
        // parse error; ignore the token, and return."
        // "4. Set node to the previous entry in the stack of open elements."
        // "5. Return to the step labeled loop."
        let mut target = None;
        for entry in self.open_elements.iter().rev() {
            if entry.is_html(name) {
                target = Some(entry.handle.clone());
                break;
            }
            if entry.is_special() {
                break;
            }
        }
        let Some(node) = target else {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
            return;
        };
        self.open_elements.generate_implied_end_tags(Some(name));
        if self.open_elements.current_handle() != Some(&node) {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        self.open_elements.pop_until_handle(&node);
    }
}
