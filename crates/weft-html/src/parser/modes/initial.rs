use weft_dom::{Namespace, QuirksMode};

use crate::parse_error::ParseErrorCode;
use crate::parser::core::{HTMLParser, InsertionMode};
use crate::parser::doctype::{is_conforming, quirks_mode_for};
use crate::tokenizer::Token;
use crate::tree_sink::TreeSink;

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(crate) fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Whitespace { .. } => {}

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                let document = self.document.clone();
                self.append_comment_to(&document, data);
            }

            // "A DOCTYPE token"
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                let (name, public_id, system_id) = (
                    name.as_deref(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                );
                if !is_conforming(name, public_id, system_id) {
                    self.parse_error(ParseErrorCode::NonConformingDoctype);
                }

                // "Append a DocumentType node to the Document node, with its
                // name set to the name given in the DOCTYPE token, or the empty
                // string if the name was missing; its public ID set to the
                // public identifier given in the DOCTYPE token, or the empty
                // string if the public identifier was missing; and its system
                // ID set to the system identifier given in the DOCTYPE token,
                // or the empty string if the system identifier was missing."
                let document = self.document.clone();
                self.sink.set_document_type(
                    &document,
                    name.unwrap_or_default(),
                    public_id.unwrap_or_default(),
                    system_id.unwrap_or_default(),
                );
                self.sink
                    .set_quirks_mode(quirks_mode_for(name, public_id, system_id, *force_quirks));

                // "Then, switch the insertion mode to "before html"."
                self.switch_to(InsertionMode::BeforeHtml);
            }

            // "Anything else"
            // "If the document is not an iframe srcdoc document, then this is
            // a parse error; if the parser cannot change the mode flag is
            // false, set the Document to quirks mode."
            // "In any case, switch the insertion mode to "before html", then
            // reprocess the token."
            _ => {
                self.parse_error(ParseErrorCode::MissingDoctype);
                self.sink.set_quirks_mode(QuirksMode::Quirks);
                self.switch_to(InsertionMode::BeforeHtml);
                self.reprocess(token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(crate) fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorCode::MisplacedDoctype),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                let document = self.document.clone();
                self.append_comment_to(&document, data);
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Whitespace { .. } => {}

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with the
            // Document as the intended parent. Append it to the Document
            // object. Put this element in the stack of open elements."
            // "Switch the insertion mode to "before head"."
            Token::StartTag { name, attributes, .. } if name == "html" => {
                let html = self.create_element_for_token(token, name, Namespace::Html, attributes.clone());
                self.append_root_element(&html);
                self.switch_to(InsertionMode::BeforeHead);
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. } if matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.handle_before_html_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { .. } => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            _ => self.handle_before_html_anything_else(token),
        }
    }

    /// "Anything else"
    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object. Put this element in the stack of open
    /// elements."
    /// "Switch the insertion mode to "before head", then reprocess the token."
    fn handle_before_html_anything_else(&mut self, token: &Token) {
        let html = self.sink.create_element("html", Namespace::Html, Vec::new());
        self.append_root_element(&html);
        self.switch_to(InsertionMode::BeforeHead);
        self.reprocess(token);
    }

    fn append_root_element(&mut self, html: &S::Handle) {
        let document = self.document.clone();
        self.sink.append_child(&document, html);
        let entry = self.describe_element(html);
        self.open_elements.push(entry);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(crate) fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "Ignore the token."
            Token::Whitespace { .. } => {}

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

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token."
            // "Set the head element pointer to the newly created head element."
            // "Switch the insertion mode to "in head"."
            Token::StartTag { name, .. } if name == "head" => {
                let head = self.insert_html_element(token);
                self.head_element_pointer = Some(head);
                self.switch_to(InsertionMode::InHead);
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. } if matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.handle_before_head_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { .. } => self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement),

            _ => self.handle_before_head_anything_else(token),
        }
    }

    /// "Anything else"
    /// "Insert an HTML element for a "head" start tag token with no attributes."
    /// "Set the head element pointer to the newly created head element."
    /// "Switch the insertion mode to "in head"."
    /// "Reprocess the current token."
    fn handle_before_head_anything_else(&mut self, token: &Token) {
        let head = self.insert_synthetic_html_element("head");
        self.head_element_pointer = Some(head);
        self.switch_to(InsertionMode::InHead);
        self.reprocess(token);
    }
}
