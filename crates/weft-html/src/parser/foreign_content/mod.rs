//! Foreign content: SVG and MathML inside HTML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

pub mod mathml;
pub mod svg;

pub use mathml::adjust_mathml_attributes;
pub use svg::{adjust_svg_attributes, adjust_svg_tag_name};

use weft_dom::Namespace;

use super::core::HTMLParser;
use crate::parse_error::ParseErrorCode;
use crate::tokenizer::{Attribute, Token};
use crate::tree_sink::TreeSink;

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// "When the steps below require the user agent to adjust foreign attributes
/// for a token, then, if any of the attributes on the token match the strings
/// in the first column of the following table, let the attribute be a
/// namespaced attribute, with the prefix being the string in the second
/// column, the local name being the string in the third column, and the
/// namespace being the namespace in the fourth column."
const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, Option<&str>, &str, Namespace)] = &[
    ("xlink:actuate", Some("xlink"), "actuate", Namespace::XLink),
    ("xlink:arcrole", Some("xlink"), "arcrole", Namespace::XLink),
    ("xlink:href", Some("xlink"), "href", Namespace::XLink),
    ("xlink:role", Some("xlink"), "role", Namespace::XLink),
    ("xlink:show", Some("xlink"), "show", Namespace::XLink),
    ("xlink:title", Some("xlink"), "title", Namespace::XLink),
    ("xlink:type", Some("xlink"), "type", Namespace::XLink),
    ("xml:lang", Some("xml"), "lang", Namespace::Xml),
    ("xml:space", Some("xml"), "space", Namespace::Xml),
    ("xmlns", None, "xmlns", Namespace::Xmlns),
    ("xmlns:xlink", Some("xmlns"), "xlink", Namespace::Xmlns),
];

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// Splits `xlink:href` and friends into prefix, local name and namespace.
pub fn adjust_foreign_attributes(attributes: &mut [Attribute]) {
    for attr in attributes {
        let adjustment = FOREIGN_ATTRIBUTE_ADJUSTMENTS
            .iter()
            .find(|(qualified, ..)| attr.name == *qualified);
        if let Some(&(_, prefix, local_name, namespace)) = adjustment {
            attr.prefix = prefix.map(str::to_string);
            attr.name = local_name.to_string();
            attr.namespace = Some(namespace);
        }
    }
}

/// "A start tag whose tag name is one of: "b", "big", "blockquote", "body",
/// "br", "center", "code", "dd", "div", "dl", "dt", "em", "embed", "h1", "h2",
/// "h3", "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing", "menu",
/// "meta", "nobr", "ol", "p", "pre", "ruby", "s", "small", "span", "strong",
/// "strike", "sub", "sup", "table", "tt", "u", "ul", "var""
const BREAKOUT_START_TAGS: &[&str] = &[
    "b", "big", "blockquote", "body", "br", "center", "code", "dd", "div", "dl", "dt", "em", "embed", "h1", "h2", "h3",
    "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing", "menu", "meta", "nobr", "ol", "p", "pre", "ruby", "s",
    "small", "span", "strong", "strike", "sub", "sup", "table", "tt", "u", "ul", "var",
];

/// Whether a token leaves foreign content and goes back to HTML rules.
fn is_breakout(token: &Token) -> bool {
    match token {
        Token::StartTag { name, .. } if name == "font" => ["color", "face", "size"]
            .iter()
            .any(|attribute| token.attribute(attribute).is_some()),
        Token::StartTag { name, .. } => BREAKOUT_START_TAGS.contains(&name.as_str()),
        Token::EndTag { name, .. } => name == "br" || name == "p",
        _ => false,
    }
}

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    pub(crate) fn process_using_foreign_content_rules(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Insert a U+FFFD REPLACEMENT CHARACTER character."
            Token::NullCharacter { data } => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                let replacement = "\u{FFFD}".repeat(data.chars().count());
                self.insert_characters(&replacement);
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            // "Insert the token's character."
            Token::Whitespace { data } => self.insert_characters(data),

            // "Any other character token"
            // "Insert the token's character."
            // "Set the frameset-ok flag to "not ok"."
            Token::Character { data } => {
                self.insert_characters(data);
                self.frameset_ok = false;
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error(ParseErrorCode::MisplacedDoctype),

            _ if is_breakout(token) => {
                // "Parse error."
                // "While the current node is not a MathML text integration
                // point, an HTML integration point, or an element in the HTML
                // namespace, pop elements from the stack of open elements."
                // "Reprocess the token according to the rules given in the
                // section corresponding to the current insertion mode in HTML
                // content."
                self.parse_error(ParseErrorCode::UnexpectedTokenInForeignContent);
                while let Some(current) = self.open_elements.current() {
                    if current.namespace == Namespace::Html
                        || current.html_integration_point
                        || current.is_mathml_text_integration_point()
                    {
                        break;
                    }
                    let _ = self.open_elements.pop();
                }
                self.reprocess(token);
            }

            // "Any other start tag"
            Token::StartTag { name, .. } => self.insert_foreign_start_tag(name, token),

            // "An end tag whose tag name is "script", if the current node is an
            // SVG script element"
            // "Pop the current node off the stack of open elements."
            Token::EndTag { name, .. }
                if name == "script"
                    && self
                        .open_elements
                        .current()
                        .is_some_and(|current| current.namespace == Namespace::Svg && current.tag_name == "script") =>
            {
                if let Some(script) = self.open_elements.pop()
                    && self.fragment_root.is_none()
                {
                    self.pending_script = Some(script.handle);
                }
            }

            // "Any other end tag"
            Token::EndTag { name, .. } => self.foreign_end_tag(name, token),

            // End-of-file is always dispatched to the HTML rules.
            Token::EndOfFile => self.reprocess(token),
        }
    }

    fn insert_foreign_start_tag(&mut self, name: &str, token: &Token) {
        let namespace = self
            .adjusted_current_node()
            .map_or(Namespace::Html, |node| node.namespace);
        let mut attributes = token.attributes().to_vec();
        let mut tag_name = name;
        match namespace {
            // "If the adjusted current node is an element in the MathML
            // namespace, adjust MathML attributes for the token."
            Namespace::MathMl => adjust_mathml_attributes(&mut attributes),
            // "If the adjusted current node is an element in the SVG namespace,
            // and the token's tag name is one of the ones in the first column
            // of the following table, change the tag name to the name given in
            // the corresponding cell in the second column."
            // "If the adjusted current node is an element in the SVG
            // namespace, adjust SVG attributes for the token."
            Namespace::Svg => {
                tag_name = adjust_svg_tag_name(name).unwrap_or(name);
                adjust_svg_attributes(&mut attributes);
            }
            _ => {}
        }
        // "Adjust foreign attributes for the token."
        adjust_foreign_attributes(&mut attributes);

        // "Insert a foreign element for the token, with adjusted current
        // node's namespace and false."
        let _ = self.insert_foreign_element(token, tag_name, namespace, attributes);

        // "If the token has its self-closing flag set, then run the
        // appropriate steps from the following list:"
        // "If the token's tag name is "script", and the new current node is in
        // the SVG namespace: Acknowledge the token's self-closing flag, and
        // then act as described in the steps for a "script" end tag below."
        // "Otherwise: Pop the current node off the stack of open elements and
        // acknowledge the token's self-closing flag."
        if token.is_self_closing() {
            let popped = self.open_elements.pop();
            if tag_name == "script"
                && namespace == Namespace::Svg
                && self.fragment_root.is_none()
                && let Some(script) = popped
            {
                self.pending_script = Some(script.handle);
            }
        }
    }

    /// "Any other end tag" in foreign content.
    fn foreign_end_tag(&mut self, name: &str, token: &Token) {
        // "1. Initialize node to be the current node (the bottommost node of
        // the stack)."
        // "2. If node's tag name, converted to ASCII lowercase, is not the same
        // as the tag name of the token, then this is a parse error."
        let Some(mut index) = self.open_elements.len().checked_sub(1) else {
            return;
        };
        if self
            .open_elements
            .get(index)
            .is_some_and(|node| !node.tag_name.eq_ignore_ascii_case(name))
        {
            self.parse_error(ParseErrorCode::EndTagWithoutMatchingOpenElement);
        }

        loop {
            // "3. Loop: If node is the topmost element in the stack of open
            // elements, then return. (fragment case)"
            if index == 0 {
                return;
            }
            let Some(node) = self.open_elements.get(index) else {
                return;
            };
            // "4. If node's tag name, converted to ASCII lowercase, is the same
            // as the tag name of the token, pop elements from the stack of open
            // elements until node has been popped from the stack, and then
            // return."
            if node.tag_name.eq_ignore_ascii_case(name) {
                let handle = node.handle.clone();
                self.open_elements.pop_until_handle(&handle);
                return;
            }
            // "5. Set node to the previous entry in the stack of open elements."
            index -= 1;
            // "6. If node is not an element in the HTML namespace, return to
            // the step labeled loop."
            // "7. Otherwise, process the token according to the rules given in
            // the section corresponding to the current insertion mode in HTML
            // content."
            if self
                .open_elements
                .get(index)
                .is_some_and(|node| node.namespace == Namespace::Html)
            {
                self.reprocess(token);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xlink_attributes_get_prefix_and_namespace() {
        let mut attributes = vec![
            Attribute::new("xlink:href", "#a"),
            Attribute::new("xmlns", "http://www.w3.org/2000/svg"),
            Attribute::new("href", "#b"),
        ];
        adjust_foreign_attributes(&mut attributes);

        assert_eq!(attributes[0].name, "href");
        assert_eq!(attributes[0].prefix.as_deref(), Some("xlink"));
        assert_eq!(attributes[0].namespace, Some(Namespace::XLink));
        assert_eq!(attributes[0].qualified_name(), "xlink:href");

        assert_eq!(attributes[1].name, "xmlns");
        assert_eq!(attributes[1].prefix, None);
        assert_eq!(attributes[1].namespace, Some(Namespace::Xmlns));

        assert_eq!(attributes[2].namespace, None);
    }

    #[test]
    fn test_font_only_breaks_out_with_presentational_attributes() {
        let plain = Token::synthetic_start_tag("font");
        assert!(!is_breakout(&plain));

        let colored = Token::StartTag {
            name: "font".to_string(),
            self_closing: false,
            attributes: vec![Attribute::new("color", "red")],
        };
        assert!(is_breakout(&colored));
        assert!(is_breakout(&Token::synthetic_start_tag("div")));
        assert!(!is_breakout(&Token::synthetic_start_tag("circle")));
    }
}
