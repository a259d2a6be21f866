use std::collections::HashMap;
use std::mem;

use strum_macros::Display;

use weft_common::warning::warn_once;
use weft_dom::{Attribute, Namespace};

use super::formatting_elements::{ActiveFormattingList, FormattingEntry};
use super::open_elements::{OpenElement, OpenElements};
use crate::options::ParserOptions;
use crate::parse_error::{ParseErrorCode, ParseIssue};
use crate::tokenizer::{HTMLTokenizer, SourceLocation, Token, TokenizerState};
use crate::tree_sink::{NodeKind, TreeSink};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// What one call to [`HTMLParser::step`] achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserStep<H> {
    /// A token was processed; call again.
    Continue,
    /// The buffered input is used up and the last chunk has not been written.
    NeedMoreInput,
    /// A `</script>` end tag closed this script element. The caller may run
    /// it (and write more markup at the cursor) before stepping again.
    Script(H),
    /// The end-of-file token has been processed.
    Finished,
}

/// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
///
/// An insertion location: inside `parent`, either before `before` or after
/// its last child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionLocation<H> {
    /// The node to insert into.
    pub parent: H,
    /// Insert before this child instead of appending.
    pub before: Option<H>,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// The HTML parser. Owns the tokenizer and drives it token by token, building
/// the tree through a [`TreeSink`].
///
/// Input can arrive in chunks ([`write`](Self::write)); [`step`](Self::step)
/// processes one token at a time, so a caller can stop between any two tokens
/// and resume later without losing state.
#[allow(clippy::struct_excessive_bools)]
pub struct HTMLParser<S: TreeSink> {
    pub(super) sink: S,
    /// The Document node.
    pub(super) document: S::Handle,
    pub(super) tokenizer: HTMLTokenizer,
    pub(super) options: ParserOptions,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    ///
    /// "When the insertion mode is switched to "text" or "in table text", the
    /// original insertion mode is also set. This is the insertion mode to
    /// which the tree construction stage will return."
    pub(super) original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stack-of-template-insertion-modes)
    pub(super) template_insertion_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    pub(super) open_elements: OpenElements<S::Handle>,

    /// [§ 13.2.4.4 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    pub(super) active_formatting_elements: ActiveFormattingList<S::Handle>,

    /// [§ 13.2.4.5 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#head-element-pointer)
    pub(super) head_element_pointer: Option<S::Handle>,

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#form-element-pointer)
    ///
    /// "The form element pointer points to the last form element that was
    /// opened and whose end tag has not yet been seen."
    pub(super) form_element_pointer: Option<S::Handle>,

    /// [§ 13.2.4.6 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    pub(super) frameset_ok: bool,

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_parenting: bool,

    /// [§ 13.2.6.4.10](https://html.spec.whatwg.org/multipage/parsing.html#concept-pending-table-char-tokens)
    /// "pending table character tokens", kept as one string.
    pub(super) pending_table_text: String,
    /// Whether `pending_table_text` holds anything but whitespace.
    pub(super) pending_table_text_is_dirty: bool,

    /// Drop a leading U+000A from the next token (after `<pre>`, `<listing>`
    /// and `<textarea>`).
    pub(super) skip_next_newline: bool,

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#concept-frag-parse-context)
    /// The context element of the fragment parsing algorithm.
    pub(super) context_element: Option<OpenElement<S::Handle>>,
    /// The synthetic `html` root of a fragment parse.
    pub(super) fragment_root: Option<S::Handle>,

    pub(super) stopped: bool,
    pub(super) pending_script: Option<S::Handle>,
    pub(super) issues: Vec<ParseIssue>,

    /// The token being processed and where it came from, when locations are tracked.
    pub(super) current_source: Option<(Token, SourceLocation)>,
    pub(super) locations: HashMap<S::Handle, SourceLocation>,
}

impl<S: TreeSink> HTMLParser<S> {
    /// A parser for a whole document.
    ///
    /// [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode):
    /// parsing starts in the "initial" insertion mode with empty stacks.
    #[must_use]
    pub fn new(mut sink: S, options: ParserOptions) -> Self {
        let document = sink.create_document();
        let mut tokenizer = HTMLTokenizer::streaming();
        tokenizer.set_track_locations(options.source_locations);
        Self {
            sink,
            document,
            tokenizer,
            options,
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            template_insertion_modes: Vec::new(),
            open_elements: OpenElements::new(),
            active_formatting_elements: ActiveFormattingList::new(),
            head_element_pointer: None,
            form_element_pointer: None,
            frameset_ok: true,
            foster_parenting: false,
            pending_table_text: String::new(),
            pending_table_text_is_dirty: false,
            skip_next_newline: false,
            context_element: None,
            fragment_root: None,
            stopped: false,
            pending_script: None,
            issues: Vec::new(),
            current_source: None,
            locations: HashMap::new(),
        }
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// A parser for the fragment parsing algorithm. `context` is an element
    /// already created in `sink`; without one a `template` element is used.
    #[must_use]
    pub fn new_fragment(sink: S, context: Option<S::Handle>, options: ParserOptions) -> Self {
        let mut parser = Self::new(sink, options);
        let context =
            context.unwrap_or_else(|| parser.sink.create_element("template", Namespace::Html, Vec::new()));
        let context_element = parser.describe_element(&context);

        // "Set the state of the HTML parser's tokenization stage as follows,
        // switching on the context element:"
        if context_element.namespace == Namespace::Html {
            let state = match context_element.tag_name.as_str() {
                "title" | "textarea" => Some(TokenizerState::RCDATA),
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(TokenizerState::RAWTEXT),
                "script" => Some(TokenizerState::ScriptData),
                "noscript" if options.scripting_enabled => Some(TokenizerState::RAWTEXT),
                "plaintext" => Some(TokenizerState::PLAINTEXT),
                _ => None,
            };
            if let Some(state) = state {
                parser.tokenizer.set_state(state);
            }
        }

        // "Let root be the result of creating an element given document, "html",
        // and the HTML namespace."
        // "Append root to document."
        // "Set up the parser's stack of open elements so that it contains just
        // the single element root."
        let root = parser.sink.create_element("html", Namespace::Html, Vec::new());
        parser.sink.append_child(&parser.document, &root);
        let root_entry = parser.describe_element(&root);
        parser.open_elements.push(root_entry);

        // "If context is a template element, then push "in template" onto the
        // stack of template insertion modes so that it is the new current
        // template insertion mode."
        if context_element.is_html("template") {
            parser.template_insertion_modes.push(InsertionMode::InTemplate);
        }

        // "Set the HTML parser's form element pointer to the nearest node to
        // context that is a form element (going straight up the ancestor
        // chain, and including the element itself), if there is such an
        // element."
        let mut node = Some(context);
        while let Some(current) = node {
            if parser.sink.tag_name(&current) == Some("form") && parser.sink.namespace(&current) == Some(Namespace::Html) {
                parser.form_element_pointer = Some(current);
                break;
            }
            node = parser.sink.parent(&current);
        }

        parser.fragment_root = Some(root);
        parser.context_element = Some(context_element);
        // "Reset the parser's insertion mode appropriately."
        parser.reset_insertion_mode_appropriately();
        parser
    }

    // =========================================================================
    // Input and driving
    // =========================================================================

    /// Append a chunk of markup.
    pub fn write(&mut self, chunk: &str) {
        self.tokenizer.write(chunk);
    }

    /// Append UTF-16 code units.
    pub fn write_utf16(&mut self, units: &[u16]) {
        self.tokenizer.write_utf16(units);
    }

    /// [§ 8.4.3 document.write()](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#document-write-steps)
    ///
    /// "Insert input into the input stream just before the insertion point."
    pub fn insert_at_cursor(&mut self, markup: &str) {
        self.tokenizer.insert_at_cursor(markup);
    }

    /// Mark the end of the input.
    pub fn end(&mut self) {
        self.tokenizer.end();
    }

    /// Process one token.
    pub fn step(&mut self) -> ParserStep<S::Handle> {
        if self.stopped {
            return ParserStep::Finished;
        }
        let next = self.tokenizer.next_token();
        let tokenizer_issues = self.tokenizer.take_issues();
        if self.options.record_issues {
            self.issues.extend(tokenizer_issues);
        }
        let Some(token) = next else {
            return ParserStep::NeedMoreInput;
        };

        // [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
        // "If the next token is a U+000A LINE FEED (LF) character token, then
        // ignore that token and move on to the next one."
        let token = match token {
            Token::Whitespace { data } if mem::take(&mut self.skip_next_newline) => {
                match data.strip_prefix('\n') {
                    Some("") => return ParserStep::Continue,
                    Some(rest) => Token::Whitespace { data: rest.to_string() },
                    None => Token::Whitespace { data },
                }
            }
            other => {
                self.skip_next_newline = false;
                other
            }
        };

        self.current_source = self
            .tokenizer
            .last_token_location()
            .map(|location| (token.clone(), location));
        self.process_token(&token);
        self.current_source = None;

        // [§ 13.2.5.42](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
        // CDATA sections are only recognised while the adjusted current node
        // is a foreign element.
        let foreign = self
            .adjusted_current_node()
            .is_some_and(|node| node.namespace != Namespace::Html);
        self.tokenizer.set_allow_cdata(foreign);

        if token.is_eof() {
            self.stop_parsing();
        }
        if let Some(script) = self.pending_script.take() {
            return ParserStep::Script(script);
        }
        if self.stopped {
            ParserStep::Finished
        } else {
            ParserStep::Continue
        }
    }

    /// Step until something other than [`ParserStep::Continue`] happens.
    pub fn run(&mut self) -> ParserStep<S::Handle> {
        loop {
            match self.step() {
                ParserStep::Continue => {}
                other => return other,
            }
        }
    }

    /// Hand back the sink and the parse result: the Document node, or for a
    /// fragment parse a new `DocumentFragment` holding the children of the
    /// synthetic root.
    #[must_use]
    pub fn finish(self) -> (S, S::Handle) {
        let Self {
            mut sink,
            document,
            fragment_root,
            ..
        } = self;
        match fragment_root {
            Some(root) => {
                // "Return root's children, in tree order."
                let fragment = sink.create_document_fragment();
                sink.move_children(&root, &fragment);
                sink.detach_node(&root);
                (sink, fragment)
            }
            None => (sink, document),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The tree being built.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// The Document node.
    #[must_use]
    pub const fn document(&self) -> &S::Handle {
        &self.document
    }

    /// The current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// The stack of open elements.
    #[must_use]
    pub const fn open_elements(&self) -> &OpenElements<S::Handle> {
        &self.open_elements
    }

    /// The list of active formatting elements.
    #[must_use]
    pub const fn active_formatting_elements(&self) -> &ActiveFormattingList<S::Handle> {
        &self.active_formatting_elements
    }

    /// Whether the end-of-file token has been processed.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Parse errors recorded so far (tokenizer and tree construction).
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Drain the recorded parse errors.
    pub fn take_issues(&mut self) -> Vec<ParseIssue> {
        mem::take(&mut self.issues)
    }

    /// Where the start tag that created `element` was, if locations are tracked.
    #[must_use]
    pub fn element_location(&self, element: &S::Handle) -> Option<SourceLocation> {
        self.locations.get(element).copied()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// "As each token is emitted from the tokenizer, the user agent must follow
    /// the appropriate steps from the following list, known as the tree
    /// construction dispatcher"
    fn process_token(&mut self, token: &Token) {
        if self.use_html_rules(token) {
            self.reprocess(token);
        } else {
            self.process_using_foreign_content_rules(token);
        }
    }

    /// The first branch of the dispatcher: "Process the token according to the
    /// rules given in the section corresponding to the current insertion mode
    /// in HTML content."
    fn use_html_rules(&self, token: &Token) -> bool {
        // "If the stack of open elements is empty"
        let Some(node) = self.adjusted_current_node() else {
            return true;
        };
        // "If the adjusted current node is an element in the HTML namespace"
        if node.namespace == Namespace::Html {
            return true;
        }
        match token {
            // "If the token is an end-of-file token"
            Token::EndOfFile => true,
            Token::StartTag { name, .. } => {
                // "If the adjusted current node is a MathML text integration
                // point and the token is a start tag whose tag name is neither
                // "mglyph" nor "malignmark""
                (node.is_mathml_text_integration_point() && name != "mglyph" && name != "malignmark")
                    // "If the adjusted current node is a MathML annotation-xml
                    // element and the token is a start tag whose tag name is "svg""
                    || (node.namespace == Namespace::MathMl && node.tag_name == "annotation-xml" && name == "svg")
                    // "If the adjusted current node is an HTML integration point
                    // and the token is a start tag"
                    || node.html_integration_point
            }
            // "...and the token is a character token"
            Token::Character { .. } | Token::Whitespace { .. } | Token::NullCharacter { .. } => {
                node.is_mathml_text_integration_point() || node.html_integration_point
            }
            _ => false,
        }
    }

    /// "Reprocess the token" in the current insertion mode.
    pub(crate) fn reprocess(&mut self, token: &Token) {
        self.process_using_rules_for(self.insertion_mode, token);
    }

    /// Switch the insertion mode.
    pub(crate) fn switch_to(&mut self, mode: InsertionMode) {
        log::trace!(target: "weft_html::tree_builder", "{} -> {mode}", self.insertion_mode);
        self.insertion_mode = mode;
    }

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    pub(crate) fn parse_error(&mut self, code: ParseErrorCode) {
        let offset = self.tokenizer.position();
        log::debug!(
            target: "weft_html::tree_builder",
            "{code} in {} at offset {offset}",
            self.insertion_mode
        );
        warn_once("HTML Parser", code.into());
        if self.options.record_issues {
            self.issues.push(ParseIssue { code, offset });
        }
    }

    /// [§ 13.2.7 The end](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// "Pop all the nodes off the stack of open elements."
    pub(crate) fn stop_parsing(&mut self) {
        self.open_elements.truncate(0);
        self.stopped = true;
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open elements."
    /// Falls back to the Document before `html` exists.
    pub(crate) fn current_node_handle(&self) -> S::Handle {
        self.open_elements
            .current_handle()
            .cloned()
            .unwrap_or_else(|| self.document.clone())
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#adjusted-current-node)
    ///
    /// "The adjusted current node is the context element if the parser was
    /// created as part of the HTML fragment parsing algorithm and the stack of
    /// open elements has only one element in it (fragment case); otherwise,
    /// the adjusted current node is the current node."
    pub(crate) fn adjusted_current_node(&self) -> Option<&OpenElement<S::Handle>> {
        match &self.context_element {
            Some(context) if self.open_elements.len() == 1 => Some(context),
            _ => self.open_elements.current(),
        }
    }

    /// A stack entry for an element already in the sink.
    pub(crate) fn describe_element(&self, handle: &S::Handle) -> OpenElement<S::Handle> {
        let (tag_name, namespace, attributes) = match self.sink.node_kind(handle) {
            NodeKind::Element {
                tag_name,
                namespace,
                attributes,
            } => (tag_name, namespace, attributes),
            _ => ("", Namespace::Html, &[][..]),
        };
        // [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
        let html_integration_point = match namespace {
            // "A MathML annotation-xml element whose start tag token had an
            // attribute with the name "encoding" whose value was an ASCII
            // case-insensitive match for the string "text/html"" or
            // "application/xhtml+xml"
            Namespace::MathMl => {
                tag_name == "annotation-xml"
                    && attributes.iter().any(|attr| {
                        attr.name == "encoding"
                            && (attr.value.eq_ignore_ascii_case("text/html")
                                || attr.value.eq_ignore_ascii_case("application/xhtml+xml"))
                    })
            }
            // "An SVG foreignObject element", "An SVG desc element",
            // "An SVG title element"
            Namespace::Svg => matches!(tag_name, "foreignObject" | "desc" | "title"),
            _ => false,
        };
        OpenElement {
            handle: handle.clone(),
            tag_name: tag_name.to_string(),
            namespace,
            html_integration_point,
        }
    }

    fn is_html_element_named(&self, handle: &S::Handle, names: &[&str]) -> bool {
        self.sink.namespace(handle) == Some(Namespace::Html)
            && self.sink.tag_name(handle).is_some_and(|tag| names.contains(&tag))
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "The appropriate place for inserting a node, optionally using a
    /// particular override target, is the position in an element returned by
    /// running the following steps:"
    pub(crate) fn appropriate_place_for_inserting(&self, override_target: Option<&S::Handle>) -> InsertionLocation<S::Handle> {
        // "1. If there was an override target specified, then let target be
        // the override target. Otherwise, let target be the current node."
        let target = override_target
            .cloned()
            .unwrap_or_else(|| self.current_node_handle());

        // "2. Determine the adjusted insertion location using the first
        // matching steps from the following list:"
        // "If foster parenting is enabled and target is a table, tbody, tfoot,
        // thead, or tr element"
        let location = if self.foster_parenting
            && self.is_html_element_named(&target, &["table", "tbody", "tfoot", "thead", "tr"])
        {
            self.foster_parenting_location()
        } else {
            // "Otherwise: Let adjusted insertion location be inside target,
            // after its last child (if any)."
            InsertionLocation {
                parent: target,
                before: None,
            }
        };

        // "3. If the adjusted insertion location is inside a template element,
        // let it instead be inside the template element's template contents,
        // after its last child (if any)."
        match self.sink.template_contents(&location.parent) {
            Some(contents) if location.before.is_none() => InsertionLocation {
                parent: contents,
                before: None,
            },
            _ => location,
        }
    }

    /// The foster parenting branch of the appropriate place algorithm.
    fn foster_parenting_location(&self) -> InsertionLocation<S::Handle> {
        let handle_at = |index: usize| {
            self.open_elements
                .get(index)
                .map_or_else(|| self.document.clone(), |entry| entry.handle.clone())
        };
        // "1. Let last template be the last template element in the stack of
        // open elements, if any."
        // "2. Let last table be the last table element in the stack of open
        // elements, if any."
        let last_template = self.open_elements.rposition_tag("template");
        let last_table = self.open_elements.rposition_tag("table");

        match (last_template, last_table) {
            // "3. If there is a last template and either there is no last
            // table, or there is one, but last template is lower (more recently
            // added) than last table in the stack of open elements, then: let
            // adjusted insertion location be inside last template's template
            // contents, after its last child (if any), and abort these steps."
            (Some(template), table) if table.is_none_or(|table| template > table) => InsertionLocation {
                parent: handle_at(template),
                before: None,
            },
            // "4. If there is no last table, then let adjusted insertion
            // location be inside the first element in the stack of open
            // elements (the html element), after its last child (if any), and
            // abort these steps. (fragment case)"
            (_, None) => InsertionLocation {
                parent: handle_at(0),
                before: None,
            },
            (_, Some(table)) => {
                let table_handle = handle_at(table);
                // "5. If last table has a parent node, then let adjusted
                // insertion location be inside last table's parent node,
                // immediately before last table, and abort these steps."
                match self.sink.parent(&table_handle) {
                    Some(parent) => InsertionLocation {
                        parent,
                        before: Some(table_handle),
                    },
                    // "6. Let previous element be the element immediately
                    // above last table in the stack of open elements."
                    // "7. Let adjusted insertion location be inside previous
                    // element, after its last child (if any)."
                    None => InsertionLocation {
                        parent: handle_at(table.saturating_sub(1)),
                        before: None,
                    },
                }
            }
        }
    }

    /// Put `node` at `location`.
    pub(crate) fn insert_node_at(&mut self, location: &InsertionLocation<S::Handle>, node: &S::Handle) {
        match &location.before {
            Some(reference) => self.sink.insert_before(&location.parent, node, reference),
            None => self.sink.append_child(&location.parent, node),
        }
    }

    /// The recorded source location for `token`, if it is the token being
    /// processed (synthesized tokens have none).
    fn location_for(&self, token: &Token) -> Option<SourceLocation> {
        self.current_source
            .as_ref()
            .filter(|(current, _)| current == token)
            .map(|(_, location)| *location)
    }

    /// [§ 13.2.6.1 Create an element for the token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    pub(crate) fn create_element_for_token(
        &mut self,
        token: &Token,
        tag_name: &str,
        namespace: Namespace,
        attributes: Vec<Attribute>,
    ) -> S::Handle {
        let element = self.sink.create_element(tag_name, namespace, attributes);
        if let Some(location) = self.location_for(token) {
            let _ = self.locations.insert(element.clone(), location);
        }
        element
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// "1. Let the adjusted insertion location be the appropriate place for
    /// inserting a node.
    /// 2. Let element be the result of creating an element for the token in
    /// the given namespace, with the intended parent being the element in
    /// which the adjusted insertion location finds itself.
    /// 3. ...insert element at the adjusted insertion location...
    /// 4. Push element onto the stack of open elements so that it is the new
    /// current node.
    /// 5. Return element."
    pub(crate) fn insert_foreign_element(
        &mut self,
        token: &Token,
        tag_name: &str,
        namespace: Namespace,
        attributes: Vec<Attribute>,
    ) -> S::Handle {
        let location = self.appropriate_place_for_inserting(None);
        let element = self.create_element_for_token(token, tag_name, namespace, attributes);
        self.insert_node_at(&location, &element);
        let entry = self.describe_element(&element);
        self.open_elements.push(entry);
        element
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "When the steps below require the user agent to insert an HTML element
    /// for a token, the user agent must insert a foreign element for the token,
    /// in the HTML namespace."
    pub(crate) fn insert_html_element(&mut self, token: &Token) -> S::Handle {
        let tag_name = token.tag_name().unwrap_or_default();
        self.insert_foreign_element(token, tag_name, Namespace::Html, token.attributes().to_vec())
    }

    /// Insert an HTML element for a start tag with no attributes, e.g. the
    /// implied `tbody` of a bare `<tr>`.
    pub(crate) fn insert_synthetic_html_element(&mut self, tag_name: &str) -> S::Handle {
        self.insert_html_element(&Token::synthetic_start_tag(tag_name))
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// Inserts a whole run of characters at once.
    pub(crate) fn insert_characters(&mut self, data: &str) {
        // "2. Let the adjusted insertion location be the appropriate place for
        // inserting a node."
        let location = self.appropriate_place_for_inserting(None);
        // "3. If the adjusted insertion location is inside a Document node,
        // then return."
        if matches!(self.sink.node_kind(&location.parent), NodeKind::Document) {
            return;
        }
        // "4. If there is a Text node immediately before the adjusted insertion
        // location, then append data to that Text node's data."
        // "5. Otherwise, create a new Text node..."
        match &location.before {
            Some(reference) => self.sink.insert_text_before(&location.parent, data, reference),
            None => self.sink.insert_text(&location.parent, data),
        }
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    pub(crate) fn insert_comment(&mut self, data: &str) {
        let location = self.appropriate_place_for_inserting(None);
        let comment = self.sink.create_comment(data);
        self.insert_node_at(&location, &comment);
    }

    /// "Insert a comment as the last child of" `parent` (the Document or the
    /// `html` element).
    pub(crate) fn append_comment_to(&mut self, parent: &S::Handle, data: &str) {
        let comment = self.sink.create_comment(data);
        self.sink.append_child(parent, &comment);
    }

    // =========================================================================
    // Shared algorithms
    // =========================================================================

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    ///
    /// "1. Insert an HTML element for the token.
    /// 2. If the algorithm that was invoked is the generic raw text element
    /// parsing algorithm, switch the tokenizer to the RAWTEXT state; otherwise
    /// the algorithm invoked was the generic RCDATA element parsing algorithm,
    /// switch the tokenizer to the RCDATA state.
    /// 3. Set the original insertion mode to the current insertion mode.
    /// 4. Then, switch the insertion mode to "text"."
    pub(crate) fn parse_text_only_element(&mut self, token: &Token, state: TokenizerState) {
        let _ = self.insert_html_element(token);
        self.tokenizer.set_state(state);
        self.original_insertion_mode = Some(self.insertion_mode);
        self.switch_to(InsertionMode::Text);
    }

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    pub(crate) fn reset_insertion_mode_appropriately(&mut self) {
        let mode = self.appropriate_insertion_mode();
        self.switch_to(mode);
    }

    fn appropriate_insertion_mode(&self) -> InsertionMode {
        // "1. Let last be false."
        // "2. Let node be the last node in the stack of open elements."
        for index in (0..self.open_elements.len()).rev() {
            let Some(mut node) = self.open_elements.get(index) else {
                continue;
            };
            // "3. Loop: If node is the first node in the stack of open
            // elements, then set last to true, and, if the parser was created
            // as part of the HTML fragment parsing algorithm (fragment case),
            // set node to the context element passed to that algorithm."
            let last = index == 0;
            if last && let Some(context) = &self.context_element {
                node = context;
            }
            if node.namespace != Namespace::Html {
                if last {
                    return InsertionMode::InBody;
                }
                continue;
            }
            match node.tag_name.as_str() {
                // "4. If node is a select element, run these substeps:"
                "select" => {
                    if !last {
                        for ancestor in (0..index).rev().filter_map(|i| self.open_elements.get(i)) {
                            // "If ancestor is a template node, jump to the step
                            // below labeled Done."
                            if ancestor.is_html("template") {
                                break;
                            }
                            // "If ancestor is a table node, switch the
                            // insertion mode to "in select in table" and return."
                            if ancestor.is_html("table") {
                                return InsertionMode::InSelectInTable;
                            }
                        }
                    }
                    // "Done: Switch the insertion mode to "in select" and return."
                    return InsertionMode::InSelect;
                }
                // "5. If node is a td or th element and last is false, then
                // switch the insertion mode to "in cell" and return."
                "td" | "th" if !last => return InsertionMode::InCell,
                "tr" => return InsertionMode::InRow,
                "tbody" | "thead" | "tfoot" => return InsertionMode::InTableBody,
                "caption" => return InsertionMode::InCaption,
                "colgroup" => return InsertionMode::InColumnGroup,
                "table" => return InsertionMode::InTable,
                // "12. If node is a template element, then switch the insertion
                // mode to the current template insertion mode and return."
                "template" => {
                    return self
                        .template_insertion_modes
                        .last()
                        .copied()
                        .unwrap_or(InsertionMode::InTemplate);
                }
                // "13. If node is a head element and last is false, then switch
                // the insertion mode to "in head" and return."
                "head" if !last => return InsertionMode::InHead,
                "body" => return InsertionMode::InBody,
                "frameset" => return InsertionMode::InFrameset,
                // "16. If node is an html element, run these substeps:"
                "html" => {
                    return if self.head_element_pointer.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                }
                _ => {}
            }
            // "17. If last is true, then switch the insertion mode to "in body"
            // and return. (fragment case)"
            if last {
                return InsertionMode::InBody;
            }
        }
        InsertionMode::InBody
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "Generate implied end tags, except for p elements. If the current node
    /// is not a p element, then this is a parse error. Pop elements from the
    /// stack of open elements until a p element has been popped from the
    /// stack."
    pub(crate) fn close_p_element(&mut self) {
        self.open_elements.generate_implied_end_tags(Some("p"));
        if !self.open_elements.current_is("p") {
            self.parse_error(ParseErrorCode::ClosingOfElementWithOpenChildElements);
        }
        self.open_elements.pop_until_tag_popped("p");
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    pub(crate) fn close_p_element_in_button_scope(&mut self) {
        if self.open_elements.has_in_button_scope("p") {
            self.close_p_element();
        }
    }

    /// [§ 13.2.4.4](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    ///
    /// "When the steps below require the UA to reconstruct the active
    /// formatting elements, the UA must perform the following steps:"
    pub(crate) fn reconstruct_active_formatting_elements(&mut self) {
        // "1. If there are no entries in the list of active formatting
        // elements, then there is nothing to reconstruct; stop this algorithm.
        // 2. If the last (most recently added) entry in the list of active
        // formatting elements is a marker, or if it is an element that is in
        // the stack of open elements, then there is nothing to reconstruct;
        // stop this algorithm."
        let is_settled = |list: &ActiveFormattingList<S::Handle>, open: &OpenElements<S::Handle>, index: usize| {
            match list.get(index) {
                Some(FormattingEntry::Element { handle, .. }) => open.contains(handle),
                _ => true,
            }
        };
        let len = self.active_formatting_elements.len();
        if len == 0 || is_settled(&self.active_formatting_elements, &self.open_elements, len - 1) {
            return;
        }

        // "3-6. Rewind: ... If entry is neither a marker nor an element that
        // is also in the stack of open elements, go to the step labeled
        // rewind."
        let mut index = len - 1;
        while index > 0 && !is_settled(&self.active_formatting_elements, &self.open_elements, index - 1) {
            index -= 1;
        }

        // "7-10. Create: Insert an HTML element for the token for which the
        // element entry was created, to obtain new element. Replace the entry
        // for entry in the list with an entry for new element. If the entry
        // for new element in the list of active formatting elements is not
        // the last entry in the list, return to the step labeled advance."
        for index in index..len {
            let Some(token) = self
                .active_formatting_elements
                .get(index)
                .and_then(FormattingEntry::token)
                .cloned()
            else {
                continue;
            };
            let element = self.insert_html_element(&token);
            self.active_formatting_elements.replace_at(index, element, token);
        }
    }

    /// Acknowledge a self-closing flag on a non-void element.
    pub(crate) fn check_self_closing(&mut self, token: &Token) {
        if token.is_self_closing() {
            self.parse_error(ParseErrorCode::NonVoidHtmlElementStartTagWithTrailingSolidus);
        }
    }
}

#[cfg(test)]
mod tests {
    use weft_dom::DomTree;

    use super::*;

    #[test]
    fn test_current_node_handle_falls_back_to_document() {
        let parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
        assert!(parser.open_elements().is_empty());
        assert_eq!(parser.current_node_handle(), *parser.document());
    }

    #[test]
    fn test_current_node_handle_is_bottommost_open_element() {
        let mut parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
        parser.write("<div><span>");
        while let ParserStep::Continue = parser.step() {}

        let current = parser.current_node_handle();
        let tag_name = parser.sink().as_element(current).map(|data| data.tag_name.as_str());
        assert_eq!(tag_name, Some("span"));
        assert_eq!(parser.open_elements().current_handle(), Some(&current));
    }
}
