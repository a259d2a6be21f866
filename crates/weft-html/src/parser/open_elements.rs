//! [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
//!
//! "Initially, the stack of open elements is empty. The stack grows downwards;
//! the topmost node on the stack is the first one added to the stack, and the
//! bottommost node of the stack is the most recently added node in the stack."
//!
//! Despite the name this is not a pure stack: the adoption agency algorithm
//! removes entries from the middle and inserts below arbitrary entries, so
//! entries live in a plain vector indexed from the top (index 0, the `html`
//! element) down to the current node.

use weft_dom::Namespace;

/// One entry: a node handle plus the facts about the element that scope
/// checks need, cached so that no tree access is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenElement<H> {
    /// The element in the sink's tree.
    pub handle: H,
    /// Local name.
    pub tag_name: String,
    /// Element namespace.
    pub namespace: Namespace,
    /// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
    /// Computed at creation because `annotation-xml` depends on its attributes.
    pub html_integration_point: bool,
}

impl<H> OpenElement<H> {
    /// Whether this is an HTML element named `tag_name`.
    #[must_use]
    pub fn is_html(&self, tag_name: &str) -> bool {
        self.namespace == Namespace::Html && self.tag_name == tag_name
    }

    /// Whether this is an HTML element whose name is in `tag_names`.
    #[must_use]
    pub fn is_html_one_of(&self, tag_names: &[&str]) -> bool {
        self.namespace == Namespace::Html && tag_names.contains(&self.tag_name.as_str())
    }

    /// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
    ///
    /// "A node is a MathML text integration point if it is one of the following
    /// elements: A MathML mi element, A MathML mo element, A MathML mn element,
    /// A MathML ms element, A MathML mtext element"
    #[must_use]
    pub fn is_mathml_text_integration_point(&self) -> bool {
        self.namespace == Namespace::MathMl && matches!(self.tag_name.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext")
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#special)
    /// Whether the element is in the "special" category.
    #[must_use]
    pub fn is_special(&self) -> bool {
        is_special(&self.tag_name, self.namespace)
    }
}

/// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules:"
#[must_use]
pub fn is_special(tag_name: &str, namespace: Namespace) -> bool {
    match namespace {
        Namespace::Html => matches!(
            tag_name,
            "address"
                | "applet"
                | "area"
                | "article"
                | "aside"
                | "base"
                | "basefont"
                | "bgsound"
                | "blockquote"
                | "body"
                | "br"
                | "button"
                | "caption"
                | "center"
                | "col"
                | "colgroup"
                | "dd"
                | "details"
                | "dir"
                | "div"
                | "dl"
                | "dt"
                | "embed"
                | "fieldset"
                | "figcaption"
                | "figure"
                | "footer"
                | "form"
                | "frame"
                | "frameset"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "head"
                | "header"
                | "hgroup"
                | "hr"
                | "html"
                | "iframe"
                | "img"
                | "input"
                | "keygen"
                | "li"
                | "link"
                | "listing"
                | "main"
                | "marquee"
                | "menu"
                | "meta"
                | "nav"
                | "noembed"
                | "noframes"
                | "noscript"
                | "object"
                | "ol"
                | "p"
                | "param"
                | "plaintext"
                | "pre"
                | "script"
                | "search"
                | "section"
                | "select"
                | "source"
                | "style"
                | "summary"
                | "table"
                | "tbody"
                | "td"
                | "template"
                | "textarea"
                | "tfoot"
                | "th"
                | "thead"
                | "title"
                | "tr"
                | "track"
                | "ul"
                | "wbr"
                | "xmp"
        ),
        Namespace::MathMl => matches!(tag_name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"),
        Namespace::Svg => matches!(tag_name, "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// "The stack of open elements is said to have a particular element in scope
/// when it has that element in the specific scope consisting of the following
/// element types: applet, caption, html, table, td, th, marquee, object,
/// template, MathML mi, MathML mo, MathML mn, MathML ms, MathML mtext, MathML
/// annotation-xml, SVG foreignObject, SVG desc, SVG title"
fn is_default_scope_boundary<H>(entry: &OpenElement<H>) -> bool {
    match entry.namespace {
        Namespace::Html => matches!(
            entry.tag_name.as_str(),
            "applet" | "caption" | "html" | "table" | "td" | "th" | "marquee" | "object" | "template"
        ),
        Namespace::MathMl | Namespace::Svg => is_special(&entry.tag_name, entry.namespace),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Default,
    /// "...the following element types: All the element types listed above
    /// for the has an element in scope algorithm. HTML ol in the HTML
    /// namespace. HTML ul in the HTML namespace."
    ListItem,
    /// "...All the element types listed above... button in the HTML namespace"
    Button,
    /// "...html in the HTML namespace, table in the HTML namespace, template
    /// in the HTML namespace"
    Table,
    /// "...All element types except the following: optgroup in the HTML
    /// namespace, option in the HTML namespace"
    Select,
}

impl Scope {
    fn is_boundary<H>(self, entry: &OpenElement<H>) -> bool {
        match self {
            Self::Default => is_default_scope_boundary(entry),
            Self::ListItem => is_default_scope_boundary(entry) || entry.is_html_one_of(&["ol", "ul"]),
            Self::Button => is_default_scope_boundary(entry) || entry.is_html("button"),
            Self::Table => entry.is_html_one_of(&["html", "table", "template"]),
            Self::Select => !entry.is_html_one_of(&["optgroup", "option"]),
        }
    }
}

/// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
const IMPLIED_END_TAGS: &[&str] = &["dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc"];

/// "generate all implied end tags thoroughly"
const THOROUGHLY_IMPLIED_END_TAGS: &[&str] = &[
    "caption", "colgroup", "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc", "tbody", "td",
    "tfoot", "th", "thead", "tr",
];

/// The stack of open elements.
#[derive(Debug, Clone)]
pub struct OpenElements<H> {
    entries: Vec<OpenElement<H>>,
}

impl<H> Default for OpenElements<H> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<'a, H> IntoIterator for &'a OpenElements<H> {
    type Item = &'a OpenElement<H>;
    type IntoIter = std::slice::Iter<'a, OpenElement<H>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<H: Clone + PartialEq> OpenElements<H> {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from the top (`html`) down to the current node.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, OpenElement<H>> {
        self.entries.iter()
    }

    /// The entry at `index` (0 is the topmost).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&OpenElement<H>> {
        self.entries.get(index)
    }

    /// Push an element onto the stack; it becomes the current node.
    pub fn push(&mut self, entry: OpenElement<H>) {
        self.entries.push(entry);
    }

    /// Pop the current node.
    pub fn pop(&mut self) -> Option<OpenElement<H>> {
        self.entries.pop()
    }

    /// "The current node is the bottommost node in this stack of open elements."
    #[must_use]
    pub fn current(&self) -> Option<&OpenElement<H>> {
        self.entries.last()
    }

    /// Handle of the current node.
    #[must_use]
    pub fn current_handle(&self) -> Option<&H> {
        self.current().map(|entry| &entry.handle)
    }

    /// Local name of the current node.
    #[must_use]
    pub fn current_tag_name(&self) -> Option<&str> {
        self.current().map(|entry| entry.tag_name.as_str())
    }

    /// Whether the current node is the HTML element `tag_name`.
    #[must_use]
    pub fn current_is(&self, tag_name: &str) -> bool {
        self.current().is_some_and(|entry| entry.is_html(tag_name))
    }

    /// Whether the current node is an HTML element named in `tag_names`.
    #[must_use]
    pub fn current_is_one_of(&self, tag_names: &[&str]) -> bool {
        self.current().is_some_and(|entry| entry.is_html_one_of(tag_names))
    }

    /// Index of `handle` in the stack.
    #[must_use]
    pub fn position(&self, handle: &H) -> Option<usize> {
        self.entries.iter().position(|entry| entry.handle == *handle)
    }

    /// Whether `handle` is on the stack.
    #[must_use]
    pub fn contains(&self, handle: &H) -> bool {
        self.position(handle).is_some()
    }

    /// Whether any HTML element named `tag_name` is on the stack.
    #[must_use]
    pub fn contains_tag(&self, tag_name: &str) -> bool {
        self.entries.iter().any(|entry| entry.is_html(tag_name))
    }

    /// Index of the bottommost HTML element named `tag_name`.
    #[must_use]
    pub fn rposition_tag(&self, tag_name: &str) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.is_html(tag_name))
    }

    /// Replace the entry for `old` with `new` in place.
    pub fn replace(&mut self, old: &H, new: OpenElement<H>) {
        if let Some(index) = self.position(old) {
            self.entries[index] = new;
        }
    }

    /// Insert `entry` immediately below `anchor` (closer to the current node).
    pub fn insert_after(&mut self, anchor: &H, entry: OpenElement<H>) {
        match self.position(anchor) {
            Some(index) => self.entries.insert(index + 1, entry),
            None => self.entries.push(entry),
        }
    }

    /// Remove the entry for `handle`, wherever it is.
    pub fn remove(&mut self, handle: &H) -> Option<OpenElement<H>> {
        self.position(handle).map(|index| self.entries.remove(index))
    }

    /// Pop entries until the stack holds `len` elements.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// "Pop elements from the stack of open elements until `handle` has been
    /// popped from the stack."
    pub fn pop_until_handle(&mut self, handle: &H) {
        while let Some(entry) = self.entries.pop() {
            if entry.handle == *handle {
                break;
            }
        }
    }

    /// "Pop elements from the stack of open elements until an HTML element
    /// with the same tag name as the token has been popped from the stack."
    pub fn pop_until_tag_popped(&mut self, tag_name: &str) {
        self.pop_until_one_of_popped(&[tag_name]);
    }

    /// Pop until an HTML element named in `tag_names` has been popped.
    pub fn pop_until_one_of_popped(&mut self, tag_names: &[&str]) {
        while let Some(entry) = self.entries.pop() {
            if entry.is_html_one_of(tag_names) {
                break;
            }
        }
    }

    /// "Pop elements from the stack of open elements until an h1, h2, h3, h4,
    /// h5, or h6 element has been popped from the stack."
    pub fn pop_until_numbered_header_popped(&mut self) {
        self.pop_until_one_of_popped(&["h1", "h2", "h3", "h4", "h5", "h6"]);
    }

    /// Pop while the current node is an HTML element not named in `keep`.
    fn pop_until_current_is_one_of(&mut self, keep: &[&str]) {
        while self.current().is_some_and(|entry| !entry.is_html_one_of(keep)) {
            let _ = self.entries.pop();
        }
    }

    /// [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-context)
    ///
    /// "While the current node is not a table, template, or html element, pop
    /// elements from the stack of open elements."
    pub fn clear_back_to_table_context(&mut self) {
        self.pop_until_current_is_one_of(&["table", "template", "html"]);
    }

    /// [§ 13.2.6.4.13](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-body-context)
    ///
    /// "While the current node is not a tbody, tfoot, thead, template, or html
    /// element, pop elements from the stack of open elements."
    pub fn clear_back_to_table_body_context(&mut self) {
        self.pop_until_current_is_one_of(&["tbody", "tfoot", "thead", "template", "html"]);
    }

    /// [§ 13.2.6.4.14](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-row-context)
    ///
    /// "While the current node is not a tr, template, or html element, pop
    /// elements from the stack of open elements."
    pub fn clear_back_to_table_row_context(&mut self) {
        self.pop_until_current_is_one_of(&["tr", "template", "html"]);
    }

    /// [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element, an
    /// rp element, an rt element, or an rtc element, the UA must pop the
    /// current node off the stack of open elements."
    ///
    /// "If a step requires the UA to generate implied end tags but lists an
    /// element to exclude from the process, then the UA must perform the above
    /// steps as if that element was not in the above list."
    pub fn generate_implied_end_tags(&mut self, exclude: Option<&str>) {
        while let Some(entry) = self.current() {
            let closable = entry.is_html_one_of(IMPLIED_END_TAGS) && exclude != Some(entry.tag_name.as_str());
            if !closable {
                break;
            }
            let _ = self.entries.pop();
        }
    }

    /// "generate all implied end tags thoroughly"
    pub fn generate_all_implied_end_tags_thoroughly(&mut self) {
        while self.current().is_some_and(|entry| entry.is_html_one_of(THOROUGHLY_IMPLIED_END_TAGS)) {
            let _ = self.entries.pop();
        }
    }

    // =========================================================================
    // Scope checks
    // =========================================================================

    fn has_in_specific_scope(&self, is_target: impl Fn(&OpenElement<H>) -> bool, scope: Scope) -> bool {
        for entry in self.entries.iter().rev() {
            // "If node is the target node, terminate in a match state."
            if is_target(entry) {
                return true;
            }
            // "Otherwise, if node is one of the element types in list,
            // terminate in a failure state."
            if scope.is_boundary(entry) {
                return false;
            }
        }
        false
    }

    /// "has an element in scope"
    #[must_use]
    pub fn has_in_scope(&self, tag_name: &str) -> bool {
        self.has_in_specific_scope(|entry| entry.is_html(tag_name), Scope::Default)
    }

    /// "has a particular element in scope", by identity.
    #[must_use]
    pub fn has_element_in_scope(&self, handle: &H) -> bool {
        self.has_in_specific_scope(|entry| entry.handle == *handle, Scope::Default)
    }

    /// "has an element in list item scope"
    #[must_use]
    pub fn has_in_list_item_scope(&self, tag_name: &str) -> bool {
        self.has_in_specific_scope(|entry| entry.is_html(tag_name), Scope::ListItem)
    }

    /// "has an element in button scope"
    #[must_use]
    pub fn has_in_button_scope(&self, tag_name: &str) -> bool {
        self.has_in_specific_scope(|entry| entry.is_html(tag_name), Scope::Button)
    }

    /// "has an element in table scope"
    #[must_use]
    pub fn has_in_table_scope(&self, tag_name: &str) -> bool {
        self.has_in_specific_scope(|entry| entry.is_html(tag_name), Scope::Table)
    }

    /// "has a tbody, thead, or tfoot element in table scope"
    #[must_use]
    pub fn has_table_body_context_in_table_scope(&self) -> bool {
        self.has_in_specific_scope(|entry| entry.is_html_one_of(&["tbody", "thead", "tfoot"]), Scope::Table)
    }

    /// "has an element in select scope"
    #[must_use]
    pub fn has_in_select_scope(&self, tag_name: &str) -> bool {
        self.has_in_specific_scope(|entry| entry.is_html(tag_name), Scope::Select)
    }

    /// "has an h1, h2, h3, h4, h5, or h6 element in scope"
    #[must_use]
    pub fn has_numbered_header_in_scope(&self) -> bool {
        self.has_in_specific_scope(
            |entry| entry.is_html_one_of(&["h1", "h2", "h3", "h4", "h5", "h6"]),
            Scope::Default,
        )
    }

    /// "has a td or th element in table scope"
    #[must_use]
    pub fn has_cell_in_table_scope(&self) -> bool {
        self.has_in_specific_scope(|entry| entry.is_html_one_of(&["td", "th"]), Scope::Table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(handle: usize, tag_name: &str) -> OpenElement<usize> {
        OpenElement {
            handle,
            tag_name: tag_name.to_string(),
            namespace: Namespace::Html,
            html_integration_point: false,
        }
    }

    fn stack(tags: &[&str]) -> OpenElements<usize> {
        let mut stack = OpenElements::new();
        for (i, tag) in tags.iter().enumerate() {
            stack.push(html(i, tag));
        }
        stack
    }

    #[test]
    fn test_default_scope_stops_at_table() {
        let stack = stack(&["html", "body", "p", "table", "tr", "td", "span"]);
        assert!(stack.has_in_scope("span"));
        assert!(!stack.has_in_scope("p"));
        assert!(stack.has_in_table_scope("tr"));
        assert!(stack.has_cell_in_table_scope());
    }

    #[test]
    fn test_button_and_list_item_scope() {
        let s = stack(&["html", "body", "p", "button", "span"]);
        assert!(s.has_in_scope("p"));
        assert!(!s.has_in_button_scope("p"));

        let s = stack(&["html", "body", "li", "ul", "span"]);
        assert!(s.has_in_scope("li"));
        assert!(!s.has_in_list_item_scope("li"));
    }

    #[test]
    fn test_select_scope_only_passes_options() {
        let s = stack(&["html", "body", "select", "optgroup", "option"]);
        assert!(s.has_in_select_scope("select"));
        let s = stack(&["html", "body", "select", "div", "option"]);
        assert!(!s.has_in_select_scope("select"));
    }

    #[test]
    fn test_foreign_scope_boundaries() {
        let mut s = stack(&["html", "body", "p"]);
        s.push(OpenElement {
            handle: 3,
            tag_name: "foreignObject".into(),
            namespace: Namespace::Svg,
            html_integration_point: true,
        });
        s.push(html(4, "span"));
        assert!(!s.has_in_scope("p"));
        // Only the SVG element closes scope, not an HTML element of that name.
        let s = stack(&["html", "body", "p", "title", "span"]);
        assert!(s.has_in_scope("p"));
    }

    #[test]
    fn test_generate_implied_end_tags_with_exclusion() {
        let mut s = stack(&["html", "body", "div", "li", "p"]);
        s.generate_implied_end_tags(Some("li"));
        assert_eq!(s.current_tag_name(), Some("li"));
        s.generate_implied_end_tags(None);
        assert_eq!(s.current_tag_name(), Some("div"));
    }

    #[test]
    fn test_random_access_mutation() {
        let mut s = stack(&["html", "body", "b", "p"]);
        let _ = s.remove(&2);
        assert_eq!(s.len(), 3);
        s.insert_after(&3, html(9, "b"));
        assert_eq!(s.current_handle(), Some(&9));
        s.replace(&9, html(10, "i"));
        assert_eq!(s.current_tag_name(), Some("i"));
        s.pop_until_handle(&1);
        assert_eq!(s.current_tag_name(), Some("html"));
    }

    #[test]
    fn test_clear_back_to_table_context() {
        let mut s = stack(&["html", "body", "table", "tbody", "tr"]);
        s.clear_back_to_table_body_context();
        assert_eq!(s.current_tag_name(), Some("tbody"));
        s.clear_back_to_table_context();
        assert_eq!(s.current_tag_name(), Some("table"));
    }
}
