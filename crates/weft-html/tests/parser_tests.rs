//! Integration tests for tree construction.
//!
//! Most expectations are html5lib-format dumps (see [`weft_html::dump_tree`]).

use weft_dom::{DomTree, Namespace, NodeId, QuirksMode};
use weft_html::{
    HTMLParser, ParseErrorCode, ParserOptions, ParserStep, dump_tree, parse_document, parse_document_with,
    parse_fragment,
};

/// Helper to parse HTML and return the DOM tree
fn parse(html: &str) -> DomTree {
    parse_document(html)
}

/// Helper to parse HTML and return the html5lib dump of the whole document
fn dump(html: &str) -> String {
    let tree = parse(html);
    dump_tree(&tree, &NodeId::ROOT)
}

/// Helper to parse a fragment and return its dump
fn dump_fragment(html: &str, context: &str) -> String {
    let (tree, fragment) = parse_fragment(html, Some(context));
    dump_tree(&tree, &fragment)
}

/// Build an expected dump from its lines, without the `| ` prefixes.
fn lines(lines: &[&str]) -> String {
    lines.iter().map(|line| format!("| {line}\n")).collect()
}

/// Helper to get element by tag name (first match, depth-first)
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    if let Some(data) = tree.as_element(from)
        && data.tag_name == tag
    {
        return Some(from);
    }
    for &child_id in tree.children(from) {
        if let Some(found) = find_element(tree, child_id, tag) {
            return Some(found);
        }
    }
    None
}

/// Helper to count elements with a tag name
fn count_elements(tree: &DomTree, tag: &str) -> usize {
    tree.descendants(NodeId::ROOT)
        .filter(|&id| tree.as_element(id).is_some_and(|data| data.tag_name == tag))
        .count()
}

/// Helper to get text content of a node (concatenated)
fn text_content(tree: &DomTree, id: NodeId) -> String {
    if let Some(text) = tree.as_text(id) {
        return text.to_string();
    }
    tree.children(id)
        .iter()
        .map(|&child| text_content(tree, child))
        .collect()
}

/// Helper to parse and return the recorded error codes
fn error_codes(html: &str) -> Vec<ParseErrorCode> {
    let mut parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
    parser.write(html);
    parser.end();
    while let ParserStep::Continue | ParserStep::Script(_) = parser.run() {}
    parser.take_issues().into_iter().map(|issue| issue.code).collect()
}

// =============================================================================
// Document structure
// =============================================================================

#[test]
fn test_document_structure() {
    assert_eq!(
        dump("<!DOCTYPE html><html><head></head><body></body></html>"),
        lines(&["<!DOCTYPE html>", "<html>", "  <head>", "  <body>"])
    );
}

#[test]
fn test_implied_structure() {
    let tree = parse("Hello");
    let body = tree.body().unwrap();
    assert_eq!(text_content(&tree, body), "Hello");
    assert!(tree.head().is_some());
    assert_eq!(
        dump("Hello"),
        lines(&["<html>", "  <head>", "  <body>", "    \"Hello\""])
    );
}

#[test]
fn test_empty_input() {
    assert_eq!(dump(""), lines(&["<html>", "  <head>", "  <body>"]));
}

#[test]
fn test_head_elements() {
    assert_eq!(
        dump("<title>a&amp;b</title><script>if (a<b) x</script><style>p > a {}</style>"),
        lines(&[
            "<html>",
            "  <head>",
            "    <title>",
            "      \"a&b\"",
            "    <script>",
            "      \"if (a<b) x\"",
            "    <style>",
            "      \"p > a {}\"",
            "  <body>",
        ])
    );
}

#[test]
fn test_comments_outside_html() {
    assert_eq!(
        dump("<!--a--><html><body></body></html><!--b-->"),
        lines(&["<!-- a -->", "<html>", "  <head>", "  <body>", "<!-- b -->"])
    );
}

#[test]
fn test_attributes_merged_from_repeated_html_and_body() {
    assert_eq!(
        dump("<html a=1><body b=2><html a=3 c=4><body d=5>"),
        lines(&[
            "<html>",
            "  a=\"1\"",
            "  c=\"4\"",
            "  <head>",
            "  <body>",
            "    b=\"2\"",
            "    d=\"5\"",
        ])
    );
}

#[test]
fn test_duplicate_attribute_keeps_first_value() {
    let tree = parse(r#"<div a="1" a="2"></div>"#);
    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    let data = tree.as_element(div).unwrap();
    assert_eq!(data.attrs.len(), 1);
    assert_eq!(data.get_attribute("a"), Some("1"));
}

#[test]
fn test_exactly_one_html_child_for_odd_inputs() {
    for input in ["", "</html>", "<html><html>", "<body></body><head>", "<!DOCTYPE html><!DOCTYPE html>", "</br>"] {
        let tree = parse(input);
        let html_children = tree
            .children(NodeId::ROOT)
            .iter()
            .filter(|&&id| tree.as_element(id).is_some())
            .count();
        assert_eq!(html_children, 1, "{input:?}");
    }
}

// =============================================================================
// In body
// =============================================================================

#[test]
fn test_implied_end_tags_for_list_items() {
    assert_eq!(
        dump("<ul><li>a<li>b</ul>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <ul>",
            "      <li>",
            "        \"a\"",
            "      <li>",
            "        \"b\"",
        ])
    );
}

#[test]
fn test_p_closed_by_block() {
    assert_eq!(
        dump("<p>a<div>b</div>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <p>",
            "      \"a\"",
            "    <div>",
            "      \"b\"",
        ])
    );
}

#[test]
fn test_stray_end_tags_br_and_p() {
    assert_eq!(
        dump("</br></p>"),
        lines(&["<html>", "  <head>", "  <body>", "    <br>", "    <p>"])
    );
}

#[test]
fn test_image_becomes_img() {
    assert_eq!(
        dump("<image src=x>"),
        lines(&["<html>", "  <head>", "  <body>", "    <img>", "      src=\"x\""])
    );
}

#[test]
fn test_leading_newline_skipped_in_pre_and_textarea() {
    let tree = parse("<pre>\nx</pre><textarea>\n\ny</textarea>");
    let pre = find_element(&tree, NodeId::ROOT, "pre").unwrap();
    assert_eq!(text_content(&tree, pre), "x");
    let textarea = find_element(&tree, NodeId::ROOT, "textarea").unwrap();
    assert_eq!(text_content(&tree, textarea), "\ny");
}

#[test]
fn test_null_characters_dropped_in_body() {
    let tree = parse("a\0b");
    assert_eq!(text_content(&tree, tree.body().unwrap()), "ab");
}

#[test]
fn test_adjacent_text_is_merged() {
    let tree = parse("a&amp;b c");
    let body = tree.body().unwrap();
    assert_eq!(tree.children(body).len(), 1);
    assert_eq!(text_content(&tree, body), "a&b c");
}

#[test]
fn test_frameset() {
    assert_eq!(
        dump("<frameset><frame></frameset>"),
        lines(&["<html>", "  <head>", "  <frameset>", "    <frame>"])
    );
}

#[test]
fn test_select_options() {
    assert_eq!(
        dump("<select><option>a<option>b</select>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <select>",
            "      <option>",
            "        \"a\"",
            "      <option>",
            "        \"b\"",
        ])
    );
}

#[test]
fn test_noscript_depends_on_scripting_flag() {
    let html = "<body><noscript><p>x</p></noscript>";
    let tree = parse(html);
    let noscript = find_element(&tree, NodeId::ROOT, "noscript").unwrap();
    assert!(find_element(&tree, noscript, "p").is_none());
    assert_eq!(text_content(&tree, noscript), "<p>x</p>");

    let options = ParserOptions {
        scripting_enabled: false,
        ..ParserOptions::default()
    };
    let (tree, _) = parse_document_with(DomTree::new(), html, options);
    let noscript = find_element(&tree, NodeId::ROOT, "noscript").unwrap();
    assert!(find_element(&tree, noscript, "p").is_some());
}

// =============================================================================
// Adoption agency and active formatting elements
// =============================================================================

#[test]
fn test_adoption_agency_clones_formatting_element() {
    let tree = parse("<b>1<i>2<p>3</b>4</p>");
    assert_eq!(count_elements(&tree, "b"), 2);
}

#[test]
fn test_adoption_agency_misnested_b_and_p() {
    assert_eq!(
        dump("<b>1<p>2</b>3</p>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <b>",
            "      \"1\"",
            "    <p>",
            "      <b>",
            "        \"2\"",
            "      \"3\"",
        ])
    );
}

#[test]
fn test_nested_anchors() {
    assert_eq!(
        dump("<a><p>X<a>Y</a>Z</p></a>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <a>",
            "    <p>",
            "      <a>",
            "        \"X\"",
            "      <a>",
            "        \"Y\"",
            "      \"Z\"",
        ])
    );
}

#[test]
fn test_formatting_reconstructed_after_paragraph() {
    assert_eq!(
        dump("<p><b><i><u></p> <p>X"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <p>",
            "      <b>",
            "        <i>",
            "          <u>",
            "    <b>",
            "      <i>",
            "        <u>",
            "          \" \"",
            "          <p>",
            "            \"X\"",
        ])
    );
}

#[test]
fn test_noahs_ark_limits_reconstruction() {
    assert_eq!(
        dump("<p><b><b><b><b></p>x"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <p>",
            "      <b>",
            "        <b>",
            "          <b>",
            "            <b>",
            "    <b>",
            "      <b>",
            "        <b>",
            "          \"x\"",
        ])
    );
}

#[test]
fn test_noahs_ark_caps_identical_entries() {
    let mut parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
    parser.write("<font color=x><font color=x><font color=x><font color=x>");
    assert_eq!(parser.run(), ParserStep::NeedMoreInput);
    assert_eq!(parser.active_formatting_elements().len(), 3);

    // A different attribute set is a different family.
    parser.write("<font color=y>");
    assert_eq!(parser.run(), ParserStep::NeedMoreInput);
    assert_eq!(parser.active_formatting_elements().len(), 4);
}

// =============================================================================
// Tables
// =============================================================================

#[test]
fn test_foster_parenting_text() {
    let tree = parse("<table>A<tr>B</tr></table>");
    let body = tree.body().unwrap();
    let table = find_element(&tree, body, "table").unwrap();
    let children = tree.children(body);
    assert_eq!(children.last(), Some(&table));
    let before_table: String = children[..children.len() - 1]
        .iter()
        .map(|&id| text_content(&tree, id))
        .collect();
    assert_eq!(before_table, "AB");
    assert_eq!(text_content(&tree, table), "");

    let tbody = find_element(&tree, table, "tbody").unwrap();
    assert!(find_element(&tree, tbody, "tr").is_some());
}

#[test]
fn test_foster_parenting_formatting_element() {
    assert_eq!(
        dump("<table><b>x</b><tr><td>y</td></tr></table>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <b>",
            "      \"x\"",
            "    <table>",
            "      <tbody>",
            "        <tr>",
            "          <td>",
            "            \"y\"",
        ])
    );
}

#[test]
fn test_foster_parenting_is_a_parse_error() {
    assert!(error_codes("<!DOCTYPE html><table>x</table>").contains(&ParseErrorCode::FosterParentedContent));
}

#[test]
fn test_whitespace_stays_in_table() {
    assert_eq!(
        dump("<table> <tr>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <table>",
            "      \" \"",
            "      <tbody>",
            "        <tr>",
        ])
    );
}

#[test]
fn test_cell_closes_previous_cell() {
    assert_eq!(
        dump("<table><td>a<td>b</table>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <table>",
            "      <tbody>",
            "        <tr>",
            "          <td>",
            "            \"a\"",
            "          <td>",
            "            \"b\"",
        ])
    );
}

#[test]
fn test_caption_and_colgroup() {
    assert_eq!(
        dump("<table><caption>c<col></table>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <table>",
            "      <caption>",
            "        \"c\"",
            "      <colgroup>",
            "        <col>",
        ])
    );
}

// =============================================================================
// Quirks mode
// =============================================================================

#[test]
fn test_missing_doctype_is_quirks() {
    let tree = parse("<p>x");
    assert_eq!(tree.quirks_mode(), QuirksMode::Quirks);
    assert!(error_codes("<p>x").contains(&ParseErrorCode::MissingDoctype));
}

#[test]
fn test_html5_doctype_is_no_quirks() {
    assert_eq!(parse("<!DOCTYPE html>").quirks_mode(), QuirksMode::NoQuirks);
    assert!(error_codes("<!DOCTYPE html><p>x").is_empty());
}

#[test]
fn test_legacy_frameset_doctype_without_system_id_is_quirks() {
    let tree = parse(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Frameset//EN">"#);
    assert_eq!(tree.quirks_mode(), QuirksMode::Quirks);
}

#[test]
fn test_legacy_transitional_doctype_with_system_id_is_limited_quirks() {
    let tree = parse(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#,
    );
    assert_eq!(tree.quirks_mode(), QuirksMode::LimitedQuirks);
}

#[test]
fn test_xhtml_strict_doctype_is_no_quirks() {
    let tree = parse(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#,
    );
    assert_eq!(tree.quirks_mode(), QuirksMode::NoQuirks);
}

#[test]
fn test_table_inside_p_only_in_quirks_mode() {
    assert_eq!(
        dump("<p><table>"),
        lines(&["<html>", "  <head>", "  <body>", "    <p>", "      <table>"])
    );
    assert_eq!(
        dump("<!DOCTYPE html><p><table>"),
        lines(&["<!DOCTYPE html>", "<html>", "  <head>", "  <body>", "    <p>", "    <table>"])
    );
}

// =============================================================================
// Foreign content
// =============================================================================

#[test]
fn test_foreign_object_is_html_integration_point() {
    let tree = parse("<svg><foreignObject><p>X</p></foreignObject></svg>");
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.as_element(p).unwrap().namespace, Namespace::Html);
    let foreign_object = find_element(&tree, NodeId::ROOT, "foreignObject").unwrap();
    assert_eq!(tree.as_element(foreign_object).unwrap().namespace, Namespace::Svg);
}

#[test]
fn test_svg_children_stay_in_svg() {
    let tree = parse("<svg><rect/></svg>");
    let rect = find_element(&tree, NodeId::ROOT, "rect").unwrap();
    assert_eq!(tree.as_element(rect).unwrap().namespace, Namespace::Svg);
    assert!(tree.children(rect).is_empty());
}

#[test]
fn test_svg_name_adjustments() {
    assert_eq!(
        dump("<svg viewbox='0 0 1 1'><foreignobject><p>x</p></foreignobject></svg>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <svg svg>",
            "      viewBox=\"0 0 1 1\"",
            "      <svg foreignObject>",
            "        <p>",
            "          \"x\"",
        ])
    );
}

#[test]
fn test_foreign_attribute_namespaces() {
    assert_eq!(
        dump("<svg xlink:href='#a' xml:lang=en></svg>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <svg svg>",
            "      xlink href=\"#a\"",
            "      xml lang=\"en\"",
        ])
    );
}

#[test]
fn test_mathml_annotation_xml_integration_point() {
    assert_eq!(
        dump("<math><mi>x</mi><annotation-xml encoding='text/html'><div>y</div></annotation-xml></math>"),
        lines(&[
            "<html>",
            "  <head>",
            "  <body>",
            "    <math math>",
            "      <math mi>",
            "        \"x\"",
            "      <math annotation-xml>",
            "        encoding=\"text/html\"",
            "        <div>",
            "          \"y\"",
        ])
    );
}

#[test]
fn test_html_start_tag_breaks_out_of_svg() {
    assert_eq!(
        dump("<svg><p>x"),
        lines(&["<html>", "  <head>", "  <body>", "    <svg svg>", "    <p>", "      \"x\""])
    );
}

#[test]
fn test_cdata_in_svg() {
    assert_eq!(
        dump("<svg><![CDATA[a<b]]></svg>"),
        lines(&["<html>", "  <head>", "  <body>", "    <svg svg>", "      \"a<b\""])
    );
}

// =============================================================================
// Templates
// =============================================================================

#[test]
fn test_template_contents() {
    assert_eq!(
        dump("<template><tr><td>x</td></tr></template>"),
        lines(&[
            "<html>",
            "  <head>",
            "    <template>",
            "      content",
            "        <tr>",
            "          <td>",
            "            \"x\"",
            "  <body>",
        ])
    );
}

#[test]
fn test_template_children_live_in_contents() {
    let tree = parse("<body><template><b>x</b></template>");
    let template = find_element(&tree, NodeId::ROOT, "template").unwrap();
    assert!(tree.children(template).is_empty());
    let contents = tree.template_contents(template).unwrap();
    assert_eq!(text_content(&tree, contents), "x");
}

// =============================================================================
// Fragments
// =============================================================================

#[test]
fn test_fragment_in_row_context() {
    assert_eq!(dump_fragment("<td>x", "tr"), lines(&["<td>", "  \"x\""]));
}

#[test]
fn test_fragment_in_table_body_context() {
    assert_eq!(
        dump_fragment("<tr><td>cell", "tbody"),
        lines(&["<tr>", "  <td>", "    \"cell\""])
    );
}

#[test]
fn test_fragment_adoption_agency() {
    assert_eq!(
        dump_fragment("<b>a<p>b</b>c", "div"),
        lines(&["<b>", "  \"a\"", "<p>", "  <b>", "    \"b\"", "  \"c\""])
    );
}

#[test]
fn test_fragment_in_rcdata_context() {
    assert_eq!(dump_fragment("<b>x</b>", "textarea"), lines(&["\"<b>x</b>\""]));
}

#[test]
fn test_fragment_in_svg_context() {
    let (tree, fragment) = parse_fragment("<circle/>", Some("svg svg"));
    let circle = tree.children(fragment)[0];
    assert_eq!(tree.as_element(circle).unwrap().namespace, Namespace::Svg);
}

#[test]
fn test_fragment_has_no_html_wrapper() {
    let (tree, fragment) = parse_fragment("<p>a</p><p>b</p>", Some("body"));
    assert_eq!(tree.children(fragment).len(), 2);
    assert!(find_element(&tree, fragment, "html").is_none());
}

// =============================================================================
// Streaming and source locations
// =============================================================================

#[test]
fn test_streaming_chunks_match_whole_input() {
    let html = "<!DOCTYPE html><table><tr><td>a&amp;b</td></tr></table><p>x";
    let mut parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
    for chunk in html.as_bytes().chunks(3) {
        parser.write(std::str::from_utf8(chunk).unwrap());
        while let ParserStep::Continue | ParserStep::Script(_) = parser.run() {}
    }
    parser.end();
    while let ParserStep::Continue | ParserStep::Script(_) = parser.run() {}
    let (tree, document) = parser.finish();
    assert_eq!(dump_tree(&tree, &document), dump(html));
}

#[test]
fn test_script_suspension_point() {
    let mut parser = HTMLParser::new(DomTree::new(), ParserOptions::default());
    parser.write("<script>run()</script><p>x");
    parser.end();
    let ParserStep::Script(script) = parser.run() else {
        panic!("expected a script suspension point");
    };
    assert_eq!(parser.sink().as_element(script).unwrap().tag_name, "script");
    assert_eq!(parser.run(), ParserStep::Finished);
}

#[test]
fn test_element_source_locations() {
    let options = ParserOptions {
        source_locations: true,
        ..ParserOptions::default()
    };
    let mut parser = HTMLParser::new(DomTree::new(), options);
    parser.write("<div>\n  <span id=a>x</span></div>");
    parser.end();
    while let ParserStep::Continue | ParserStep::Script(_) = parser.run() {}
    let span = find_element(parser.sink(), NodeId::ROOT, "span").unwrap();
    let location = parser.element_location(&span).unwrap();
    assert_eq!((location.line, location.column), (2, 3));
    assert_eq!(location.start_offset, 8);
}

// =============================================================================
// Properties
// =============================================================================

mod properties {
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use weft_dom::NodeId;
    use weft_html::{parse_document, serialize_children};

    #[quickcheck]
    fn prop_any_input_yields_one_html_element(input: String) -> bool {
        let tree = parse_document(&input);
        let elements: Vec<_> = tree
            .children(NodeId::ROOT)
            .iter()
            .filter(|&&id| tree.as_element(id).is_some())
            .collect();
        elements.len() == 1 && tree.as_element(*elements[0]).is_some_and(|data| data.tag_name == "html")
    }

    /// Well-formed markup built from a few container and void elements.
    #[derive(Debug, Clone)]
    struct Markup(String);

    const CONTAINERS: &[&str] = &["div", "span", "b", "em", "section", "ul", "li"];
    const VOIDS: &[&str] = &["br", "hr", "img"];
    const WORDS: &[&str] = &["a", "b c", "x&y", "1 < 2", "\u{A0}", "\"q\""];

    fn markup(g: &mut Gen, depth: usize, out: &mut String) {
        let count = usize::arbitrary(g) % 4;
        for _ in 0..count {
            match u8::arbitrary(g) % 3 {
                0 if depth > 0 => {
                    let tag = g.choose(CONTAINERS).copied().unwrap_or("div");
                    out.push('<');
                    out.push_str(tag);
                    if bool::arbitrary(g) {
                        out.push_str(" class=\"k&amp;v\"");
                    }
                    out.push('>');
                    markup(g, depth - 1, out);
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                1 => {
                    out.push('<');
                    out.push_str(g.choose(VOIDS).copied().unwrap_or("br"));
                    out.push('>');
                }
                _ => {
                    let word = g.choose(WORDS).copied().unwrap_or("a");
                    out.push_str(&word.replace('&', "&amp;").replace('<', "&lt;"));
                }
            }
        }
    }

    impl Arbitrary for Markup {
        fn arbitrary(g: &mut Gen) -> Self {
            let mut out = String::new();
            markup(g, 3, &mut out);
            Self(out)
        }
    }

    fn round_trip(html: &str) -> String {
        let tree = parse_document(html);
        let body = tree.body().unwrap();
        serialize_children(&tree, &body)
    }

    #[quickcheck]
    fn prop_serialization_is_stable_after_one_round_trip(markup: Markup) -> bool {
        let once = round_trip(&markup.0);
        round_trip(&once) == once
    }
}
