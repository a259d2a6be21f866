//! Integration tests for the HTML tokenizer.

use weft_html::tokenizer::TokenizerState;
use weft_html::{Attribute, HTMLTokenizer, ParseErrorCode, Token};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    HTMLTokenizer::new(input).run()
}

/// Helper to tokenize a string and return the parse error codes
fn error_codes(input: &str) -> Vec<ParseErrorCode> {
    let mut tokenizer = HTMLTokenizer::new(input);
    let _ = tokenizer.run();
    tokenizer.take_issues().into_iter().map(|issue| issue.code).collect()
}

fn chars(data: &str) -> Token {
    Token::Character { data: data.into() }
}

fn whitespace(data: &str) -> Token {
    Token::Whitespace { data: data.into() }
}

fn start_tag(name: &str, attributes: &[(&str, &str)], self_closing: bool) -> Token {
    Token::StartTag {
        name: name.into(),
        self_closing,
        attributes: attributes.iter().map(|&(n, v)| Attribute::new(n, v)).collect(),
    }
}

fn end_tag(name: &str) -> Token {
    Token::EndTag {
        name: name.into(),
        self_closing: false,
        attributes: Vec::new(),
    }
}

#[test]
fn test_plain_text_is_one_token() {
    assert_eq!(tokenize("Hello"), vec![chars("Hello"), Token::EndOfFile]);
}

#[test]
fn test_character_runs_split_by_class() {
    assert_eq!(
        tokenize("a b\t\nc"),
        vec![chars("a"), whitespace(" "), chars("b"), whitespace("\t\n"), chars("c"), Token::EndOfFile]
    );
}

#[test]
fn test_null_characters_are_their_own_run() {
    let tokens = tokenize("a\0\0b");
    assert_eq!(
        tokens,
        vec![
            chars("a"),
            Token::NullCharacter { data: "\0\0".into() },
            chars("b"),
            Token::EndOfFile
        ]
    );
    assert_eq!(
        error_codes("a\0b"),
        vec![ParseErrorCode::UnexpectedNullCharacter]
    );
}

#[test]
fn test_newlines_are_normalized() {
    assert_eq!(
        tokenize("a\r\nb\rc"),
        vec![chars("a"), whitespace("\n"), chars("b"), whitespace("\n"), chars("c"), Token::EndOfFile]
    );
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2); // DOCTYPE + EOF
    match &tokens[0] {
        Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert_eq!(*public_identifier, None);
            assert_eq!(*system_identifier, None);
            assert!(!force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_with_identifiers() {
    let tokens = tokenize(r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" 'http://www.w3.org/TR/html4/strict.dtd'>"#);
    match &tokens[0] {
        Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert_eq!(public_identifier.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
            assert_eq!(
                system_identifier.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
            assert!(!force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_without_name_forces_quirks() {
    let tokens = tokenize("<!DOCTYPE>");
    assert!(matches!(
        tokens[0],
        Token::Doctype {
            name: None,
            force_quirks: true,
            ..
        }
    ));
    assert_eq!(error_codes("<!DOCTYPE>"), vec![ParseErrorCode::MissingDoctypeName]);
}

#[test]
fn test_tags_and_attributes() {
    assert_eq!(
        tokenize(r#"<DIV Class="a" id='b' data-x=c hidden>text</div>"#),
        vec![
            start_tag("div", &[("class", "a"), ("id", "b"), ("data-x", "c"), ("hidden", "")], false),
            chars("text"),
            end_tag("div"),
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_self_closing_flag() {
    assert_eq!(tokenize("<br/>"), vec![start_tag("br", &[], true), Token::EndOfFile]);
    let tokens = tokenize("<img src=x />");
    assert!(tokens[0].is_self_closing());
    assert_eq!(tokens[0].attribute("src"), Some("x"));
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let tokens = tokenize("<a x=1 X=2 y=3>");
    assert_eq!(tokens[0], start_tag("a", &[("x", "1"), ("y", "3")], false));
    assert_eq!(error_codes("<a x=1 x=2>"), vec![ParseErrorCode::DuplicateAttribute]);
}

#[test]
fn test_end_tag_with_attributes_is_an_error() {
    assert_eq!(error_codes("</p class=x>"), vec![ParseErrorCode::EndTagWithAttributes]);
    assert_eq!(error_codes("</br/>"), vec![ParseErrorCode::EndTagWithTrailingSolidus]);
}

#[test]
fn test_comments() {
    assert_eq!(
        tokenize("<!-- hello -->"),
        vec![Token::Comment { data: " hello ".into() }, Token::EndOfFile]
    );
    assert_eq!(
        tokenize("<!---->"),
        vec![Token::Comment { data: String::new() }, Token::EndOfFile]
    );
    assert_eq!(error_codes("<!-->"), vec![ParseErrorCode::AbruptClosingOfEmptyComment]);
}

#[test]
fn test_bogus_comments() {
    assert_eq!(
        tokenize("<?xml version?>"),
        vec![Token::Comment { data: "?xml version?".into() }, Token::EndOfFile]
    );
    assert_eq!(
        error_codes("<?x>"),
        vec![ParseErrorCode::UnexpectedQuestionMarkInsteadOfTagName]
    );
    assert_eq!(
        tokenize("</ x>"),
        vec![Token::Comment { data: " x".into() }, Token::EndOfFile]
    );
}

#[test]
fn test_less_than_sign_as_text() {
    assert_eq!(tokenize("a < b"), vec![chars("a"), whitespace(" "), chars("<"), whitespace(" "), chars("b"), Token::EndOfFile]);
    assert_eq!(error_codes("<"), vec![ParseErrorCode::EofBeforeTagName]);
}

#[test]
fn test_eof_in_tag_drops_the_tag() {
    assert_eq!(tokenize("<div class="), vec![Token::EndOfFile]);
    assert_eq!(error_codes("<div"), vec![ParseErrorCode::EofInTag]);
}

#[test]
fn test_character_references_in_data() {
    assert_eq!(tokenize("&amp;&lt;&#65;&#x42;"), vec![chars("&<AB"), Token::EndOfFile]);
    assert_eq!(tokenize("&notit;"), vec![chars("\u{AC}it;"), Token::EndOfFile]);
    assert_eq!(
        error_codes("&notit;"),
        vec![ParseErrorCode::MissingSemicolonAfterCharacterReference]
    );
}

#[test]
fn test_unknown_reference_is_literal() {
    assert_eq!(tokenize("&bogus;"), vec![chars("&bogus;"), Token::EndOfFile]);
    assert_eq!(
        error_codes("&bogus;"),
        vec![ParseErrorCode::UnknownNamedCharacterReference]
    );
}

#[test]
fn test_legacy_reference_in_attribute_is_not_decoded() {
    // "If the character reference was consumed as part of an attribute, and
    // the last character matched is not a ';', and the next input character
    // is either '=' or an ASCII alphanumeric, then ... flush code points
    // consumed as a character reference."
    let tokens = tokenize(r#"<a href="?x=1&not=2&amp;y">"#);
    assert_eq!(tokens[0].attribute("href"), Some("?x=1&not=2&y"));
}

#[test]
fn test_cdata_outside_foreign_content_is_a_comment() {
    assert_eq!(
        tokenize("<![CDATA[x]]>"),
        vec![Token::Comment { data: "[CDATA[x]]".into() }, Token::EndOfFile]
    );
    assert_eq!(error_codes("<![CDATA[x]]>"), vec![ParseErrorCode::CdataInHtmlContent]);
}

#[test]
fn test_cdata_when_allowed() {
    let mut tokenizer = HTMLTokenizer::new("<![CDATA[a<b]]>");
    tokenizer.set_allow_cdata(true);
    assert_eq!(tokenizer.run(), vec![chars("a<b"), Token::EndOfFile]);
}

#[test]
fn test_rcdata_state_set_by_caller() {
    let mut tokenizer = HTMLTokenizer::new("<title>a</b>&amp;</title>x");
    assert_eq!(tokenizer.next_token(), Some(start_tag("title", &[], false)));
    tokenizer.set_state(TokenizerState::RCDATA);
    assert_eq!(tokenizer.next_token(), Some(chars("a</b>&")));
    assert_eq!(tokenizer.next_token(), Some(end_tag("title")));
    assert_eq!(tokenizer.next_token(), Some(chars("x")));
    assert_eq!(tokenizer.next_token(), Some(Token::EndOfFile));
    assert_eq!(tokenizer.next_token(), None);
}

#[test]
fn test_script_data_escapes() {
    let mut tokenizer = HTMLTokenizer::new("<script><!--<script></script>--></script>");
    assert_eq!(tokenizer.next_token(), Some(start_tag("script", &[], false)));
    tokenizer.set_state(TokenizerState::ScriptData);
    // The inner `</script>` is double-escaped and stays text.
    assert_eq!(
        tokenizer.next_token(),
        Some(chars("<!--<script></script>-->"))
    );
    assert_eq!(tokenizer.next_token(), Some(end_tag("script")));
}

#[test]
fn test_plaintext_never_ends() {
    let mut tokenizer = HTMLTokenizer::new("<plaintext></plaintext>");
    assert_eq!(tokenizer.next_token(), Some(start_tag("plaintext", &[], false)));
    tokenizer.set_state(TokenizerState::PLAINTEXT);
    assert_eq!(tokenizer.next_token(), Some(chars("</plaintext>")));
    assert_eq!(tokenizer.next_token(), Some(Token::EndOfFile));
}

#[test]
fn test_streaming_pauses_mid_tag() {
    let mut tokenizer = HTMLTokenizer::streaming();
    tokenizer.write("<di");
    assert_eq!(tokenizer.next_token(), None);
    tokenizer.write("v id=x>");
    assert_eq!(tokenizer.next_token(), Some(start_tag("div", &[("id", "x")], false)));
    assert_eq!(tokenizer.next_token(), None);
    assert!(!tokenizer.is_finished());
    tokenizer.end();
    assert_eq!(tokenizer.next_token(), Some(Token::EndOfFile));
    assert!(tokenizer.is_finished());
}

#[test]
fn test_is_finished_waits_for_queued_tokens() {
    let mut tokenizer = HTMLTokenizer::new("ab<br>");
    assert!(!tokenizer.is_finished());
    assert_eq!(tokenizer.next_token(), Some(chars("ab")));
    assert!(!tokenizer.is_finished());
    assert_eq!(tokenizer.next_token(), Some(start_tag("br", &[], false)));
    assert!(!tokenizer.is_finished());
    assert_eq!(tokenizer.next_token(), Some(Token::EndOfFile));
    assert!(tokenizer.is_finished());
    assert_eq!(tokenizer.next_token(), None);
    assert!(tokenizer.is_finished());
}

#[test]
fn test_streaming_cr_lf_split_across_chunks() {
    let mut tokenizer = HTMLTokenizer::streaming();
    tokenizer.write("a\r");
    tokenizer.write("\nb");
    tokenizer.end();
    assert_eq!(tokenizer.run(), vec![chars("a"), whitespace("\n"), chars("b"), Token::EndOfFile]);
}

#[test]
fn test_utf16_surrogate_pair_split_across_writes() {
    let units: Vec<u16> = "x\u{1F600}".encode_utf16().collect();
    let mut tokenizer = HTMLTokenizer::streaming();
    tokenizer.write_utf16(&units[..2]);
    tokenizer.write_utf16(&units[2..]);
    tokenizer.end();
    assert_eq!(tokenizer.run(), vec![chars("x\u{1F600}"), Token::EndOfFile]);
}

#[test]
fn test_lone_surrogate_becomes_replacement() {
    let mut tokenizer = HTMLTokenizer::streaming();
    tokenizer.write_utf16(&[0x61, 0xDC00, 0x62]);
    tokenizer.end();
    assert_eq!(tokenizer.run(), vec![chars("a\u{FFFD}b"), Token::EndOfFile]);
}

#[test]
fn test_insert_at_cursor() {
    let mut tokenizer = HTMLTokenizer::streaming();
    tokenizer.write("<p>after");
    assert_eq!(tokenizer.next_token(), Some(start_tag("p", &[], false)));
    tokenizer.insert_at_cursor("<b>");
    tokenizer.end();
    assert_eq!(
        tokenizer.run(),
        vec![start_tag("b", &[], false), chars("after"), Token::EndOfFile]
    );
}

#[test]
fn test_source_locations() {
    let mut tokenizer = HTMLTokenizer::streaming();
    tokenizer.set_track_locations(true);
    tokenizer.write("ab\n  <p class=x>");
    tokenizer.end();
    let mut location = None;
    while let Some(token) = tokenizer.next_token() {
        if token.is_start_tag("p") {
            location = tokenizer.last_token_location();
        }
    }
    let location = location.unwrap();
    assert_eq!((location.line, location.column), (2, 3));
    assert_eq!(location.start_offset, 5);
    assert_eq!(location.end_offset, 16);
}
