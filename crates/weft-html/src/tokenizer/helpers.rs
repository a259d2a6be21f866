//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Look-ahead over the preprocessed input ("If the next few characters are...")
//! - Token emission ("Emit the current token"), with character coalescing
//! - Attribute helpers for duplicate detection
//! - Parse error reporting

use weft_common::warning::warn_once;

use super::core::{HTMLTokenizer, SourceLocation, TokenizerState};
use super::token::{Attribute, CharacterClass, Token};
use crate::parse_error::{ParseErrorCode, ParseIssue};

/// Outcome of comparing the upcoming input with a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Lookahead {
    Match,
    NoMatch,
    /// The buffered input is a prefix of the keyword and more may arrive.
    NeedMoreInput,
}

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Switch to the X state"
    ///
    /// The next character will be consumed on the next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The current character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// Stay in the current state with the current character and give up
    /// until more input is written.
    pub(super) const fn wait_for_more_input(&mut self) {
        self.reconsume = true;
        self.blocked = true;
    }

    /// The return state, defaulting to the data state.
    pub(super) fn current_return_state(&self) -> TokenizerState {
        self.return_state.unwrap_or(TokenizerState::Data)
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
    /// or U+0020 SPACE."
    ///
    /// CR never reaches the tokenizer (it is normalized by the preprocessor).
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }

    /// "If the next few characters are..."
    ///
    /// Compares `word` against the input starting right after the cursor,
    /// without consuming anything.
    pub(super) fn next_few_characters_are(&self, word: &str, ascii_case_insensitive: bool) -> Lookahead {
        for (offset, expected) in word.chars().enumerate() {
            match self.input.peek(offset) {
                Some(c) if c == expected => {}
                Some(c) if ascii_case_insensitive && c.eq_ignore_ascii_case(&expected) => {}
                Some(_) => return Lookahead::NoMatch,
                None if self.input.is_last_chunk_written() => return Lookahead::NoMatch,
                None => return Lookahead::NeedMoreInput,
            }
        }
        Lookahead::Match
    }

    /// Like [`next_few_characters_are`](Self::next_few_characters_are), but the
    /// first character of `word` is the current input character.
    pub(super) fn current_and_next_characters_are(&self, word: &str) -> Lookahead {
        let mut chars = word.chars();
        let first_matches = match (self.current_input_character, chars.next()) {
            (Some(c), Some(expected)) => c.eq_ignore_ascii_case(&expected),
            _ => false,
        };
        if !first_matches {
            return Lookahead::NoMatch;
        }
        self.next_few_characters_are(chars.as_str(), true)
    }

    /// Consume `count` characters that have already been matched by look-ahead.
    pub(super) fn skip_characters(&mut self, count: usize) {
        for _ in 0..count {
            let _ = self.input.advance_and_peek();
        }
    }

    /// Remember where the token starting at the just-consumed `<` begins.
    pub(super) const fn mark_token_start(&mut self) {
        self.token_start = self.input.position().saturating_sub(1);
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Emit the current input character as a character token."
    ///
    /// Characters are buffered; a run of one [`CharacterClass`] becomes one token
    /// once a character of another class (or any other token) is emitted.
    pub(super) fn emit_char(&mut self, c: char) {
        let class = CharacterClass::of(c);
        if self
            .pending_characters
            .as_ref()
            .is_some_and(|(pending, _)| *pending != class)
        {
            self.flush_pending_characters();
        }
        self.pending_characters
            .get_or_insert_with(|| (class, String::new()))
            .1
            .push(c);
    }

    /// Emit every character of `s` as character tokens.
    pub(super) fn emit_str(&mut self, s: &str) {
        for c in s.chars() {
            self.emit_char(c);
        }
    }

    fn flush_pending_characters(&mut self) {
        if let Some((class, data)) = self.pending_characters.take() {
            self.push_token(Token::characters(class, data), None);
        }
    }

    fn push_token(&mut self, token: Token, location: Option<SourceLocation>) {
        log::trace!(target: "weft_html::tokenizer", "emit {token}");
        self.token_queue.push_back((token, location));
    }

    /// "Emit the current token"
    ///
    /// Finishes the pending attribute, remembers the last start tag name and
    /// hands the token to the queue.
    pub(super) fn emit_current_token(&mut self) {
        self.commit_current_attribute();
        let Some(token) = self.current_token.take() else {
            return;
        };

        let mut location = None;
        match &token {
            Token::StartTag { name, .. } => {
                self.last_start_tag_name = Some(name.clone());
                location = self.current_location();
            }
            Token::EndTag {
                attributes,
                self_closing,
                ..
            } => {
                // "When an end tag token is emitted with attributes, that is an
                // end-tag-with-attributes parse error."
                if !attributes.is_empty() {
                    self.parse_error(ParseErrorCode::EndTagWithAttributes);
                }
                // "When an end tag token is emitted with its self-closing flag set,
                // that is an end-tag-with-trailing-solidus parse error."
                if *self_closing {
                    self.parse_error(ParseErrorCode::EndTagWithTrailingSolidus);
                }
                location = self.current_location();
            }
            _ => {}
        }

        self.flush_pending_characters();
        self.push_token(token, location);
    }

    fn current_location(&mut self) -> Option<SourceLocation> {
        if !self.track_locations {
            return None;
        }
        let start_offset = self.token_start;
        let (line, column) = self.input.line_and_column(start_offset);
        Some(SourceLocation {
            start_offset,
            end_offset: self.input.position(),
            line,
            column,
        })
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof(&mut self) {
        self.flush_pending_characters();
        self.push_token(Token::EndOfFile, None);
        self.eof_emitted = true;
    }

    /// Emit the current (comment or DOCTYPE) token followed by end-of-file.
    pub(super) fn emit_current_token_and_eof(&mut self) {
        self.emit_current_token();
        self.emit_eof();
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        match (&self.last_start_tag_name, &self.current_token) {
            (Some(last), Some(Token::EndTag { name, .. })) => name == last,
            _ => false,
        }
    }

    /// The "anything else" branch shared by the RCDATA, RAWTEXT, script data
    /// and script data escaped end tag name states:
    ///
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character
    /// token, and a character token for each of the characters in the temporary
    /// buffer (in the order they were added to the buffer). Reconsume in the
    /// X state."
    pub(super) fn end_tag_name_anything_else(&mut self, text_state: TokenizerState) {
        self.current_token = None;
        self.emit_char('<');
        self.emit_char('/');
        let buffer = std::mem::take(&mut self.temporary_buffer);
        self.emit_str(&buffer);
        self.reconsume_in(text_state);
    }

    /// The whitespace, `/` and `>` branches shared by the end tag name states.
    /// Returns `false` when the end tag is not appropriate and the caller must
    /// fall through to "anything else".
    pub(super) fn finish_appropriate_end_tag_name(&mut self, c: char) -> bool {
        if !self.is_appropriate_end_tag_token() {
            return false;
        }
        match c {
            '/' => self.switch_to(TokenizerState::SelfClosingStartTag),
            '>' => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            _ => self.switch_to(TokenizerState::BeforeAttributeName),
        }
        true
    }

    /// "Append the lowercase version of the current input character to the
    /// current tag token's tag name. Append the current input character to the
    /// temporary buffer."
    pub(super) fn append_to_end_tag_name(&mut self, c: char) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_to_tag_name(c.to_ascii_lowercase());
        }
        self.temporary_buffer.push(c);
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Start a new attribute in the current tag token. Set that attribute's
    /// name and value to the empty string."
    pub(super) fn start_new_attribute(&mut self) {
        self.commit_current_attribute();
        self.current_attribute = Some(Attribute::default());
    }

    /// Move the attribute being built onto the tag token.
    ///
    /// "When the user agent leaves the attribute name state... if there is
    /// already an attribute on the token with the exact same name, then this
    /// is a duplicate-attribute parse error and the new attribute must be
    /// removed from the token."
    fn commit_current_attribute(&mut self) {
        let Some(attribute) = self.current_attribute.take() else {
            return;
        };
        let added = self
            .current_token
            .as_mut()
            .is_none_or(|token| token.push_attribute(attribute));
        if !added {
            self.parse_error(ParseErrorCode::DuplicateAttribute);
        }
    }

    pub(super) fn append_to_attribute_name(&mut self, c: char) {
        if let Some(attribute) = self.current_attribute.as_mut() {
            attribute.name.push(c);
        }
    }

    pub(super) fn append_to_attribute_value(&mut self, c: char) {
        if let Some(attribute) = self.current_attribute.as_mut() {
            attribute.value.push(c);
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Records a parse error. Tokenization continues with the state's fallback.
    pub(super) fn parse_error(&mut self, code: ParseErrorCode) {
        let offset = self.input.position();
        log::debug!(target: "weft_html::tokenizer", "{code} at offset {offset}");
        warn_once("HTML Tokenizer", code.into());
        self.issues.push(ParseIssue { code, offset });
    }
}
