//! Character reference states of the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//! through
//! [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)

use super::core::{HTMLTokenizer, TokenizerState};
use super::named_character_references::{ENTITY_TRIE, EntityTrie};
use super::preprocessor::is_noncharacter;
use crate::parse_error::ParseErrorCode;

/// [§ 13.2.5.80](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column."
const C1_REPLACEMENTS: [(u32, u32); 27] = [
    (0x80, 0x20AC),
    (0x82, 0x201A),
    (0x83, 0x0192),
    (0x84, 0x201E),
    (0x85, 0x2026),
    (0x86, 0x2020),
    (0x87, 0x2021),
    (0x88, 0x02C6),
    (0x89, 0x2030),
    (0x8A, 0x0160),
    (0x8B, 0x2039),
    (0x8C, 0x0152),
    (0x8E, 0x017D),
    (0x91, 0x2018),
    (0x92, 0x2019),
    (0x93, 0x201C),
    (0x94, 0x201D),
    (0x95, 0x2022),
    (0x96, 0x2013),
    (0x97, 0x2014),
    (0x98, 0x02DC),
    (0x99, 0x2122),
    (0x9A, 0x0161),
    (0x9B, 0x203A),
    (0x9C, 0x0153),
    (0x9E, 0x017E),
    (0x9F, 0x0178),
];

impl HTMLTokenizer {
    /// Returns true if the return state is an attribute value state.
    /// "consumed as part of an attribute"
    pub(super) const fn is_consumed_as_part_of_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                TokenizerState::AttributeValueDoubleQuoted
                    | TokenizerState::AttributeValueSingleQuoted
                    | TokenizerState::AttributeValueUnquoted
            )
        )
    }

    /// "Flush code points consumed as a character reference"
    ///
    /// "If the character reference was consumed as part of an attribute, then
    /// append each character to the current attribute's value. Otherwise, emit
    /// each character as a character token."
    pub(super) fn flush_code_points_consumed_as_character_reference(&mut self) {
        let buffer = std::mem::take(&mut self.temporary_buffer);
        if self.is_consumed_as_part_of_attribute() {
            for c in buffer.chars() {
                self.append_to_attribute_value(c);
            }
        } else {
            self.emit_str(&buffer);
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    pub(super) fn handle_character_reference_state(&mut self) {
        // "Set the temporary buffer to the empty string. Append a U+0026
        // AMPERSAND (&) character to the temporary buffer."
        self.temporary_buffer.clear();
        self.temporary_buffer.push('&');

        match self.current_input_character {
            // "ASCII alphanumeric: Reconsume in the named character reference state."
            Some(c) if c.is_ascii_alphanumeric() => {
                self.reconsume_in(TokenizerState::NamedCharacterReference);
            }
            // "U+0023 NUMBER SIGN (#): Append the current input character to the
            // temporary buffer. Switch to the numeric character reference state."
            Some('#') => {
                self.temporary_buffer.push('#');
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            // "Flush code points consumed as a character reference. Reconsume in
            // the return state."
            _ => {
                self.flush_code_points_consumed_as_character_reference();
                self.reconsume_in(self.current_return_state());
            }
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the consumed
    /// characters are one of the identifiers in the first column of the named
    /// character references table. Append each character to the temporary
    /// buffer when it's consumed."
    ///
    /// Entered by reconsuming, so the current input character is the first
    /// character of the candidate name. The trie is walked one code point at a
    /// time; anything read past the longest match is handed back to the input.
    pub(super) fn handle_named_character_reference_state(&mut self) {
        let Some(first) = self.current_input_character else {
            return self.named_reference_without_match(0);
        };

        let mut consumed = vec![first];
        let mut best: Option<(usize, &'static str)> = None;
        let mut node = ENTITY_TRIE.child(EntityTrie::ROOT, first);

        while let Some(current) = node {
            if let Some(value) = ENTITY_TRIE.value(current) {
                best = Some((consumed.len(), value));
            }
            if !ENTITY_TRIE.has_children(current) {
                break;
            }
            match self.input.advance_and_peek() {
                Some(c) => {
                    consumed.push(c);
                    node = ENTITY_TRIE.child(current, c);
                }
                None if self.input.is_last_chunk_written() => break,
                // A longer name may still follow in the next chunk.
                None => {
                    self.give_back(consumed.len() - 1);
                    return self.wait_for_more_input();
                }
            }
        }

        let Some((length, value)) = best else {
            return self.named_reference_without_match(consumed.len() - 1);
        };
        self.give_back(consumed.len() - length);

        let ends_with_semicolon = consumed[length - 1] == ';';
        self.temporary_buffer.extend(&consumed[..length]);

        // "If the character reference was consumed as part of an attribute, and
        // the last character matched is not a U+003B SEMICOLON character (;), and
        // the next input character is either a U+003D EQUALS SIGN character (=)
        // or an ASCII alphanumeric, then, for historical reasons, flush code
        // points consumed as a character reference and switch to the return state."
        if self.is_consumed_as_part_of_attribute() && !ends_with_semicolon {
            match self.input.peek(0) {
                Some(c) if c == '=' || c.is_ascii_alphanumeric() => {
                    self.flush_code_points_consumed_as_character_reference();
                    self.switch_to(self.current_return_state());
                    return;
                }
                None if !self.input.is_last_chunk_written() => {
                    self.temporary_buffer.truncate(1);
                    self.give_back(length - 1);
                    return self.wait_for_more_input();
                }
                _ => {}
            }
        }

        // "If the last character matched is not a U+003B SEMICOLON character (;),
        // then this is a missing-semicolon-after-character-reference parse error."
        if !ends_with_semicolon {
            self.parse_error(ParseErrorCode::MissingSemicolonAfterCharacterReference);
        }

        // "Set the temporary buffer to the empty string. Append one or two
        // characters corresponding to the character reference name (as given by
        // the second column of the named character references table) to the
        // temporary buffer. Flush code points consumed as a character reference.
        // Switch to the return state."
        self.temporary_buffer.clear();
        self.temporary_buffer.push_str(value);
        self.flush_code_points_consumed_as_character_reference();
        self.switch_to(self.current_return_state());
    }

    /// "Otherwise: Flush code points consumed as a character reference. Switch
    /// to the ambiguous ampersand state."
    ///
    /// The current input character has not been matched, so it is reconsumed.
    fn named_reference_without_match(&mut self, extra: usize) {
        self.give_back(extra);
        self.flush_code_points_consumed_as_character_reference();
        self.reconsume_in(TokenizerState::AmbiguousAmpersand);
    }

    fn give_back(&mut self, count: usize) {
        for _ in 0..count {
            self.input.retreat();
        }
    }

    /// [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    pub(super) fn handle_ambiguous_ampersand_state(&mut self) {
        match self.current_input_character {
            // "If the character reference was consumed as part of an attribute,
            // then append the current input character to the current attribute's
            // value. Otherwise, emit the current input character as a character token."
            Some(c) if c.is_ascii_alphanumeric() => {
                if self.is_consumed_as_part_of_attribute() {
                    self.append_to_attribute_value(c);
                } else {
                    self.emit_char(c);
                }
            }
            // "This is an unknown-named-character-reference parse error. Reconsume
            // in the return state."
            Some(';') => {
                self.parse_error(ParseErrorCode::UnknownNamedCharacterReference);
                self.reconsume_in(self.current_return_state());
            }
            _ => self.reconsume_in(self.current_return_state()),
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    pub(super) fn handle_numeric_character_reference_state(&mut self) {
        // "Set the character reference code to zero (0)."
        self.character_reference_code = 0;

        match self.current_input_character {
            // "U+0078 LATIN SMALL LETTER X, U+0058 LATIN CAPITAL LETTER X: Append
            // the current input character to the temporary buffer. Switch to the
            // hexadecimal character reference start state."
            Some(c @ ('x' | 'X')) => {
                self.temporary_buffer.push(c);
                self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
            }
            _ => self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart),
        }
    }

    /// [§ 13.2.5.76 Hexadecimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state)
    pub(super) fn handle_hexadecimal_character_reference_start_state(&mut self) {
        if self.current_input_character.is_some_and(|c| c.is_ascii_hexdigit()) {
            self.reconsume_in(TokenizerState::HexadecimalCharacterReference);
        } else {
            self.absence_of_digits();
        }
    }

    /// [§ 13.2.5.77 Decimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state)
    pub(super) fn handle_decimal_character_reference_start_state(&mut self) {
        if self.current_input_character.is_some_and(|c| c.is_ascii_digit()) {
            self.reconsume_in(TokenizerState::DecimalCharacterReference);
        } else {
            self.absence_of_digits();
        }
    }

    /// "This is an absence-of-digits-in-numeric-character-reference parse error.
    /// Flush code points consumed as a character reference. Reconsume in the
    /// return state."
    fn absence_of_digits(&mut self) {
        self.parse_error(ParseErrorCode::AbsenceOfDigitsInNumericCharacterReference);
        self.flush_code_points_consumed_as_character_reference();
        self.reconsume_in(self.current_return_state());
    }

    /// [§ 13.2.5.78 Hexadecimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state)
    pub(super) fn handle_hexadecimal_character_reference_state(&mut self) {
        match self.current_input_character {
            // "Multiply the character reference code by 16. Add a numeric version
            // of the current input character to the character reference code."
            Some(c) if c.is_ascii_hexdigit() => {
                self.accumulate_digit(16, c);
            }
            Some(';') => self.end_numeric_character_reference(true),
            _ => self.end_numeric_character_reference(false),
        }
    }

    /// [§ 13.2.5.79 Decimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state)
    pub(super) fn handle_decimal_character_reference_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_digit() => self.accumulate_digit(10, c),
            Some(';') => self.end_numeric_character_reference(true),
            _ => self.end_numeric_character_reference(false),
        }
    }

    /// Saturates just above U+10FFFF so long digit runs cannot overflow; the
    /// end state treats anything that large as out of range either way.
    fn accumulate_digit(&mut self, radix: u32, c: char) {
        let digit = c.to_digit(radix).unwrap_or(0);
        self.character_reference_code = self
            .character_reference_code
            .saturating_mul(radix)
            .saturating_add(digit)
            .min(0x11_0000);
    }

    /// "U+003B SEMICOLON: Switch to the numeric character reference end state."
    /// "Anything else: This is a missing-semicolon-after-character-reference
    /// parse error. Reconsume in the numeric character reference end state."
    fn end_numeric_character_reference(&mut self, semicolon: bool) {
        if !semicolon {
            self.parse_error(ParseErrorCode::MissingSemicolonAfterCharacterReference);
        }
        self.finish_numeric_character_reference();
        if semicolon {
            self.switch_to(self.current_return_state());
        } else {
            self.reconsume_in(self.current_return_state());
        }
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    ///
    /// "Check the character reference code" and flush the resulting character.
    pub(super) fn finish_numeric_character_reference(&mut self) {
        let mut code = self.character_reference_code;

        if code == 0 {
            // "If the number is 0x00, then this is a null-character-reference
            // parse error. Set the character reference code to 0xFFFD."
            self.parse_error(ParseErrorCode::NullCharacterReference);
            code = 0xFFFD;
        } else if code > 0x10_FFFF {
            // "If the number is greater than 0x10FFFF, then this is a
            // character-reference-outside-unicode-range parse error."
            self.parse_error(ParseErrorCode::CharacterReferenceOutsideUnicodeRange);
            code = 0xFFFD;
        } else if (0xD800..=0xDFFF).contains(&code) {
            // "If the number is a surrogate, then this is a
            // surrogate-character-reference parse error."
            self.parse_error(ParseErrorCode::SurrogateCharacterReference);
            code = 0xFFFD;
        } else if is_noncharacter(code) {
            // "If the number is a noncharacter, then this is a
            // noncharacter-character-reference parse error."
            self.parse_error(ParseErrorCode::NoncharacterCharacterReference);
        } else if code == 0x0D || (is_control(code) && !is_ascii_whitespace(code)) {
            // "If the number is 0x0D, or a control that's not ASCII whitespace,
            // then this is a control-character-reference parse error."
            self.parse_error(ParseErrorCode::ControlCharacterReference);
            if let Some(&(_, replacement)) = C1_REPLACEMENTS.iter().find(|(from, _)| *from == code) {
                code = replacement;
            }
        }

        // "Set the temporary buffer to the empty string. Append a code point equal
        // to the character reference code to the temporary buffer. Flush code
        // points consumed as a character reference."
        self.temporary_buffer.clear();
        self.temporary_buffer
            .push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
        self.flush_code_points_consumed_as_character_reference();
    }
}

/// [Infra § control](https://infra.spec.whatwg.org/#control):
/// "A C0 control or a code point in the range U+007F DELETE to U+009F
/// APPLICATION PROGRAM COMMAND, inclusive."
const fn is_control(code: u32) -> bool {
    matches!(code, 0..=0x1F | 0x7F..=0x9F)
}

const fn is_ascii_whitespace(code: u32) -> bool {
    matches!(code, 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}

#[cfg(test)]
mod tests {
    use super::super::token::Token;
    use super::*;

    fn text_of(input: &str) -> String {
        HTMLTokenizer::new(input)
            .run()
            .into_iter()
            .filter_map(|token| match token {
                Token::Character { data } | Token::Whitespace { data } | Token::NullCharacter { data } => {
                    Some(data)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_c1_controls_are_remapped() {
        assert_eq!(text_of("&#x80;"), "\u{20AC}");
        assert_eq!(text_of("&#150;"), "\u{2013}");
        // 0x81 has no mapping and is kept.
        assert_eq!(text_of("&#x81;"), "\u{81}");
    }

    #[test]
    fn test_invalid_numeric_references_become_replacement() {
        assert_eq!(text_of("&#0;"), "\u{FFFD}");
        assert_eq!(text_of("&#xD800;"), "\u{FFFD}");
        assert_eq!(text_of("&#x110000;"), "\u{FFFD}");
        assert_eq!(text_of("&#99999999999999999999;"), "\u{FFFD}");
    }

    #[test]
    fn test_noncharacter_reference_is_kept() {
        let mut tokenizer = HTMLTokenizer::new("&#xFFFE;");
        let tokens = tokenizer.run();
        assert_eq!(tokens[0], Token::Character { data: "\u{FFFE}".into() });
        assert_eq!(
            tokenizer.take_issues()[0].code,
            ParseErrorCode::NoncharacterCharacterReference
        );
    }

    #[test]
    fn test_missing_digits_flushes_prefix() {
        assert_eq!(text_of("&#;"), "&#;");
        assert_eq!(text_of("&#xg"), "&#xg");
    }
}
