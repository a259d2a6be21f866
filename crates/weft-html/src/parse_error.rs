//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! "This specification defines the parsing rules for HTML documents, whether
//! they are syntactically correct or not." Parse errors never stop the parser;
//! they are collected for diagnostics only.

use strum_macros::{Display, IntoStaticStr};

/// A parse error code. Tokenizer codes use the WHATWG names; tree construction
/// codes name the recovery that was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum ParseErrorCode {
    // Tokenization
    AbruptClosingOfEmptyComment,
    AbruptDoctypePublicIdentifier,
    AbruptDoctypeSystemIdentifier,
    AbsenceOfDigitsInNumericCharacterReference,
    CdataInHtmlContent,
    CharacterReferenceOutsideUnicodeRange,
    ControlCharacterReference,
    DuplicateAttribute,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    EofBeforeTagName,
    EofInCdata,
    EofInComment,
    EofInDoctype,
    EofInScriptHtmlCommentLikeText,
    EofInTag,
    IncorrectlyClosedComment,
    IncorrectlyOpenedComment,
    InvalidCharacterSequenceAfterDoctypeName,
    InvalidFirstCharacterOfTagName,
    MissingAttributeValue,
    MissingDoctypeName,
    MissingDoctypePublicIdentifier,
    MissingDoctypeSystemIdentifier,
    MissingEndTagName,
    MissingQuoteBeforeDoctypePublicIdentifier,
    MissingQuoteBeforeDoctypeSystemIdentifier,
    MissingSemicolonAfterCharacterReference,
    MissingWhitespaceAfterDoctypePublicKeyword,
    MissingWhitespaceAfterDoctypeSystemKeyword,
    MissingWhitespaceBeforeDoctypeName,
    MissingWhitespaceBetweenAttributes,
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    NestedComment,
    NoncharacterCharacterReference,
    NullCharacterReference,
    SurrogateCharacterReference,
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    UnexpectedCharacterInAttributeName,
    UnexpectedCharacterInUnquotedAttributeValue,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedNullCharacter,
    UnexpectedQuestionMarkInsteadOfTagName,
    UnexpectedSolidusInTag,
    UnknownNamedCharacterReference,

    // Tree construction
    MissingDoctype,
    NonConformingDoctype,
    MisplacedDoctype,
    MisplacedStartTagForHeadElement,
    AbandonedHeadElementChild,
    NestedNoscriptInHead,
    DisallowedContentInNoscriptInHead,
    EndTagWithoutMatchingOpenElement,
    ClosingOfElementWithOpenChildElements,
    MisnestedFormattingElement,
    FosterParentedContent,
    NonVoidHtmlElementStartTagWithTrailingSolidus,
    EofInElementThatCanContainOnlyText,
    OpenElementsLeftAfterEof,
    UnexpectedStartTag,
    UnexpectedEndTag,
    UnexpectedTokenAfterBody,
    UnexpectedTokenInTable,
    UnexpectedTokenInSelect,
    UnexpectedTokenInFrameset,
    UnexpectedTokenInForeignContent,
}

/// One recorded parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What went wrong.
    pub code: ParseErrorCode,
    /// Raw input offset (in code points) where the error was detected.
    pub offset: usize,
}

impl ParseIssue {
    /// The WHATWG-style error name, e.g. `duplicate-attribute`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.code.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_render_in_kebab_case() {
        assert_eq!(ParseErrorCode::EofInTag.to_string(), "eof-in-tag");
        assert_eq!(
            ParseErrorCode::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers.to_string(),
            "missing-whitespace-between-doctype-public-and-system-identifiers"
        );
        let issue = ParseIssue {
            code: ParseErrorCode::DuplicateAttribute,
            offset: 3,
        };
        assert_eq!(issue.name(), "duplicate-attribute");
    }
}
