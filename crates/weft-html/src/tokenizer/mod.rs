//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard, on top of the input stream
//! preprocessing of [§ 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream).

/// Character reference states per § 13.2.5.72-80.
pub mod character_reference;
/// HTML tokenizer state machine implementation.
pub mod core;
/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// Named character reference table and trie per § 13.5.
pub mod named_character_references;
/// Newline normalization and the streaming input buffer.
pub mod preprocessor;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::{HTMLTokenizer, SourceLocation, TokenizerState};
pub use preprocessor::Preprocessor;
pub use token::{Attribute, CharacterClass, Token};
