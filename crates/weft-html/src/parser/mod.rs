//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! The tree constructor: insertion modes, the stack of open elements, the
//! list of active formatting elements and the algorithms that share them.

mod adoption_agency;
mod core;
pub mod doctype;
pub mod foreign_content;
pub mod formatting_elements;
mod modes;
pub mod open_elements;

pub use self::core::{HTMLParser, InsertionLocation, InsertionMode, ParserStep};
pub use self::formatting_elements::{ActiveFormattingList, FormattingEntry};
pub use self::open_elements::{OpenElement, OpenElements};
