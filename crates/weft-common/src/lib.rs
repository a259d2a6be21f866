//! Common utilities for the weft parser crates.
//!
//! This crate provides shared infrastructure used by all parser components:
//! - **Warning System** - de-duplicated diagnostics routed through the `log` facade

pub mod warning;
