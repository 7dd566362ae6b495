//! # Inline Parsing
//!
//! Turns a run of text (a paragraph, a title, a table cell) into a
//! [`SpanNode`] of [`InlineNode`]s.
//!
//! ## Modules
//!
//! - **`cursor`**: char-level cursor used by the pre-passes
//! - **`kinds`**: one unit struct per inline construct, owning its delimiters
//! - **`lexer`**: Logos lexer for the token walk
//! - **`parser`**: the span parser proper
//! - **`tokens`**: placeholder bookkeeping
//! - **`types`**: the inline node model

pub mod cursor;
pub mod kinds;
pub mod lexer;
pub mod parser;
pub mod tokens;
pub mod types;

pub use parser::{SpanParser, parse_span};
pub use types::{
    CrossReference, InlineNode, Link, LinkRef, ResolvedReference, SpanNode, SpanToken,
    SpanTokenKind, TokenPayload,
};
