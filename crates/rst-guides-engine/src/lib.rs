//! # rst-guides engine
//!
//! Parses reStructuredText guides into a typed node tree. A [`Parser`] reads
//! one document at a time; each parse fills its own [`Environment`], which a
//! [`DocumentSet`] merges in a second pass to link documents together.
//!
//! ## Modules
//!
//! - **`parsing`**: block state machine, inline span parser and resolution
//! - **`directives`**: the directive trait, registry and built-in handlers
//! - **`environment`**: per-parse state and the second-pass document set
//! - **`models`**: `Node`, `NodeKind` and `Document`
//! - **`io`**: source origins and URL generation
//! - **`error`**: error types and diagnostics

pub mod directives;
pub mod environment;
pub mod error;
pub mod io;
pub mod models;
pub mod parsing;

// Re-export key types for easier usage
pub use directives::{BodyMode, Directive, DirectiveRegistry, Invocation};
pub use environment::{DocumentSet, Environment};
pub use error::{Diagnostic, DirectiveError, OriginError, ParseError, Severity};
pub use io::{FsOrigin, MemoryOrigin, RelativeUrlGenerator, SourceOrigin, UrlGenerator};
pub use models::{Document, Node, NodeKind};
pub use parsing::Parser;
pub use parsing::inline::{InlineNode, SpanNode};
pub use rst_guides_config::ParserConfig;
