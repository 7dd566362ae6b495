//! # Block Parsing
//!
//! A line-oriented state machine. The driver offers every line to the
//! active state; when the state rejects it, the state is left (emitting its
//! node) and the line is classified again to pick the next state.
//!
//! ## Modules
//!
//! - **`buffer`**: `Buffer`, the raw lines a state has accepted
//! - **`classify`**: pure line predicates (blank, comment, directive, adornment...)
//! - **`kinds`**: block markup with owned delimiters (adornments, list markers,
//!   directive lines, link targets)
//! - **`states`**: the closed `State` enum and per-state acceptance rules
//! - **`table`**: grid and simple table parsing
//! - **`line_data`**: definition list term/definition splitting
//! - **`builder`**: `BlockBuilder`, the driver that turns states into nodes
//!
//! ## Key Invariants
//!
//! - A rejected line is never lost: it seeds the next state
//! - Inline parsing happens when a state is left, never while buffering
//! - Nested blocks (quotes, list items, definitions, directive bodies) are
//!   parsed recursively with their common indentation removed

pub mod buffer;
pub mod builder;
pub mod classify;
pub mod kinds;
pub mod line_data;
pub mod states;
pub mod table;

pub use buffer::Buffer;
pub use builder::BlockBuilder;
pub use states::State;
pub use table::{RawTable, TableMode, parse_table};
