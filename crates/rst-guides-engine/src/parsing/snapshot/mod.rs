//! Deterministic views of parsed trees, used by tests and debugging tools.
//!
//! ## Modules
//!
//! - **`normalize`**: an indented text outline of a node tree
//! - **`invariants`**: structural checks every parsed tree must pass

pub mod invariants;
pub mod normalize;

pub use invariants::{InvariantViolation, check_invariants};
pub use normalize::{outline, outline_string};
