pub mod lines;
pub mod span;

pub use lines::{LineRef, Lines, lines_with_spans};
pub use span::Span;
