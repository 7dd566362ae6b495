//! Inline construct kinds. Each owns its delimiters and recognition rules.

pub mod hyperlink;
pub mod literal;
pub mod role;
pub mod substitution;

pub use hyperlink::{StandaloneLink, push_text};
pub use literal::Literal;
pub use role::{Role, RoleMatch};
pub use substitution::Substitution;
