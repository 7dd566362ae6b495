pub mod adornment;
pub mod directive_line;
pub mod link_target;
pub mod list_marker;

pub use adornment::Adornment;
pub use directive_line::{DirectiveLine, parse_option};
pub use link_target::LinkTarget;
pub use list_marker::{EnumFormat, EnumStyle, ListMarker, MarkerKind};
