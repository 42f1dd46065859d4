pub mod group;
pub mod strings;

pub use group::group_adjacent;
pub use strings::{collapse_whitespace, make_valid_xml, substitute_placeholders};
