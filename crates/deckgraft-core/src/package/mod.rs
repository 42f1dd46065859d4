pub mod content_types;
pub mod parts;
pub mod relationships;
pub mod store;

pub use content_types::{ContentTypeDeclaration, ContentTypeRegistry};
pub use parts::Part;
pub use relationships::{Relationship, RelationshipTable, TargetMode};
pub use store::Package;
