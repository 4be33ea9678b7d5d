//! Header processing and column references.

mod field;
mod header;

pub use field::{FieldRef, FieldResolver, Resolved};
pub use header::{Header, HeaderOptions};
