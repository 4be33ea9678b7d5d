//! Sift: load, normalize and validate delimited text tables.
//!
//! A table is read once. The delimiter and quote character are sniffed when
//! not given, the header is normalized, and an ordered set of validation
//! passes records every problem in an error store keyed by row and field.
//! Loading never fails because of bad data; only configuration problems and
//! unreadable input are returned as errors.
//!
//! # Example
//!
//! ```
//! use sift::{Options, RowLocation, Sift};
//!
//! let options = Options::default()
//!     .with_required("id")
//!     .with_format("amount", "float");
//!
//! let sift = Sift::from_data("id;amount\n1;15,872\n;x", options).unwrap();
//!
//! assert_eq!(sift.row(1).unwrap(), &["1", "15.872"]);
//! assert!(sift.has_error(Some(RowLocation::Row(1)), Some(&"id".into())));
//! assert_eq!(sift.errors_count(None), 2);
//! ```

pub mod error;
pub mod input;
pub mod options;
pub mod schema;
pub mod validation;

mod sift;

pub use crate::sift::{AssociativeOptions, AssociativeRow, Sift};
pub use error::{Result, SiftError};
pub use input::{DataTable, Dialect, SourceMetadata};
pub use options::{EmptyValue, FormatRule, Options};
pub use schema::{FieldRef, Header, HeaderOptions};
pub use validation::{ErrorRecord, ErrorStore, FieldSlot, FormatRegistry, RowLocation};
