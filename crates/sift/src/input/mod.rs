//! Input parsing: dialect sniffing and table reading.

mod reader;
mod sniffer;
mod source;

pub use reader::{RawRow, TableReader, strip_bom};
pub use sniffer::{DEFAULT_DELIMITER, DEFAULT_QUOTE, DELIMITERS, Dialect, detect_delimiter, detect_quote};
pub use source::{DataTable, SourceMetadata};
