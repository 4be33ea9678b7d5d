//! Validation engine, format registry and the error store.

mod errors;
mod formats;
mod validators;

pub use errors::{ErrorRecord, ErrorStore, FieldSlot, RowLocation};
pub use formats::{Coercion, CoercionFailed, FormatRegistry};
pub use validators::{
    AllowedFieldsValidator, FieldCountValidator, FormatValidator, NotNullValidator,
    RequiredValidator, UniquenessValidator, ValidationEngine, Validator,
};
