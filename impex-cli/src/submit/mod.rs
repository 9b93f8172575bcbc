//! Submission of spreadsheet records to the plant service
//!
//! Records are translated to outgoing fields, coded fields are resolved
//! through the relationship matrix, and the result is sent in batches.

mod batch;
mod pipeline;
mod resolve;
mod translate;

pub use batch::{ConfirmRecord, DeleteRecord, SubmitRecord, batches};
pub use pipeline::{DEFAULT_BATCH_SIZE, SubmitOptions, SubmitSummary, Submitter};
pub use resolve::{CodeResolver, MatrixCache, ResolverFields};
pub use translate::{
    DISPLAY_NAME_FIELDS, FieldTranslator, SYSTEM_FIELDS, SubmitField, TranslationOptions,
};
