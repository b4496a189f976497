//! Roster Ingest Library
//!
//! The CPU-side of the employee upload pipeline:
//!
//! - [`RecordParser`]: CSV bytes to candidate records, failing on the first bad row
//! - [`BatchValidator`]: all-or-nothing completeness and uniqueness checks
//! - [`UploadGuard`]: rejects concurrent uploads that declare the same name
//!
//! Persistence lives in `roster-server`; nothing here touches a store.
//!
//! # Example
//!
//! ```
//! use roster_ingest::parse_and_validate;
//!
//! let csv = "id,login,name,salary\n1,john,John Doe,5000.00\n#2,x,y,0\n";
//! let batch = parse_and_validate(csv.as_bytes()).unwrap();
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch.comments_skipped(), 1);
//! ```

pub mod encoding;
pub mod guard;
pub mod parser;
pub mod validator;

pub use guard::{ConcurrentUploadError, UploadGuard, UploadPermit};
pub use parser::{ParseError, RecordParser};
pub use validator::{BatchRejection, BatchValidator, ValidatedBatch};

use std::io::Read;

/// Failure of [`parse_and_validate`]
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("One or more rows fail validation. The entire file is rejected.")]
    Rejected(#[from] BatchRejection),
}

/// Parse `reader` with the default comma-delimited parser and validate the
/// resulting batch.
pub fn parse_and_validate<R: Read>(reader: R) -> Result<ValidatedBatch, IngestError> {
    let rows = RecordParser::new().parse(reader)?;
    Ok(BatchValidator::new().validate(rows)?)
}
