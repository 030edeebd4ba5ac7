//! Text boundary of the pipeline: XYZ geometry input and CSV record output.
//!
//! Readers attach the source path and line number to every failure so a single malformed
//! file can be reported and skipped without aborting a batch.

mod csv;
mod error;
mod xyz;

pub use xyz::read as read_xyz;
pub use xyz::{to_string as xyz_to_string, write as write_xyz};

pub use csv::{HEADER as CSV_HEADER, write_records as write_csv_records};

pub use error::Error;
