//! Batch orchestration: many geometries in, unique labeled records out.
//!
//! [`run_batch`] fans geometries out over a worker pool, runs enumeration and resolution on
//! each, labels every surviving candidate by comparing its canonical identifier with that of
//! the source geometry, and merges everything into one [`BatchReport`]. Identifiers come from
//! an [`Oracle`], either a closure ([`FnOracle`]) or an external program ([`CommandOracle`]).

mod error;
mod oracle;
mod pipeline;

pub use oracle::{CommandOracle, FnOracle, Oracle};

pub use pipeline::{
    BatchConfig, BatchReport, BatchStats, ElementPolicy, run_batch, run_batch_with_progress,
};

pub use error::Error;
