//! Canonical error type for geometry and record I/O.
//!
//! Filesystem failures and malformed text are folded into one `Error` enum so the batch
//! pipeline can count a bad input as malformed without caring which layer produced it.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading geometries or writing labeled records.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper around operating-system level I/O failures.
    #[error(
        "I/O error for {path_desc}: {source}",
        path_desc = PathDisplay(path)
    )]
    Io {
        /// Path to the file involved in the failed operation, if any.
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// An input line could not be parsed into the expected record.
    #[error(
        "failed to parse {format} {path_desc}: {details} (line {line_number})",
        path_desc = PathDisplay(path)
    )]
    Parse {
        /// Name of the textual format (e.g., `"XYZ"`).
        format: &'static str,
        path: Option<PathBuf>,
        /// One-based line number where parsing failed.
        line_number: usize,
        details: String,
    },

    /// Logical inconsistencies such as a header atom count that disagrees with the body.
    #[error(
        "inconsistent data in {format} {path_desc}: {details}",
        path_desc = PathDisplay(path)
    )]
    InconsistentData {
        format: &'static str,
        path: Option<PathBuf>,
        details: String,
    },
}

impl Error {
    /// Constructs an [`Error::Io`] variant from a standard I/O error.
    ///
    /// # Arguments
    ///
    /// * `source` - The original `std::io::Error` emitted by the OS or runtime.
    /// * `path` - Optional file path associated with the operation.
    pub fn from_io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { path, source }
    }

    /// Builds an [`Error::Parse`] variant with consistent messaging.
    ///
    /// # Arguments
    ///
    /// * `format` - Name of the textual format being parsed.
    /// * `path` - Optional path pointing to the input file.
    /// * `line_number` - Line where the failure occurred (1-indexed).
    /// * `details` - Additional context about the parsing problem.
    pub fn parse(
        format: &'static str,
        path: Option<PathBuf>,
        line_number: usize,
        details: impl Into<String>,
    ) -> Self {
        Self::Parse {
            format,
            path,
            line_number,
            details: details.into(),
        }
    }

    /// Creates an [`Error::InconsistentData`] describing logical mismatches.
    pub fn inconsistent_data(
        format: &'static str,
        path: Option<PathBuf>,
        details: impl Into<String>,
    ) -> Self {
        Self::InconsistentData {
            format,
            path,
            details: details.into(),
        }
    }
}

/// Lightweight formatter for optional paths used in error messages.
///
/// When a path is present it prints `file '<path>'`; otherwise it emits `stream source` so
/// error messages remain grammatically consistent.
struct PathDisplay<'a>(&'a Option<PathBuf>);

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "file '{}'", p.display()),
            None => write!(f, "stream source"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_mentions_path_and_line() {
        let err = Error::parse("XYZ", Some(PathBuf::from("mol.xyz")), 3, "bad coordinate");
        let message = err.to_string();
        assert!(message.contains("file 'mol.xyz'"));
        assert!(message.contains("line 3"));
    }

    #[test]
    fn missing_path_reads_as_stream_source() {
        let err = Error::inconsistent_data("XYZ", None, "2 atoms declared, 1 found");
        assert!(err.to_string().contains("stream source"));
    }
}
