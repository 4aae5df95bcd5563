//! Output destinations for generated VCF text
//!
//! `DataSink` is the write counterpart to [`DataSource`](super::DataSource):
//! generated lines go either to a local file or to standard output, and the
//! file extension decides whether the output is block-compressed.
//!
//! # Example
//!
//! ```no_run
//! use vcfake::io::DataSink;
//!
//! // BGZF-compressed file
//! let sink = DataSink::from_path("fake.vcf.gz");
//! assert!(sink.is_compressed());
//!
//! // Plain text on stdout
//! let sink = DataSink::stdout();
//! assert!(!sink.is_compressed());
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

/// Output destination for streaming writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSink {
    /// Write to a local file path
    ///
    /// `.gz`, `.bgz` and `.gzip` paths are BGZF-compressed, anything else is
    /// written as plain text.
    Local(PathBuf),

    /// Write to standard output, always uncompressed
    Stdout,
}

impl DataSink {
    /// Create a sink from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::Local(path.as_ref().to_path_buf())
    }

    /// Create a sink for standard output
    pub fn stdout() -> Self {
        Self::Stdout
    }

    /// File sink when a path is given, stdout otherwise
    pub fn from_optional_path<P: AsRef<Path>>(path: Option<P>) -> Self {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::Stdout,
        }
    }

    /// Get the file extension if this is a local file sink
    pub(crate) fn extension(&self) -> Option<&str> {
        match self {
            Self::Local(path) => path.extension().and_then(|s| s.to_str()),
            Self::Stdout => None,
        }
    }

    /// Check if this sink represents a compressed output
    pub fn is_compressed(&self) -> bool {
        matches!(self.extension(), Some("gz") | Some("bgz") | Some("gzip"))
    }
}

impl fmt::Display for DataSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Stdout => f.write_str("<stdout>"),
        }
    }
}
