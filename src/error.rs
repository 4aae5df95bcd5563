//! Error types for vcfake

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vcfake operations
pub type Result<T> = std::result::Result<T, VcfakeError>;

/// Error types that can occur in vcfake
#[derive(Debug, Error)]
pub enum VcfakeError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid generation parameter
    #[error("Invalid configuration for {parameter}: {msg}")]
    InvalidConfig {
        /// Name of the offending parameter
        parameter: &'static str,
        /// Error message
        msg: String,
    },

    /// Chromosome requested from a reference that does not contain it
    #[error("Invalid configuration for chromosome: {chromosome} does not exist in the reference data at {}", reference_dir.display())]
    UnknownChromosome {
        /// Requested chromosome
        chromosome: String,
        /// Reference directory that was searched
        reference_dir: PathBuf,
    },

    /// Generated positions fall outside the attached reference
    #[error("Invalid configuration for num_rows: max position {max_position} is outside the reference which has a max of {reference_len}")]
    PositionOutOfBounds {
        /// Largest position the session would emit (1-based)
        max_position: u64,
        /// Number of bases in the reference sequence
        reference_len: u64,
    },

    /// Invalid FASTA format
    #[error("Invalid FASTA format at line {line}: {msg}")]
    InvalidFastaFormat {
        /// Line number where error occurred
        line: usize,
        /// Error message
        msg: String,
    },

    /// Invalid input data
    #[error("Invalid input: {msg}")]
    InvalidInput {
        /// Error message
        msg: String,
    },

    /// Invalid range or offset
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A columnar sequence file that does not have the expected shape
    #[error("Invalid reference file: {0}")]
    InvalidReference(String),

    /// Parquet encode/decode error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Arrow array error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Reference metadata could not be read or written
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl VcfakeError {
    /// Create an invalid configuration error for `parameter`
    pub fn invalid_config(parameter: &'static str, msg: impl Into<String>) -> Self {
        Self::InvalidConfig {
            parameter,
            msg: msg.into(),
        }
    }

    /// True for every error that rejects a generator configuration
    ///
    /// Unknown chromosomes and out-of-bounds positions are configuration
    /// errors too: they are detected at construction, before any line is
    /// produced.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::UnknownChromosome { .. }
                | Self::PositionOutOfBounds { .. }
        )
    }

    /// Name of the configuration parameter this error rejects, if any
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfig { parameter, .. } => Some(parameter),
            Self::UnknownChromosome { .. } => Some("chromosome"),
            Self::PositionOutOfBounds { .. } => Some("num_rows"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_name_parameter() {
        let err = VcfakeError::invalid_config("num_samples", "must be >= 1");
        assert!(err.is_config_error());
        assert_eq!(err.parameter(), Some("num_samples"));
        assert!(err.to_string().contains("num_samples"));

        let err = VcfakeError::UnknownChromosome {
            chromosome: "chrZ".to_string(),
            reference_dir: PathBuf::from("/ref"),
        };
        assert!(err.is_config_error());
        assert_eq!(err.parameter(), Some("chromosome"));
        assert!(err.to_string().contains("chrZ"));

        let err = VcfakeError::PositionOutOfBounds {
            max_position: 900,
            reference_len: 100,
        };
        assert!(err.is_config_error());
        assert!(err.to_string().contains("900"));
    }

    #[test]
    fn test_io_error_is_not_config_error() {
        let err: VcfakeError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(!err.is_config_error());
        assert_eq!(err.parameter(), None);
    }
}
