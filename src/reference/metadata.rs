//! Metadata index of an imported reference directory
//!
//! ```text
//! {
//!   "reference_file": "GRCh38.fa.gz",
//!   "reference_files": {
//!     "chr1": "fasta_chr1.parquet",
//!     "chr2": "fasta_chr2.parquet"
//!   }
//! }
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the metadata index inside a reference directory
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Name of the columnar file holding `chromosome`
///
/// Path separators in the id are replaced with `_` so the file always lands
/// directly inside the reference directory.
pub fn sequence_file_name(chromosome: &str) -> String {
    let escaped: String = chromosome
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("fasta_{}.parquet", escaped)
}

/// Chromosome → sequence file mapping plus the FASTA it was imported from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMetadata {
    /// File name of the source FASTA
    #[serde(alias = "source_reference_file")]
    pub reference_file: String,
    /// Chromosome id → file name relative to the reference directory
    pub reference_files: BTreeMap<String, String>,
}

impl ReferenceMetadata {
    /// Empty index for a reference imported from `reference_file`
    pub fn new(reference_file: impl Into<String>) -> Self {
        Self {
            reference_file: reference_file.into(),
            reference_files: BTreeMap::new(),
        }
    }

    /// Path of the metadata file inside `dir`
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(METADATA_FILE_NAME)
    }

    /// Read the index stored in `dir`
    pub fn read_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let file = File::open(Self::path_in(dir.as_ref()))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Write the index into `dir`, returning the file path
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = Self::path_in(dir.as_ref());
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(path)
    }

    /// Record that `chromosome` is stored in `file_name`
    pub fn insert(&mut self, chromosome: impl Into<String>, file_name: impl Into<String>) {
        self.reference_files.insert(chromosome.into(), file_name.into());
    }

    /// File name holding `chromosome`, if present
    pub fn file_for(&self, chromosome: &str) -> Option<&str> {
        self.reference_files.get(chromosome).map(String::as_str)
    }
}
