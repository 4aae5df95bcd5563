//! Positional lookup into imported reference sequences
//!
//! Each chromosome lives in its own Parquet file with a single Utf8 column
//! named after the chromosome, one single-character value per base. A loaded
//! [`ReferenceSequence`] answers "which base is at offset N" in O(1) and is
//! immutable, so one instance can back any number of generator sessions
//! through an `Arc`.
//!
//! # Example
//!
//! ```no_run
//! use vcfake::reference::{LoadMode, ReferenceStore};
//!
//! # fn main() -> vcfake::Result<()> {
//! let store = ReferenceStore::open("reference/")?;
//! let chr1 = store.load("chr1", LoadMode::MemoryMapped)?;
//! assert_eq!(chr1.base_at(0)?, "N");
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, VcfakeError};
use crate::reference::metadata::ReferenceMetadata;
use arrow::array::{Array, AsArray, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use memmap2::Mmap;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How a sequence file is read into memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Read through a buffered file handle
    #[default]
    Buffered,
    /// Decode straight from a read-only memory map of the file
    MemoryMapped,
}

/// One chromosome's sequence, indexed by zero-based offset
#[derive(Debug, Clone)]
pub struct ReferenceSequence {
    chromosome: String,
    bases: StringArray,
}

impl ReferenceSequence {
    /// Load a sequence file written by the importer
    pub fn load<P: AsRef<Path>>(path: P, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let (chromosome, batches) = match mode {
            LoadMode::Buffered => read_batches(file)?,
            LoadMode::MemoryMapped => {
                // SAFETY: the mapping is read-only; sequence files are never
                // modified after import.
                let mmap = unsafe { Mmap::map(&file)? };
                read_batches(Bytes::from_owner(mmap))?
            }
        };

        let columns: Vec<&dyn Array> = batches.iter().map(|b| b.column(0).as_ref()).collect();
        let bases = if columns.is_empty() {
            StringArray::from(Vec::<&str>::new())
        } else {
            arrow::compute::concat(&columns)?.as_string::<i32>().clone()
        };

        if bases.null_count() > 0 {
            return Err(VcfakeError::InvalidReference(format!(
                "{} contains {} missing bases",
                path.display(),
                bases.null_count()
            )));
        }

        debug!(chromosome = %chromosome, bases = bases.len(), ?mode, "loaded reference sequence");
        Ok(Self { chromosome, bases })
    }

    /// Build a sequence from in-memory bases
    pub fn from_bases(chromosome: impl Into<String>, bases: &[u8]) -> Self {
        let bases: StringArray = bases
            .iter()
            .map(|&b| Some(char::from(b).to_string()))
            .collect();
        Self {
            chromosome: chromosome.into(),
            bases,
        }
    }

    /// Chromosome id (the column name of the sequence file)
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// Number of bases
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// True if the sequence holds no bases
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Base at zero-based `offset`
    pub fn base_at(&self, offset: u64) -> Result<&str> {
        if offset >= self.bases.len() as u64 {
            return Err(VcfakeError::InvalidRange(format!(
                "Offset {} exceeds {} length {}",
                offset,
                self.chromosome,
                self.bases.len()
            )));
        }
        Ok(self.bases.value(offset as usize))
    }

    /// Base at zero-based `offset`, or `None` past the end
    pub fn get(&self, offset: u64) -> Option<&str> {
        usize::try_from(offset)
            .ok()
            .filter(|&i| i < self.bases.len())
            .map(|i| self.bases.value(i))
    }
}

fn read_batches<T: ChunkReader + 'static>(input: T) -> Result<(String, Vec<RecordBatch>)> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(input)?;
    let schema = builder.schema().clone();

    if schema.fields().len() != 1 {
        return Err(VcfakeError::InvalidReference(format!(
            "expected a single sequence column, found {}",
            schema.fields().len()
        )));
    }
    let field = schema.field(0);
    if field.data_type() != &DataType::Utf8 {
        return Err(VcfakeError::InvalidReference(format!(
            "column {} has type {}, expected Utf8",
            field.name(),
            field.data_type()
        )));
    }

    let batches = builder
        .build()?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((field.name().clone(), batches))
}

/// An imported reference directory: metadata index plus sequence files
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    dir: PathBuf,
    metadata: ReferenceMetadata,
}

impl ReferenceStore {
    /// Open a directory produced by [`import_reference`](super::import_reference)
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let metadata = ReferenceMetadata::read_from_dir(&dir)?;
        debug!(
            dir = %dir.display(),
            chromosomes = metadata.reference_files.len(),
            "opened reference store"
        );
        Ok(Self { dir, metadata })
    }

    /// Directory this store was opened from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The metadata index
    pub fn metadata(&self) -> &ReferenceMetadata {
        &self.metadata
    }

    /// File name of the FASTA the store was imported from
    pub fn source_file(&self) -> &str {
        &self.metadata.reference_file
    }

    /// True if `chromosome` was imported
    pub fn contains(&self, chromosome: &str) -> bool {
        self.metadata.reference_files.contains_key(chromosome)
    }

    /// Imported chromosome ids, sorted
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.metadata.reference_files.keys().map(String::as_str)
    }

    /// Path of the sequence file for `chromosome`
    pub fn sequence_path(&self, chromosome: &str) -> Result<PathBuf> {
        self.metadata
            .file_for(chromosome)
            .map(|file| self.dir.join(file))
            .ok_or_else(|| VcfakeError::UnknownChromosome {
                chromosome: chromosome.to_string(),
                reference_dir: self.dir.clone(),
            })
    }

    /// Load the sequence of `chromosome`
    pub fn load(&self, chromosome: &str, mode: LoadMode) -> Result<ReferenceSequence> {
        ReferenceSequence::load(self.sequence_path(chromosome)?, mode)
    }
}
