//! FASTA → columnar reference import
//!
//! Streams a (possibly gzip/BGZF-compressed) FASTA file once, writing each
//! selected chromosome to `fasta_{id}.parquet` as soon as it has been read,
//! then writes the [`ReferenceMetadata`] index next to them.

use crate::error::Result;
use crate::io::FastaStream;
use crate::reference::metadata::{sequence_file_name, ReferenceMetadata};
use crate::types::FastaRecord;
use arrow::array::{ArrayRef, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::collections::{BTreeSet, HashSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Bases per record batch when writing a sequence file
pub const IMPORT_BATCH_SIZE: usize = 1 << 20;

/// One chromosome written by the importer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedSequence {
    /// Chromosome id
    pub chromosome: String,
    /// File name relative to the output directory
    pub file_name: String,
    /// Number of bases written
    pub length: usize,
}

/// Result of an import run
#[derive(Debug, Clone)]
pub struct ImportSummary {
    /// Written chromosomes, in FASTA order
    pub sequences: Vec<ImportedSequence>,
    /// Path of the metadata index
    pub metadata_path: PathBuf,
}

impl ImportSummary {
    /// Ids of the written chromosomes, in FASTA order
    pub fn chromosomes(&self) -> Vec<&str> {
        self.sequences.iter().map(|s| s.chromosome.as_str()).collect()
    }
}

/// Import `fasta_path` into `output_dir`
///
/// `include` restricts the import to the listed chromosome ids; `None`
/// imports every chromosome. Requested ids missing from the FASTA are
/// logged and skipped. The output directory is created if needed.
///
/// Records with an empty id or no bases are skipped with a warning, as are
/// repeated ids (the first occurrence wins).
///
/// # Example
///
/// ```no_run
/// use vcfake::reference::import_reference;
///
/// # fn main() -> vcfake::Result<()> {
/// let wanted: Vec<String> = (1..=22).map(|c| format!("chr{}", c)).collect();
/// let summary = import_reference("GRCh38.fa.gz", "reference/", Some(&wanted))?;
/// println!("imported {} chromosomes", summary.sequences.len());
/// # Ok(())
/// # }
/// ```
pub fn import_reference<P, Q>(
    fasta_path: P,
    output_dir: Q,
    include: Option<&[String]>,
) -> Result<ImportSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let fasta_path = fasta_path.as_ref();
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let mut stream = FastaStream::from_path(fasta_path)?;
    match include {
        Some(ids) => {
            info!(fasta = %fasta_path.display(), chromosomes = ?ids, "importing selected chromosomes");
            stream = stream.with_selection(ids.iter().cloned());
        }
        None => info!(fasta = %fasta_path.display(), "importing all chromosomes"),
    }

    let source_name = fasta_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| fasta_path.display().to_string());
    let mut metadata = ReferenceMetadata::new(source_name);
    let mut sequences = Vec::new();

    let mut written_files = HashSet::new();
    for record in stream {
        let record = record?;
        if record.id.is_empty() {
            warn!(bases = record.len(), "skipping record with an empty id");
            continue;
        }
        if record.is_empty() {
            warn!(chromosome = %record.id, "skipping record without sequence");
            continue;
        }
        if metadata.file_for(&record.id).is_some() {
            warn!(chromosome = %record.id, "skipping duplicate chromosome, keeping the first");
            continue;
        }

        let file_name = sequence_file_name(&record.id);
        if !written_files.insert(file_name.clone()) {
            warn!(
                chromosome = %record.id,
                file = %file_name,
                "skipping chromosome whose file name collides with an earlier one"
            );
            continue;
        }
        write_sequence(&output_dir.join(&file_name), &record)?;
        info!(chromosome = %record.id, bases = record.len(), file = %file_name, "wrote sequence");

        metadata.insert(record.id.clone(), file_name.clone());
        sequences.push(ImportedSequence {
            chromosome: record.id,
            file_name,
            length: record.sequence.len(),
        });
    }

    if let Some(ids) = include {
        let found: BTreeSet<&str> = sequences.iter().map(|s| s.chromosome.as_str()).collect();
        for missing in ids.iter().filter(|id| !found.contains(id.as_str())) {
            warn!(chromosome = %missing, "requested chromosome not found in FASTA");
        }
    }

    let metadata_path = metadata.write_to_dir(output_dir)?;
    info!(sequences = sequences.len(), metadata = %metadata_path.display(), "import complete");

    Ok(ImportSummary {
        sequences,
        metadata_path,
    })
}

/// Write one chromosome as a single-column, ZSTD-compressed Parquet file
pub fn write_sequence(path: &Path, record: &FastaRecord) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![Field::new(
        record.id.as_str(),
        DataType::Utf8,
        false,
    )]));
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .build();

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let mut utf8 = [0u8; 4];
    for chunk in record.sequence.chunks(IMPORT_BATCH_SIZE) {
        let mut builder = StringBuilder::with_capacity(chunk.len(), chunk.len());
        for &base in chunk {
            builder.append_value(char::from(base).encode_utf8(&mut utf8));
        }
        let column: ArrayRef = Arc::new(builder.finish());
        let batch = RecordBatch::try_new(schema.clone(), vec![column])?;
        writer.write(&batch)?;
    }

    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{LoadMode, ReferenceSequence};
    use tempfile::TempDir;

    #[test]
    fn test_write_sequence_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fasta_chrT.parquet");
        let record = FastaRecord::new("chrT".to_string(), b"NNACGTTGCA".to_vec());

        write_sequence(&path, &record).unwrap();

        for mode in [LoadMode::Buffered, LoadMode::MemoryMapped] {
            let seq = ReferenceSequence::load(&path, mode).unwrap();
            assert_eq!(seq.chromosome(), "chrT");
            assert_eq!(seq.len(), 10);
            assert_eq!(seq.base_at(0).unwrap(), "N");
            assert_eq!(seq.base_at(9).unwrap(), "A");
        }
    }

    #[test]
    fn test_import_creates_output_dir_and_metadata() {
        let dir = TempDir::new().unwrap();
        let fasta = dir.path().join("tiny.fa");
        fs::write(&fasta, ">chrA desc\nacgt\nAC\n>chrB\nGGGG\n").unwrap();
        let out = dir.path().join("nested/reference");

        let summary = import_reference(&fasta, &out, None).unwrap();
        assert_eq!(summary.chromosomes(), vec!["chrA", "chrB"]);
        assert_eq!(summary.sequences[0].length, 6);
        assert!(out.join("fasta_chrA.parquet").exists());

        let metadata = ReferenceMetadata::read_from_dir(&out).unwrap();
        assert_eq!(metadata.reference_file, "tiny.fa");
        assert_eq!(metadata.file_for("chrB"), Some("fasta_chrB.parquet"));
    }

    #[test]
    fn test_import_missing_chromosome_still_succeeds() {
        let dir = TempDir::new().unwrap();
        let fasta = dir.path().join("tiny.fa");
        fs::write(&fasta, ">chrA\nACGT\n").unwrap();

        let wanted = vec!["chrA".to_string(), "chrZ".to_string()];
        let summary = import_reference(&fasta, dir.path(), Some(&wanted)).unwrap();
        assert_eq!(summary.chromosomes(), vec!["chrA"]);
    }

    #[test]
    fn test_record_without_bases_is_skipped() {
        let dir = TempDir::new().unwrap();
        let fasta = dir.path().join("tiny.fa");
        fs::write(&fasta, ">chrEmpty\n>chr1\nACGT\n").unwrap();

        let summary = import_reference(&fasta, dir.path(), None).unwrap();
        assert_eq!(summary.chromosomes(), vec!["chr1"]);
        assert!(!dir.path().join("fasta_chrEmpty.parquet").exists());
        let metadata = ReferenceMetadata::read_from_dir(dir.path()).unwrap();
        assert_eq!(metadata.file_for("chrEmpty"), None);
    }

    #[test]
    fn test_id_with_path_separator_stays_in_output_dir() {
        let dir = TempDir::new().unwrap();
        let fasta = dir.path().join("hla.fa");
        fs::write(&fasta, ">HLA/A*01 allele\nACGTAC\n").unwrap();
        let out = dir.path().join("ref");

        let summary = import_reference(&fasta, &out, None).unwrap();
        assert_eq!(summary.chromosomes(), vec!["HLA/A*01"]);
        assert_eq!(summary.sequences[0].file_name, "fasta_HLA_A*01.parquet");

        let seq = crate::reference::ReferenceStore::open(&out)
            .unwrap()
            .load("HLA/A*01", LoadMode::Buffered)
            .unwrap();
        assert_eq!(seq.len(), 6);
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let dir = TempDir::new().unwrap();
        let fasta = dir.path().join("dup.fa");
        fs::write(&fasta, ">chr1\nACGT\n>chr1\nGGGGGG\n").unwrap();

        let summary = import_reference(&fasta, dir.path(), None).unwrap();
        assert_eq!(summary.sequences.len(), 1);
        assert_eq!(summary.sequences[0].length, 4);

        let seq = ReferenceSequence::load(dir.path().join("fasta_chr1.parquet"), LoadMode::Buffered)
            .unwrap();
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn test_escaped_file_name_collision_keeps_first() {
        let dir = TempDir::new().unwrap();
        let fasta = dir.path().join("collide.fa");
        fs::write(&fasta, ">a/b\nAC\n>a_b\nGGG\n").unwrap();

        let summary = import_reference(&fasta, dir.path(), None).unwrap();
        assert_eq!(summary.chromosomes(), vec!["a/b"]);
    }

    #[test]
    fn test_empty_id_is_skipped() {
        let dir = TempDir::new().unwrap();
        let fasta = dir.path().join("noid.fa");
        fs::write(&fasta, ">\nACGT\n>chr2\nCC\n").unwrap();

        let summary = import_reference(&fasta, dir.path(), None).unwrap();
        assert_eq!(summary.chromosomes(), vec!["chr2"]);
        assert!(!dir.path().join("fasta_.parquet").exists());
    }
}
