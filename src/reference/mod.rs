//! Reference genome support: FASTA import and columnar positional lookup
//!
//! An imported reference is a directory holding one Parquet file per
//! chromosome plus a JSON metadata index:
//!
//! ```text
//! reference/
//! ├── metadata.json
//! ├── fasta_chr1.parquet
//! └── fasta_chr2.parquet
//! ```
//!
//! [`import_reference`] builds it once; [`ReferenceStore`] opens it and loads
//! [`ReferenceSequence`]s for the generator to draw REF alleles from.

pub mod import;
pub mod metadata;
pub mod store;

pub use import::{import_reference, ImportSummary, ImportedSequence};
pub use metadata::{sequence_file_name, ReferenceMetadata, METADATA_FILE_NAME};
pub use store::{LoadMode, ReferenceSequence, ReferenceStore};
