//! vcfake: reproducible fake VCF files for testing genomics pipelines
//!
//! # Overview
//!
//! vcfake produces syntactically valid VCF 4.2 text with a configurable
//! number of rows and samples. Output is lazy: a [`VcfGenerator`] yields the
//! header block and then one line per variant, so arbitrarily large files are
//! produced in constant memory. With a seed, output is byte-for-byte
//! reproducible.
//!
//! REF alleles can be drawn from a real genome. [`reference::import_reference`]
//! converts a FASTA file into one columnar Parquet file per chromosome, and a
//! generator pointed at that directory reads the base at each emitted
//! position.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vcfake::{GenerationConfig, VcfGenerator, VcfWriter};
//!
//! # fn main() -> vcfake::Result<()> {
//! let config = GenerationConfig::builder()
//!     .num_rows(10_000)
//!     .num_samples(50)
//!     .seed(42)
//!     .build()?;
//!
//! let mut writer = VcfWriter::create("fake.vcf.gz")?;
//! writer.write_generator(VcfGenerator::new(config)?)?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`generator`]: seeded row generation
//! - [`reference`]: FASTA import and columnar reference lookup
//! - [`formats`]: VCF output
//! - [`io`]: FASTA streaming, compression, output sinks

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod formats;
pub mod generator;
pub mod io;
pub mod reference;
pub mod types;

// Re-export commonly used types
pub use error::{Result, VcfakeError};
pub use formats::VcfWriter;
pub use generator::{GenerationConfig, GenerationConfigBuilder, VcfGenerator};
pub use io::{DataSink, FastaStream};
pub use reference::{import_reference, LoadMode, ReferenceSequence, ReferenceStore};
pub use types::FastaRecord;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
