//! FASTA format support: selective streaming parser
//!
//! # Basic Usage
//!
//! ```no_run
//! use vcfake::io::fasta::FastaStream;
//!
//! // Stream every chromosome
//! let stream = FastaStream::from_path("genome.fa.gz")?;
//! for record in stream {
//!     let record = record?;
//!     println!("{}: {} bp", record.id, record.len());
//! }
//! # Ok::<(), vcfake::VcfakeError>(())
//! ```

mod parser;

pub use parser::FastaStream;
