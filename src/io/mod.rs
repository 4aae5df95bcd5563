//! I/O module: FASTA input, compression, and output sinks

pub mod compression;
pub mod fasta;
pub mod sink;

pub use compression::{CompressedReader, CompressedWriter, DataSource, MMAP_THRESHOLD};
pub use fasta::FastaStream;
pub use sink::DataSink;
