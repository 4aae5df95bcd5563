//! Output formats
//!
//! - [`vcf_writer`]: streaming VCF writer (plain or BGZF)

pub mod vcf_writer;

pub use vcf_writer::VcfWriter;
