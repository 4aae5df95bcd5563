//! VCF output with compression support
//!
//! [`VcfWriter`] drains a [`VcfGenerator`] (or any source of preformatted VCF
//! text) into a [`DataSink`]. Compression follows the sink's extension:
//! `.gz`/`.bgz` paths are written as BGZF, anything else as plain text.
//!
//! # Example
//!
//! ```no_run
//! use vcfake::formats::vcf_writer::VcfWriter;
//! use vcfake::{GenerationConfig, VcfGenerator};
//!
//! # fn main() -> vcfake::Result<()> {
//! let config = GenerationConfig::builder().num_rows(1000).seed(7).build()?;
//! let mut writer = VcfWriter::create("fake.vcf.gz")?;
//! writer.write_generator(VcfGenerator::new(config)?)?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, VcfakeError};
use crate::generator::VcfGenerator;
use crate::io::compression::CompressedWriter;
use crate::io::sink::DataSink;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Streaming VCF text writer
pub struct VcfWriter {
    writer: CompressedWriter,
    records_written: usize,
    header_written: bool,
}

impl VcfWriter {
    /// Create a writer for `sink`, compressing if its extension asks for it
    pub fn new(sink: DataSink) -> Result<Self> {
        let writer = CompressedWriter::new(sink)?;
        Ok(Self::from_writer(writer))
    }

    /// Wrap an already configured [`CompressedWriter`]
    pub fn from_writer(writer: CompressedWriter) -> Self {
        Self {
            writer,
            records_written: 0,
            header_written: false,
        }
    }

    /// Create a writer for a file path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(DataSink::from_path(path))
    }

    /// Create a writer to stdout
    ///
    /// ```bash
    /// vcfake generate -r 100 | bcftools view -
    /// ```
    pub fn stdout() -> Result<Self> {
        Self::new(DataSink::stdout())
    }

    /// True if output is BGZF-compressed
    pub fn is_compressed(&self) -> bool {
        self.writer.is_compressed()
    }

    /// Write the header block
    ///
    /// Every line must start with `#` and the block must end with the
    /// `#CHROM` column line. Can only be written once, before any record.
    pub fn write_header(&mut self, block: &str) -> Result<()> {
        if self.header_written {
            return Err(VcfakeError::InvalidInput {
                msg: "VCF header already written".to_string(),
            });
        }
        if let Some(line) = block.lines().find(|l| !l.starts_with('#')) {
            return Err(VcfakeError::InvalidInput {
                msg: format!("VCF header line does not start with '#': {}", line),
            });
        }
        if !block.lines().last().is_some_and(|l| l.starts_with("#CHROM")) {
            return Err(VcfakeError::InvalidInput {
                msg: "VCF header must end with the #CHROM column line".to_string(),
            });
        }

        self.write_text(block)?;
        self.header_written = true;
        Ok(())
    }

    /// Write one data line
    pub fn write_record(&mut self, line: &str) -> Result<()> {
        if !self.header_written {
            return Err(VcfakeError::InvalidInput {
                msg: "VCF: Header must be written before records".to_string(),
            });
        }
        if line.trim_end().is_empty() {
            return Err(VcfakeError::InvalidInput {
                msg: "VCF: record cannot be empty".to_string(),
            });
        }
        if line.starts_with('#') {
            return Err(VcfakeError::InvalidInput {
                msg: "VCF: header lines cannot follow records".to_string(),
            });
        }

        self.write_text(line)?;
        self.records_written += 1;
        Ok(())
    }

    /// Drain `generator` completely, returning the number of data lines
    pub fn write_generator(&mut self, generator: VcfGenerator) -> Result<usize> {
        let before = self.records_written;
        for (i, item) in generator.enumerate() {
            if i == 0 {
                self.write_header(&item)?;
            } else {
                self.write_record(&item)?;
            }
        }
        let written = self.records_written - before;
        debug!(records = written, "generator drained");
        Ok(written)
    }

    /// Number of data lines written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Check if header has been written
    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Flush buffered data
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }

    /// Flush and close the output
    ///
    /// For BGZF output this writes the remaining blocks and the EOF marker.
    /// Must be called for the output to be complete.
    pub fn finish(self) -> Result<()> {
        Ok(self.writer.finish()?)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenerationConfig;
    use tempfile::TempDir;

    const HEADER: &str = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

    #[test]
    fn test_record_before_header_rejected() {
        let dir = TempDir::new().unwrap();
        let mut writer = VcfWriter::create(dir.path().join("out.vcf")).unwrap();
        assert!(writer.write_record("chr1\t1\t.\tA\tC\t.\tPASS\t.").is_err());
    }

    #[test]
    fn test_header_validation() {
        let dir = TempDir::new().unwrap();
        let mut writer = VcfWriter::create(dir.path().join("out.vcf")).unwrap();
        assert!(writer.write_header("##fileformat=VCFv4.2\n").is_err());
        assert!(writer.write_header("##a\nchr1\n#CHROM\n").is_err());
        writer.write_header(HEADER).unwrap();
        assert!(writer.write_header(HEADER).is_err());
    }

    #[test]
    fn test_plain_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.vcf");
        let mut writer = VcfWriter::create(&path).unwrap();
        assert!(!writer.is_compressed());
        writer.write_header(HEADER).unwrap();
        writer.write_record("chr1\t5\t.\tA\tC\t.\tPASS\t.").unwrap();
        assert_eq!(writer.records_written(), 1);
        writer.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{}chr1\t5\t.\tA\tC\t.\tPASS\t.\n", HEADER));
    }

    #[test]
    fn test_write_generator_counts_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.vcf");
        let config = GenerationConfig::builder()
            .num_rows(25)
            .num_samples(3)
            .seed(1)
            .build()
            .unwrap();

        let mut writer = VcfWriter::create(&path).unwrap();
        let written = writer.write_generator(VcfGenerator::new(config).unwrap()).unwrap();
        writer.finish().unwrap();

        assert_eq!(written, 25);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| !l.starts_with('#')).count(), 25);
    }
}
