//! Transparent decompression for FASTA input and BGZF output for VCF text
//!
//! # Reading
//!
//! [`DataSource`] opens a local file, memory-mapping it once it reaches
//! [`MMAP_THRESHOLD`]. [`CompressedReader`] sniffs the gzip magic bytes and
//! decodes gzip and BGZF input (a BGZF file is a series of gzip members)
//! transparently, so a reference genome can be imported straight from
//! `genome.fa.gz`.
//!
//! # Writing
//!
//! [`CompressedWriter`] writes plain text, or BGZF when the sink has a
//! compressed extension. BGZF output is what `bcftools`/`tabix` expect for
//! `.vcf.gz`: independent deflate blocks of at most 64 KB uncompressed, each
//! with a `BC` extra subfield holding the block size, followed by a fixed
//! 28-byte empty block as end-of-file marker.

use crate::error::Result;
use crate::io::DataSink;
use flate2::read::MultiGzDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Files at or above this size are memory-mapped instead of read (50 MB)
pub const MMAP_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Number of BGZF blocks compressed in parallel before being written
pub const PARALLEL_BLOCK_COUNT: usize = 8;

/// Maximum uncompressed payload of a single BGZF block
///
/// BGZF caps blocks at 64 KB; 60 KB leaves headroom so that incompressible
/// input still fits the 16-bit BSIZE field after deflate.
const BGZF_BLOCK_SIZE: usize = 60 * 1024;

/// The standard empty BGZF block that terminates every BGZF file
pub const BGZF_EOF_MARKER: [u8; 28] = [
    31, 139, 8, 4, 0, 0, 0, 0, 0, 255, // gzip header, FEXTRA set
    6, 0, 66, 67, 2, 0, 27, 0, // XLEN=6, 'B' 'C', SLEN=2, BSIZE=27
    3, 0, // empty deflate block
    0, 0, 0, 0, // CRC32
    0, 0, 0, 0, // ISIZE
];

/// Input location for streaming reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Local file path
    Local(PathBuf),
}

impl DataSource {
    /// Create a local file data source
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        DataSource::Local(path.as_ref().to_path_buf())
    }

    /// Open the source as a buffered reader, memory-mapping large files
    pub fn open(&self) -> Result<Box<dyn BufRead + Send>> {
        match self {
            DataSource::Local(path) => open_local_file(path),
        }
    }
}

fn open_local_file(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();

    if file_size >= MMAP_THRESHOLD {
        tracing::debug!(path = %path.display(), file_size, "memory-mapping input");
        // SAFETY: the mapping is read-only and lives as long as the reader.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Box::new(io::Cursor::new(mmap)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Buffered reader that decompresses gzip/BGZF input on the fly
///
/// # Example
///
/// ```no_run
/// use vcfake::io::{CompressedReader, DataSource};
/// use std::io::BufRead;
///
/// # fn main() -> vcfake::Result<()> {
/// let reader = CompressedReader::new(DataSource::from_path("genome.fa.gz"))?;
/// for line in reader.lines() {
///     let _line = line?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct CompressedReader {
    inner: Box<dyn BufRead + Send>,
}

impl CompressedReader {
    /// Open `source`, detecting compression from the first two bytes
    pub fn new(source: DataSource) -> Result<Self> {
        let reader = source.open()?;
        Self::from_reader(reader)
    }

    /// Wrap an already open reader, detecting compression from its first bytes
    pub fn from_reader(mut reader: Box<dyn BufRead + Send>) -> Result<Self> {
        let is_gzipped = {
            let peeked = reader.fill_buf()?;
            peeked.len() >= 2 && peeked[0] == 31 && peeked[1] == 139
        };

        if is_gzipped {
            Ok(Self {
                inner: Box::new(BufReader::new(MultiGzDecoder::new(reader))),
            })
        } else {
            Ok(Self { inner: reader })
        }
    }
}

impl Read for CompressedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for CompressedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

/// BGZF writer compressing batches of blocks in parallel
///
/// Uncompressed data accumulates in 60 KB blocks; every
/// [`PARALLEL_BLOCK_COUNT`] blocks are deflated with rayon and then written
/// in order, so memory stays bounded at roughly 1 MB.
struct BgzfWriter {
    writer: Box<dyn Write>,
    pending: Vec<Vec<u8>>,
    current: Vec<u8>,
}

impl BgzfWriter {
    fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            pending: Vec::with_capacity(PARALLEL_BLOCK_COUNT),
            current: Vec::with_capacity(BGZF_BLOCK_SIZE),
        }
    }

    /// Compress one payload into a complete BGZF block
    fn compress_block(data: &[u8]) -> io::Result<Vec<u8>> {
        let mut deflate = DeflateEncoder::new(Vec::new(), Compression::default());
        deflate.write_all(data)?;
        let deflated = deflate.finish()?;

        // header (12) + BC subfield (6) + payload + CRC32 (4) + ISIZE (4)
        let total_size = 18 + deflated.len() + 8;
        let bsize = u16::try_from(total_size - 1).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("BGZF block of {} bytes exceeds 64 KB", total_size),
            )
        })?;

        let mut block = Vec::with_capacity(total_size);
        block.extend_from_slice(&[31, 139, 8, 4, 0, 0, 0, 0, 0, 255]);
        block.extend_from_slice(&6u16.to_le_bytes());
        block.extend_from_slice(&[66, 67]);
        block.extend_from_slice(&2u16.to_le_bytes());
        block.extend_from_slice(&bsize.to_le_bytes());
        block.extend_from_slice(&deflated);
        block.extend_from_slice(&crc32fast::hash(data).to_le_bytes());
        block.extend_from_slice(&(data.len() as u32).to_le_bytes());

        Ok(block)
    }

    fn flush_pending(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let compressed = self
            .pending
            .par_iter()
            .map(|block| Self::compress_block(block))
            .collect::<io::Result<Vec<_>>>()?;

        for block in compressed {
            self.writer.write_all(&block)?;
        }
        self.pending.clear();
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut remaining = buf;

        while !remaining.is_empty() {
            let space = BGZF_BLOCK_SIZE - self.current.len();
            let take = remaining.len().min(space);
            self.current.extend_from_slice(&remaining[..take]);
            remaining = &remaining[take..];

            if self.current.len() == BGZF_BLOCK_SIZE {
                let full = std::mem::replace(&mut self.current, Vec::with_capacity(BGZF_BLOCK_SIZE));
                self.pending.push(full);
                if self.pending.len() >= PARALLEL_BLOCK_COUNT {
                    self.flush_pending()?;
                }
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn finish(mut self) -> io::Result<()> {
        if !self.current.is_empty() {
            let last = std::mem::take(&mut self.current);
            self.pending.push(last);
        }
        self.flush_pending()?;
        self.writer.write_all(&BGZF_EOF_MARKER)?;
        self.writer.flush()
    }
}

enum WriterKind {
    Plain(BufWriter<Box<dyn Write>>),
    Bgzf(BgzfWriter),
}

/// Writer that picks plain or BGZF output from the sink
///
/// Call [`finish`](Self::finish) to write the BGZF end-of-file marker; `Drop`
/// only makes a best-effort flush.
///
/// # Example
///
/// ```no_run
/// use vcfake::io::{CompressedWriter, DataSink};
/// use std::io::Write;
///
/// # fn main() -> std::io::Result<()> {
/// let mut writer = CompressedWriter::new(DataSink::from_path("fake.vcf.gz"))?;
/// writer.write_all(b"##fileformat=VCFv4.2\n")?;
/// writer.finish()?;
/// # Ok(())
/// # }
/// ```
pub struct CompressedWriter {
    inner: Option<WriterKind>,
}

impl CompressedWriter {
    /// Create a writer for `sink`
    ///
    /// - `.gz`, `.bgz`, `.gzip` → BGZF
    /// - other paths and stdout → plain text
    pub fn new(sink: DataSink) -> io::Result<Self> {
        let compressed = sink.is_compressed();
        let writer: Box<dyn Write> = match sink {
            DataSink::Local(path) => Box::new(File::create(path)?),
            DataSink::Stdout => Box::new(io::stdout()),
        };

        if compressed {
            Ok(Self::new_bgzf(writer))
        } else {
            Ok(Self::new_plain(writer))
        }
    }

    /// Create a plain (uncompressed) writer
    pub fn new_plain(writer: Box<dyn Write>) -> Self {
        Self {
            inner: Some(WriterKind::Plain(BufWriter::new(writer))),
        }
    }

    /// Create a BGZF writer
    pub fn new_bgzf(writer: Box<dyn Write>) -> Self {
        Self {
            inner: Some(WriterKind::Bgzf(BgzfWriter::new(writer))),
        }
    }

    /// True if this writer produces BGZF output
    pub fn is_compressed(&self) -> bool {
        matches!(self.inner, Some(WriterKind::Bgzf(_)))
    }

    /// Flush everything and finalize the stream
    pub fn finish(mut self) -> io::Result<()> {
        match self.inner.take() {
            Some(WriterKind::Plain(mut w)) => w.flush(),
            Some(WriterKind::Bgzf(w)) => w.finish(),
            None => Ok(()),
        }
    }
}

impl Write for CompressedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(WriterKind::Plain(w)) => w.write(buf),
            Some(WriterKind::Bgzf(w)) => w.write(buf),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "Cannot write to finished writer",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.as_mut() {
            Some(WriterKind::Plain(w)) => w.flush(),
            Some(WriterKind::Bgzf(w)) => w.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for CompressedWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    fn read_back(path: &Path) -> String {
        let mut reader = CompressedReader::new(DataSource::from_path(path)).unwrap();
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_plain_writer_round_trip() {
        let temp_file = NamedTempFile::with_suffix(".vcf").unwrap();
        let path = temp_file.path().to_path_buf();

        let mut writer = CompressedWriter::new(DataSink::from_path(&path)).unwrap();
        assert!(!writer.is_compressed());
        writer.write_all(b"##fileformat=VCFv4.2\n").unwrap();
        writer.write_all(b"#CHROM\tPOS\n").unwrap();
        writer.finish().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "##fileformat=VCFv4.2\n#CHROM\tPOS\n"
        );
    }

    #[test]
    fn test_bgzf_writer_magic_and_eof_marker() {
        let temp_file = NamedTempFile::with_suffix(".vcf.gz").unwrap();
        let path = temp_file.path().to_path_buf();

        let mut writer = CompressedWriter::new(DataSink::from_path(&path)).unwrap();
        assert!(writer.is_compressed());
        writer.write_all(b"chr1\t100\n").unwrap();
        writer.finish().unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], &[0x1f, 0x8b, 0x08]);
        // BC subfield
        assert_eq!(&bytes[12..14], b"BC");
        assert!(bytes.ends_with(&BGZF_EOF_MARKER));
    }

    #[test]
    fn test_bgzf_round_trip_spans_many_blocks() {
        let temp_file = NamedTempFile::with_suffix(".bgz").unwrap();
        let path = temp_file.path().to_path_buf();

        let mut expected = String::new();
        {
            let mut writer = CompressedWriter::new(DataSink::from_path(&path)).unwrap();
            for i in 0..100_000 {
                let line = format!("chr1\t{}\trs{}\tA\tC\n", i + 1, i % 1000);
                writer.write_all(line.as_bytes()).unwrap();
                expected.push_str(&line);
            }
            writer.finish().unwrap();
        }

        // More than PARALLEL_BLOCK_COUNT blocks were produced
        assert!(expected.len() > BGZF_BLOCK_SIZE * PARALLEL_BLOCK_COUNT);
        assert_eq!(read_back(&path), expected);
    }

    #[test]
    fn test_every_bgzf_block_records_its_size() {
        let data = vec![b'A'; BGZF_BLOCK_SIZE];
        let block = BgzfWriter::compress_block(&data).unwrap();
        let bsize = u16::from_le_bytes([block[16], block[17]]) as usize;
        assert_eq!(bsize + 1, block.len());
    }

    #[test]
    fn test_reader_passes_plain_text_through() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), ">chr1\nACGT\n").unwrap();
        assert_eq!(read_back(temp_file.path()), ">chr1\nACGT\n");
    }

    #[test]
    fn test_write_after_finish_is_rejected() {
        let mut writer = CompressedWriter::new_plain(Box::new(Vec::new()));
        writer.inner = None;
        assert!(writer.write_all(b"late").is_err());
    }
}
