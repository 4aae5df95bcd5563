//! Selective FASTA streaming parser
//!
//! # Format
//!
//! ```text
//! >chr1 AC:CM000663.2 description
//! NNNNNNNNNNacgtACGT
//! ACGTACGT
//! >chr2
//! GGGGCCCC
//! ```
//!
//! # Architecture
//!
//! The parser is a two-state machine driven one line at a time:
//!
//! - **Between records**: waiting for a `>` header. Blank lines are skipped,
//!   any other text is a format error.
//! - **In a record**: appending upper-cased bases to the open record until
//!   the next header (which is kept as the start of the following record) or
//!   end of input (which flushes the open record).
//!
//! With a selection set, bases of unselected chromosomes are read and
//! dropped rather than buffered, and the stream ends as soon as every
//! selected chromosome has been produced, without reading the rest of the
//! input. Only one chromosome is held in memory at a time.

use crate::error::{Result, VcfakeError};
use crate::io::compression::{CompressedReader, DataSource};
use crate::types::FastaRecord;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

/// FASTA streaming parser yielding selected chromosomes one at a time
///
/// # Example
///
/// ```no_run
/// use vcfake::io::FastaStream;
///
/// let stream = FastaStream::from_path("genome.fa.gz")?
///     .with_selection(["chr21".to_string(), "chr22".to_string()]);
/// for record in stream {
///     let record = record?;
///     println!("{}: {} bp", record.id, record.len());
/// }
/// # Ok::<(), vcfake::VcfakeError>(())
/// ```
pub struct FastaStream<R: BufRead> {
    reader: R,
    line_buffer: String,
    line_number: usize,
    finished: bool,
    /// Id of a record whose header line was consumed while reading the previous one
    next_id: Option<String>,
    selection: Option<HashSet<String>>,
    collected: HashSet<String>,
}

impl FastaStream<CompressedReader> {
    /// Create a FASTA stream from a data source (plain, gzip or BGZF)
    pub fn new(source: DataSource) -> Result<Self> {
        let compressed_reader = CompressedReader::new(source)?;
        Ok(Self::from_reader(compressed_reader))
    }

    /// Create a FASTA stream from a local file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(DataSource::from_path(path))
    }
}

impl<R: BufRead> FastaStream<R> {
    /// Create a FASTA stream from any buffered reader
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_buffer: String::with_capacity(256),
            line_number: 0,
            finished: false,
            next_id: None,
            selection: None,
            collected: HashSet::new(),
        }
    }

    /// Only yield chromosomes whose id is in `ids`
    ///
    /// An empty selection yields nothing and reads nothing.
    pub fn with_selection<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let selection: HashSet<String> = ids.into_iter().collect();
        if selection.is_empty() {
            self.finished = true;
        }
        self.selection = Some(selection);
        self
    }

    /// Number of input lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn is_selected(&self, id: &str) -> bool {
        match &self.selection {
            Some(selection) => selection.contains(id),
            None => true,
        }
    }

    fn selection_complete(&self) -> bool {
        match &self.selection {
            Some(selection) => selection.iter().all(|id| self.collected.contains(id)),
            None => false,
        }
    }

    /// Read the next line into `line_buffer`; `false` at end of input
    fn next_line(&mut self) -> Result<bool> {
        self.line_buffer.clear();
        let read = self.reader.read_line(&mut self.line_buffer)?;
        if read == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }

    /// Scan forward to the next header and return its id
    fn read_header(&mut self) -> Result<Option<String>> {
        if let Some(id) = self.next_id.take() {
            return Ok(Some(id));
        }

        while self.next_line()? {
            let line = self.line_buffer.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('>') {
                return Ok(Some(parse_id(line)));
            }
            return Err(VcfakeError::InvalidFastaFormat {
                line: self.line_number,
                msg: format!("Expected '>' at start of header, got: {}", line),
            });
        }

        Ok(None)
    }

    /// Consume sequence lines of the open record, keeping them if `keep`
    fn read_sequence(&mut self, keep: bool) -> Result<Vec<u8>> {
        let mut sequence = Vec::new();

        loop {
            if !self.next_line()? {
                self.finished = true;
                break;
            }

            let line = self.line_buffer.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('>') {
                self.next_id = Some(parse_id(line));
                break;
            }
            if keep {
                sequence.extend(line.bytes().map(|b| b.to_ascii_uppercase()));
            }
        }

        Ok(sequence)
    }

    fn read_record(&mut self) -> Result<Option<FastaRecord>> {
        loop {
            if self.finished && self.next_id.is_none() {
                return Ok(None);
            }

            let id = match self.read_header()? {
                Some(id) => id,
                None => {
                    self.finished = true;
                    return Ok(None);
                }
            };

            let selected = self.is_selected(&id);
            let sequence = self.read_sequence(selected)?;
            if !selected {
                continue;
            }

            self.collected.insert(id.clone());
            if self.selection_complete() {
                // Early exit: the rest of the input is never read
                self.finished = true;
                self.next_id = None;
            }

            return Ok(Some(FastaRecord::new(id, sequence)));
        }
    }
}

/// Token after '>' up to the first whitespace
fn parse_id(header: &str) -> String {
    header[1..]
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}

impl<R: BufRead> Iterator for FastaStream<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                self.next_id = None;
                Some(Err(e))
            }
        }
    }
}
