//! Seeded, lazy VCF line generation
//!
//! A [`VcfGenerator`] is an iterator: the first item is the complete header
//! block, followed by exactly `num_rows` data lines. Every line ends in `\n`,
//! so a consumer can write items to a sink without inspecting them.
//!
//! ```
//! use vcfake::{GenerationConfig, VcfGenerator};
//!
//! let config = GenerationConfig::builder()
//!     .num_rows(5)
//!     .num_samples(3)
//!     .seed(42)
//!     .build()?;
//! let lines: Vec<String> = VcfGenerator::new(config)?.collect();
//! assert_eq!(lines.len(), 6);
//! assert!(lines[0].starts_with("##fileformat=VCFv4.2\n"));
//! # Ok::<(), vcfake::VcfakeError>(())
//! ```

pub mod config;
pub mod genotype;
pub mod header;
pub mod positions;

pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use genotype::{GenotypeCatalog, SamplePool};
pub use header::{sample_name, DEFAULT_REFERENCE_SOURCE};
pub use positions::PositionSeries;

use crate::error::{Result, VcfakeError};
use crate::reference::{LoadMode, ReferenceSequence, ReferenceStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write as _;
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::debug;

/// Canonical nucleotides, in the order ALT offsets are applied to
pub const ALLELES: [&str; 4] = ["A", "C", "G", "T"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    EmitHeader,
    EmitRows,
    Exhausted,
}

/// One generation session
pub struct VcfGenerator {
    config: GenerationConfig,
    rng: StdRng,
    catalog: GenotypeCatalog,
    pool: SamplePool,
    positions: PositionSeries,
    reference: Option<Arc<ReferenceSequence>>,
    reference_source: String,
    info: String,
    state: State,
}

impl VcfGenerator {
    /// Start a session, loading the configured reference if any
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let Some(dir) = config.reference_dir() else {
            return Self::build(config, None);
        };

        let store = ReferenceStore::open(dir)?;
        if !store.contains(config.chromosome()) {
            return Err(VcfakeError::UnknownChromosome {
                chromosome: config.chromosome().to_string(),
                reference_dir: dir.to_path_buf(),
            });
        }
        let sequence = store.load(config.chromosome(), LoadMode::Buffered)?;
        let source = store.source_file().to_string();
        Self::build(config, Some((Arc::new(sequence), source)))
    }

    /// Start a session over an already loaded reference
    ///
    /// `source` is the reference name announced in the header. A
    /// `reference_dir` in `config` is ignored.
    pub fn with_reference(
        config: GenerationConfig,
        reference: Arc<ReferenceSequence>,
        source: impl Into<String>,
    ) -> Result<Self> {
        if reference.chromosome() != config.chromosome() {
            return Err(VcfakeError::invalid_config(
                "chromosome",
                format!(
                    "configured {} but the attached reference holds {}",
                    config.chromosome(),
                    reference.chromosome()
                ),
            ));
        }
        Self::build(config, Some((reference, source.into())))
    }

    fn build(
        config: GenerationConfig,
        reference: Option<(Arc<ReferenceSequence>, String)>,
    ) -> Result<Self> {
        let mut rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let catalog = GenotypeCatalog::new(
            config.num_samples(),
            config.phased(),
            config.large_format(),
            &mut rng,
        );
        let pool = catalog.sample_pool(config.num_samples(), &mut rng)?;
        let positions = PositionSeries::new(config.num_rows(), &mut rng);

        let (reference, reference_source) = match reference {
            Some((sequence, source)) => {
                let reference_len = sequence.len() as u64;
                if positions.max_position() > reference_len {
                    return Err(VcfakeError::PositionOutOfBounds {
                        max_position: positions.max_position(),
                        reference_len,
                    });
                }
                (Some(sequence), source)
            }
            None => (None, DEFAULT_REFERENCE_SOURCE.to_string()),
        };

        debug!(
            rows = config.num_rows(),
            samples = config.num_samples(),
            chromosome = config.chromosome(),
            seed = ?config.seed(),
            reference = %reference_source,
            "generator ready"
        );

        let info = format!("DP=10;AF=0.5;NS={}", config.num_samples());
        Ok(Self {
            config,
            rng,
            catalog,
            pool,
            positions,
            reference,
            reference_source,
            info,
            state: State::EmitHeader,
        })
    }

    /// Configuration of this session
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Genotype templates drawn for this session
    pub fn catalog(&self) -> &GenotypeCatalog {
        &self.catalog
    }

    /// Sample names in column order
    pub fn sample_names(&self) -> Vec<String> {
        (1..=self.config.num_samples())
            .map(|i| sample_name(self.config.sample_prefix(), i))
            .collect()
    }

    /// Reference name announced in the `##reference` header line
    pub fn reference_source(&self) -> &str {
        &self.reference_source
    }

    /// Items left, header included
    pub fn remaining(&self) -> usize {
        match self.state {
            State::EmitHeader => 1 + self.positions.remaining(),
            State::EmitRows => self.positions.remaining(),
            State::Exhausted => 0,
        }
    }

    fn row(&mut self, position: u64) -> String {
        let ref_index = self.rng.random_range(0..ALLELES.len());
        let variant_id: u32 = self.rng.random_range(1..=1000);
        let alt_offset = self.rng.random_range(1..=3);
        let quality: u32 = self.rng.random_range(10..=100);

        // Positions were checked against the reference length at construction
        let reference_allele = self
            .reference
            .as_ref()
            .and_then(|sequence| sequence.get(position - 1))
            .unwrap_or(ALLELES[ref_index]);
        let base_index = ALLELES
            .iter()
            .position(|allele| *allele == reference_allele)
            .unwrap_or(ref_index);
        let alt_allele = ALLELES[(base_index + ALLELES.len() - alt_offset) % ALLELES.len()];

        let max_rotation = (self.config.num_samples() / 10).max(1);
        let rotation = self.rng.random_range(1..=max_rotation);
        self.pool.rotate(rotation);

        let format = if self.config.large_format() {
            "GT:AD:DP:GQ:PL"
        } else {
            "GT"
        };

        let mut line = String::with_capacity(64 + self.pool.len() * 4);
        // Writing into a String cannot fail
        let _ = write!(
            line,
            "{}\t{}\trs{}\t{}\t{}\t{}\tPASS\t{}\t{}\t",
            self.config.chromosome(),
            position,
            variant_id,
            reference_allele,
            alt_allele,
            quality,
            self.info,
            format
        );
        self.pool.write_columns(&mut line);
        line.push('\n');
        line
    }
}

impl Iterator for VcfGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self.state {
            State::EmitHeader => {
                self.state = State::EmitRows;
                Some(header::header_block(&self.config, &self.reference_source))
            }
            State::EmitRows => match self.positions.next() {
                Some(position) => {
                    if self.positions.remaining() == 0 {
                        self.state = State::Exhausted;
                    }
                    Some(self.row(position))
                }
                None => {
                    self.state = State::Exhausted;
                    None
                }
            },
            State::Exhausted => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for VcfGenerator {}

impl FusedIterator for VcfGenerator {}

impl std::fmt::Debug for VcfGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VcfGenerator")
            .field("config", &self.config)
            .field("reference_source", &self.reference_source)
            .field("state", &self.state)
            .field("remaining", &self.remaining())
            .finish()
    }
}
