//! Generation parameters
//!
//! A [`GenerationConfig`] can only be obtained through
//! [`GenerationConfigBuilder::build`], which rejects unusable values before a
//! generator exists. Counts are taken as signed integers so that negative
//! input is reported, not wrapped.

use crate::error::{Result, VcfakeError};
use std::path::{Path, PathBuf};

/// Chromosome used when none is configured
pub const DEFAULT_CHROMOSOME: &str = "chr1";

/// Sample-name prefix used when none is configured
pub const DEFAULT_SAMPLE_PREFIX: &str = "SAMPLES";

/// Immutable input of one generator session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    num_rows: usize,
    num_samples: usize,
    chromosome: String,
    sample_prefix: String,
    seed: Option<u64>,
    phased: bool,
    large_format: bool,
    reference_dir: Option<PathBuf>,
}

impl GenerationConfig {
    /// Start building a configuration
    ///
    /// # Example
    ///
    /// ```
    /// use vcfake::GenerationConfig;
    ///
    /// let config = GenerationConfig::builder()
    ///     .num_rows(100)
    ///     .num_samples(3)
    ///     .chromosome("chr7")
    ///     .seed(42)
    ///     .build()?;
    /// assert_eq!(config.num_rows(), 100);
    /// # Ok::<(), vcfake::VcfakeError>(())
    /// ```
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder::default()
    }

    /// Number of data lines
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of sample columns
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Chromosome written in every data line
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// Prefix of generated sample names
    pub fn sample_prefix(&self) -> &str {
        &self.sample_prefix
    }

    /// Seed of the session RNG; `None` seeds from OS entropy
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Emit `|`-phased genotypes instead of `/`-unphased ones
    pub fn phased(&self) -> bool {
        self.phased
    }

    /// Emit `GT:AD:DP:GQ:PL` sample values instead of `GT`
    pub fn large_format(&self) -> bool {
        self.large_format
    }

    /// Imported reference directory to draw REF alleles from
    pub fn reference_dir(&self) -> Option<&Path> {
        self.reference_dir.as_deref()
    }
}

/// Builder for [`GenerationConfig`]
#[derive(Debug, Clone)]
pub struct GenerationConfigBuilder {
    num_rows: i64,
    num_samples: i64,
    chromosome: String,
    sample_prefix: String,
    seed: Option<u64>,
    phased: bool,
    large_format: bool,
    reference_dir: Option<PathBuf>,
}

impl Default for GenerationConfigBuilder {
    fn default() -> Self {
        Self {
            num_rows: 10,
            num_samples: 10,
            chromosome: DEFAULT_CHROMOSOME.to_string(),
            sample_prefix: DEFAULT_SAMPLE_PREFIX.to_string(),
            seed: None,
            phased: true,
            large_format: false,
            reference_dir: None,
        }
    }
}

impl GenerationConfigBuilder {
    /// Number of data lines (must be >= 1)
    pub fn num_rows(mut self, num_rows: i64) -> Self {
        self.num_rows = num_rows;
        self
    }

    /// Number of samples (must be >= 1)
    pub fn num_samples(mut self, num_samples: i64) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Chromosome name
    pub fn chromosome(mut self, chromosome: impl Into<String>) -> Self {
        self.chromosome = chromosome.into();
        self
    }

    /// Sample-name prefix (may be empty)
    pub fn sample_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sample_prefix = prefix.into();
        self
    }

    /// RNG seed; pass `None` for non-reproducible output
    pub fn seed(mut self, seed: impl Into<Option<u64>>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Phased (`0|1`) or unphased (`0/1`) genotypes
    pub fn phased(mut self, phased: bool) -> Self {
        self.phased = phased;
        self
    }

    /// Append AD/DP/GQ/PL fields to every sample value
    pub fn large_format(mut self, large_format: bool) -> Self {
        self.large_format = large_format;
        self
    }

    /// Ground REF alleles in the reference imported into `dir`
    pub fn reference_dir<P: Into<PathBuf>>(mut self, dir: Option<P>) -> Self {
        self.reference_dir = dir.map(Into::into);
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<GenerationConfig> {
        let num_rows = positive("num_rows", self.num_rows)?;
        let num_samples = positive("num_samples", self.num_samples)?;

        // Positions are drawn from [1, num_rows * 100)
        if num_rows.checked_mul(100).is_none() {
            return Err(VcfakeError::invalid_config(
                "num_rows",
                format!("{} rows exceed the position range", num_rows),
            ));
        }

        if self.chromosome.is_empty() {
            return Err(VcfakeError::invalid_config("chromosome", "must not be empty"));
        }
        if self.chromosome.contains(char::is_whitespace) {
            return Err(VcfakeError::invalid_config(
                "chromosome",
                format!("{:?} contains whitespace", self.chromosome),
            ));
        }
        if self.sample_prefix.contains(['\t', '\n', '\r']) {
            return Err(VcfakeError::invalid_config(
                "sample_prefix",
                format!("{:?} contains a tab or line break", self.sample_prefix),
            ));
        }

        Ok(GenerationConfig {
            num_rows,
            num_samples,
            chromosome: self.chromosome,
            sample_prefix: self.sample_prefix,
            seed: self.seed,
            phased: self.phased,
            large_format: self.large_format,
            reference_dir: self.reference_dir,
        })
    }
}

fn positive(parameter: &'static str, value: i64) -> Result<usize> {
    if value < 1 {
        return Err(VcfakeError::invalid_config(
            parameter,
            format!("must be greater or equal to 1, got {}", value),
        ));
    }
    usize::try_from(value)
        .map_err(|_| VcfakeError::invalid_config(parameter, format!("{} is too large", value)))
}
