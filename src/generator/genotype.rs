//! Genotype templates and the per-session sample pool

use crate::error::{Result, VcfakeError};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::VecDeque;

/// AD:DP:GQ:PL tails appended to every template in large-format mode
pub const LARGE_FORMAT_SUFFIXES: [&str; 4] = [
    "0,30:30:89:913,89,0",
    "0,10:10:49:413,33,0",
    "0,20:20:55:489,89,0",
    "0,40:00:66:726,85,0",
];

const PHASED_GENOTYPES: [&str; 4] = ["0|0", "1|0", "0|1", "1|1"];
const UNPHASED_GENOTYPES: [&str; 3] = ["0/0", "0/1", "1/1"];

/// Weighted genotype templates for one session
///
/// The first template is always homozygous-reference and carries the
/// dominant weight.
#[derive(Debug, Clone)]
pub struct GenotypeCatalog {
    templates: Vec<String>,
    weights: Vec<usize>,
    phased: bool,
}

impl GenotypeCatalog {
    /// Build the catalog for `num_samples` samples
    ///
    /// In large-format mode every template gets its own suffix drawn from
    /// [`LARGE_FORMAT_SUFFIXES`].
    pub fn new<R: Rng + ?Sized>(
        num_samples: usize,
        phased: bool,
        large_format: bool,
        rng: &mut R,
    ) -> Self {
        let n = num_samples;
        let (genotypes, weights): (&[&str], Vec<usize>) = if phased {
            (&PHASED_GENOTYPES[..], vec![10 * n, n / 500, n / 500, n / 300])
        } else {
            (&UNPHASED_GENOTYPES[..], vec![10 * n, n / 250, n / 300])
        };

        let templates = genotypes
            .iter()
            .map(|gt| {
                let suffix = if large_format {
                    LARGE_FORMAT_SUFFIXES.choose(rng).copied()
                } else {
                    None
                };
                match suffix {
                    Some(suffix) => format!("{}:{}", gt, suffix),
                    None => gt.to_string(),
                }
            })
            .collect();

        Self {
            templates,
            weights,
            phased,
        }
    }

    /// Genotype values, homozygous-reference first
    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Sampling weights, parallel to [`templates`](Self::templates)
    pub fn weights(&self) -> &[usize] {
        &self.weights
    }

    /// True for `|`-phased templates
    pub fn is_phased(&self) -> bool {
        self.phased
    }

    /// The homozygous-reference template
    pub fn hom_ref(&self) -> &str {
        &self.templates[0]
    }

    /// Draw `num_samples` values with replacement by weight
    ///
    /// A pool made only of homozygous-reference values has one random entry
    /// mutated so that every row carries at least one alternate allele.
    pub fn sample_pool<R: Rng + ?Sized>(
        &self,
        num_samples: usize,
        rng: &mut R,
    ) -> Result<SamplePool> {
        let dist = WeightedIndex::new(&self.weights).map_err(|e| {
            VcfakeError::invalid_config(
                "num_samples",
                format!("unusable genotype weights: {}", e),
            )
        })?;

        let mut values: VecDeque<String> = (0..num_samples)
            .map(|_| self.templates[dist.sample(rng)].clone())
            .collect();

        if !values.is_empty() && values.iter().all(|v| v == self.hom_ref()) {
            let index = rng.random_range(0..values.len());
            values[index] = self.mutate(&values[index]);
        }

        Ok(SamplePool { values })
    }

    fn mutate(&self, value: &str) -> String {
        if self.phased {
            value.replacen('0', "1", 1)
        } else {
            value.replacen("0/0", "0/1", 1)
        }
    }
}

/// Sample columns of the current row, rotated between rows
#[derive(Debug, Clone)]
pub struct SamplePool {
    values: VecDeque<String>,
}

impl SamplePool {
    /// Cyclic shift to the right by `k`
    pub fn rotate(&mut self, k: usize) {
        let len = self.values.len();
        if len > 0 {
            self.values.rotate_right(k % len);
        }
    }

    /// Current values in column order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the pool holds no samples
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append the values to `line`, tab-separated
    pub fn write_columns(&self, line: &mut String) {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                line.push('\t');
            }
            line.push_str(value);
        }
    }
}
