//! vcfake - fake VCF generator
//!
//! Usage:
//!   vcfake generate -r 1000 -s 20 -o fake.vcf.gz     Generate a BGZF-compressed VCF
//!   vcfake generate --reference-dir ref/ -c chr7      Draw REF alleles from a reference
//!   vcfake import-reference genome.fa.gz ref/         Import a FASTA for later use

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use vcfake::{import_reference, DataSink, GenerationConfig, VcfGenerator, VcfWriter};

#[derive(Parser)]
#[command(name = "vcfake", version, about = "A fake VCF file generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fake VCF file
    #[command(version)]
    Generate(GenerateArgs),

    /// Import a FASTA file into a columnar reference directory
    ImportReference {
        /// FASTA file, optionally gzip/BGZF-compressed
        fasta: PathBuf,

        /// Directory to write the per-chromosome files and metadata into
        output_dir: PathBuf,

        /// Only import these chromosomes (comma-separated)
        #[arg(long, value_delimiter = ',')]
        included_chromosomes: Option<Vec<String>>,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Output path; stdout when omitted. `.gz`/`.bgz` output is BGZF-compressed
    #[arg(short = 'o', long)]
    fake_vcf_path: Option<PathBuf>,

    /// Number of rows (variants) to generate
    #[arg(short = 'r', long, default_value_t = 10, allow_negative_numbers = true)]
    num_rows: i64,

    /// Number of samples to generate
    #[arg(short = 's', long, default_value_t = 10, allow_negative_numbers = true)]
    num_samples: i64,

    /// Chromosome name
    #[arg(short = 'c', long, default_value = "chr1")]
    chromosome: String,

    /// Random seed; output is not reproducible without one
    #[arg(long)]
    seed: Option<u64>,

    /// Sample prefix, e.g. SAM => SAM0000001 SAM0000002
    #[arg(short = 'p', long, default_value = "S")]
    sample_prefix: String,

    /// Simulate unphased genotypes (0/1 instead of 0|1)
    #[arg(long)]
    no_phased: bool,

    /// Add AD, DP, GQ and PL fields to every sample
    #[arg(long)]
    large_format: bool,

    /// Reference directory created by `import-reference`
    #[arg(long)]
    reference_dir: Option<PathBuf>,

    /// Print version (same as -V)
    #[arg(short = 'v', action = clap::ArgAction::Version)]
    #[allow(dead_code)]
    version_short: Option<bool>,
}

fn main() -> Result<()> {
    // stdout may carry VCF text, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args),
        Commands::ImportReference {
            fasta,
            output_dir,
            included_chromosomes,
        } => cmd_import_reference(fasta, output_dir, included_chromosomes),
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let config = GenerationConfig::builder()
        .num_rows(args.num_rows)
        .num_samples(args.num_samples)
        .chromosome(args.chromosome)
        .sample_prefix(args.sample_prefix)
        .seed(args.seed)
        .phased(!args.no_phased)
        .large_format(args.large_format)
        .reference_dir(args.reference_dir)
        .build()?;

    let generator = VcfGenerator::new(config).context("Failed to set up the generator")?;

    let sink = DataSink::from_optional_path(args.fake_vcf_path.as_ref());
    if sink.is_compressed() {
        info!("Using compression");
    } else {
        info!("No compression");
    }

    let mut writer = VcfWriter::new(sink.clone())
        .with_context(|| format!("Failed to open output {}", sink))?;
    let rows = writer.write_generator(generator)?;
    writer
        .finish()
        .with_context(|| format!("Failed to finish output {}", sink))?;

    info!(rows, output = %sink, "done");
    Ok(())
}

fn cmd_import_reference(
    fasta: PathBuf,
    output_dir: PathBuf,
    included_chromosomes: Option<Vec<String>>,
) -> Result<()> {
    let summary = import_reference(&fasta, &output_dir, included_chromosomes.as_deref())
        .with_context(|| format!("Failed to import {}", fasta.display()))?;

    for sequence in &summary.sequences {
        info!(
            chromosome = %sequence.chromosome,
            bases = sequence.length,
            file = %sequence.file_name,
            "imported"
        );
    }
    info!(metadata = %summary.metadata_path.display(), "reference ready");
    Ok(())
}
