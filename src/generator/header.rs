//! VCF header block

use crate::generator::config::GenerationConfig;

/// Reference name announced when no reference is attached
pub const DEFAULT_REFERENCE_SOURCE: &str = "sample.fa";

const REFERENCE_URL_PREFIX: &str = "ftp://ftp.example.com/";

const FIXED_COLUMNS: [&str; 9] = [
    "#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT",
];

const LARGE_FORMAT_LINES: [&str; 4] = [
    r#"##FORMAT=<ID=AD,Number=R,Type=Integer,Description="Allelic depths for the ref and alt alleles in the order listed">"#,
    r#"##FORMAT=<ID=DP,Number=1,Type=Integer,Description="Approximate read depth (reads with MQ=255 or with bad mates are filtered)">"#,
    r#"##FORMAT=<ID=GQ,Number=1,Type=Integer,Description="Genotype Quality">"#,
    r#"##FORMAT=<ID=PL,Number=G,Type=Integer,Description="Phred-scaled genotype Likelihoods">"#,
];

/// Name of the sample in column `index` (1-based)
pub fn sample_name(prefix: &str, index: usize) -> String {
    format!("{}{:07}", prefix, index)
}

/// Render the full header block, every line newline-terminated
pub fn header_block(config: &GenerationConfig, reference_source: &str) -> String {
    let mut lines: Vec<String> = vec![
        "##fileformat=VCFv4.2".to_string(),
        format!("##source=VCFake {}", crate::VERSION),
        r#"##FILTER=<ID=PASS,Description="All filters passed">"#.to_string(),
        r#"##INFO=<ID=NS,Number=1,Type=Integer,Description="Number of Samples With Data">"#
            .to_string(),
        format!("##contig=<ID={}>", config.chromosome()),
        format!("##reference={}{}", REFERENCE_URL_PREFIX, reference_source),
        r#"##INFO=<ID=AF,Number=A,Type=Float,Description="Estimated allele frequency in the range (0,1)">"#
            .to_string(),
        r#"##INFO=<ID=DP,Number=1,Type=Integer,Description="Approximate read depth; some reads may have been filtered">"#
            .to_string(),
        r#"##FORMAT=<ID=GT,Number=1,Type=String,Description="Genotype">"#.to_string(),
    ];
    if config.large_format() {
        lines.extend(LARGE_FORMAT_LINES.iter().map(|l| l.to_string()));
    }

    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend((1..=config.num_samples()).map(|i| sample_name(config.sample_prefix(), i)));
    lines.push(columns.join("\t"));

    let mut block = lines.join("\n");
    block.push('\n');
    block
}
