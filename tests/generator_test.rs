//! Integration tests for VCF generation

use proptest::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use vcfake::generator::genotype::LARGE_FORMAT_SUFFIXES;
use vcfake::reference::{import_reference, LoadMode, ReferenceStore};
use vcfake::{GenerationConfig, VcfGenerator, VcfakeError};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/reference/reference_small.fa")
}

fn generate(config: GenerationConfig) -> Vec<String> {
    VcfGenerator::new(config).unwrap().collect()
}

fn seeded(rows: i64, samples: i64, seed: u64) -> GenerationConfig {
    GenerationConfig::builder()
        .num_rows(rows)
        .num_samples(samples)
        .seed(seed)
        .build()
        .unwrap()
}

fn data_lines(items: &[String]) -> Vec<&str> {
    items[1..].iter().map(|l| l.trim_end_matches('\n')).collect()
}

fn sample_columns(line: &str) -> Vec<&str> {
    line.split('\t').skip(9).collect()
}

fn imported_reference(chromosomes: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let wanted: Vec<String> = chromosomes.iter().map(|s| s.to_string()).collect();
    import_reference(fixture(), dir.path(), Some(&wanted)).unwrap();
    dir
}

#[test]
fn test_row_and_sample_counts() {
    for (rows, samples) in [(1, 1), (10, 10), (250, 3), (7, 120)] {
        let items = generate(seeded(rows, samples, 42));
        assert_eq!(items.len(), rows as usize + 1);
        for line in data_lines(&items) {
            assert_eq!(sample_columns(line).len(), samples as usize);
        }
    }
}

#[test]
fn test_every_item_is_newline_terminated() {
    let items = generate(seeded(5, 2, 1));
    assert!(items.iter().all(|item| item.ends_with('\n')));
    assert!(items[1..].iter().all(|item| item.matches('\n').count() == 1));
}

#[test]
fn test_non_positive_counts_rejected() {
    for value in -10..=0 {
        let err = GenerationConfig::builder().num_rows(value).build().unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(err.parameter(), Some("num_rows"));

        let err = GenerationConfig::builder().num_samples(value).build().unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(err.parameter(), Some("num_samples"));
    }
}

#[test]
fn test_same_seed_same_output() {
    let first = generate(seeded(200, 15, 42));
    let second = generate(seeded(200, 15, 42));
    assert_eq!(first, second);
}

#[test]
fn test_different_seed_different_output() {
    let seeds = [0u64, 1, 7, 42, 1337, 2024, u64::MAX];
    let outputs: Vec<_> = seeds.iter().map(|&s| generate(seeded(200, 15, s))).collect();
    for i in 0..seeds.len() {
        for j in (i + 1)..seeds.len() {
            assert_ne!(outputs[i], outputs[j], "seeds {} and {}", seeds[i], seeds[j]);
        }
    }
}

#[test]
fn test_sample_names() {
    let config = GenerationConfig::builder()
        .num_samples(12)
        .sample_prefix("SAM")
        .seed(3)
        .build()
        .unwrap();
    let generator = VcfGenerator::new(config).unwrap();
    let expected: Vec<String> = (1..=12).map(|i| format!("SAM{:07}", i)).collect();
    assert_eq!(generator.sample_names(), expected);

    let items: Vec<String> = generator.collect();
    let column_line = items[0].lines().last().unwrap();
    assert!(column_line.starts_with("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\t"));
    assert_eq!(sample_columns(column_line), expected);
}

#[test]
fn test_never_all_reference() {
    for phased in [true, false] {
        let hom_ref = if phased { "0|0" } else { "0/0" };
        for seed in 0..25 {
            let config = GenerationConfig::builder()
                .num_rows(3)
                .num_samples(4)
                .phased(phased)
                .seed(seed)
                .build()
                .unwrap();
            for line in data_lines(&generate(config)) {
                assert!(
                    sample_columns(line).iter().any(|value| *value != hom_ref),
                    "all samples homozygous reference: {}",
                    line
                );
            }
        }
    }
}

#[test]
fn test_genotype_separator_follows_phasing() {
    let config = GenerationConfig::builder()
        .num_rows(20)
        .num_samples(30)
        .phased(false)
        .seed(8)
        .build()
        .unwrap();
    for line in data_lines(&generate(config)) {
        assert!(sample_columns(line).iter().all(|v| v.contains('/') && !v.contains('|')));
    }
}

#[test]
fn test_large_format() {
    let config = GenerationConfig::builder()
        .num_rows(10)
        .num_samples(5)
        .large_format(true)
        .seed(11)
        .build()
        .unwrap();
    let items = generate(config);

    for id in ["AD", "DP", "GQ", "PL"] {
        assert!(items[0].contains(&format!("##FORMAT=<ID={},", id)));
    }
    for line in data_lines(&items) {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields[8], "GT:AD:DP:GQ:PL");
        for value in sample_columns(line) {
            let (_, suffix) = value.split_once(':').unwrap();
            assert_eq!(value.split(':').count(), 5);
            assert!(LARGE_FORMAT_SUFFIXES.contains(&suffix));
        }
    }
}

#[test]
fn test_custom_chromosome() {
    let config = GenerationConfig::builder()
        .num_rows(4)
        .chromosome("chrX")
        .seed(5)
        .build()
        .unwrap();
    let items = generate(config);
    assert!(items[0].contains("##contig=<ID=chrX>\n"));
    assert!(data_lines(&items).iter().all(|l| l.starts_with("chrX\t")));
}

#[test]
fn test_reference_alleles() {
    let dir = imported_reference(&["chr3"]);
    let config = GenerationConfig::builder()
        .num_rows(5)
        .num_samples(4)
        .chromosome("chr3")
        .reference_dir(Some(dir.path()))
        .seed(21)
        .build()
        .unwrap();
    let items = generate(config);
    assert!(items[0].contains("##reference=ftp://ftp.example.com/reference_small.fa\n"));

    let chr3 = ReferenceStore::open(dir.path())
        .unwrap()
        .load("chr3", LoadMode::Buffered)
        .unwrap();
    for line in data_lines(&items) {
        let fields: Vec<&str> = line.split('\t').collect();
        let position: u64 = fields[1].parse().unwrap();
        assert_eq!(fields[3], chr3.base_at(position - 1).unwrap());
        assert!(["A", "C", "G", "T"].contains(&fields[4]));
        assert_ne!(fields[3], fields[4]);
    }
}

#[test]
fn test_unknown_chromosome() {
    let dir = imported_reference(&["chr3"]);
    let config = GenerationConfig::builder()
        .chromosome("chr8")
        .reference_dir(Some(dir.path()))
        .build()
        .unwrap();
    let err = VcfGenerator::new(config).unwrap_err();
    assert!(matches!(err, VcfakeError::UnknownChromosome { .. }));
    assert!(err.is_config_error());
    assert_eq!(err.parameter(), Some("chromosome"));
}

#[test]
fn test_positions_beyond_reference() {
    let dir = imported_reference(&["chr1"]);
    let config = GenerationConfig::builder()
        .num_rows(100)
        .reference_dir(Some(dir.path()))
        .seed(42)
        .build()
        .unwrap();
    let err = VcfGenerator::new(config).unwrap_err();
    assert!(matches!(
        err,
        VcfakeError::PositionOutOfBounds { reference_len: 600, .. }
    ));
    assert!(err.is_config_error());
}

#[test]
fn test_shared_reference_between_sessions() {
    let dir = imported_reference(&["chr2"]);
    let store = ReferenceStore::open(dir.path()).unwrap();
    let chr2 = Arc::new(store.load("chr2", LoadMode::MemoryMapped).unwrap());

    let make = |seed: u64| {
        let config = GenerationConfig::builder()
            .num_rows(5)
            .chromosome("chr2")
            .seed(seed)
            .build()
            .unwrap();
        VcfGenerator::with_reference(config, Arc::clone(&chr2), store.source_file()).unwrap()
    };

    let first: Vec<String> = make(1).collect();
    let second: Vec<String> = make(1).collect();
    assert_eq!(first, second);
    assert_eq!(Arc::strong_count(&chr2), 1);
}

#[test]
fn test_remaining_and_fused() {
    let mut generator = VcfGenerator::new(seeded(3, 2, 0)).unwrap();
    assert_eq!(generator.len(), 4);
    generator.by_ref().for_each(drop);
    assert_eq!(generator.remaining(), 0);
    assert!(generator.next().is_none());
    assert!(generator.next().is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_positions_strictly_increasing(
        rows in 1i64..300,
        samples in 1i64..20,
        seed in any::<u64>(),
    ) {
        let items = generate(seeded(rows, samples, seed));
        let positions: Vec<u64> = data_lines(&items)
            .iter()
            .map(|l| l.split('\t').nth(1).unwrap().parse().unwrap())
            .collect();
        prop_assert_eq!(positions.len(), rows as usize);
        prop_assert!(positions[0] >= 1);
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(*positions.last().unwrap() < rows as u64 * 100);
    }

    #[test]
    fn prop_rows_are_well_formed(rows in 1i64..50, samples in 1i64..40, seed in any::<u64>()) {
        let items = generate(seeded(rows, samples, seed));
        for line in data_lines(&items) {
            let fields: Vec<&str> = line.split('\t').collect();
            prop_assert_eq!(fields.len(), 9 + samples as usize);
            let id: u32 = fields[2].strip_prefix("rs").unwrap().parse().unwrap();
            prop_assert!((1..=1000).contains(&id));
            prop_assert_ne!(fields[3], fields[4]);
            let quality: u32 = fields[5].parse().unwrap();
            prop_assert!((10..=100).contains(&quality));
            let expected_info = format!("DP=10;AF=0.5;NS={}", samples);
            prop_assert_eq!(fields[7], expected_info.as_str());
        }
    }
}
