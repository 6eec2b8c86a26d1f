use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::record::{FlatRecord, SampleRecord};

/// Upper bound on the number of heatmap points.
pub const DEFAULT_SAMPLE_SIZE: usize = 10_000;

/// Seed used for the heatmap sample so repeated runs write the same file.
pub const DEFAULT_SEED: u64 = 42;

/// Draws `min(size, records.len())` records uniformly without replacement.
///
/// The generator is seeded from `seed`, so identical input yields an
/// identical sample in an identical order.
pub fn sample_records(records: &[FlatRecord], size: usize, seed: u64) -> Vec<SampleRecord> {
    let amount = size.min(records.len());
    let mut rng = StdRng::seed_from_u64(seed);

    index::sample(&mut rng, records.len(), amount)
        .into_iter()
        .map(|i| records[i].to_sample())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn records(n: usize) -> Vec<FlatRecord> {
        (0..n)
            .map(|i| FlatRecord {
                nome_popul: format!("tree-{i}"),
                altura: i as f64,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_sample_caps_at_dataset_size() {
        let sample = sample_records(&records(25), DEFAULT_SAMPLE_SIZE, DEFAULT_SEED);
        assert_eq!(sample.len(), 25);
    }

    #[test]
    fn test_sample_caps_at_requested_size() {
        let sample = sample_records(&records(100), 10, DEFAULT_SEED);
        assert_eq!(sample.len(), 10);
    }

    #[test]
    fn test_sample_has_no_repeats() {
        let sample = sample_records(&records(100), 60, DEFAULT_SEED);
        let distinct: HashSet<_> = sample.iter().map(|s| s.nome_popul.clone()).collect();
        assert_eq!(distinct.len(), 60);
    }

    #[test]
    fn test_sample_is_reproducible() {
        let data = records(500);
        let first = sample_records(&data, 50, DEFAULT_SEED);
        let second = sample_records(&data, 50, DEFAULT_SEED);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sample_depends_on_seed() {
        let data = records(500);
        let first = sample_records(&data, 50, 1);
        let second = sample_records(&data, 50, 2);
        assert_ne!(first, second);
    }

    #[test]
    fn test_sample_of_empty_dataset() {
        assert!(sample_records(&[], DEFAULT_SAMPLE_SIZE, DEFAULT_SEED).is_empty());
    }
}
