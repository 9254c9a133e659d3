//! Property-based tests for sampling and rescaling.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statfacet::facets::{rescale, sample};
use statfacet::FacetValue;

fn facet_values() -> impl Strategy<Value = Vec<FacetValue>> {
    prop::collection::vec(0u64..100_000, 0..20).prop_map(|counts| {
        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| FacetValue::new(format!("label-{}", i), count))
            .collect()
    })
}

proptest! {
    #[test]
    fn rescaled_counts_never_grow(
        values in facet_values(),
        sample_size in 1usize..5000,
        visible_fraction in 0.0f64..=1.0,
    ) {
        let accessible = (sample_size as f64 * visible_fraction) as u64;
        let scaled = rescale(values.clone(), sample_size, accessible);

        for value in &scaled {
            let original = values.iter().find(|v| v.label == value.label).unwrap();
            prop_assert!(value.count <= original.count);
        }
    }

    #[test]
    fn pruning_is_all_or_nothing(
        values in facet_values(),
        sample_size in 1usize..5000,
        visible_fraction in 0.0f64..1.0,
    ) {
        let accessible = (sample_size as f64 * visible_fraction) as u64;
        prop_assume!(accessible < sample_size as u64);

        let expected: Vec<u64> = values
            .iter()
            .map(|v| v.count * accessible / sample_size as u64)
            .collect();
        let scaled = rescale(values.clone(), sample_size, accessible);

        if expected.contains(&0) {
            let survivors: Vec<u64> = expected.into_iter().filter(|c| *c > 0).collect();
            prop_assert_eq!(scaled.iter().map(|v| v.count).collect::<Vec<_>>(), survivors);
        } else {
            prop_assert_eq!(scaled.len(), values.len());
            let labels: Vec<&str> = scaled.iter().map(|v| v.label.as_str()).collect();
            let original: Vec<&str> = values.iter().map(|v| v.label.as_str()).collect();
            prop_assert_eq!(labels, original);
        }
    }

    #[test]
    fn sample_has_min_size_and_distinct_members(
        population in 0usize..2000,
        sample_size in 0usize..300,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked = sample(0..population, population, sample_size, &mut rng);
        prop_assert_eq!(picked.len(), population.min(sample_size));

        picked.sort_unstable();
        picked.dedup();
        prop_assert_eq!(picked.len(), population.min(sample_size));
        prop_assert!(picked.iter().all(|&i| i < population));
    }

    #[test]
    fn sample_is_deterministic(
        population in 1usize..2000,
        sample_size in 1usize..300,
        seed in any::<u64>(),
    ) {
        let a = sample(0..population, population, sample_size, &mut StdRng::seed_from_u64(seed));
        let b = sample(0..population, population, sample_size, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(a, b);
    }
}
