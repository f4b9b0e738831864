//! Batch over-representation analysis against a shared hit set.

use num_traits::PrimInt;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::enrichment::hypergeom::hypergeometric_sf;
use crate::enrichment::lookup::HitLookup;
use crate::enrichment::utils::distinct_members;
use crate::error::{EnrichmentError, Result};

/// Smallest p-value used when converting to a -log10 score.
pub const MIN_P_VALUE: f64 = 1e-300;

/// Result of the hypergeometric test for one gene set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    /// Label of the gene set
    pub name: String,
    /// Number of distinct universe indices in the set
    pub set_size: usize,
    /// Number of set members that are hits
    pub overlap: usize,
    /// Upper-tail probability P(X >= overlap)
    pub p_value: f64,
    /// Mean overlap under the null: set_size * sample_size / universe_size
    pub expected_hits: f64,
}

impl EnrichmentResult {
    /// `-log10(p_value)`, with the p-value floored at [`MIN_P_VALUE`].
    pub fn enrichment_score(&self) -> f64 {
        -self.p_value.max(MIN_P_VALUE).log10()
    }

    /// Fraction of the set that was hit. Zero for an empty set.
    pub fn overlap_ratio(&self) -> f64 {
        self.overlap as f64 / self.set_size.max(1) as f64
    }

    /// Observed over expected overlap; `NaN` when nothing is expected.
    pub fn fold_enrichment(&self) -> f64 {
        if self.expected_hits > 0.0 {
            self.overlap as f64 / self.expected_hits
        } else {
            f64::NAN
        }
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Execution settings for [`hypergeometric_enrichment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentOptions {
    /// Evaluate gene sets on the rayon thread pool
    pub parallel: bool,
    /// Batches smaller than this run sequentially even if `parallel` is set
    pub min_parallel_sets: usize,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        EnrichmentOptions {
            parallel: true,
            min_parallel_sets: 64,
        }
    }
}

impl EnrichmentOptions {
    pub fn sequential() -> Self {
        EnrichmentOptions {
            parallel: false,
            ..Default::default()
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_min_parallel_sets(mut self, min_parallel_sets: usize) -> Self {
        self.min_parallel_sets = min_parallel_sets;
        self
    }

    fn use_parallel(&self, n_sets: usize) -> bool {
        self.parallel && n_sets >= self.min_parallel_sets
    }
}

/// Scores a single gene set against a prebuilt hit lookup.
///
/// Repeated indices inside `gene_set` are collapsed, so `set_size` and
/// `overlap` always refer to distinct members.
pub fn enrich_gene_set<I>(lookup: &HitLookup, name: &str, gene_set: &[I]) -> Result<EnrichmentResult>
where
    I: PrimInt + std::fmt::Display,
{
    let universe_size = lookup.universe_size();
    let sample_size = lookup.sample_size();

    let members = distinct_members(gene_set, universe_size)?;
    let set_size = members.len();
    let overlap = lookup.overlap(&members);

    let p_value = hypergeometric_sf(universe_size, set_size, sample_size, overlap)?;
    let expected_hits = (set_size as f64 * sample_size as f64) / universe_size as f64;

    Ok(EnrichmentResult {
        name: name.to_string(),
        set_size,
        overlap,
        p_value,
        expected_hits,
    })
}

/// Hypergeometric enrichment of a batch of gene sets against one hit set.
///
/// # Arguments
///
/// * `gene_sets` - Gene sets, each a list of universe indices
/// * `gene_names` - One label per gene set, in the same order
/// * `hit_indices` - Universe indices of the hits (the sample)
/// * `universe_size` - Size of the index space; every index must be below it
/// * `options` - Execution settings
///
/// # Returns
///
/// One [`EnrichmentResult`] per gene set, in input order. No multiple-testing
/// correction is applied.
///
/// # Errors
///
/// `InvalidArgument` when the two sequences differ in length or the universe is
/// empty, `OutOfRange` when any index is `>= universe_size`. Any error aborts the
/// whole batch.
#[instrument(
    skip_all,
    fields(n_sets = gene_sets.len(), universe_size = universe_size)
)]
pub fn hypergeometric_enrichment<S, I>(
    gene_sets: &[S],
    gene_names: &[String],
    hit_indices: &[I],
    universe_size: usize,
    options: &EnrichmentOptions,
) -> Result<Vec<EnrichmentResult>>
where
    S: AsRef<[I]> + Sync,
    I: PrimInt + std::fmt::Display + Send + Sync,
{
    if gene_sets.len() != gene_names.len() {
        return Err(EnrichmentError::invalid(format!(
            "gene_sets and gene_names must be the same length ({} != {})",
            gene_sets.len(),
            gene_names.len()
        )));
    }
    if universe_size == 0 {
        return Err(EnrichmentError::invalid("universe_size must be greater than zero"));
    }

    let lookup = HitLookup::new(universe_size, hit_indices)?;
    let parallel = options.use_parallel(gene_sets.len());
    debug!(
        sample_size = lookup.sample_size(),
        parallel, "running hypergeometric enrichment"
    );

    let results: Result<Vec<EnrichmentResult>> = if parallel {
        gene_sets
            .par_iter()
            .zip(gene_names.par_iter())
            .map(|(set, name)| enrich_gene_set(&lookup, name, set.as_ref()))
            .collect()
    } else {
        gene_sets
            .iter()
            .zip(gene_names.iter())
            .map(|(set, name)| enrich_gene_set(&lookup, name, set.as_ref()))
            .collect()
    };

    let results = results?;
    debug!(n_results = results.len(), "hypergeometric enrichment finished");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("set_{i}")).collect()
    }

    #[test]
    fn test_single_set_scenario() {
        let sets = vec![vec![0u32, 1, 10, 11]];
        let hits = vec![0u32, 1, 2, 3, 4];
        let results =
            hypergeometric_enrichment(&sets, &names(1), &hits, 20, &EnrichmentOptions::default())
                .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].set_size, 4);
        assert_eq!(results[0].overlap, 2);
        assert_relative_eq!(results[0].p_value, 3856.0 / 15504.0, max_relative = 1e-10);
        assert_eq!(results[0].expected_hits, 4.0 * 5.0 / 20.0);
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let sets = vec![vec![0u32, 0, 1, 1, 10]];
        let hits = vec![0u32, 0, 1];
        let results =
            hypergeometric_enrichment(&sets, &names(1), &hits, 20, &EnrichmentOptions::default())
                .unwrap();

        assert_eq!(results[0].set_size, 3);
        assert_eq!(results[0].overlap, 2);
        assert_eq!(results[0].expected_hits, 3.0 * 2.0 / 20.0);
    }

    #[test]
    fn test_empty_set_and_empty_hits() {
        let sets: Vec<Vec<u32>> = vec![vec![], vec![1, 2]];
        let results =
            hypergeometric_enrichment(&sets, &names(2), &[] as &[u32], 5, &EnrichmentOptions::default())
                .unwrap();

        for r in &results {
            assert_eq!(r.overlap, 0);
            assert_relative_eq!(r.p_value, 1.0, epsilon = 1e-12);
            assert_eq!(r.expected_hits, 0.0);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let universe_size = 2_000;
        let hits: Vec<usize> = (0..universe_size).step_by(7).collect();
        let sets: Vec<Vec<usize>> = (0..300)
            .map(|s| (0..(5 + s % 40)).map(|i| (s * 13 + i * 29) % universe_size).collect())
            .collect();
        let labels = names(sets.len());

        let sequential = hypergeometric_enrichment(
            &sets,
            &labels,
            &hits,
            universe_size,
            &EnrichmentOptions::sequential(),
        )
        .unwrap();
        let parallel = hypergeometric_enrichment(
            &sets,
            &labels,
            &hits,
            universe_size,
            &EnrichmentOptions::default().with_min_parallel_sets(1),
        )
        .unwrap();

        assert_eq!(sequential, parallel);
        for (result, label) in parallel.iter().zip(labels.iter()) {
            assert_eq!(&result.name, label);
        }
    }

    #[test]
    fn test_length_mismatch_is_invalid() {
        let sets = vec![vec![0u32], vec![1u32]];
        let err = hypergeometric_enrichment(&sets, &names(1), &[0u32], 5, &EnrichmentOptions::default())
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_zero_universe_is_invalid() {
        let sets = vec![vec![0u32]];
        let err = hypergeometric_enrichment(&sets, &names(1), &[0u32], 0, &EnrichmentOptions::default())
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_out_of_range_gene_aborts_batch() {
        let sets = vec![vec![0u32, 1], vec![3u32, 20]];
        let err = hypergeometric_enrichment(
            &sets,
            &names(2),
            &[0u32, 1],
            20,
            &EnrichmentOptions::sequential(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EnrichmentError::OutOfRange {
                what: "gene",
                index: "20".to_string(),
                universe_size: 20,
            }
        );
    }

    #[test]
    fn test_result_helpers() {
        let result = EnrichmentResult {
            name: "x".into(),
            set_size: 4,
            overlap: 2,
            p_value: 1e-5,
            expected_hits: 0.5,
        };
        assert_relative_eq!(result.enrichment_score(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(result.overlap_ratio(), 0.5);
        assert_relative_eq!(result.fold_enrichment(), 4.0);
        assert!(result.is_significant(0.05));

        let empty = EnrichmentResult {
            name: "y".into(),
            set_size: 0,
            overlap: 0,
            p_value: 0.0,
            expected_hits: 0.0,
        };
        assert_eq!(empty.overlap_ratio(), 0.0);
        assert!(empty.fold_enrichment().is_nan());
        assert_relative_eq!(empty.enrichment_score(), 300.0, epsilon = 1e-9);
    }
}
