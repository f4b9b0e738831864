use crate::enrichment::combinatorics::ln_choose;
use crate::error::{EnrichmentError, Result};

/// Upper-tail probability `P(X >= overlap)` for `X ~ Hypergeometric(N, K, n)`.
///
/// # Arguments
///
/// * `universe_size` - Population size `N`
/// * `set_size` - Number of success states in the population `K` (gene set size)
/// * `sample_size` - Number of draws `n` (hit set size)
/// * `overlap` - Observed successes among the draws
///
/// The probability mass terms for `k = overlap..=min(K, n)` are evaluated in log
/// space and accumulated with the log-sum-exp trick, so neither tiny individual
/// terms nor long tails of widely differing magnitude underflow. The result is
/// capped at `1.0`.
///
/// # Errors
///
/// `InvalidArgument` when `K > N`, `n > N` or `overlap > min(K, n)`. An overlap
/// outside the support is a caller bug and is rejected rather than clamped.
pub fn hypergeometric_sf(
    universe_size: usize,
    set_size: usize,
    sample_size: usize,
    overlap: usize,
) -> Result<f64> {
    if set_size > universe_size || sample_size > universe_size {
        return Err(EnrichmentError::invalid(format!(
            "set_size ({set_size}) and sample_size ({sample_size}) must not exceed universe_size ({universe_size})"
        )));
    }
    let max_success = set_size.min(sample_size);
    if overlap > max_success {
        return Err(EnrichmentError::invalid(format!(
            "overlap ({overlap}) exceeds min(set_size, sample_size) = {max_success}"
        )));
    }

    let log_denom = ln_choose(universe_size, sample_size);
    let log_terms: Vec<f64> = (overlap..=max_success)
        .map(|k| {
            ln_choose(set_size, k) + ln_choose(universe_size - set_size, sample_size - k)
                - log_denom
        })
        .collect();

    let max_log = log_terms
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    if max_log == f64::NEG_INFINITY {
        return Ok(0.0);
    }

    let sum: f64 = log_terms.iter().map(|&t| (t - max_log).exp()).sum();
    let p_value = max_log.exp() * sum;

    Ok(p_value.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn choose(n: u128, k: u128) -> u128 {
        if k > n {
            return 0;
        }
        let k = k.min(n - k);
        (0..k).fold(1u128, |acc, i| acc * (n - i) / (i + 1))
    }

    fn exact_sf(big_n: u128, big_k: u128, n: u128, k: u128) -> f64 {
        let num: u128 = (k..=big_k.min(n))
            .map(|i| choose(big_k, i) * choose(big_n - big_k, n - i))
            .sum();
        num as f64 / choose(big_n, n) as f64
    }

    #[test]
    fn test_sf_matches_exact_summation() {
        let p = hypergeometric_sf(20, 4, 5, 2).unwrap();
        assert_relative_eq!(p, 3856.0 / 15504.0, max_relative = 1e-10);

        for (big_n, big_k, n) in [(30u128, 7u128, 9u128), (12, 12, 4), (50, 3, 40), (8, 0, 3)] {
            for k in 0..=big_k.min(n) {
                let p = hypergeometric_sf(big_n as usize, big_k as usize, n as usize, k as usize)
                    .unwrap();
                assert_relative_eq!(p, exact_sf(big_n, big_k, n, k), max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_sf_from_zero_is_one() {
        for (big_n, big_k, n) in [(20, 4, 5), (1000, 300, 250), (7, 7, 7), (10, 0, 0), (5, 2, 0)] {
            let p = hypergeometric_sf(big_n, big_k, n, 0).unwrap();
            assert_relative_eq!(p, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_sf_non_increasing_and_bounded() {
        let (big_n, big_k, n) = (500, 60, 80);
        let mut previous = f64::INFINITY;
        for k in 0..=big_k.min(n) {
            let p = hypergeometric_sf(big_n, big_k, n, k).unwrap();
            assert!((0.0..=1.0).contains(&p), "p-value {p} out of bounds at k={k}");
            assert!(p <= previous + 1e-15, "tail increased at k={k}: {p} > {previous}");
            previous = p;
        }
    }

    #[test]
    fn test_sf_extreme_tail_does_not_underflow_to_garbage() {
        // full overlap of a 200-gene set in a 20k universe
        let p = hypergeometric_sf(20_000, 200, 200, 200).unwrap();
        assert!((0.0..1e-300).contains(&p));
        let p = hypergeometric_sf(20_000, 200, 500, 30).unwrap();
        assert!(p > 0.0 && p < 1e-10);
    }

    #[test]
    fn test_sf_rejects_overlap_outside_support() {
        let err = hypergeometric_sf(20, 4, 5, 5).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("overlap (5)"));
    }

    #[test]
    fn test_sf_rejects_sizes_beyond_universe() {
        assert!(hypergeometric_sf(10, 11, 2, 0).unwrap_err().is_invalid_argument());
        assert!(hypergeometric_sf(10, 2, 11, 0).unwrap_err().is_invalid_argument());
    }
}
