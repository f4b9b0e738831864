use statrs::function::gamma::ln_gamma;

/// Natural logarithm of the binomial coefficient `C(n, k)`.
///
/// Evaluated through the log-gamma function so that large arguments neither
/// overflow nor lose precision. `C(n, k)` is zero for `k > n`, which is
/// reported as negative infinity.
///
/// # Example
///
/// ```
/// use single_enrichment::enrichment::ln_choose;
///
/// assert!((ln_choose(5, 2) - 10f64.ln()).abs() < 1e-12);
/// assert_eq!(ln_choose(3, 4), f64::NEG_INFINITY);
/// ```
pub fn ln_choose(n: usize, k: usize) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    // C(n, 0) = C(n, n) = 1 exactly; ln_gamma(1) is not guaranteed to be 0.0 bit-for-bit
    if k == 0 || k == n {
        return 0.0;
    }
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}
