use num_traits::PrimInt;

use crate::error::{EnrichmentError, Result};

/// Converts a caller-supplied index into a position in `[0, universe_size)`.
pub(crate) fn universe_index<I>(index: I, universe_size: usize, what: &'static str) -> Result<usize>
where
    I: PrimInt + std::fmt::Display,
{
    match index.to_usize() {
        Some(idx) if idx < universe_size => Ok(idx),
        _ => Err(EnrichmentError::out_of_range(what, index, universe_size)),
    }
}

/// Validates every index of a gene set and returns its distinct members, sorted.
pub(crate) fn distinct_members<I>(gene_set: &[I], universe_size: usize) -> Result<Vec<usize>>
where
    I: PrimInt + std::fmt::Display,
{
    let mut members = gene_set
        .iter()
        .map(|&idx| universe_index(idx, universe_size, "gene"))
        .collect::<Result<Vec<usize>>>()?;
    members.sort_unstable();
    members.dedup();
    Ok(members)
}
