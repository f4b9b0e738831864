use num_traits::PrimInt;

use crate::enrichment::utils::universe_index;
use crate::error::{EnrichmentError, Result};

/// Dense membership table of the hit set over the universe.
///
/// Built once per batch and only read afterwards, so a single lookup can be
/// shared by every worker of the per-set fan-out.
#[derive(Debug, Clone)]
pub struct HitLookup {
    marked: Vec<bool>,
    sample_size: usize,
}

impl HitLookup {
    /// Marks every index of `hit_indices`. Repeated hits are counted once.
    ///
    /// Fails with `OutOfRange` for any index `>= universe_size` and with
    /// `InvalidArgument` when the universe is empty.
    pub fn new<I>(universe_size: usize, hit_indices: &[I]) -> Result<Self>
    where
        I: PrimInt + std::fmt::Display,
    {
        if universe_size == 0 {
            return Err(EnrichmentError::invalid("universe_size must be greater than zero"));
        }

        let mut marked = vec![false; universe_size];
        let mut sample_size = 0;
        for &hit in hit_indices {
            let idx = universe_index(hit, universe_size, "hit")?;
            if !marked[idx] {
                marked[idx] = true;
                sample_size += 1;
            }
        }

        Ok(HitLookup { marked, sample_size })
    }

    pub fn universe_size(&self) -> usize {
        self.marked.len()
    }

    /// Number of distinct hits.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.marked.get(index).copied().unwrap_or(false)
    }

    /// Number of `members` that are hits.
    pub fn overlap(&self, members: &[usize]) -> usize {
        members.iter().filter(|&&idx| self.contains(idx)).count()
    }
}
