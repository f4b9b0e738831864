//! Symbol-level preparation of an enrichment batch.
//!
//! Gene sets and hits arrive as gene symbols grouped into libraries. The
//! universe is the sorted union of the background, every library member and
//! every hit; each symbol's position in that order is its universe index.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::enrichment::ora::{EnrichmentOptions, EnrichmentResult, hypergeometric_enrichment};
use crate::error::EnrichmentError;

/// `library name -> set name -> member symbols`
pub type Libraries = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseOptions {
    /// Compare symbols case-insensitively by upper-casing them
    pub uppercase: bool,
}

impl Default for UniverseOptions {
    fn default() -> Self {
        UniverseOptions { uppercase: true }
    }
}

impl UniverseOptions {
    pub fn with_uppercase(mut self, uppercase: bool) -> Self {
        self.uppercase = uppercase;
        self
    }

    fn normalize(&self, symbol: &str) -> Option<String> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            None
        } else if self.uppercase {
            Some(trimmed.to_uppercase())
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Sorted, indexed set of gene symbols.
#[derive(Debug, Clone)]
pub struct GeneUniverse {
    symbols: Vec<String>,
    positions: HashMap<String, usize>,
}

impl GeneUniverse {
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sorted: BTreeSet<String> = symbols.into_iter().map(Into::into).collect();
        let symbols: Vec<String> = sorted.into_iter().collect();
        let positions = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        GeneUniverse { symbols, positions }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.positions.get(symbol).copied()
    }

    pub fn symbol(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(String::as_str)
    }
}

/// A gene set after symbol normalisation.
#[derive(Debug, Clone)]
pub struct PreparedSet {
    pub library: String,
    pub set_name: String,
    pub indices: Vec<usize>,
    pub members: BTreeSet<String>,
}

impl PreparedSet {
    /// `library:set`
    pub fn key(&self) -> String {
        format!("{}:{}", self.library, self.set_name)
    }
}

/// Index-level inputs for [`hypergeometric_enrichment`].
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    pub universe: GeneUniverse,
    pub sets: Vec<PreparedSet>,
    pub hits: BTreeSet<String>,
    pub hit_indices: Vec<usize>,
}

impl PreparedBatch {
    /// Builds the universe and translates hits and gene sets into indices.
    ///
    /// Sets with no usable member are skipped. Fails when the universe is
    /// empty, when no set survives or when no hit lies in the universe.
    pub fn build(
        hits: &[String],
        libraries: &Libraries,
        background: Option<&[String]>,
        options: &UniverseOptions,
    ) -> Result<Self> {
        let hits: BTreeSet<String> = hits.iter().filter_map(|g| options.normalize(g)).collect();

        let mut symbols: BTreeSet<String> = background
            .unwrap_or_default()
            .iter()
            .filter_map(|g| options.normalize(g))
            .collect();
        for sets in libraries.values() {
            for genes in sets.values() {
                symbols.extend(genes.iter().filter_map(|g| options.normalize(g)));
            }
        }
        symbols.extend(hits.iter().cloned());

        if symbols.is_empty() {
            return Err(EnrichmentError::invalid(
                "cannot construct enrichment universe: no genes provided",
            )
            .into());
        }
        let universe = GeneUniverse::from_symbols(symbols);

        let mut sets = Vec::new();
        for (library, library_sets) in libraries {
            for (set_name, genes) in library_sets {
                let members: BTreeSet<String> =
                    genes.iter().filter_map(|g| options.normalize(g)).collect();
                let indices: Vec<usize> =
                    members.iter().filter_map(|g| universe.index_of(g)).collect();
                if indices.is_empty() {
                    trace!(library = %library, set = %set_name, "skipping gene set without usable genes");
                    continue;
                }
                sets.push(PreparedSet {
                    library: library.clone(),
                    set_name: set_name.clone(),
                    indices,
                    members,
                });
            }
        }
        if sets.is_empty() {
            return Err(EnrichmentError::invalid(
                "no gene sets contained usable genes after preprocessing",
            )
            .into());
        }

        let hit_indices: Vec<usize> = hits.iter().filter_map(|g| universe.index_of(g)).collect();
        if hit_indices.is_empty() {
            return Err(EnrichmentError::invalid(
                "no significant genes overlapped the enrichment universe",
            )
            .into());
        }

        debug!(
            universe_size = universe.len(),
            n_sets = sets.len(),
            n_hits = hit_indices.len(),
            "prepared enrichment universe"
        );

        Ok(PreparedBatch {
            universe,
            sets,
            hits,
            hit_indices,
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.sets.iter().map(PreparedSet::key).collect()
    }
}

/// Enrichment result joined with the symbol-level view of its gene set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedEnrichment {
    #[serde(flatten)]
    pub result: EnrichmentResult,
    pub library: String,
    pub set_name: String,
    /// Hits that belong to the set, sorted
    pub genes: Vec<String>,
    pub overlap_ratio: f64,
    pub enrichment_score: f64,
}

/// Runs hypergeometric enrichment of `hits` over every set of `libraries`.
///
/// Results follow library order, then set order within a library. An empty hit
/// list yields an empty result rather than an error.
#[instrument(skip_all, fields(n_hits = hits.len(), n_libraries = libraries.len()))]
pub fn run_enrichment(
    hits: &[String],
    libraries: &Libraries,
    background: Option<&[String]>,
    universe_options: &UniverseOptions,
    options: &EnrichmentOptions,
) -> Result<Vec<AnnotatedEnrichment>> {
    if hits.is_empty() {
        info!("no significant genes provided for enrichment; returning empty result");
        return Ok(Vec::new());
    }

    let batch = PreparedBatch::build(hits, libraries, background, universe_options)
        .context("failed to prepare enrichment inputs")?;
    let gene_sets: Vec<&[usize]> = batch.sets.iter().map(|s| s.indices.as_slice()).collect();

    let results = hypergeometric_enrichment(
        &gene_sets,
        &batch.names(),
        &batch.hit_indices,
        batch.universe.len(),
        options,
    )
    .context("hypergeometric enrichment failed")?;

    let annotated = results
        .into_iter()
        .zip(batch.sets.iter())
        .map(|(result, set)| {
            let genes = set.members.intersection(&batch.hits).cloned().collect();
            AnnotatedEnrichment {
                overlap_ratio: result.overlap_ratio(),
                enrichment_score: result.enrichment_score(),
                library: set.library.clone(),
                set_name: set.set_name.clone(),
                genes,
                result,
            }
        })
        .collect();

    Ok(annotated)
}
