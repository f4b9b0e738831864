//! Gene set over-representation analysis.
//!
//! Determines whether predefined gene sets contain more of the observed hits
//! (e.g. genes called significant in a screen) than expected by chance, using
//! the hypergeometric upper tail `P(X >= overlap)`.
//!
//! ## Building Blocks
//!
//! - [`ln_choose`]: log binomial coefficient via log-gamma
//! - [`HitLookup`]: read-only membership table of the hit set
//! - [`hypergeometric_sf`]: log-space upper-tail probability
//! - [`hypergeometric_enrichment`]: validated batch over many gene sets, optionally on the rayon pool
//! - [`run_enrichment`]: symbol-level entry point that builds the universe first
//!
//! ## Quick Example
//!
//! ```rust
//! use single_enrichment::enrichment::{hypergeometric_enrichment, EnrichmentOptions};
//!
//! let gene_sets = vec![vec![0u32, 1, 10, 11]];
//! let names = vec!["pathway_A".to_string()];
//! let hits = vec![0u32, 1, 2, 3, 4];
//!
//! let results = hypergeometric_enrichment(&gene_sets, &names, &hits, 20, &EnrichmentOptions::default()).unwrap();
//! assert_eq!(results[0].overlap, 2);
//! assert!(results[0].p_value < 0.3);
//! ```

mod combinatorics;
mod hypergeom;
mod lookup;
mod ora;
mod universe;
pub(crate) mod utils;

pub use combinatorics::ln_choose;
pub use hypergeom::hypergeometric_sf;
pub use lookup::HitLookup;
pub use ora::{
    EnrichmentOptions, EnrichmentResult, MIN_P_VALUE, enrich_gene_set, hypergeometric_enrichment,
};
pub use universe::{
    AnnotatedEnrichment, GeneUniverse, Libraries, PreparedBatch, PreparedSet, UniverseOptions,
    run_enrichment,
};
