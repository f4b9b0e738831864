//! # single-enrichment
//!
//! Hypergeometric over-representation analysis for gene sets, part of the single-rust ecosystem.
//!
//! Given a universe of genes, a set of significant hits and a batch of named gene sets, every
//! set is scored with the probability of observing at least its overlap with the hits under
//! the hypergeometric null. The computation is stateless: each call validates its inputs,
//! builds a shared read-only hit lookup and maps every gene set to one result record.
//!
//! ## Core Features
//!
//! - **Numerically stable tails**: log-gamma binomials combined with log-sum-exp
//! - **Batch evaluation**: input-ordered results, fanned out over rayon for large batches
//! - **Typed errors**: invalid arguments and out-of-range indices abort the whole batch
//! - **Symbol-level preparation**: build the gene universe from hits, libraries and a background
//!
//! Multiple-testing correction is not applied here.
//!
//! ## Module Organization
//!
//! - **[`enrichment`]**: Hypergeometric test, hit lookup and the batch driver
//! - **[`error`]**: Error type of the enrichment core
//! - **[`backend`]**: Build and environment metadata

pub mod backend;
pub mod enrichment;
pub mod error;
