//! Build and environment metadata of this backend.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub name: String,
    pub backend: String,
    pub version: String,
    pub compiler: String,
    /// Worker threads available to the rayon pool
    pub threads: usize,
    pub has_parallelism: bool,
}

impl BackendInfo {
    fn detect() -> Self {
        let threads = rayon::current_num_threads();
        BackendInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            backend: "rust".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            compiler: env!("SINGLE_ENRICHMENT_RUSTC").to_string(),
            threads,
            has_parallelism: threads > 1,
        }
    }
}

/// Metadata computed on first use and shared for the rest of the process.
pub fn backend_info() -> &'static BackendInfo {
    static INFO: OnceLock<BackendInfo> = OnceLock::new();
    INFO.get_or_init(BackendInfo::detect)
}
