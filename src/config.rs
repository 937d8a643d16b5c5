//! Numeric-search configuration.

use serde::{Deserialize, Serialize};

/// Knobs for the per-cell numeric searches and curve sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Angular resolution (radians) at which the opening-minimum search
    /// terminates.
    pub angle_precision: f64,

    /// Hard cap on opening-minimum search iterations; hitting it is logged
    /// and the best value so far is used.
    pub max_search_iterations: u32,

    /// Number of samples used to trace result curves per full turn of
    /// orientation; each cell uses a share proportional to its angular span.
    pub curve_samples_per_turn: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            angle_precision: 0.01,
            max_search_iterations: 1000,
            curve_samples_per_turn: 360,
        }
    }
}
