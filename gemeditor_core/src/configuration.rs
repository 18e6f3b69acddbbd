//! Process wide defaults used when creating entities and checking results
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

#[derive(Clone, Debug)]
pub struct Configuration {
    /// Lower bound given to newly created reactions
    pub lower_bound: f64,
    /// Upper bound given to newly created reactions
    pub upper_bound: f64,
    /// Most negative bound a reaction is opened to when made reversible
    pub min_bound: f64,
    /// Most positive bound a reaction is opened to when made reversible
    pub max_bound: f64,
    /// Absolute tolerance applied when checking test outcomes against fluxes
    pub outcome_tolerance: f64,
    /// Tolerance below which an elemental imbalance is treated as zero
    pub balance_tolerance: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: 0.,
            upper_bound: 1000.,
            min_bound: -1000.,
            max_bound: 1000.,
            outcome_tolerance: 0.01,
            balance_tolerance: 1e-07,
        }
    }
}

/// Snapshot of the current configuration
///
/// A poisoned lock still holds valid plain data, so its contents are used as is.
pub fn current() -> Configuration {
    match CONFIGURATION.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
