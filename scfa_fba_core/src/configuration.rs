//! Process-wide defaults used when building reactions and solving problems
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

#[derive(Debug, Clone)]
pub struct Configuration {
    /// Lower bound given to reactions which don't specify one
    pub lower_bound: f64,
    /// Upper bound given to reactions which don't specify one
    pub upper_bound: f64,
    /// Flux values with a magnitude below this are reported as exactly zero
    pub tolerance: f64,
    /// Solver backend used for optimization
    pub solver: SolverBackend,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            solver: SolverBackend::default(),
        }
    }
}

/// Enum used to specify the default solver backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    /// Use the pure rust microlp simplex solver
    Microlp,
    /// Use the HiGHS solver, requires the highs feature to be enabled
    #[cfg(feature = "highs")]
    Highs,
}

impl Default for SolverBackend {
    fn default() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(feature = "highs")] {
                SolverBackend::Highs
            } else {
                SolverBackend::Microlp
            }
        }
    }
}

/// Read the current default lower bound
pub(crate) fn default_lower_bound() -> f64 {
    CONFIGURATION
        .read()
        .map(|c| c.lower_bound)
        .unwrap_or(-1000.)
}

/// Read the current default upper bound
pub(crate) fn default_upper_bound() -> f64 {
    CONFIGURATION.read().map(|c| c.upper_bound).unwrap_or(1000.)
}

/// Read the current flux tolerance
pub(crate) fn tolerance() -> f64 {
    CONFIGURATION.read().map(|c| c.tolerance).unwrap_or(1e-07)
}

/// Read the current solver backend
pub(crate) fn solver_backend() -> SolverBackend {
    CONFIGURATION
        .read()
        .map(|c| c.solver)
        .unwrap_or_default()
}
