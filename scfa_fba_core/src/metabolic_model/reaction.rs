//! This module provides a struct for representing reactions
use crate::configuration::{default_lower_bound, default_upper_bound};
use crate::metabolic_model::bounds::ReactionBound;
use derive_builder::Builder;
use indexmap::IndexMap;

/// Prefixes marking a reaction as crossing the system boundary
pub const BOUNDARY_PREFIXES: [&str; 4] = ["EX_", "DM_", "sink_", "SK_"];

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Reaction {
    /// Used to identify the reaction
    #[builder(setter(into))]
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Lower flux bound
    #[builder(default = "default_lower_bound()")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "default_upper_bound()")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
}

impl Reaction {
    /// Whether this reaction is an exchange, demand, or sink reaction
    ///
    /// # Note:
    /// Boundary reactions are recognized only by their id prefix (see
    /// [`BOUNDARY_PREFIXES`]), matching the BiGG/VMH naming conventions
    pub fn is_boundary(&self) -> bool {
        is_boundary_id(&self.id)
    }

    /// Current bounds of the reaction
    pub fn bounds(&self) -> ReactionBound {
        ReactionBound::new(self.lower_bound, self.upper_bound)
    }

    /// Set both bounds at once
    pub fn set_bounds(&mut self, bound: ReactionBound) {
        self.lower_bound = bound.lower;
        self.upper_bound = bound.upper;
    }
}

/// Whether a reaction id denotes a boundary reaction
pub fn is_boundary_id(id: &str) -> bool {
    BOUNDARY_PREFIXES.iter().any(|p| id.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_prefixes() {
        assert!(is_boundary_id("EX_glc__D_e"));
        assert!(is_boundary_id("DM_atp_c_"));
        assert!(is_boundary_id("sink_decdicoa[c]"));
        assert!(is_boundary_id("SK_pydx5p_c"));
        assert!(!is_boundary_id("PYK"));
        // Prefix matching is case sensitive
        assert!(!is_boundary_id("ex_glc"));
        assert!(!is_boundary_id("ATPM"));
    }

    #[test]
    fn builder_defaults() {
        let rxn = ReactionBuilder::default().id("PFK").build().unwrap();
        assert!((rxn.lower_bound + 1000.).abs() < 1e-25);
        assert!((rxn.upper_bound - 1000.).abs() < 1e-25);
        assert!(rxn.metabolites.is_empty());
        assert!(!rxn.is_boundary());
    }

    #[test]
    fn set_bounds() {
        let mut rxn = ReactionBuilder::default().id("EX_o2_e").build().unwrap();
        rxn.set_bounds(ReactionBound::uptake(5.));
        assert_eq!(rxn.bounds(), ReactionBound::new(-5., 0.));
    }
}
