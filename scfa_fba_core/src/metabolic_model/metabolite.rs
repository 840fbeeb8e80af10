//! Metabolites (species) of a network
use derive_builder::Builder;

/// A metabolite, only the id takes part in optimization
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Metabolite {
    /// Unique identifier, with any SBML `M_` prefix removed
    #[builder(setter(into))]
    pub id: String,
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Compartment id, e.g. `c` or `e`
    #[builder(default = "None")]
    pub compartment: Option<String>,
    #[builder(default = "0")]
    pub charge: i32,
    #[builder(default = "None")]
    pub formula: Option<String>,
}
