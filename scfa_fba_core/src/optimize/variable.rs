//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

/// A continuous variable of an optimization problem
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Variable {
    /// Used to identify the variable, for flux variables this is the reaction id
    #[builder(setter(into))]
    pub id: String,
    /// Lowest value the variable can take
    #[builder(default = "f64::NEG_INFINITY")]
    pub lower_bound: f64,
    /// Highest value the variable can take
    #[builder(default = "f64::INFINITY")]
    pub upper_bound: f64,
    /// Position of the variable in the problem, set when the variable is added
    #[builder(default = "0")]
    pub(crate) index: usize,
}

impl Variable {
    /// Position of the variable in its problem
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} in [{}, {}]", self.id, self.lower_bound, self.upper_bound)
    }
}
