//! Provides struct for representing an optimization problem's objective

/// Represents the linear objective of an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Terms included in the objective (See [`ObjectiveTerm`])
    pub(crate) terms: Vec<ObjectiveTerm>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    pub(crate) sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: Vec::new(),
            sense,
        }
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    /// Add a new linear term to the objective
    pub fn add_linear_term(&mut self, variable: usize, coefficient: f64) {
        self.terms.push(ObjectiveTerm {
            variable,
            coefficient,
        });
    }

    /// Evaluate the objective for a vector of variable values indexed by variable index
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(t.variable).copied().unwrap_or(0.))
            .sum()
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}

/// A linear term in the objective
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveTerm {
    /// Index of the variable in the problem
    pub variable: usize,
    /// Coefficient for the linear term
    pub coefficient: f64,
}
