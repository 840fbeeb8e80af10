//! Module for constructing and solving optimization problems

pub mod constraint;
pub mod objective;
pub mod problem;
pub mod solvers;
pub mod variable;

use indexmap::IndexMap;

/// Struct representing the solution to an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemSolution {
    /// The status of the optimization problem, representing if the optimization was
    /// completed successfully
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if the optimization was completed successfully, None otherwise
    pub objective_value: Option<f64>,
    /// Values of the variables at the optimum,
    ///
    /// Some(IndexMap), keyed by variable id, with values corresponding to variable
    /// values at optimum if the problem could be solved, None otherwise
    pub variable_values: Option<IndexMap<String, f64>>,
}

impl ProblemSolution {
    /// Solution for a problem which could not be solved
    pub fn failed(status: OptimizationStatus) -> Self {
        Self {
            status,
            objective_value: None,
            variable_values: None,
        }
    }

    /// Value of a single variable at the optimum, if the problem was solved and the
    /// variable exists
    pub fn value(&self, id: &str) -> Option<f64> {
        self.variable_values.as_ref()?.get(id).copied()
    }
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptimizationStatus {
    /// Problem has been optimized
    Optimal,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
}

impl std::fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizationStatus::Optimal => write!(f, "optimal"),
            OptimizationStatus::Unbounded => write!(f, "unbounded"),
            OptimizationStatus::Infeasible => write!(f, "infeasible"),
        }
    }
}
