//! Solver interfaces, translating a [`Problem`] into a backend LP and reading the
//! solution back out
#[cfg(feature = "highs")]
pub mod highs;
pub mod microlp;

use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
};
use indexmap::IndexMap;
use thiserror::Error;

use crate::configuration::{solver_backend, tolerance, SolverBackend};
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Anything able to solve a linear [`Problem`]
pub trait Solver {
    /// Name used in log output
    fn name(&self) -> &'static str;

    /// Solve the problem
    ///
    /// Infeasible and unbounded problems are not errors at this level, they are
    /// reported through the status of the returned [`ProblemSolution`].
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError>;
}

/// Create the solver selected by the global configuration
pub fn default_solver() -> Box<dyn Solver> {
    match solver_backend() {
        SolverBackend::Microlp => Box::new(microlp::MicrolpSolver),
        #[cfg(feature = "highs")]
        SolverBackend::Highs => Box::new(highs::HighsSolver),
    }
}

/// Build the problem with good_lp, solve it with `backend`, and collect the solution
pub(crate) fn solve_with<S>(backend: S, problem: &Problem) -> Result<ProblemSolution, SolverError>
where
    S: good_lp::Solver,
    S::Model: SolverModel<Error = ResolutionError>,
{
    let mut vars = ProblemVariables::new();
    let lp_vars: Vec<good_lp::Variable> = problem
        .variables()
        .map(|v| {
            let mut def = variable();
            if v.lower_bound.is_finite() {
                def = def.min(v.lower_bound);
            }
            if v.upper_bound.is_finite() {
                def = def.max(v.upper_bound);
            }
            vars.add(def)
        })
        .collect();

    let mut objective = Expression::from(0.);
    for term in problem.objective().terms() {
        objective += term.coefficient * lp_vars[term.variable];
    }
    let unsolved = match problem.objective().sense() {
        ObjectiveSense::Maximize => vars.maximise(objective),
        ObjectiveSense::Minimize => vars.minimise(objective),
    };

    let mut model = unsolved.using(backend);
    for cons in problem.constraints() {
        if cons.terms.is_empty() {
            continue;
        }
        let mut lhs = Expression::from(0.);
        for term in &cons.terms {
            lhs += term.coefficient * lp_vars[term.variable];
        }
        model = model.with(constraint::eq(lhs, cons.equals));
    }

    let solution = match model.solve() {
        Ok(solution) => solution,
        Err(ResolutionError::Infeasible) => {
            return Ok(ProblemSolution::failed(OptimizationStatus::Infeasible))
        }
        Err(ResolutionError::Unbounded) => {
            return Ok(ProblemSolution::failed(OptimizationStatus::Unbounded))
        }
        Err(other) => return Err(SolverError::Backend(other.to_string())),
    };

    let tol = tolerance();
    let values: Vec<f64> = lp_vars
        .iter()
        .map(|v| {
            let value = solution.value(*v);
            if value.abs() < tol {
                0.
            } else {
                value
            }
        })
        .collect();
    let objective_value = problem.objective().evaluate(&values);
    let variable_values: IndexMap<String, f64> = problem
        .variables()
        .map(|v| (v.id.clone(), values[v.index()]))
        .collect();
    Ok(ProblemSolution {
        status: OptimizationStatus::Optimal,
        objective_value: Some(objective_value),
        variable_values: Some(variable_values),
    })
}

/// Errors raised by a solver backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The backend failed for a reason other than infeasibility or unboundedness
    #[error("Solver backend failed: {0}")]
    Backend(String),
}
