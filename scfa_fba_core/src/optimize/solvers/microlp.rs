//! Solver interface for the pure rust microlp simplex solver

use crate::optimize::problem::Problem;
use crate::optimize::solvers::{solve_with, Solver, SolverError};
use crate::optimize::ProblemSolution;

#[derive(Clone, Copy, Debug, Default)]
pub struct MicrolpSolver;

impl Solver for MicrolpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        solve_with(good_lp::solvers::microlp::microlp, problem)
    }
}
