//! Solver interface for HiGHS, requires the highs feature

use crate::optimize::problem::Problem;
use crate::optimize::solvers::{solve_with, Solver, SolverError};
use crate::optimize::ProblemSolution;

#[derive(Clone, Copy, Debug, Default)]
pub struct HighsSolver;

impl Solver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        solve_with(good_lp::solvers::highs::highs, problem)
    }
}
