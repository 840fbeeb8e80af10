//! This module provides the Model struct for representing an entire metabolic model
use crate::metabolic_model::bounds::{BoundOverlay, ReactionBound};
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;
use crate::optimize::constraint::Constraint;
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::ProblemSolution;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::trace;

/// Represents a Genome Scale Metabolic Model
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    /// Map of reaction ids to Reaction Objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of metabolite ids to Metabolite Objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to objective function coefficients
    pub objective: IndexMap<String, f64>,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            metabolites: IndexMap::new(),
            objective: IndexMap::new(),
            id: None,
            compartments: None,
            version: None,
        }
    }

    /// Add a reaction to the model
    ///
    /// # Parameters
    /// - reaction: Reaction to add
    ///
    /// # Examples
    /// ```rust
    /// use scfa_fba_core::metabolic_model::model::Model;
    /// use scfa_fba_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction").build().unwrap();
    /// model.add_reaction(new_reaction);
    /// assert!(model.has_reaction("new_reaction"));
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a metabolite to the model
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    pub fn has_reaction(&self, id: &str) -> bool {
        self.reactions.contains_key(id)
    }

    pub fn reaction(&self, id: &str) -> Option<&Reaction> {
        self.reactions.get(id)
    }

    /// Current bounds of a reaction, if it exists
    pub fn bounds(&self, id: &str) -> Option<ReactionBound> {
        self.reactions.get(id).map(|r| r.bounds())
    }

    /// Set the bounds of a reaction
    pub fn set_bounds(&mut self, id: &str, bound: ReactionBound) -> Result<(), ModelError> {
        if !bound.is_valid() {
            return Err(ModelError::InvalidBounds {
                id: id.to_string(),
                lower: bound.lower,
                upper: bound.upper,
            });
        }
        match self.reactions.get_mut(id) {
            Some(rxn) => {
                rxn.set_bounds(bound);
                Ok(())
            }
            None => Err(ModelError::UnknownReaction(id.to_string())),
        }
    }

    /// Make a single reaction the objective, with coefficient 1
    pub fn set_objective(&mut self, id: &str) -> Result<(), ModelError> {
        if !self.has_reaction(id) {
            return Err(ModelError::UnknownReaction(id.to_string()));
        }
        self.objective.clear();
        self.objective.insert(id.to_string(), 1.);
        Ok(())
    }

    /// Build the flux balance problem for this model
    ///
    /// One variable per reaction, bounded by the reaction bounds unless the overlay
    /// overrides them, one steady state mass balance per metabolite, and the model
    /// objective, maximized.
    pub fn build_problem(&self, overlay: &BoundOverlay) -> Result<Problem, ModelError> {
        if let Some((id, _)) = overlay.iter().find(|(id, _)| !self.has_reaction(id)) {
            return Err(ModelError::UnknownReaction(id.clone()));
        }
        let mut problem = Problem::new_maximization();
        // Metabolite -> (variable index, coefficient) terms of the mass balance
        let mut balances: IndexMap<&str, (Vec<usize>, Vec<f64>)> = IndexMap::new();
        for met in self.metabolites.keys() {
            balances.insert(met, (Vec::new(), Vec::new()));
        }
        for (id, rxn) in &self.reactions {
            let bound = overlay.get(id).copied().unwrap_or_else(|| rxn.bounds());
            if !bound.is_valid() {
                return Err(ModelError::InvalidBounds {
                    id: id.clone(),
                    lower: bound.lower,
                    upper: bound.upper,
                });
            }
            let index = problem.add_new_variable(id, bound.lower, bound.upper)?;
            if overlay.contains(id) {
                if let Some(var) = problem.variable(id) {
                    trace!("Overlay bound {var}");
                }
            }
            for (met, coef) in &rxn.metabolites {
                let entry = balances.entry(met.as_str()).or_default();
                entry.0.push(index);
                entry.1.push(*coef);
            }
        }
        for (met, (indices, coefficients)) in balances {
            let mut cons = Constraint::new_equality(met, &indices, &coefficients, 0.);
            cons.terms.retain(|t| t.coefficient != 0.);
            trace!("Mass balance {cons}");
            problem.add_constraint(cons)?;
        }
        if self.objective.is_empty() {
            return Err(ModelError::EmptyObjective);
        }
        for (id, coef) in &self.objective {
            problem
                .add_new_linear_objective_term_by_id(id, *coef)
                .map_err(|_| ModelError::UnknownReaction(id.clone()))?;
        }
        Ok(problem)
    }

    /// Optimize the model with the overlay applied, the model itself is not changed
    pub fn optimize(
        &self,
        solver: &dyn Solver,
        overlay: &BoundOverlay,
    ) -> Result<ProblemSolution, ModelError> {
        let problem = self.build_problem(overlay)?;
        trace!(
            solver = solver.name(),
            variables = problem.num_variables(),
            "Solving flux balance problem"
        );
        Ok(solver.solve(&problem)?)
    }
}

/// Errors associated with the model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Reaction {0} is not in the model")]
    UnknownReaction(String),
    #[error("Reaction {id} given invalid bounds ({lower}, {upper})")]
    InvalidBounds { id: String, lower: f64, upper: f64 },
    #[error("The model has no objective")]
    EmptyObjective,
    #[error("Unable to build optimization problem")]
    Problem(#[from] ProblemError),
    #[error("Unable to solve optimization problem")]
    Solver(#[from] SolverError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::solvers::default_solver;
    use crate::optimize::OptimizationStatus;
    use crate::test_models::toy_hepatocyte;

    #[test]
    fn set_bounds() {
        let mut model = toy_hepatocyte();
        model
            .set_bounds("EX_ac_e", ReactionBound::uptake(2.))
            .unwrap();
        assert_eq!(model.bounds("EX_ac_e"), Some(ReactionBound::new(-2., 0.)));
        assert_eq!(
            model.set_bounds("EX_nope_e", ReactionBound::closed()),
            Err(ModelError::UnknownReaction("EX_nope_e".to_string()))
        );
        assert!(matches!(
            model.set_bounds("EX_ac_e", ReactionBound::new(1., 0.)),
            Err(ModelError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn build_problem_shape() {
        let model = toy_hepatocyte();
        let problem = model.build_problem(&BoundOverlay::new()).unwrap();
        assert_eq!(problem.num_variables(), model.reactions.len());
        // every metabolite touched by a reaction gets a mass balance
        assert!(problem.constraints().any(|c| c.id == "atp_c"));
        assert_eq!(problem.objective().terms().len(), 1);
    }

    #[test]
    fn overlay_does_not_touch_model() {
        let model = toy_hepatocyte();
        let before = model.clone();
        let mut overlay = BoundOverlay::new();
        overlay.set("EX_ac_e", ReactionBound::uptake(3.));
        let problem = model.build_problem(&overlay).unwrap();
        let var = problem.variable("EX_ac_e").unwrap();
        assert!((var.lower_bound + 3.).abs() < 1e-25);
        assert!(var.upper_bound.abs() < 1e-25);
        assert_eq!(model, before);

        let mut bad = BoundOverlay::new();
        bad.set("EX_missing_e", ReactionBound::closed());
        assert_eq!(
            model.build_problem(&bad).unwrap_err(),
            ModelError::UnknownReaction("EX_missing_e".to_string())
        );
    }

    #[test]
    fn optimize_toy() {
        let mut model = toy_hepatocyte();
        model
            .set_bounds("EX_glc__D_e", ReactionBound::uptake(1.))
            .unwrap();
        for scfa in ["EX_ac_e", "EX_ppa_e", "EX_but_e"] {
            model.set_bounds(scfa, ReactionBound::closed()).unwrap();
        }
        let solution = model
            .optimize(default_solver().as_ref(), &BoundOverlay::new())
            .unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        // 2 ATP from pyruvate kinase, 10 per acetyl-CoA, 2 acetyl-CoA per glucose
        assert!((solution.objective_value.unwrap() - 22.).abs() < 1e-6);
        assert!((solution.value("EX_glc__D_e").unwrap() + 1.).abs() < 1e-6);
    }

    #[test]
    fn empty_objective() {
        let mut model = toy_hepatocyte();
        model.objective.clear();
        assert_eq!(
            model.build_problem(&BoundOverlay::new()).unwrap_err(),
            ModelError::EmptyObjective
        );
    }
}
