//! Provides struct representing an optimization problem
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::{Objective, ObjectiveSense};
use crate::optimize::variable::{Variable, VariableBuilder};
use indexmap::IndexMap;
use thiserror::Error;

/// A linear optimization problem with continuous variables and equality constraints
#[derive(Debug, Clone)]
pub struct Problem {
    /// Objective to optimize
    objective: Objective,
    /// Variables of the optimization problem
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem
    constraints: IndexMap<String, Constraint>,
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    // endregion Creation Functions

    // region Accessors
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }
    // endregion Accessors

    // region Adding Variables
    /// Add a variable to the optimization problem, returning its index
    pub fn add_variable(&mut self, mut variable: Variable) -> Result<usize, ProblemError> {
        self.validate_variable(&variable)?;
        let index = self.variables.len();
        variable.index = index;
        self.variables.insert(variable.id.clone(), variable);
        Ok(index)
    }

    /// Create a new variable and add it to the optimization problem
    pub fn add_new_variable(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, ProblemError> {
        let new_var = VariableBuilder::default()
            .id(id)
            .lower_bound(lower_bound)
            .upper_bound(upper_bound)
            .build()
            .map_err(|e| ProblemError::InvalidVariable(e.to_string()))?;
        self.add_variable(new_var)
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ProblemError> {
        self.validate_constraint(&constraint)?;
        self.constraints.insert(constraint.id.clone(), constraint);
        Ok(())
    }

    /// Create a new equality constraint using variable ids, and add it to the problem
    pub fn add_new_equality_constraint_by_id(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        let indices = variables
            .iter()
            .map(|v_id| {
                self.variables
                    .get(*v_id)
                    .map(|v| v.index)
                    .ok_or(ProblemError::NonExistentVariablesInConstraint)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.add_constraint(Constraint::new_equality(id, &indices, coefficients, equals))
    }
    // endregion Adding Constraints

    // region Adding Objective Terms
    /// Add a new linear term to the objective using the variable id
    pub fn add_new_linear_objective_term_by_id(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        let index = match self.variables.get(variable_id) {
            Some(variable) => variable.index,
            None => return Err(ProblemError::NonExistentVariablesInObjective),
        };
        self.objective.add_linear_term(index, coefficient);
        Ok(())
    }

    // endregion Adding Objective Terms

    // region Validation Functions
    /// Check that a variable to be added is valid to add to this problem
    fn validate_variable(&self, variable: &Variable) -> Result<(), ProblemError> {
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists(variable.id.clone()));
        };
        if variable.lower_bound > variable.upper_bound {
            return Err(ProblemError::InvalidVariableBounds(variable.id.clone()));
        }
        Ok(())
    }

    /// Check that a constraint to be added is valid to add to this Problem
    fn validate_constraint(&self, constraint: &Constraint) -> Result<(), ProblemError> {
        if self.constraints.contains_key(&constraint.id) {
            return Err(ProblemError::ConstraintAlreadyExists(constraint.id.clone()));
        }
        if constraint
            .terms
            .iter()
            .any(|t| t.variable >= self.variables.len())
        {
            return Err(ProblemError::NonExistentVariablesInConstraint);
        }
        Ok(())
    }
    // endregion Validation Functions
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add variable {0} with the same id as an existing variable")]
    VariableIdAlreadyExists(String),
    /// Error when trying to add variable with invalid bounds
    #[error("Variable {0} has lower_bound > upper_bound")]
    InvalidVariableBounds(String),
    /// Error when a variable can't be built
    #[error("Unable to build variable: {0}")]
    InvalidVariable(String),
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("Tried to add constraint {0} with the same id as an existing constraint")]
    ConstraintAlreadyExists(String),
    /// Error when trying to add a constraint that contains variables not in the problem
    #[error("Tried to add a constraint with variables not in the problem")]
    NonExistentVariablesInConstraint,
    /// Error when trying to add an objective term which includes variables not in the problem
    #[error("Tried adding an objective term with variables not in the problem")]
    NonExistentVariablesInObjective,
}
