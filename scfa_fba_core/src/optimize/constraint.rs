//! Provides struct for representing a constraint in an optimization problem
use std::fmt::{Display, Formatter};

/// Represents a linear equality constraint, where the sum of `terms` = `equals`
///
/// For flux balance problems there is one of these per metabolite, encoding the
/// steady state assumption (the row of the stoichiometric matrix times the flux
/// vector equals zero).
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Used to identify the constraint, for mass balances this is the metabolite id
    pub id: String,
    /// Linear terms which are added together, see [`ConstraintTerm`] for more
    pub terms: Vec<ConstraintTerm>,
    /// The right hand side of the equality constraint
    pub equals: f64,
}

impl Constraint {
    /// Create a new equality constraint
    ///
    /// # Parameters
    /// - `id`: Identifier of the constraint
    /// - `variables`: Indices of the variables in the problem
    /// - `coefficients`: Coefficients for the variables
    /// - `equals`: The right hand side of the equality
    ///
    /// # Examples
    /// ```rust
    /// use scfa_fba_core::optimize::constraint::Constraint;
    /// // Create a constraint representing 3*x + 2*y = 6
    /// let new_constraint = Constraint::new_equality("c", &[0, 1], &[3.0, 2.0], 6.);
    /// assert_eq!(new_constraint.terms.len(), 2);
    /// ```
    pub fn new_equality(id: &str, variables: &[usize], coefficients: &[f64], equals: f64) -> Self {
        Constraint {
            id: id.to_string(),
            terms: Constraint::zip_into_terms(variables, coefficients),
            equals,
        }
    }

    fn zip_into_terms(variables: &[usize], coefficients: &[f64]) -> Vec<ConstraintTerm> {
        variables
            .iter()
            .zip(coefficients)
            .map(|(variable, coefficient)| ConstraintTerm {
                variable: *variable,
                coefficient: *coefficient,
            })
            .collect()
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let terms = self
            .terms
            .iter()
            .map(|t| format!("{}*v{}", t.coefficient, t.variable))
            .collect::<Vec<_>>()
            .join(" + ");
        write!(f, "{}: {} = {}", self.id, terms, self.equals)
    }
}

/// A single term in a linear constraint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintTerm {
    /// Index of the variable in the problem
    pub variable: usize,
    /// Coefficient multiplying the variable
    pub coefficient: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let cons = Constraint::new_equality("atp_c", &[0, 3], &[2., -1.], 0.);
        assert_eq!(format!("{}", cons), "atp_c: 2*v0 + -1*v3 = 0");
    }
}
