//! Module providing the Model struct for representing a metabolic model.

pub mod bounds;
pub mod metabolite;
pub mod model;
pub mod reaction;
