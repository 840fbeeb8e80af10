//! Core of scfa_fba, estimating how short chain fatty acid doses change the ATP
//! maintenance capacity of a genome scale hepatocyte model.
//!
//! The work is split into four stages (see [`pipeline`]): validating the dose
//! table, simulating the host model with flux balance analysis, rendering
//! figures, and exporting tables.

pub mod configuration;
pub mod io;
pub mod medium;
pub mod metabolic_model;
pub mod optimize;
pub mod pipeline;
pub mod project;
pub mod report;
pub mod scfa_inputs;
pub mod simulation;
#[cfg(test)]
mod test_models;
