//! Baseline and per-condition optimization of the configured host model
use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::medium::candidates::{exchange_ids, resolve, scfa_ids, GLUCOSE_IDS, OXYGEN_IDS};
use crate::medium::{configure_medium, configure_objective, MediumError, MediumReport};
use crate::metabolic_model::bounds::{BoundOverlay, ReactionBound};
use crate::metabolic_model::model::{Model, ModelError};
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};
use crate::project::HostSimulation;
use crate::report::format_float;
use crate::report::table::Table;
use crate::report::ReportError;
use crate::scfa_inputs::{DoseCondition, Scfa, CONDITION_COLUMN};

/// Pathway reactions whose fluxes are reported, reported as `pathway_<id>`
pub const PATHWAY_REACTIONS: [&str; 17] = [
    "PYK",         // pyruvate kinase
    "PDHm",        // pyruvate dehydrogenase
    "CSm",         // citrate synthase
    "ACONTm",      // aconitase
    "ICDHxm",      // isocitrate dehydrogenase
    "AKGDm",       // alpha-ketoglutarate dehydrogenase
    "SUCDi",       // succinate dehydrogenase
    "FUMm",        // fumarase
    "MDHm",        // malate dehydrogenase
    "PCm",         // pyruvate carboxylase
    "PEPCK",       // phosphoenolpyruvate carboxykinase
    "G6PDH2r",     // glucose-6-phosphate dehydrogenase
    "FBA",         // aldolase
    "PFK",         // phosphofructokinase
    "ATPS4mi",     // ATP synthase
    "NADH2_u10mi", // complex I
    "CYOOm3i",     // complex IV
];

/// Label used for the optimization without any SCFA
pub const BASELINE: &str = "baseline";

/// Result of optimizing one dose condition
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub condition: String,
    pub objective_id: String,
    pub objective_value: f64,
    pub baseline_objective: f64,
    pub objective_delta: f64,
    /// Percent change against the baseline, NaN when the baseline is zero
    pub objective_pct_change: f64,
    /// Exchange fluxes keyed by column name (`glucose_flux` ...), NaN when the model
    /// has no such exchange
    pub exchange_fluxes: IndexMap<String, f64>,
    /// Pathway fluxes keyed by reaction id, NaN for reactions missing from the model
    pub pathway_fluxes: IndexMap<String, f64>,
}

impl SimulationResult {
    /// Column names of the result table, in order
    pub fn columns() -> Vec<String> {
        let mut columns: Vec<String> = [
            CONDITION_COLUMN,
            "objective_id",
            "objective_value",
            "baseline_objective",
            "objective_delta",
            "objective_pct_change",
            "glucose_flux",
            "oxygen_flux",
            "co2_flux",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        columns.extend(Scfa::ALL.iter().map(|s| s.flux_column().to_string()));
        columns.extend(PATHWAY_REACTIONS.iter().map(|r| format!("pathway_{r}")));
        columns
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.condition.clone(),
            self.objective_id.clone(),
            format_float(self.objective_value),
            format_float(self.baseline_objective),
            format_float(self.objective_delta),
            format_float(self.objective_pct_change),
        ];
        cells.extend(self.exchange_fluxes.values().map(|v| format_float(*v)));
        cells.extend(self.pathway_fluxes.values().map(|v| format_float(*v)));
        cells
    }
}

/// 100 * delta / baseline, NaN when the baseline is zero
pub fn percent_change(delta: f64, baseline: f64) -> f64 {
    if baseline == 0. {
        f64::NAN
    } else {
        100. * delta / baseline
    }
}

/// Baseline and per-condition results of a run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    pub baseline_objective: f64,
    pub results: Vec<SimulationResult>,
}

impl SimulationRun {
    pub fn to_table(&self) -> Result<Table, ReportError> {
        let mut table = Table::new(SimulationResult::columns());
        for result in &self.results {
            table.push_row(result.cells())?;
        }
        Ok(table)
    }

    /// One summary line per condition
    pub fn summary(&self) -> String {
        self.results
            .iter()
            .map(|r| {
                format!(
                    "  {:25} ATPM={:.2}  delta={:+.1}%",
                    r.condition, r.objective_value, r.objective_pct_change
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Optimizes the host model under each dose condition
///
/// The configured model is never modified after construction, dose bounds only live
/// in the [`BoundOverlay`] built for each optimization, so conditions can't affect
/// each other whatever order they are run in.
pub struct HostSimulator {
    model: Model,
    solver: Box<dyn Solver>,
    objective_id: String,
    scfa_exchanges: IndexMap<Scfa, Option<String>>,
    glucose: Option<String>,
    oxygen: Option<String>,
    co2: Option<String>,
}

impl fmt::Debug for HostSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSimulator")
            .field("solver", &self.solver.name())
            .field("objective_id", &self.objective_id)
            .field("scfa_exchanges", &self.scfa_exchanges)
            .finish()
    }
}

impl HostSimulator {
    /// Apply the medium and objective to `model` and resolve the reactions the runs
    /// read out
    pub fn prepare(
        mut model: Model,
        host: &HostSimulation,
        solver: Box<dyn Solver>,
    ) -> Result<(Self, MediumReport), SimulationError> {
        let report = configure_medium(&mut model, host)?;
        let objective_id = configure_objective(&mut model)?;
        Ok((HostSimulator::new(model, objective_id, solver), report))
    }

    /// Wrap a model whose medium and objective are already configured
    pub fn new(model: Model, objective_id: String, solver: Box<dyn Solver>) -> Self {
        let mut scfa_exchanges = IndexMap::new();
        for scfa in Scfa::ALL {
            let id = resolve(&model, scfa_ids(scfa));
            match &id {
                Some(id) => info!("  {}: {id}", scfa.name()),
                None => warn!("  {}: NOT FOUND", scfa.name()),
            }
            scfa_exchanges.insert(scfa, id);
        }
        HostSimulator {
            glucose: resolve(&model, &GLUCOSE_IDS),
            oxygen: resolve(&model, &OXYGEN_IDS),
            co2: resolve(&model, &exchange_ids("co2")),
            model,
            solver,
            objective_id,
            scfa_exchanges,
        }
    }

    /// The configured base model
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn objective_id(&self) -> &str {
        &self.objective_id
    }

    /// Exchange reaction an SCFA dose is applied to, if the model has one
    pub fn scfa_exchange(&self, scfa: Scfa) -> Option<&str> {
        self.scfa_exchanges.get(&scfa)?.as_deref()
    }

    /// Uptake bounds for the SCFAs of a condition
    ///
    /// Only SCFAs with a positive dose get an entry, the others keep their medium
    /// bounds.
    pub fn dose_overlay(&self, dose: &DoseCondition) -> BoundOverlay {
        let mut overlay = BoundOverlay::new();
        for scfa in Scfa::ALL {
            let amount = dose.dose(scfa);
            if let Some(id) = self.scfa_exchange(scfa) {
                if amount > 0. {
                    overlay.set(id, ReactionBound::uptake(amount));
                }
            }
        }
        overlay
    }

    /// Optimize with the overlay applied, anything but an optimal solution is an error
    fn solve(
        &self,
        label: &str,
        overlay: &BoundOverlay,
    ) -> Result<ProblemSolution, SimulationError> {
        let solution = self
            .model
            .optimize(self.solver.as_ref(), overlay)
            .map_err(|err| match err {
                ModelError::Solver(source) => SimulationError::Solver {
                    condition: label.to_string(),
                    failure: SolveFailure::Backend(source),
                },
                other => SimulationError::Model {
                    condition: label.to_string(),
                    source: other,
                },
            })?;
        if solution.status != OptimizationStatus::Optimal {
            return Err(SimulationError::Solver {
                condition: label.to_string(),
                failure: SolveFailure::Status(solution.status),
            });
        }
        Ok(solution)
    }

    fn objective_value(
        &self,
        label: &str,
        solution: &ProblemSolution,
    ) -> Result<f64, SimulationError> {
        solution
            .objective_value
            .ok_or_else(|| SimulationError::Solver {
                condition: label.to_string(),
                failure: SolveFailure::Status(solution.status),
            })
    }

    /// Objective with no SCFA uptake
    pub fn baseline(&self) -> Result<f64, SimulationError> {
        info!("Running baseline...");
        let solution = self.solve(BASELINE, &BoundOverlay::new())?;
        let value = self.objective_value(BASELINE, &solution)?;
        info!("  Baseline {} = {value:.4}", self.objective_id);
        Ok(value)
    }

    /// Optimize a single condition against a known baseline objective
    pub fn run_condition(
        &self,
        dose: &DoseCondition,
        baseline_objective: f64,
    ) -> Result<SimulationResult, SimulationError> {
        info!("Running {}...", dose.condition);
        let overlay = self.dose_overlay(dose);
        let solution = self.solve(&dose.condition, &overlay)?;
        let objective_value = self.objective_value(&dose.condition, &solution)?;
        let objective_delta = objective_value - baseline_objective;
        let objective_pct_change = percent_change(objective_delta, baseline_objective);

        let flux = |id: Option<&str>| id.and_then(|id| solution.value(id)).unwrap_or(f64::NAN);
        let mut exchange_fluxes = IndexMap::new();
        exchange_fluxes.insert("glucose_flux".to_string(), flux(self.glucose.as_deref()));
        exchange_fluxes.insert("oxygen_flux".to_string(), flux(self.oxygen.as_deref()));
        exchange_fluxes.insert("co2_flux".to_string(), flux(self.co2.as_deref()));
        for scfa in Scfa::ALL {
            exchange_fluxes.insert(
                scfa.flux_column().to_string(),
                flux(self.scfa_exchange(scfa)),
            );
        }
        let pathway_fluxes = PATHWAY_REACTIONS
            .iter()
            .map(|id| (id.to_string(), flux(Some(*id))))
            .collect();

        info!(
            "  {}={objective_value:.2} ({objective_pct_change:+.1}%)",
            self.objective_id
        );
        Ok(SimulationResult {
            condition: dose.condition.clone(),
            objective_id: self.objective_id.clone(),
            objective_value,
            baseline_objective,
            objective_delta,
            objective_pct_change,
            exchange_fluxes,
            pathway_fluxes,
        })
    }

    /// Run the baseline and then every condition, in the given order
    pub fn run(&self, doses: &[DoseCondition]) -> Result<SimulationRun, SimulationError> {
        let baseline_objective = self.baseline()?;
        let results = doses
            .iter()
            .map(|dose| self.run_condition(dose, baseline_objective))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SimulationRun {
            baseline_objective,
            results,
        })
    }
}

/// Why an optimization produced no usable solution
#[derive(Debug, Clone, PartialEq)]
pub enum SolveFailure {
    /// The problem was infeasible or unbounded
    Status(OptimizationStatus),
    /// The solver backend failed
    Backend(SolverError),
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveFailure::Status(status) => write!(f, "problem is {status}"),
            SolveFailure::Backend(err) => write!(f, "{err}"),
        }
    }
}

/// Errors raised while simulating the host
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Unable to configure the host model")]
    Medium(#[from] MediumError),
    #[error("Unable to build the optimization problem for {condition}")]
    Model {
        condition: String,
        source: ModelError,
    },
    #[error("Optimization failed for {condition}: {failure}")]
    Solver {
        condition: String,
        failure: SolveFailure,
    },
}
