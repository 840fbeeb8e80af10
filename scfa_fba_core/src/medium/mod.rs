//! Turning the default bounds of a genome scale model into a hepatocyte medium
//!
//! The medium is set up by closing every boundary reaction and then reopening a
//! curated set of exchanges, which keeps unrestricted uptake from feeding loops in
//! the reconstruction.
pub mod candidates;

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::medium::candidates::{
    exchange_ids, resolve, AMMONIUM_UPTAKE, ESSENTIAL_AMINO_ACIDS, FREE_EXCHANGE, GLUCOSE_IDS,
    IONS, ION_SECRETION_CAP, OBJECTIVE_IDS, OXYGEN_IDS, SECRETION, VITAMINS,
};
use crate::metabolic_model::bounds::ReactionBound;
use crate::metabolic_model::model::{Model, ModelError};
use crate::project::HostSimulation;

/// Internal reactions are limited to [-INTERNAL_FLUX_CAP, INTERNAL_FLUX_CAP]
pub const INTERNAL_FLUX_CAP: f64 = 500.;
/// Magnitude of the free exchange bounds
pub const FREE_EXCHANGE_CAP: f64 = 1000.;
/// Bounds of the objective reaction
pub const OBJECTIVE_BOUND: ReactionBound = ReactionBound {
    lower: 0.,
    upper: 500.,
};

/// Summary of what configuring the medium changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediumReport {
    /// Number of internal reaction bounds pulled in to the cap
    pub capped: usize,
    /// Number of boundary reactions closed
    pub closed: usize,
    /// Number of exchanges reopened
    pub reopened: usize,
    /// Number of medium entities with no matching reaction in the model
    pub skipped: usize,
}

impl fmt::Display for MediumReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capped {} internal bounds, closed {} boundary reactions, reopened {}, skipped {}",
            self.capped, self.closed, self.reopened, self.skipped
        )
    }
}

/// Apply the hepatocyte medium to the model
///
/// Steps are applied in order, later steps override earlier ones:
/// 1. cap internal reaction bounds to ±500
/// 2. close every boundary reaction
/// 3. reopen water and protons, (-1000, 1000)
/// 4. reopen inorganic ions, (-cap, 100)
/// 5. open CO2 (0, 1000) and ammonium (-0.5, 100)
/// 6. limit oxygen and glucose uptake to the configured magnitudes
/// 7. open essential amino acids and vitamins at trace uptake
///
/// Entities without a matching reaction are skipped. Starting from the same model
/// the result is always the same, and applying it twice changes nothing.
pub fn configure_medium(
    model: &mut Model,
    host: &HostSimulation,
) -> Result<MediumReport, MediumError> {
    let mut report = MediumReport::default();

    for rxn in model.reactions.values_mut() {
        if rxn.is_boundary() {
            continue;
        }
        if rxn.lower_bound < -INTERNAL_FLUX_CAP {
            rxn.lower_bound = -INTERNAL_FLUX_CAP;
            report.capped += 1;
        }
        if rxn.upper_bound > INTERNAL_FLUX_CAP {
            rxn.upper_bound = INTERNAL_FLUX_CAP;
            report.capped += 1;
        }
    }

    for rxn in model.reactions.values_mut() {
        if rxn.is_boundary() {
            rxn.set_bounds(ReactionBound::closed());
            report.closed += 1;
        }
    }
    info!(
        "Capped {} internal bounds, closed {} boundary reactions",
        report.capped, report.closed
    );

    let mut medium = MediumSetter {
        model,
        report: &mut report,
    };
    for stem in FREE_EXCHANGE {
        medium.open(
            stem,
            &exchange_ids(stem),
            ReactionBound::new(-FREE_EXCHANGE_CAP, FREE_EXCHANGE_CAP),
        )?;
    }
    for (stem, cap) in IONS {
        medium.open(
            stem,
            &exchange_ids(stem),
            ReactionBound::new(-cap, ION_SECRETION_CAP),
        )?;
    }
    for (stem, cap) in SECRETION {
        let bound = if stem == "nh4" {
            ReactionBound::new(-AMMONIUM_UPTAKE, cap)
        } else {
            ReactionBound::secretion(cap)
        };
        medium.open(stem, &exchange_ids(stem), bound)?;
    }
    if medium
        .open("o2", &OXYGEN_IDS, ReactionBound::uptake(host.oxygen_uptake))?
        .is_none()
    {
        warn!("No oxygen exchange found, oxygen uptake not constrained");
    }
    if medium
        .open(
            "glc__D",
            &GLUCOSE_IDS,
            ReactionBound::uptake(host.glucose_uptake),
        )?
        .is_none()
    {
        warn!("No glucose exchange found, glucose uptake not constrained");
    }
    for stem in ESSENTIAL_AMINO_ACIDS {
        medium.open(
            stem,
            &exchange_ids(stem),
            ReactionBound::uptake(host.amino_acid_uptake),
        )?;
    }
    for stem in VITAMINS {
        medium.open(
            stem,
            &exchange_ids(stem),
            ReactionBound::uptake(host.vitamin_uptake),
        )?;
    }

    info!("Medium configured: {report}");
    Ok(report)
}

struct MediumSetter<'a> {
    model: &'a mut Model,
    report: &'a mut MediumReport,
}

impl MediumSetter<'_> {
    /// Set the bounds of the entity's exchange, if the model has one
    fn open<S: AsRef<str>>(
        &mut self,
        entity: &str,
        candidates: &[S],
        bound: ReactionBound,
    ) -> Result<Option<String>, ModelError> {
        match resolve(self.model, candidates) {
            Some(id) => {
                self.model.set_bounds(&id, bound)?;
                debug!(entity, reaction = %id, ?bound, "Opened exchange");
                self.report.reopened += 1;
                Ok(Some(id))
            }
            None => {
                debug!(entity, "No exchange reaction found, skipping");
                self.report.skipped += 1;
                Ok(None)
            }
        }
    }
}

/// Make ATP maintenance the sole objective
///
/// The objective reaction is bounded to [0, 500] and maximized with coefficient 1.
/// Unlike medium components the objective is required.
///
/// # Returns
/// The id of the objective reaction
pub fn configure_objective(model: &mut Model) -> Result<String, MediumError> {
    let id = resolve(model, &OBJECTIVE_IDS).ok_or_else(|| {
        MediumError::UnresolvedObjective(OBJECTIVE_IDS.iter().map(|s| s.to_string()).collect())
    })?;
    model.set_bounds(&id, OBJECTIVE_BOUND)?;
    model.set_objective(&id)?;
    info!("Objective: {id}");
    Ok(id)
}

/// Errors raised while configuring the medium or objective
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediumError {
    #[error("Can't find the objective reaction, tried {}", .0.join(", "))]
    UnresolvedObjective(Vec<String>),
    #[error("Unable to set bounds")]
    Model(#[from] ModelError),
}
