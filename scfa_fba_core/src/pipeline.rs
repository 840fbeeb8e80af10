//! The four pipeline stages, each reading the files the previous stage wrote
//!
//! 1. [`prepare_inputs`] validates the dose table and writes a canonical copy
//! 2. [`run_simulation`] optimizes the host model for each condition
//! 3. [`make_figures`] draws the merged results
//! 4. [`make_tables`] projects the merged results into publication tables
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::io::{read_model, ModelIoError};
use crate::optimize::solvers::default_solver;
use crate::project::{ConfigError, Paths, ProjectConfig};
use crate::report::table::Table;
use crate::report::{figures, tables, ReportError};
use crate::scfa_inputs::{
    read_scfa_inputs, write_scfa_inputs, DoseCondition, ValidationError, CONDITION_COLUMN,
};
use crate::simulation::{HostSimulator, SimulationError, SimulationRun};

/// A project's layout together with its configuration
#[derive(Debug, Clone)]
pub struct Project {
    pub paths: Paths,
    pub config: ProjectConfig,
}

impl Project {
    /// Read the configuration and create the output directories
    pub fn load(paths: Paths) -> Result<Self, PipelineError> {
        let config = ProjectConfig::read(&paths.config_path)?;
        paths.create_dirs()?;
        Ok(Project { paths, config })
    }

    fn conditions(&self) -> &[String] {
        &self.config.project.conditions
    }
}

/// Stage 1, validate the dose table and write the canonical copy
pub fn prepare_inputs(project: &Project) -> Result<Vec<DoseCondition>, PipelineError> {
    info!("Step 01: validating SCFA inputs");
    let rows = read_scfa_inputs(&project.paths.scfa_csv, project.conditions())?;
    let out = project.paths.canonical_inputs();
    write_scfa_inputs(&out, &rows)?;
    info!("Wrote {}", out.display());
    Ok(rows)
}

/// Stage 2, optimize the host model for the baseline and every dose condition
///
/// Writes the per-condition results and the results merged with the doses.
pub fn run_simulation(project: &Project) -> Result<SimulationRun, PipelineError> {
    info!("Step 02: simulating host metabolism");
    let paths = &project.paths;
    let canonical = paths.canonical_inputs();
    let doses = read_scfa_inputs(&canonical, project.conditions())?;

    let model = read_model(&paths.model_path(&project.config))?;
    let (simulator, _) =
        HostSimulator::prepare(model, &project.config.host_simulation, default_solver())?;
    let run = simulator.run(&doses)?;

    let host = run.to_table()?;
    host.write_csv(paths.host_fluxes())?;
    info!("Saved {}", paths.host_fluxes().display());
    let merged = Table::read_csv(&canonical)?.left_join(&host, CONDITION_COLUMN)?;
    merged.write_csv(paths.merged())?;
    info!("Saved {}", paths.merged().display());
    Ok(run)
}

/// Stage 3, render the figures
pub fn make_figures(project: &Project) -> Result<Vec<PathBuf>, PipelineError> {
    info!("Step 03: rendering figures");
    let merged = Table::read_csv(project.paths.merged())?;
    Ok(figures::render_figures(
        &merged,
        project.conditions(),
        &project.config.labels(),
        &project.paths.figs_dir,
    )?)
}

/// Stage 4, export the tables
pub fn make_tables(project: &Project) -> Result<Vec<PathBuf>, PipelineError> {
    info!("Step 04: exporting tables");
    let merged = Table::read_csv(project.paths.merged())?;
    Ok(tables::export_tables(&merged, &project.paths.tables_dir)?)
}

/// Plain text rendering of the validated dose table
pub fn format_doses(rows: &[DoseCondition]) -> String {
    let header = [
        CONDITION_COLUMN.to_string(),
        "acetate_mmol_gDW_hr".to_string(),
        "propionate_mmol_gDW_hr".to_string(),
        "butyrate_mmol_gDW_hr".to_string(),
    ];
    let body: Vec<[String; 4]> = rows
        .iter()
        .map(|r| {
            [
                r.condition.clone(),
                r.acetate.to_string(),
                r.propionate.to_string(),
                r.butyrate.to_string(),
            ]
        })
        .collect();
    let widths: Vec<usize> = (0..4)
        .map(|i| {
            body.iter()
                .map(|r| r[i].len())
                .chain([header[i].len()])
                .max()
                .unwrap_or_default()
        })
        .collect();
    std::iter::once(&header)
        .chain(body.iter())
        .map(|cells| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{cell:>w$}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors from any pipeline stage
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    ModelIo(#[from] ModelIoError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dose_text_is_aligned() {
        let rows = vec![DoseCondition {
            condition: "Low".to_string(),
            acetate: 1.,
            propionate: 0.5,
            butyrate: 0.25,
        }];
        let text = format_doses(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), lines[1].len());
        assert!(lines[0].starts_with("condition acetate_mmol_gDW_hr"));
        assert!(lines[1].trim_start().starts_with("Low"));
        assert!(lines[1].ends_with("0.25"));
    }

    #[test]
    fn missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = Project::load(Paths::new(dir.path())).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Config(ConfigError::UnableToRead { .. })
        ));
    }
}
