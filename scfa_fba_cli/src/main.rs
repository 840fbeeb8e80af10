use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scfa_fba_core::configuration::{SolverBackend, CONFIGURATION};
use scfa_fba_core::pipeline::{self, Project};
use scfa_fba_core::project::Paths;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "scfa-fba",
    version,
    about = "Estimate how SCFA doses change hepatocyte ATP maintenance"
)]
struct Cli {
    /// Project root, holding data/, results/ and outputs/
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Run configuration, defaults to data/inputs/project_config.yml under the root
    #[arg(long)]
    config: Option<PathBuf>,
    /// LP backend, overrides the build default
    #[arg(long, value_enum)]
    solver: Option<SolverArg>,
    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SolverArg {
    #[value(name = "microlp")]
    Microlp,
    #[value(name = "highs")]
    Highs,
}

impl SolverArg {
    fn backend(self) -> Result<SolverBackend> {
        match self {
            SolverArg::Microlp => Ok(SolverBackend::Microlp),
            #[cfg(feature = "highs")]
            SolverArg::Highs => Ok(SolverBackend::Highs),
            #[cfg(not(feature = "highs"))]
            SolverArg::Highs => anyhow::bail!("scfa-fba was built without the highs feature"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the SCFA dose table and write its canonical copy
    PrepareInputs {
        /// Dose table, defaults to data/inputs/scfa_inputs.csv under the root
        #[arg(long)]
        inputs: Option<PathBuf>,
    },
    /// Run the baseline and every dose condition through the host model
    Simulate,
    /// Render figures from the merged results
    Figures,
    /// Export tables from the merged results
    Tables,
    /// Run every stage in order
    All {
        /// Dose table, defaults to data/inputs/scfa_inputs.csv under the root
        #[arg(long)]
        inputs: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    if let Some(solver) = cli.solver {
        let backend = solver.backend()?;
        match CONFIGURATION.write() {
            Ok(mut config) => config.solver = backend,
            Err(_) => anyhow::bail!("Solver configuration is unavailable"),
        }
    }

    let mut paths = Paths::new(&cli.root);
    if let Some(config) = cli.config {
        paths = paths.with_config(config);
    }
    match cli.command {
        Commands::PrepareInputs { inputs } => {
            let project = load(paths, inputs)?;
            prepare_inputs(&project)
        }
        Commands::Simulate => simulate(&load(paths, None)?),
        Commands::Figures => figures(&load(paths, None)?),
        Commands::Tables => tables(&load(paths, None)?),
        Commands::All { inputs } => {
            let project = load(paths, inputs)?;
            prepare_inputs(&project)?;
            simulate(&project)?;
            figures(&project)?;
            tables(&project)
        }
    }
}

fn load(mut paths: Paths, inputs: Option<PathBuf>) -> Result<Project> {
    if let Some(inputs) = inputs {
        paths = paths.with_scfa_csv(inputs);
    }
    let config_path = paths.config_path.clone();
    Project::load(paths).with_context(|| format!("Loading project {}", config_path.display()))
}

fn prepare_inputs(project: &Project) -> Result<()> {
    let rows = pipeline::prepare_inputs(project).context("Validating SCFA inputs")?;
    println!("{}", pipeline::format_doses(&rows));
    Ok(())
}

fn simulate(project: &Project) -> Result<()> {
    let run = pipeline::run_simulation(project).context("Simulating host metabolism")?;
    println!("Host ATPM summary:");
    println!("{}", run.summary());
    Ok(())
}

fn figures(project: &Project) -> Result<()> {
    let written = pipeline::make_figures(project).context("Rendering figures")?;
    info!("Wrote {} figures to {}", written.len(), project.paths.figs_dir.display());
    Ok(())
}

fn tables(project: &Project) -> Result<()> {
    let written = pipeline::make_tables(project).context("Exporting tables")?;
    info!("Wrote {} tables to {}", written.len(), project.paths.tables_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn every_option_documented() {
        let cli = Cli::command();
        for arg in cli.get_arguments() {
            if arg.get_id() == "help" || arg.get_id() == "version" {
                continue;
            }
            assert!(arg.get_help().is_some(), "--{} has no help", arg.get_id());
        }
    }

    #[test]
    fn solver_flag() {
        let cli = Cli::try_parse_from(["scfa-fba", "--solver", "microlp", "simulate"]).unwrap();
        assert!(matches!(cli.solver, Some(SolverArg::Microlp)));
        assert!(matches!(cli.command, Commands::Simulate));
        assert_eq!(cli.root, PathBuf::from("."));
    }
}
