//! Runs every stage on the toy network in a scratch project
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use scfa_fba_core::pipeline::{
    make_figures, make_tables, prepare_inputs, run_simulation, PipelineError, Project,
};
use scfa_fba_core::project::Paths;
use scfa_fba_core::report::table::Table;
use scfa_fba_core::scfa_inputs::ValidationError;

const DOSES: &str = "condition,acetate_mmol_gDW_hr,propionate_mmol_gDW_hr,butyrate_mmol_gDW_hr
Low,1,0.5,0.25
High,4,2,1
";

fn test_model(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join("test_models")
        .join(name)
}

fn toy_project(dir: &Path, doses: &str) -> Project {
    project_with_model(dir, doses, &test_model("toy_hepatocyte.json"))
}

fn project_with_model(dir: &Path, doses: &str, model: &Path) -> Project {
    let paths = Paths::new(dir);
    fs::create_dir_all(paths.config_path.parent().unwrap()).unwrap();
    fs::write(
        &paths.config_path,
        format!(
            "project:
  conditions: [Low, High]
  condition_labels: [Low dose, High dose]
human_model:
  sbml_path: '{}'
host_simulation:
  oxygen_uptake: 20
  glucose_uptake: 1
",
            model.display()
        ),
    )
    .unwrap();
    fs::write(&paths.scfa_csv, doses).unwrap();
    Project::load(paths).unwrap()
}

#[test]
fn all_stages() {
    let dir = tempfile::tempdir().unwrap();
    let project = toy_project(dir.path(), DOSES);

    let rows = prepare_inputs(&project).unwrap();
    assert_eq!(rows[0].condition, "High");
    let canonical = fs::read_to_string(project.paths.canonical_inputs()).unwrap();
    assert!(canonical.starts_with("condition,acetate_mmol_gDW_hr"));

    let run = run_simulation(&project).unwrap();
    assert!((run.baseline_objective - 22.).abs() < 1e-6);
    assert!(project.paths.host_fluxes().exists());
    let merged = Table::read_csv(project.paths.merged()).unwrap();
    assert_eq!(merged.column("condition").unwrap(), vec!["High", "Low"]);
    assert_eq!(merged.columns()[1], "acetate_mmol_gDW_hr");
    let objective = merged.numeric_column("objective_value").unwrap();
    assert!((objective[0] - 102.).abs() < 1e-6);
    assert!((objective[1] - 42.).abs() < 1e-6);
    let pct = merged.numeric_column("objective_pct_change").unwrap();
    assert!((pct[1] - 20. / 22. * 100.).abs() < 1e-6);

    let figs = make_figures(&project).unwrap();
    assert!(figs.len() >= 5);
    assert!(figs.iter().all(|f| f.exists()));
    let inputs_fig =
        fs::read_to_string(project.paths.figs_dir.join("fig_scfa_inputs.svg")).unwrap();
    assert!(inputs_fig.contains("Low dose"));

    let tables = make_tables(&project).unwrap();
    assert_eq!(tables.len(), 3);
    let summary =
        Table::read_csv(project.paths.tables_dir.join("table_summary.csv")).unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary.columns()[1], "objective_value");
}

#[test]
fn unexpected_condition_stops_first_stage() {
    let dir = tempfile::tempdir().unwrap();
    let doses = format!("{DOSES}VeryHigh,8,4,2\n");
    let project = toy_project(dir.path(), &doses);
    let err = prepare_inputs(&project).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::ConditionMismatch { .. })
    ));
    assert!(!project.paths.canonical_inputs().exists());
}

#[test]
fn simulation_needs_canonical_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let project = toy_project(dir.path(), DOSES);
    let err = run_simulation(&project).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::UnableToRead { .. })
    ));
}

#[test]
fn gzipped_sbml_network() {
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("models");
    fs::create_dir_all(&models).unwrap();
    let gz = models.join("toy_hepatocyte.xml.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&gz).unwrap(), Compression::default());
    encoder
        .write_all(&fs::read(test_model("toy_hepatocyte.xml")).unwrap())
        .unwrap();
    encoder.finish().unwrap();

    let project = project_with_model(dir.path(), DOSES, &gz);
    prepare_inputs(&project).unwrap();
    let run = run_simulation(&project).unwrap();
    assert!(models.join("cache").join("toy_hepatocyte.xml").exists());
    assert!((run.baseline_objective - 22.).abs() < 1e-6);
    let objective: Vec<f64> = run.results.iter().map(|r| r.objective_value).collect();
    assert!((objective[0] - 102.).abs() < 1e-6);
    assert!((objective[1] - 42.).abs() < 1e-6);
}
