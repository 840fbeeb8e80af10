//! Publication tables, projections of the merged results
use std::path::{Path, PathBuf};

use tracing::info;

use crate::report::table::Table;
use crate::report::ReportError;
use crate::scfa_inputs::{Scfa, CONDITION_COLUMN};

/// Result columns reported in the host flux table, in order
pub const HOST_FLUX_COLUMNS: [&str; 12] = [
    "condition",
    "objective_id",
    "objective_value",
    "baseline_objective",
    "objective_delta",
    "objective_pct_change",
    "glucose_flux",
    "oxygen_flux",
    "co2_flux",
    "acetate_flux",
    "propionate_flux",
    "butyrate_flux",
];

/// Dose columns with their display headers
fn dose_headers() -> Vec<(&'static str, String)> {
    Scfa::ALL
        .iter()
        .map(|s| {
            let name = s.name();
            let mut display = name[..1].to_uppercase();
            display.push_str(&name[1..]);
            (s.dose_column(), format!("{display} (mmol/gDW/hr)"))
        })
        .collect()
}

/// SCFA inputs with display headers
pub fn scfa_inputs_table(merged: &Table) -> Table {
    let headers = dose_headers();
    let mut columns = vec![CONDITION_COLUMN];
    columns.extend(headers.iter().map(|(col, _)| *col));
    let mut table = merged.select(&columns);
    let mut renames = vec![(CONDITION_COLUMN, "Condition")];
    renames.extend(headers.iter().map(|(col, display)| (*col, display.as_str())));
    table.rename(&renames);
    table
}

/// Objective and exchange fluxes per condition
pub fn host_fluxes_table(merged: &Table) -> Table {
    merged.select(&HOST_FLUX_COLUMNS)
}

/// Objective with each SCFA's dose and exchange flux
pub fn summary_table(merged: &Table) -> Table {
    let mut columns = vec![CONDITION_COLUMN, "objective_value"];
    for scfa in Scfa::ALL {
        columns.push(scfa.dose_column());
        columns.push(scfa.flux_column());
    }
    merged.select(&columns)
}

/// Write all tables into `dir`
///
/// # Returns
/// Paths of the written tables
pub fn export_tables(merged: &Table, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    let mut written = Vec::new();
    for (name, table) in [
        ("table_scfa_inputs.csv", scfa_inputs_table(merged)),
        ("table_host_fluxes.csv", host_fluxes_table(merged)),
        ("table_summary.csv", summary_table(merged)),
    ] {
        let path = dir.join(name);
        table.write_csv(&path)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged() -> Table {
        let mut t = Table::new(vec![
            "condition",
            "acetate_mmol_gDW_hr",
            "propionate_mmol_gDW_hr",
            "butyrate_mmol_gDW_hr",
            "objective_id",
            "objective_value",
            "acetate_flux",
            "pathway_PYK",
        ]);
        t.push_row(
            ["Low", "1.0", "0.5", "0.25", "ATPM", "42.0", "-1.0", "2.0"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
        .unwrap();
        t
    }

    #[test]
    fn inputs_renamed() {
        let t = scfa_inputs_table(&merged());
        assert_eq!(
            t.columns(),
            &[
                "Condition",
                "Acetate (mmol/gDW/hr)",
                "Propionate (mmol/gDW/hr)",
                "Butyrate (mmol/gDW/hr)"
            ]
        );
        assert_eq!(t.rows()[0][3], "0.25");
    }

    #[test]
    fn only_present_columns() {
        let t = host_fluxes_table(&merged());
        assert_eq!(
            t.columns(),
            &["condition", "objective_id", "objective_value", "acetate_flux"]
        );
        let t = summary_table(&merged());
        assert_eq!(
            t.columns(),
            &[
                "condition",
                "objective_value",
                "acetate_mmol_gDW_hr",
                "acetate_flux",
                "propionate_mmol_gDW_hr",
                "butyrate_mmol_gDW_hr"
            ]
        );
    }

    #[test]
    fn writes_three_tables() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_tables(&merged(), dir.path()).unwrap();
        assert_eq!(written.len(), 3);
        let summary = std::fs::read_to_string(dir.path().join("table_summary.csv")).unwrap();
        assert!(summary.starts_with("condition,objective_value,acetate_mmol_gDW_hr,acetate_flux"));
        assert!(summary.contains("Low,42.0,1.0,-1.0,0.5,0.25"));
    }
}
