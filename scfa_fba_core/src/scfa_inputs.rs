//! Reading and validating the SCFA dose table
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column holding the condition names
pub const CONDITION_COLUMN: &str = "condition";

/// The short chain fatty acids a dose condition supplies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scfa {
    Acetate,
    Propionate,
    Butyrate,
}

impl Scfa {
    /// All SCFAs, in table column order
    pub const ALL: [Scfa; 3] = [Scfa::Acetate, Scfa::Propionate, Scfa::Butyrate];

    pub fn name(&self) -> &'static str {
        match self {
            Scfa::Acetate => "acetate",
            Scfa::Propionate => "propionate",
            Scfa::Butyrate => "butyrate",
        }
    }

    /// Dose column of the SCFA in the dose table
    pub fn dose_column(&self) -> &'static str {
        match self {
            Scfa::Acetate => "acetate_mmol_gDW_hr",
            Scfa::Propionate => "propionate_mmol_gDW_hr",
            Scfa::Butyrate => "butyrate_mmol_gDW_hr",
        }
    }

    /// Exchange flux column of the SCFA in the result tables
    pub fn flux_column(&self) -> &'static str {
        match self {
            Scfa::Acetate => "acetate_flux",
            Scfa::Propionate => "propionate_flux",
            Scfa::Butyrate => "butyrate_flux",
        }
    }
}

/// One row of the dose table, SCFA availability in mmol/gDW/hr
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseCondition {
    pub condition: String,
    #[serde(rename = "acetate_mmol_gDW_hr")]
    pub acetate: f64,
    #[serde(rename = "propionate_mmol_gDW_hr")]
    pub propionate: f64,
    #[serde(rename = "butyrate_mmol_gDW_hr")]
    pub butyrate: f64,
}

impl DoseCondition {
    pub fn dose(&self, scfa: Scfa) -> f64 {
        match scfa {
            Scfa::Acetate => self.acetate,
            Scfa::Propionate => self.propionate,
            Scfa::Butyrate => self.butyrate,
        }
    }
}

/// Read and validate the dose table at `path` against the expected condition names
pub fn read_scfa_inputs<P: AsRef<Path>>(
    path: P,
    expected: &[String],
) -> Result<Vec<DoseCondition>, ValidationError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ValidationError::UnableToRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scfa_inputs(file, expected)
}

/// Validate a dose table
///
/// Checks, in order, that the required columns are present, that the set of
/// condition names equals `expected` exactly, that no condition appears twice, and
/// that every dose is a finite non-negative number. The first failing check aborts
/// the whole table. Extra columns are ignored.
///
/// # Returns
/// The conditions sorted by name
pub fn parse_scfa_inputs<R: Read>(
    reader: R,
    expected: &[String],
) -> Result<Vec<DoseCondition>, ValidationError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let required =
        std::iter::once(CONDITION_COLUMN).chain(Scfa::ALL.iter().map(|s| s.dose_column()));
    let missing: Vec<String> = required
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(String::from)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns(missing));
    }
    // Columns are known to exist at this point
    let column = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
    let condition_idx = column(CONDITION_COLUMN);
    let dose_idx: Vec<usize> = Scfa::ALL.iter().map(|s| column(s.dose_column())).collect();

    let records: Vec<StringRecord> = rdr.records().collect::<Result<_, _>>()?;
    let cell = |record: &StringRecord, idx: usize| record.get(idx).unwrap_or("").to_string();

    let expected_set: BTreeSet<String> = expected.iter().cloned().collect();
    let received_set: BTreeSet<String> =
        records.iter().map(|r| cell(r, condition_idx)).collect();
    if expected_set != received_set {
        return Err(ValidationError::ConditionMismatch {
            missing: expected_set.difference(&received_set).cloned().collect(),
            unexpected: received_set.difference(&expected_set).cloned().collect(),
            expected: expected_set.into_iter().collect(),
            received: received_set.into_iter().collect(),
        });
    }

    let mut seen = HashSet::new();
    for record in &records {
        let condition = cell(record, condition_idx);
        if !seen.insert(condition.clone()) {
            return Err(ValidationError::DuplicateCondition(condition));
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let condition = cell(record, condition_idx);
        let mut doses = [0.; 3];
        for (slot, (scfa, idx)) in doses.iter_mut().zip(Scfa::ALL.iter().zip(&dose_idx)) {
            let raw = cell(record, *idx);
            *slot = match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => value,
                _ => {
                    return Err(ValidationError::InvalidValue {
                        condition,
                        column: scfa.dose_column().to_string(),
                        value: raw,
                    })
                }
            };
        }
        rows.push(DoseCondition {
            condition,
            acetate: doses[0],
            propionate: doses[1],
            butyrate: doses[2],
        });
    }

    for scfa in Scfa::ALL {
        if rows.iter().any(|row| row.dose(scfa) < 0.) {
            return Err(ValidationError::NegativeValues {
                column: scfa.dose_column().to_string(),
            });
        }
    }

    rows.sort_by(|a, b| a.condition.cmp(&b.condition));
    Ok(rows)
}

/// Write the canonical dose table
pub fn write_scfa_inputs<P: AsRef<Path>>(
    path: P,
    rows: &[DoseCondition],
) -> Result<(), ValidationError> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new().from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|source| ValidationError::UnableToWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors raised while validating the dose table
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Unable to read {path}")]
    UnableToRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to write {path}")]
    UnableToWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed dose table")]
    Csv(#[from] csv::Error),
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error(
        "Conditions don't match. Expected: {expected:?}, got: {received:?} \
         (missing: {missing:?}, unexpected: {unexpected:?})"
    )]
    ConditionMismatch {
        expected: Vec<String>,
        received: Vec<String>,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    #[error("Condition {0} appears more than once")]
    DuplicateCondition(String),
    #[error("Value {value:?} of {column} for condition {condition} is not a finite number")]
    InvalidValue {
        condition: String,
        column: String,
        value: String,
    },
    #[error("Negative values in {column}")]
    NegativeValues { column: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "condition,acetate_mmol_gDW_hr,propionate_mmol_gDW_hr,butyrate_mmol_gDW_hr\n";

    fn table(rows: &[&str]) -> String {
        let mut out = HEADER.to_string();
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn doses() -> String {
        table(&["Low,1,0.5,0.25", "Mid,2,1,0.5", "High,4,2,1"])
    }

    #[test]
    fn valid_table_is_sorted() {
        let rows =
            parse_scfa_inputs(doses().as_bytes(), &names(&["Low", "Mid", "High"])).unwrap();
        let conditions: Vec<&str> = rows.iter().map(|r| r.condition.as_str()).collect();
        assert_eq!(conditions, vec!["High", "Low", "Mid"]);
        assert!((rows[0].acetate - 4.).abs() < 1e-25);
        assert!((rows[1].dose(Scfa::Butyrate) - 0.25).abs() < 1e-25);
    }

    #[test]
    fn missing_expected_condition() {
        let err = parse_scfa_inputs(
            doses().as_bytes(),
            &names(&["Low", "Mid", "High", "VeryHigh"]),
        )
        .unwrap_err();
        match err {
            ValidationError::ConditionMismatch {
                expected,
                received,
                missing,
                unexpected,
            } => {
                assert_eq!(expected, names(&["High", "Low", "Mid", "VeryHigh"]));
                assert_eq!(received, names(&["High", "Low", "Mid"]));
                assert_eq!(missing, names(&["VeryHigh"]));
                assert!(unexpected.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn condition_set_mismatches() {
        // superset in the table
        let err = parse_scfa_inputs(doses().as_bytes(), &names(&["Low", "Mid"])).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ConditionMismatch { ref unexpected, .. } if unexpected == &names(&["High"])
        ));
        // disjoint
        let err = parse_scfa_inputs(doses().as_bytes(), &names(&["A", "B"])).unwrap_err();
        match err {
            ValidationError::ConditionMismatch {
                missing,
                unexpected,
                ..
            } => {
                assert_eq!(missing, names(&["A", "B"]));
                assert_eq!(unexpected, names(&["High", "Low", "Mid"]));
            }
            other => panic!("unexpected error {other:?}"),
        }
        // the message shows both sets
        let msg = parse_scfa_inputs(doses().as_bytes(), &names(&["A"]))
            .unwrap_err()
            .to_string();
        assert!(msg.contains("\"A\""));
        assert!(msg.contains("\"Mid\""));
    }

    #[test]
    fn missing_columns() {
        let data = "condition,acetate_mmol_gDW_hr\nLow,1\n";
        let err = parse_scfa_inputs(data.as_bytes(), &names(&["Low"])).unwrap_err();
        match err {
            ValidationError::MissingColumns(cols) => assert_eq!(
                cols,
                names(&["propionate_mmol_gDW_hr", "butyrate_mmol_gDW_hr"])
            ),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn negative_dose() {
        let data = table(&["Low,1,0.5,0.25", "Mid,2,-1,0.5"]);
        let err = parse_scfa_inputs(data.as_bytes(), &names(&["Low", "Mid"])).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NegativeValues { ref column } if column == "propionate_mmol_gDW_hr"
        ));
        assert_eq!(err.to_string(), "Negative values in propionate_mmol_gDW_hr");
    }

    #[test]
    fn mismatch_reported_before_sign() {
        let data = table(&["Low,-1,0.5,0.25"]);
        let err = parse_scfa_inputs(data.as_bytes(), &names(&["Mid"])).unwrap_err();
        assert!(matches!(err, ValidationError::ConditionMismatch { .. }));
    }

    #[test]
    fn duplicate_and_bad_values() {
        let data = table(&["Low,1,0.5,0.25", "Low,2,1,0.5"]);
        assert!(matches!(
            parse_scfa_inputs(data.as_bytes(), &names(&["Low"])).unwrap_err(),
            ValidationError::DuplicateCondition(ref c) if c == "Low"
        ));
        let data = table(&["Low,1,lots,0.25"]);
        assert!(matches!(
            parse_scfa_inputs(data.as_bytes(), &names(&["Low"])).unwrap_err(),
            ValidationError::InvalidValue { ref column, .. } if column == "propionate_mmol_gDW_hr"
        ));
        let data = table(&["Low,1,,0.25"]);
        assert!(matches!(
            parse_scfa_inputs(data.as_bytes(), &names(&["Low"])).unwrap_err(),
            ValidationError::InvalidValue { .. }
        ));
    }

    #[test]
    fn extra_columns_dropped() {
        let data = "condition,notes,acetate_mmol_gDW_hr,propionate_mmol_gDW_hr,butyrate_mmol_gDW_hr\n\
                    Low,pilot,1,0.5,0.25\n";
        let rows = parse_scfa_inputs(data.as_bytes(), &names(&["Low"])).unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].propionate - 0.5).abs() < 1e-25);
    }

    #[test]
    fn canonical_output_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let expected = names(&["Low", "Mid", "High"]);
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");

        let rows = parse_scfa_inputs(doses().as_bytes(), &expected).unwrap();
        write_scfa_inputs(&first, &rows).unwrap();
        let reread = read_scfa_inputs(&first, &expected).unwrap();
        assert_eq!(reread, rows);
        write_scfa_inputs(&second, &reread).unwrap();

        let first_bytes = std::fs::read(&first).unwrap();
        assert_eq!(first_bytes, std::fs::read(&second).unwrap());
        assert!(String::from_utf8(first_bytes).unwrap().starts_with(HEADER));
    }
}
