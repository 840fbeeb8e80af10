//! Figures and tables built from the merged simulation results
pub mod figures;
pub mod table;
pub mod tables;

use std::path::PathBuf;

use thiserror::Error;

/// Format a number for a result table, NaN is written as `NaN`
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:?}")
    }
}

/// Errors raised while reading results or writing figures and tables
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unable to read {path}")]
    UnableToRead { path: PathBuf, source: csv::Error },
    #[error("Unable to write {path}")]
    UnableToWrite { path: PathBuf, source: csv::Error },
    #[error("Unable to write figure {path}")]
    UnableToSave {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Column {0} is missing from the results")]
    MissingColumn(String),
    #[error("Row has {found} cells but the table has {expected} columns")]
    RaggedRow { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_cells() {
        assert_eq!(format_float(1.), "1.0");
        assert_eq!(format_float(-0.25), "-0.25");
        assert_eq!(format_float(f64::NAN), "NaN");
        let third = 1. / 3.;
        assert_eq!(format_float(third).parse::<f64>().unwrap(), third);
    }
}
