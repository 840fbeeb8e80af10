//! A small string-typed table, enough to join, project and rename the result CSVs
use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::report::ReportError;

/// Rows of string cells under named columns
///
/// Cells keep the text they were read with, so projecting a table and writing it
/// back out leaves values untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, it must have one cell per column
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), ReportError> {
        if row.len() != self.columns.len() {
            return Err(ReportError::RaggedRow {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of a column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Cells of a column parsed as numbers, cells that aren't numbers become NaN
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        Some(
            self.column(name)?
                .into_iter()
                .map(|cell| cell.trim().parse::<f64>().unwrap_or(f64::NAN))
                .collect(),
        )
    }

    /// Project onto the named columns, in the given order, skipping names the table
    /// doesn't have
    pub fn select(&self, names: &[&str]) -> Table {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        Table {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Rename columns, `(from, to)` pairs naming absent columns are ignored
    pub fn rename(&mut self, renames: &[(&str, &str)]) {
        for (from, to) in renames {
            if let Some(idx) = self.column_index(from) {
                self.columns[idx] = to.to_string();
            }
        }
    }

    /// Left join `right` onto this table on the `key` column
    ///
    /// Every row of this table is kept in order. Columns of `right` are appended,
    /// except its key and any column this table already has. Rows without a match
    /// get empty cells.
    pub fn left_join(&self, right: &Table, key: &str) -> Result<Table, ReportError> {
        let left_key = self
            .column_index(key)
            .ok_or_else(|| ReportError::MissingColumn(key.to_string()))?;
        let right_key = right
            .column_index(key)
            .ok_or_else(|| ReportError::MissingColumn(key.to_string()))?;
        let appended: Vec<usize> = (0..right.columns.len())
            .filter(|&i| i != right_key && !self.has_column(&right.columns[i]))
            .collect();

        let mut lookup: HashMap<&str, &Vec<String>> = HashMap::new();
        for row in &right.rows {
            lookup.entry(row[right_key].as_str()).or_insert(row);
        }

        let mut columns = self.columns.clone();
        columns.extend(appended.iter().map(|&i| right.columns[i].clone()));
        let mut joined = Table::new(columns);
        for row in &self.rows {
            let mut out = row.clone();
            match lookup.get(row[left_key].as_str()) {
                Some(matched) => out.extend(appended.iter().map(|&i| matched[i].clone())),
                None => out.extend(appended.iter().map(|_| String::new())),
            }
            joined.push_row(out)?;
        }
        Ok(joined)
    }

    /// Reorder rows by where their `key` cell appears in `order`
    ///
    /// Rows whose key isn't listed keep their relative order after the listed ones.
    pub fn ordered_by(&self, key: &str, order: &[String]) -> Result<Table, ReportError> {
        let idx = self
            .column_index(key)
            .ok_or_else(|| ReportError::MissingColumn(key.to_string()))?;
        let rank = |row: &Vec<String>| {
            order
                .iter()
                .position(|o| *o == row[idx])
                .unwrap_or(order.len())
        };
        let mut rows = self.rows.clone();
        rows.sort_by_key(rank);
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table, ReportError> {
        let path = path.as_ref();
        let read_err = |source: csv::Error| ReportError::UnableToRead {
            path: path.to_path_buf(),
            source,
        };
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(read_err)?;
        let columns: Vec<String> = rdr
            .headers()
            .map_err(read_err)?
            .iter()
            .map(String::from)
            .collect();
        let mut table = Table::new(columns);
        for record in rdr.records() {
            let record = record.map_err(read_err)?;
            table.push_row(record.iter().map(String::from).collect())?;
        }
        Ok(table)
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let path = path.as_ref();
        let write_err = |source: csv::Error| ReportError::UnableToWrite {
            path: path.to_path_buf(),
            source,
        };
        let mut wtr = WriterBuilder::new().from_path(path).map_err(write_err)?;
        wtr.write_record(&self.columns).map_err(write_err)?;
        for row in &self.rows {
            wtr.write_record(row).map_err(write_err)?;
        }
        wtr.flush()
            .map_err(|source| write_err(csv::Error::from(source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn doses() -> Table {
        let mut t = Table::new(vec!["condition", "acetate_mmol_gDW_hr"]);
        t.push_row(row(&["High", "4.0"])).unwrap();
        t.push_row(row(&["Low", "1.0"])).unwrap();
        t.push_row(row(&["Mid", "2.0"])).unwrap();
        t
    }

    #[test]
    fn ragged_rows_rejected() {
        let mut t = Table::new(vec!["a", "b"]);
        assert!(matches!(
            t.push_row(row(&["1"])),
            Err(ReportError::RaggedRow {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn select_and_rename() {
        let mut t = doses().select(&["acetate_mmol_gDW_hr", "missing", "condition"]);
        assert_eq!(t.columns(), &["acetate_mmol_gDW_hr", "condition"]);
        assert_eq!(t.rows()[0], row(&["4.0", "High"]));
        t.rename(&[("condition", "Condition"), ("absent", "Nothing")]);
        assert_eq!(t.columns(), &["acetate_mmol_gDW_hr", "Condition"]);
    }

    #[test]
    fn numeric_cells() {
        let mut t = Table::new(vec!["x"]);
        for v in ["1.5", "NaN", "", "-2"] {
            t.push_row(row(&[v])).unwrap();
        }
        let x = t.numeric_column("x").unwrap();
        assert!((x[0] - 1.5).abs() < 1e-25);
        assert!(x[1].is_nan());
        assert!(x[2].is_nan());
        assert!((x[3] + 2.).abs() < 1e-25);
        assert_eq!(t.numeric_column("y"), None);
    }

    #[test]
    fn left_join_keeps_left_rows() {
        let mut results = Table::new(vec!["condition", "objective_value"]);
        results.push_row(row(&["Low", "32.0"])).unwrap();
        results.push_row(row(&["High", "102.0"])).unwrap();
        let joined = doses().left_join(&results, "condition").unwrap();
        assert_eq!(
            joined.columns(),
            &["condition", "acetate_mmol_gDW_hr", "objective_value"]
        );
        assert_eq!(joined.rows()[0], row(&["High", "4.0", "102.0"]));
        assert_eq!(joined.rows()[1], row(&["Low", "1.0", "32.0"]));
        assert_eq!(joined.rows()[2], row(&["Mid", "2.0", ""]));
        assert!(matches!(
            doses().left_join(&results, "nope"),
            Err(ReportError::MissingColumn(_))
        ));
    }

    #[test]
    fn order_rows() {
        let order = vec!["Low".to_string(), "Mid".to_string(), "High".to_string()];
        let t = doses().ordered_by("condition", &order).unwrap();
        assert_eq!(t.column("condition").unwrap(), vec!["Low", "Mid", "High"]);
        // unlisted rows go last
        let t = doses()
            .ordered_by("condition", &["Mid".to_string()])
            .unwrap();
        assert_eq!(t.column("condition").unwrap(), vec!["Mid", "High", "Low"]);
    }

    #[test]
    fn csv_round_trip_keeps_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        doses().write_csv(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "condition,acetate_mmol_gDW_hr\nHigh,4.0\nLow,1.0\nMid,2.0\n"
        );
        assert_eq!(Table::read_csv(&path).unwrap(), doses());
    }
}
