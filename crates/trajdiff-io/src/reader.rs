//! CSV trace reader with header-based column lookup.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads a headed CSV trace into a [`TraceTable`].
///
/// Any number of named columns is accepted; values are kept as raw strings
/// until a column is requested so that text columns such as `actor_type`
/// can be used for row filtering.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
pub struct TraceReader {
    path: PathBuf,
}

impl TraceReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read the CSV file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<TraceTable, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets InconsistentRowLength fire instead of a generic
        // CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| self.parse_error(e))?
            .iter()
            .map(str::to_string)
            .collect();
        debug!(n_columns = headers.len(), "read CSV header");

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;
            if record.len() != headers.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: headers.len(),
                    got: record.len(),
                });
            }
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_rows = rows.len(), n_columns = headers.len(), "trace loaded");
        Ok(TraceTable {
            path: self.path.clone(),
            headers,
            rows,
        })
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

/// Rows of one CSV trace, addressed by header name.
#[derive(Debug, Clone)]
pub struct TraceTable {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TraceTable {
    /// Return the file this table was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the header names.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Return the number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Return true if no rows remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index and name of the first header equal to any of `aliases`.
    ///
    /// Aliases are tried in order, so `["speed", "velocity"]` prefers
    /// `speed` when both are present.
    #[must_use]
    pub fn find_column(&self, aliases: &[&str]) -> Option<(usize, &str)> {
        aliases.iter().find_map(|alias| {
            self.headers
                .iter()
                .position(|h| h == alias)
                .map(|idx| (idx, self.headers[idx].as_str()))
        })
    }

    /// Parse the first column matching `aliases` as finite floats.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::MissingColumn`] | No header matches |
    /// | [`IoError::EmptyColumn`] | The table has no rows |
    /// | [`IoError::NonFiniteValue`] | A cell is blank, NaN, Inf or not a number |
    pub fn column(&self, aliases: &[&str]) -> Result<Vec<f64>, IoError> {
        let (idx, name) = self.find_column(aliases).ok_or_else(|| self.missing(aliases))?;
        if self.rows.is_empty() {
            return Err(IoError::EmptyColumn {
                path: self.path.clone(),
                column: name.to_string(),
            });
        }

        self.rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                let raw = &row[idx];
                match raw.parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(v),
                    _ => Err(IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        column: name.to_string(),
                        raw: raw.clone(),
                    }),
                }
            })
            .collect()
    }

    /// Keep only rows whose `column` cell equals `value`.
    ///
    /// Used to select the ego vehicle out of a multi-actor co-simulation log.
    /// The result may be empty; requesting a column from it then fails with
    /// [`IoError::EmptyColumn`].
    ///
    /// # Errors
    ///
    /// [`IoError::MissingColumn`] if `column` is not a header.
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<TraceTable, IoError> {
        let (idx, _) = self
            .find_column(&[column])
            .ok_or_else(|| self.missing(&[column]))?;
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .filter(|row| row[idx] == value)
            .cloned()
            .collect();
        debug!(column, value, kept = rows.len(), of = self.rows.len(), "rows filtered");
        Ok(TraceTable {
            path: self.path.clone(),
            headers: self.headers.clone(),
            rows,
        })
    }

    fn missing(&self, aliases: &[&str]) -> IoError {
        IoError::MissingColumn {
            path: self.path.clone(),
            aliases: aliases.join(", "),
        }
    }
}
