//! Run history types.
//!
//! A history is an ordered list of rows, each mapping a column name to a
//! scalar value. Histories are stored as JSONL (one JSON object per row) with
//! an optional `# {...}` header line identifying the run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Column holding the logical step counter.
pub const STEP_COLUMN: &str = "_step";

/// Column holding the wall-clock timestamp (unix seconds).
pub const TIMESTAMP_COLUMN: &str = "_timestamp";

/// A single logged value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Nested cells such as logged tables, media, or histograms. Kept so
    /// the row still loads; never plotted.
    Other(serde_json::Value),
}

impl Value {
    /// Numeric view of the value. Only finite numbers have one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// One history row: column name to value. Absent keys mean "not logged".
pub type Row = BTreeMap<String, Value>;

/// Optional identification carried on the first line of a history file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryHeader {
    /// Stable run identifier.
    #[serde(default)]
    pub run_id: Option<String>,

    /// Human-readable run name.
    #[serde(default)]
    pub run_name: Option<String>,
}

/// One run's metric history. Read-only to the processing core.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    /// Display label (run name or id).
    pub label: String,

    /// Stable run identifier, when known.
    pub run_id: Option<String>,

    /// Rows in logging order.
    pub rows: Vec<Row>,
}

impl RawSeries {
    /// Create a history from already-parsed rows.
    pub fn new(label: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            label: label.into(),
            run_id: None,
            rows,
        }
    }

    /// Build a history from numeric columns. Columns may differ in length;
    /// row `i` only contains the columns that have an `i`-th value.
    pub fn from_numeric_columns(label: impl Into<String>, columns: &[(&str, Vec<f64>)]) -> Self {
        let len = columns.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        let rows = (0..len)
            .map(|i| {
                columns
                    .iter()
                    .filter_map(|(name, values)| {
                        values
                            .get(i)
                            .map(|v| (name.to_string(), Value::Number(*v)))
                    })
                    .collect()
            })
            .collect();
        Self::new(label, rows)
    }

    /// Parse JSONL content into a history labeled from its header when
    /// present, else with `fallback_label`.
    pub fn from_jsonl(
        fallback_label: impl Into<String>,
        jsonl: &str,
    ) -> Result<Self, HistoryError> {
        let (header, rows) = parse_history(jsonl)?;
        let header = header.unwrap_or_default();
        let label = header
            .run_name
            .clone()
            .or_else(|| header.run_id.clone())
            .unwrap_or_else(|| fallback_label.into());

        Ok(Self {
            label,
            run_id: header.run_id,
            rows,
        })
    }

    /// Load a history file. The label defaults to the file stem when the
    /// file carries no header.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| HistoryError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "run".to_string());

        Self::from_jsonl(stem, &content).map_err(|e| match e {
            HistoryError::ParseError { line, source, .. } => HistoryError::ParseError {
                path: Some(path.to_path_buf()),
                line,
                source,
            },
            other => other,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Union of column names across all rows.
    pub fn columns(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect()
    }

    /// Whether any row carries the column.
    pub fn has_column(&self, column: &str) -> bool {
        self.rows.iter().any(|row| row.contains_key(column))
    }

    /// Per-row value of a column (`None` where the row lacks it).
    pub fn column<'a>(
        &'a self,
        column: &'a str,
    ) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        self.rows.iter().map(move |row| row.get(column))
    }
}

/// Parse JSONL history content into an optional header and rows.
///
/// Blank lines are skipped. A `#` line whose remainder is a JSON object is
/// read as the header if it precedes all rows; other `#` lines are comments.
pub fn parse_history(jsonl: &str) -> Result<(Option<HistoryHeader>, Vec<Row>), HistoryError> {
    let mut header = None;
    let mut rows = Vec::new();

    for (idx, line) in jsonl.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(comment) = trimmed.strip_prefix('#') {
            if header.is_none() && rows.is_empty() {
                match serde_json::from_str::<HistoryHeader>(comment.trim()) {
                    Ok(parsed) => header = Some(parsed),
                    Err(e) => tracing::debug!(line = idx + 1, "Ignoring comment line: {e}"),
                }
            }
            continue;
        }

        let row: Row = serde_json::from_str(trimmed).map_err(|e| HistoryError::ParseError {
            path: None,
            line: idx + 1,
            source: e,
        })?;
        rows.push(row);
    }

    Ok((header, rows))
}

/// Errors that can occur when reading histories.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error{} at line {line}: {source}", fmt_path(.path))]
    ParseError {
        path: Option<PathBuf>,
        line: usize,
        source: serde_json::Error,
    },
}

fn fmt_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}
