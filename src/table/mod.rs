//! Observation table model
//!
//! An [`ObservationTable`] is an ordered sequence of records with a fixed set of
//! named columns. Some columns act as grouping keys, others hold numeric metrics.
//! Cells are typed [`Value`]s with an explicit canonical string form, so group
//! labels never depend on how a particular library happens to print a number.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::utils::error::{ReportError, Result};

/// A single typed cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Infer a typed value from a raw text cell
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "true" | "True" | "TRUE" => return Value::Bool(true),
            "false" | "False" | "FALSE" => return Value::Bool(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Text(raw.to_string())
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(_) | Value::Text(_) => None,
        }
    }

    /// Canonical display form used for grouping and labels
    pub fn canonical(&self) -> String {
        match self {
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", *f as i64)
            }
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Partition key of a group: one value per grouping column
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    Single(Value),
    Composite(Vec<Value>),
}

impl GroupKey {
    fn from_values(mut values: Vec<Value>) -> Self {
        if values.len() == 1 {
            GroupKey::Single(values.remove(0))
        } else {
            GroupKey::Composite(values)
        }
    }

    /// Canonical strings of each key component, in grouping-column order
    pub fn parts(&self) -> Vec<String> {
        match self {
            GroupKey::Single(v) => vec![v.canonical()],
            GroupKey::Composite(vs) => vs.iter().map(Value::canonical).collect(),
        }
    }
}

/// Rows sharing one partition key
#[derive(Debug, Clone)]
pub struct RowGroup {
    pub key: GroupKey,
    pub rows: Vec<usize>,
}

/// In-memory observation table
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ObservationTable {
    /// Create an empty table with the given column names
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a record; its width must match the column count
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ReportError::validation(format!(
                "row {} has {} cells, table has {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder-style variant of [`push_row`](Self::push_row)
    pub fn with_row(mut self, row: Vec<Value>) -> Result<Self> {
        self.push_row(row)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ReportError::missing_column(name))
    }

    /// Cell at (row, column)
    pub fn value(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Partition rows by the given grouping columns.
    ///
    /// Groups are returned in the order their key is first encountered.
    pub fn group_by<S: AsRef<str>>(&self, columns: &[S]) -> Result<Vec<RowGroup>> {
        if columns.is_empty() {
            return Err(ReportError::validation("grouping spec must not be empty"));
        }
        let indices = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut positions: HashMap<Vec<String>, usize> = HashMap::new();
        let mut groups: Vec<RowGroup> = Vec::new();

        for (row_idx, row) in self.rows.iter().enumerate() {
            let values: Vec<Value> = indices.iter().map(|&i| row[i].clone()).collect();
            let canonical: Vec<String> = values.iter().map(Value::canonical).collect();
            match positions.get(&canonical) {
                Some(&pos) => groups[pos].rows.push(row_idx),
                None => {
                    positions.insert(canonical, groups.len());
                    groups.push(RowGroup {
                        key: GroupKey::from_values(values),
                        rows: vec![row_idx],
                    });
                }
            }
        }

        Ok(groups)
    }

    /// Numeric values of one column for the given rows
    pub fn numeric_values(&self, column: &str, rows: &[usize]) -> Result<Vec<f64>> {
        let col = self.column_index(column)?;
        rows.iter()
            .map(|&r| {
                let cell = self
                    .value(r, col)
                    .ok_or_else(|| ReportError::validation(format!("row {} out of range", r)))?;
                cell.as_f64().ok_or_else(|| {
                    ReportError::invalid_value(column.to_string(), r, cell.canonical())
                })
            })
            .collect()
    }
}
