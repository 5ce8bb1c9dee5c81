use crate::error::SchemaError;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

static NULL: Value = Value::Null;

/// A single typed cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    /// Infer the value of a raw CSV field
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Null
        } else if let Ok(n) = trimmed.parse::<f64>() {
            Value::Number(n)
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Category label for grouping. Integral numbers render without a fraction,
    /// so an id column read as `101` stays `"101"`.
    pub fn label(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Null => Ok(()),
        }
    }
}

/// Semantic type inferred for a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
    /// Every cell was empty
    Empty,
}

/// An in-memory table loaded from one CSV file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub kinds: Vec<ColumnKind>,
    pub rows: Vec<Vec<Value>>,
    /// Name of the column promoted to row identifier, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub index: Vec<String>,
}

impl Dataset {
    /// Build a dataset from already-typed rows, inferring column kinds.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let kinds = infer_kinds(headers.len(), &rows);
        Self {
            headers,
            kinds,
            rows,
            index_name: None,
            index: Vec::new(),
        }
    }

    /// Build a dataset from raw string cells, the way the loader sees them.
    /// Cells of a textual column are all kept as text so labels survive
    /// verbatim (`"08"` stays `"08"`).
    pub fn from_raw(headers: Vec<String>, raw: Vec<Vec<String>>) -> Self {
        let mut rows: Vec<Vec<Value>> = raw
            .iter()
            .map(|r| r.iter().map(|s| Value::infer(s)).collect())
            .collect();
        let kinds = infer_kinds(headers.len(), &rows);
        for (col, kind) in kinds.iter().enumerate() {
            if *kind != ColumnKind::Text {
                continue;
            }
            for (cells, raw_cells) in rows.iter_mut().zip(&raw) {
                if let Some(cell @ Value::Number(_)) = cells.get_mut(col) {
                    *cell = Value::Text(raw_cells[col].trim().to_string());
                }
            }
        }
        Self {
            headers,
            kinds,
            rows,
            index_name: None,
            index: Vec::new(),
        }
    }

    pub fn from_strings(headers: &[&str], rows: &[Vec<&str>]) -> Self {
        Self::from_raw(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    /// Attach a row index (one label per row)
    pub fn with_index(mut self, name: impl Into<String>, index: Vec<String>) -> Self {
        self.index_name = Some(name.into());
        self.index = index;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_index(&self) -> bool {
        self.index_name.is_some()
    }

    /// Find a column by name (ASCII case-insensitive)
    pub fn column_index(&self, name: &str) -> Result<usize, SchemaError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| self.headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
            .ok_or_else(|| SchemaError::MissingColumn {
                column: name.to_string(),
                available: self.headers.join(", "),
            })
    }

    pub fn value(&self, row: usize, column: usize) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// Category labels of a column; `None` for empty cells
    pub fn labels(&self, name: &str) -> Result<Vec<Option<String>>, SchemaError> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).and_then(|v| v.label()).map(Cow::into_owned))
            .collect())
    }

    /// Every value of a column as a number. Empty or textual cells are an error.
    pub fn numbers(&self, name: &str) -> Result<Vec<f64>, SchemaError> {
        let idx = self.column_index(name)?;
        let column = &self.headers[idx];
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| match cells.get(idx).unwrap_or(&NULL) {
                Value::Number(n) => Ok(*n),
                Value::Null => Err(SchemaError::MissingValue {
                    column: column.clone(),
                    row,
                }),
                Value::Text(s) => s.parse::<f64>().map_err(|_| SchemaError::NonNumeric {
                    column: column.clone(),
                    row,
                    value: s.clone(),
                }),
            })
            .collect()
    }
}

fn infer_kinds(width: usize, rows: &[Vec<Value>]) -> Vec<ColumnKind> {
    (0..width)
        .map(|col| {
            let mut kind = ColumnKind::Empty;
            for value in rows.iter().filter_map(|r| r.get(col)) {
                match value {
                    Value::Text(_) => return ColumnKind::Text,
                    Value::Number(_) => kind = ColumnKind::Numeric,
                    Value::Null => {}
                }
            }
            kind
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_data() -> Dataset {
        Dataset::from_strings(
            &["cod_inst", "region_sede", "tasa"],
            &[
                vec!["101", "Valparaíso", "12.5"],
                vec!["102", "Metropolitana", ""],
                vec!["103", "Biobío", "n/a"],
            ],
        )
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(Value::infer(" 40 "), Value::Number(40.0));
        assert_eq!(Value::infer(""), Value::Null);
        assert_eq!(Value::infer("Ñuble"), Value::Text("Ñuble".to_string()));
    }

    #[test]
    fn test_kinds() {
        let data = make_data();
        assert_eq!(
            data.kinds,
            vec![ColumnKind::Numeric, ColumnKind::Text, ColumnKind::Text]
        );
    }

    #[test]
    fn test_integral_label() {
        assert_eq!(Value::Number(101.0).label().unwrap(), "101");
        assert_eq!(Value::Number(2.5).label().unwrap(), "2.5");
        assert!(Value::Null.label().is_none());
    }

    #[test]
    fn test_column_index_case_insensitive() {
        let data = make_data();
        assert_eq!(data.column_index("REGION_SEDE").unwrap(), 1);
        let err = data.column_index("tipo_inst_3").unwrap_err();
        assert!(err.to_string().contains("tipo_inst_3"));
    }

    #[test]
    fn test_numbers_reports_offending_cell() {
        let data = Dataset::from_strings(&["x"], &[vec!["1"], vec![""]]);
        assert!(matches!(
            data.numbers("x"),
            Err(SchemaError::MissingValue { row: 1, .. })
        ));

        let data = Dataset::from_strings(&["tasa"], &[vec!["12.5"], vec!["3"], vec!["n/a"]]);
        match data.numbers("tasa") {
            Err(SchemaError::NonNumeric { row, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_text_column_keeps_raw_labels() {
        let data = Dataset::from_strings(&["code"], &[vec!["08"], vec!["X1"]]);
        assert_eq!(data.rows[0][0], Value::Text("08".to_string()));
    }

    #[test]
    fn test_labels_skip_nulls() {
        let data = make_data();
        let labels = data.labels("tasa").unwrap();
        assert_eq!(labels[1], None);
        assert_eq!(labels[0].as_deref(), Some("12.5"));
    }
}
