//! Column contract of the point and histogram tables

use std::fmt;

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use lv_core::{HistogramEntry, LinkKey, LinkedData, Point};

use crate::DataError;

/// Which of the two input tables a column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Points,
    Histogram,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Points => f.write_str("point"),
            TableKind::Histogram => f.write_str("histogram"),
        }
    }
}

/// Column names the tables are read by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// First embedding coordinate
    pub x: String,
    /// Second embedding coordinate
    pub y: String,
    /// Numeric colour group
    pub group: String,
    /// Point identifier, shared by both tables
    pub label: String,
    pub coord_name: String,
    pub coord_value: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            x: "V1".to_string(),
            y: "V2".to_string(),
            group: "group_var".to_string(),
            label: "label_var".to_string(),
            coord_name: "coord_name".to_string(),
            coord_value: "coord_value".to_string(),
        }
    }
}

impl ColumnNames {
    /// Identifier columns of a table; their cells are kept as written
    pub fn text_columns(&self, table: TableKind) -> Vec<&str> {
        match table {
            TableKind::Points => vec![self.label.as_str()],
            TableKind::Histogram => vec![self.label.as_str(), self.coord_name.as_str()],
        }
    }
}

/// Detect column type from sample data
pub fn detect_column_type<'a>(samples: impl IntoIterator<Item = &'a str>) -> DataType {
    let mut is_int = true;
    let mut is_float = true;
    let mut seen = false;

    for value in samples {
        if value.is_empty() {
            continue;
        }
        seen = true;

        // Try parsing as integer
        if is_int && value.parse::<i64>().is_err() {
            is_int = false;
        }

        // Try parsing as float
        if is_float && value.parse::<f64>().is_err() {
            is_float = false;
        }
    }

    if !seen {
        DataType::Utf8
    } else if is_int {
        DataType::Int64
    } else if is_float {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

fn require_column<'b>(batch: &'b RecordBatch, table: TableKind, column: &str) -> Result<&'b ArrayRef, DataError> {
    batch.column_by_name(column).ok_or_else(|| DataError::MissingColumn {
        table,
        column: column.to_string(),
        available: batch.schema().fields().iter().map(|f| f.name().clone()).collect(),
    })
}

fn malformed(table: TableKind, column: &str, row: usize, reason: impl Into<String>) -> DataError {
    DataError::Malformed {
        table,
        column: column.to_string(),
        row,
        reason: reason.into(),
    }
}

/// Numeric values of a column; numeric strings are accepted
pub fn numeric_column(batch: &RecordBatch, table: TableKind, column: &str) -> Result<Vec<f64>, DataError> {
    let array = require_column(batch, table, column)?;
    let missing = |row| malformed(table, column, row, "missing value");

    let values = if let Some(float_array) = array.as_any().downcast_ref::<Float64Array>() {
        (0..float_array.len())
            .map(|i| if float_array.is_null(i) { Err(missing(i)) } else { Ok(float_array.value(i)) })
            .collect::<Result<Vec<_>, _>>()?
    } else if let Some(int_array) = array.as_any().downcast_ref::<Int64Array>() {
        (0..int_array.len())
            .map(|i| if int_array.is_null(i) { Err(missing(i)) } else { Ok(int_array.value(i) as f64) })
            .collect::<Result<Vec<_>, _>>()?
    } else if let Some(int_array) = array.as_any().downcast_ref::<Int32Array>() {
        (0..int_array.len())
            .map(|i| if int_array.is_null(i) { Err(missing(i)) } else { Ok(int_array.value(i) as f64) })
            .collect::<Result<Vec<_>, _>>()?
    } else if let Some(float_array) = array.as_any().downcast_ref::<Float32Array>() {
        (0..float_array.len())
            .map(|i| if float_array.is_null(i) { Err(missing(i)) } else { Ok(float_array.value(i) as f64) })
            .collect::<Result<Vec<_>, _>>()?
    } else if let Some(str_array) = array.as_any().downcast_ref::<StringArray>() {
        (0..str_array.len())
            .map(|i| {
                if str_array.is_null(i) {
                    return Err(missing(i));
                }
                let text = str_array.value(i).trim();
                text.parse::<f64>()
                    .map_err(|_| malformed(table, column, i, format!("'{text}' is not a number")))
            })
            .collect::<Result<Vec<_>, _>>()?
    } else {
        return Err(malformed(
            table,
            column,
            0,
            format!("unsupported column type {:?}", array.data_type()),
        ));
    };

    Ok(values)
}

/// Cells of a column rendered as text; numbers keep their display form
pub fn text_column(batch: &RecordBatch, table: TableKind, column: &str) -> Result<Vec<String>, DataError> {
    let array = require_column(batch, table, column)?;

    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                return Err(malformed(table, column, i, "missing value"));
            }
            if let Some(str_array) = array.as_any().downcast_ref::<StringArray>() {
                Ok(str_array.value(i).to_string())
            } else if let Some(float_array) = array.as_any().downcast_ref::<Float64Array>() {
                Ok(float_array.value(i).to_string())
            } else {
                arrow::util::display::array_value_to_string(array, i).map_err(DataError::from)
            }
        })
        .collect()
}

/// Extract scatter points from the point table
pub fn points_from_batch(batch: &RecordBatch, columns: &ColumnNames) -> Result<Vec<Point>, DataError> {
    if batch.num_rows() == 0 {
        return Ok(Vec::new());
    }
    let table = TableKind::Points;
    let xs = numeric_column(batch, table, &columns.x)?;
    let ys = numeric_column(batch, table, &columns.y)?;
    let groups = numeric_column(batch, table, &columns.group)?;
    let labels = text_column(batch, table, &columns.label)?;

    Ok(labels
        .into_iter()
        .zip(xs)
        .zip(ys)
        .zip(groups)
        .map(|(((label, x), y), group)| Point::new(label, x, y, group))
        .collect())
}

/// Extract histogram rows from the histogram table
pub fn histogram_from_batch(batch: &RecordBatch, columns: &ColumnNames) -> Result<Vec<HistogramEntry>, DataError> {
    if batch.num_rows() == 0 {
        return Ok(Vec::new());
    }
    let table = TableKind::Histogram;
    let labels = text_column(batch, table, &columns.label)?;
    let names = text_column(batch, table, &columns.coord_name)?;
    let values = numeric_column(batch, table, &columns.coord_value)?;

    Ok(labels
        .into_iter()
        .zip(names)
        .zip(values)
        .map(|((label, name), value)| HistogramEntry::new(LinkKey::new(label), name, value))
        .collect())
}

/// Extract both tables
pub fn linked_data_from_batches(
    points: &RecordBatch,
    histogram: &RecordBatch,
    columns: &ColumnNames,
) -> Result<LinkedData, DataError> {
    let data = LinkedData::new(
        points_from_batch(points, columns)?,
        histogram_from_batch(histogram, columns)?,
    );
    tracing::info!(
        "Extracted {} points and {} histogram rows",
        data.points.len(),
        data.histogram.len()
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn point_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("V1", DataType::Float64, true),
            Field::new("V2", DataType::Int64, true),
            Field::new("group_var", DataType::Utf8, true),
            Field::new("label_var", DataType::Float64, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![0.5, 10.0])),
                Arc::new(Int64Array::from(vec![0, 10])),
                Arc::new(StringArray::from(vec!["1", " 2 "])),
                Arc::new(Float64Array::from(vec![1.0, 2.0])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_points_accept_mixed_numeric_types() {
        let points = points_from_batch(&point_batch(), &ColumnNames::default()).unwrap();
        assert_eq!(
            points,
            vec![Point::new("1", 0.5, 0.0, 1.0), Point::new("2", 10.0, 10.0, 2.0)]
        );
    }

    #[test]
    fn test_missing_column_is_reported() {
        let columns = ColumnNames {
            x: "tsne_1".to_string(),
            ..ColumnNames::default()
        };
        let err = points_from_batch(&point_batch(), &columns).unwrap_err();
        match err {
            DataError::MissingColumn { table, column, available } => {
                assert_eq!(table, TableKind::Points);
                assert_eq!(column, "tsne_1");
                assert!(available.contains(&"V1".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_and_text_cells_are_malformed() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("label_var", DataType::Utf8, true),
            Field::new("coord_name", DataType::Utf8, true),
            Field::new("coord_value", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some("a"), Some("b")])),
                Arc::new(StringArray::from(vec![Some("c1"), Some("c1")])),
                Arc::new(StringArray::from(vec![Some("1.5"), Some("high")])),
            ],
        )
        .unwrap();

        let err = histogram_from_batch(&batch, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, DataError::Malformed { row: 1, .. }));
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_empty_table_skips_column_checks() {
        let batch = RecordBatch::new_empty(Arc::new(Schema::empty()));
        assert!(points_from_batch(&batch, &ColumnNames::default()).unwrap().is_empty());
        assert!(histogram_from_batch(&batch, &ColumnNames::default()).unwrap().is_empty());
    }

    #[test]
    fn test_detect_column_type() {
        assert_eq!(detect_column_type(["1", "2", ""]), DataType::Int64);
        assert_eq!(detect_column_type(["1", "2.5"]), DataType::Float64);
        assert_eq!(detect_column_type(["1", "x"]), DataType::Utf8);
        assert_eq!(detect_column_type([""]), DataType::Utf8);
    }
}
