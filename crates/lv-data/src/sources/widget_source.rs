//! Widget payload: both tables and the view options in one JSON document
//!
//! Accepts the document either bare or wrapped in an `x` envelope, and each
//! table either column oriented (`{"V1": [..], ...}`) or row oriented
//! (`[{"V1": .., ...}, ...]`).

use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use lv_core::LinkedViewOptions;

use crate::schema::{linked_data_from_batches, ColumnNames, TableKind};
use crate::sources::LinkedDataSource;
use crate::{DataError, LoadedData};

/// One table of the payload
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PayloadTable {
    Columns(IndexMap<String, Vec<Value>>),
    Rows(Vec<IndexMap<String, Value>>),
}

impl PayloadTable {
    /// Column names with their cells, in first-seen column order
    fn into_columns(self) -> IndexMap<String, Vec<Value>> {
        match self {
            PayloadTable::Columns(columns) => columns,
            PayloadTable::Rows(rows) => {
                let mut names: Vec<String> = Vec::new();
                for row in &rows {
                    for name in row.keys() {
                        if !names.contains(name) {
                            names.push(name.clone());
                        }
                    }
                }
                names
                    .into_iter()
                    .map(|name| {
                        let cells = rows
                            .iter()
                            .map(|row| row.get(&name).cloned().unwrap_or(Value::Null))
                            .collect();
                        (name, cells)
                    })
                    .collect()
            }
        }
    }

    /// Convert to a record batch: all-number columns become Float64, the rest Utf8.
    ///
    /// Columns named in `text_columns` are always Utf8, numbers written as in the JSON.
    pub fn to_record_batch(self, text_columns: &[&str]) -> Result<RecordBatch, DataError> {
        let columns = self.into_columns();
        let row_count = columns.values().map(Vec::len).max().unwrap_or(0);

        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());
        for (name, cells) in columns {
            let numeric = !text_columns.contains(&name.as_str())
                && cells.iter().all(|cell| cell.is_number() || cell.is_null());
            if numeric {
                let mut builder = Float64Builder::new();
                for i in 0..row_count {
                    builder.append_option(cells.get(i).and_then(Value::as_f64));
                }
                fields.push(Field::new(name, DataType::Float64, true));
                arrays.push(Arc::new(builder.finish()));
            } else {
                let mut builder = StringBuilder::new();
                for i in 0..row_count {
                    match cells.get(i) {
                        None | Some(Value::Null) => builder.append_null(),
                        Some(Value::String(text)) => builder.append_value(text),
                        Some(other) => builder.append_value(other.to_string()),
                    }
                }
                fields.push(Field::new(name, DataType::Utf8, true));
                arrays.push(Arc::new(builder.finish()));
            }
        }

        let schema = Arc::new(Schema::new(fields));
        if row_count == 0 {
            return Ok(RecordBatch::new_empty(schema));
        }
        Ok(RecordBatch::try_new(schema, arrays)?)
    }
}

/// Payload as handed over by the host page
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetPayload {
    pub point_data: PayloadTable,
    pub histogram_data: PayloadTable,
    #[serde(default)]
    pub options: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PayloadDocument {
    Wrapped { x: WidgetPayload },
    Bare(WidgetPayload),
}

impl WidgetPayload {
    pub fn from_json(text: &str) -> Result<Self, DataError> {
        let document: PayloadDocument = serde_json::from_str(text)?;
        Ok(match document {
            PayloadDocument::Wrapped { x } => x,
            PayloadDocument::Bare(payload) => payload,
        })
    }

    /// View options carried by the payload. Anything but an object is ignored.
    pub fn view_options(&self) -> Result<Option<LinkedViewOptions>, DataError> {
        match &self.options {
            Some(value @ Value::Object(_)) => Ok(Some(serde_json::from_value(value.clone())?)),
            Some(other) => {
                tracing::debug!("Ignoring non-object widget options: {}", other);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn into_loaded(self, columns: &ColumnNames) -> Result<LoadedData, DataError> {
        let options = self.view_options()?;
        let points = self.point_data.to_record_batch(&columns.text_columns(TableKind::Points))?;
        let histogram = self
            .histogram_data
            .to_record_batch(&columns.text_columns(TableKind::Histogram))?;
        let data = linked_data_from_batches(&points, &histogram, columns)?;
        Ok(LoadedData { data, options })
    }
}

/// Widget payload read from a JSON file
pub struct WidgetPayloadSource {
    name: String,
    path: PathBuf,
    columns: ColumnNames,
}

impl WidgetPayloadSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "payload".to_string());
        Self {
            name,
            path,
            columns: ColumnNames::default(),
        }
    }

    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }
}

#[async_trait]
impl LinkedDataSource for WidgetPayloadSource {
    async fn load(&self) -> Result<LoadedData, DataError> {
        tracing::info!("Reading widget payload from {}", self.path.display());
        let text = tokio::fs::read_to_string(&self.path).await?;
        WidgetPayload::from_json(&text)?.into_loaded(&self.columns)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lv_core::{LinkKey, Point};
    use std::io::Write;

    const COLUMN_PAYLOAD: &str = r#"{
        "x": {
            "point_data": {"V1": [0, 10], "V2": [0, 10], "group_var": [1, 2], "label_var": [1, 2]},
            "histogram_data": {
                "label_var": [1, 1, 2, 2],
                "coord_name": ["c1", "c2", "c1", "c2"],
                "coord_value": [3, -2, 5, 1]
            },
            "options": {"point_radius": 3.0}
        }
    }"#;

    #[test]
    fn test_wrapped_column_payload() {
        let loaded = WidgetPayload::from_json(COLUMN_PAYLOAD)
            .unwrap()
            .into_loaded(&ColumnNames::default())
            .unwrap();

        assert_eq!(loaded.data.points[0], Point::new("1", 0.0, 0.0, 1.0));
        assert_eq!(loaded.data.histogram[3].key, LinkKey::new("2"));
        assert_eq!(loaded.data.histogram[1].coord_value, -2.0);
        let options = loaded.options.unwrap();
        assert_eq!(options.point_radius, 3.0);
        assert_eq!(options.highlight_radius, 4.0);
    }

    #[test]
    fn test_numeric_identifiers_are_kept_exactly() {
        let text = r#"{
            "point_data": {"V1": [0], "V2": [1], "group_var": [1], "label_var": [12345678901234567891]},
            "histogram_data": {
                "label_var": [12345678901234567891, 12345678901234567891],
                "coord_name": [1, 2.5],
                "coord_value": [3, 4]
            }
        }"#;
        let loaded = WidgetPayload::from_json(text)
            .unwrap()
            .into_loaded(&ColumnNames::default())
            .unwrap();

        assert_eq!(loaded.data.points[0].key, LinkKey::new("12345678901234567891"));
        assert_eq!(loaded.data.histogram[0].key, LinkKey::new("12345678901234567891"));
        assert_eq!(loaded.data.histogram[0].coord_name, "1");
        assert_eq!(loaded.data.histogram[1].coord_name, "2.5");
    }

    #[test]
    fn test_bare_row_payload() {
        let text = r#"{
            "point_data": [
                {"V1": 0.5, "V2": 1, "group_var": 1, "label_var": "a"},
                {"V1": 2, "V2": 3, "group_var": 1, "label_var": "b"}
            ],
            "histogram_data": [
                {"label_var": "a", "coord_name": "c1", "coord_value": 1.5}
            ],
            "options": []
        }"#;
        let loaded = WidgetPayload::from_json(text)
            .unwrap()
            .into_loaded(&ColumnNames::default())
            .unwrap();

        assert_eq!(loaded.data.points[1], Point::new("b", 2.0, 3.0, 1.0));
        assert_eq!(loaded.data.histogram.len(), 1);
        assert!(loaded.options.is_none());
    }

    #[test]
    fn test_null_coordinate_is_malformed() {
        let text = r#"{
            "point_data": {"V1": [0, null], "V2": [0, 1], "group_var": [1, 1], "label_var": [1, 2]},
            "histogram_data": {"label_var": [], "coord_name": [], "coord_value": []}
        }"#;
        let err = WidgetPayload::from_json(text)
            .unwrap()
            .into_loaded(&ColumnNames::default())
            .unwrap_err();
        assert!(matches!(err, DataError::Malformed { row: 1, .. }));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(WidgetPayload::from_json("{"), Err(DataError::Json(_))));
    }

    #[tokio::test]
    async fn test_payload_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(COLUMN_PAYLOAD.as_bytes()).unwrap();
        file.flush().unwrap();

        let source = WidgetPayloadSource::new(file.path());
        let loaded = source.load().await.unwrap();
        assert_eq!(loaded.data.points.len(), 2);
    }
}
