use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use csv::ReaderBuilder;

use crate::schema::{detect_column_type, linked_data_from_batches, ColumnNames, TableKind};
use crate::sources::LinkedDataSource;
use crate::{DataError, LoadedData};

/// A whole CSV file read into a single record batch
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub schema: Arc<Schema>,
    pub batch: RecordBatch,
}

impl CsvTable {
    /// Read a CSV file with a header row.
    ///
    /// Columns named in `text_columns` keep their cells verbatim as Utf8.
    pub fn read(path: &Path, text_columns: &[&str]) -> Result<Self, DataError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), text_columns)
    }

    pub fn from_reader<R: Read>(reader: R, text_columns: &[&str]) -> Result<Self, DataError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        // Detect column types over every row, so typed cells always parse
        let fields = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let data_type = if text_columns.contains(&name) {
                    DataType::Utf8
                } else {
                    detect_column_type(rows.iter().filter_map(|row| row.get(idx).map(String::as_str)))
                };
                Field::new(name, data_type, true)
            })
            .collect::<Vec<_>>();
        let schema = Arc::new(Schema::new(fields));

        let columns = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(col_idx, field)| build_column(&rows, col_idx, field.data_type()))
            .collect::<Vec<_>>();

        let batch = if rows.is_empty() {
            RecordBatch::new_empty(schema.clone())
        } else {
            RecordBatch::try_new(schema.clone(), columns)?
        };

        Ok(Self { schema, batch })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }
}

/// Build an arrow array for one column; empty cells become null
fn build_column(rows: &[Vec<String>], col_idx: usize, data_type: &DataType) -> ArrayRef {
    let cell = |row: &Vec<String>| row.get(col_idx).filter(|value| !value.is_empty()).cloned();

    match data_type {
        DataType::Int64 => {
            let mut builder = Int64Builder::new();
            for row in rows {
                builder.append_option(cell(row).and_then(|v| v.parse::<i64>().ok()));
            }
            Arc::new(builder.finish())
        }
        DataType::Float64 => {
            let mut builder = Float64Builder::new();
            for row in rows {
                builder.append_option(cell(row).and_then(|v| v.parse::<f64>().ok()));
            }
            Arc::new(builder.finish())
        }
        _ => {
            let mut builder = StringBuilder::new();
            for row in rows {
                builder.append_option(cell(row));
            }
            Arc::new(builder.finish())
        }
    }
}

/// A point CSV and a histogram CSV read side by side
pub struct CsvPairSource {
    name: String,
    points_path: PathBuf,
    histogram_path: PathBuf,
    columns: ColumnNames,
}

impl CsvPairSource {
    pub fn new(points_path: impl Into<PathBuf>, histogram_path: impl Into<PathBuf>) -> Self {
        let points_path = points_path.into();
        let histogram_path = histogram_path.into();
        let name = points_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "CSV".to_string());
        Self {
            name,
            points_path,
            histogram_path,
            columns: ColumnNames::default(),
        }
    }

    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    pub fn points_path(&self) -> &Path {
        &self.points_path
    }

    pub fn histogram_path(&self) -> &Path {
        &self.histogram_path
    }
}

#[async_trait]
impl LinkedDataSource for CsvPairSource {
    async fn load(&self) -> Result<LoadedData, DataError> {
        let points_path = self.points_path.clone();
        let histogram_path = self.histogram_path.clone();
        let columns = self.columns.clone();

        let data = tokio::task::spawn_blocking(move || {
            tracing::info!("Reading points from {}", points_path.display());
            let points = CsvTable::read(&points_path, &columns.text_columns(TableKind::Points))?;
            tracing::info!("Reading histogram from {}", histogram_path.display());
            let histogram = CsvTable::read(&histogram_path, &columns.text_columns(TableKind::Histogram))?;
            linked_data_from_batches(&points.batch, &histogram.batch, &columns)
        })
        .await??;

        Ok(LoadedData { data, options: None })
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
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_column_types_are_detected() {
        let table = CsvTable::from_reader("V1,V2,label_var\n1,0.5,a\n2,1.5,b\n".as_bytes(), &[]).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(table.schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(table.schema.field(2).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let table = CsvTable::from_reader("V1,V2,group_var,label_var\n".as_bytes(), &[]).unwrap();
        assert_eq!(table.num_rows(), 0);
    }

    #[tokio::test]
    async fn test_pair_source_loads_both_tables() {
        let points = write_csv("V1,V2,group_var,label_var\n0,0,1,1\n10,10,2,2\n");
        let histogram = write_csv(
            "label_var,coord_name,coord_value\n1,c1,3\n1,c2,-2\n2,c1,5\n2,c2,1\n",
        );

        let source = CsvPairSource::new(points.path(), histogram.path());
        let loaded = source.load().await.unwrap();

        assert!(loaded.options.is_none());
        assert_eq!(loaded.data.points[1], Point::new("2", 10.0, 10.0, 2.0));
        assert_eq!(loaded.data.histogram.len(), 4);
        assert_eq!(loaded.data.histogram[1].key, LinkKey::new("1"));
        assert_eq!(loaded.data.histogram[1].coord_value, -2.0);
    }

    #[tokio::test]
    async fn test_renamed_columns() {
        let points = write_csv("tx,ty,cluster,id\n0.5,1,3,p1\n");
        let histogram = write_csv("id,feature,value\np1,f,2.5\n");

        let columns = ColumnNames {
            x: "tx".to_string(),
            y: "ty".to_string(),
            group: "cluster".to_string(),
            label: "id".to_string(),
            coord_name: "feature".to_string(),
            coord_value: "value".to_string(),
        };
        let source = CsvPairSource::new(points.path(), histogram.path()).with_columns(columns);
        let loaded = source.load().await.unwrap();

        assert_eq!(loaded.data.points, vec![Point::new("p1", 0.5, 1.0, 3.0)]);
        assert_eq!(loaded.data.histogram[0].coord_name, "f");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let histogram = write_csv("label_var,coord_name,coord_value\n");
        let source = CsvPairSource::new("/nonexistent/points.csv", histogram.path());
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
        assert!(!err.is_malformed_input());
    }

    #[tokio::test]
    async fn test_empty_cell_is_malformed() {
        let points = write_csv("V1,V2,group_var,label_var\n0,,1,1\n");
        let histogram = write_csv("label_var,coord_name,coord_value\n1,c1,3\n");
        let source = CsvPairSource::new(points.path(), histogram.path());
        let err = source.load().await.unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[tokio::test]
    async fn test_identifier_cells_are_kept_verbatim() {
        let points = write_csv("V1,V2,group_var,label_var\n0,0,1,007\n1,1,1,008\n");
        let histogram = write_csv(
            "label_var,coord_name,coord_value\n007,01,3\n007,1e1,2\n008,01,1\n",
        );

        let source = CsvPairSource::new(points.path(), histogram.path());
        let loaded = source.load().await.unwrap();

        assert_eq!(loaded.data.points[0].key, LinkKey::new("007"));
        assert_eq!(loaded.data.points[1].key, LinkKey::new("008"));
        assert_eq!(loaded.data.histogram[0].key, LinkKey::new("007"));
        assert_eq!(loaded.data.histogram[0].coord_name, "01");
        assert_eq!(loaded.data.histogram[1].coord_name, "1e1");
    }

    #[test]
    fn test_identifier_columns_are_text() {
        let table = CsvTable::from_reader("label_var,coord_value\n01,3\n".as_bytes(), &["label_var"]).unwrap();
        assert_eq!(table.schema.field(0).data_type(), &DataType::Utf8);
        assert_eq!(table.schema.field(1).data_type(), &DataType::Int64);
    }

    #[test]
    fn test_type_detection_reads_every_row() {
        let mut contents = String::from("V1\n");
        for i in 0..6000 {
            contents.push_str(&format!("{}\n", i));
        }
        contents.push_str("late\n");

        let table = CsvTable::from_reader(contents.as_bytes(), &[]).unwrap();
        assert_eq!(table.schema.field(0).data_type(), &DataType::Utf8);
        assert_eq!(table.num_rows(), 6001);
    }

    #[tokio::test]
    async fn test_late_text_label_loads() {
        let mut point_rows = String::from("V1,V2,group_var,label_var\n");
        let mut histogram_rows = String::from("label_var,coord_name,coord_value\n");
        for i in 0..5000 {
            point_rows.push_str(&format!("{},{},1,{}\n", i, i, i));
            histogram_rows.push_str(&format!("{},c1,1\n", i));
        }
        point_rows.push_str("1,2,1,p5000\n");
        histogram_rows.push_str("p5000,c1,4\n");

        let points = write_csv(&point_rows);
        let histogram = write_csv(&histogram_rows);
        let loaded = CsvPairSource::new(points.path(), histogram.path()).load().await.unwrap();

        assert_eq!(loaded.data.points.len(), 5001);
        assert_eq!(loaded.data.points[5000].key, LinkKey::new("p5000"));
        assert_eq!(loaded.data.histogram[5000].coord_value, 4.0);
    }

    #[tokio::test]
    async fn test_late_text_value_is_reported() {
        let mut histogram_rows = String::from("label_var,coord_name,coord_value\n");
        for i in 0..5000 {
            histogram_rows.push_str(&format!("1,c{},{}\n", i, i));
        }
        histogram_rows.push_str("1,late,high\n");

        let points = write_csv("V1,V2,group_var,label_var\n0,0,1,1\n");
        let histogram = write_csv(&histogram_rows);
        let err = CsvPairSource::new(points.path(), histogram.path())
            .load()
            .await
            .unwrap_err();

        match err {
            DataError::Malformed { column, row, reason, .. } => {
                assert_eq!(column, "coord_value");
                assert_eq!(row, 5000);
                assert!(reason.contains("not a number"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
