//! Data loading utilities

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Per-column summary reported by [`DataLoader::describe`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
}

/// Shape and column summary of a loaded table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<ColumnInfo>,
}

/// Reads comma-separated files with a header row
#[derive(Debug, Clone)]
pub struct DataLoader {
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: 100,
        }
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let file = File::open(path.as_ref())?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PipelineError::DataError(e.to_string()))
    }

    /// Load a file and split it into the feature table and the target series.
    ///
    /// Fails with [`PipelineError::TargetColumnNotFound`] when the target is
    /// not one of the file's columns. The feature table holds every other column.
    pub fn load_dataset(&self, path: impl AsRef<Path>, target_column: &str) -> Result<(DataFrame, Series)> {
        let df = self.load_csv(path)?;
        split_target(&df, target_column)
    }

    /// Summarize rows, columns, dtypes and null counts
    pub fn describe(df: &DataFrame) -> DatasetInfo {
        DatasetInfo {
            n_rows: df.height(),
            n_cols: df.width(),
            columns: df
                .get_columns()
                .iter()
                .map(|col| ColumnInfo {
                    name: col.name().to_string(),
                    dtype: col.dtype().to_string(),
                    null_count: col.null_count(),
                })
                .collect(),
        }
    }
}

/// Separate `target_column` from the rest of the table
pub fn split_target(df: &DataFrame, target_column: &str) -> Result<(DataFrame, Series)> {
    let target = df
        .column(target_column)
        .map_err(|_| PipelineError::TargetColumnNotFound(target_column.to_string()))?
        .as_materialized_series()
        .clone();
    let features = df.drop(target_column)?;
    Ok((features, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a,b,label").unwrap();
        writeln!(file, "1.0,2.0,0").unwrap();
        writeln!(file, "3.0,,1").unwrap();
        writeln!(file, "5.0,6.0,1").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = DataLoader::new().load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_load_dataset_drops_target() {
        let file = create_test_csv();
        let (features, target) = DataLoader::new().load_dataset(file.path(), "label").unwrap();

        let names: Vec<String> = features.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(target.name().as_str(), "label");
        assert_eq!(target.len(), 3);
    }

    #[test]
    fn test_missing_target_column() {
        let file = create_test_csv();
        let err = DataLoader::new().load_dataset(file.path(), "price").unwrap_err();
        assert!(matches!(err, PipelineError::TargetColumnNotFound(ref c) if c == "price"));
    }

    #[test]
    fn test_missing_file() {
        let err = DataLoader::new().load_csv("/nonexistent/data.csv").unwrap_err();
        assert!(matches!(err, PipelineError::IoError(_)));
    }

    #[test]
    fn test_describe() {
        let file = create_test_csv();
        let df = DataLoader::new().load_csv(file.path()).unwrap();
        let info = DataLoader::describe(&df);

        assert_eq!(info.n_rows, 3);
        assert_eq!(info.n_cols, 3);
        assert_eq!(info.columns[1].name, "b");
        assert_eq!(info.columns[1].null_count, 1);
    }
}
