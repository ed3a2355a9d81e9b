use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between reading a survey file and handing a
/// finished dashboard to the host.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported file format: {} (expected .csv, .xlsx, .xlsm, .xls or .ods)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("workbook has no sheets: {}", .0.display())]
    EmptyWorkbook(PathBuf),

    /// Positional schema did not line up. `row` is `None` for the header.
    #[error("schema mismatch{}: expected {expected} columns, found {actual}", row_suffix(.row))]
    SchemaMismatch {
        expected: usize,
        actual: usize,
        row: Option<usize>,
    },

    #[error("missing column(s): {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    #[error("cannot compute percentage of {column}: sum of {denominator} is zero")]
    DivisionByZero { column: String, denominator: String },

    #[error("series '{series}' has {actual} values but the category axis has {expected}")]
    ShapeMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error("pie slice '{label}' has negative value {value}")]
    NegativeValue { label: String, value: f64 },

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(r) => format!(" at data row {}", r),
        None => " in header".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_names_counts_and_row() {
        let header = DashboardError::SchemaMismatch { expected: 30, actual: 29, row: None };
        assert_eq!(header.to_string(), "schema mismatch in header: expected 30 columns, found 29");

        let row = DashboardError::SchemaMismatch { expected: 30, actual: 31, row: Some(4) };
        assert_eq!(row.to_string(), "schema mismatch at data row 4: expected 30 columns, found 31");
    }

    #[test]
    fn missing_column_lists_every_name() {
        let err = DashboardError::MissingColumn(vec!["DanoLeve".into(), "Regiao6".into()]);
        assert_eq!(err.to_string(), "missing column(s): DanoLeve, Regiao6");
    }
}
