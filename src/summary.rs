//! Table summaries for console reporting.

use std::collections::BTreeSet;

use arrow::array::{Array, StringArray};

use crate::{
    dataset::Table,
    error::{Error, Result},
};

/// Row count, per-column missing values and duplicate rows of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    /// Number of rows.
    pub rows: usize,
    /// Missing values per column, in schema order.
    pub nulls: Vec<(String, usize)>,
    /// Rows that exactly repeat an earlier row.
    pub duplicate_rows: usize,
}

impl TableSummary {
    /// Summarizes a table.
    ///
    /// # Errors
    ///
    /// Returns an error if duplicate detection fails.
    pub fn of(table: &Table) -> Result<Self> {
        Ok(Self {
            rows: table.len(),
            nulls: table.null_counts(),
            duplicate_rows: table.duplicate_rows()?,
        })
    }

    /// Total missing values across all columns.
    pub fn total_nulls(&self) -> usize {
        self.nulls.iter().map(|(_, n)| n).sum()
    }

    /// Logs the summary at info level, one event per column with nulls.
    pub fn log(&self, stage: &str) {
        tracing::info!(
            stage,
            rows = self.rows,
            missing = self.total_nulls(),
            duplicate_rows = self.duplicate_rows,
            "table summary"
        );
        for (column, nulls) in self.nulls.iter().filter(|(_, n)| *n > 0) {
            tracing::info!(stage, column = %column, missing = nulls, "missing values");
        }
    }
}

/// Codes a label encoder would assign to a text column.
///
/// Distinct non-missing values are sorted and numbered from zero. The
/// mapping is only reported; it is never applied to the output.
///
/// # Errors
///
/// Returns an error if the column is absent or not Utf8.
pub fn label_mapping(table: &Table, column: &str) -> Result<Vec<(String, usize)>> {
    let batch = table.batch();
    let (idx, _) = batch
        .schema()
        .column_with_name(column)
        .ok_or_else(|| Error::column_not_found(column))?;

    let values = batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| {
            Error::schema_mismatch(format!(
                "label mapping needs a Utf8 column, '{}' is {:?}",
                column,
                batch.column(idx).data_type()
            ))
        })?;

    let classes: BTreeSet<&str> = values.iter().flatten().collect();
    Ok(classes
        .into_iter()
        .enumerate()
        .map(|(code, class)| (class.to_string(), code))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{Int64Array, RecordBatch},
        datatypes::{DataType, Field, Schema},
    };

    use super::*;

    fn create_test_table() -> Table {
        let schema = Arc::new(Schema::new(vec![
            Field::new("department", DataType::Utf8, true),
            Field::new("id", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![
                    Some("SCT"),
                    Some("AIML"),
                    None,
                    Some("General"),
                    Some("SCT"),
                    Some("SCT"),
                ])),
                Arc::new(Int64Array::from(vec![
                    Some(1),
                    Some(2),
                    Some(3),
                    None,
                    Some(5),
                    Some(5),
                ])),
            ],
        )
        .ok()
        .unwrap_or_else(|| panic!("Should create batch"));
        Table::new(batch)
    }

    #[test]
    fn test_summary() {
        let summary = TableSummary::of(&create_test_table())
            .ok()
            .unwrap_or_else(|| panic!("Should summarize"));

        assert_eq!(summary.rows, 6);
        assert_eq!(summary.duplicate_rows, 1);
        assert_eq!(
            summary.nulls,
            vec![("department".to_string(), 1), ("id".to_string(), 1)]
        );
        assert_eq!(summary.total_nulls(), 2);
        summary.log("test");
    }

    #[test]
    fn test_label_mapping_sorted() {
        let mapping = label_mapping(&create_test_table(), "department")
            .ok()
            .unwrap_or_else(|| panic!("Should map"));

        assert_eq!(
            mapping,
            vec![
                ("AIML".to_string(), 0),
                ("General".to_string(), 1),
                ("SCT".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_label_mapping_wrong_type() {
        let result = label_mapping(&create_test_table(), "id");
        assert!(matches!(result, Err(Error::SchemaMismatch { .. })));
    }

    #[test]
    fn test_label_mapping_missing_column() {
        let result = label_mapping(&create_test_table(), "college");
        assert!(matches!(result, Err(Error::ColumnNotFound { .. })));
    }
}
