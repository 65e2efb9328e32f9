//! The in-memory [`Table`] the pipeline stages pass between each other.

use std::path::Path;

use arrow::{array::RecordBatch, datatypes::SchemaRef};

use crate::{
    error::{Error, Result},
    transform::{Transform, Unique},
};

/// A table of records backed by a single Arrow RecordBatch.
///
/// Stages consume a `Table` and return a new one ([`Table::apply`]), so a
/// table has exactly one owner at any point of the pipeline. An empty table
/// is valid.
///
/// # Example
///
/// ```ignore
/// use depurar::{Table, Unique};
///
/// let table = Table::new(batch);
/// let deduplicated = table.apply(&Unique::all())?;
/// deduplicated.to_csv("out.csv")?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    /// Wraps a RecordBatch.
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.batch.num_rows()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Returns the schema.
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Returns the underlying batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consumes the table and returns the underlying batch.
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    /// Applies a transform, consuming this table.
    ///
    /// # Errors
    ///
    /// Returns whatever error the transform raises.
    pub fn apply<T: Transform + ?Sized>(self, transform: &T) -> Result<Self> {
        transform.apply(self.batch).map(Self::new)
    }

    /// Returns the null count of every column, in schema order.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.batch
            .schema()
            .fields()
            .iter()
            .zip(self.batch.columns())
            .map(|(field, col)| (field.name().clone(), col.null_count()))
            .collect()
    }

    /// Returns the total number of nulls across all columns.
    pub fn total_nulls(&self) -> usize {
        self.batch.columns().iter().map(|c| c.null_count()).sum()
    }

    /// Counts rows that exactly repeat an earlier row.
    ///
    /// # Errors
    ///
    /// Never fails for a well-formed batch; the signature mirrors
    /// [`Unique::count_duplicates`].
    pub fn duplicate_rows(&self) -> Result<usize> {
        Unique::all().count_duplicates(&self.batch)
    }

    /// Returns the first `n` rows (or fewer).
    pub fn head(&self, n: usize) -> RecordBatch {
        self.batch.slice(0, n.min(self.len()))
    }

    /// Renders the first `n` rows as an ASCII table.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be formatted.
    pub fn preview(&self, n: usize) -> Result<String> {
        let formatted = arrow::util::pretty::pretty_format_batches(&[self.head(n)])?;
        Ok(formatted.to_string())
    }

    /// Serializes the table as CSV: a header row, then one line per record.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be encoded.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        use arrow_csv::WriterBuilder;

        let mut buf = Vec::new();
        {
            let mut writer = WriterBuilder::new().with_header(true).build(&mut buf);
            writer.write(&self.batch).map_err(Error::Arrow)?;
        }
        Ok(buf)
    }

    /// Writes the table to a CSV file.
    ///
    /// The whole file is encoded in memory first, so an encoding failure
    /// leaves no file behind.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the file cannot be written.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_csv_bytes()?;
        std::fs::write(path, bytes).map_err(|e| Error::io(e, path))
    }
}

impl From<RecordBatch> for Table {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{Float64Array, Int64Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };

    use super::*;
    use crate::transform::Select;

    fn create_test_table() -> Table {
        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, false),
            Field::new("id", DataType::Int64, true),
            Field::new("grade", DataType::Float64, true),
        ]));

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["Rahul", "Priya", "Rahul"])),
                Arc::new(Int64Array::from(vec![Some(1), None, Some(1)])),
                Arc::new(Float64Array::from(vec![Some(3.5), None, Some(3.5)])),
            ],
        )
        .ok()
        .unwrap_or_else(|| panic!("Should create batch"));

        Table::new(batch)
    }

    #[test]
    fn test_table_basics() {
        let table = create_test_table();
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert_eq!(table.column_names(), vec!["name", "id", "grade"]);
        assert_eq!(table.schema().fields().len(), 3);
    }

    #[test]
    fn test_null_counts() {
        let table = create_test_table();
        assert_eq!(
            table.null_counts(),
            vec![
                ("name".to_string(), 0),
                ("id".to_string(), 1),
                ("grade".to_string(), 1)
            ]
        );
        assert_eq!(table.total_nulls(), 2);
    }

    #[test]
    fn test_duplicate_rows() {
        let table = create_test_table();
        let count = table
            .duplicate_rows()
            .ok()
            .unwrap_or_else(|| panic!("Should count"));
        assert_eq!(count, 1);
    }

    #[test]
    fn test_apply_consumes_and_returns() {
        let table = create_test_table();
        let selected = table
            .apply(&Select::new(vec!["grade"]))
            .ok()
            .unwrap_or_else(|| panic!("Should apply"));
        assert_eq!(selected.column_names(), vec!["grade"]);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_head_clamps() {
        let table = create_test_table();
        assert_eq!(table.head(2).num_rows(), 2);
        assert_eq!(table.head(10).num_rows(), 3);
    }

    #[test]
    fn test_preview_contains_values() {
        let table = create_test_table();
        let preview = table
            .preview(2)
            .ok()
            .unwrap_or_else(|| panic!("Should render"));
        assert!(preview.contains("Rahul"));
        assert!(preview.contains("Priya"));
        assert!(preview.contains("grade"));
    }

    #[test]
    fn test_csv_bytes_header_and_rows() {
        let table = create_test_table();
        let bytes = table
            .to_csv_bytes()
            .ok()
            .unwrap_or_else(|| panic!("Should encode"));
        let text = String::from_utf8(bytes).unwrap_or_else(|_| panic!("Should be UTF-8"));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "name,id,grade");
        assert!(lines[1].starts_with("Rahul,1,3.5"));
        assert_eq!(lines[2], "Priya,,");
    }

    #[test]
    fn test_to_csv_writes_file() {
        let table = create_test_table();
        let temp_dir = tempfile::tempdir()
            .ok()
            .unwrap_or_else(|| panic!("Should create temp dir"));
        let path = temp_dir.path().join("students.csv");

        table
            .to_csv(&path)
            .ok()
            .unwrap_or_else(|| panic!("Should write csv"));

        let text = std::fs::read_to_string(&path)
            .ok()
            .unwrap_or_else(|| panic!("Should read back"));
        assert!(text.starts_with("name,id,grade\n"));
    }

    #[test]
    fn test_to_csv_missing_directory() {
        let table = create_test_table();
        let temp_dir = tempfile::tempdir()
            .ok()
            .unwrap_or_else(|| panic!("Should create temp dir"));
        let path = temp_dir.path().join("no/such/dir/students.csv");

        let result = table.to_csv(&path);
        assert!(matches!(result, Err(Error::Io { path: Some(_), .. })));
    }

    #[test]
    fn test_from_record_batch() {
        let table = create_test_table();
        let round_trip: Table = table.clone().into_batch().into();
        assert_eq!(round_trip, table);
    }
}
