//! Column selection and renaming transforms used to shape the output table.

use std::{collections::HashMap, sync::Arc};

use arrow::{
    array::RecordBatch,
    datatypes::{Field, Schema},
};

use super::Transform;
use crate::error::{Error, Result};

/// A transform that selects, and orders, specific columns of a RecordBatch.
///
/// # Example
///
/// ```ignore
/// use depurar::Select;
///
/// let select = Select::new(vec!["name", "id", "phone number"]);
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    columns: Vec<String>,
}

impl Select {
    /// Creates a new Select transform for the given column names.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the columns to be selected, in output order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Transform for Select {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let schema = batch.schema();
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays = Vec::with_capacity(self.columns.len());

        for col_name in &self.columns {
            let (idx, field) = schema
                .column_with_name(col_name)
                .ok_or_else(|| Error::column_not_found(col_name))?;

            fields.push(field.clone());
            arrays.push(Arc::clone(batch.column(idx)));
        }

        let new_schema = Arc::new(Schema::new(fields));
        RecordBatch::try_new(new_schema, arrays).map_err(Error::Arrow)
    }
}

/// A transform that renames columns in a RecordBatch.
///
/// Columns absent from the mapping keep their name. Mapping entries that name
/// a column the batch does not have are ignored.
///
/// # Example
///
/// ```ignore
/// use depurar::Rename;
///
/// let rename = Rename::from_pairs(vec![("phone", "phone number"), ("college", "College")]);
/// ```
#[derive(Debug, Clone)]
pub struct Rename {
    mapping: HashMap<String, String>,
}

impl Rename {
    /// Creates a new Rename transform with the given column mappings.
    pub fn new(mapping: HashMap<String, String>) -> Self {
        Self { mapping }
    }

    /// Creates a Rename transform from pairs of (old_name, new_name).
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, S)>) -> Self {
        let mapping = pairs
            .into_iter()
            .map(|(old, new)| (old.into(), new.into()))
            .collect();
        Self { mapping }
    }

    /// Returns the target name for a source column, if it is renamed.
    pub fn target(&self, column: &str) -> Option<&str> {
        self.mapping.get(column).map(String::as_str)
    }
}

impl Transform for Rename {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let schema = batch.schema();
        let new_fields: Vec<Field> = schema
            .fields()
            .iter()
            .map(|field| match self.mapping.get(field.name()) {
                Some(new_name) => {
                    Field::new(new_name, field.data_type().clone(), field.is_nullable())
                }
                None => field.as_ref().clone(),
            })
            .collect();

        let mut seen = std::collections::HashSet::with_capacity(new_fields.len());
        for field in &new_fields {
            if !seen.insert(field.name().as_str()) {
                return Err(Error::schema_mismatch(format!(
                    "rename produces duplicate column '{}'",
                    field.name()
                )));
            }
        }

        let new_schema = Arc::new(Schema::new(new_fields));
        RecordBatch::try_new(new_schema, batch.columns().to_vec()).map_err(Error::Arrow)
    }
}

#[cfg(test)]
mod tests {
    use arrow::{
        array::{Float64Array, Int64Array, StringArray},
        datatypes::DataType,
    };

    use super::*;

    fn create_test_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, false),
            Field::new("id", DataType::Int64, false),
            Field::new("college", DataType::Utf8, false),
            Field::new("grade", DataType::Float64, false),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["Sneha", "Vikram"])),
                Arc::new(Int64Array::from(vec![4, 5])),
                Arc::new(StringArray::from(vec!["Jain", "Jain"])),
                Arc::new(Float64Array::from(vec![3.25, 2.75])),
            ],
        )
        .ok()
        .unwrap_or_else(|| panic!("Should create batch"))
    }

    #[test]
    fn test_select_reorders_columns() {
        let batch = create_test_batch();
        let select = Select::new(vec!["grade", "name"]);

        let result = select
            .apply(batch)
            .ok()
            .unwrap_or_else(|| panic!("Should succeed"));

        assert_eq!(result.num_columns(), 2);
        assert_eq!(result.schema().field(0).name(), "grade");
        assert_eq!(result.schema().field(1).name(), "name");
        assert_eq!(result.num_rows(), 2);
    }

    #[test]
    fn test_select_missing_column() {
        let batch = create_test_batch();
        let select = Select::new(vec!["name", "phone number"]);

        let result = select.apply(batch);
        assert!(matches!(result, Err(Error::ColumnNotFound { name }) if name == "phone number"));
    }

    #[test]
    fn test_select_columns_getter() {
        let select = Select::new(vec!["a", "b"]);
        assert_eq!(select.columns(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_rename_from_pairs() {
        let batch = create_test_batch();
        let rename = Rename::from_pairs(vec![("college", "College"), ("absent", "ignored")]);

        let result = rename
            .apply(batch)
            .ok()
            .unwrap_or_else(|| panic!("Should succeed"));

        let schema = result.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["name", "id", "College", "grade"]);
        assert_eq!(rename.target("college"), Some("College"));
        assert_eq!(rename.target("grade"), None);
    }

    #[test]
    fn test_rename_preserves_values() {
        let batch = create_test_batch();
        let mut mapping = HashMap::new();
        mapping.insert("grade".to_string(), "GPA".to_string());

        let result = Rename::new(mapping)
            .apply(batch)
            .ok()
            .unwrap_or_else(|| panic!("Should succeed"));

        let col = result
            .column(3)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap_or_else(|| panic!("Should be Float64Array"));
        assert!((col.value(0) - 3.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rename_collision_rejected() {
        let batch = create_test_batch();
        let rename = Rename::from_pairs(vec![("college", "name")]);

        let result = rename.apply(batch);
        assert!(matches!(result, Err(Error::SchemaMismatch { .. })));
    }
}
