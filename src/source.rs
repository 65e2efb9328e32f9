//! Synthetic student records.
//!
//! [`SyntheticSource`] builds the raw table the pipeline cleans: random names,
//! sequential ids, phone numbers and grades with a few values knocked out, a
//! fixed department layout, and one exact duplicate row appended at the end.

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray},
    datatypes::{DataType, Field, Schema, SchemaRef},
};
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};

use crate::{
    dataset::Table,
    error::{Error, Result},
};

/// First names the generator draws from, with replacement.
pub const NAMES: [&str; 64] = [
    "Rahul", "Priya", "Amit", "Sneha", "Vikram", "Anjali", "Saurabh", "Divya", "Arjun", "Kavya",
    "Mohit", "Nisha", "Rohan", "Shruti", "Gaurav", "Pooja", "Deepak", "Aisha", "Vishal", "Meena",
    "Sameer", "Rekha", "Tarun", "Shweta", "Anil", "Geeta", "Manish", "Sunita", "Rajesh", "Seema",
    "Alok", "Madhu", "Sanjay", "Uma", "Vikas", "Rita", "Navin", "Preeti", "Kunal", "Swati",
    "Bharat", "Arti", "Jatin", "Megha", "Kapil", "Neha", "Dhruv", "Radha", "Pranav", "Supriya",
    "Vimal", "Sarita", "Ajay", "Chandana", "Harish", "Smita", "Pramod", "Kiran", "Nitin", "Lata",
    "Yogesh", "Jyoti", "Ashish", "Pinky",
];

/// Department codes, in the order their blocks appear in the table.
pub const DEPARTMENTS: [&str; 4] = ["General", "SCT", "ISMS", "AIML"];

/// Block sizes per 50 students for [`DEPARTMENTS`]; `AIML` takes the rest.
const DEPARTMENT_SHARES: [usize; 3] = [15, 10, 10];

/// The college every student belongs to.
pub const COLLEGE: &str = "Jain";

const PHONE_PREFIX: &str = "98765";
const MISSING_PHONES: usize = 5;
const MISSING_GRADES: usize = 3;
const GRADE_RANGE: std::ops::Range<f64> = 2.5..4.0;

/// Column names of the raw table.
pub mod columns {
    /// Student name (Utf8, never null).
    pub const NAME: &str = "name";
    /// Student id (Int64, nullable).
    pub const ID: &str = "id";
    /// Phone number as text (Utf8, nullable).
    pub const PHONE: &str = "phone";
    /// Department code (Utf8, nullable).
    pub const DEPARTMENT: &str = "department";
    /// College name (Utf8, never null).
    pub const COLLEGE: &str = "college";
    /// Grade point average (Float64, nullable).
    pub const GRADE: &str = "grade";
}

/// Returns the schema of the raw student table.
pub fn student_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(columns::NAME, DataType::Utf8, false),
        Field::new(columns::ID, DataType::Int64, true),
        Field::new(columns::PHONE, DataType::Utf8, true),
        Field::new(columns::DEPARTMENT, DataType::Utf8, true),
        Field::new(columns::COLLEGE, DataType::Utf8, false),
        Field::new(columns::GRADE, DataType::Float64, true),
    ]))
}

/// Generator for the raw student table.
///
/// With a seed the output is fully deterministic; without one the generator
/// is seeded from OS entropy.
///
/// # Example
///
/// ```ignore
/// use depurar::SyntheticSource;
///
/// let table = SyntheticSource::new(50).with_seed(7).generate()?;
/// assert_eq!(table.len(), 51); // one duplicate row appended
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    count: usize,
    seed: Option<u64>,
}

impl SyntheticSource {
    /// Creates a generator for `count` distinct students.
    pub fn new(count: usize) -> Self {
        Self { count, seed: None }
    }

    /// Seeds the generator for reproducible output.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets or clears the seed.
    #[must_use]
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the number of distinct students generated.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Generates the table: `count` students plus one duplicated row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `count` is zero.
    pub fn generate(&self) -> Result<Table> {
        if self.count == 0 {
            return Err(Error::invalid_config("student count must be positive"));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let n = self.count;

        let names: Vec<&str> = (0..n).map(|_| NAMES[rng.gen_range(0..NAMES.len())]).collect();
        let ids: Vec<Option<i64>> = (1..=n).map(|i| i64::try_from(i).ok()).collect();

        let mut phones: Vec<Option<String>> = (0..n)
            .map(|_| Some(format!("{}{}", PHONE_PREFIX, rng.gen_range(10_000..99_999))))
            .collect();
        for idx in index::sample(&mut rng, n, MISSING_PHONES.min(n)).iter() {
            phones[idx] = None;
        }

        let departments = Self::department_blocks(n);

        let mut grades: Vec<Option<f64>> = (0..n)
            .map(|_| Some((rng.gen_range(GRADE_RANGE) * 100.0).round() / 100.0))
            .collect();
        for idx in index::sample(&mut rng, n, MISSING_GRADES.min(n)).iter() {
            grades[idx] = None;
        }

        let duplicate = rng.gen_range(0..n);
        tracing::debug!(rows = n, duplicate_of = duplicate, "generated synthetic students");

        let pick = |i: usize| if i == n { duplicate } else { i };
        let rows = 0..=n;

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(rows.clone().map(|i| names[pick(i)]))),
            Arc::new(Int64Array::from_iter(rows.clone().map(|i| ids[pick(i)]))),
            Arc::new(StringArray::from_iter(
                rows.clone().map(|i| phones[pick(i)].as_deref()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.clone().map(|i| departments[pick(i)]),
            )),
            Arc::new(StringArray::from_iter_values(rows.clone().map(|_| COLLEGE))),
            Arc::new(Float64Array::from_iter(rows.map(|i| grades[pick(i)]))),
        ];

        let batch = RecordBatch::try_new(student_schema(), columns)?;
        Ok(Table::new(batch))
    }

    /// Lays out departments in contiguous blocks, 30/20/20/30 percent.
    fn department_blocks(n: usize) -> Vec<&'static str> {
        let mut out = Vec::with_capacity(n);
        for (dept, share) in DEPARTMENTS.iter().zip(DEPARTMENT_SHARES) {
            let block = n * share / 50;
            out.extend(std::iter::repeat(*dept).take(block));
        }
        let rest = n - out.len();
        out.extend(std::iter::repeat(DEPARTMENTS[3]).take(rest));
        out
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use arrow::array::Array;

    use super::*;

    fn generate(count: usize, seed: u64) -> Table {
        SyntheticSource::new(count)
            .with_seed(seed)
            .generate()
            .ok()
            .unwrap_or_else(|| panic!("Should generate"))
    }

    fn column<'a, T: 'static>(table: &'a Table, name: &str) -> &'a T {
        let (idx, _) = table
            .batch()
            .schema()
            .column_with_name(name)
            .unwrap_or_else(|| panic!("Should have column {}", name));
        table
            .batch()
            .column(idx)
            .as_any()
            .downcast_ref::<T>()
            .unwrap_or_else(|| panic!("Column {} has unexpected type", name))
    }

    #[test]
    fn test_generate_shape() {
        let table = generate(50, 42);
        assert_eq!(table.len(), 51);
        assert_eq!(table.schema(), student_schema());
    }

    #[test]
    fn test_generate_is_deterministic_with_seed() {
        assert_eq!(generate(50, 7), generate(50, 7));
    }

    #[test]
    fn test_generate_seed_matters() {
        assert_ne!(generate(50, 1), generate(50, 2));
    }

    #[test]
    fn test_generate_has_exactly_one_duplicate() {
        let table = generate(50, 11);
        let dups = table
            .duplicate_rows()
            .ok()
            .unwrap_or_else(|| panic!("Should count"));
        assert_eq!(dups, 1);
    }

    #[test]
    fn test_generate_missing_values() {
        let table = generate(50, 3);
        let nulls: std::collections::HashMap<String, usize> =
            table.null_counts().into_iter().collect();

        // The appended duplicate may repeat a null.
        assert!((5..=6).contains(&nulls["phone"]));
        assert!((3..=4).contains(&nulls["grade"]));
        assert_eq!(nulls["name"], 0);
        assert_eq!(nulls["id"], 0);
        assert_eq!(nulls["department"], 0);
        assert_eq!(nulls["college"], 0);
    }

    #[test]
    fn test_generate_value_ranges() {
        let table = generate(50, 5);

        let phones: &StringArray = column(&table, columns::PHONE);
        for phone in phones.iter().flatten() {
            assert_eq!(phone.len(), 10);
            assert!(phone.starts_with(PHONE_PREFIX));
        }

        let grades: &Float64Array = column(&table, columns::GRADE);
        for grade in grades.iter().flatten() {
            assert!((2.5..=4.0).contains(&grade));
            assert_eq!((grade * 100.0).round() / 100.0, grade);
        }

        let ids: &Int64Array = column(&table, columns::ID);
        assert_eq!(ids.value(0), 1);
        assert_eq!(ids.value(49), 50);

        let college: &StringArray = column(&table, columns::COLLEGE);
        assert!(college.iter().all(|c| c == Some(COLLEGE)));

        let names: &StringArray = column(&table, columns::NAME);
        assert!(names.iter().flatten().all(|n| NAMES.contains(&n)));
    }

    #[test]
    fn test_department_blocks_for_fifty() {
        let blocks = SyntheticSource::department_blocks(50);
        assert_eq!(blocks.len(), 50);
        assert!(blocks[..15].iter().all(|d| *d == "General"));
        assert!(blocks[15..25].iter().all(|d| *d == "SCT"));
        assert!(blocks[25..35].iter().all(|d| *d == "ISMS"));
        assert!(blocks[35..].iter().all(|d| *d == "AIML"));
    }

    #[test]
    fn test_department_blocks_small() {
        let blocks = SyntheticSource::department_blocks(3);
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|d| *d == "AIML"));
    }

    #[test]
    fn test_single_student() {
        let table = generate(1, 9);
        assert_eq!(table.len(), 2);
        assert_eq!(table.batch().column(2).null_count(), 2);
    }

    #[test]
    fn test_zero_students_rejected() {
        let result = SyntheticSource::new(0).generate();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_seed_builder() {
        let source = SyntheticSource::new(10).seed(Some(3));
        assert_eq!(source.count(), 10);
        assert_eq!(source.clone().seed(None).count(), 10);
    }
}
