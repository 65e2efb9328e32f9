//! The cleaning stage: duplicate removal followed by per-column imputation.
//!
//! A [`Cleaner`] owns an ordered list of [`ColumnRule`]s. Cleaning a table
//! removes exact duplicate rows first, so every statistic is computed over
//! the deduplicated columns, then runs each rule in turn:
//!
//! 1. numeric columns are coerced to Float64 ([`ToNumeric`]), unparseable
//!    text becoming missing;
//! 2. the fill value is computed and substituted ([`Impute`]);
//! 3. the column gets its storage type: Int64 by truncation ([`Truncate`]),
//!    Float64 rounded to fixed decimals ([`Round`]), or Utf8 unchanged.
//!
//! Columns without a rule are never touched, missing values included.

use serde::{Deserialize, Serialize};

use crate::{
    dataset::Table,
    error::{Error, Result},
    transform::{FillValue, Impute, ImputeStrategy, Round, ToNumeric, Truncate, Unique},
};

/// Storage type of a cleaned column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Int64; fractional fill values are truncated toward zero.
    Integer,
    /// Float64 rounded to the given number of decimal places.
    Decimal(u32),
    /// Text categories, stored as Utf8.
    Categorical,
}

impl ColumnKind {
    /// Returns true for kinds that need numeric coercion before imputation.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal(_))
    }
}

/// How one column is imputed and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRule {
    /// Column the rule applies to.
    pub column: String,
    /// How missing values are replaced.
    pub strategy: ImputeStrategy,
    /// Storage type after imputation.
    pub kind: ColumnKind,
}

impl ColumnRule {
    /// Creates a rule.
    pub fn new(column: impl Into<String>, strategy: ImputeStrategy, kind: ColumnKind) -> Self {
        Self {
            column: column.into(),
            strategy,
            kind,
        }
    }

    /// Mean imputation, stored as a truncated integer.
    pub fn mean_integer(column: impl Into<String>) -> Self {
        Self::new(column, ImputeStrategy::Mean, ColumnKind::Integer)
    }

    /// Mean imputation, stored rounded to `decimals` places.
    pub fn mean_decimal(column: impl Into<String>, decimals: u32) -> Self {
        Self::new(column, ImputeStrategy::Mean, ColumnKind::Decimal(decimals))
    }

    /// Most-frequent imputation of a text category.
    pub fn most_frequent(column: impl Into<String>) -> Self {
        Self::new(column, ImputeStrategy::MostFrequent, ColumnKind::Categorical)
    }

    /// Fill with zero, stored as an integer.
    pub fn zero_integer(column: impl Into<String>) -> Self {
        Self::new(
            column,
            ImputeStrategy::Constant(FillValue::ZERO),
            ColumnKind::Integer,
        )
    }

    /// Checks that the strategy makes sense for the column kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty column name, a mean over
    /// a categorical column, or a constant whose type does not match the kind.
    pub fn validate(&self) -> Result<()> {
        if self.column.trim().is_empty() {
            return Err(Error::invalid_config("rule column name is empty"));
        }

        match (&self.strategy, self.kind) {
            (ImputeStrategy::Mean, ColumnKind::Categorical) => Err(Error::invalid_config(format!(
                "column '{}': mean imputation needs a numeric kind",
                self.column
            ))),
            (ImputeStrategy::Constant(FillValue::Text(_)), kind) if kind.is_numeric() => {
                Err(Error::invalid_config(format!(
                    "column '{}': text constant for a numeric column",
                    self.column
                )))
            }
            (ImputeStrategy::Constant(FillValue::Number(_)), ColumnKind::Categorical) => {
                Err(Error::invalid_config(format!(
                    "column '{}': numeric constant for a categorical column",
                    self.column
                )))
            }
            _ => Ok(()),
        }
    }
}

/// The rules of the student pipeline.
pub fn student_rules() -> Vec<ColumnRule> {
    use crate::source::columns;

    vec![
        ColumnRule::mean_integer(columns::ID),
        ColumnRule::mean_decimal(columns::GRADE, 2),
        ColumnRule::most_frequent(columns::DEPARTMENT),
        ColumnRule::zero_integer(columns::PHONE),
    ]
}

/// What imputation did to one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFill {
    /// Column name.
    pub column: String,
    /// Value substituted for missing entries, before type finalization.
    pub value: FillValue,
    /// Number of entries that were missing after coercion and got filled.
    pub filled: usize,
}

/// Summary of one cleaning run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanReport {
    /// Rows in the input table.
    pub rows_in: usize,
    /// Exact duplicate rows removed.
    pub duplicates_removed: usize,
    /// Per-rule imputation results, in rule order.
    pub fills: Vec<ColumnFill>,
}

impl CleanReport {
    /// Rows in the cleaned table.
    pub fn rows_out(&self) -> usize {
        self.rows_in - self.duplicates_removed
    }

    /// Total number of values imputed across all columns.
    pub fn total_filled(&self) -> usize {
        self.fills.iter().map(|f| f.filled).sum()
    }
}

/// Deduplicates a table and imputes its missing values.
///
/// # Example
///
/// ```ignore
/// use depurar::{Cleaner, ColumnRule};
///
/// let cleaner = Cleaner::new(vec![
///     ColumnRule::mean_decimal("grade", 2),
///     ColumnRule::most_frequent("department"),
/// ])?;
/// let (clean, report) = cleaner.clean(table)?;
/// ```
#[derive(Debug, Clone)]
pub struct Cleaner {
    rules: Vec<ColumnRule>,
}

impl Cleaner {
    /// Creates a cleaner from an ordered rule list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a rule is invalid or two rules name
    /// the same column.
    pub fn new(rules: Vec<ColumnRule>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for rule in &rules {
            rule.validate()?;
            if !seen.insert(rule.column.as_str()) {
                return Err(Error::invalid_config(format!(
                    "column '{}' has more than one rule",
                    rule.column
                )));
            }
        }
        Ok(Self { rules })
    }

    /// The cleaner for the student table.
    pub fn students() -> Self {
        Self {
            rules: student_rules(),
        }
    }

    /// Returns the rules in application order.
    pub fn rules(&self) -> &[ColumnRule] {
        &self.rules
    }

    /// Removes exact duplicate rows, keeping first occurrences in order.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying Arrow kernels fail.
    pub fn deduplicate(&self, table: Table) -> Result<Table> {
        table.apply(&Unique::all())
    }

    /// Imputes every ruled column of an already deduplicated table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Computation`] when a mean or most-frequent column has
    /// no non-missing values, [`Error::ColumnNotFound`] when a ruled column
    /// is absent, and transform errors for type mismatches.
    pub fn impute(&self, table: Table) -> Result<(Table, Vec<ColumnFill>)> {
        let mut table = table;
        let mut fills = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            if rule.kind.is_numeric() {
                table = table.apply(&ToNumeric::new(&rule.column))?;
            }

            let impute = Impute::new(&rule.column, rule.strategy.clone());
            let value = impute.fit(table.batch())?;
            let filled = Self::null_count(&table, &rule.column)?;
            table = Table::new(impute.fill(table.into_batch(), &value)?);

            table = match rule.kind {
                ColumnKind::Integer => table.apply(&Truncate::new(&rule.column))?,
                ColumnKind::Decimal(places) => table.apply(&Round::new(&rule.column, places))?,
                ColumnKind::Categorical => table,
            };

            tracing::debug!(
                column = %rule.column,
                value = %value,
                filled,
                "imputed missing values"
            );
            fills.push(ColumnFill {
                column: rule.column.clone(),
                value,
                filled,
            });
        }

        Ok((table, fills))
    }

    /// Runs deduplication, then imputation.
    ///
    /// # Errors
    ///
    /// See [`Cleaner::impute`]; nothing is returned on failure.
    pub fn clean(&self, table: Table) -> Result<(Table, CleanReport)> {
        let rows_in = table.len();
        let table = self.deduplicate(table)?;
        let duplicates_removed = rows_in - table.len();
        tracing::info!(rows_in, duplicates_removed, "removed duplicate rows");

        let (table, fills) = self.impute(table)?;
        let report = CleanReport {
            rows_in,
            duplicates_removed,
            fills,
        };
        tracing::info!(filled = report.total_filled(), "imputed missing values");

        Ok((table, report))
    }

    fn null_count(table: &Table, column: &str) -> Result<usize> {
        let (idx, _) = table
            .batch()
            .schema()
            .column_with_name(column)
            .ok_or_else(|| Error::column_not_found(column))?;
        Ok(table.batch().column(idx).null_count())
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::students()
    }
}
