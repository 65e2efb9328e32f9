//! depurar - Student Records Cleaning Pipeline
//!
//! A small, strictly sequential ETL pipeline over Arrow `RecordBatch`es:
//! a synthetic source produces raw student records, the cleaner removes
//! duplicate rows and fills missing values, a router passes the table on,
//! and the writer renames and orders columns before saving a CSV file.
//!
//! # Stages
//!
//! 1. **Source** - [`SyntheticSource`] generates names, ids, phones,
//!    departments and grades with a few values knocked out
//! 2. **Cleaner** - [`Cleaner`] deduplicates, then imputes per [`ColumnRule`]
//! 3. **Router** - [`Passthrough`] hands the table on unchanged
//! 4. **Writer** - [`Table::to_csv`] after the output column mapping
//!
//! # Quick Start
//!
//! ```no_run
//! use depurar::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default().with_seed(42);
//! let report = Pipeline::new(config)?.run()?;
//! println!("{} rows written", report.rows_written);
//! # Ok::<(), depurar::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::float_cmp,
        clippy::similar_names,
        clippy::unreadable_literal
    )
)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod clean;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod summary;
pub mod transform;

// Re-exports for convenience
pub use arrow::{
    array::RecordBatch,
    datatypes::{Schema, SchemaRef},
};
pub use clean::{student_rules, CleanReport, Cleaner, ColumnFill, ColumnKind, ColumnRule};
pub use config::{CleanConfig, OutputColumn, PipelineConfig};
pub use dataset::Table;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineReport};
pub use source::{student_schema, SyntheticSource};
pub use summary::{label_mapping, TableSummary};
pub use transform::{
    Chain, FillValue, Impute, ImputeStrategy, Passthrough, Rename, Round, Select, ToNumeric,
    Transform, Truncate, Unique,
};
