//! The end-to-end pipeline: generate, clean, route, write.
//!
//! Stages run strictly in sequence and hand the table on by value. Any error
//! aborts the run before the writer is reached, so a failed run never leaves
//! an output file behind.

use std::path::PathBuf;

use crate::{
    clean::{CleanReport, Cleaner, ColumnKind},
    config::PipelineConfig,
    dataset::Table,
    error::Result,
    source::SyntheticSource,
    summary::{label_mapping, TableSummary},
    transform::{Chain, Passthrough, Rename, Select},
};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Rows produced by the source, duplicates included.
    pub rows_generated: usize,
    /// Cleaning statistics.
    pub clean: CleanReport,
    /// Rows written to the output file.
    pub rows_written: usize,
    /// Path of the output file.
    pub output: PathBuf,
}

/// Runs the student records pipeline for one configuration.
///
/// # Example
///
/// ```ignore
/// use depurar::{Pipeline, PipelineConfig};
///
/// let pipeline = Pipeline::new(PipelineConfig::default().with_seed(42))?;
/// let report = pipeline.run()?;
/// println!("wrote {} rows to {}", report.rows_written, report.output.display());
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    cleaner: Cleaner,
}

impl Pipeline {
    /// Creates a pipeline after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] for an unusable configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let cleaner = Cleaner::new(config.clean.rules.clone())?;
        Ok(Self { config, cleaner })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the cleaner built from the configured rules.
    pub fn cleaner(&self) -> &Cleaner {
        &self.cleaner
    }

    /// Returns the configured source.
    pub fn source(&self) -> SyntheticSource {
        SyntheticSource::new(self.config.rows).seed(self.config.seed)
    }

    /// Builds the transform that renames and orders the output columns.
    pub fn output_transform(&self) -> Chain {
        let columns = &self.config.output_columns;
        Chain::new()
            .then(Select::new(columns.iter().map(|c| c.source.clone())))
            .then(Rename::from_pairs(
                columns.iter().map(|c| (c.source.clone(), c.target.clone())),
            ))
    }

    /// Cleans, routes and shapes a table without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage.
    pub fn process(&self, table: Table) -> Result<(Table, CleanReport)> {
        let preview_rows = self.config.preview_rows;

        TableSummary::of(&table)?.log("raw");
        tracing::info!("raw table:\n{}", table.preview(preview_rows)?);

        let (cleaned, report) = self.cleaner.clean(table)?;
        TableSummary::of(&cleaned)?.log("cleaned");
        tracing::info!("cleaned table:\n{}", cleaned.preview(preview_rows)?);

        self.log_label_mappings(&cleaned)?;

        let routed = cleaned.apply(&Passthrough)?;
        let shaped = routed.apply(&self.output_transform())?;
        tracing::info!("output table:\n{}", shaped.preview(preview_rows)?);

        Ok((shaped, report))
    }

    /// Runs every stage and writes the CSV file.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage; nothing is written when
    /// an earlier stage fails.
    pub fn run(&self) -> Result<PipelineReport> {
        tracing::info!(rows = self.config.rows, seed = ?self.config.seed, "generating students");
        let raw = self.source().generate()?;
        let rows_generated = raw.len();

        let (output, clean) = self.process(raw)?;

        output.to_csv(&self.config.output)?;
        tracing::info!(
            rows = output.len(),
            path = %self.config.output.display(),
            "wrote processed data"
        );

        Ok(PipelineReport {
            rows_generated,
            clean,
            rows_written: output.len(),
            output: self.config.output.clone(),
        })
    }

    fn log_label_mappings(&self, table: &Table) -> Result<()> {
        let categorical = self
            .cleaner
            .rules()
            .iter()
            .filter(|rule| rule.kind == ColumnKind::Categorical);

        for rule in categorical {
            for (class, code) in label_mapping(table, &rule.column)? {
                tracing::info!(column = %rule.column, class = %class, code, "label encoding");
            }
        }
        Ok(())
    }
}
