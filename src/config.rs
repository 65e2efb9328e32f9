//! Pipeline configuration.
//!
//! Everything the pipeline needs to know is carried by a [`PipelineConfig`]
//! value: how many records to generate, the cleaning rules and the output
//! layout. Configurations can be built in code or loaded from TOML:
//!
//! ```toml
//! rows = 50
//! seed = 42
//! output = "processed student data.csv"
//!
//! [[clean.rules]]
//! column = "grade"
//! strategy = "mean"
//! kind = { decimal = 2 }
//!
//! [[clean.rules]]
//! column = "phone"
//! strategy = { constant = 0 }
//! kind = "integer"
//!
//! [[output_columns]]
//! source = "phone"
//! target = "phone number"
//! ```
//!
//! Keys left out fall back to the student pipeline defaults.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    clean::{student_rules, ColumnRule},
    error::{Error, Result},
    source::columns,
};

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "processed student data.csv";

/// A column of the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumn {
    /// Column name in the cleaned table.
    pub source: String,
    /// Column name written to the CSV header.
    pub target: String,
}

impl OutputColumn {
    /// Creates an output column mapping.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// The output layout of the student pipeline.
pub fn student_output_columns() -> Vec<OutputColumn> {
    vec![
        OutputColumn::new(columns::NAME, "name"),
        OutputColumn::new(columns::ID, "id"),
        OutputColumn::new(columns::PHONE, "phone number"),
        OutputColumn::new(columns::DEPARTMENT, "department"),
        OutputColumn::new(columns::COLLEGE, "College"),
        OutputColumn::new(columns::GRADE, "grade"),
    ]
}

/// Cleaning stage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanConfig {
    /// Imputation rules, applied in order.
    pub rules: Vec<ColumnRule>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            rules: student_rules(),
        }
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Number of distinct students to generate.
    pub rows: usize,
    /// Seed for the generator; random when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Path of the CSV file to write.
    pub output: PathBuf,
    /// Rows shown in logged table previews.
    pub preview_rows: usize,
    /// Cleaning stage settings.
    pub clean: CleanConfig,
    /// Output columns, in file order.
    pub output_columns: Vec<OutputColumn>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rows: 50,
            seed: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            preview_rows: 10,
            clean: CleanConfig::default(),
            output_columns: student_output_columns(),
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed TOML and
    /// [`Error::InvalidConfig`] for values that fail validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise see
    /// [`PipelineConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        Self::from_toml_str(&text)
    }

    /// Serializes the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Sets the generator seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the output path.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Sets the number of generated students.
    #[must_use]
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Checks the configuration for values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(Error::invalid_config("rows must be positive"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(Error::invalid_config("output path is empty"));
        }
        if self.output_columns.is_empty() {
            return Err(Error::invalid_config("output_columns is empty"));
        }

        let mut sources = HashSet::new();
        let mut targets = HashSet::new();
        for column in &self.output_columns {
            if !sources.insert(column.source.as_str()) {
                return Err(Error::invalid_config(format!(
                    "output column '{}' listed twice",
                    column.source
                )));
            }
            if !targets.insert(column.target.as_str()) {
                return Err(Error::invalid_config(format!(
                    "output header '{}' used twice",
                    column.target
                )));
            }
        }

        for rule in &self.clean.rules {
            rule.validate()?;
        }

        Ok(())
    }
}
