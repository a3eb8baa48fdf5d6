#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::expand::ExpansionSettings;
use crate::utils::error::{Result, SweepError};
use crate::utils::validation::{
    validate_existing_dir, validate_non_empty_list, validate_non_empty_string, validate_path,
    validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_FLAG: &str = "-o";
pub const DEFAULT_ID_WIDTH: usize = 8;
pub const MIN_ID_WIDTH: usize = 8;
/// SHA-256 十六進位字串的長度
pub const MAX_ID_WIDTH: usize = 64;
pub const DEFAULT_MISSING_MARKER: &str = "NA";
/// 單次產生的指令數上限
pub const DEFAULT_MAX_COMMANDS: usize = 1_000_000;

/// Everything one generation run needs, resolved once from the command line
/// and the optional sweep file.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub base_command: String,
    pub output_dir: PathBuf,
    pub inputs: Vec<String>,
    /// Raw sweep tokens, e.g. `["-s", "range:0,10,5", "--fast"]`.
    pub params: Vec<String>,
    pub output_flag: String,
    pub id_width: usize,
    /// Upper bound on combinations x inputs for one run.
    pub max_commands: usize,
    pub expansion: ExpansionSettings,
}

impl SweepConfig {
    pub fn new(base_command: impl Into<String>, output_dir: impl Into<PathBuf>, inputs: Vec<String>) -> Self {
        Self {
            base_command: base_command.into(),
            output_dir: output_dir.into(),
            inputs,
            params: Vec::new(),
            output_flag: DEFAULT_OUTPUT_FLAG.to_string(),
            id_width: DEFAULT_ID_WIDTH,
            max_commands: DEFAULT_MAX_COMMANDS,
            expansion: ExpansionSettings::default(),
        }
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }
}

impl Validate for SweepConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("base_command", &self.base_command)?;
        validate_path("output_dir", &self.output_dir.to_string_lossy())?;
        validate_non_empty_list("inputs", &self.inputs)?;
        for input in &self.inputs {
            validate_path("inputs", input)?;
        }
        validate_non_empty_string("output_flag", &self.output_flag)?;
        validate_range("id_width", self.id_width, MIN_ID_WIDTH, MAX_ID_WIDTH)?;
        validate_range("max_commands", self.max_commands, 1, usize::MAX)?;
        validate_expansion(&self.expansion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    /// One output path per line.
    #[default]
    Paths,
    Tsv,
    Csv,
    /// One JSON record per line.
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    pub output_dir: PathBuf,
    /// Raw filter tokens, same grammar as the sweep tokens.
    pub filter: Vec<String>,
    pub format: OutputFormat,
    pub missing_marker: String,
    pub expansion: ExpansionSettings,
}

impl QueryConfig {
    pub fn new(output_dir: impl Into<PathBuf>, filter: Vec<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            filter,
            format: OutputFormat::default(),
            missing_marker: DEFAULT_MISSING_MARKER.to_string(),
            expansion: ExpansionSettings::default(),
        }
    }
}

impl Validate for QueryConfig {
    fn validate(&self) -> Result<()> {
        validate_existing_dir("output_dir", &self.output_dir.to_string_lossy())?;
        validate_expansion(&self.expansion)
    }
}

fn validate_expansion(settings: &ExpansionSettings) -> Result<()> {
    if !(settings.tolerance > 0.0 && settings.tolerance < 1.0) {
        return Err(SweepError::InvalidConfigValueError {
            field: "expansion.tolerance".to_string(),
            value: settings.tolerance.to_string(),
            reason: "Tolerance must be between 0 and 1 (exclusive)".to_string(),
        });
    }
    validate_range("expansion.max_values", settings.max_values, 1, usize::MAX)
}
