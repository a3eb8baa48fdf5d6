use crate::config::{SweepConfig, DEFAULT_ID_WIDTH, DEFAULT_MAX_COMMANDS, DEFAULT_OUTPUT_FLAG};
use crate::core::expand::ExpansionSettings;
use crate::utils::error::{Result, SweepError};
use crate::utils::validation::{validate_required_field, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sweep file: generation settings kept next to the experiment.
///
/// ```toml
/// [sweep]
/// base_command = "./experiment.py"
/// output_dir = "results"
/// inputs = ["inputs/input1", "inputs/input2"]
/// params = ["-s", "range:0,10,5", "--foo", "set:bar,baz"]
/// max_commands = 5000
///
/// [expansion]
/// max_values = 10000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepFile {
    #[serde(default)]
    pub sweep: SweepSection,
    pub expansion: Option<ExpansionSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepSection {
    pub base_command: Option<String>,
    pub output_dir: Option<String>,
    pub inputs: Option<Vec<String>>,
    pub params: Option<Vec<String>>,
    pub output_flag: Option<String>,
    pub id_width: Option<usize>,
    pub max_commands: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpansionSection {
    pub tolerance: Option<f64>,
    pub max_values: Option<usize>,
}

impl SweepFile {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SweepError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SweepError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SweepError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn expansion_settings(&self) -> ExpansionSettings {
        let defaults = ExpansionSettings::default();
        match &self.expansion {
            Some(section) => ExpansionSettings {
                tolerance: section.tolerance.unwrap_or(defaults.tolerance),
                max_values: section.max_values.unwrap_or(defaults.max_values),
            },
            None => defaults,
        }
    }

    /// Build a complete configuration from the file alone.
    pub fn to_config(&self) -> Result<SweepConfig> {
        let base_command = validate_required_field("sweep.base_command", &self.sweep.base_command)?;
        let output_dir = validate_required_field("sweep.output_dir", &self.sweep.output_dir)?;
        let inputs = validate_required_field("sweep.inputs", &self.sweep.inputs)?;

        let config = SweepConfig {
            base_command: base_command.clone(),
            output_dir: output_dir.into(),
            inputs: inputs.clone(),
            params: self.sweep.params.clone().unwrap_or_default(),
            output_flag: self
                .sweep
                .output_flag
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT_FLAG.to_string()),
            id_width: self.sweep.id_width.unwrap_or(DEFAULT_ID_WIDTH),
            max_commands: self.sweep.max_commands.unwrap_or(DEFAULT_MAX_COMMANDS),
            expansion: self.expansion_settings(),
        };
        config.validate()?;
        Ok(config)
    }
}
