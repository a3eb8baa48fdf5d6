use crate::config::toml_config::SweepFile;
use crate::config::{
    OutputFormat, QueryConfig, SweepConfig, DEFAULT_ID_WIDTH, DEFAULT_MAX_COMMANDS,
    DEFAULT_MISSING_MARKER, DEFAULT_OUTPUT_FLAG,
};
use crate::core::expand::ExpansionSettings;
use crate::utils::error::{Result, SweepError};
use crate::utils::validation::Validate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "erun")]
#[command(about = "Output a batch of commands for one experiment and record their metadata")]
#[command(after_help = "Sweep parameters follow `--`, e.g. `-- -s range:0,10,5 --foo set:bar,baz --fast`.\n\
    set:A,B,C         a set of values\n\
    range:start,stop  integers from start to stop, inclusive\n\
    range:start,stop,step  values from start to stop in increments of step")]
pub struct GenerateArgs {
    /// The base command for running a single trial
    #[arg(short = 'r', long = "run", value_name = "MAIN_SCRIPT")]
    pub run: Option<String>,

    /// Directory for the result files
    #[arg(short = 'o', long = "output-dir", value_name = "OUT_DIR")]
    pub output_dir: Option<String>,

    /// Input files to process
    #[arg(short = 'i', long = "inputs", value_name = "FILE", num_args = 1..)]
    pub inputs: Vec<String>,

    /// Sweep file with default settings (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Option the base command uses for its output file
    #[arg(long, value_name = "FLAG", allow_hyphen_values = true)]
    pub output_flag: Option<String>,

    /// Number of hex characters in generated output file names
    #[arg(long, value_name = "N")]
    pub id_width: Option<usize>,

    /// Refuse sweeps that would generate more commands than this
    #[arg(long, value_name = "N")]
    pub max_commands: Option<usize>,

    /// Create the output directory if it does not exist
    #[arg(long)]
    pub mkdir: bool,

    /// Print the commands without recording metadata
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Sweep parameters
    #[arg(last = true, allow_hyphen_values = true, value_name = "PARAMS")]
    pub params: Vec<String>,
}

impl GenerateArgs {
    /// 命令列的值優先於設定檔
    pub fn resolve(&self) -> Result<SweepConfig> {
        let file = match &self.config {
            Some(path) => SweepFile::from_file(path)?,
            None => SweepFile::default(),
        };
        let sweep = &file.sweep;

        let base_command = self
            .run
            .clone()
            .or_else(|| sweep.base_command.clone())
            .ok_or_else(|| SweepError::MissingConfigError {
                field: "base command (-r)".to_string(),
            })?;
        let output_dir = self
            .output_dir
            .clone()
            .or_else(|| sweep.output_dir.clone())
            .ok_or_else(|| SweepError::MissingConfigError {
                field: "output directory (-o)".to_string(),
            })?;
        let inputs = if self.inputs.is_empty() {
            sweep.inputs.clone().unwrap_or_default()
        } else {
            self.inputs.clone()
        };
        let params = if self.params.is_empty() {
            sweep.params.clone().unwrap_or_default()
        } else {
            self.params.clone()
        };

        let config = SweepConfig {
            base_command,
            output_dir: output_dir.into(),
            inputs,
            params,
            output_flag: self
                .output_flag
                .clone()
                .or_else(|| sweep.output_flag.clone())
                .unwrap_or_else(|| DEFAULT_OUTPUT_FLAG.to_string()),
            id_width: self.id_width.or(sweep.id_width).unwrap_or(DEFAULT_ID_WIDTH),
            max_commands: self
                .max_commands
                .or(sweep.max_commands)
                .unwrap_or(DEFAULT_MAX_COMMANDS),
            expansion: file.expansion_settings(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "equery")]
#[command(about = "Collect the result files matching a metadata filter")]
pub struct QueryArgs {
    /// Directory where the result files are located
    #[arg(short = 'o', long = "output-dir", value_name = "OUT_DIR")]
    pub output_dir: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Paths)]
    pub format: OutputFormat,

    /// Placeholder for values a record does not have (tables only)
    #[arg(long, default_value = DEFAULT_MISSING_MARKER)]
    pub missing: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Filter, using the same grammar as the sweep parameters
    #[arg(last = true, allow_hyphen_values = true, value_name = "FILTER")]
    pub filter: Vec<String>,
}

impl QueryArgs {
    pub fn resolve(&self) -> Result<QueryConfig> {
        let config = QueryConfig {
            output_dir: self.output_dir.clone().into(),
            filter: self.filter.clone(),
            format: self.format,
            missing_marker: self.missing.clone(),
            expansion: ExpansionSettings::default(),
        };
        config.validate()?;
        Ok(config)
    }
}
