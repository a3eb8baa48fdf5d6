use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Unexpected token \"{token}\": expected an option starting with '-'")]
    UnexpectedToken { token: String },

    #[error("Invalid value expression \"{expression}\": {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("Invalid number \"{value}\" in range expression \"{expression}\"")]
    InvalidRangeBound { expression: String, value: String },

    #[error("Range expression \"{expression}\" has non-positive step {step}")]
    NonPositiveStep { expression: String, step: f64 },

    #[error("Range expression \"{expression}\" expands to more than {limit} values")]
    RangeTooLarge { expression: String, limit: usize },

    #[error("Flag \"{flag}\" conflicts with earlier flag \"{previous}\"")]
    DuplicateFlag { flag: String, previous: String },

    #[error("Sweep would generate more than {limit} commands")]
    SweepTooLarge { limit: usize },

    #[error("Output directory not found: {path}")]
    OutputDirNotFound { path: String },

    #[error("Metadata ledger not found: {path}")]
    LedgerNotFound { path: String },

    #[error("Malformed record at {path}:{line}: {source}")]
    MalformedRecord {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Identifier collision on \"{identifier}\": \"{existing}\" and \"{incoming}\" hash to the same output file")]
    IdentifierCollision {
        identifier: String,
        existing: String,
        incoming: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} (\"{value}\"): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Grammar,
    Ledger,
    Configuration,
    System,
}

/// 錯誤嚴重程度，決定 CLI 的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,     // 輸入或設定錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl SweepError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SweepError::UnexpectedToken { .. }
            | SweepError::InvalidExpression { .. }
            | SweepError::InvalidRangeBound { .. }
            | SweepError::NonPositiveStep { .. }
            | SweepError::RangeTooLarge { .. }
            | SweepError::DuplicateFlag { .. }
            | SweepError::SweepTooLarge { .. } => ErrorCategory::Grammar,
            SweepError::OutputDirNotFound { .. }
            | SweepError::LedgerNotFound { .. }
            | SweepError::MalformedRecord { .. }
            | SweepError::IdentifierCollision { .. } => ErrorCategory::Ledger,
            SweepError::ConfigError { .. }
            | SweepError::MissingConfigError { .. }
            | SweepError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SweepError::IoError(_) | SweepError::SerializationError(_) | SweepError::CsvError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Grammar | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Ledger => match self {
                // 輸出檔可能被覆寫，需要人工介入
                SweepError::IdentifierCollision { .. } | SweepError::MalformedRecord { .. } => {
                    ErrorSeverity::Critical
                }
                _ => ErrorSeverity::High,
            },
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SweepError::UnexpectedToken { token } => {
                format!("\"{}\" does not look like an option", token)
            }
            SweepError::DuplicateFlag { flag, previous } => {
                format!("\"{}\" and \"{}\" name the same parameter", previous, flag)
            }
            SweepError::OutputDirNotFound { path } => {
                format!("Output directory {} does not exist", path)
            }
            SweepError::LedgerNotFound { path } => {
                format!("No metadata found at {}", path)
            }
            SweepError::MalformedRecord { path, line, .. } => {
                format!("Metadata file {} is corrupted at line {}", path, line)
            }
            SweepError::IdentifierCollision { identifier, .. } => {
                format!("Two different runs would write to the same output file {}", identifier)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SweepError::UnexpectedToken { .. } => {
                "Every parameter must be an option (-x or --xx), optionally followed by one value expression"
            }
            SweepError::InvalidExpression { .. } | SweepError::InvalidRangeBound { .. } => {
                "Use set:A,B,C or range:start,stop[,step] without spaces around punctuation"
            }
            SweepError::NonPositiveStep { .. } => "Use a positive step in range:start,stop,step",
            SweepError::RangeTooLarge { .. } => "Use a larger step or a narrower range",
            SweepError::DuplicateFlag { .. } => {
                "Give each parameter once, spelled the same way (either -x or --x)"
            }
            SweepError::SweepTooLarge { .. } => {
                "Split the sweep into smaller runs or raise --max-commands"
            }
            SweepError::OutputDirNotFound { .. } => {
                "Create the output directory first or pass --mkdir"
            }
            SweepError::LedgerNotFound { .. } => {
                "Check the output directory; it must be the one commands were generated for"
            }
            SweepError::MalformedRecord { .. } => {
                "Inspect the metadata file and remove or repair the broken line"
            }
            SweepError::IdentifierCollision { .. } => {
                "Regenerate with a wider identifier (--id-width) into a fresh output directory"
            }
            SweepError::ConfigError { .. }
            | SweepError::MissingConfigError { .. }
            | SweepError::InvalidConfigValueError { .. } => {
                "Check the command line options and the sweep file"
            }
            SweepError::IoError(_) => "Check file permissions and available disk space",
            SweepError::SerializationError(_) | SweepError::CsvError(_) => {
                "This is likely a bug; please report it with the offending input"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
