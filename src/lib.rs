pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{GenerateArgs, QueryArgs};

pub use adapters::{JsonlLedger, MemoryLedger};
pub use config::{OutputFormat, QueryConfig, SweepConfig};
pub use crate::core::expand::{expand, ExpansionSettings, ValueExpression};
pub use crate::core::params::parse_params;
pub use crate::core::query::{query, FilterSpec, QueryEngine};
pub use crate::core::sweep::SweepGenerator;
pub use domain::ports::LineSink;
pub use utils::error::{Result, SweepError};
