pub mod expand;
pub mod params;
pub mod query;
pub mod report;
pub mod sweep;

pub use crate::domain::model::{InvocationRecord, ParsedFlags, ValueDomain};
pub use crate::domain::ports::{CommandSink, LedgerStore};
pub use crate::utils::error::Result;
