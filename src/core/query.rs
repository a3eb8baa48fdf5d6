use crate::core::expand::ExpansionSettings;
use crate::core::params::parse_params;
use crate::domain::model::{normalize_flag, InvocationRecord};
use crate::domain::ports::LedgerStore;
use crate::utils::error::Result;
use std::collections::{BTreeMap, BTreeSet};

/// Required solo flags plus acceptable values per arg flag, all normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub solo_flags: BTreeSet<String>,
    pub arg_flags: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSpec {
    /// Parse a filter written in the sweep grammar, e.g. `-s set:0,5 --foo bar -v`.
    pub fn parse<S: AsRef<str>>(tokens: &[S], settings: &ExpansionSettings) -> Result<Self> {
        let parsed = parse_params(tokens, settings)?;
        Ok(Self {
            solo_flags: parsed
                .solo_flags
                .iter()
                .map(|flag| normalize_flag(flag).to_string())
                .collect(),
            arg_flags: parsed
                .arg_flags
                .into_iter()
                .map(|(flag, domain)| (normalize_flag(&flag).to_string(), domain.into_iter().collect()))
                .collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.solo_flags.is_empty() && self.arg_flags.is_empty()
    }

    /// Flags the filter does not mention impose no constraint.
    pub fn matches(&self, record: &InvocationRecord) -> bool {
        self.solo_flags.iter().all(|flag| record.has_solo_flag(flag))
            && self.arg_flags.iter().all(|(flag, accepted)| {
                record
                    .arg_value(flag)
                    .is_some_and(|value| accepted.contains(value))
            })
    }
}

/// Matching records in ledger order.
pub fn query(records: Vec<InvocationRecord>, filter: &FilterSpec) -> Vec<InvocationRecord> {
    records.into_iter().filter(|record| filter.matches(record)).collect()
}

pub struct QueryEngine<L: LedgerStore> {
    ledger: L,
}

impl<L: LedgerStore> QueryEngine<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    pub fn run(&self, filter: &FilterSpec) -> Result<Vec<InvocationRecord>> {
        let records = self.ledger.load_all()?;
        let total = records.len();
        let matches = query(records, filter);
        tracing::info!("{} of {} records match", matches.len(), total);
        Ok(matches)
    }
}
