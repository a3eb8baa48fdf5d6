use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 展開後的值域：有序、非空
pub type ValueDomain = Vec<String>;

/// 去掉旗標前面的 '-'，記錄與過濾條件都以此形式比對
pub fn normalize_flag(flag: &str) -> &str {
    flag.trim_start_matches('-')
}

/// Parsed sweep parameters. Flag names keep their dashes here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFlags {
    pub solo_flags: Vec<String>,
    pub arg_flags: Vec<(String, ValueDomain)>,
}

impl ParsedFlags {
    pub fn add_solo(&mut self, flag: &str) {
        if !self.solo_flags.iter().any(|f| f == flag) {
            self.solo_flags.push(flag.to_string());
        }
    }

    /// 重複的旗標保留第一次出現的位置，使用最後一次的值域
    pub fn set_domain(&mut self, flag: &str, domain: ValueDomain) {
        match self.arg_flags.iter_mut().find(|(name, _)| name == flag) {
            Some((_, existing)) => *existing = domain,
            None => self.arg_flags.push((flag.to_string(), domain)),
        }
    }

    pub fn domain(&self, flag: &str) -> Option<&ValueDomain> {
        self.arg_flags
            .iter()
            .find(|(name, _)| name == flag)
            .map(|(_, domain)| domain)
    }

    pub fn is_empty(&self) -> bool {
        self.solo_flags.is_empty() && self.arg_flags.is_empty()
    }

    /// Number of cross-product elements, before multiplying by input files.
    /// `None` when the count does not fit in `usize`.
    pub fn combinations(&self) -> Option<usize> {
        self.arg_flags
            .iter()
            .try_fold(1usize, |acc, (_, domain)| acc.checked_mul(domain.len()))
    }
}

/// Metadata for one generated command; one line of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    /// Output file name, relative to the output directory.
    pub outfile: String,
    /// Base command as given by the user.
    pub cmd: String,
    pub infile: String,
    pub solo_flags: BTreeSet<String>,
    pub arg_flags: BTreeMap<String, String>,
    pub full_cmd: String,
    pub created_at: DateTime<Utc>,
}

impl InvocationRecord {
    pub fn has_solo_flag(&self, name: &str) -> bool {
        self.solo_flags.contains(name)
    }

    pub fn arg_value(&self, name: &str) -> Option<&str> {
        self.arg_flags.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_flag() {
        assert_eq!(normalize_flag("-s"), "s");
        assert_eq!(normalize_flag("--foo"), "foo");
        assert_eq!(normalize_flag("bar"), "bar");
    }

    #[test]
    fn test_repeated_arg_flag_keeps_position() {
        let mut flags = ParsedFlags::default();
        flags.set_domain("-a", vec!["1".to_string()]);
        flags.set_domain("-b", vec!["2".to_string()]);
        flags.set_domain("-a", vec!["3".to_string(), "4".to_string()]);

        assert_eq!(flags.arg_flags[0].0, "-a");
        assert_eq!(flags.domain("-a").unwrap(), &vec!["3".to_string(), "4".to_string()]);
        assert_eq!(flags.combinations(), Some(2));
    }

    #[test]
    fn test_empty_flags_have_one_combination() {
        let flags = ParsedFlags::default();
        assert!(flags.is_empty());
        assert_eq!(flags.combinations(), Some(1));
    }

    #[test]
    fn test_combination_count_overflow_is_none() {
        let wide: ValueDomain = (0..65536).map(|i| i.to_string()).collect();
        let mut flags = ParsedFlags::default();
        for name in ["-a", "-b", "-c"] {
            flags.set_domain(name, wide.clone());
        }
        assert_eq!(flags.combinations(), Some(1usize << 48));

        flags.set_domain("-d", wide);
        assert_eq!(flags.combinations(), None);
    }
}
