use crate::domain::model::InvocationRecord;
use crate::domain::ports::LedgerStore;
use crate::utils::error::{Result, SweepError};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const LEDGER_FILE_NAME: &str = "METADATA.jsonl";

/// JSON Lines ledger stored in the output directory.
///
/// Each append writes one complete line with a single `write_all` on a file
/// opened in append mode, so the file stays parseable after any number of
/// appends from any number of runs. Writers in separate processes are not
/// otherwise coordinated.
#[derive(Debug, Clone)]
pub struct JsonlLedger {
    path: PathBuf,
}

impl JsonlLedger {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            path: output_dir.as_ref().join(LEDGER_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonlLedger {
    fn append(&mut self, record: &InvocationRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<InvocationRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SweepError::LedgerNotFound {
                    path: self.path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|source| SweepError::MalformedRecord {
                path: self.path.display().to_string(),
                line: index + 1,
                source,
            })?;
            records.push(record);
        }

        tracing::debug!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// 記憶體中的帳本，測試使用
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    records: Vec<InvocationRecord>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<InvocationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[InvocationRecord] {
        &self.records
    }
}

impl LedgerStore for MemoryLedger {
    fn append(&mut self, record: &InvocationRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<InvocationRecord>> {
        Ok(self.records.clone())
    }

    fn exists(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::{BTreeMap, BTreeSet};
    use tempfile::TempDir;

    fn record(outfile: &str, seed: &str) -> InvocationRecord {
        InvocationRecord {
            outfile: outfile.to_string(),
            cmd: "./experiment.py".to_string(),
            infile: "inputs/input1".to_string(),
            solo_flags: BTreeSet::from(["fast".to_string()]),
            arg_flags: BTreeMap::from([("s".to_string(), seed.to_string())]),
            full_cmd: format!("./experiment.py --fast -s {} -o results/{} inputs/input1", seed, outfile),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_many_appends_stay_parseable() {
        let dir = TempDir::new().unwrap();

        // 模擬多次獨立執行各自開檔寫入
        for i in 0..5 {
            let mut ledger = JsonlLedger::new(dir.path());
            ledger.append(&record(&format!("id{:06}", i), &i.to_string())).unwrap();
        }

        let records = JsonlLedger::new(dir.path()).load_all().unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].outfile, "id000000");
        assert_eq!(records[4].arg_value("s"), Some("4"));
    }

    #[test]
    fn test_ledger_created_on_first_append() {
        let dir = TempDir::new().unwrap();
        let mut ledger = JsonlLedger::new(dir.path());
        assert!(!ledger.exists());

        ledger.append(&record("abcd1234", "0")).unwrap();
        assert!(ledger.exists());
        assert_eq!(ledger.path(), dir.path().join(LEDGER_FILE_NAME));
    }

    #[test]
    fn test_missing_ledger_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = JsonlLedger::new(dir.path()).load_all().unwrap_err();
        assert!(matches!(err, SweepError::LedgerNotFound { .. }));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let dir = TempDir::new().unwrap();
        let mut ledger = JsonlLedger::new(dir.path());
        ledger.append(&record("abcd1234", "0")).unwrap();

        let mut file = OpenOptions::new().append(true).open(ledger.path()).unwrap();
        file.write_all(b"\n{\"outfile\": \"broken\"\n").unwrap();

        let err = ledger.load_all().unwrap_err();
        assert!(matches!(err, SweepError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn test_record_round_trips_through_ledger() {
        let dir = TempDir::new().unwrap();
        let mut ledger = JsonlLedger::new(dir.path());
        let original = record("abcd1234", "3");
        ledger.append(&original).unwrap();

        assert_eq!(ledger.load_all().unwrap(), vec![original]);
    }
}
