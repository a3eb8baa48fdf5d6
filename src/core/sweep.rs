use crate::config::SweepConfig;
use crate::core::params::parse_params;
use crate::domain::model::{normalize_flag, InvocationRecord, ParsedFlags, ValueDomain};
use crate::domain::ports::{CommandSink, LedgerStore};
use crate::utils::error::{Result, SweepError};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Deterministic output identifier: SHA-256 over the command prefix (base
/// command and solo flags), the resolved argument string and the input path,
/// truncated to `width` hex characters.
pub fn output_identifier(prefix: &str, arg_string: &str, infile: &str, width: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher.update([0u8]);
    hasher.update(arg_string.as_bytes());
    hasher.update([0u8]);
    hasher.update(infile.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..width.min(digest.len())].to_string()
}

/// Normalized description of what a record runs, used to tell an idempotent
/// regeneration apart from a hash collision.
pub fn content_key(record: &InvocationRecord) -> String {
    let solo: Vec<&str> = record.solo_flags.iter().map(String::as_str).collect();
    let args: Vec<String> = record
        .arg_flags
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    format!(
        "{} [{}] [{}] {}",
        record.cmd,
        solo.join(" "),
        args.join(" "),
        record.infile
    )
}

/// Cartesian product over arg-flag domains; the last flag varies fastest.
pub struct Combinations<'a> {
    domains: &'a [(String, ValueDomain)],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    pub fn new(domains: &'a [(String, ValueDomain)]) -> Self {
        Self {
            domains,
            indices: vec![0; domains.len()],
            done: domains.iter().any(|(_, domain)| domain.is_empty()),
        }
    }
}

impl<'a> Iterator for Combinations<'a> {
    type Item = Vec<(&'a str, &'a str)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let domains = self.domains;
        let current = domains
            .iter()
            .zip(&self.indices)
            .map(|((name, domain), &i)| (name.as_str(), domain[i].as_str()))
            .collect();

        // 里程表式進位
        self.done = true;
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < domains[position].1.len() {
                self.done = false;
                break;
            }
            self.indices[position] = 0;
        }

        Some(current)
    }
}

pub struct SweepGenerator<L: LedgerStore, C: CommandSink> {
    config: SweepConfig,
    ledger: L,
    sink: C,
    dry_run: bool,
}

impl<L: LedgerStore, C: CommandSink> SweepGenerator<L, C> {
    pub fn new(config: SweepConfig, ledger: L, sink: C) -> Self {
        Self {
            config,
            ledger,
            sink,
            dry_run: false,
        }
    }

    /// Emit commands without appending to the ledger.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn into_parts(self) -> (L, C) {
        (self.ledger, self.sink)
    }

    /// Parse the configured sweep tokens and generate over the configured inputs.
    pub fn run(&mut self) -> Result<Vec<InvocationRecord>> {
        let flags = parse_params(&self.config.params, &self.config.expansion)?;
        let inputs = self.config.inputs.clone();
        self.generate(&flags, &inputs)
    }

    /// All records are built and checked for collisions before anything is
    /// appended or emitted, so a failing sweep leaves no partial output.
    pub fn generate(&mut self, flags: &ParsedFlags, inputs: &[String]) -> Result<Vec<InvocationRecord>> {
        let limit = self.config.max_commands;
        let combinations = flags
            .combinations()
            .ok_or(SweepError::SweepTooLarge { limit })?;
        let total = combinations
            .checked_mul(inputs.len())
            .filter(|&total| total <= limit)
            .ok_or(SweepError::SweepTooLarge { limit })?;
        tracing::info!(
            "Generating {} commands ({} combinations x {} inputs)",
            total,
            combinations,
            inputs.len()
        );

        let records = self.build_records(flags, inputs)?;
        for record in &records {
            if !self.dry_run {
                self.ledger.append(record)?;
            }
            self.sink.emit(&record.full_cmd)?;
            tracing::debug!("{}", record.full_cmd);
        }

        tracing::info!("Generated {} commands", records.len());
        Ok(records)
    }

    fn build_records(&self, flags: &ParsedFlags, inputs: &[String]) -> Result<Vec<InvocationRecord>> {
        let mut known = self.known_identifiers()?;
        let prefix = join_non_empty(
            std::iter::once(self.config.base_command.as_str())
                .chain(flags.solo_flags.iter().map(String::as_str)),
        );
        let solo_flags: BTreeSet<String> = flags
            .solo_flags
            .iter()
            .map(|flag| normalize_flag(flag).to_string())
            .collect();

        let mut records = Vec::new();
        for combination in Combinations::new(&flags.arg_flags) {
            let arg_string = join_non_empty(
                combination
                    .iter()
                    .map(|(flag, value)| format!("{} {}", flag, value)),
            );
            let arg_flags: BTreeMap<String, String> = combination
                .iter()
                .map(|(flag, value)| (normalize_flag(flag).to_string(), value.to_string()))
                .collect();

            for infile in inputs {
                let outfile = output_identifier(&prefix, &arg_string, infile, self.config.id_width);
                let outpath = self.config.output_dir.join(&outfile);
                let full_cmd = join_non_empty([
                    prefix.clone(),
                    arg_string.clone(),
                    self.config.output_flag.clone(),
                    outpath.display().to_string(),
                    infile.clone(),
                ]);

                let record = InvocationRecord {
                    outfile,
                    cmd: self.config.base_command.clone(),
                    infile: infile.clone(),
                    solo_flags: solo_flags.clone(),
                    arg_flags: arg_flags.clone(),
                    full_cmd,
                    created_at: Utc::now(),
                };

                let key = content_key(&record);
                match known.get(&record.outfile) {
                    Some(existing) if *existing != key => {
                        return Err(SweepError::IdentifierCollision {
                            identifier: record.outfile.clone(),
                            existing: existing.clone(),
                            incoming: key,
                        });
                    }
                    Some(_) => {
                        tracing::debug!("{} regenerated with identical parameters", record.outfile);
                    }
                    None => {
                        known.insert(record.outfile.clone(), key);
                    }
                }
                records.push(record);
            }
        }

        Ok(records)
    }

    fn known_identifiers(&self) -> Result<HashMap<String, String>> {
        if !self.ledger.exists() {
            return Ok(HashMap::new());
        }
        let existing = self.ledger.load_all()?;
        tracing::debug!("Checking against {} existing records", existing.len());
        Ok(existing
            .iter()
            .map(|record| (record.outfile.clone(), content_key(record)))
            .collect())
    }
}

fn join_non_empty<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter(|part| !part.as_ref().is_empty())
        .map(|part| part.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
