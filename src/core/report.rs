use crate::config::OutputFormat;
use crate::domain::model::InvocationRecord;
use crate::utils::error::Result;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

pub const FIXED_COLUMNS: [&str; 3] = ["cmd", "infile", "outfile"];
const PRESENT: &str = "true";

/// Tabular view of matched records with a schema computed once per query.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub solo_columns: Vec<String>,
    pub arg_columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn from_records(records: &[InvocationRecord], missing_marker: &str) -> Self {
        let solo_columns: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.solo_flags.iter().map(String::as_str))
            .collect();
        // 同名時只保留 solo 欄位
        let arg_columns: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.arg_flags.keys().map(String::as_str))
            .filter(|name| !solo_columns.contains(name))
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                let mut row = vec![
                    record.cmd.clone(),
                    record.infile.clone(),
                    record.outfile.clone(),
                ];
                row.extend(solo_columns.iter().map(|name| {
                    if record.has_solo_flag(name) {
                        PRESENT.to_string()
                    } else {
                        record
                            .arg_value(name)
                            .unwrap_or(missing_marker)
                            .to_string()
                    }
                }));
                row.extend(arg_columns.iter().map(|name| {
                    record.arg_value(name).unwrap_or(missing_marker).to_string()
                }));
                row
            })
            .collect();

        Self {
            solo_columns: solo_columns.into_iter().map(str::to_string).collect(),
            arg_columns: arg_columns.into_iter().map(str::to_string).collect(),
            rows,
        }
    }

    pub fn header(&self) -> Vec<&str> {
        FIXED_COLUMNS
            .iter()
            .copied()
            .chain(self.solo_columns.iter().map(String::as_str))
            .chain(self.arg_columns.iter().map(String::as_str))
            .collect()
    }

    pub fn write_delimited<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        wtr.write_record(self.header())?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

pub fn write_paths<W: Write>(mut writer: W, output_dir: &Path, records: &[InvocationRecord]) -> Result<()> {
    for record in records {
        writeln!(writer, "{}", output_dir.join(&record.outfile).display())?;
    }
    Ok(())
}

pub fn write_json_lines<W: Write>(mut writer: W, records: &[InvocationRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Render matched records in the requested format.
pub fn render<W: Write>(
    writer: W,
    format: OutputFormat,
    output_dir: &Path,
    records: &[InvocationRecord],
    missing_marker: &str,
) -> Result<()> {
    match format {
        OutputFormat::Paths => write_paths(writer, output_dir, records),
        OutputFormat::Json => write_json_lines(writer, records),
        OutputFormat::Tsv => ResultTable::from_records(records, missing_marker).write_delimited(writer, b'\t'),
        OutputFormat::Csv => ResultTable::from_records(records, missing_marker).write_delimited(writer, b','),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(outfile: &str, solo: &[&str], args: &[(&str, &str)]) -> InvocationRecord {
        InvocationRecord {
            outfile: outfile.to_string(),
            cmd: "./run".to_string(),
            infile: "in".to_string(),
            solo_flags: solo.iter().map(|s| s.to_string()).collect(),
            arg_flags: args
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            full_cmd: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_columns_are_union_of_observed_flags() {
        let records = vec![
            record("a", &["v"], &[("s", "1")]),
            record("b", &[], &[("foo", "bar")]),
        ];
        let table = ResultTable::from_records(&records, "NA");

        assert_eq!(table.header(), vec!["cmd", "infile", "outfile", "v", "foo", "s"]);
        assert_eq!(table.rows[0], vec!["./run", "in", "a", "true", "NA", "1"]);
        assert_eq!(table.rows[1], vec!["./run", "in", "b", "NA", "bar", "NA"]);
    }

    #[test]
    fn test_write_tsv() {
        let records = vec![record("a", &[], &[("s", "1")])];
        let mut out = Vec::new();
        render(&mut out, OutputFormat::Tsv, Path::new("results"), &records, "-").unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "cmd\tinfile\toutfile\ts\n./run\tin\ta\t1\n");
    }

    #[test]
    fn test_write_paths() {
        let records = vec![record("a", &[], &[]), record("b", &[], &[])];
        let mut out = Vec::new();
        render(&mut out, OutputFormat::Paths, Path::new("results"), &records, "NA").unwrap();

        let expected = format!(
            "{}\n{}\n",
            Path::new("results").join("a").display(),
            Path::new("results").join("b").display()
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_write_json_lines() {
        let records = vec![record("a", &["v"], &[("s", "1")])];
        let mut out = Vec::new();
        render(&mut out, OutputFormat::Json, Path::new("results"), &records, "NA").unwrap();

        let text = String::from_utf8(out).unwrap();
        let parsed: InvocationRecord = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(parsed, records[0]);
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let table = ResultTable::from_records(&[], "NA");
        let mut out = Vec::new();
        table.write_delimited(&mut out, b',').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "cmd,infile,outfile\n");
    }
}
