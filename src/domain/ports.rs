use crate::domain::model::InvocationRecord;
use crate::utils::error::Result;
use std::io::Write;

/// Append-only store of invocation records for one output directory.
pub trait LedgerStore {
    fn append(&mut self, record: &InvocationRecord) -> Result<()>;
    fn load_all(&self) -> Result<Vec<InvocationRecord>>;
    /// 帳本尚未建立時為 false
    fn exists(&self) -> bool;
}

/// Consumer of generated command lines (shell script, job runner, ...).
pub trait CommandSink {
    fn emit(&mut self, command_line: &str) -> Result<()>;
}

impl CommandSink for Vec<String> {
    fn emit(&mut self, command_line: &str) -> Result<()> {
        self.push(command_line.to_string());
        Ok(())
    }
}

/// Writes one command per line to any writer, flushing after each line.
pub struct LineSink<W: Write> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CommandSink for LineSink<W> {
    fn emit(&mut self, command_line: &str) -> Result<()> {
        writeln!(self.writer, "{}", command_line)?;
        self.writer.flush()?;
        Ok(())
    }
}
