//! Reporting sinks.
//!
//! The sorter never logs its findings while computing; a finished result is
//! replayed into an `IssueSink` on demand. `TracingSink` forwards to the
//! `tracing` macros, `MemorySink` keeps the lines for rendering and tests.

use serde::Serialize;
use std::fmt;

/// Severity of a reported line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for SinkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SinkLevel::Trace => "trace",
            SinkLevel::Debug => "debug",
            SinkLevel::Info => "info",
            SinkLevel::Warn => "warn",
            SinkLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Leveled messages with nested groups
pub trait IssueSink {
    fn log(&mut self, level: SinkLevel, text: &str);

    /// Logs `title` and nests the following lines under it
    fn open_group(&mut self, level: SinkLevel, title: &str);

    fn close_group(&mut self);

    fn error(&mut self, text: &str) {
        self.log(SinkLevel::Error, text);
    }

    fn warn(&mut self, text: &str) {
        self.log(SinkLevel::Warn, text);
    }

    fn info(&mut self, text: &str) {
        self.log(SinkLevel::Info, text);
    }
}

/// Forwards to `tracing`, the open groups go in the `group` field
#[derive(Debug, Default)]
pub struct TracingSink {
    groups: Vec<String>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn group_path(&self) -> String {
        self.groups.join(" / ")
    }
}

impl IssueSink for TracingSink {
    fn log(&mut self, level: SinkLevel, text: &str) {
        let group = self.group_path();
        match level {
            SinkLevel::Trace => tracing::trace!(group = %group, "{}", text),
            SinkLevel::Debug => tracing::debug!(group = %group, "{}", text),
            SinkLevel::Info => tracing::info!(group = %group, "{}", text),
            SinkLevel::Warn => tracing::warn!(group = %group, "{}", text),
            SinkLevel::Error => tracing::error!(group = %group, "{}", text),
        }
    }

    fn open_group(&mut self, level: SinkLevel, title: &str) {
        self.log(level, title);
        self.groups.push(title.to_string());
    }

    fn close_group(&mut self) {
        self.groups.pop();
    }
}

/// One recorded line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkLine {
    /// Level the line was written at
    pub level: SinkLevel,
    /// Number of groups open when the line was written
    pub depth: usize,
    /// Text of the line, indentation included
    pub text: String,
}

/// Records every line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Vec<SinkLine>,
    depth: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in the order they were written
    pub fn lines(&self) -> &[SinkLine] {
        &self.lines
    }

    /// Texts of every line
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    /// Count the lines written at `level`
    pub fn count_at(&self, level: SinkLevel) -> usize {
        self.lines.iter().filter(|l| l.level == level).count()
    }

    /// Check if nothing was written
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Two spaces of indentation per group level
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            for text in line.text.lines() {
                out.push_str(&"  ".repeat(line.depth));
                out.push_str(text);
                out.push('\n');
            }
        }
        out
    }
}

impl IssueSink for MemorySink {
    fn log(&mut self, level: SinkLevel, text: &str) {
        self.lines.push(SinkLine {
            level,
            depth: self.depth,
            text: text.to_string(),
        });
    }

    fn open_group(&mut self, level: SinkLevel, title: &str) {
        self.log(level, title);
        self.depth += 1;
    }

    fn close_group(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
