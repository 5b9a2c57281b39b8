//! Terminal output: results on stdout, diagnostics on stderr.

pub mod colors;
pub mod errors;

use colors::ColorSupport;
use depsort_core::{IssueSink, SinkLevel, SinkLine};

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: ColorSupport,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> ColorSupport {
        self.colors
    }

    /// Command result, uncolored on stdout
    pub fn print(&self, text: &str) {
        println!("{text}");
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", self.colors.green("✓"), message);
    }

    /// One sink line, indented by its group depth
    pub fn format_line(&self, line: &SinkLine) -> String {
        format_line(self.colors, line.level, line.depth, &line.text)
    }

    /// Sink for replaying a result's issues to the terminal
    pub fn sink(&self) -> OutputSink<'_> {
        OutputSink {
            output: self,
            depth: 0,
        }
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn format_line(colors: ColorSupport, level: SinkLevel, depth: usize, text: &str) -> String {
    let marker = match level {
        SinkLevel::Error => colors.red("✗"),
        SinkLevel::Warn => colors.yellow("⚠"),
        _ => colors.dim("·"),
    };
    format!("{}{} {}", "  ".repeat(depth), marker, text)
}

/// Prints every line to stderr as it is logged
pub struct OutputSink<'a> {
    output: &'a OutputHandler,
    depth: usize,
}

impl IssueSink for OutputSink<'_> {
    fn log(&mut self, level: SinkLevel, text: &str) {
        eprintln!("{}", format_line(self.output.colors, level, self.depth, text));
    }

    fn open_group(&mut self, level: SinkLevel, title: &str) {
        self.log(level, title);
        self.depth += 1;
    }

    fn close_group(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_indents_by_depth() {
        let output = OutputHandler::with_colors(ColorSupport::disabled());
        let line = SinkLine {
            level: SinkLevel::Error,
            depth: 1,
            text: "Missing dependencies: 'X'.".to_string(),
        };
        assert_eq!(output.format_line(&line), "  ✗ Missing dependencies: 'X'.");

        let line = SinkLine {
            level: SinkLevel::Info,
            depth: 0,
            text: "note".to_string(),
        };
        assert_eq!(output.format_line(&line), "· note");
    }

    #[test]
    fn test_output_sink_tracks_groups() {
        let output = OutputHandler::with_colors(ColorSupport::disabled());
        let mut sink = output.sink();
        sink.open_group(SinkLevel::Error, "Errors on 'A'");
        assert_eq!(sink.depth, 1);
        sink.close_group();
        sink.close_group();
        assert_eq!(sink.depth, 0);
    }
}
