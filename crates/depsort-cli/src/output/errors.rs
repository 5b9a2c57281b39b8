//! Error reports with the suggestion of the underlying `DepSortError`.

use super::colors::ColorSupport;
use depsort_core::DepSortError;

/// Formats errors with their causes and a help line
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a formatter with detected color support
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Message, causes, then the help line when a `DepSortError` is in the chain
    pub fn format_error(&self, error: &anyhow::Error) -> String {
        let mut output = String::new();

        output.push_str(&self.colors.red("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        for cause in error.chain().skip(1) {
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&cause.to_string());
            output.push('\n');
        }

        let suggestion = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<DepSortError>())
            .and_then(DepSortError::suggestion);
        if let Some(suggestion) = suggestion {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
