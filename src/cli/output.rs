//! Output formatting for CLI commands

use serde::Serialize;

use crate::domain::TaskRecord;
use crate::storage::DisplayConfig;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    display: DisplayConfig,
}

impl Output {
    pub fn new(format: OutputFormat, display: DisplayConfig) -> Self {
        Self { format, display }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints flattened outline rows (text only, ignored in JSON mode)
    pub fn outline(&self, rows: &[TaskRecord]) {
        if self.format == OutputFormat::Text {
            for row in rows {
                println!("{}", format_row(row, &self.display));
            }
        }
    }

    /// Prints a blank line (text only)
    pub fn blank(&self) {
        if self.format == OutputFormat::Text {
            println!();
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// Renders one outline row, indented by its level
///
/// Groups are marked `+` when collapsed and `-` when expanded.
pub fn format_row(task: &TaskRecord, display: &DisplayConfig) -> String {
    let indent = " ".repeat(task.indent_level as usize * display.indent_width);
    let marker = match (task.is_group, task.is_expanded) {
        (true, false) => "+",
        (true, true) => "-",
        (false, _) => "*",
    };

    let mut line = format!("{}{} {} [{}]", indent, marker, task.name, task.id);

    let mut details = Vec::new();
    if !task.duration_display.is_empty() {
        details.push(task.duration_display.clone());
    }
    details.push(format!("{}%", task.percent_complete));
    details.push(task.priority.to_string());
    line.push_str(&format!(" ({})", details.join(", ")));

    if display.show_dates {
        if let Some((start, finish)) = task.span() {
            line.push_str(&format!(
                " {} .. {}",
                start.format("%Y-%m-%d"),
                finish.format("%Y-%m-%d")
            ));
        }
    }

    if !task.assigned_to.is_empty() {
        line.push_str(&format!(" @{}", task.assigned_to));
    }

    line
}
