//! User-facing output
//!
//! Messages printed through [`Output`] are what the user reads; `tracing`
//! events are diagnostics for operators. The two are kept separate.

use crate::types::Repository;
use std::io::Write;

/// Sink for human-readable progress and error messages
pub trait Output: Send + Sync {
    /// Print an informational message
    fn print_message(&self, message: &str);

    /// Print an error message
    fn print_error(&self, message: &str);

    /// Print a table of records
    fn print_table(&self, table: &Table);
}

/// A simple table of string cells
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    /// Column headers
    pub headers: Vec<String>,
    /// Rows; each row has one cell per header
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given headers
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header count
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Repository listing with the columns of the repository list command
    pub fn repositories(repos: &[Repository]) -> Self {
        let mut table = Table::new(["ID", "NAME", "PRODUCT", "CONTENT TYPE", "URL"]);
        for repo in repos {
            table.push_row(vec![
                repo.id.to_string(),
                repo.name.clone(),
                repo.product.clone().unwrap_or_default(),
                repo.content_type.clone().unwrap_or_default(),
                repo.url.clone().unwrap_or_default(),
            ]);
        }
        table
    }

    /// Render as aligned, `|`-separated columns with a dashed header rule
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let format_row = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let rule = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-|-");

        let mut lines = vec![rule.clone(), format_row(&self.headers), rule.clone()];
        lines.extend(self.rows.iter().map(|row| format_row(row)));
        lines.push(rule);
        lines.join("\n")
    }
}

/// Writes messages to stdout and errors to stderr
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn print_message(&self, message: &str) {
        let mut stdout = std::io::stdout().lock();
        // a closed stdout is not worth failing the export over
        writeln!(stdout, "{message}").ok();
    }

    fn print_error(&self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{message}").ok();
    }

    fn print_table(&self, table: &Table) {
        self.print_message(&table.render());
    }
}
