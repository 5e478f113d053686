//! Display formatting for CLI output
//!
//! Status lines go to stderr so rendered output on stdout stays clean.

use console::style;
use vellum_engine::RenderError;

/// Outcome of compiling a set of templates
#[derive(Debug, Default)]
pub struct CompileReport {
    pub compiled: usize,
    pub failures: Vec<(String, RenderError)>,
}

impl CompileReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(&mut self, identifier: &str) {
        self.compiled += 1;
        eprintln!("  {} {}", style("✓").green(), identifier);
    }

    pub fn fail(&mut self, identifier: &str, err: RenderError) {
        eprintln!("  {} {}", style("✗").red(), identifier);
        self.failures.push((identifier.to_string(), err));
    }

    pub fn total(&self) -> usize {
        self.compiled + self.failures.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Print every failure as a diagnostic, then a summary line
    pub fn display(&self) {
        for (identifier, err) in &self.failures {
            eprintln!();
            eprintln!("{}", style(identifier).cyan().bold());
            eprintln!("{}", err);
        }

        eprintln!();
        if self.has_errors() {
            eprintln!(
                "{} {} of {} template(s) failed",
                style("✗").red().bold(),
                self.failures.len(),
                self.total()
            );
        } else {
            eprintln!(
                "{} {} template(s) compiled",
                style("✓").green().bold(),
                self.compiled
            );
        }
    }
}

/// A section header, e.g. `→ Checking templates in views`
pub fn header(message: &str) {
    eprintln!("{} {}", style("→").blue(), message);
}

pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}
