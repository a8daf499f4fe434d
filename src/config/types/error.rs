//! Configuration errors and validation diagnostics.

use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("relive.toml is not valid TOML")]
    Toml(#[from] toml::de::Error),

    // no #[source]: the diagnostics print themselves in full
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

// ============================================================================
// diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fails loading.
    Error,
    /// Printed, loading continues (e.g. a compiler not on PATH yet).
    Warning,
}

/// One problem with one field.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub severity: Severity,
    /// Dotted field path, e.g. `restart.compile`
    pub field: &'static str,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.severity {
            Severity::Error => "→".red().to_string(),
            Severity::Warning => "→".yellow().to_string(),
        };
        writeln!(f, "{}{}{}", "[".dimmed(), self.field.cyan(), "]".dimmed())?;
        write!(f, "{arrow} {}", self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  {} {}", "hint:".yellow(), hint)?;
        }
        Ok(())
    }
}

/// Everything wrong with a config, reported in one go.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    items: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        severity: Severity,
        field: &'static str,
        message: String,
        hint: Option<String>,
    ) {
        self.items.push(ConfigDiagnostic {
            severity,
            field,
            message,
            hint,
        });
    }

    pub fn error(&mut self, field: &'static str, message: impl Into<String>) {
        self.push(Severity::Error, field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: &'static str,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(Severity::Error, field, message.into(), Some(hint.into()));
    }

    pub fn warn(&mut self, field: &'static str, message: impl Into<String>) {
        self.push(Severity::Warning, field, message.into(), None);
    }

    pub fn print_warnings(&self) {
        for warning in self.warnings() {
            crate::log!("config"; "[{}] {}", warning.field, warning.message);
        }
    }

    fn with_severity(&self, severity: Severity) -> Vec<&ConfigDiagnostic> {
        self.items
            .iter()
            .filter(|item| item.severity == severity)
            .collect()
    }

    pub fn errors(&self) -> Vec<&ConfigDiagnostic> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<&ConfigDiagnostic> {
        self.with_severity(Severity::Warning)
    }

    /// Number of errors; warnings don't count.
    pub fn len(&self) -> usize {
        self.errors().len()
    }

    /// No errors (there may still be warnings).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors();
        writeln!(f, "{}\n", "invalid relive.toml:".red().bold())?;
        for (i, err) in errors.iter().enumerate() {
            if i > 0 {
                writeln!(f, "\n")?;
            }
            write!(f, "{err}")?;
        }
        if errors.len() > 1 {
            write!(
                f,
                "\n\n{} {} {}",
                "found".dimmed(),
                errors.len().to_string().red().bold(),
                "errors".dimmed()
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}
