//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use miette::Diagnostic;
use thiserror::Error;
use vellum_core::CoreError;
use vellum_engine::RenderError;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Rendering or compiling a template failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    /// Configuration, option or locale could not be used
    #[error(transparent)]
    #[diagnostic(code(vellum::cli::config))]
    Core(#[from] CoreError),

    /// One or more templates failed to compile
    #[error("{errors} of {files} template(s) failed to compile")]
    #[diagnostic(code(vellum::cli::check))]
    CheckFailed { errors: usize, files: usize },

    /// The user provided invalid input
    #[error("{message}")]
    #[diagnostic(code(vellum::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(vellum::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Render(err) => match err {
                RenderError::Syntax(_) => exit_codes::SYNTAX_ERROR,
                RenderError::UnitNotFound { .. } => exit_codes::NOT_FOUND,
                RenderError::InvalidIdentifier { .. } => exit_codes::USAGE_ERROR,
                RenderError::Io(_) => exit_codes::IO_ERROR,
                _ => exit_codes::TEMPLATE_ERROR,
            },
            CliError::Core(CoreError::Io(_)) => exit_codes::IO_ERROR,
            CliError::Core(CoreError::YamlParse(_)) => exit_codes::ERROR,
            CliError::Core(_) => exit_codes::USAGE_ERROR,
            CliError::CheckFailed { .. } => exit_codes::SYNTAX_ERROR,
            CliError::Input { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }

    /// Create an input error with help text
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn check_failed(errors: usize, files: usize) -> Self {
        Self::CheckFailed { errors, files }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<walkdir::Error> for CliError {
    fn from(err: walkdir::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let not_found = CliError::from(RenderError::UnitNotFound {
            identifier: "a.jade".to_string(),
            unit_name: None,
            suggestion: None,
        });
        assert_eq!(not_found.exit_code(), exit_codes::NOT_FOUND);
        assert_eq!(
            CliError::input_with_help("bad", "try again").exit_code(),
            exit_codes::USAGE_ERROR
        );
        assert_eq!(CliError::check_failed(1, 3).exit_code(), exit_codes::SYNTAX_ERROR);

        let io = CliError::from(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), exit_codes::IO_ERROR);
    }

    #[test]
    fn test_check_failed_message() {
        assert_eq!(
            CliError::check_failed(2, 5).to_string(),
            "2 of 5 template(s) failed to compile"
        );
    }
}
