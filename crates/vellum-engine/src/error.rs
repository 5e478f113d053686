//! Engine error types

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use vellum_core::CoreError;
use vellum_syntax::SyntaxError;

/// Main engine error type
#[derive(Error, Debug, Diagnostic)]
pub enum RenderError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Template `{identifier}` not found{}", not_found_hint(.unit_name.as_deref(), .suggestion.as_deref()))]
    #[diagnostic(code(vellum::unit_not_found))]
    UnitNotFound {
        identifier: String,
        unit_name: Option<String>,
        suggestion: Option<String>,
    },

    #[error(transparent)]
    #[diagnostic(code(vellum::render))]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    #[diagnostic(code(vellum::render))]
    Enriched(#[from] EnrichedError),

    #[error("Invalid template identifier `{identifier}`: {reason}")]
    #[diagnostic(
        code(vellum::invalid_identifier),
        help("use a relative path such as `app/Index.jade`")
    )]
    InvalidIdentifier { identifier: String, reason: String },

    #[error(transparent)]
    Core(CoreError),

    #[error("{what} lock poisoned")]
    LockPoisoned { what: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn not_found_hint(unit_name: Option<&str>, suggestion: Option<&str>) -> String {
    let mut hint = match unit_name {
        Some(name) => format!(" (no template file and no precompiled unit `{}`)", name),
        None => " (no template file, and the identifier has no precompiled unit name)".to_string(),
    };
    if let Some(suggestion) = suggestion {
        hint.push_str(&format!(". Did you mean `{}`?", suggestion));
    }
    hint
}

impl From<CoreError> for RenderError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidIdentifier { identifier, reason } => {
                Self::InvalidIdentifier { identifier, reason }
            }
            CoreError::Io(err) => Self::Io(err),
            other => Self::Core(other),
        }
    }
}

impl RenderError {
    /// Line of the failing template, for syntax and runtime errors
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax(err) => err.position.map(|p| p.line),
            Self::Runtime(err) => err.line,
            Self::Enriched(err) => err.cause.line,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnitNotFound { .. })
    }
}

/// Failure while executing generated code
#[derive(Error, Debug)]
#[error("{message}")]
pub struct RuntimeError {
    /// Error description
    pub message: String,

    /// Line of the generated code (and of the template) that failed
    pub line: Option<usize>,

    source: Option<minijinja::Error>,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            source: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Wrap a MiniJinja render error
    pub fn from_minijinja(err: minijinja::Error) -> Self {
        Self {
            message: describe(&err),
            line: err.line(),
            source: Some(err),
        }
    }
}

/// A runtime error annotated with template and generated-code listings
#[derive(Error, Debug)]
#[error("{message}")]
pub struct EnrichedError {
    /// Composite description
    pub message: String,

    /// Identifier of the failing template
    pub identifier: String,

    /// Generated code the error was mapped onto
    pub artifact: PathBuf,

    #[source]
    pub cause: RuntimeError,
}

/// Error kind and detail of a MiniJinja error, without its location suffix
pub(crate) fn describe(err: &minijinja::Error) -> String {
    match err.detail() {
        Some(detail) => format!("{}: {}", err.kind(), detail),
        None => err.kind().to_string(),
    }
}

/// A syntax error in generated code, positioned on the template line it came from
pub(crate) fn syntax_error_from_minijinja(
    err: &minijinja::Error,
    uri: &str,
    template_source: &str,
) -> SyntaxError {
    let message = describe(err);
    match err.line().and_then(|line| line_offset(template_source, line)) {
        Some(offset) => SyntaxError::at(message, uri, template_source, offset),
        None => SyntaxError::unpositioned(message, uri, template_source),
    }
}

/// Byte offset of the first non-blank character of a 1-based line
fn line_offset(source: &str, line_num: usize) -> Option<usize> {
    let mut offset = 0;
    for (index, line) in source.split('\n').enumerate() {
        if index + 1 == line_num {
            let indent = line.len() - line.trim_start().len();
            return Some(offset + indent);
        }
        offset += line.len() + 1;
    }
    None
}

pub type Result<T> = std::result::Result<T, RenderError>;
