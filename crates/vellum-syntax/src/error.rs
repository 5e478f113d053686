//! Syntax errors with source positions

use std::fmt;

use miette::{Diagnostic, NamedSource, SourceSpan};
use pest::error::InputLocation;
use thiserror::Error;

/// 1-based line and column of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Position of a byte offset within `source`
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(source, offset.min(source.len()));
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// A template (or generated code) that failed to parse
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(vellum::template::syntax))]
pub struct SyntaxError {
    /// Error message
    pub message: String,

    /// Name of the source that failed to parse
    pub uri: String,

    /// Source text
    #[source_code]
    pub src: NamedSource<String>,

    /// Error location in source
    #[label("syntax error here")]
    pub span: Option<SourceSpan>,

    /// Line and column, when known
    pub position: Option<Position>,
}

impl SyntaxError {
    /// Error at a byte offset of `source`
    pub fn at(message: impl Into<String>, uri: &str, source: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(source, offset.min(source.len()));
        let len = source[offset..].chars().next().map_or(0, char::len_utf8);
        Self {
            message: message.into(),
            uri: uri.to_string(),
            src: NamedSource::new(uri, source.to_string()),
            span: Some(SourceSpan::new(offset.into(), len.into())),
            position: Some(Position::from_offset(source, offset)),
        }
    }

    /// Error without a known position
    pub fn unpositioned(message: impl Into<String>, uri: &str, source: &str) -> Self {
        Self {
            message: message.into(),
            uri: uri.to_string(),
            src: NamedSource::new(uri, source.to_string()),
            span: None,
            position: None,
        }
    }

    /// A grammar that failed to match `source`
    pub(crate) fn from_pest<R: pest::RuleType>(err: pest::error::Error<R>, uri: &str, source: &str) -> Self {
        let offset = match err.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };
        Self::at(err.variant.message(), uri, source, offset)
    }

    /// The source text the error refers to
    pub fn source_text(&self) -> &str {
        self.src.inner()
    }

    /// Replace the message, keeping source, span and position
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}
