//! Diagnostics formatting
//!
//! Syntax errors get a caret excerpt of the offending template line. Runtime
//! errors are mapped onto the generated code written below the work
//! directory, so the report shows both the template and the exact code that
//! was executing.

use std::fmt;
use std::path::{Path, PathBuf};

use vellum_core::TemplateIdentifier;
use vellum_syntax::SyntaxError;

use crate::error::{EnrichedError, RenderError, RuntimeError};

/// Extension of generated code artifacts
pub const GENERATED_EXTENSION: &str = "j2";

/// Directory below the work directory that holds generated code
pub const GENERATED_DIR: &str = "src";

/// Lines prefixed with a 4-wide, 1-based line number and two spaces
pub fn numbered_listing<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>4}  {}", i + 1, line.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// [`numbered_listing`] of a whole text
pub fn numbered_source(source: &str) -> String {
    numbered_listing(&source.lines().collect::<Vec<_>>())
}

/// The numbered line at `line` with a caret under `column`
pub fn caret_excerpt(source: &str, line: usize, column: usize) -> Option<String> {
    let text = source.lines().nth(line.checked_sub(1)?)?;
    // Tabs in the line stay tabs in the padding
    let pad: String = text
        .chars()
        .take(column.saturating_sub(1))
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    Some(format!("{:>4}  {}\n      {}^", line, text, pad))
}

/// Append the location and a caret excerpt to a positioned syntax error
///
/// Errors without a position are returned unchanged.
pub fn enrich_syntax_error(err: SyntaxError) -> SyntaxError {
    let Some(position) = err.position else {
        return err;
    };

    let mut message = format!(
        "{}\n --> {}:{}:{}",
        err.message, err.uri, position.line, position.column
    );
    if let Some(excerpt) = caret_excerpt(err.source_text(), position.line, position.column) {
        message.push('\n');
        message.push_str(&excerpt);
    }
    err.with_message(message)
}

/// Where the generated code of `identifier` lives
pub fn artifact_path(work_dir: &Path, identifier: &TemplateIdentifier) -> PathBuf {
    let mut path = work_dir.join(GENERATED_DIR);
    for segment in identifier.as_str().split('/') {
        path.push(segment);
    }
    let file_name = path
        .file_name()
        .map(|name| format!("{}.{}", name.to_string_lossy(), GENERATED_EXTENSION))
        .unwrap_or_default();
    path.set_file_name(file_name);
    path
}

/// Annotate a runtime error with the template and its generated code
///
/// When no generated code exists for `identifier` the error is returned
/// unchanged as [`RenderError::Runtime`].
pub fn enrich_runtime_error(
    err: RuntimeError,
    work_dir: &Path,
    identifier: &TemplateIdentifier,
    template_source: Option<&str>,
) -> RenderError {
    let artifact = artifact_path(work_dir, identifier);
    let generated = match std::fs::read_to_string(&artifact) {
        Ok(generated) => generated,
        Err(e) => {
            tracing::debug!(
                path = %artifact.display(),
                error = %e,
                "no generated code to enrich runtime error with"
            );
            return RenderError::Runtime(err);
        }
    };

    let mut message = format!("{}\n\nTemplate: {}", err.message, identifier);
    if let Some(source) = template_source {
        message.push_str("\n\n");
        message.push_str(&numbered_source(source));
    }
    message.push_str("\n\nGenerated code: ");
    message.push_str(&artifact.display().to_string());
    if let Some(line) = err.line {
        message.push_str(&format!(":{}", line));
    }
    message.push_str("\n\n");
    message.push_str(&numbered_source(&generated));

    RenderError::Enriched(EnrichedError {
        message,
        identifier: identifier.to_string(),
        artifact,
        cause: err,
    })
}

/// Hook applied to runtime errors before they leave the engine
pub trait Enricher: Send + Sync + fmt::Debug {
    fn enrich(
        &self,
        err: RuntimeError,
        identifier: &TemplateIdentifier,
        template_source: Option<&str>,
    ) -> RenderError;
}

/// Maps runtime errors onto generated code artifacts
#[derive(Debug, Clone)]
pub struct ArtifactEnricher {
    work_dir: PathBuf,
}

impl ArtifactEnricher {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }
}

impl Enricher for ArtifactEnricher {
    fn enrich(
        &self,
        err: RuntimeError,
        identifier: &TemplateIdentifier,
        template_source: Option<&str>,
    ) -> RenderError {
        enrich_runtime_error(err, &self.work_dir, identifier, template_source)
    }
}

/// Leaves runtime errors untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnricher;

impl Enricher for NoopEnricher {
    fn enrich(&self, err: RuntimeError, _: &TemplateIdentifier, _: Option<&str>) -> RenderError {
        RenderError::Runtime(err)
    }
}
