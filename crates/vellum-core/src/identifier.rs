//! Template identifiers and precompiled unit names
//!
//! A template is named by a relative, `/`-separated path such as
//! `app/action/Index.jade`. The same identifier is used to locate the
//! template source under the template root, to locate its generated code
//! under the work directory, and to synthesize the name of its precompiled
//! unit.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::syntax::Syntax;

/// Sentinel segment that distinguishes generated units from hand-written ones
pub const UNIT_MARKER: &str = "$_vellum_$";

/// A relative template path, normalised to `/` separators
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TemplateIdentifier(String);

impl TemplateIdentifier {
    /// Validate and normalise an identifier
    ///
    /// Backslashes are treated as path separators. Absolute paths, empty
    /// segments and `.`/`..` segments are rejected so an identifier can never
    /// escape the directory it is resolved against.
    pub fn new(identifier: impl AsRef<str>) -> Result<Self> {
        let raw = identifier.as_ref();
        let normalised = raw.trim().replace('\\', "/");

        let invalid = |reason: &str| CoreError::InvalidIdentifier {
            identifier: raw.to_string(),
            reason: reason.to_string(),
        };

        if normalised.is_empty() {
            return Err(invalid("identifier is empty"));
        }
        if normalised.starts_with('/') || Path::new(&normalised).is_absolute() {
            return Err(invalid("identifier must be relative"));
        }
        for segment in normalised.split('/') {
            match segment {
                "" => return Err(invalid("identifier contains an empty path segment")),
                "." | ".." => return Err(invalid("identifier must not contain `.` or `..` segments")),
                _ => {}
            }
        }

        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extension of the last path segment, if any
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.0.rsplit('/').next().unwrap_or(&self.0);
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }

    /// Syntax implied by the extension
    pub fn syntax(&self) -> Option<Syntax> {
        self.extension().and_then(Syntax::from_extension)
    }

    /// Pick the syntax for a render: an explicit choice wins, then the
    /// extension, then the process default.
    pub fn select_syntax(&self, explicit: Option<Syntax>, default: Syntax) -> Syntax {
        explicit.or_else(|| self.syntax()).unwrap_or(default)
    }

    /// Absolute location of the template below `root`
    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |path, segment| path.join(segment))
    }

    /// Name of the precompiled unit generated for this template
    ///
    /// `app/action/Index.jade` becomes `app.action.$_vellum_$.Index_jade`.
    /// Identifiers with a single dot-separated segment have no unit name.
    pub fn unit_name(&self) -> Option<UnitName> {
        let with_dots = self.0.replace('/', ".");
        let segments: Vec<&str> = with_dots.split('.').collect();
        if segments.len() < 2 {
            return None;
        }

        let suffix = segments[segments.len() - 1];
        let base = segments[segments.len() - 2];
        if suffix.is_empty() || base.is_empty() {
            return None;
        }

        let prefix = segments[..segments.len() - 2].join(".");
        let name = if prefix.is_empty() {
            format!("{}.{}_{}", UNIT_MARKER, base, suffix)
        } else {
            format!("{}.{}.{}_{}", prefix, UNIT_MARKER, base, suffix)
        };
        Some(UnitName(name))
    }
}

impl fmt::Display for TemplateIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TemplateIdentifier {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TemplateIdentifier> for String {
    fn from(value: TemplateIdentifier) -> Self {
        value.0
    }
}

impl AsRef<str> for TemplateIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name under which a precompiled unit is registered
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitName(String);

impl UnitName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
