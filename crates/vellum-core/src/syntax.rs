//! Supported template syntaxes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One of the four template syntaxes Vellum can render
///
/// The syntax of a template is normally inferred from its file extension
/// (`app/Index.jade` is Jade) but can be overridden per render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// Indentation-based markup with bare tag names
    #[default]
    Jade,
    /// Logic-less `{{name}}` templates with sections
    Mustache,
    /// Indentation-based markup with `%tag` names
    Scaml,
    /// Server pages with `${expr}` and `<% stmt %>` tags
    Ssp,
}

impl Syntax {
    /// All syntaxes, in a stable order
    pub const ALL: [Syntax; 4] = [Syntax::Jade, Syntax::Mustache, Syntax::Scaml, Syntax::Ssp];

    /// File extension used by templates written in this syntax
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jade => "jade",
            Self::Mustache => "mustache",
            Self::Scaml => "scaml",
            Self::Ssp => "ssp",
        }
    }

    /// Look up a syntax by file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|syntax| syntax.extension().eq_ignore_ascii_case(extension))
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Syntax {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim().trim_start_matches('.')).ok_or_else(|| {
            CoreError::UnknownSyntax {
                name: s.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_round_trip() {
        for syntax in Syntax::ALL {
            assert_eq!(Syntax::from_extension(syntax.extension()), Some(syntax));
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("JADE".parse::<Syntax>().unwrap(), Syntax::Jade);
        assert_eq!(".ssp".parse::<Syntax>().unwrap(), Syntax::Ssp);
        assert_eq!(" Mustache ".parse::<Syntax>().unwrap(), Syntax::Mustache);
    }

    #[test]
    fn test_unknown_syntax() {
        let err = "erb".parse::<Syntax>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownSyntax { .. }));
        assert!(err.to_string().contains("erb"));
    }

    #[test]
    fn test_default_is_jade() {
        assert_eq!(Syntax::default(), Syntax::Jade);
    }

    #[test]
    fn test_serde_lowercase() {
        let yaml = serde_yaml::to_string(&Syntax::Scaml).unwrap();
        assert_eq!(yaml.trim(), "scaml");
        let parsed: Syntax = serde_yaml::from_str("mustache").unwrap();
        assert_eq!(parsed, Syntax::Mustache);
    }
}
