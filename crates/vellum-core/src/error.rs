//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid template identifier `{identifier}`: {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("Unknown template syntax `{name}` (expected one of: jade, mustache, scaml, ssp)")]
    UnknownSyntax { name: String },

    #[error("Invalid render option `{key}`: {message}")]
    InvalidOption { key: String, message: String },

    #[error("Invalid locale `{tag}`")]
    InvalidLocale { tag: String },

    #[error("Failed to parse configuration: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
