//! Vellum Core - Core types shared by the Vellum rendering adapter
//!
//! This crate provides the foundational types used throughout Vellum:
//! - `TemplateIdentifier`: Relative template names and precompiled unit names
//! - `Syntax`: The four supported template syntaxes
//! - `RenderOptions`: Per-render overrides (syntax, date and number formats)
//! - `Action`: The request-side collaborator a render is performed for
//! - `RenderConfig`: Process configuration (template root, work dir, mode)

pub mod action;
pub mod config;
pub mod error;
pub mod format;
pub mod identifier;
pub mod options;
pub mod syntax;

pub use action::{Action, Attributes, HELPER_BINDING, SimpleAction};
pub use config::RenderConfig;
pub use error::{CoreError, Result};
pub use format::{
    DateFormat, DefaultDateFormat, DefaultNumberFormat, FixedNumberFormat, Locale, NumberFormat,
    PatternDateFormat,
};
pub use identifier::{TemplateIdentifier, UNIT_MARKER, UnitName};
pub use options::RenderOptions;
pub use syntax::Syntax;
