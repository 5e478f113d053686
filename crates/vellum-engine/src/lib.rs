//! Vellum Engine - multi-syntax template rendering on MiniJinja
//!
//! This crate renders Jade, Mustache, Scaml and SSP templates for an
//! [`Action`](vellum_core::Action):
//! - Dual-mode resolution: template files in development, precompiled units
//!   in production, each falling back to the other where it makes sense
//! - Per-render contexts with the reserved `helper` and `context` bindings
//!   and locale-aware date and number formatting
//! - Runtime errors mapped back onto the template and its generated code

pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod error;
mod functions;
pub mod manager;
pub mod renderer;
pub mod resolver;
pub mod units;

pub use context::{CONTEXT_BINDING, HELPER_BINDING, RESERVED_BINDINGS, RenderContext};
pub use diagnostics::{
    ArtifactEnricher, Enricher, GENERATED_DIR, GENERATED_EXTENSION, NoopEnricher, artifact_path,
    numbered_listing,
};
pub use engine::{CompiledUnit, EngineInstance, EngineSettings};
pub use error::{EnrichedError, RenderError, Result, RuntimeError};
pub use functions::ENGINE_FUNCTIONS;
pub use manager::EngineManager;
pub use renderer::{Renderer, RendererBuilder};
pub use resolver::{ResolveMode, TemplateResolver};
pub use units::{GeneratedUnit, TemplateUnit, UnitFactory, UnitRegistry, UnitResolver};
