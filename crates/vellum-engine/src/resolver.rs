//! Template resolution
//!
//! File mode renders `<template_root>/<identifier>` through the file engine
//! and falls back to a precompiled unit when there is no such file.
//! Precompiled mode never touches template files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vellum_core::{Action, RenderOptions, Syntax, TemplateIdentifier};

use crate::context::RenderContext;
use crate::engine::EngineInstance;
use crate::error::{RenderError, Result};
use crate::units::{UnitRegistry, UnitResolver};

/// Where templates are loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Template files first, precompiled units as a fallback
    #[default]
    File,
    /// Precompiled units only
    Precompiled,
}

impl ResolveMode {
    pub fn for_production(production: bool) -> Self {
        if production { Self::Precompiled } else { Self::File }
    }
}

#[derive(Debug)]
pub struct TemplateResolver {
    template_root: PathBuf,
    default_syntax: Syntax,
    units: UnitResolver,
}

impl TemplateResolver {
    pub fn new(
        template_root: impl Into<PathBuf>,
        default_syntax: Syntax,
        registry: Arc<UnitRegistry>,
        unit_cache_capacity: usize,
    ) -> Self {
        Self {
            template_root: template_root.into(),
            default_syntax,
            units: UnitResolver::new(registry, unit_cache_capacity),
        }
    }

    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    pub fn units(&self) -> &UnitResolver {
        &self.units
    }

    /// Syntax of a render: the `type` option, else the extension, else the default
    pub fn syntax_for(&self, identifier: &TemplateIdentifier, options: &RenderOptions) -> Syntax {
        identifier.select_syntax(options.syntax(), self.default_syntax)
    }

    /// Resolve `identifier` and render it
    pub fn resolve(
        &self,
        identifier: &TemplateIdentifier,
        mode: ResolveMode,
        engine: &EngineInstance,
        action: &Arc<dyn Action>,
        options: &RenderOptions,
    ) -> Result<String> {
        if mode == ResolveMode::File {
            let path = identifier.to_path(&self.template_root);
            if path.is_file() {
                let syntax = self.syntax_for(identifier, options);
                let context = RenderContext::build(identifier, engine, action, options);
                match engine.render_file(identifier, &path, syntax, context) {
                    Err(RenderError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                        tracing::debug!(template = %identifier, "template file vanished, trying precompiled unit");
                    }
                    result => return result,
                }
            } else {
                tracing::debug!(
                    template = %identifier,
                    path = %path.display(),
                    "no template file, trying precompiled unit"
                );
            }
        }

        self.render_precompiled(identifier, engine, action, options)
    }

    /// Render the precompiled unit of `identifier`
    pub fn render_precompiled(
        &self,
        identifier: &TemplateIdentifier,
        engine: &EngineInstance,
        action: &Arc<dyn Action>,
        options: &RenderOptions,
    ) -> Result<String> {
        let Some(name) = identifier.unit_name() else {
            return Err(RenderError::UnitNotFound {
                identifier: identifier.to_string(),
                unit_name: None,
                suggestion: None,
            });
        };

        match self.units.resolve(&name, engine)? {
            Some(unit) => {
                let context = RenderContext::build(identifier, engine, action, options);
                engine.execute(&unit, context)
            }
            None => Err(RenderError::UnitNotFound {
                identifier: identifier.to_string(),
                suggestion: self.units.registry().suggest(name.as_str()),
                unit_name: Some(name.into_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::EngineManager;
    use vellum_core::{RenderConfig, SimpleAction};

    struct Fixture {
        _dir: tempfile::TempDir,
        manager: EngineManager,
        resolver: TemplateResolver,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");
        std::fs::create_dir_all(root.join("app")).unwrap();
        std::fs::write(root.join("app/Both.ssp"), "from file").unwrap();
        std::fs::write(root.join("app/Plain.txt"), "${helper.name}").unwrap();

        let mut registry = UnitRegistry::new();
        registry
            .register_generated("app/Both.ssp", Syntax::Ssp, "from unit")
            .unwrap();
        registry
            .register_generated("app/Only.ssp", Syntax::Ssp, "only unit")
            .unwrap();

        let config = RenderConfig::default()
            .with_tmp_dir(dir.path().join("tmp"))
            .with_template_root(&root);
        let manager = EngineManager::new(&config);
        let resolver = TemplateResolver::new(&root, Syntax::Jade, Arc::new(registry), 16);
        Fixture {
            _dir: dir,
            manager,
            resolver,
        }
    }

    fn action() -> Arc<dyn Action> {
        Arc::new(SimpleAction::new("Show"))
    }

    fn resolve(fixture: &Fixture, id: &str, mode: ResolveMode) -> Result<String> {
        let id = TemplateIdentifier::new(id).unwrap();
        fixture.resolver.resolve(
            &id,
            mode,
            fixture.manager.file_engine(),
            &action(),
            &RenderOptions::default(),
        )
    }

    #[test]
    fn test_file_mode_prefers_file() {
        let fixture = fixture();
        assert_eq!(resolve(&fixture, "app/Both.ssp", ResolveMode::File).unwrap(), "from file");
    }

    #[test]
    fn test_precompiled_mode_never_reads_files() {
        let fixture = fixture();
        assert_eq!(
            resolve(&fixture, "app/Both.ssp", ResolveMode::Precompiled).unwrap(),
            "from unit"
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_unit() {
        let fixture = fixture();
        assert_eq!(resolve(&fixture, "app/Only.ssp", ResolveMode::File).unwrap(), "only unit");
    }

    #[test]
    fn test_missing_everywhere_is_unit_not_found() {
        let fixture = fixture();
        let err = resolve(&fixture, "app/Onl.ssp", ResolveMode::File).unwrap_err();
        match err {
            RenderError::UnitNotFound {
                identifier,
                unit_name,
                suggestion,
            } => {
                assert_eq!(identifier, "app/Onl.ssp");
                assert_eq!(unit_name.as_deref(), Some("app.$_vellum_$.Onl_ssp"));
                assert_eq!(suggestion.as_deref(), Some("app.$_vellum_$.Only_ssp"));
            }
            other => panic!("expected UnitNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_identifier_without_extension_is_unit_not_found() {
        let fixture = fixture();
        let err = resolve(&fixture, "README", ResolveMode::File).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_type_option_overrides_extension() {
        let fixture = fixture();
        let id = TemplateIdentifier::new("app/Plain.txt").unwrap();
        let options = RenderOptions::new().with_syntax(Syntax::Ssp);
        let out = fixture
            .resolver
            .resolve(&id, ResolveMode::File, fixture.manager.file_engine(), &action(), &options)
            .unwrap();
        assert_eq!(out, "Show");
    }

    #[test]
    fn test_syntax_selection() {
        let fixture = fixture();
        let id = TemplateIdentifier::new("a/b.mustache").unwrap();
        let plain = RenderOptions::default();
        assert_eq!(fixture.resolver.syntax_for(&id, &plain), Syntax::Mustache);
        let forced = RenderOptions::new().with_syntax(Syntax::Scaml);
        assert_eq!(fixture.resolver.syntax_for(&id, &forced), Syntax::Scaml);
        let unknown = TemplateIdentifier::new("a/b.txt").unwrap();
        assert_eq!(fixture.resolver.syntax_for(&unknown, &plain), Syntax::Jade);
    }

    #[test]
    fn test_mode_for_production() {
        assert_eq!(ResolveMode::for_production(true), ResolveMode::Precompiled);
        assert_eq!(ResolveMode::for_production(false), ResolveMode::File);
    }
}
