//! Rendering facade
//!
//! A [`Renderer`] ties the configuration, the engine manager and the template
//! resolver together. It is an ordinary owned value: build one at startup and
//! share it by reference (or behind an `Arc`) with request handlers.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vellum_core::{Action, RenderConfig, RenderOptions, SimpleAction};
//! use vellum_engine::Renderer;
//!
//! let renderer = Renderer::builder()
//!     .config(RenderConfig::default().with_template_root("views"))
//!     .build();
//! renderer.start();
//!
//! let action: Arc<dyn Action> = Arc::new(SimpleAction::new("Index").with_attribute("user", "Ada"));
//! let html = renderer.render("app/Index.jade", &action, &RenderOptions::default())?;
//! # Ok::<(), vellum_engine::RenderError>(())
//! ```

use std::path::Path;
use std::sync::Arc;

use vellum_core::{Action, RenderConfig, RenderOptions, Syntax, TemplateIdentifier, UnitName};

use crate::context::RenderContext;
use crate::diagnostics::{ArtifactEnricher, Enricher};
use crate::error::Result;
use crate::manager::EngineManager;
use crate::resolver::{ResolveMode, TemplateResolver};
use crate::units::UnitRegistry;

/// Builder for a [`Renderer`]
#[derive(Debug, Default)]
pub struct RendererBuilder {
    config: RenderConfig,
    units: UnitRegistry,
    enricher: Option<Arc<dyn Enricher>>,
}

impl RendererBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Precompiled units available to the renderer
    pub fn units(mut self, units: UnitRegistry) -> Self {
        self.units = units;
        self
    }

    /// Replace the artifact-based error enrichment
    pub fn enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn build(self) -> Renderer {
        let enricher = self
            .enricher
            .unwrap_or_else(|| Arc::new(ArtifactEnricher::new(self.config.work_dir())));
        let manager = EngineManager::with_enricher(&self.config, enricher);
        let resolver = TemplateResolver::new(
            &self.config.template_root,
            self.config.default_syntax,
            Arc::new(self.units),
            self.config.unit_cache_capacity,
        );

        tracing::debug!(
            template_root = %self.config.template_root.display(),
            production = self.config.production,
            units = resolver.units().registry().len(),
            "renderer ready"
        );

        Renderer {
            config: self.config,
            manager,
            resolver,
        }
    }
}

/// Renders templates for actions
#[derive(Debug)]
pub struct Renderer {
    config: RenderConfig,
    manager: EngineManager,
    resolver: TemplateResolver,
}

impl Renderer {
    pub fn builder() -> RendererBuilder {
        RendererBuilder::new()
    }

    /// A renderer without precompiled units
    pub fn new(config: RenderConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn manager(&self) -> &EngineManager {
        &self.manager
    }

    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    pub fn work_dir(&self) -> &Path {
        self.manager.work_dir()
    }

    /// Warm the engines up, if configured to
    pub fn start(&self) {
        if self.config.warm_up {
            self.manager.start();
        }
    }

    /// Flush every cache
    pub fn stop(&self) {
        self.manager.stop();
        self.resolver.units().clear();
    }

    /// Render `identifier` the way the configured mode resolves it
    pub fn render(&self, identifier: &str, action: &Arc<dyn Action>, options: &RenderOptions) -> Result<String> {
        let mode = ResolveMode::for_production(self.config.production);
        self.render_with_mode(identifier, mode, action, options)
    }

    /// Render a template file, falling back to its precompiled unit
    pub fn render_file(&self, identifier: &str, action: &Arc<dyn Action>, options: &RenderOptions) -> Result<String> {
        self.render_with_mode(identifier, ResolveMode::File, action, options)
    }

    /// Render the precompiled unit of `identifier`
    pub fn render_precompiled(
        &self,
        identifier: &str,
        action: &Arc<dyn Action>,
        options: &RenderOptions,
    ) -> Result<String> {
        self.render_with_mode(identifier, ResolveMode::Precompiled, action, options)
    }

    fn render_with_mode(
        &self,
        identifier: &str,
        mode: ResolveMode,
        action: &Arc<dyn Action>,
        options: &RenderOptions,
    ) -> Result<String> {
        let identifier = TemplateIdentifier::new(identifier)?;
        tracing::debug!(template = %identifier, ?mode, action = action.name(), "rendering");
        self.resolver
            .resolve(&identifier, mode, self.manager.file_engine(), action, options)
    }

    /// Render template source held in memory
    ///
    /// The `type` option wins over `syntax`. String renders go through the
    /// non-caching engine and never write generated code.
    pub fn render_string(
        &self,
        source: &str,
        syntax: Syntax,
        action: &Arc<dyn Action>,
        options: &RenderOptions,
    ) -> Result<String> {
        let syntax = options.syntax().unwrap_or(syntax);
        let identifier = TemplateIdentifier::new(format!("inline.{}", syntax.extension()))?;
        let engine = self.manager.string_engine();
        let context = RenderContext::build(&identifier, engine, action, options);
        engine.render_source(&identifier, syntax, source, context)
    }

    /// Precompiled unit name of `identifier`
    pub fn unit_name(&self, identifier: &str) -> Result<Option<UnitName>> {
        Ok(TemplateIdentifier::new(identifier)?.unit_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use vellum_core::SimpleAction;

    fn action() -> Arc<dyn Action> {
        Arc::new(SimpleAction::new("Show").with_attribute("name", "Ada"))
    }

    fn renderer(dir: &Path, production: bool) -> Renderer {
        let root = dir.join("templates");
        std::fs::create_dir_all(root.join("app")).unwrap();
        std::fs::write(root.join("app/Hello.ssp"), "file ${name}").unwrap();

        let mut units = UnitRegistry::new();
        units
            .register_generated("app/Hello.ssp", Syntax::Ssp, "unit {{ name }}")
            .unwrap();

        let config = RenderConfig::default()
            .with_template_root(root)
            .with_tmp_dir(dir.join("tmp"))
            .with_production(production);
        Renderer::builder().config(config).units(units).build()
    }

    #[test]
    fn test_render_follows_mode() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions::default();

        let dev = renderer(dir.path(), false);
        assert_eq!(dev.render("app/Hello.ssp", &action(), &options).unwrap(), "file Ada");

        let prod = renderer(dir.path(), true);
        assert_eq!(prod.render("app/Hello.ssp", &action(), &options).unwrap(), "unit Ada");
        assert_eq!(prod.render_file("app/Hello.ssp", &action(), &options).unwrap(), "file Ada");
    }

    #[test]
    fn test_render_string() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path(), false);
        let plain = RenderOptions::default();

        let out = renderer
            .render_string("{{#name}}[{{.}}]{{/name}}", Syntax::Mustache, &action(), &plain)
            .unwrap();
        assert_eq!(out, "[Ada]");

        let forced = RenderOptions::new().with_syntax(Syntax::Ssp);
        let out = renderer
            .render_string("${context.identifier}", Syntax::Jade, &action(), &forced)
            .unwrap();
        assert_eq!(out, "inline.ssp");
        assert!(!renderer.work_dir().exists());
    }

    #[test]
    fn test_invalid_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path(), false);
        let err = renderer
            .render("/etc/passwd.ssp", &action(), &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_stop_clears_unit_cache() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path(), true);
        renderer.start();
        renderer
            .render_precompiled("app/Hello.ssp", &action(), &RenderOptions::default())
            .unwrap();
        assert_eq!(renderer.resolver().units().cached(), 1);
        renderer.stop();
        assert_eq!(renderer.resolver().units().cached(), 0);
    }

    #[test]
    fn test_unit_name() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path(), false);
        let name = renderer.unit_name("app/action/Foo.jade").unwrap().unwrap();
        assert_eq!(name.as_str(), "app.action.$_vellum_$.Foo_jade");
        assert!(renderer.unit_name("README").unwrap().is_none());
    }
}
