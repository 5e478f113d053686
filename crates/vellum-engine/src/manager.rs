//! Engine instances and their lifecycle

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vellum_core::{Action, RenderConfig, RenderOptions, SimpleAction, Syntax, TemplateIdentifier};

use crate::context::RenderContext;
use crate::diagnostics::{ArtifactEnricher, Enricher};
use crate::engine::{EngineInstance, EngineSettings};

/// Owns the file engine and the string engine
///
/// The file engine caches compiled templates and reloads them when
/// configured to; the string engine compiles every source it is given.
#[derive(Debug)]
pub struct EngineManager {
    work_dir: PathBuf,
    write_artifacts: bool,
    enricher: Arc<dyn Enricher>,
    file: Arc<EngineInstance>,
    string: Arc<EngineInstance>,
}

impl EngineManager {
    pub fn new(config: &RenderConfig) -> Self {
        let enricher: Arc<dyn Enricher> = Arc::new(ArtifactEnricher::new(config.work_dir()));
        Self::with_enricher(config, enricher)
    }

    pub fn with_enricher(config: &RenderConfig, enricher: Arc<dyn Enricher>) -> Self {
        let work_dir = config.work_dir();
        let write_artifacts = config.write_artifacts;
        let build = |name, allow_caching, allow_reload| {
            build_engine(&work_dir, write_artifacts, &enricher, name, allow_caching, allow_reload)
        };
        let file = Arc::new(build("file", true, config.reload_enabled()));
        let string = Arc::new(build("string", false, false));

        Self {
            work_dir,
            write_artifacts,
            enricher,
            file,
            string,
        }
    }

    /// A new engine sharing this manager's work directory and enricher
    ///
    /// Only caching engines write generated code.
    pub fn create_engine(&self, name: &'static str, allow_caching: bool, allow_reload: bool) -> EngineInstance {
        build_engine(
            &self.work_dir,
            self.write_artifacts,
            &self.enricher,
            name,
            allow_caching,
            allow_reload,
        )
    }

    pub fn file_engine(&self) -> &Arc<EngineInstance> {
        &self.file
    }

    pub fn string_engine(&self) -> &Arc<EngineInstance> {
        &self.string
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Warm both engines up by rendering an empty template in every syntax
    ///
    /// Failures are logged and never returned.
    pub fn start(&self) {
        let action: Arc<dyn Action> = Arc::new(SimpleAction::new("warm-up"));
        let options = RenderOptions::default();

        for syntax in Syntax::ALL {
            let result = TemplateIdentifier::new(format!("warm-up.{}", syntax.extension()))
                .map_err(Into::into)
                .and_then(|id| {
                    let context = RenderContext::build(&id, &self.string, &action, &options);
                    self.string.render_source(&id, syntax, "", context)
                });
            match result {
                Ok(_) => tracing::debug!(%syntax, "warmed up"),
                Err(e) => tracing::warn!(%syntax, error = %e, "warm-up render failed"),
            }
        }
    }

    /// Flush the caches of both engines
    pub fn stop(&self) {
        self.file.clear();
        self.string.clear();
    }
}

fn build_engine(
    work_dir: &Path,
    write_artifacts: bool,
    enricher: &Arc<dyn Enricher>,
    name: &'static str,
    allow_caching: bool,
    allow_reload: bool,
) -> EngineInstance {
    tracing::debug!(engine = name, allow_caching, allow_reload, "creating engine");
    EngineInstance::new(
        EngineSettings {
            name,
            allow_caching,
            allow_reload,
            write_artifacts: write_artifacts && allow_caching,
            work_dir: work_dir.to_path_buf(),
        },
        Arc::clone(enricher),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engines_follow_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::default().with_tmp_dir(dir.path());
        let manager = EngineManager::new(&config);

        assert_eq!(manager.work_dir(), dir.path().join("vellum"));
        assert!(manager.file_engine().allow_caching());
        assert!(manager.file_engine().allow_reload());
        assert!(!manager.string_engine().allow_caching());
        assert!(!manager.string_engine().allow_reload());

        let production = EngineManager::new(&config.with_production(true));
        assert!(!production.file_engine().allow_reload());
    }

    #[test]
    fn test_start_warms_up_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = EngineManager::new(&RenderConfig::default().with_tmp_dir(dir.path()));
        manager.start();
        assert!(!manager.work_dir().exists());
        assert_eq!(manager.string_engine().cached(), 0);
    }

    #[test]
    fn test_stop_flushes_caches() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("a.ssp");
        std::fs::write(&template, "x").unwrap();
        let manager = EngineManager::new(&RenderConfig::default().with_tmp_dir(dir.path()));
        let id = TemplateIdentifier::new("a.ssp").unwrap();

        manager.file_engine().file_unit(&id, &template, Syntax::Ssp).unwrap();
        assert_eq!(manager.file_engine().cached(), 1);
        manager.stop();
        assert_eq!(manager.file_engine().cached(), 0);
    }

    #[test]
    fn test_create_engine() {
        let manager = EngineManager::new(&RenderConfig::default());
        let engine = manager.create_engine("extra", true, false);
        assert_eq!(engine.name(), "extra");
        assert_eq!(engine.work_dir(), manager.work_dir());
    }
}
