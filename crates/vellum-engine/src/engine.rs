//! Engine instances based on MiniJinja
//!
//! An engine translates template source into Jinja, compiles it into its own
//! MiniJinja environment and executes it against a [`RenderContext`]. File
//! engines cache compiled units per identifier and syntax; with reloading
//! enabled a cached unit is recompiled as soon as its file changes.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use vellum_core::{Syntax, TemplateIdentifier};

use crate::context::{RESERVED_BINDINGS, RenderContext};
use crate::diagnostics::{Enricher, artifact_path, enrich_syntax_error};
use crate::error::{RenderError, Result, RuntimeError, syntax_error_from_minijinja};
use crate::functions::{self, ENGINE_FUNCTIONS};
use crate::units::TemplateUnit;

/// Modification time and size of a template file when it was compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl SourceStamp {
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// A template compiled into an executable environment
pub struct CompiledUnit {
    identifier: TemplateIdentifier,
    syntax: Syntax,
    source: Option<String>,
    generated: String,
    stamp: Option<SourceStamp>,
    inline: bool,
    env: Environment<'static>,
}

impl fmt::Debug for CompiledUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledUnit")
            .field("identifier", &self.identifier)
            .field("syntax", &self.syntax)
            .field("stamp", &self.stamp)
            .finish_non_exhaustive()
    }
}

impl CompiledUnit {
    pub fn identifier(&self) -> &TemplateIdentifier {
        &self.identifier
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Original template source, when known
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Generated Jinja code
    pub fn generated(&self) -> &str {
        &self.generated
    }
}

type CacheKey = (TemplateIdentifier, Syntax);

/// A configured unit factory
pub struct EngineInstance {
    name: &'static str,
    allow_caching: bool,
    allow_reload: bool,
    write_artifacts: bool,
    work_dir: PathBuf,
    base: Environment<'static>,
    enricher: Arc<dyn Enricher>,
    cache: RwLock<HashMap<CacheKey, Arc<CompiledUnit>>>,
}

impl fmt::Debug for EngineInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineInstance")
            .field("name", &self.name)
            .field("allow_caching", &self.allow_caching)
            .field("allow_reload", &self.allow_reload)
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}

/// Settings for a new [`EngineInstance`]
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub name: &'static str,
    pub allow_caching: bool,
    pub allow_reload: bool,
    pub write_artifacts: bool,
    pub work_dir: PathBuf,
}

impl EngineInstance {
    pub fn new(settings: EngineSettings, enricher: Arc<dyn Enricher>) -> Self {
        let mut base = Environment::new();
        base.set_auto_escape_callback(|_| AutoEscape::Html);
        functions::register(&mut base);

        Self {
            name: settings.name,
            allow_caching: settings.allow_caching,
            allow_reload: settings.allow_reload,
            write_artifacts: settings.write_artifacts,
            work_dir: settings.work_dir,
            base,
            enricher,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn allow_caching(&self) -> bool {
        self.allow_caching
    }

    pub fn allow_reload(&self) -> bool {
        self.allow_reload
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Names every template namespace binds, reserved names first
    pub fn bindings(&self) -> Vec<&'static str> {
        RESERVED_BINDINGS
            .iter()
            .chain(ENGINE_FUNCTIONS)
            .copied()
            .collect()
    }

    /// Translate and compile template source
    pub fn compile(
        &self,
        identifier: &TemplateIdentifier,
        syntax: Syntax,
        source: &str,
    ) -> Result<CompiledUnit> {
        let generated = vellum_syntax::translate(syntax, identifier.as_str(), source)
            .map_err(enrich_syntax_error)?;
        self.build_unit(identifier, syntax, Some(source.to_string()), generated)
    }

    /// Compile the generated code of a precompiled unit
    ///
    /// The code is written out like a compiled file's, so runtime errors of
    /// the unit are reported against the code that actually ran.
    pub fn load_unit(&self, unit: &dyn TemplateUnit) -> Result<CompiledUnit> {
        let compiled = self.build_unit(
            unit.identifier(),
            unit.syntax(),
            unit.source().map(str::to_string),
            unit.code().to_string(),
        )?;
        if self.write_artifacts {
            self.write_artifact(unit.identifier(), compiled.generated());
        }
        Ok(compiled)
    }

    fn build_unit(
        &self,
        identifier: &TemplateIdentifier,
        syntax: Syntax,
        source: Option<String>,
        generated: String,
    ) -> Result<CompiledUnit> {
        let mut env = self.base.clone();
        if syntax == Syntax::Mustache {
            env.set_undefined_behavior(UndefinedBehavior::Chainable);
        }

        if let Err(err) = env.add_template_owned(identifier.to_string(), generated.clone()) {
            let listing = source.as_deref().unwrap_or(&generated);
            let err = syntax_error_from_minijinja(&err, identifier.as_str(), listing);
            return Err(RenderError::Syntax(enrich_syntax_error(err)));
        }

        Ok(CompiledUnit {
            identifier: identifier.clone(),
            syntax,
            source,
            generated,
            stamp: None,
            inline: false,
            env,
        })
    }

    /// Compiled unit for a template file, honoring caching and reloading
    pub fn file_unit(
        &self,
        identifier: &TemplateIdentifier,
        path: &Path,
        syntax: Syntax,
    ) -> Result<Arc<CompiledUnit>> {
        let key = (identifier.clone(), syntax);

        if self.allow_caching {
            let cached = self
                .cache
                .read()
                .map_err(|_| RenderError::LockPoisoned { what: "template cache" })?
                .get(&key)
                .cloned();

            if let Some(unit) = cached {
                if !self.allow_reload || unit.stamp == Some(SourceStamp::of(path)?) {
                    tracing::debug!(template = %identifier, engine = self.name, "template cache hit");
                    return Ok(unit);
                }
                tracing::debug!(template = %identifier, "template changed on disk, reloading");
            }
        }

        let stamp = SourceStamp::of(path)?;
        let source = fs::read_to_string(path)?;
        let mut unit = self.compile(identifier, syntax, &source)?;
        unit.stamp = Some(stamp);
        let unit = Arc::new(unit);

        if self.write_artifacts {
            self.write_artifact(identifier, unit.generated());
        }

        if self.allow_caching {
            self.cache
                .write()
                .map_err(|_| RenderError::LockPoisoned { what: "template cache" })?
                .insert(key, Arc::clone(&unit));
        }

        Ok(unit)
    }

    /// Render a template file
    pub fn render_file(
        &self,
        identifier: &TemplateIdentifier,
        path: &Path,
        syntax: Syntax,
        context: RenderContext<'_>,
    ) -> Result<String> {
        let unit = self.file_unit(identifier, path, syntax)?;
        self.execute(&unit, context)
    }

    /// Render template source that has no file behind it
    ///
    /// Source renders are never cached and never write generated code.
    pub fn render_source(
        &self,
        identifier: &TemplateIdentifier,
        syntax: Syntax,
        source: &str,
        context: RenderContext<'_>,
    ) -> Result<String> {
        let mut unit = self.compile(identifier, syntax, source)?;
        unit.inline = true;
        self.execute(&unit, context)
    }

    /// Execute a compiled unit
    pub fn execute(&self, unit: &CompiledUnit, mut context: RenderContext<'_>) -> Result<String> {
        let name = unit.identifier.as_str();
        let template = unit
            .env
            .get_template(name)
            .map_err(|e| RenderError::Runtime(RuntimeError::from_minijinja(e)))?;

        match template.render(context.to_value()) {
            Ok(rendered) => {
                context.write(&rendered);
                Ok(context.into_output())
            }
            Err(err) => {
                let err = RuntimeError::from_minijinja(err);
                if unit.inline {
                    Err(RenderError::Runtime(err))
                } else {
                    Err(self.enricher.enrich(err, &unit.identifier, unit.source()))
                }
            }
        }
    }

    /// Write generated code below the work directory
    ///
    /// Failures are logged; rendering does not depend on the artifact.
    pub fn write_artifact(&self, identifier: &TemplateIdentifier, generated: &str) {
        let path = artifact_path(&self.work_dir, identifier);
        match write_atomic(&path, generated) {
            Ok(()) => tracing::debug!(path = %path.display(), "wrote generated code"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to write generated code"),
        }
    }

    /// Number of cached units
    pub fn cached(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Drop every cached unit
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            tracing::debug!(engine = self.name, units = cache.len(), "flushing template cache");
            cache.clear();
        }
    }
}

fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", std::process::id()));
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}
