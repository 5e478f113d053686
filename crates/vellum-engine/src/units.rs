//! Precompiled template units
//!
//! A unit is generated code registered under its synthesized unit name,
//! usually by the `units.rs` module `vellum precompile` writes:
//!
//! ```
//! use vellum_core::Syntax;
//! use vellum_engine::UnitRegistry;
//!
//! let mut registry = UnitRegistry::new();
//! registry
//!     .register_generated("app/Index.ssp", Syntax::Ssp, "Hello {{ name }}!")
//!     .unwrap();
//! assert!(registry.contains("app.$_vellum_$.Index_ssp"));
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use vellum_core::{Syntax, TemplateIdentifier, UnitName};

use crate::engine::{CompiledUnit, EngineInstance};
use crate::error::{RenderError, Result};

/// Generated code a precompiled unit executes
pub trait TemplateUnit: Send + Sync + fmt::Debug {
    /// Identifier of the template the unit was generated from
    fn identifier(&self) -> &TemplateIdentifier;

    /// Syntax of the original template
    fn syntax(&self) -> Syntax;

    /// Generated Jinja code
    fn code(&self) -> &str;

    /// Original template source, when the unit carries it
    fn source(&self) -> Option<&str> {
        None
    }
}

/// A unit backed by generated code held in memory
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    identifier: TemplateIdentifier,
    syntax: Syntax,
    code: Cow<'static, str>,
}

impl GeneratedUnit {
    pub fn new(identifier: TemplateIdentifier, syntax: Syntax, code: impl Into<Cow<'static, str>>) -> Self {
        Self {
            identifier,
            syntax,
            code: code.into(),
        }
    }
}

impl TemplateUnit for GeneratedUnit {
    fn identifier(&self) -> &TemplateIdentifier {
        &self.identifier
    }

    fn syntax(&self) -> Syntax {
        self.syntax
    }

    fn code(&self) -> &str {
        &self.code
    }
}

/// Zero-argument constructor of a unit
pub type UnitFactory = Arc<dyn Fn() -> Box<dyn TemplateUnit> + Send + Sync>;

/// Unit names mapped to the factories that instantiate them
#[derive(Default, Clone)]
pub struct UnitRegistry {
    factories: HashMap<String, UnitFactory>,
}

impl fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("UnitRegistry").field("units", &names).finish()
    }
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under an explicit unit name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn TemplateUnit> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Arc::new(factory)).is_some() {
            tracing::debug!(unit = %name, "replacing registered unit");
        }
    }

    /// Register generated code under the unit name of `identifier`
    pub fn register_generated(
        &mut self,
        identifier: &str,
        syntax: Syntax,
        code: impl Into<Cow<'static, str>>,
    ) -> Result<UnitName> {
        let identifier = TemplateIdentifier::new(identifier)?;
        let name = identifier.unit_name().ok_or_else(|| RenderError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: "identifier has no extension to derive a unit name from".to_string(),
        })?;

        let unit = GeneratedUnit::new(identifier, syntax, code);
        self.register(name.as_str(), move || Box::new(unit.clone()) as Box<dyn TemplateUnit>);
        Ok(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate the unit registered under `name`
    pub fn instantiate(&self, name: &str) -> Option<Box<dyn TemplateUnit>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Closest registered unit name, for "did you mean" hints
    pub fn suggest(&self, name: &str) -> Option<String> {
        let max_distance = (name.len() / 4).max(3);
        self.names()
            .map(|candidate| (strsim::levenshtein(name, candidate), candidate))
            .filter(|(distance, _)| *distance > 0 && *distance <= max_distance)
            .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
            .map(|(_, candidate)| candidate.to_string())
    }
}

/// Bounded cache of compiled precompiled units
///
/// When the cache is full an arbitrary entry is evicted; evicted units are
/// simply instantiated again on their next use.
#[derive(Debug)]
pub struct UnitResolver {
    registry: Arc<UnitRegistry>,
    capacity: usize,
    cache: RwLock<HashMap<String, Arc<CompiledUnit>>>,
}

impl UnitResolver {
    pub fn new(registry: Arc<UnitRegistry>, capacity: usize) -> Self {
        Self {
            registry,
            capacity,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Compiled unit for `name`, or `None` when nothing is registered under it
    pub fn resolve(&self, name: &UnitName, engine: &EngineInstance) -> Result<Option<Arc<CompiledUnit>>> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| RenderError::LockPoisoned { what: "unit cache" })?;
            if let Some(unit) = cache.get(name.as_str()) {
                tracing::debug!(unit = %name, "unit cache hit");
                return Ok(Some(Arc::clone(unit)));
            }
        }

        let Some(unit) = self.registry.instantiate(name.as_str()) else {
            return Ok(None);
        };
        tracing::debug!(unit = %name, "instantiating precompiled unit");
        let compiled = Arc::new(engine.load_unit(unit.as_ref())?);

        if self.capacity > 0 {
            let mut cache = self
                .cache
                .write()
                .map_err(|_| RenderError::LockPoisoned { what: "unit cache" })?;
            if cache.len() >= self.capacity && !cache.contains_key(name.as_str()) {
                let evicted = cache.keys().next().cloned();
                if let Some(evicted) = evicted {
                    tracing::debug!(unit = %evicted, "evicting cached unit");
                    cache.remove(&evicted);
                }
            }
            cache.insert(name.as_str().to_string(), Arc::clone(&compiled));
        }

        Ok(Some(compiled))
    }

    /// Number of cached units
    pub fn cached(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }
}
