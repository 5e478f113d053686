//! Rendering configuration
//!
//! Usually loaded from a `vellum.yaml` file next to the application:
//!
//! ```yaml
//! templateRoot: src/main/view
//! tmpDir: /var/tmp/myapp
//! production: true
//! defaultSyntax: jade
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::syntax::Syntax;

/// Name of the directory below `tmp_dir` that holds generated code
pub const WORK_DIR_NAME: &str = "vellum";

/// Process-wide rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Directory template identifiers are resolved against
    #[serde(default = "default_template_root")]
    pub template_root: PathBuf,

    /// Scratch directory; generated code lives in `<tmpDir>/vellum`
    #[serde(default = "std::env::temp_dir")]
    pub tmp_dir: PathBuf,

    /// Production mode loads precompiled units instead of template files
    #[serde(default)]
    pub production: bool,

    /// Re-check template files before reusing a cached unit
    /// (defaults to `!production`)
    #[serde(default)]
    pub allow_reload: Option<bool>,

    /// Syntax used when neither the options nor the extension decide
    #[serde(default)]
    pub default_syntax: Syntax,

    /// Maximum number of instantiated precompiled units kept in memory
    #[serde(default = "default_unit_cache_capacity")]
    pub unit_cache_capacity: usize,

    /// Render an empty template in every syntax on start
    #[serde(default = "default_true")]
    pub warm_up: bool,

    /// Write generated code for file templates below the work directory
    #[serde(default = "default_true")]
    pub write_artifacts: bool,
}

fn default_template_root() -> PathBuf {
    PathBuf::from("templates")
}

fn default_unit_cache_capacity() -> usize {
    256
}

fn default_true() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template_root: default_template_root(),
            tmp_dir: std::env::temp_dir(),
            production: false,
            allow_reload: None,
            default_syntax: Syntax::default(),
            unit_cache_capacity: default_unit_cache_capacity(),
            warm_up: true,
            write_artifacts: true,
        }
    }
}

impl RenderConfig {
    /// Load configuration from a YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory generated code is written to and read back from
    pub fn work_dir(&self) -> PathBuf {
        self.tmp_dir.join(WORK_DIR_NAME)
    }

    /// Whether the file engine re-checks sources before reusing a unit
    pub fn reload_enabled(&self) -> bool {
        self.allow_reload.unwrap_or(!self.production)
    }

    pub fn with_template_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.template_root = root.into();
        self
    }

    pub fn with_tmp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = dir.into();
        self
    }

    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }
}
