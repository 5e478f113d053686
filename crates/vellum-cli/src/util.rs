//! Shared helpers for CLI commands

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use walkdir::WalkDir;

use vellum_core::{RenderConfig, Syntax, TemplateIdentifier};
use vellum_engine::{GENERATED_DIR, GENERATED_EXTENSION, UnitRegistry};

use crate::error::{CliError, Result};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "vellum.yaml";

/// Command line overrides of the loaded configuration
#[derive(Debug, Default)]
pub struct ConfigOverrides<'a> {
    pub config: Option<&'a Path>,
    pub root: Option<&'a Path>,
    pub tmp_dir: Option<&'a Path>,
    pub production: bool,
}

/// Load `vellum.yaml` (or the given file) and apply command line overrides
pub fn load_config(overrides: &ConfigOverrides<'_>) -> Result<RenderConfig> {
    let mut config = match overrides.config {
        Some(path) => RenderConfig::load_from(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            RenderConfig::load_from(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => RenderConfig::default(),
    };

    if let Some(root) = overrides.root {
        config.template_root = root.to_path_buf();
    }
    if let Some(tmp_dir) = overrides.tmp_dir {
        config.tmp_dir = tmp_dir.to_path_buf();
    }
    if overrides.production {
        config.production = true;
    }
    Ok(config)
}

/// A template file found below a root directory
#[derive(Debug, Clone)]
pub struct TemplateFile {
    pub identifier: TemplateIdentifier,
    pub path: PathBuf,
    pub syntax: Syntax,
}

/// Every file below `root` with a template extension, sorted by identifier
pub fn collect_templates(root: &Path) -> Result<Vec<TemplateFile>> {
    if !root.is_dir() {
        return Err(CliError::input_with_help(
            format!("template root {} is not a directory", root.display()),
            "pass --root or set templateRoot in vellum.yaml",
        ));
    }

    let mut templates = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let identifier = TemplateIdentifier::new(relative.to_string_lossy())?;
        let Some(syntax) = identifier.syntax() else {
            tracing::debug!(file = %entry.path().display(), "skipping non-template file");
            continue;
        };

        templates.push(TemplateFile {
            identifier,
            path: entry.path().to_path_buf(),
            syntax,
        });
    }

    templates.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    Ok(templates)
}

/// Register the generated code written by `vellum precompile --out <dir>`
pub fn load_units(dir: &Path) -> Result<UnitRegistry> {
    let src = dir.join(GENERATED_DIR);
    let suffix = format!(".{}", GENERATED_EXTENSION);
    if !src.is_dir() {
        return Err(CliError::input_with_help(
            format!("{} holds no generated code", dir.display()),
            "create it with `vellum precompile --out <dir>`",
        ));
    }

    let mut registry = UnitRegistry::new();
    for entry in WalkDir::new(&src) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&src) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        let Some(identifier) = relative.strip_suffix(&suffix) else {
            continue;
        };

        let syntax = TemplateIdentifier::new(identifier)?.syntax().unwrap_or_default();
        let code = std::fs::read_to_string(entry.path())?;
        let name = registry.register_generated(identifier, syntax, code)?;
        tracing::debug!(unit = %name, "loaded precompiled unit");
    }

    Ok(registry)
}

/// Split a `key=value` argument
pub fn split_pair(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(CliError::input_with_help(
            format!("expected key=value, got `{}`", arg),
            "for example: --set user.name=Ada",
        )),
    }
}

/// Parse `--set` arguments into template attributes
///
/// Values are read as JSON when they parse as JSON and as plain strings
/// otherwise. Dotted keys build nested objects: `user.name=Ada` binds `user`
/// to `{"name": "Ada"}`.
pub fn parse_set_values(args: &[String]) -> Result<IndexMap<String, JsonValue>> {
    let mut attributes: IndexMap<String, JsonValue> = IndexMap::new();

    for arg in args {
        let (key, raw) = split_pair(arg)?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()));

        let mut segments = key.split('.');
        let Some(top) = segments.next() else {
            continue;
        };
        let rest: Vec<&str> = segments.collect();
        if rest.is_empty() {
            attributes.insert(top.to_string(), value);
            continue;
        }

        let slot = attributes
            .entry(top.to_string())
            .or_insert_with(|| JsonValue::Object(Map::new()));
        insert_path(slot, &rest, value);
    }

    Ok(attributes)
}

fn insert_path(target: &mut JsonValue, path: &[&str], value: JsonValue) {
    let Some((first, rest)) = path.split_first() else {
        *target = value;
        return;
    };

    if !target.is_object() {
        *target = JsonValue::Object(Map::new());
    }
    if let JsonValue::Object(map) = target {
        let child = map.entry(first.to_string()).or_insert(JsonValue::Null);
        insert_path(child, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_set_values() {
        let args = vec![
            "name=Ada".to_string(),
            "count=3".to_string(),
            "tags=[\"a\",\"b\"]".to_string(),
            "user.name=Grace".to_string(),
            "user.address.city=Paris".to_string(),
        ];
        let values = parse_set_values(&args).unwrap();

        assert_eq!(values["name"], json!("Ada"));
        assert_eq!(values["count"], json!(3));
        assert_eq!(values["tags"], json!(["a", "b"]));
        assert_eq!(values["user"], json!({"name": "Grace", "address": {"city": "Paris"}}));
    }

    #[test]
    fn test_later_values_override() {
        let args = vec!["a.b=1".to_string(), "a=2".to_string(), "a.c=3".to_string()];
        let values = parse_set_values(&args).unwrap();
        assert_eq!(values["a"], json!({"c": 3}));
    }

    #[test]
    fn test_split_pair_rejects_missing_equals() {
        assert!(split_pair("novalue").is_err());
        assert!(split_pair("=x").is_err());
        assert_eq!(split_pair("k=a=b").unwrap(), ("k", "a=b"));
    }

    #[test]
    fn test_collect_templates_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app")).unwrap();
        std::fs::write(dir.path().join("app/B.ssp"), "").unwrap();
        std::fs::write(dir.path().join("app/A.jade"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let templates = collect_templates(dir.path()).unwrap();
        let ids: Vec<&str> = templates.iter().map(|t| t.identifier.as_str()).collect();
        assert_eq!(ids, ["app/A.jade", "app/B.ssp"]);
        assert_eq!(templates[0].syntax, Syntax::Jade);
    }

    #[test]
    fn test_load_units() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/app")).unwrap();
        std::fs::write(dir.path().join("src/app/Index.ssp.j2"), "hi").unwrap();
        std::fs::write(dir.path().join("units.rs"), "").unwrap();

        let registry = load_units(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
        let unit = registry.instantiate("app.$_vellum_$.Index_ssp").unwrap();
        assert_eq!(unit.code(), "hi");
        assert_eq!(unit.syntax(), Syntax::Ssp);
    }
}
