//! Precompile command - write generated code and a Rust registration module
//!
//! The output directory mirrors the work directory layout:
//!
//! ```text
//! <out>/
//!   src/app/Index.jade.j2
//!   units.rs
//! ```
//!
//! `units.rs` registers every unit with `include_str!`, so an application can
//! `include!` it and call `register(&mut registry)` at startup.

use std::fs;
use std::path::Path;

use vellum_core::{Syntax, TemplateIdentifier};
use vellum_engine::{EngineManager, GENERATED_DIR, GENERATED_EXTENSION, RenderError, artifact_path};

use crate::display::{CompileReport, header, success};
use crate::error::{CliError, Result};
use crate::util::{ConfigOverrides, collect_templates, load_config};

/// File name of the generated registration module
pub const UNITS_MODULE: &str = "units.rs";

pub fn run(overrides: &ConfigOverrides<'_>, out: &Path) -> Result<()> {
    let config = load_config(overrides)?;
    header(&format!(
        "Precompiling templates in {} to {}",
        config.template_root.display(),
        out.display()
    ));

    let templates = collect_templates(&config.template_root)?;
    let manager = EngineManager::new(&config);
    let engine = manager.string_engine();

    let mut report = CompileReport::new();
    let mut units = Vec::with_capacity(templates.len());
    for template in &templates {
        let compiled = fs::read_to_string(&template.path)
            .map_err(RenderError::from)
            .and_then(|source| engine.compile(&template.identifier, template.syntax, &source));

        match compiled {
            Ok(unit) => {
                let path = artifact_path(out, &template.identifier);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, unit.generated())?;
                tracing::debug!(path = %path.display(), "wrote generated code");

                units.push((template.identifier.clone(), template.syntax));
                report.ok(template.identifier.as_str());
            }
            Err(err) => report.fail(template.identifier.as_str(), err),
        }
    }

    report.display();
    if report.has_errors() {
        return Err(CliError::check_failed(report.failures.len(), report.total()));
    }

    fs::create_dir_all(out)?;
    fs::write(out.join(UNITS_MODULE), registration_module(&units))?;
    success(&format!(
        "Wrote {} unit(s) and {}",
        units.len(),
        out.join(UNITS_MODULE).display()
    ));
    Ok(())
}

/// Rust source registering `units` with a `UnitRegistry`
pub fn registration_module(units: &[(TemplateIdentifier, Syntax)]) -> String {
    let mut module = String::from(
        "// Generated by `vellum precompile`. Do not edit.\n\
         \n\
         pub fn register(\n    \
         registry: &mut vellum_engine::UnitRegistry,\n\
         ) -> Result<(), vellum_engine::RenderError> {\n",
    );

    for (identifier, syntax) in units {
        let include = format!("{}/{}.{}", GENERATED_DIR, identifier, GENERATED_EXTENSION);
        module.push_str(&format!(
            "    registry.register_generated(\n        {:?},\n        vellum_core::Syntax::{:?},\n        include_str!({:?}),\n    )?;\n",
            identifier.as_str(),
            syntax,
            include
        ));
    }

    module.push_str("    Ok(())\n}\n");
    module
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_module() {
        let units = vec![
            (TemplateIdentifier::new("app/Index.jade").unwrap(), Syntax::Jade),
            (TemplateIdentifier::new("mail/Welcome.mustache").unwrap(), Syntax::Mustache),
        ];

        insta::assert_snapshot!(registration_module(&units), @r#"
        // Generated by `vellum precompile`. Do not edit.

        pub fn register(
            registry: &mut vellum_engine::UnitRegistry,
        ) -> Result<(), vellum_engine::RenderError> {
            registry.register_generated(
                "app/Index.jade",
                vellum_core::Syntax::Jade,
                include_str!("src/app/Index.jade.j2"),
            )?;
            registry.register_generated(
                "mail/Welcome.mustache",
                vellum_core::Syntax::Mustache,
                include_str!("src/mail/Welcome.mustache.j2"),
            )?;
            Ok(())
        }
        "#);
    }

    #[test]
    fn test_empty_registration_module() {
        let module = registration_module(&[]);
        assert!(module.contains("pub fn register("));
        assert!(module.ends_with("    Ok(())\n}\n"));
    }
}
