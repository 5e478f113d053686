//! Check command - compile every template and report all syntax errors

use vellum_engine::{EngineManager, RenderError};

use crate::display::{CompileReport, header};
use crate::error::{CliError, Result};
use crate::util::{ConfigOverrides, collect_templates, load_config};

pub fn run(overrides: &ConfigOverrides<'_>) -> Result<()> {
    let config = load_config(overrides)?;
    header(&format!(
        "Checking templates in {}",
        config.template_root.display()
    ));

    let templates = collect_templates(&config.template_root)?;
    let manager = EngineManager::new(&config);
    let engine = manager.string_engine();

    let mut report = CompileReport::new();
    for template in &templates {
        let compiled = std::fs::read_to_string(&template.path)
            .map_err(RenderError::from)
            .and_then(|source| engine.compile(&template.identifier, template.syntax, &source));
        match compiled {
            Ok(_) => report.ok(template.identifier.as_str()),
            Err(err) => report.fail(template.identifier.as_str(), err),
        }
    }

    report.display();
    if report.has_errors() {
        return Err(CliError::check_failed(report.failures.len(), report.total()));
    }
    Ok(())
}
