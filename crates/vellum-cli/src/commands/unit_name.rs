//! Unit-name command - print the precompiled unit name of identifiers

use vellum_core::TemplateIdentifier;

use crate::error::{CliError, Result};

pub fn run(identifiers: &[String]) -> Result<()> {
    for raw in identifiers {
        let identifier = TemplateIdentifier::new(raw)?;
        let Some(name) = identifier.unit_name() else {
            return Err(CliError::input_with_help(
                format!("`{}` has no precompiled unit name", identifier),
                "unit names are derived from `<path>/<name>.<extension>`",
            ));
        };
        println!("{}", name);
    }
    Ok(())
}
