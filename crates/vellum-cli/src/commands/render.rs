//! Render command - render one template to stdout

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use vellum_core::{Action, Locale, RenderOptions, SimpleAction, Syntax};
use vellum_engine::Renderer;

use crate::error::{CliError, Result};
use crate::util::{ConfigOverrides, load_config, load_units, parse_set_values, split_pair};

/// Arguments of `vellum render`
#[derive(Debug)]
pub struct RenderArgs<'a> {
    pub identifier: Option<&'a str>,
    pub string: Option<&'a str>,
    pub syntax: Option<&'a str>,
    pub set: &'a [String],
    pub locale: Option<&'a str>,
    pub options: &'a [String],
    pub units: Option<&'a Path>,
    pub action: &'a str,
}

pub fn run(overrides: &ConfigOverrides<'_>, args: RenderArgs<'_>) -> Result<()> {
    let config = load_config(overrides)?;

    let mut action = SimpleAction::new(args.action);
    if let Some(tag) = args.locale {
        action = action.with_locale(Locale::parse(tag)?);
    }
    for (key, value) in parse_set_values(args.set)? {
        action.set_attribute(key, value);
    }
    let action: Arc<dyn Action> = Arc::new(action);

    let pairs = args
        .options
        .iter()
        .map(|option| split_pair(option))
        .collect::<Result<Vec<_>>>()?;
    let options = RenderOptions::from_pairs(pairs)?;

    let mut builder = Renderer::builder().config(config);
    if let Some(dir) = args.units {
        builder = builder.units(load_units(dir)?);
    }
    let renderer = builder.build();

    let output = match (args.string, args.identifier) {
        (Some(source), _) => {
            let syntax = match args.syntax {
                Some(name) => name.parse::<Syntax>()?,
                None => renderer.config().default_syntax,
            };
            renderer.render_string(source, syntax, &action, &options)?
        }
        (None, Some(identifier)) => renderer.render(identifier, &action, &options)?,
        (None, None) => {
            return Err(CliError::input_with_help(
                "nothing to render",
                "pass a template identifier or --string <SOURCE>",
            ));
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
