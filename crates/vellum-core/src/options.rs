//! Per-render options

use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::format::{DateFormat, FixedNumberFormat, NumberFormat, PatternDateFormat};
use crate::syntax::Syntax;

/// Overrides for a single render call
///
/// Every field is optional: a missing syntax is inferred from the template
/// identifier, missing formatters fall back to the request locale's defaults.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    syntax: Option<Syntax>,
    date: Option<Arc<dyn DateFormat>>,
    number: Option<Arc<dyn NumberFormat>>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` style options
    ///
    /// Recognised keys are `type` (a syntax name), `date` (a strftime pattern)
    /// and `number` (a count of fraction digits). Other keys are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "type" => options.syntax = Some(value.parse()?),
                "date" => options.date = Some(Arc::new(PatternDateFormat::new(value)?)),
                "number" => {
                    let digits = value.trim().parse::<usize>().map_err(|e| CoreError::InvalidOption {
                        key: key.to_string(),
                        message: format!("expected a number of fraction digits: {}", e),
                    })?;
                    options.number = Some(Arc::new(FixedNumberFormat::new(digits)));
                }
                other => tracing::debug!(option = other, "ignoring unrecognised render option"),
            }
        }
        Ok(options)
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    pub fn with_date_format(mut self, format: impl DateFormat + 'static) -> Self {
        self.date = Some(Arc::new(format));
        self
    }

    pub fn with_number_format(mut self, format: impl NumberFormat + 'static) -> Self {
        self.number = Some(Arc::new(format));
        self
    }

    pub fn syntax(&self) -> Option<Syntax> {
        self.syntax
    }

    pub fn date_format(&self) -> Option<&Arc<dyn DateFormat>> {
        self.date.as_ref()
    }

    pub fn number_format(&self) -> Option<&Arc<dyn NumberFormat>> {
        self.number.as_ref()
    }
}
