//! Extension configuration.
//!
//! A [`FormFillConfig`] pairs the [`FillOptions`] forwarded to the form filler
//! with the [`FormatterRegistry`] used for `<form:error>` placeholders. It is
//! assembled once at startup and then handed to
//! [`FormFillExtension`](crate::FormFillExtension), which shares it read-only
//! with every render.
//!
//! Options can come from code, from YAML or JSON, or be set one at a time by
//! name:
//!
//! ```rust
//! use formfill::FormFillConfig;
//!
//! let mut config = FormFillConfig::from_yaml("error_class: fail\n").unwrap();
//! config.set_option("auto_insert_errors", true).unwrap();
//!
//! assert_eq!(config.options().error_class, "fail");
//! assert!(config.options().auto_insert_errors);
//! assert!(config.set_option("no_such_option", 1).is_err());
//! ```

use formfill_html::{FillOptions, FormatterRegistry};
use serde::Serialize;

use crate::error::FormFillError;
use crate::formatters::default_formatters;

/// Fill options plus error formatters.
#[derive(Debug, Clone)]
pub struct FormFillConfig {
    options: FillOptions,
    formatters: FormatterRegistry,
}

impl FormFillConfig {
    /// Default options and the default formatter table.
    pub fn new() -> Self {
        Self {
            options: FillOptions::default(),
            formatters: default_formatters(),
        }
    }

    /// Replaces the fill options.
    pub fn with_options(mut self, options: FillOptions) -> Self {
        self.options = options;
        self
    }

    /// Adds or overrides a named formatter.
    pub fn with_formatter<F>(mut self, name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.formatters.insert(name, formatter);
        self
    }

    /// Parses fill options from YAML.
    pub fn from_yaml(source: &str) -> Result<Self, FormFillError> {
        let options = serde_yaml::from_str(source)
            .map_err(|e| FormFillError::Config(format!("invalid YAML options: {}", e)))?;
        Ok(Self::new().with_options(options))
    }

    /// Parses fill options from JSON.
    pub fn from_json(source: &str) -> Result<Self, FormFillError> {
        let options = serde_json::from_str(source)
            .map_err(|e| FormFillError::Config(format!("invalid JSON options: {}", e)))?;
        Ok(Self::new().with_options(options))
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut FillOptions {
        &mut self.options
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn formatters_mut(&mut self) -> &mut FormatterRegistry {
        &mut self.formatters
    }

    /// Sets a single option by its serialized name.
    ///
    /// # Errors
    ///
    /// Fails for unknown option names and for values of the wrong type. The
    /// options are left unchanged on failure.
    pub fn set_option<V: Serialize>(&mut self, name: &str, value: V) -> Result<(), FormFillError> {
        let mut current = serde_json::to_value(&self.options)
            .map_err(|e| FormFillError::Config(e.to_string()))?;
        let fields = current
            .as_object_mut()
            .ok_or_else(|| FormFillError::Config("options are not a mapping".to_string()))?;
        if !fields.contains_key(name) {
            return Err(FormFillError::Config(format!("unknown option '{}'", name)));
        }
        let value = serde_json::to_value(value)
            .map_err(|e| FormFillError::Config(format!("option '{}': {}", name, e)))?;
        fields.insert(name.to_string(), value);

        self.options = serde_json::from_value(current)
            .map_err(|e| FormFillError::Config(format!("option '{}': {}", name, e)))?;
        tracing::debug!(option = name, "fill option updated");
        Ok(())
    }
}

impl Default for FormFillConfig {
    fn default() -> Self {
        Self::new()
    }
}
