//! Fill options.

use serde::{Deserialize, Serialize};

use crate::formatters::DEFAULT_FORMATTER;

/// Options controlling how a form is filled.
///
/// Every field has a default, so a partial YAML or JSON document is enough:
///
/// ```rust
/// use formfill_html::FillOptions;
///
/// let options: FillOptions = serde_json::from_str(r#"{"error_class": "fail"}"#).unwrap();
/// assert_eq!(options.error_class, "fail");
/// assert!(options.force_defaults);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FillOptions {
    /// Class appended to fields that have an error.
    pub error_class: String,

    /// Insert errors that have no `<form:error>` placeholder next to their field,
    /// or at the top of the output when no field has their name.
    pub auto_insert_errors: bool,

    /// Formatter used for automatically inserted errors.
    pub auto_error_formatter: String,

    /// Insert automatic errors before the field (`true`) or after it.
    pub prefix_error: bool,

    /// Clear values, `checked` and `selected` of fields missing from the defaults.
    pub force_defaults: bool,

    /// Leave password inputs untouched.
    pub skip_passwords: bool,

    /// A checkbox without a `value` attribute is checked when its name is present.
    pub checkbox_checked_if_present: bool,

    /// Treat unknown input types as text inputs instead of failing.
    pub text_as_default: bool,

    /// Fail when a defaults or errors key matches no field.
    pub use_all_keys: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            error_class: "error".to_string(),
            auto_insert_errors: true,
            auto_error_formatter: DEFAULT_FORMATTER.to_string(),
            prefix_error: true,
            force_defaults: true,
            skip_passwords: false,
            checkbox_checked_if_present: false,
            text_as_default: false,
            use_all_keys: false,
        }
    }
}

impl FillOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = class.into();
        self
    }

    pub fn auto_insert_errors(mut self, enabled: bool) -> Self {
        self.auto_insert_errors = enabled;
        self
    }

    pub fn auto_error_formatter(mut self, name: impl Into<String>) -> Self {
        self.auto_error_formatter = name.into();
        self
    }

    pub fn prefix_error(mut self, enabled: bool) -> Self {
        self.prefix_error = enabled;
        self
    }

    pub fn force_defaults(mut self, enabled: bool) -> Self {
        self.force_defaults = enabled;
        self
    }

    pub fn skip_passwords(mut self, enabled: bool) -> Self {
        self.skip_passwords = enabled;
        self
    }

    pub fn checkbox_checked_if_present(mut self, enabled: bool) -> Self {
        self.checkbox_checked_if_present = enabled;
        self
    }

    pub fn text_as_default(mut self, enabled: bool) -> Self {
        self.text_as_default = enabled;
        self
    }

    pub fn use_all_keys(mut self, enabled: bool) -> Self {
        self.use_all_keys = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = FillOptions::default();
        assert_eq!(options.error_class, "error");
        assert!(options.prefix_error);
        assert!(options.force_defaults);
        assert!(options.auto_insert_errors);
        assert_eq!(options.auto_error_formatter, "default");
    }

    #[test]
    fn partial_yaml() {
        let options: FillOptions =
            serde_yaml::from_str("auto_insert_errors: false\nskip_passwords: true\n").unwrap();
        assert!(!options.auto_insert_errors);
        assert!(options.skip_passwords);
        assert_eq!(options.error_class, "error");
    }

    #[test]
    fn unknown_option_rejected() {
        let result: Result<FillOptions, _> = serde_json::from_str(r#"{"errror_class": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn builder() {
        let options = FillOptions::new().error_class("invalid").force_defaults(false);
        assert_eq!(options.error_class, "invalid");
        assert!(!options.force_defaults);
    }
}
