//! Error formatters installed by the extension.
//!
//! The table is the fill crate's built-in set with one change: the `default`
//! formatter renders a bare `<span class="error-message">` without the
//! trailing line break, so a placeholder on its own line keeps the layout of
//! the surrounding form.

use formfill_html::{escape_html, FormatterRegistry, DEFAULT_FORMATTER};
use once_cell::sync::Lazy;

static FORMATTERS: Lazy<FormatterRegistry> = Lazy::new(|| {
    let mut formatters = FormatterRegistry::builtin();
    formatters.insert(DEFAULT_FORMATTER, error_message);
    formatters
});

/// Escapes `error` and wraps it in a span with class `error-message`.
pub fn error_message(error: &str) -> String {
    format!("<span class=\"error-message\">{}</span>", escape_html(error))
}

/// The formatter table a fresh configuration starts with.
pub fn default_formatters() -> FormatterRegistry {
    FORMATTERS.clone()
}
