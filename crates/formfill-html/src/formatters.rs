//! Error message formatters.
//!
//! A formatter turns the text of an error into the markup that replaces a
//! `<form:error>` placeholder. Placeholders pick one by name with their
//! `format` attribute, falling back to [`DEFAULT_FORMATTER`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::escape::escape_html;

/// Name of the formatter used when a placeholder does not ask for one.
pub const DEFAULT_FORMATTER: &str = "default";

/// A shareable error formatter.
pub type Formatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

static BUILTIN: Lazy<FormatterRegistry> = Lazy::new(|| {
    let mut registry = FormatterRegistry {
        formatters: HashMap::new(),
    };
    registry.insert(DEFAULT_FORMATTER, |error: &str| {
        format!(
            "<span class=\"error-message\">{}</span><br />\n",
            escape_html(error)
        )
    });
    registry.insert("none", |error: &str| error.to_string());
    registry.insert("escape", escape_html);
    registry.insert("escapenl", |error: &str| {
        escape_html(error).replace('\n', "<br />\n")
    });
    registry.insert("ignore", |_: &str| String::new());
    registry
});

/// Named error formatters.
///
/// The registry always holds a [`DEFAULT_FORMATTER`] entry: it can be
/// replaced but not removed. Cloning is cheap, formatters are shared.
///
/// # Example
///
/// ```rust
/// use formfill_html::FormatterRegistry;
///
/// let mut formatters = FormatterRegistry::builtin();
/// formatters.insert("list", |e: &str| format!("<ul><li>{}</li></ul>", e));
///
/// assert_eq!(formatters.format("list", "bad").as_deref(), Some("<ul><li>bad</li></ul>"));
/// assert_eq!(formatters.format("escape", "<b>").as_deref(), Some("&lt;b&gt;"));
/// ```
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Formatter>,
}

impl FormatterRegistry {
    /// The built-in formatters: `default`, `none`, `escape`, `escapenl` and `ignore`.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Adds or replaces a formatter.
    pub fn insert<F>(&mut self, name: impl Into<String>, formatter: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.formatters.insert(name.into(), Arc::new(formatter));
    }

    /// Removes a formatter. The default formatter is never removed.
    pub fn remove(&mut self, name: &str) -> Option<Formatter> {
        if name == DEFAULT_FORMATTER {
            return None;
        }
        self.formatters.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Formatter> {
        self.formatters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Formats `error` with the named formatter, if registered.
    pub fn format(&self, name: &str, error: &str) -> Option<String> {
        self.get(name).map(|formatter| formatter(error))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formatters.keys().map(String::as_str)
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("FormatterRegistry")
            .field("formatters", &names)
            .finish()
    }
}
