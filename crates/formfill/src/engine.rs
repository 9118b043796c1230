//! Template engine with `formfill` support.
//!
//! [`FormFillEngine`] owns a MiniJinja environment with the extension
//! registered, and expands `formfill` blocks in every template it compiles:
//! inline templates, named templates and files served from template
//! directories (so `{% include %}` and `{% extends %}` see expanded sources).

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use minijinja::{Environment, Error, ErrorKind, Value};
use serde::Serialize;

use crate::config::FormFillConfig;
use crate::error::FormFillError;
use crate::extension::FormFillExtension;
use crate::tag::expand_tags;

/// A template engine that can render templates with data.
pub trait TemplateEngine: Send + Sync {
    /// Compiles and renders a template string in one step.
    fn render_template(&self, template: &str, data: &serde_json::Value) -> Result<String, FormFillError>;

    /// Adds a named template for later use via [`render_named`](Self::render_named).
    fn add_template(&mut self, name: &str, source: &str) -> Result<(), FormFillError>;

    /// Renders a previously registered template.
    fn render_named(&self, name: &str, data: &serde_json::Value) -> Result<String, FormFillError>;

    /// Checks if a template with the given name exists.
    fn has_template(&self, name: &str) -> bool;

    /// Renders a template with additional context values merged in.
    ///
    /// The `context` values are merged with the serialized `data`. If there are
    /// key conflicts, `data` takes precedence.
    fn render_with_context(
        &self,
        template: &str,
        data: &serde_json::Value,
        context: HashMap<String, serde_json::Value>,
    ) -> Result<String, FormFillError>;
}

/// MiniJinja engine with the `formfill` tag installed.
///
/// # Example
///
/// ```rust
/// use formfill::{FormFillEngine, TemplateEngine};
/// use serde_json::json;
///
/// let engine = FormFillEngine::new();
/// let output = engine
///     .render_template(
///         "{% formfill defaults with errors %}<input name=\"u\"/><form:error name=\"u\">{% endformfill %}",
///         &json!({"defaults": {"u": "john"}, "errors": {"u": "Invalid"}}),
///     )
///     .unwrap();
///
/// assert_eq!(
///     output,
///     "<input name=\"u\" class=\"error\" value=\"john\" /><span class=\"error-message\">Invalid</span>"
/// );
/// ```
pub struct FormFillEngine {
    env: Environment<'static>,
    extension: FormFillExtension,
    template_dirs: Vec<PathBuf>,
}

impl FormFillEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FormFillConfig::default())
    }

    pub fn with_config(config: FormFillConfig) -> Self {
        let extension = FormFillExtension::new(config);
        let mut env = Environment::new();
        extension.register(&mut env);
        Self {
            env,
            extension,
            template_dirs: Vec::new(),
        }
    }

    /// The configuration shared by every render.
    pub fn config(&self) -> &FormFillConfig {
        self.extension.config()
    }

    pub fn extension(&self) -> &FormFillExtension {
        &self.extension
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// Templates added directly through the environment are not expanded;
    /// pass their source through [`FormFillExtension::expand`] first.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Serves templates from `path`, expanding `formfill` blocks as they load.
    ///
    /// Directories are searched in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns [`FormFillError::Io`] if `path` is not a directory.
    pub fn add_template_dir<P: AsRef<Path>>(&mut self, path: P) -> Result<(), FormFillError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("template directory not found: {}", path.display()),
            )
            .into());
        }
        self.template_dirs.push(path.to_path_buf());
        tracing::debug!(dir = %path.display(), "added template directory");

        let loaders: Vec<_> = self
            .template_dirs
            .iter()
            .map(|dir| minijinja::path_loader(dir.clone()))
            .collect();
        self.env.set_loader(move |name| {
            for loader in &loaders {
                if let Some(source) = loader(name)? {
                    let expanded = expand_tags(&source).map_err(|err| {
                        Error::new(ErrorKind::SyntaxError, format!("{} (in {})", err, name))
                            .with_source(err)
                    })?;
                    return Ok(Some(expanded));
                }
            }
            Ok(None)
        });
        Ok(())
    }

    /// Renders a template with any serializable context.
    pub fn render_serialize<S: Serialize>(&self, template: &str, ctx: S) -> Result<String, FormFillError> {
        let source = expand_tags(template)?;
        Ok(self.env.render_str(&source, Value::from_serialize(ctx))?)
    }
}

impl Default for FormFillEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for FormFillEngine {
    fn render_template(&self, template: &str, data: &serde_json::Value) -> Result<String, FormFillError> {
        self.render_serialize(template, data)
    }

    fn add_template(&mut self, name: &str, source: &str) -> Result<(), FormFillError> {
        let source = expand_tags(source)?;
        self.env.add_template_owned(name.to_string(), source)?;
        tracing::debug!(name, "added template");
        Ok(())
    }

    fn render_named(&self, name: &str, data: &serde_json::Value) -> Result<String, FormFillError> {
        let tmpl = self.env.get_template(name)?;
        Ok(tmpl.render(Value::from_serialize(data))?)
    }

    fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    fn render_with_context(
        &self,
        template: &str,
        data: &serde_json::Value,
        context: HashMap<String, serde_json::Value>,
    ) -> Result<String, FormFillError> {
        let mut combined: HashMap<String, Value> = context
            .into_iter()
            .map(|(key, value)| (key, Value::from_serialize(&value)))
            .collect();
        if let serde_json::Value::Object(map) = data {
            for (key, value) in map {
                combined.insert(key.clone(), Value::from_serialize(value));
            }
        }
        self.render_serialize(template, &combined)
    }
}

/// Renders `template` once with a throwaway engine.
///
/// ```rust
/// use formfill::{render, FormFillConfig};
///
/// let config = FormFillConfig::new().with_formatter("plain", |e: &str| e.to_uppercase());
/// let output = render(
///     "{% formfill {} with {'q': 'empty'} %}<form:error name=\"q\" format=\"plain\">{% endformfill %}",
///     &serde_json::json!({}),
///     config,
/// )
/// .unwrap();
/// assert_eq!(output, "EMPTY");
/// ```
pub fn render<S: Serialize>(template: &str, data: &S, config: FormFillConfig) -> Result<String, FormFillError> {
    FormFillEngine::with_config(config).render_serialize(template, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_plain_templates() {
        let engine = FormFillEngine::new();
        let output = engine
            .render_template("Hello, {{ name }}!", &json!({"name": "World"}))
            .unwrap();
        assert_eq!(output, "Hello, World!");
    }

    #[test]
    fn named_template_is_expanded() {
        let mut engine = FormFillEngine::new();
        engine
            .add_template("form", "{% formfill d %}<input name=\"a\">{% endformfill %}")
            .unwrap();
        assert!(engine.has_template("form"));
        let output = engine.render_named("form", &json!({"d": {"a": "z"}})).unwrap();
        assert_eq!(output, "<input name=\"a\" value=\"z\">");
    }

    #[test]
    fn add_template_syntax_error() {
        let mut engine = FormFillEngine::new();
        let err = engine
            .add_template("bad", "{% formfill %}{% endformfill %}")
            .unwrap_err();
        assert!(matches!(err, FormFillError::Syntax(_)));
        assert!(!engine.has_template("bad"));
    }

    #[test]
    fn render_named_missing() {
        let engine = FormFillEngine::new();
        let err = engine.render_named("nope", &json!({})).unwrap_err();
        assert!(matches!(err, FormFillError::TemplateNotFound(_)));
    }

    #[test]
    fn context_merge_prefers_data() {
        let engine = FormFillEngine::new();
        let mut context = HashMap::new();
        context.insert("d".to_string(), json!({"a": "context"}));
        context.insert("e".to_string(), json!({"a": "bad"}));
        let output = engine
            .render_with_context(
                "{% formfill d with e %}<input name=\"a\">{% endformfill %}",
                &json!({"d": {"a": "data"}}),
                context,
            )
            .unwrap();
        assert_eq!(
            output,
            "<span class=\"error-message\">bad</span><input name=\"a\" class=\"error\" value=\"data\">"
        );
    }

    #[test]
    fn missing_template_dir() {
        let mut engine = FormFillEngine::new();
        let err = engine.add_template_dir("/definitely/not/here").unwrap_err();
        assert!(matches!(err, FormFillError::Io(_)));
    }

    #[test]
    fn config_is_shared() {
        let engine = FormFillEngine::with_config(
            FormFillConfig::new().with_options(formfill_html::FillOptions::new().error_class("bad")),
        );
        assert_eq!(engine.config().options().error_class, "bad");
        assert_eq!(engine.extension().config().options().error_class, "bad");
    }
}
