//! The `formfill` extension: filter registration and render-time filling.
//!
//! [`FormFillExtension::register`] installs the [`FILTER_NAME`] filter that
//! expanded `formfill` blocks call. At render time the filter:
//!
//! 1. resolves `defaults` and `errors`, either from an evaluated expression
//!    (`defaults=(...)`) or from a context reference (`defaults_ref="name"`)
//!    looked up in the active context;
//! 2. substitutes an empty mapping for undefined values;
//! 3. rejects anything that is not a mapping with an [`ArgumentTypeError`];
//! 4. fills the rendered body and returns it as a safe string.

use std::sync::Arc;

use formfill_html::{fill, FieldMap};
use minijinja::value::{Kwargs, ValueKind};
use minijinja::{Environment, Error, ErrorKind, State, Value};

use crate::config::FormFillConfig;
use crate::error::{ArgumentTypeError, FormFillError};
use crate::tag::{expand_tags, FILTER_NAME};

/// Name lookup in the context a block renders in.
pub trait ContextLookup {
    /// Returns the value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl ContextLookup for State<'_, '_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        State::lookup(self, name)
    }
}

/// Installs form filling into a MiniJinja environment.
///
/// # Example
///
/// ```rust
/// use formfill::{FormFillConfig, FormFillExtension};
/// use minijinja::{context, Environment};
///
/// let extension = FormFillExtension::new(FormFillConfig::new());
/// let mut env = Environment::new();
/// extension.register(&mut env);
///
/// let source = extension
///     .expand("{% formfill {'q': 'rust'} %}<input name=\"q\">{% endformfill %}")
///     .unwrap();
/// let output = env.render_str(&source, context! {}).unwrap();
/// assert_eq!(output, "<input name=\"q\" value=\"rust\">");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormFillExtension {
    config: Arc<FormFillConfig>,
}

impl FormFillExtension {
    pub fn new(config: FormFillConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The configuration every render reads.
    pub fn config(&self) -> &FormFillConfig {
        &self.config
    }

    /// Registers the fill filter with `env`.
    pub fn register(&self, env: &mut Environment<'static>) {
        let config = Arc::clone(&self.config);
        env.add_filter(
            FILTER_NAME,
            move |state: &State, body: String, kwargs: Kwargs| -> Result<Value, Error> {
                fill_block(state, &body, &kwargs, &config)
            },
        );
    }

    /// Rewrites `formfill` blocks in a template source.
    pub fn expand(&self, source: &str) -> Result<String, FormFillError> {
        Ok(expand_tags(source)?)
    }
}

/// Fills one rendered block body.
pub(crate) fn fill_block(
    context: &dyn ContextLookup,
    body: &str,
    kwargs: &Kwargs,
    config: &FormFillConfig,
) -> Result<Value, Error> {
    let defaults = resolve_argument(context, kwargs, "defaults")?;
    let errors = resolve_argument(context, kwargs, "errors")?;
    kwargs.assert_all_used()?;

    let defaults = field_map(&defaults, "defaults")?;
    let errors = field_map(&errors, "errors")?;

    let output = fill(
        body,
        &defaults,
        &errors,
        config.formatters(),
        config.options(),
    )
    .map_err(|err| Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err))?;

    Ok(Value::from_safe_string(output))
}

/// Evaluated value of `argument`, or the context value it refers to.
///
/// `defaults` is required; a missing `errors` argument is undefined.
fn resolve_argument(
    context: &dyn ContextLookup,
    kwargs: &Kwargs,
    argument: &'static str,
) -> Result<Value, Error> {
    let reference = format!("{}_ref", argument);
    if kwargs.has(&reference) {
        let name: String = kwargs.get(&reference)?;
        let value = context.lookup(&name).unwrap_or(Value::UNDEFINED);
        tracing::trace!(argument, name = %name, defined = !value.is_undefined(), "resolved context reference");
        return Ok(value);
    }
    if kwargs.has(argument) {
        return kwargs.get::<Value>(argument);
    }
    if argument == "errors" {
        return Ok(Value::UNDEFINED);
    }
    Err(Error::new(
        ErrorKind::MissingArgument,
        format!("missing argument '{}'", argument),
    ))
}

/// Converts a mapping value into a [`FieldMap`].
fn field_map(value: &Value, argument: &'static str) -> Result<FieldMap, Error> {
    let mut fields = FieldMap::new();
    if value.is_undefined() {
        return Ok(fields);
    }
    if value.kind() != ValueKind::Map {
        let err = ArgumentTypeError {
            argument,
            repr: format!("{:?}", value),
        };
        return Err(Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err));
    }

    for key in value.try_iter()? {
        let item = value.get_item(&key)?;
        let name = match key.as_str() {
            Some(name) => name.to_string(),
            None => key.to_string(),
        };
        if item.kind() == ValueKind::Seq {
            let values = item.try_iter()?.map(|v| field_value(&v)).collect::<Vec<_>>();
            fields.insert_many(name, values);
        } else {
            fields.insert(name, field_value(&item));
        }
    }
    Ok(fields)
}

fn field_value(value: &Value) -> String {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => String::new(),
        ValueKind::Bool if !value.is_true() => String::new(),
        _ => match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        },
    }
}
