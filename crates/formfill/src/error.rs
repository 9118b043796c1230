//! Error types for the `formfill` tag.
//!
//! [`FormFillError`] is returned by every public operation. Errors raised while
//! MiniJinja is rendering travel through [`minijinja::Error`]; the concrete
//! cause is attached as its source and recovered by the `From` conversion, so
//! callers can still match on [`FormFillError::Type`] or [`FormFillError::Fill`].

use formfill_html::FillError;
use thiserror::Error;

/// Error type for template expansion, configuration and rendering.
#[derive(Debug, Error)]
pub enum FormFillError {
    /// Malformed `formfill` tag usage, detected before compilation.
    #[error(transparent)]
    Syntax(#[from] TagSyntaxError),

    /// A `defaults` or `errors` argument is not a mapping.
    #[error(transparent)]
    Type(#[from] ArgumentTypeError),

    /// The form filler rejected the rendered body.
    #[error("form fill error: {0}")]
    Fill(#[from] FillError),

    /// Template syntax error or render failure reported by MiniJinja.
    #[error("template error: {0}")]
    Template(String),

    /// Template not found in the environment.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Invalid fill options.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (e.g. a missing template directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A `formfill` block that cannot be expanded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error on line {line}: {message}")]
pub struct TagSyntaxError {
    /// 1-based line of the offending tag.
    pub line: usize,
    pub message: String,
}

impl TagSyntaxError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A tag argument that resolved to something other than a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("argument '{argument}' should be a mapping, not {repr}")]
pub struct ArgumentTypeError {
    /// `defaults` or `errors`.
    pub argument: &'static str,
    /// Debug representation of the offending value.
    pub repr: String,
}

impl From<minijinja::Error> for FormFillError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            if let Some(type_err) = cause.downcast_ref::<ArgumentTypeError>() {
                return FormFillError::Type(type_err.clone());
            }
            if let Some(fill_err) = cause.downcast_ref::<FillError>() {
                return FormFillError::Fill(fill_err.clone());
            }
            if let Some(syntax_err) = cause.downcast_ref::<TagSyntaxError>() {
                return FormFillError::Syntax(syntax_err.clone());
            }
            source = cause.source();
        }

        match err.kind() {
            ErrorKind::TemplateNotFound => FormFillError::TemplateNotFound(err.to_string()),
            _ => FormFillError::Template(err.to_string()),
        }
    }
}
