use thiserror::Error;

/// Errors raised while filling a form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FillError {
    /// A placeholder or the auto-insert option names a formatter that is not registered.
    #[error("no error formatter named '{0}'")]
    UnknownFormatter(String),

    /// An `<input>` has a type the filler does not understand.
    #[error("input field '{name}' has unknown type '{input_type}'")]
    UnknownInputType { name: String, input_type: String },

    /// Keys that matched no field while `use_all_keys` was set.
    #[error("keys not used by any form field: {}", .0.join(", "))]
    UnusedKeys(Vec<String>),
}
