//! HTML form filler.
//!
//! This crate rewrites rendered HTML forms: it fills `input`, `select` and
//! `textarea` elements with default values, marks fields that have errors with
//! an error class, and replaces `<form:error>` placeholders with formatted
//! error messages.
//!
//! # Example
//!
//! ```rust
//! use formfill_html::{fill, FieldMap, FillOptions, FormatterRegistry};
//!
//! let mut defaults = FieldMap::new();
//! defaults.insert("email", "robert153@usrobots.com");
//!
//! let mut errors = FieldMap::new();
//! errors.insert("username", "This name is invalid");
//!
//! let form = r#"<input type="text" name="username" />
//! <form:error name="username" format="escape">
//! <input type="email" name="email" />"#;
//!
//! let filled = fill(
//!     form,
//!     &defaults,
//!     &errors,
//!     &FormatterRegistry::builtin(),
//!     &FillOptions::default(),
//! ).unwrap();
//!
//! assert_eq!(filled, r#"<input type="text" name="username" class="error" value="" />
//! This name is invalid
//! <input type="email" name="email" value="robert153@usrobots.com" />"#);
//! ```
//!
//! # Placeholders
//!
//! | Markup | Effect |
//! |--------|--------|
//! | `<form:error name="f">` | Error for `f`, formatted with the `default` formatter |
//! | `<form:error name="f" format="escape">` | Same, with a named formatter |
//! | `<form:error>` | Every error not rendered by an earlier placeholder |
//! | `<form:iferror name="f">…</form:iferror>` | Content kept only if `f` has an error |
//! | `<form:iferror name="not f">…</form:iferror>` | Content kept only if `f` has no error |
//!
//! Fields carrying a `data-formencode-ignore` attribute are left as written.

mod error;
mod escape;
mod fields;
mod filler;
mod formatters;
mod options;
mod tokenizer;

pub use error::FillError;
pub use escape::escape_html;
pub use fields::FieldMap;
pub use filler::fill;
pub use formatters::{Formatter, FormatterRegistry, DEFAULT_FORMATTER};
pub use options::FillOptions;
