//! A `formfill` block tag for MiniJinja.
//!
//! `formfill` fills the HTML forms inside a block with default values and
//! error messages:
//!
//! ```jinja
//! {% formfill {'username': 'robert', 'email': 'robert153@usrobots.com'}
//!        with {'username': 'This name is invalid'} %}
//! <form action="/register" method="POST">
//!     <input type="text" name="username" />
//!     <form:error name="username">
//!     <input type="password" name="password" />
//!     <input type="email" name="email" />
//! </form>
//! {% endformfill %}
//! ```
//!
//! renders as
//!
//! ```html
//! <form action="/register" method="POST">
//!     <input type="text" name="username" class="error" value="robert" />
//!     <span class="error-message">This name is invalid</span>
//!     <input type="password" name="password" value="" />
//!     <input type="email" name="email" value="robert153@usrobots.com" />
//! </form>
//! ```
//!
//! # Syntax
//!
//! ```jinja
//! {% formfill <defaults> [with <errors>] %}
//!     body
//! {% endformfill %}
//! ```
//!
//! Both arguments must evaluate to mappings keyed by field name. A bare name
//! (`{% formfill defaults with errors %}`) is looked up in the context the
//! block renders in, and an unbound name counts as an empty mapping. Without
//! `with`, no field has an error.
//!
//! # Usage
//!
//! [`FormFillEngine`] is the quickest route:
//!
//! ```rust
//! use formfill::{FormFillEngine, TemplateEngine};
//! use serde_json::json;
//!
//! let engine = FormFillEngine::new();
//! let html = engine.render_template(
//!     "{% formfill form %}<textarea name=\"bio\"></textarea>{% endformfill %}",
//!     &json!({"form": {"bio": "Robots & people"}}),
//! ).unwrap();
//! assert_eq!(html, "<textarea name=\"bio\">Robots &amp; people</textarea>");
//! ```
//!
//! To use an existing environment, register a [`FormFillExtension`] and pass
//! template sources through [`FormFillExtension::expand`] before adding them.
//!
//! # Configuration
//!
//! [`FormFillConfig`] holds the [`FillOptions`] (error class, automatic error
//! insertion, and so on) and the named error formatters. The `default`
//! formatter escapes the message and wraps it in
//! `<span class="error-message">`; placeholders choose another with their
//! `format` attribute:
//!
//! ```rust
//! use formfill::{render, FormFillConfig, FillOptions};
//! use serde_json::json;
//!
//! let config = FormFillConfig::new()
//!     .with_options(FillOptions::new().error_class("fail"))
//!     .with_formatter("list", |e: &str| format!("<ul class=\"errors\"><li>{}</li></ul>", e));
//!
//! let html = render(
//!     "{% formfill {} with {'u': 'Taken'} %}<input name=\"u\"><form:error name=\"u\" format=\"list\">{% endformfill %}",
//!     &json!({}),
//!     config,
//! ).unwrap();
//! assert_eq!(html, "<input name=\"u\" class=\"fail\" value=\"\"><ul class=\"errors\"><li>Taken</li></ul>");
//! ```
//!
//! The configuration is fixed once the extension is built and every render
//! reads the same snapshot.

mod config;
mod engine;
mod error;
mod extension;
mod formatters;
pub mod tag;

pub use config::FormFillConfig;
pub use engine::{render, FormFillEngine, TemplateEngine};
pub use error::{ArgumentTypeError, FormFillError, TagSyntaxError};
pub use extension::{ContextLookup, FormFillExtension};
pub use formatters::{default_formatters, error_message};

pub use formfill_html::{FieldMap, FillError, FillOptions, FormatterRegistry};
