//! The form filling pass.
//!
//! A single walk over the token stream. Field tags are rewritten, placeholder
//! tags are replaced, everything else is copied verbatim from the input.

use std::collections::BTreeSet;

use crate::error::FillError;
use crate::escape::escape_html;
use crate::fields::FieldMap;
use crate::formatters::{FormatterRegistry, DEFAULT_FORMATTER};
use crate::options::FillOptions;
use crate::tokenizer::{Attribute, StartTag, Token, Tokenizer};

const IGNORE_ATTRIBUTE: &str = "data-formencode-ignore";

/// Fills the form fields found in `html`.
///
/// - `input`, `select` and `textarea` elements are matched by their `name`
///   attribute and receive their value from `defaults`.
/// - Fields named in `errors` get `options.error_class` added to `class`.
/// - `<form:error name="field" format="formatter">` is replaced by the
///   formatted error for `field`, or removed when there is none.
/// - `<form:iferror name="field">…</form:iferror>` keeps its content only when
///   `field` has an error (`name="not field"` inverts the test).
///
/// Attributes of rewritten tags are re-serialized with double quotes; new
/// attributes are appended, so an added `class` comes before an added `value`.
///
/// # Example
///
/// ```rust
/// use formfill_html::{fill, FieldMap, FillOptions, FormatterRegistry};
///
/// let defaults: FieldMap = [("u", "john")].into_iter().collect();
/// let errors: FieldMap = [("u", "Invalid")].into_iter().collect();
///
/// let html = fill(
///     r#"<input name="u"/><form:error name="u" format="escape">"#,
///     &defaults,
///     &errors,
///     &FormatterRegistry::builtin(),
///     &FillOptions::default(),
/// ).unwrap();
///
/// assert_eq!(html, r#"<input name="u" class="error" value="john" />Invalid"#);
/// ```
pub fn fill(
    html: &str,
    defaults: &FieldMap,
    errors: &FieldMap,
    formatters: &FormatterRegistry,
    options: &FillOptions,
) -> Result<String, FillError> {
    tracing::debug!(
        defaults = defaults.len(),
        errors = errors.len(),
        bytes = html.len(),
        "filling form"
    );
    Filler {
        defaults,
        errors,
        formatters,
        options,
        out: String::with_capacity(html.len() + 64),
        used: BTreeSet::new(),
        rendered_errors: BTreeSet::new(),
        markers: Vec::new(),
        select: None,
        textarea: None,
        pending_option: None,
        skip_textarea: false,
        iferror: Vec::new(),
    }
    .run(html)
}

/// How an `<input>` is filled, by its `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Text,
    Password,
    Checkbox,
    Radio,
    Button,
    Untouched,
    Unknown,
}

impl InputKind {
    fn from_type(input_type: &str) -> Self {
        match input_type {
            "text" | "hidden" | "search" | "email" | "url" | "tel" | "number" | "range"
            | "date" | "month" | "week" | "time" | "datetime" | "datetime-local" | "color" => {
                InputKind::Text
            }
            "password" => InputKind::Password,
            "checkbox" => InputKind::Checkbox,
            "radio" => InputKind::Radio,
            "submit" | "reset" | "button" => InputKind::Button,
            "file" | "image" => InputKind::Untouched,
            _ => InputKind::Unknown,
        }
    }
}

/// An `<option>` without a `value` attribute, held back until its text is known.
struct PendingOption {
    attrs: Vec<Attribute>,
    self_closing: bool,
    text: String,
}

struct Filler<'f> {
    defaults: &'f FieldMap,
    errors: &'f FieldMap,
    formatters: &'f FormatterRegistry,
    options: &'f FillOptions,
    out: String,
    /// Field and placeholder names seen so far.
    used: BTreeSet<String>,
    /// Errors already written by a placeholder.
    rendered_errors: BTreeSet<String>,
    /// Output offsets where automatic errors may be inserted.
    markers: Vec<(usize, String)>,
    select: Option<String>,
    textarea: Option<String>,
    pending_option: Option<PendingOption>,
    skip_textarea: bool,
    /// One entry per open `<form:iferror>`: whether its content is shown.
    iferror: Vec<bool>,
}

impl Filler<'_> {
    fn run(mut self, html: &str) -> Result<String, FillError> {
        for token in Tokenizer::new(html) {
            if self.iferror.contains(&false) {
                self.skip(&token);
                continue;
            }

            if let Token::Text(text) = token {
                if self.skip_textarea {
                    continue;
                }
                match self.pending_option.as_mut() {
                    Some(option) => option.text.push_str(text),
                    None => self.out.push_str(text),
                }
                continue;
            }

            self.flush_option();

            match token {
                Token::StartTag(tag) => self.start_tag(tag)?,
                Token::EndTag { name, raw } => self.end_tag(&name, raw),
                Token::Other(raw) => self.out.push_str(raw),
                Token::Text(_) => unreachable!("text handled above"),
            }
        }
        self.flush_option();

        self.insert_auto_errors()?;
        self.check_unused_keys()?;
        Ok(self.out)
    }

    /// Inside a hidden `<form:iferror>` only nesting is tracked.
    fn skip(&mut self, token: &Token<'_>) {
        match token {
            Token::StartTag(tag) if tag.name == "form:iferror" => self.iferror.push(true),
            Token::EndTag { name, .. } if name == "form:iferror" => {
                self.iferror.pop();
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: StartTag<'_>) -> Result<(), FillError> {
        let is_field = matches!(tag.name.as_str(), "input" | "select" | "textarea" | "option");
        if is_field && tag.has_attr(IGNORE_ATTRIBUTE) {
            if tag.name == "select" {
                self.select = None;
            }
            self.out.push_str(tag.raw);
            return Ok(());
        }

        match tag.name.as_str() {
            "input" => self.input(tag)?,
            "textarea" => self.textarea(tag),
            "select" => self.select(tag),
            "option" if self.select.is_some() => self.option(tag),
            "form:error" => self.error_placeholder(&tag)?,
            "form:iferror" => self.iferror(&tag),
            _ => self.out.push_str(tag.raw),
        }
        Ok(())
    }

    fn end_tag(&mut self, name: &str, raw: &str) {
        match name {
            "form:iferror" => {
                self.iferror.pop();
            }
            "form:error" => {}
            "textarea" => {
                self.skip_textarea = false;
                self.out.push_str(raw);
                if let Some(field) = self.textarea.take() {
                    self.mark_after(&field);
                }
            }
            "select" => {
                self.out.push_str(raw);
                if let Some(field) = self.select.take() {
                    self.mark_after(&field);
                }
            }
            _ => self.out.push_str(raw),
        }
    }

    fn input(&mut self, tag: StartTag<'_>) -> Result<(), FillError> {
        let Some(name) = tag.attr("name").map(str::to_string) else {
            self.out.push_str(tag.raw);
            return Ok(());
        };
        let input_type = tag.attr("type").unwrap_or("text").to_ascii_lowercase();
        let mut kind = InputKind::from_type(&input_type);

        if kind == InputKind::Unknown {
            if !self.options.text_as_default {
                return Err(FillError::UnknownInputType { name, input_type });
            }
            kind = InputKind::Text;
        }
        if kind == InputKind::Password && self.options.skip_passwords {
            self.out.push_str(tag.raw);
            return Ok(());
        }

        self.used.insert(name.clone());
        self.mark_before(&name);

        let mut attrs = tag.attrs.clone();
        self.add_error_class(&name, &mut attrs);

        match kind {
            InputKind::Text | InputKind::Password => match self.defaults.first(&name) {
                Some(value) => set_attr(&mut attrs, "value", value),
                None if self.options.force_defaults => set_attr(&mut attrs, "value", ""),
                None => {}
            },
            InputKind::Checkbox => {
                let had_checked = tag.has_attr("checked");
                let checked = match tag.attr("value").filter(|v| !v.is_empty()) {
                    None if self.options.checkbox_checked_if_present => {
                        self.defaults.contains(&name)
                    }
                    None => self.defaults.first(&name).is_some_and(|v| !v.is_empty()),
                    Some(value) => {
                        self.defaults.contains_value(&name, value)
                            || (had_checked && !self.options.force_defaults)
                    }
                };
                if checked {
                    set_attr(&mut attrs, "checked", "checked");
                } else {
                    remove_attr(&mut attrs, "checked");
                }
            }
            InputKind::Radio => {
                let checked = tag
                    .attr("value")
                    .is_some_and(|v| self.defaults.first(&name) == Some(v));
                if checked {
                    set_attr(&mut attrs, "checked", "checked");
                } else if self.options.force_defaults {
                    remove_attr(&mut attrs, "checked");
                }
            }
            InputKind::Button => {
                if let Some(value) = self.defaults.first(&name) {
                    set_attr(&mut attrs, "value", value);
                }
            }
            InputKind::Untouched | InputKind::Unknown => {}
        }

        self.write_tag("input", &attrs, tag.self_closing);
        self.mark_after(&name);
        Ok(())
    }

    fn textarea(&mut self, tag: StartTag<'_>) {
        let Some(name) = tag.attr("name").map(str::to_string) else {
            self.out.push_str(tag.raw);
            return;
        };

        self.used.insert(name.clone());
        self.mark_before(&name);

        let mut attrs = tag.attrs.clone();
        self.add_error_class(&name, &mut attrs);
        self.write_tag("textarea", &attrs, tag.self_closing);

        if tag.self_closing {
            self.mark_after(&name);
            return;
        }

        match self.defaults.first(&name) {
            Some(value) => {
                self.out.push_str(&escape_html(value));
                self.skip_textarea = true;
            }
            None if self.options.force_defaults => self.skip_textarea = true,
            None => {}
        }
        self.textarea = Some(name);
    }

    fn select(&mut self, tag: StartTag<'_>) {
        let Some(name) = tag.attr("name").map(str::to_string) else {
            self.select = None;
            self.out.push_str(tag.raw);
            return;
        };

        self.used.insert(name.clone());
        self.mark_before(&name);

        let mut attrs = tag.attrs.clone();
        self.add_error_class(&name, &mut attrs);
        self.write_tag("select", &attrs, tag.self_closing);
        self.select = Some(name);
    }

    fn option(&mut self, tag: StartTag<'_>) {
        match tag.attr("value") {
            Some(value) => {
                let value = value.to_string();
                let mut attrs = tag.attrs.clone();
                self.select_option(&mut attrs, &value);
                self.write_tag("option", &attrs, tag.self_closing);
            }
            None => {
                self.pending_option = Some(PendingOption {
                    attrs: tag.attrs.clone(),
                    self_closing: tag.self_closing,
                    text: String::new(),
                });
            }
        }
    }

    fn flush_option(&mut self) {
        if let Some(mut option) = self.pending_option.take() {
            let value = option.text.trim().to_string();
            self.select_option(&mut option.attrs, &value);
            self.write_tag("option", &option.attrs, option.self_closing);
            self.out.push_str(&option.text);
        }
    }

    fn select_option(&self, attrs: &mut Vec<Attribute>, value: &str) {
        let Some(select) = self.select.as_deref() else {
            return;
        };
        if self.defaults.contains_value(select, value) {
            set_attr(attrs, "selected", "selected");
        } else if self.options.force_defaults {
            remove_attr(attrs, "selected");
        }
    }

    fn error_placeholder(&mut self, tag: &StartTag<'_>) -> Result<(), FillError> {
        let format = tag.attr("format").unwrap_or(DEFAULT_FORMATTER);

        match tag.attr("name") {
            Some(name) => {
                self.used.insert(name.to_string());
                if let Some(error) = self.errors.text(name) {
                    let formatted = self.format(format, &error)?;
                    self.out.push_str(&formatted);
                    self.rendered_errors.insert(name.to_string());
                }
            }
            None => {
                let pending: Vec<String> = self
                    .errors
                    .names()
                    .filter(|name| !self.rendered_errors.contains(*name))
                    .map(str::to_string)
                    .collect();
                for name in pending {
                    if let Some(error) = self.errors.text(&name) {
                        let formatted = self.format(format, &error)?;
                        self.out.push_str(&formatted);
                    }
                    self.rendered_errors.insert(name);
                }
            }
        }
        Ok(())
    }

    fn iferror(&mut self, tag: &StartTag<'_>) {
        let condition = tag.attr("name").unwrap_or("").trim();
        let (negated, name) = match condition.strip_prefix("not ") {
            Some(rest) => (true, rest.trim()),
            None => (false, condition),
        };
        let has_error = self.errors.contains(name);
        self.iferror.push(has_error != negated);
    }

    fn format(&self, formatter: &str, error: &str) -> Result<String, FillError> {
        self.formatters
            .format(formatter, error)
            .ok_or_else(|| FillError::UnknownFormatter(formatter.to_string()))
    }

    fn add_error_class(&self, name: &str, attrs: &mut Vec<Attribute>) {
        let class = self.options.error_class.as_str();
        if class.is_empty() || !self.errors.contains(name) {
            return;
        }
        match attrs.iter_mut().find(|a| a.name == "class") {
            Some(attr) => {
                let merged = match attr.value.as_deref() {
                    Some(existing) if !existing.trim().is_empty() => {
                        format!("{} {}", existing, class)
                    }
                    _ => class.to_string(),
                };
                attr.value = Some(merged);
            }
            None => attrs.push(Attribute {
                name: "class".to_string(),
                value: Some(class.to_string()),
            }),
        }
    }

    fn mark_before(&mut self, name: &str) {
        if self.options.auto_insert_errors && self.options.prefix_error {
            self.markers.push((self.out.len(), name.to_string()));
        }
    }

    fn mark_after(&mut self, name: &str) {
        if self.options.auto_insert_errors && !self.options.prefix_error {
            self.markers.push((self.out.len(), name.to_string()));
        }
    }

    fn insert_auto_errors(&mut self) -> Result<(), FillError> {
        if !self.options.auto_insert_errors {
            return Ok(());
        }

        let formatter = self.options.auto_error_formatter.as_str();
        let mut seen = BTreeSet::new();
        let mut inserts = Vec::new();

        for (position, name) in &self.markers {
            if self.rendered_errors.contains(name) || !seen.insert(name.as_str()) {
                continue;
            }
            if let Some(error) = self.errors.text(name) {
                inserts.push((*position, self.format(formatter, &error)?));
            }
        }

        // Errors without a field or placeholder go to the top of the output.
        let mut unplaced = String::new();
        for name in self.errors.names() {
            if self.rendered_errors.contains(name) || seen.contains(name) {
                continue;
            }
            if let Some(error) = self.errors.text(name) {
                unplaced.push_str(&self.format(formatter, &error)?);
            }
        }

        tracing::trace!(
            count = inserts.len(),
            unplaced = !unplaced.is_empty(),
            "inserting automatic error messages"
        );
        for (position, text) in inserts.into_iter().rev() {
            self.out.insert_str(position, &text);
        }
        self.out.insert_str(0, &unplaced);
        Ok(())
    }

    fn check_unused_keys(&self) -> Result<(), FillError> {
        if !self.options.use_all_keys {
            return Ok(());
        }
        let unused: BTreeSet<&str> = self
            .defaults
            .names()
            .chain(self.errors.names())
            .filter(|name| !self.used.contains(*name))
            .collect();
        if unused.is_empty() {
            Ok(())
        } else {
            Err(FillError::UnusedKeys(
                unused.into_iter().map(str::to_string).collect(),
            ))
        }
    }

    fn write_tag(&mut self, name: &str, attrs: &[Attribute], self_closing: bool) {
        self.out.push('<');
        self.out.push_str(name);
        for attr in attrs.iter().filter(|a| !a.name.starts_with("form:")) {
            self.out.push(' ');
            self.out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                self.out.push_str("=\"");
                self.out.push_str(&escape_html(value));
                self.out.push('"');
            }
        }
        if self_closing {
            self.out.push_str(" /");
        }
        self.out.push('>');
    }
}

fn set_attr(attrs: &mut Vec<Attribute>, name: &str, value: &str) {
    match attrs.iter_mut().find(|a| a.name == name) {
        Some(attr) => attr.value = Some(value.to_string()),
        None => attrs.push(Attribute {
            name: name.to_string(),
            value: Some(value.to_string()),
        }),
    }
}

fn remove_attr(attrs: &mut Vec<Attribute>, name: &str) {
    attrs.retain(|a| a.name != name);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> FieldMap {
        pairs.iter().copied().collect()
    }

    fn fill_with(html: &str, defaults: &FieldMap, errors: &FieldMap, options: &FillOptions) -> String {
        fill(html, defaults, errors, &FormatterRegistry::builtin(), options).unwrap()
    }

    fn fill_default(html: &str, defaults: &[(&str, &str)], errors: &[(&str, &str)]) -> String {
        fill_with(html, &map(defaults), &map(errors), &FillOptions::default())
    }

    fn fill_in_place(html: &str, defaults: &[(&str, &str)], errors: &[(&str, &str)]) -> String {
        let options = FillOptions::default().auto_insert_errors(false);
        fill_with(html, &map(defaults), &map(errors), &options)
    }

    #[test]
    fn untouched_markup_is_copied() {
        let html = "<form action=\"/x\" method=POST>\n  <p class=hint>Hi &amp; bye</p>\n</form>";
        assert_eq!(fill_default(html, &[], &[]), html);
    }

    #[test]
    fn text_input_gets_default() {
        assert_eq!(
            fill_default(r#"<input type="text" name="u" />"#, &[("u", "robert")], &[]),
            r#"<input type="text" name="u" value="robert" />"#
        );
    }

    #[test]
    fn existing_value_is_replaced_in_place() {
        assert_eq!(
            fill_default(r#"<input value="old" name="u">"#, &[("u", "new")], &[]),
            r#"<input value="new" name="u">"#
        );
    }

    #[test]
    fn missing_default_clears_value() {
        assert_eq!(
            fill_default(r#"<input name="u" value="old">"#, &[], &[]),
            r#"<input name="u" value="">"#
        );
    }

    #[test]
    fn missing_default_keeps_value_without_force() {
        let options = FillOptions::default().force_defaults(false);
        assert_eq!(
            fill_with(r#"<input name="u" value="old">"#, &FieldMap::new(), &FieldMap::new(), &options),
            r#"<input name="u" value="old">"#
        );
    }

    #[test]
    fn error_class_before_value() {
        assert_eq!(
            fill_in_place(r#"<input name="u"/>"#, &[("u", "john")], &[("u", "Invalid")]),
            r#"<input name="u" class="error" value="john" />"#
        );
    }

    #[test]
    fn error_class_appended_to_existing_class() {
        assert_eq!(
            fill_in_place(r#"<input class="wide" name="u">"#, &[], &[("u", "bad")]),
            r#"<input class="wide error" name="u" value="">"#
        );
    }

    #[test]
    fn values_are_escaped() {
        assert_eq!(
            fill_default(r#"<input name="q">"#, &[("q", r#"a "b" <c>"#)], &[]),
            r#"<input name="q" value="a &quot;b&quot; &lt;c&gt;">"#
        );
    }

    #[test]
    fn input_without_name_is_untouched() {
        let html = r#"<input type="submit"  value="Go">"#;
        assert_eq!(fill_default(html, &[], &[]), html);
    }

    #[test]
    fn checkbox_with_values() {
        let mut defaults = FieldMap::new();
        defaults.insert_many("c", ["a", "c"]);
        let html = r#"<input type="checkbox" name="c" value="a"><input type="checkbox" name="c" value="b" checked><input type="checkbox" name="c" value="c">"#;
        assert_eq!(
            fill_with(html, &defaults, &FieldMap::new(), &FillOptions::default()),
            r#"<input type="checkbox" name="c" value="a" checked="checked"><input type="checkbox" name="c" value="b"><input type="checkbox" name="c" value="c" checked="checked">"#
        );
    }

    #[test]
    fn checkbox_without_value_uses_truthiness() {
        assert_eq!(
            fill_default(r#"<input type="checkbox" name="ok">"#, &[("ok", "on")], &[]),
            r#"<input type="checkbox" name="ok" checked="checked">"#
        );
        assert_eq!(
            fill_default(r#"<input type="checkbox" name="ok" checked>"#, &[("ok", "")], &[]),
            r#"<input type="checkbox" name="ok">"#
        );
    }

    #[test]
    fn checkbox_checked_if_present() {
        let options = FillOptions::default().checkbox_checked_if_present(true);
        assert_eq!(
            fill_with(r#"<input type="checkbox" name="ok">"#, &map(&[("ok", "")]), &FieldMap::new(), &options),
            r#"<input type="checkbox" name="ok" checked="checked">"#
        );
    }

    #[test]
    fn radio_buttons() {
        let html = r#"<input type="radio" name="r" value="x" checked><input type="radio" name="r" value="y">"#;
        assert_eq!(
            fill_default(html, &[("r", "y")], &[]),
            r#"<input type="radio" name="r" value="x"><input type="radio" name="r" value="y" checked="checked">"#
        );
    }

    #[test]
    fn password_is_cleared_unless_skipped() {
        let html = r#"<input type="password" name="pw" value="secret" />"#;
        assert_eq!(
            fill_default(html, &[], &[]),
            r#"<input type="password" name="pw" value="" />"#
        );
        let options = FillOptions::default().skip_passwords(true);
        assert_eq!(fill_with(html, &FieldMap::new(), &FieldMap::new(), &options), html);
    }

    #[test]
    fn submit_value_only_set_when_present() {
        let html = r#"<input type="submit" name="go" value="Go">"#;
        assert_eq!(fill_default(html, &[], &[]), r#"<input type="submit" name="go" value="Go">"#);
        assert_eq!(
            fill_default(html, &[("go", "Send")], &[]),
            r#"<input type="submit" name="go" value="Send">"#
        );
    }

    #[test]
    fn unknown_input_type() {
        let err = fill(
            r#"<input type="fancy" name="f">"#,
            &FieldMap::new(),
            &FieldMap::new(),
            &FormatterRegistry::builtin(),
            &FillOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FillError::UnknownInputType {
                name: "f".into(),
                input_type: "fancy".into()
            }
        );

        let options = FillOptions::default().text_as_default(true);
        assert_eq!(
            fill_with(r#"<input type="fancy" name="f">"#, &map(&[("f", "1")]), &FieldMap::new(), &options),
            r#"<input type="fancy" name="f" value="1">"#
        );
    }

    #[test]
    fn textarea_content_replaced() {
        assert_eq!(
            fill_default("<textarea name=\"bio\">old <b></textarea>", &[("bio", "new & <fresh>")], &[]),
            "<textarea name=\"bio\">new &amp; &lt;fresh&gt;</textarea>"
        );
        assert_eq!(
            fill_default("<textarea name=\"bio\">old</textarea>", &[], &[]),
            "<textarea name=\"bio\"></textarea>"
        );
    }

    #[test]
    fn select_options() {
        let html = "<select name=\"s\"><option value=\"1\" selected>One</option><option value=\"2\">Two</option><option>Three</option></select>";
        assert_eq!(
            fill_default(html, &[("s", "2")], &[]),
            "<select name=\"s\"><option value=\"1\">One</option><option value=\"2\" selected=\"selected\">Two</option><option>Three</option></select>"
        );
        assert_eq!(
            fill_default(html, &[("s", "Three")], &[]),
            "<select name=\"s\"><option value=\"1\">One</option><option value=\"2\">Two</option><option selected=\"selected\">Three</option></select>"
        );
    }

    #[test]
    fn error_placeholder_replaced_or_removed() {
        let html = r#"<form:error name="u"><form:error name="v">"#;
        assert_eq!(
            fill_default(html, &[], &[("u", "bad")]),
            "<span class=\"error-message\">bad</span><br />\n"
        );
    }

    #[test]
    fn error_placeholder_with_format() {
        assert_eq!(
            fill_default(r#"<form:error name="u" format="escape" />"#, &[], &[("u", "<bad>")]),
            "&lt;bad&gt;"
        );
    }

    #[test]
    fn unknown_formatter_is_an_error() {
        let err = fill(
            r#"<form:error name="u" format="nope">"#,
            &FieldMap::new(),
            &map(&[("u", "bad")]),
            &FormatterRegistry::builtin(),
            &FillOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, FillError::UnknownFormatter("nope".into()));
    }

    #[test]
    fn unnamed_placeholder_renders_remaining_errors() {
        let html = r#"<form:error name="a" format="none">|<form:error format="none">"#;
        assert_eq!(fill_default(html, &[], &[("a", "A"), ("b", "B"), ("c", "C")]), "A|BC");
    }

    #[test]
    fn iferror_blocks() {
        let html = r#"<form:iferror name="u">has</form:iferror><form:iferror name="not u">none</form:iferror>"#;
        assert_eq!(fill_in_place(html, &[], &[("u", "x")]), "has");
        assert_eq!(fill_in_place(html, &[], &[]), "none");
    }

    #[test]
    fn nested_iferror_inside_hidden_block() {
        let html = r#"<form:iferror name="a">[<form:iferror name="b">b</form:iferror>]</form:iferror>after"#;
        assert_eq!(fill_in_place(html, &[], &[("b", "x")]), "after");
    }

    #[test]
    fn auto_insert_errors_before_field() {
        let options = FillOptions::default()
            .auto_insert_errors(true)
            .auto_error_formatter("none");
        let html = r#"<p><input name="a"></p><input name="b">"#;
        assert_eq!(
            fill_with(html, &FieldMap::new(), &map(&[("a", "A!"), ("b", "B!")]), &options),
            r#"<p>A!<input name="a" class="error" value=""></p>B!<input name="b" class="error" value="">"#
        );
    }

    #[test]
    fn auto_insert_errors_after_field_skips_placeholders() {
        let options = FillOptions::default()
            .auto_insert_errors(true)
            .prefix_error(false)
            .auto_error_formatter("none");
        let html = r#"<textarea name="a"></textarea><input name="b"><form:error name="b" format="none">"#;
        assert_eq!(
            fill_with(html, &FieldMap::new(), &map(&[("a", "A!"), ("b", "B!")]), &options),
            r#"<textarea name="a" class="error"></textarea>A!<input name="b" class="error" value="">B!"#
        );
    }

    #[test]
    fn errors_without_placeholder_are_inserted_by_default() {
        assert_eq!(
            fill_default(r#"<p><input type="password" name="pw" /></p>"#, &[], &[("pw", "Required")]),
            "<p><span class=\"error-message\">Required</span><br />\n<input type=\"password\" name=\"pw\" class=\"error\" value=\"\" /></p>"
        );
    }

    #[test]
    fn errors_without_field_go_to_the_top() {
        let options = FillOptions::default().auto_error_formatter("none");
        let html = r#"<p>x</p><input name="a"><form:error name="b" format="none">"#;
        assert_eq!(
            fill_with(html, &FieldMap::new(), &map(&[("b", "B!"), ("ghost", "Oops"), ("zed", "Z")]), &options),
            r#"OopsZ<p>x</p><input name="a" value="">B!"#
        );
    }

    #[test]
    fn disabled_auto_insert_drops_unplaced_errors() {
        assert_eq!(
            fill_in_place(r#"<input name="a">"#, &[], &[("a", "A"), ("ghost", "G")]),
            r#"<input name="a" class="error" value="">"#
        );
    }

    #[test]
    fn use_all_keys_reports_unused() {
        let options = FillOptions::default().use_all_keys(true);
        let err = fill(
            r#"<input name="a">"#,
            &map(&[("a", "1"), ("z", "2")]),
            &map(&[("y", "bad")]),
            &FormatterRegistry::builtin(),
            &options,
        )
        .unwrap_err();
        assert_eq!(err, FillError::UnusedKeys(vec!["y".into(), "z".into()]));
    }

    #[test]
    fn ignored_fields_are_untouched() {
        let html = r#"<input name="a" data-formencode-ignore value="keep">"#;
        assert_eq!(fill_in_place(html, &[("a", "x")], &[("a", "e")]), html);
    }

    #[test]
    fn form_namespaced_attributes_are_dropped() {
        assert_eq!(
            fill_default(r#"<input name="a" form:note="x">"#, &[("a", "1")], &[]),
            r#"<input name="a" value="1">"#
        );
    }

    #[test]
    fn non_ascii_round_trip() {
        assert_eq!(
            fill_default(r#"<input name="n" />"#, &[("n", "박재상")], &[]),
            r#"<input name="n" value="박재상" />"#
        );
    }
}
