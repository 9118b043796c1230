//! Parsing and expansion of the `formfill` block tag.
//!
//! MiniJinja has no extension point for new block tags, so `formfill` blocks
//! are rewritten before compilation:
//!
//! ```text
//! {% formfill {'u': 'john'} with errors %}...{% endformfill %}
//! ```
//!
//! becomes a filter block calling the [`FILTER_NAME`] filter:
//!
//! ```text
//! {% filter formfill(defaults=({'u': 'john'}), errors_ref="errors") %}...{% endfilter %}
//! ```
//!
//! The body stays in place and is compiled by MiniJinja like any other
//! template content. A literal argument is evaluated by MiniJinja when the
//! block renders; a bare identifier becomes a [`Argument::ContextRef`] that the
//! filter looks up in whatever context is active at that point. Whitespace
//! control markers (`{%-`, `-%}`) and line numbers are preserved.

use crate::error::TagSyntaxError;

/// Keyword opening a block.
pub const TAG_NAME: &str = "formfill";

/// Keyword closing a block.
pub const END_TAG_NAME: &str = "endformfill";

/// Name of the filter the rewritten blocks call.
pub const FILTER_NAME: &str = "formfill";

const WITH_KEYWORD: &str = "with";

/// Constant names that are literals, not context references.
const CONSTANT_NAMES: &[&str] = &["true", "false", "none", "True", "False", "None"];

/// One argument of a `formfill` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// An expression evaluated by MiniJinja at render time, kept as source text.
    Literal(String),
    /// A bare identifier, looked up in the active rendering context.
    ContextRef(String),
}

impl Argument {
    /// Classifies an expression. `source` must not be empty.
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        if is_identifier(source) && !CONSTANT_NAMES.contains(&source) {
            Argument::ContextRef(source.to_string())
        } else {
            Argument::Literal(source.to_string())
        }
    }

    /// The value used when `with <errors>` is omitted.
    pub fn empty_mapping() -> Self {
        Argument::Literal("{}".to_string())
    }

    /// Renders the argument as a keyword argument of the fill filter.
    fn to_kwarg(&self, role: &str) -> String {
        match self {
            Argument::Literal(expr) => format!("{}=({})", role, expr),
            Argument::ContextRef(name) => format!("{}_ref=\"{}\"", role, name),
        }
    }
}

/// A parsed `{% formfill <defaults> [with <errors>] %}` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFillTag {
    pub defaults: Argument,
    pub errors: Argument,
}

impl FormFillTag {
    /// The filter call that replaces the tag.
    pub fn filter_call(&self) -> String {
        format!(
            "{}({}, {})",
            FILTER_NAME,
            self.defaults.to_kwarg("defaults"),
            self.errors.to_kwarg("errors")
        )
    }
}

/// Parses the arguments of a `formfill` tag (everything after the keyword).
///
/// # Errors
///
/// Fails when the `defaults` expression is missing, when `with` is not
/// followed by an expression, when `with` appears twice, and on unbalanced
/// brackets or unterminated strings.
///
/// # Example
///
/// ```rust
/// use formfill::tag::{parse_tag, Argument};
///
/// let tag = parse_tag("{'u': 'john'} with errors", 1).unwrap();
/// assert_eq!(tag.defaults, Argument::Literal("{'u': 'john'}".into()));
/// assert_eq!(tag.errors, Argument::ContextRef("errors".into()));
///
/// assert!(parse_tag("", 1).is_err());
/// assert!(parse_tag("defaults with", 1).is_err());
/// ```
pub fn parse_tag(arguments: &str, line: usize) -> Result<FormFillTag, TagSyntaxError> {
    let keywords = top_level_keywords(arguments, line)?;

    let (defaults_src, errors_src) = match keywords.as_slice() {
        [] => (arguments, None),
        [at] => (
            &arguments[..*at],
            Some(&arguments[*at + WITH_KEYWORD.len()..]),
        ),
        [_, second, ..] => {
            return Err(TagSyntaxError::new(
                line,
                format!(
                    "unexpected '{}' at offset {} in '{}' tag",
                    WITH_KEYWORD, second, TAG_NAME
                ),
            ))
        }
    };

    if defaults_src.trim().is_empty() {
        return Err(TagSyntaxError::new(
            line,
            format!("'{}' tag requires a 'defaults' expression", TAG_NAME),
        ));
    }
    let defaults = Argument::parse(defaults_src);

    let errors = match errors_src {
        None => Argument::empty_mapping(),
        Some(src) if src.trim().is_empty() => {
            return Err(TagSyntaxError::new(
                line,
                format!("expected an 'errors' expression after '{}'", WITH_KEYWORD),
            ))
        }
        Some(src) => Argument::parse(src),
    };

    Ok(FormFillTag { defaults, errors })
}

/// Rewrites every `formfill` block in `source` into a filter block.
///
/// Sources without `formfill` tags come back unchanged. `{% raw %}` sections
/// and comments are copied untouched.
///
/// # Example
///
/// ```rust
/// use formfill::tag::expand_tags;
///
/// let expanded = expand_tags("{% formfill data -%}<input name=\"a\">{%- endformfill %}").unwrap();
/// assert_eq!(
///     expanded,
///     "{% filter formfill(defaults_ref=\"data\", errors=({})) -%}<input name=\"a\">{%- endfilter %}"
/// );
/// ```
pub fn expand_tags(source: &str) -> Result<String, TagSyntaxError> {
    let mut out = String::with_capacity(source.len() + 64);
    let mut open_blocks: Vec<usize> = Vec::new();
    let mut expanded = 0usize;
    let mut pos = 0;

    while let Some(offset) = source[pos..].find('{') {
        let start = pos + offset;
        let rest = &source[start..];
        out.push_str(&source[pos..start]);

        if rest.starts_with("{#") {
            let end = rest.find("#}").map(|i| i + 2).unwrap_or(rest.len());
            out.push_str(&rest[..end]);
            pos = start + end;
            continue;
        }

        if rest.starts_with("{{") {
            let end = find_delimiter(rest, "}}").map(|i| i + 2).unwrap_or(rest.len());
            out.push_str(&rest[..end]);
            pos = start + end;
            continue;
        }

        if !rest.starts_with("{%") {
            out.push('{');
            pos = start + 1;
            continue;
        }

        let line = line_of(source, start);
        let end = find_delimiter(rest, "%}")
            .ok_or_else(|| TagSyntaxError::new(line, "unterminated block tag"))?;
        let block = BlockTag::split(&rest[..end + 2]);

        match block.keyword {
            TAG_NAME => {
                let tag = parse_tag(block.arguments, line)?;
                let mut rewritten = format!(
                    "{{%{} filter {}",
                    block.leading_marker,
                    tag.filter_call()
                );
                pad_newlines(&mut rewritten, block.raw);
                rewritten.push_str(&format!(" {}%}}", block.trailing_marker));
                out.push_str(&rewritten);
                open_blocks.push(line);
                expanded += 1;
            }
            END_TAG_NAME => {
                if !block.arguments.trim().is_empty() {
                    return Err(TagSyntaxError::new(
                        line,
                        format!("unexpected arguments to '{}'", END_TAG_NAME),
                    ));
                }
                if open_blocks.pop().is_none() {
                    return Err(TagSyntaxError::new(
                        line,
                        format!("'{}' without a matching '{}'", END_TAG_NAME, TAG_NAME),
                    ));
                }
                let mut rewritten = format!("{{%{} endfilter", block.leading_marker);
                pad_newlines(&mut rewritten, block.raw);
                rewritten.push_str(&format!(" {}%}}", block.trailing_marker));
                out.push_str(&rewritten);
            }
            "raw" => {
                let raw_end = find_endraw(&source[start + end + 2..])
                    .map(|i| start + end + 2 + i)
                    .unwrap_or(source.len());
                out.push_str(&source[start..raw_end]);
                pos = raw_end;
                continue;
            }
            _ => out.push_str(block.raw),
        }
        pos = start + end + 2;
    }
    out.push_str(&source[pos..]);

    if let Some(line) = open_blocks.pop() {
        return Err(TagSyntaxError::new(
            line,
            format!("'{}' block is never closed with '{}'", TAG_NAME, END_TAG_NAME),
        ));
    }

    if expanded > 0 {
        tracing::debug!(blocks = expanded, "expanded formfill tags");
    }
    Ok(out)
}

/// A `{% ... %}` tag split into its parts.
struct BlockTag<'a> {
    raw: &'a str,
    leading_marker: &'a str,
    trailing_marker: &'a str,
    keyword: &'a str,
    arguments: &'a str,
}

impl<'a> BlockTag<'a> {
    fn split(raw: &'a str) -> Self {
        let mut inner = &raw[2..raw.len() - 2];

        let leading_marker = match inner.chars().next() {
            Some('-') | Some('+') => {
                let marker = &inner[..1];
                inner = &inner[1..];
                marker
            }
            _ => "",
        };
        let trailing_marker = match inner.chars().last() {
            Some('-') | Some('+') => {
                let marker = &inner[inner.len() - 1..];
                inner = &inner[..inner.len() - 1];
                marker
            }
            _ => "",
        };

        let body = inner.trim_start();
        let keyword_len = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(body.len());

        BlockTag {
            raw,
            leading_marker,
            trailing_marker,
            keyword: &body[..keyword_len],
            arguments: &body[keyword_len..],
        }
    }
}

/// Offsets of `with` keywords outside brackets and strings.
fn top_level_keywords(arguments: &str, line: usize) -> Result<Vec<usize>, TagSyntaxError> {
    let bytes = arguments.as_bytes();
    let mut found = Vec::new();
    let mut stack: Vec<u8> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' | b'"' => {
                i = skip_string(bytes, i).ok_or_else(|| {
                    TagSyntaxError::new(line, "unterminated string in 'formfill' tag")
                })?;
                continue;
            }
            b'(' | b'[' | b'{' => stack.push(b),
            b')' | b']' | b'}' => {
                let expected = match b {
                    b')' => b'(',
                    b']' => b'[',
                    _ => b'{',
                };
                if stack.pop() != Some(expected) {
                    return Err(TagSyntaxError::new(
                        line,
                        format!("unexpected '{}' in 'formfill' tag", b as char),
                    ));
                }
            }
            _ if b.is_ascii_alphabetic() || b == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                let after_dot = arguments[..start].trim_end().ends_with('.');
                if stack.is_empty() && !after_dot && &arguments[start..i] == WITH_KEYWORD {
                    found.push(start);
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if let Some(open) = stack.pop() {
        return Err(TagSyntaxError::new(
            line,
            format!("unclosed '{}' in 'formfill' tag", open as char),
        ));
    }
    Ok(found)
}

/// Returns the index just past the string literal starting at `start`.
fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Finds `delimiter` after the two-byte opener, ignoring string contents.
fn find_delimiter(tag: &str, delimiter: &str) -> Option<usize> {
    let bytes = tag.as_bytes();
    let mut i = 2;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_string(bytes, i)?,
            _ if bytes[i..].starts_with(delimiter.as_bytes()) => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Offset of the end of the `{% endraw %}` tag in `source`.
fn find_endraw(source: &str) -> Option<usize> {
    let mut pos = 0;
    while let Some(offset) = source[pos..].find("{%") {
        let start = pos + offset;
        let end = find_delimiter(&source[start..], "%}")?;
        let block = BlockTag::split(&source[start..start + end + 2]);
        if block.keyword == "endraw" {
            return Some(start + end + 2);
        }
        pos = start + end + 2;
    }
    None
}

/// Appends the newlines `original` had but `rewritten` lost.
fn pad_newlines(rewritten: &mut String, original: &str) {
    let missing = original
        .matches('\n')
        .count()
        .saturating_sub(rewritten.matches('\n').count());
    for _ in 0..missing {
        rewritten.push('\n');
    }
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
