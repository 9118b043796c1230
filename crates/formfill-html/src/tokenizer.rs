//! A forgiving HTML tokenizer.
//!
//! The filler only needs to recognise start tags, end tags and the text
//! between them. Everything is sliced out of the input so untouched markup
//! can be written back byte for byte. Malformed markup never fails: anything
//! that does not look like a tag is returned as text.

use crate::escape::unescape_html;

/// Elements whose content is not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// A single attribute of a start tag, with its value entity-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// A parsed start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StartTag<'a> {
    /// Lowercased tag name (may contain a namespace prefix such as `form:`).
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub self_closing: bool,
    /// The tag exactly as written.
    pub raw: &'a str,
}

impl StartTag<'_> {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    StartTag(StartTag<'a>),
    EndTag { name: String, raw: &'a str },
    /// Comments, doctypes and processing instructions.
    Other(&'a str),
}

pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Set after a raw text element opens; its content is one text token.
    raw_until: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_until: None,
        }
    }

    fn take_until(&mut self, end: usize) -> &'a str {
        let slice = &self.input[self.pos..end];
        self.pos = end;
        slice
    }

    fn raw_text(&mut self, element: &str) -> Option<Token<'a>> {
        let remaining = &self.input[self.pos..];
        let close = format!("</{}", element);
        let end = find_ascii_case_insensitive(remaining, &close)
            .map(|offset| self.pos + offset)
            .unwrap_or(self.input.len());
        if end == self.pos {
            return None;
        }
        Some(Token::Text(self.take_until(end)))
    }

    fn markup(&mut self) -> Option<Token<'a>> {
        let remaining = &self.input[self.pos..];
        let bytes = remaining.as_bytes();

        if remaining.starts_with("<!--") {
            let end = remaining
                .find("-->")
                .map(|i| i + 3)
                .unwrap_or(remaining.len());
            return Some(Token::Other(self.take_until(self.pos + end)));
        }

        if matches!(bytes.get(1), Some(b'!') | Some(b'?')) {
            let end = remaining
                .find('>')
                .map(|i| i + 1)
                .unwrap_or(remaining.len());
            return Some(Token::Other(self.take_until(self.pos + end)));
        }

        if bytes.get(1) == Some(&b'/') && bytes.get(2).is_some_and(u8::is_ascii_alphabetic) {
            let end = remaining.find('>')? + 1;
            let raw = &remaining[..end];
            let name = raw[2..end - 1]
                .trim()
                .split(|c: char| c.is_whitespace())
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();
            self.pos += end;
            return Some(Token::EndTag { name, raw });
        }

        if bytes.get(1).is_some_and(u8::is_ascii_alphabetic) {
            let (tag, len) = parse_start_tag(remaining)?;
            self.pos += len;
            if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) && !tag.self_closing {
                self.raw_until = Some(tag.name.clone());
            }
            return Some(Token::StartTag(tag));
        }

        None
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        if let Some(element) = self.raw_until.take() {
            if let Some(token) = self.raw_text(&element) {
                return Some(token);
            }
        }

        let remaining = &self.input[self.pos..];
        if remaining.starts_with('<') {
            if let Some(token) = self.markup() {
                return Some(token);
            }
            // A lone '<' is text; continue to the next candidate.
            let next = remaining[1..]
                .find('<')
                .map(|i| self.pos + 1 + i)
                .unwrap_or(self.input.len());
            return Some(Token::Text(self.take_until(next)));
        }

        let next = remaining
            .find('<')
            .map(|i| self.pos + i)
            .unwrap_or(self.input.len());
        Some(Token::Text(self.take_until(next)))
    }
}

/// Parses a start tag at the beginning of `input`.
///
/// Returns the tag and its length in bytes, or `None` when the tag is never
/// closed with `>` (the caller then treats it as text).
fn parse_start_tag(input: &str) -> Option<(StartTag<'_>, usize)> {
    let bytes = input.as_bytes();
    let mut i = 1;

    let name_end = input[i..]
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .map(|n| i + n)?;
    let name = input[i..name_end].to_ascii_lowercase();
    i = name_end;

    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                i += 1;
                if bytes.get(i) == Some(&b'>') {
                    self_closing = true;
                    i += 1;
                    break;
                }
                continue;
            }
            _ => {}
        }

        let attr_end = input[i..]
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .map(|n| i + n)?;
        let attr_name = input[i..attr_end].to_ascii_lowercase();
        i = attr_end;

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let value = if bytes.get(j) == Some(&b'=') {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            match bytes.get(j)? {
                quote @ (b'"' | b'\'') => {
                    let close = input[j + 1..].find(*quote as char)? + j + 1;
                    let value = &input[j + 1..close];
                    i = close + 1;
                    Some(unescape_html(value))
                }
                _ => {
                    let end = input[j..]
                        .find(|c: char| c.is_whitespace() || c == '>')
                        .map(|n| j + n)?;
                    // `<input value=x/>` keeps the slash as part of the tag end.
                    let end = if end > j + 1 && bytes[end - 1] == b'/' && bytes[end] == b'>' {
                        end - 1
                    } else {
                        end
                    };
                    i = end;
                    Some(unescape_html(&input[j..end]))
                }
            }
        } else {
            None
        };

        if !attr_name.is_empty() {
            attrs.push(Attribute {
                name: attr_name,
                value,
            });
        }
    }

    Some((
        StartTag {
            name,
            attrs,
            self_closing,
            raw: &input[..i],
        },
        i,
    ))
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}
