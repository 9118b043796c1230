//! HTML escaping and entity decoding.

/// Escapes `&`, `<`, `>` and `"` for use in text content and quoted attributes.
///
/// Everything else, including non-ASCII text, is passed through unchanged.
///
/// # Example
///
/// ```rust
/// use formfill_html::escape_html;
///
/// assert_eq!(escape_html(r#"<b class="x">&</b>"#), "&lt;b class=&quot;x&quot;&gt;&amp;&lt;/b&gt;");
/// assert_eq!(escape_html("박재상"), "박재상");
/// ```
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decodes character references found in attribute values.
///
/// Named references cover the handful HTML forms actually use; numeric
/// references (`&#39;`, `&#x27;`) are decoded in full. Anything that does not
/// parse is left as written.
pub(crate) fn unescape_html(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
