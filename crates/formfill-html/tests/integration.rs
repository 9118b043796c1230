use formfill_html::{fill, FieldMap, FillError, FillOptions, FormatterRegistry};
use proptest::prelude::*;

fn registration_form() -> &'static str {
    r#"<form action="/register" method="POST">
    <input type="text" name="username" />
    <form:error name="username">
    <input type="password" name="password" />
    <input type="email" name="email" />
</form>"#
}

#[test]
fn fills_registration_form() {
    let defaults: FieldMap = [("username", "robert"), ("email", "robert153@usrobots.com")]
        .into_iter()
        .collect();
    let errors: FieldMap = [("username", "This name is invalid")].into_iter().collect();

    let output = fill(
        registration_form(),
        &defaults,
        &errors,
        &FormatterRegistry::builtin(),
        &FillOptions::default(),
    )
    .unwrap();

    assert_eq!(
        output,
        r#"<form action="/register" method="POST">
    <input type="text" name="username" class="error" value="robert" />
    <span class="error-message">This name is invalid</span><br />

    <input type="password" name="password" value="" />
    <input type="email" name="email" value="robert153@usrobots.com" />
</form>"#
    );
}

#[test]
fn custom_formatter_and_error_class() {
    let mut formatters = FormatterRegistry::builtin();
    formatters.insert("list", |e: &str| format!(r#"<ul class="errors"><li>{}</li></ul>"#, e));
    let options = FillOptions::default().error_class("fail");

    let errors: FieldMap = [("username", "Taken")].into_iter().collect();
    let output = fill(
        r#"<input name="username" class="wide"><form:error name="username" format="list">"#,
        &FieldMap::new(),
        &errors,
        &formatters,
        &options,
    )
    .unwrap();

    assert_eq!(
        output,
        r#"<input name="username" class="wide fail" value=""><ul class="errors"><li>Taken</li></ul>"#
    );
}

#[test]
fn multi_select() {
    let mut defaults = FieldMap::new();
    defaults.insert_many("langs", ["rust", "c"]);

    let output = fill(
        r#"<select name="langs" multiple><option value="rust">Rust</option><option value="go">Go</option><option value="c">C</option></select>"#,
        &defaults,
        &FieldMap::new(),
        &FormatterRegistry::builtin(),
        &FillOptions::default(),
    )
    .unwrap();

    assert_eq!(
        output,
        r#"<select name="langs" multiple><option value="rust" selected="selected">Rust</option><option value="go">Go</option><option value="c" selected="selected">C</option></select>"#
    );
}

#[test]
fn script_content_is_not_parsed() {
    let html = r#"<script>if (a < b) { x = "<input name='u'>"; }</script><input name="u">"#;
    let defaults: FieldMap = [("u", "1")].into_iter().collect();
    let output = fill(
        html,
        &defaults,
        &FieldMap::new(),
        &FormatterRegistry::builtin(),
        &FillOptions::default(),
    )
    .unwrap();
    assert_eq!(
        output,
        r#"<script>if (a < b) { x = "<input name='u'>"; }</script><input name="u" value="1">"#
    );
}

#[test]
fn error_is_displayable() {
    let err = FillError::UnusedKeys(vec!["a".into(), "b".into()]);
    assert_eq!(err.to_string(), "keys not used by any form field: a, b");
}

proptest! {
    #[test]
    fn text_without_markup_is_unchanged(s in "[^<]*") {
        let output = fill(
            &s,
            &FieldMap::new(),
            &FieldMap::new(),
            &FormatterRegistry::builtin(),
            &FillOptions::default(),
        ).unwrap();
        prop_assert_eq!(output, s);
    }

    #[test]
    fn default_values_survive_escaping(value in "\\PC*") {
        let defaults: FieldMap = [("f", value.as_str())].into_iter().collect();
        let output = fill(
            r#"<input name="f">"#,
            &defaults,
            &FieldMap::new(),
            &FormatterRegistry::builtin(),
            &FillOptions::default(),
        ).unwrap();
        prop_assert_eq!(output, format!(r#"<input name="f" value="{}">"#, formfill_html::escape_html(&value)));
    }
}
