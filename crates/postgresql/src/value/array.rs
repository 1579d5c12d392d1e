/// Render one-dimensional array elements in PostgreSQL's array output form,
/// e.g. `{1,NULL,"a b"}`.
///
/// Elements are double-quoted when they are empty, spell `NULL`, or contain
/// whitespace or one of `{}",\`.
pub fn array_literal<I>(elements: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    let items: Vec<String> = elements
        .into_iter()
        .map(|element| match element {
            None => "NULL".to_string(),
            Some(s) if needs_quotes(&s) => {
                format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Some(s) => s,
        })
        .collect();
    format!("{{{}}}", items.join(","))
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.eq_ignore_ascii_case("null")
        || s.chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '"' | ',' | '\\'))
}
