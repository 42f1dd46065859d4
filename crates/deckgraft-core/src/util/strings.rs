/// Replaces characters XML 1.0 cannot carry with U+FFFD.
pub fn make_valid_xml(s: &str) -> String {
    s.chars()
        .map(|c| if is_valid_xml_char(c) { c } else { '\u{FFFD}' })
        .collect()
}

fn is_valid_xml_char(c: char) -> bool {
    matches!(c,
        '\u{0009}' | '\u{000A}' | '\u{000D}' |
        '\u{0020}'..='\u{D7FF}' |
        '\u{E000}'..='\u{FFFD}' |
        '\u{10000}'..='\u{10FFFF}'
    )
}

/// Trims and collapses every whitespace run (including newlines and NBSP)
/// to a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split(|c: char| c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replaces every `{key}` in `text` with its value. Unknown keys are kept.
pub fn substitute_placeholders(text: &str, values: &[(&str, &str)]) -> String {
    let mut result = text.to_string();
    for (key, value) in values {
        let token = format!("{{{}}}", key);
        if result.contains(&token) {
            result = result.replace(&token, value);
        }
    }
    result
}
