/// Trim surrounding whitespace and escape markup-significant characters.
pub fn clean_text(input: &str) -> String {
    escape_html(input.trim())
}

/// Entities that [`escape_html`] itself emits.
const OWN_ENTITIES: &[&str] = &[
    "&amp;", "&lt;", "&gt;", "&quot;", "&#x27;", "&#x2F;", "&#x5C;", "&#96;",
];

/// Replace `& < > " ' / \` and backtick with HTML entities.
///
/// An `&` that already begins one of the entities produced here is kept
/// as-is, so escaping is idempotent: text that went through here once comes
/// back unchanged on the next edit. Any other `&`, including ones that only
/// look like a reference (`AT&T;`, `&copy;`), is escaped.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for (i, c) in input.char_indices() {
        match c {
            '&' if starts_own_entity(&input[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }

    out
}

fn starts_own_entity(s: &str) -> bool {
    OWN_ENTITIES.iter().any(|entity| s.starts_with(entity))
}
