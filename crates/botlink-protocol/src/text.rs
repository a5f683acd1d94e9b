//! Chat component flattening.

use serde_json::Value;

/// Extracts the plain text of a chat component.
///
/// Accepts a bare string, an object with `text` and optional `extra`
/// children, or an array of components. Styling keys are ignored.
pub fn plain_text(component: &Value) -> String {
    let mut out = String::new();
    collect(component, &mut out);
    out
}

fn collect(component: &Value, out: &mut String) {
    match component {
        Value::String(s) => out.push_str(s),
        Value::Array(parts) => parts.iter().for_each(|p| collect(p, out)),
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                out.push_str(text);
            }
            if let Some(extra) = map.get("extra") {
                collect(extra, out);
            }
        }
        _ => {}
    }
}

/// Strips formatting codes (`§a`, `&l`, ...) and turns line breaks and tabs
/// into spaces so the result is safe to print on one line.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '§' | '&' if chars.peek().copied().is_some_and(is_format_code) => {
                chars.next();
            }
            '\n' | '\r' | '\t' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

fn is_format_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
}
