//! json-pretty — single-line JSON printer for diff reports.

use serde_json::Value;

/// Serialize `value` to one line of JSON with a space after every
/// structural `{`, `[`, `,`, `:` and before every structural `}`, `]`.
///
/// Characters inside string literals are left alone, and empty containers
/// print as `{}` / `[]`.
pub fn pretty_one_line(value: &Value) -> String {
    let json = value.to_string();
    let mut out = String::with_capacity(json.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = json.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '{' | '[' => {
                out.push(ch);
                if !matches!(chars.peek(), Some('}') | Some(']')) {
                    out.push(' ');
                }
            }
            '}' | ']' => {
                if !matches!(out.chars().last(), Some('{') | Some('[')) {
                    out.push(' ');
                }
                out.push(ch);
            }
            ':' | ',' => {
                out.push(ch);
                out.push(' ');
            }
            _ => out.push(ch),
        }
    }
    out
}
