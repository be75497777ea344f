//! Human-readable renderings of a [`Delta`].
//!
//! [`render_html`] produces a nested list fragment for a revision view;
//! [`render_text`] produces one line per leaf change for terminals and logs.

use std::fmt::Write as _;

use serde_json::Value;

use crate::delta::{Delta, PathSegment};
use crate::json_pretty::pretty_one_line;

const LIST_OPEN: &str = "<ul class=\"meta-diff\">";
const LIST_CLOSE: &str = "</ul>";

/// Renders `delta` as an HTML fragment.
///
/// Added values are wrapped in `<ins>`, removed values in `<del>`, and a
/// modified value shows both. All document text is escaped.
pub fn render_html(delta: &Delta) -> String {
    let mut out = String::new();
    out.push_str(LIST_OPEN);
    match delta {
        Delta::Object { entries } => {
            for (key, child) in entries {
                write_item(&mut out, &PathSegment::Key(key.clone()), child);
            }
        }
        Delta::Array { entries } => {
            for entry in entries {
                write_item(&mut out, &PathSegment::Element(entry.identity.clone()), &entry.delta);
            }
        }
        leaf => {
            let _ = write!(out, "<li class=\"{}\">", item_class(leaf));
            write_leaf(&mut out, leaf);
            out.push_str("</li>");
        }
    }
    out.push_str(LIST_CLOSE);
    out
}

fn write_item(out: &mut String, label: &PathSegment, delta: &Delta) {
    let label = match label {
        PathSegment::Key(key) => key.clone(),
        PathSegment::Element(identity) => format!("[{identity}]"),
    };
    let _ = write!(
        out,
        "<li class=\"{}\"><span class=\"meta-diff-key\">{}</span>",
        item_class(delta),
        escape_html(&label)
    );
    match delta {
        Delta::Object { .. } | Delta::Array { .. } => out.push_str(&render_html(delta)),
        leaf => write_leaf(out, leaf),
    }
    out.push_str("</li>");
}

fn write_leaf(out: &mut String, delta: &Delta) {
    match delta {
        Delta::Added { value } => write_value(out, "ins", value),
        Delta::Removed { value } => write_value(out, "del", value),
        Delta::Modified { old, new } => {
            write_value(out, "del", old);
            write_value(out, "ins", new);
        }
        Delta::Object { .. } | Delta::Array { .. } => {}
    }
}

fn write_value(out: &mut String, tag: &str, value: &Value) {
    let _ = write!(out, "<{tag}>{}</{tag}>", escape_html(&pretty_one_line(value)));
}

fn item_class(delta: &Delta) -> &'static str {
    match delta {
        Delta::Added { .. } => "meta-diff-added",
        Delta::Removed { .. } => "meta-diff-removed",
        Delta::Modified { .. } => "meta-diff-modified",
        Delta::Object { .. } | Delta::Array { .. } => "meta-diff-node",
    }
}

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Renders `delta` as plain text, one change per line:
/// `+ path: value`, `- path: value`, `~ path: old -> new`.
pub fn render_text(delta: &Delta) -> String {
    let mut out = String::new();
    for change in delta.changes() {
        let path = change.dotted_path();
        let path = if path.is_empty() { "(root)" } else { path.as_str() };
        let _ = match (&change.old, &change.new) {
            (Some(old), Some(new)) => writeln!(
                out,
                "{} {path}: {} -> {}",
                change.kind.symbol(),
                pretty_one_line(old),
                pretty_one_line(new)
            ),
            (Some(value), None) | (None, Some(value)) => {
                writeln!(out, "{} {path}: {}", change.kind.symbol(), pretty_one_line(value))
            }
            (None, None) => writeln!(out, "{} {path}", change.kind.symbol()),
        };
    }
    out
}
