//! Logic-less template rendering.
//!
//! Supports `{{key}}`, dotted paths (`{{progress.done}}`), `{{.}}` for the
//! current scalar item, `{{#key}}...{{/key}}` sections (repeated for lists,
//! entered for objects, shown for truthy values) and `{{^key}}...{{/key}}`
//! inverted sections. Unknown keys render as empty strings.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(\.|[\w.]+)\s*\}\}").expect("valid regex"));
static SECTION_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([#^])\s*(\w+)\s*\}\}").expect("valid regex"));
static SECTION_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([#^/])\s*(\w+)\s*\}\}").expect("valid regex"));

/// Render `template` against a JSON context.
pub fn render(template: &str, context: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(caps) = SECTION_OPEN.captures(rest) {
        let Some(tag) = caps.get(0) else { break };
        let inverted = &caps[1] == "^";
        let name = caps[2].to_string();

        out.push_str(&interpolate(&rest[..tag.start()], context));
        let after = &rest[tag.end()..];

        match split_section(after, &name) {
            Some((body, remainder)) => {
                out.push_str(&render_section(&name, body, inverted, context));
                rest = remainder;
            }
            None => {
                // unterminated section: keep the tag as text
                out.push_str(tag.as_str());
                rest = after;
            }
        }
    }

    out.push_str(&interpolate(rest, context));
    out
}

/// Find the `{{/name}}` closing this section, honouring nested sections of the same name.
fn split_section<'a>(input: &'a str, name: &str) -> Option<(&'a str, &'a str)> {
    let mut depth = 0usize;

    for caps in SECTION_TAG.captures_iter(input).filter(|caps| &caps[2] == name) {
        let tag = caps.get(0)?;
        if &caps[1] == "/" {
            if depth == 0 {
                return Some((&input[..tag.start()], &input[tag.end()..]));
            }
            depth -= 1;
        } else {
            depth += 1;
        }
    }
    None
}

fn render_section(name: &str, body: &str, inverted: bool, context: &Value) -> String {
    let value = lookup(context, name);

    if inverted {
        return if is_truthy(value) { String::new() } else { render(body, context) };
    }

    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(_) => render(body, item),
                scalar => {
                    let mut scope = Map::new();
                    scope.insert(".".to_string(), scalar.clone());
                    render(body, &Value::Object(scope))
                }
            })
            .collect(),
        Some(object @ Value::Object(_)) => render(body, object),
        other if is_truthy(other) => render(body, context),
        _ => String::new(),
    }
}

fn interpolate(text: &str, context: &Value) -> String {
    VARIABLE
        .replace_all(text, |caps: &Captures<'_>| lookup(context, &caps[1]).map(format_value).unwrap_or_default())
        .into_owned()
}

fn lookup<'a>(context: &'a Value, key: &str) -> Option<&'a Value> {
    if key == "." {
        return match context {
            Value::Object(map) => map.get("."),
            scalar => Some(scalar),
        };
    }

    key.split('.').try_fold(context, |current, part| current.get(part))
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", format_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
