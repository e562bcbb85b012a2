//! Token-Oriented Object Notation (TOON) output.
//!
//! A compact, line-oriented rendering of JSON values used for every piece of
//! command output. Arrays of objects become a header plus one row per element.

use crate::error::ImsgError;
use serde::Serialize;
use serde_json::Value;

/// Rendering options.
#[derive(Debug, Clone)]
pub struct ToonOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Field delimiter inside tabular rows and primitive arrays.
    pub delimiter: char,
    /// Header name for a top-level array of objects.
    pub array_key: String,
}

impl Default for ToonOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            delimiter: ',',
            array_key: "items".to_string(),
        }
    }
}

impl ToonOptions {
    pub fn with_array_key(array_key: &str) -> Self {
        Self {
            array_key: array_key.to_string(),
            ..Default::default()
        }
    }
}

/// Serialize any value and render it as TOON.
pub fn to_toon<T: Serialize + ?Sized>(value: &T, array_key: &str) -> Result<String, ImsgError> {
    let value = serde_json::to_value(value)?;
    Ok(stringify(&value, &ToonOptions::with_array_key(array_key)))
}

/// Render a JSON value as TOON.
pub fn stringify(value: &Value, opts: &ToonOptions) -> String {
    match value {
        Value::Array(items) => stringify_array(items, opts),
        Value::Object(map) => map
            .iter()
            .map(|(key, val)| {
                if is_composite(val) {
                    let nested = ToonOptions {
                        array_key: key.clone(),
                        ..opts.clone()
                    };
                    let pad = " ".repeat(opts.indent);
                    let body = stringify(val, &nested)
                        .lines()
                        .map(|line| format!("{pad}{line}"))
                        .collect::<Vec<_>>()
                        .join("\n");
                    format!("{key}:\n{body}")
                } else {
                    format!("{key}:{}", format_value(val, opts.delimiter))
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => format_value(other, opts.delimiter),
    }
}

fn stringify_array(items: &[Value], opts: &ToonOptions) -> String {
    let Some(first) = items.first() else {
        return "[]".to_string();
    };
    let delim = opts.delimiter.to_string();

    if let Value::Object(first_map) = first {
        let keys: Vec<&String> = first_map.keys().collect();
        let header = format!(
            "{}[{}]{{{}}}",
            opts.array_key,
            items.len(),
            keys.iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(&delim)
        );
        let rows: Vec<String> = items
            .iter()
            .map(|item| {
                keys.iter()
                    .map(|key| match item.get(key.as_str()) {
                        Some(v) if is_composite(v) => {
                            format_string(&v.to_string(), opts.delimiter)
                        }
                        Some(v) => format_value(v, opts.delimiter),
                        None => "null".to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(&delim)
            })
            .collect();
        return format!("{header}:\n{}", rows.join("\n"));
    }

    let cells: Vec<String> = items
        .iter()
        .map(|v| {
            if is_composite(v) {
                format_string(&v.to_string(), opts.delimiter)
            } else {
                format_value(v, opts.delimiter)
            }
        })
        .collect();
    format!("[{}]", cells.join(&delim))
}

fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

fn format_value(value: &Value, delimiter: char) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format_string(s, delimiter),
        composite => composite.to_string(),
    }
}

fn format_string(s: &str, delimiter: char) -> String {
    if needs_quoting(s, delimiter) {
        format!("\"{}\"", escape(s))
    } else {
        s.to_string()
    }
}

fn needs_quoting(s: &str, delimiter: char) -> bool {
    s.starts_with(' ')
        || s.ends_with(' ')
        || s.chars().any(|c| {
            c == delimiter
                || matches!(
                    c,
                    ':' | '\n' | '\r' | '\t' | '"' | '\\' | '[' | ']' | '{' | '}'
                )
        })
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives() {
        let opts = ToonOptions::default();
        assert_eq!(stringify(&json!(null), &opts), "null");
        assert_eq!(stringify(&json!(true), &opts), "true");
        assert_eq!(stringify(&json!(42), &opts), "42");
        assert_eq!(stringify(&json!("plain"), &opts), "plain");
        assert_eq!(stringify(&json!(""), &opts), "");
    }

    #[test]
    fn test_quoting_and_escaping() {
        let opts = ToonOptions::default();
        assert_eq!(stringify(&json!("a:b"), &opts), "\"a:b\"");
        assert_eq!(stringify(&json!("a,b"), &opts), "\"a,b\"");
        assert_eq!(stringify(&json!(" pad"), &opts), "\" pad\"");
        assert_eq!(stringify(&json!("[x]"), &opts), "\"[x]\"");
        assert_eq!(
            stringify(&json!("say \"hi\"\n\\"), &opts),
            "\"say \\\"hi\\\"\\n\\\\\""
        );
    }

    #[test]
    fn test_object_lines() {
        let value = json!({"success": false, "error": "boom", "errorCode": "-600"});
        assert_eq!(
            stringify(&value, &ToonOptions::default()),
            "success:false\nerror:boom\nerrorCode:-600"
        );
    }

    #[test]
    fn test_tabular_array() {
        let value = json!([
            {"chat_id": 1, "chat_identifier": "+15551234567", "display_name": ""},
            {"chat_id": 2, "chat_identifier": "chat123", "display_name": "Family, Inc"}
        ]);
        let out = stringify(&value, &ToonOptions::with_array_key("chats"));
        assert_eq!(
            out,
            "chats[2]{chat_id,chat_identifier,display_name}:\n\
             1,+15551234567,\n\
             2,chat123,\"Family, Inc\""
        );
    }

    #[test]
    fn test_tabular_missing_field_is_null() {
        let value = json!([{"a": 1, "b": 2}, {"a": 3}]);
        let out = stringify(&value, &ToonOptions::default());
        assert_eq!(out, "items[2]{a,b}:\n1,2\n3,null");
    }

    #[test]
    fn test_nested_values_are_indented_and_keyed() {
        let value = json!({
            "healthy": true,
            "errors": ["x", "y"],
            "permissions": {"fullDiskAccess": "denied"}
        });
        let out = stringify(&value, &ToonOptions::default());
        assert_eq!(
            out,
            "healthy:true\nerrors:\n  [x,y]\npermissions:\n  fullDiskAccess:denied"
        );
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(stringify(&json!([]), &ToonOptions::default()), "[]");
    }

    #[test]
    fn test_to_toon_uses_array_key() {
        #[derive(Serialize)]
        struct Row {
            id: u32,
        }
        let out = to_toon(&vec![Row { id: 7 }], "rows").unwrap();
        assert_eq!(out, "rows[1]{id}:\n7");
    }
}
