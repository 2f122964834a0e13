use super::ConsoleFormat;
use super::loader::EnvLookup;
use crate::domain::Level;
use serde::{Deserialize, Deserializer};
use serde_yaml::mapping::Entry;
use serde_yaml::{Mapping, Number, Value};

/// Accepts any scalar; unparseable levels become `info`.
pub fn lenient_level<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

/// Accepts any scalar; anything but `json` becomes text.
pub fn lenient_console_format<'de, D>(deserializer: D) -> Result<ConsoleFormat, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value)
        .map(|s| ConsoleFormat::parse_lenient(&s))
        .unwrap_or_default())
}

pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Deep-merges `overlay` into `base`. Mappings merge key by key (keys are
/// lowercased, config keys are case-insensitive); anything else replaces.
/// A null overlay, e.g. an empty file, changes nothing.
pub fn merge(base: &mut Value, overlay: Value) {
    match overlay {
        Value::Null => {}
        Value::Mapping(overlay) => {
            if !base.is_mapping() {
                *base = Value::Mapping(Mapping::new());
            }
            if let Value::Mapping(base) = base {
                for (key, value) in overlay {
                    let key = match key {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    match base.entry(key) {
                        Entry::Occupied(mut existing) => merge(existing.get_mut(), value),
                        Entry::Vacant(slot) => {
                            slot.insert(value);
                        }
                    }
                }
            }
        }
        other => *base = other,
    }
}

/// Overrides every known leaf of `tree` from the environment.
///
/// A leaf at `a.b_c` is read from `<PREFIX>_A_B_C`; an explicit binding for
/// the dotted key is consulted first. No per-field registration is needed,
/// only the leaves present in `tree` (defaults plus file) are considered.
/// Values are shaped after the matching leaf of `schema`, the default tree.
pub fn apply_env_overrides(
    tree: &mut Value,
    schema: &Value,
    env: &dyn EnvLookup,
    prefix: &str,
    bindings: &[(&str, &str)],
) {
    let mut path = Vec::new();
    override_leaves(tree, Some(schema), &mut path, env, prefix, bindings);
}

fn override_leaves(
    node: &mut Value,
    schema: Option<&Value>,
    path: &mut Vec<String>,
    env: &dyn EnvLookup,
    prefix: &str,
    bindings: &[(&str, &str)],
) {
    if let Value::Mapping(mapping) = node {
        for (key, child) in mapping.iter_mut() {
            let Some(key) = key.as_str() else { continue };
            path.push(key.to_string());
            let child_schema = schema.and_then(|s| s.get(key));
            override_leaves(child, child_schema, path, env, prefix, bindings);
            path.pop();
        }
        return;
    }

    if path.is_empty() {
        return;
    }
    let dotted = path.join(".");
    let bound = bindings
        .iter()
        .find(|(key, _)| *key == dotted)
        .and_then(|(_, name)| env.var(name));
    let raw = bound.or_else(|| env.var(&env_name(prefix, path)));
    if let Some(raw) = raw {
        *node = coerce_env_value(&raw, schema.unwrap_or(&Value::Null));
    }
}

pub fn env_name(prefix: &str, path: &[String]) -> String {
    format!("{}_{}", prefix, path.join("_")).to_uppercase()
}

/// Shapes an environment string after the schema leaf it replaces.
/// Unparseable booleans read as `false`; unparseable numbers stay strings so
/// the typed decode rejects them.
pub fn coerce_env_value(raw: &str, schema: &Value) -> Value {
    let trimmed = raw.trim();
    match schema {
        Value::Bool(_) => Value::Bool(parse_bool(trimmed).unwrap_or(false)),
        Value::Number(_) => parse_number(trimmed).unwrap_or_else(|| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}

/// Weakly typed conversion of file scalars towards the schema's leaf types:
/// `"3"` for a number, `"true"` or `1` for a bool, `1234` for a string.
/// Scalars that cannot be converted are left for the typed decode to reject.
pub fn coerce_to_schema(tree: &mut Value, schema: &Value) {
    match (tree, schema) {
        (Value::Mapping(mapping), Value::Mapping(_)) => {
            for (key, child) in mapping.iter_mut() {
                if let Some(child_schema) = key.as_str().and_then(|key| schema.get(key)) {
                    coerce_to_schema(child, child_schema);
                }
            }
        }
        (node @ Value::String(_), Value::Bool(_)) => {
            if let Some(b) = node.as_str().and_then(|s| parse_bool(s.trim())) {
                *node = Value::Bool(b);
            }
        }
        (node @ Value::Number(_), Value::Bool(_)) => {
            *node = Value::Bool(node.as_f64().is_some_and(|n| n != 0.0));
        }
        (node @ Value::String(_), Value::Number(_)) => {
            if let Some(n) = node.as_str().and_then(|s| parse_number(s.trim())) {
                *node = n;
            }
        }
        (node @ Value::Bool(_), Value::Number(_)) => {
            *node = Value::Number(Number::from(i64::from(node.as_bool() == Some(true))));
        }
        (node @ (Value::Number(_) | Value::Bool(_)), Value::String(_)) => {
            if let Some(s) = scalar_to_string(node) {
                *node = Value::String(s);
            }
        }
        _ => {}
    }
}

fn parse_number(value: &str) -> Option<Value> {
    if let Ok(n) = value.parse::<i64>() {
        Some(Value::Number(Number::from(n)))
    } else if let Ok(f) = value.parse::<f64>() {
        Some(Value::Number(Number::from(f)))
    } else {
        None
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
