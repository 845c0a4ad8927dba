//! Recursive value and attribute formatting.
//!
//! Values are rendered as configuration-language expressions:
//!
//! - strings holding a single `${...}` interpolation become the bare
//!   expression; other strings are quoted and escaped
//! - lists and maps are rendered one element per line, indented by depth
//! - at attribute level, lists of maps become repeated nested blocks and
//!   `for_each` maps become `dynamic` blocks

use std::fmt::{self, Write};

use terracanvas_core::{Attributes, Value};

use crate::{builder::is_internal_key, error::TerracanvasError, reference::unwrap_reference};

/// Indentation unit.
const INDENT: &str = "  ";

pub(crate) fn pad(depth: usize) -> String {
    INDENT.repeat(depth)
}

/// Format a value as an expression at nesting depth `depth`.
///
/// ```
/// # use serde_json::json;
/// # use terracanvas::codegen::format_value;
/// assert_eq!(format_value(&json!("${aws_vpc.main.id}"), 0), "aws_vpc.main.id");
/// assert_eq!(format_value(&json!("eu-west-1"), 0), "\"eu-west-1\"");
/// assert_eq!(format_value(&json!(["a"]), 0), "[\n  \"a\",\n]");
/// ```
pub fn format_value(value: &Value, depth: usize) -> String {
    Expression::new(value, depth).to_string()
}

/// A value rendered as an expression when displayed.
pub(crate) struct Expression<'a> {
    value: &'a Value,
    depth: usize,
}

impl<'a> Expression<'a> {
    pub(crate) fn new(value: &'a Value, depth: usize) -> Self {
        Self { value, depth }
    }
}

impl fmt::Display for Expression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self.value, self.depth)
    }
}

fn write_value(out: &mut impl Write, value: &Value, depth: usize) -> fmt::Result {
    match value {
        Value::Null => out.write_str("null"),
        Value::Bool(b) => out.write_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write!(out, "{n}"),
        Value::String(s) => match unwrap_reference(s) {
            Some(expression) => out.write_str(expression),
            None => out.write_str(&quote(s)),
        },
        Value::Array(items) if items.is_empty() => out.write_str("[]"),
        Value::Array(items) => {
            out.write_str("[\n")?;
            for item in items {
                out.write_str(&pad(depth + 1))?;
                write_value(out, item, depth + 1)?;
                out.write_str(",\n")?;
            }
            write!(out, "{}]", pad(depth))
        }
        Value::Object(map) => {
            let visible: Vec<_> = map.iter().filter(|(key, _)| !is_internal_key(key)).collect();
            if visible.is_empty() {
                return out.write_str("{}");
            }
            out.write_str("{\n")?;
            for (key, item) in visible {
                write!(out, "{}{} = ", pad(depth + 1), format_key(key))?;
                write_value(out, item, depth + 1)?;
                out.write_char('\n')?;
            }
            write!(out, "{}}}", pad(depth))
        }
    }
}

/// Quote and escape a string literal.
pub fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Whether `key` can be written without quotes.
fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn format_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Attribute and block names in a block body must be identifiers; only
/// keys of map values may be quoted.
fn body_key(key: &str) -> Result<&str, TerracanvasError> {
    if is_identifier(key) {
        Ok(key)
    } else {
        Err(TerracanvasError::Generation(format!(
            "attribute name {} is not an identifier",
            quote(key)
        )))
    }
}

/// Write every attribute of `attributes` not rejected by `skip`, at depth
/// `depth`. Internal keys are always skipped.
///
/// # Errors
///
/// [`TerracanvasError::Generation`] for an attribute name that cannot be
/// written in a block body.
pub(crate) fn write_attributes(
    out: &mut String,
    attributes: &Attributes,
    depth: usize,
    skip: impl Fn(&str) -> bool,
) -> Result<(), TerracanvasError> {
    for (key, value) in attributes {
        if is_internal_key(key) || skip(key) {
            continue;
        }
        write_attribute(out, key, value, depth)?;
    }
    Ok(())
}

/// Write one attribute, choosing between `key = value`, nested blocks and
/// dynamic blocks by the shape of the value.
fn write_attribute(
    out: &mut String,
    key: &str,
    value: &Value,
    depth: usize,
) -> Result<(), TerracanvasError> {
    match value {
        Value::Array(items) if key == "dynamic" && items.iter().all(Value::is_object) => {
            for item in items.iter().filter_map(Value::as_object) {
                for (block_type, descriptor) in item {
                    match descriptor.as_object() {
                        Some(descriptor) => write_dynamic(out, block_type, descriptor, depth)?,
                        None => write_assignment(out, block_type, descriptor, depth)?,
                    }
                }
            }
            Ok(())
        }
        Value::Object(map) if map.contains_key("for_each") => write_dynamic(out, key, map, depth),
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            for block in items.iter().filter_map(Value::as_object) {
                write_block(out, key, block, depth)?;
            }
            Ok(())
        }
        _ => write_assignment(out, key, value, depth),
    }
}

fn write_assignment(
    out: &mut String,
    key: &str,
    value: &Value,
    depth: usize,
) -> Result<(), TerracanvasError> {
    let key = body_key(key)?;
    writeln!(out, "{}{key} = {}", pad(depth), Expression::new(value, depth))?;
    Ok(())
}

/// `key { ... }`
fn write_block(
    out: &mut String,
    key: &str,
    body: &Attributes,
    depth: usize,
) -> Result<(), TerracanvasError> {
    let key = body_key(key)?;
    writeln!(out, "{}{key} {{", pad(depth))?;
    write_attributes(out, body, depth + 1, |_| false)?;
    writeln!(out, "{}}}", pad(depth))?;
    Ok(())
}

/// `dynamic "<type>" { for_each = ...; iterator = ...; labels = [...]; content { ... } }`
fn write_dynamic(
    out: &mut String,
    block_type: &str,
    descriptor: &Attributes,
    depth: usize,
) -> Result<(), TerracanvasError> {
    let inner = pad(depth + 1);
    writeln!(out, "{}dynamic {} {{", pad(depth), quote(block_type))?;

    let for_each = descriptor.get("for_each").unwrap_or(&Value::Null);
    writeln!(out, "{inner}for_each = {}", Expression::new(for_each, depth + 1))?;

    if let Some(iterator) = descriptor.get("iterator") {
        let iterator = match iterator {
            Value::String(s) => unwrap_reference(s).unwrap_or(s).to_string(),
            other => format_value(other, depth + 1),
        };
        writeln!(out, "{inner}iterator = {iterator}")?;
    }

    if let Some(Value::Array(labels)) = descriptor.get("labels") {
        let labels: Vec<String> = labels
            .iter()
            .map(|label| match label {
                Value::String(s) => quote(s),
                other => format_value(other, depth + 1),
            })
            .collect();
        writeln!(out, "{inner}labels = [{}]", labels.join(", "))?;
    }

    writeln!(out, "{inner}content {{")?;
    let content = match descriptor.get("content") {
        Some(Value::Object(content)) => Some(content),
        Some(Value::Array(items)) => items.first().and_then(Value::as_object),
        _ => None,
    };
    if let Some(content) = content {
        write_attributes(out, content, depth + 2, |_| false)?;
    }
    writeln!(out, "{inner}}}")?;
    writeln!(out, "{}}}", pad(depth))?;
    Ok(())
}
