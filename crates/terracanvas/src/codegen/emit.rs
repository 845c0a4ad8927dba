//! Per-kind block emitters.

use std::fmt::{self, Write as _};

use terracanvas_core::{Value, graph::Node, kind::NodeKind};

use super::format::{Expression, format_value, pad, quote, write_attributes};
use crate::{
    builder::DEPENDS_ON,
    error::TerracanvasError,
    reference::{node_id_to_address, unwrap_reference},
};

/// Emit the configuration block for one node, ending with a newline.
///
/// # Errors
///
/// [`TerracanvasError::Generation`] when the node lacks a name, or a
/// resource type for resource and data nodes, or when an attribute name is
/// not an identifier.
pub fn emit_node(node: &Node) -> Result<String, TerracanvasError> {
    match node.kind {
        NodeKind::Resource | NodeKind::Data => emit_resource(node),
        NodeKind::Module => emit_module(node),
        NodeKind::Variable => emit_variable(node),
        NodeKind::Output => emit_output(node),
    }
}

fn required_name(node: &Node) -> Result<&str, TerracanvasError> {
    node.name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            TerracanvasError::Generation(format!("node `{}` is missing `name`", node.id))
        })
}

/// `resource "<type>" "<name>" { ... }` and `data "<type>" "<name>" { ... }`.
fn emit_resource(node: &Node) -> Result<String, TerracanvasError> {
    let name = required_name(node)?;
    let resource_type = node
        .resource_type
        .as_deref()
        .filter(|resource_type| !resource_type.is_empty())
        .ok_or_else(|| {
            TerracanvasError::Generation(format!("node `{}` is missing `resourceType`", node.id))
        })?;

    let mut out = String::new();
    writeln!(out, "{} {} {} {{", node.kind, quote(resource_type), quote(name))?;
    write_attributes(&mut out, &node.config, 1, |key| key == DEPENDS_ON)?;
    write_depends_on(&mut out, node)?;
    out.push_str("}\n");
    Ok(out)
}

/// `module "<name>" { source = ...; ... }`, `source` always first.
fn emit_module(node: &Node) -> Result<String, TerracanvasError> {
    let name = required_name(node)?;

    let mut out = String::new();
    writeln!(out, "module {} {{", quote(name))?;
    let source = match node.config.get("source") {
        Some(source) => format_value(source, 1),
        None => quote(&format!("./modules/{name}")),
    };
    writeln!(out, "{}source = {source}", pad(1))?;
    write_attributes(&mut out, &node.config, 1, |key| {
        key == "source" || key == DEPENDS_ON
    })?;
    write_depends_on(&mut out, node)?;
    out.push_str("}\n");
    Ok(out)
}

/// `variable "<name>" { ... }` with its recognised arguments in canonical
/// order.
fn emit_variable(node: &Node) -> Result<String, TerracanvasError> {
    let name = required_name(node)?;
    let config = &node.config;

    let mut out = String::new();
    writeln!(out, "variable {} {{", quote(name))?;
    if let Some(description) = config.get("description") {
        writeln!(out, "{}description = {}", pad(1), Expression::new(description, 1))?;
    }
    if let Some(type_constraint) = config.get("type") {
        let type_constraint = match type_constraint {
            Value::String(s) => unwrap_reference(s).unwrap_or(s).to_string(),
            other => format_value(other, 1),
        };
        writeln!(out, "{}type = {type_constraint}", pad(1))?;
    }
    if let Some(default) = config.get("default") {
        writeln!(out, "{}default = {}", pad(1), Expression::new(default, 1))?;
    }
    for flag in ["sensitive", "nullable"] {
        if let Some(value) = config.get(flag) {
            writeln!(out, "{}{flag} = {}", pad(1), format_bare(value))?;
        }
    }
    if let Some(validation) = config.get("validation") {
        let blocks: Vec<&Value> = match validation {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for block in blocks.into_iter().filter_map(Value::as_object) {
            writeln!(out, "{}validation {{", pad(1))?;
            write_attributes(&mut out, block, 2, |_| false)?;
            writeln!(out, "{}}}", pad(1))?;
        }
    }
    out.push_str("}\n");
    Ok(out)
}

/// `output "<name>" { value = ...; ... }`. A missing value is written as
/// `null`.
fn emit_output(node: &Node) -> Result<String, TerracanvasError> {
    let name = required_name(node)?;
    let config = &node.config;

    let mut out = String::new();
    writeln!(out, "output {} {{", quote(name))?;
    let value = config.get("value").unwrap_or(&Value::Null);
    writeln!(out, "{}value = {}", pad(1), Expression::new(value, 1))?;
    if let Some(description) = config.get("description") {
        writeln!(out, "{}description = {}", pad(1), Expression::new(description, 1))?;
    }
    if let Some(sensitive) = config.get("sensitive") {
        writeln!(out, "{}sensitive = {}", pad(1), format_bare(sensitive))?;
    }
    write_depends_on(&mut out, node)?;
    out.push_str("}\n");
    Ok(out)
}

/// Booleans written as `"true"` strings are emitted as bare literals.
fn format_bare(value: &Value) -> String {
    match value {
        Value::String(s) if s == "true" || s == "false" => s.clone(),
        other => format_value(other, 1),
    }
}

/// `depends_on = [ ... ]` with every entry rendered as a bare address.
fn write_depends_on(out: &mut String, node: &Node) -> fmt::Result {
    let Some(Value::Array(entries)) = node.config.get(DEPENDS_ON) else {
        return Ok(());
    };
    let addresses: Vec<String> = entries
        .iter()
        .filter_map(Value::as_str)
        .map(|entry| match unwrap_reference(entry) {
            Some(expression) => expression.to_string(),
            None => node_id_to_address(entry),
        })
        .collect();
    if addresses.is_empty() {
        return Ok(());
    }

    writeln!(out, "{}{DEPENDS_ON} = [", pad(1))?;
    for address in addresses {
        writeln!(out, "{}{address},", pad(2))?;
    }
    writeln!(out, "{}]", pad(1))
}
