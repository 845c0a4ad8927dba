//! Reference extraction from interpolated strings.
//!
//! Attribute values refer to other blocks through `${ ... }` interpolations
//! such as `"${aws_vpc.main.id}"` or `"${var.region}"`. This module pulls the
//! traversal paths out of those strings and maps each path to the node ids
//! it may denote.

use std::sync::LazyLock;

use regex::Regex;

/// One `${ ... }` interpolation; the capture is its body.
static INTERPOLATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("interpolation regex is valid"));

/// A string that is exactly one interpolation.
static WHOLE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\{([^{}]*)\}$").expect("reference regex is valid"));

/// A dotted traversal with optional index suffixes on each step.
static TRAVERSAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"[A-Za-z_][A-Za-z0-9_-]*(?:\[[^\]]*\])*(?:\.[A-Za-z_][A-Za-z0-9_-]*(?:\[[^\]]*\])*)+"#,
    )
    .expect("traversal regex is valid")
});

static INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("index regex is valid"));

/// Root names that never denote a block of their own.
const NON_BLOCK_ROOTS: [&str; 7] = ["local", "each", "count", "path", "self", "terraform", "var"];

/// Extract every traversal path found inside `${ ... }` interpolations, in
/// source order.
///
/// Text outside interpolations is ignored.
///
/// ```
/// # use terracanvas::reference::extract_references;
/// let refs = extract_references("${aws_vpc.main.id}-${var.env}");
/// assert_eq!(refs, vec!["aws_vpc.main.id", "var.env"]);
/// ```
pub fn extract_references(value: &str) -> Vec<String> {
    INTERPOLATION
        .captures_iter(value)
        .filter_map(|captures| captures.get(1))
        .flat_map(|body| TRAVERSAL.find_iter(body.as_str()))
        .map(|path| path.as_str().to_string())
        .collect()
}

/// The body of a string that consists of a single interpolation.
///
/// `"${aws_vpc.main.id}"` yields `aws_vpc.main.id`; strings with surrounding
/// text or several interpolations yield `None`, as do blank and multi-line
/// bodies, which cannot be written as a bare expression.
pub fn unwrap_reference(value: &str) -> Option<&str> {
    WHOLE_REFERENCE
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str().trim())
        .filter(|body| !body.is_empty() && !body.contains('\n'))
}

/// Node ids a traversal path may denote, most specific first.
///
/// Index suffixes are stripped first. The candidates are the path itself and
/// each of its dotted prefixes, followed by the node id implied by the
/// configuration addressing rules:
///
/// - `type.name[.attr...]` denotes `resource.type.name`
/// - `data.type.name[.attr...]` denotes `data.type.name`
/// - `module.name[.output...]` denotes `module.name`
/// - `var.name` denotes `variable.name`
pub fn candidate_ids(path: &str) -> Vec<String> {
    let path = INDEX.replace_all(path, "");
    let parts: Vec<&str> = path.split('.').filter(|part| !part.is_empty()).collect();

    let mut candidates: Vec<String> = (2..=parts.len())
        .rev()
        .map(|len| parts[..len].join("."))
        .collect();

    let implied = match parts.as_slice() {
        ["data", resource_type, name, ..] => Some(format!("data.{resource_type}.{name}")),
        ["module", name, ..] => Some(format!("module.{name}")),
        ["var", name, ..] => Some(format!("variable.{name}")),
        [root, ..] if NON_BLOCK_ROOTS.contains(root) => None,
        ["data" | "module" | "resource" | "variable" | "output", ..] => None,
        [resource_type, name, ..] => Some(format!("resource.{resource_type}.{name}")),
        _ => None,
    };

    if let Some(implied) = implied.filter(|implied| !candidates.contains(implied)) {
        candidates.push(implied);
    }
    candidates
}

/// Resolve a traversal path to the first candidate id accepted by `exists`.
pub fn resolve(path: &str, exists: impl Fn(&str) -> bool) -> Option<String> {
    candidate_ids(path)
        .into_iter()
        .find(|candidate| exists(candidate))
}

/// Convert a node id to the address used to refer to the block in
/// configuration text.
///
/// ```
/// # use terracanvas::reference::node_id_to_address;
/// assert_eq!(node_id_to_address("resource.aws_vpc.main"), "aws_vpc.main");
/// assert_eq!(node_id_to_address("variable.region"), "var.region");
/// assert_eq!(node_id_to_address("module.network"), "module.network");
/// ```
pub fn node_id_to_address(id: &str) -> String {
    if let Some(rest) = id.strip_prefix("resource.") {
        rest.to_string()
    } else if let Some(rest) = id.strip_prefix("variable.") {
        format!("var.{rest}")
    } else {
        id.to_string()
    }
}
