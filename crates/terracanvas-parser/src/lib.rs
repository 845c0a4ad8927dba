//! # Terracanvas Parser
//!
//! Parser for the subset of the infrastructure configuration language that
//! Terracanvas reads and writes. The parser turns source text into a
//! normalized [`Configuration`]: blocks grouped by section, with every
//! attribute value expressed as plain data.
//!
//! Full grammar coverage is not a goal. Supported constructs are blocks with
//! labels, attributes, string/number/boolean/null literals, lists, objects,
//! nested and `dynamic` blocks, and bare expressions (stored as `"${expr}"`).
//!
//! ## Usage
//!
//! ```
//! # use terracanvas_parser::{parse, ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         resource "google_storage_bucket" "logs" {
//!           location = var.region
//!         }
//!     "#;
//!
//!     let configuration = parse(source)?;
//!     assert_eq!(configuration.resource["google_storage_bucket"]["logs"]["location"], "${var.region}");
//!     Ok(())
//! }
//! ```

mod error;
mod parser;
mod span;

pub use error::ParseError;
pub use span::Span;

use log::{debug, trace};

use terracanvas_core::{configuration::Configuration, kind::NodeKind};

/// Parse configuration source text into normalized blocks.
///
/// Top-level blocks other than `resource`, `data`, `module`, `variable` and
/// `output` (for example `terraform`, `provider` or `locals`) are skipped.
///
/// # Errors
///
/// Returns a [`ParseError`] for syntax errors and for blocks with the wrong
/// number of labels.
pub fn parse(source: &str) -> Result<Configuration, ParseError> {
    let blocks = parser::parse_blocks(source)?;
    let mut configuration = Configuration::new();

    for block in blocks {
        let Ok(kind) = block.keyword.parse::<NodeKind>() else {
            debug!(keyword = block.keyword; "Skipping unsupported top-level block");
            continue;
        };

        let (resource_type, name) = match (kind.has_resource_type(), block.labels.as_slice()) {
            (true, [resource_type, name]) => (Some(resource_type.as_str()), name.as_str()),
            (false, [name]) => (None, name.as_str()),
            (typed, labels) => {
                let (expected, help) = if typed {
                    (2, format!("write `{kind} \"<type>\" \"<name>\" {{ ... }}`"))
                } else {
                    (1, format!("write `{kind} \"<name>\" {{ ... }}`"))
                };
                return Err(ParseError::new(
                    format!(
                        "`{kind}` block takes {expected} label(s), found {}",
                        labels.len()
                    ),
                    block.span,
                )
                .with_help(help));
            }
        };
        trace!(kind:% = kind, name = name; "Parsed block");
        configuration.insert(kind, resource_type, name, block.body);
    }

    Ok(configuration)
}

/// Parse several named source files and merge them into one configuration.
///
/// # Errors
///
/// Returns the first [`ParseError`], tagged with the name of its file.
pub fn parse_files<'a, I>(files: I) -> Result<Configuration, ParseError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut configuration = Configuration::new();
    for (name, source) in files {
        debug!(file = name; "Parsing configuration file");
        let parsed = parse(source).map_err(|err| err.with_file(name))?;
        configuration.merge(parsed);
    }
    Ok(configuration)
}
