//! Turns a selection of schema paths into Terraform `variable` / `output`
//! declarations.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::path::SchemaPath;
use crate::resolve::resolve;
use crate::schema::{Attribute, Block};

pub const VARIABLES_HEADER: &str = "# Terraform Variables Generated from Selected Arguments\n\n";
pub const OUTPUTS_HEADER: &str = "# Terraform Outputs Generated from Selected Attributes\n\n";
pub const NO_VARIABLES: &str = "# No selected arguments available for variable conversion\n";
pub const NO_OUTPUTS: &str = "# No selected computed attributes available for output conversion\n";

/// What to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRequest<'a> {
    /// One `variable` per selected required/optional attribute.
    Arguments,
    /// One `output` per selected computed attribute, referencing
    /// `<entity>.<instance>.<path>`. `instance` must not be blank.
    Attributes { entity: &'a str, instance: &'a str },
}

/// Paths whose every strict prefix is selected too, in ascending order.
pub fn eligible_paths(selected: &[SchemaPath]) -> Vec<SchemaPath> {
    let set: BTreeSet<&SchemaPath> = selected.iter().collect();
    set.iter()
        .filter(|path| path.strict_prefixes().all(|prefix| set.contains(&prefix)))
        .map(|path| (*path).clone())
        .collect()
}

pub fn export(selected: &[SchemaPath], root: &Block, request: ExportRequest<'_>) -> String {
    let mut out = String::new();
    let mut included = 0;

    match request {
        ExportRequest::Arguments => out.push_str(VARIABLES_HEADER),
        ExportRequest::Attributes { .. } => out.push_str(OUTPUTS_HEADER),
    }

    for path in eligible_paths(selected) {
        let attribute = match resolve(root, path.segments()) {
            Ok(attribute) => attribute,
            Err(e) => {
                log::debug!("Skipping '{}' during export: {}", path, e);
                continue;
            }
        };

        let written = match request {
            ExportRequest::Arguments => write_variable(&mut out, &path, attribute),
            ExportRequest::Attributes { entity, instance } => {
                write_output(&mut out, &path, attribute, entity, instance)
            }
        };
        if written {
            included += 1;
        }
    }

    if included == 0 {
        match request {
            ExportRequest::Arguments => out.push_str(NO_VARIABLES),
            ExportRequest::Attributes { .. } => out.push_str(NO_OUTPUTS),
        }
    }

    log::info!("Exported {} declarations", included);
    out
}

fn write_variable(out: &mut String, path: &SchemaPath, attribute: &Attribute) -> bool {
    if !(attribute.required || attribute.optional) {
        return false;
    }

    let name = path.flat_name();
    let description = match attribute.description() {
        Some(description) => description.to_string(),
        None if attribute.required => format!("Required argument for {}", name),
        None => format!("Optional argument for {}", name),
    };

    let _ = writeln!(out, "variable \"{}\" {{", name);
    let _ = writeln!(out, "  type = {}", attribute.attr_type.hcl());
    let _ = writeln!(out, "  description = \"{}\"", escape(&description));
    if !attribute.required {
        out.push_str("  default = null\n");
    }
    out.push_str("}\n\n");
    true
}

fn write_output(
    out: &mut String,
    path: &SchemaPath,
    attribute: &Attribute,
    entity: &str,
    instance: &str,
) -> bool {
    if !attribute.computed {
        return false;
    }

    let name = path.flat_name();
    if attribute.attr_type.is_complex() {
        let _ = writeln!(out, "# {} structure:", name);
        let _ = writeln!(out, "# {}", attribute.attr_type.hcl());
    }

    let _ = writeln!(out, "output \"{}\" {{", name);
    let _ = writeln!(out, "  value = {}.{}.{}", entity, instance, path.dotted());
    if let Some(description) = attribute.description() {
        let _ = writeln!(out, "  description = \"{}\"", escape(description));
    }
    if attribute.sensitive {
        out.push_str("  sensitive = true\n");
    }
    out.push_str("}\n\n");
    true
}

/// Quoted-string escaping; `${` and `%{` are doubled so descriptions stay
/// literal instead of becoming template sequences.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' | '%' if chars.peek() == Some(&'{') => {
                escaped.push(c);
                escaped.push(c);
            }
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}
