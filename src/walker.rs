//! Schema walk: field tree to flag definitions
//!
//! The walk is a depth-first traversal of a schema's [`Field`] tree. Scalar
//! leaves become [`FlagDefinition`]s named by joining their ancestors' names
//! with `.`; nested fields only contribute a name segment (or nothing, when
//! unnamed).

use crate::config::{Field, FieldKind};
use crate::error::{Error, Result};
use crate::flags::{FlagDefinition, FlagKind};

/// Join a parent prefix and a child name into a dotted key
pub fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Prefix under which a nested field's children live
///
/// Unnamed nested fields flatten into their parent. Both unnamed spellings
/// do this: an empty name and the `"-"` sentinel, which never becomes a
/// `-.` segment.
pub(crate) fn child_prefix(prefix: &str, field: &Field) -> String {
    if field.is_unnamed() {
        prefix.to_string()
    } else {
        join_key(prefix, field.name)
    }
}

/// Walk `fields` under `prefix`, producing one definition per named scalar leaf
///
/// Fails on the first field whose kind cannot be a flag. The walk builds its
/// result before anything is registered, so a failed walk leaves the caller's
/// flag set untouched.
pub fn walk(prefix: &str, fields: &[Field]) -> Result<Vec<FlagDefinition>> {
    let mut definitions = Vec::new();
    walk_into(prefix, fields, &mut definitions)?;
    Ok(definitions)
}

fn walk_into(prefix: &str, fields: &[Field], out: &mut Vec<FlagDefinition>) -> Result<()> {
    for field in fields {
        let kind = match field.kind {
            FieldKind::Nested(children) => {
                walk_into(&child_prefix(prefix, field), &children(), out)?;
                continue;
            }
            _ if field.is_unnamed() => continue,
            FieldKind::Unsupported(type_name) => {
                return Err(Error::UnsupportedFieldKind {
                    field: join_key(prefix, field.name),
                    type_name: type_name.to_string(),
                });
            }
            FieldKind::String => FlagKind::String,
            FieldKind::Bool => FlagKind::Bool,
            FieldKind::Int => FlagKind::Int,
        };

        out.push(
            FlagDefinition::new(join_key(prefix, field.name), kind)
                .description(field.description)
                .short(field.short),
        );
    }
    Ok(())
}
