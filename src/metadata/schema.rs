//! Statically declared capture schemas.
//!
//! # Responsibilities
//! - Declare which fields of a metadata type path variables may write to
//! - Build the per-type descriptor table used at registration
//! - Reject duplicate variable names (a configuration mistake)
//!
//! # Design Decisions
//! - Schemas are explicit constants, not derived by runtime introspection;
//!   the `capture_fields!` macro generates the impl for plain structs
//! - The descriptor table is built once per distinct metadata type and
//!   cached by the router that owns it

use std::collections::HashMap;

use crate::metadata::field::{FieldKind, FieldValue};
use crate::routing::error::RouteError;

/// Declares one capturable field on a metadata type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Variable name as written between brackets in route patterns.
    pub name: &'static str,

    /// Parser and dedup identity for captures into this field.
    pub kind: FieldKind,
}

/// A metadata type that route patterns can capture variables into.
///
/// The registered instance acts as the template: every request gets a clone
/// of it with only the captured fields overwritten. `Default` supplies the
/// instance handed to handlers on routes registered without a template.
pub trait Metadata: Default + Clone + Send + Sync + 'static {
    /// Capture schema, in declaration order.
    const FIELDS: &'static [FieldSpec];

    /// Overwrite one declared field with a parsed value.
    ///
    /// Calls with an undeclared name or a value of the wrong kind are
    /// ignored; the router only produces patches that match the schema.
    fn set_field(&mut self, name: &str, value: FieldValue);
}

impl Metadata for () {
    const FIELDS: &'static [FieldSpec] = &[];

    fn set_field(&mut self, _name: &str, _value: FieldValue) {}
}

/// Implements [`Metadata`] for a struct from a variable-name-to-field map.
///
/// ```
/// use pathmux::capture_fields;
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct UserMeta {
///     id: u64,
///     name: String,
/// }
///
/// capture_fields!(UserMeta {
///     "id" => id as U64,
///     "name" => name as Str,
/// });
/// ```
#[macro_export]
macro_rules! capture_fields {
    ($ty:ty { $($name:literal => $field:ident as $kind:ident),* $(,)? }) => {
        impl $crate::metadata::Metadata for $ty {
            const FIELDS: &'static [$crate::metadata::FieldSpec] = &[
                $($crate::metadata::FieldSpec {
                    name: $name,
                    kind: $crate::metadata::FieldKind::$kind,
                },)*
            ];

            fn set_field(&mut self, name: &str, value: $crate::metadata::FieldValue) {
                match (name, value) {
                    $(($name, $crate::metadata::FieldValue::$kind(v)) => self.$field = v,)*
                    _ => {}
                }
            }
        }
    };
}

/// Variable descriptor table for one metadata type.
///
/// Maps a variable name to its [`FieldSpec`]. Built once per distinct type
/// at registration time and cached by the owning router.
#[derive(Debug)]
pub struct FieldTable {
    fields: HashMap<&'static str, FieldSpec>,
}

impl FieldTable {
    /// Build the table from a type's declared schema.
    ///
    /// Within one metadata type variable names must be unique; a collision
    /// is a fatal configuration error.
    pub fn build<M: Metadata>() -> Result<FieldTable, RouteError> {
        let mut fields = HashMap::with_capacity(M::FIELDS.len());
        for spec in M::FIELDS {
            if fields.insert(spec.name, *spec).is_some() {
                return Err(RouteError::DuplicateVariable(spec.name.to_string()));
            }
        }
        Ok(FieldTable { fields })
    }

    /// Look up the descriptor for a variable name.
    pub fn lookup(&self, name: &str) -> Option<FieldSpec> {
        self.fields.get(name).copied()
    }
}
