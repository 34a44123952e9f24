//! Typed metadata capture: field kinds, static schemas, templates.
//!
//! Route patterns capture path variables into fields of a metadata struct.
//! The struct declares its capturable fields up front (see
//! [`capture_fields!`](crate::capture_fields)); the router validates
//! variable names against that schema at registration and, per request,
//! clones the registered instance and overwrites only the captured fields.

pub mod field;
pub mod schema;
pub mod template;

pub use field::{FieldKind, FieldValue};
pub use schema::{FieldSpec, FieldTable, Metadata};
pub use template::{CapturePatch, MetadataTemplate};
