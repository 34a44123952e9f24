//! Path variable value kinds and parsing.
//!
//! # Responsibilities
//! - Enumerate the capturable field kinds (string + integer widths)
//! - Parse captured segment text into typed values
//! - Enforce strict base-10 bounds for the destination width
//!
//! # Design Decisions
//! - A parse failure returns `None`, never an error: during matching it
//!   only disqualifies the matcher that attempted the capture
//! - String captures accept the text verbatim, including the empty string

/// Kind of a capturable metadata field.
///
/// The kind determines both the parser applied to captured text and the
/// dedup identity of structurally equal pattern matchers (signedness and
/// width included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Str,
    U8,
    U16,
    U32,
    U64,
    Usize,
    I8,
    I16,
    I32,
    I64,
    Isize,
}

/// A parsed path variable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Str(String),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
}

impl FieldKind {
    /// Parse captured segment text into a value of this kind.
    ///
    /// Integer kinds parse base-10 with bounds checking for the destination
    /// width; out-of-range or non-numeric text yields `None`.
    pub fn parse(self, text: &str) -> Option<FieldValue> {
        match self {
            FieldKind::Str => Some(FieldValue::Str(text.to_owned())),
            FieldKind::U8 => text.parse().ok().map(FieldValue::U8),
            FieldKind::U16 => text.parse().ok().map(FieldValue::U16),
            FieldKind::U32 => text.parse().ok().map(FieldValue::U32),
            FieldKind::U64 => text.parse().ok().map(FieldValue::U64),
            FieldKind::Usize => text.parse().ok().map(FieldValue::Usize),
            FieldKind::I8 => text.parse().ok().map(FieldValue::I8),
            FieldKind::I16 => text.parse().ok().map(FieldValue::I16),
            FieldKind::I32 => text.parse().ok().map(FieldValue::I32),
            FieldKind::I64 => text.parse().ok().map(FieldValue::I64),
            FieldKind::Isize => text.parse().ok().map(FieldValue::Isize),
        }
    }
}
