//! Registration-time error definitions.

use thiserror::Error;

/// Errors raised while registering a route.
///
/// All of these represent configuration mistakes, not runtime conditions;
/// callers are expected to propagate them out of startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// Route patterns are absolute paths.
    #[error("route pattern must start with '/', got '{0}'")]
    MissingLeadingSlash(String),

    /// Only the final segment may be empty (the directory marker).
    #[error("route pattern '{0}' contains an empty segment")]
    EmptySegment(String),

    /// '}' without a matching '{', or '{' without a closing '}'.
    #[error("segment '{0}' has unbalanced braces")]
    UnbalancedBraces(String),

    /// '{' inside a bracketed variable.
    #[error("segment '{0}' has nested braces")]
    NestedBraces(String),

    /// A segment captures at most one variable.
    #[error("segment '{0}' declares more than one variable")]
    MultipleVariables(String),

    /// The pattern captures variables but no metadata template was supplied.
    #[error("pattern '{0}' captures variables but has no metadata template")]
    MissingTemplate(String),

    /// The variable name does not appear in the metadata type's schema.
    #[error("metadata schema has no field named '{0}'")]
    UnknownVariable(String),

    /// The metadata type declares the same variable name twice.
    #[error("metadata schema declares field '{0}' more than once")]
    DuplicateVariable(String),
}
