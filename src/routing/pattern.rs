//! Route pattern tokenization.
//!
//! # Responsibilities
//! - Split a registration pattern into segments on '/'
//! - Classify each segment as literal text or a single bracketed capture
//! - Detect the trailing-slash directory marker
//!
//! # Design Decisions
//! - All syntax errors are rejected here, at registration, never deferred
//! - A capture segment is literal prefix + `{name}` + literal suffix; at
//!   most one variable per segment, no nesting

use crate::routing::error::RouteError;

/// One parsed segment of a registration pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matched by exact text.
    Literal(String),

    /// Captures the text between `prefix` and `suffix` into the variable.
    Capture {
        prefix: String,
        name: String,
        suffix: String,
    },
}

/// A registration pattern split into segments.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedPattern {
    pub segments: Vec<Segment>,

    /// Set when the pattern ends in '/'; the terminal node then serves as a
    /// fallback for paths below it.
    pub directory: bool,
}

/// Tokenize a registration pattern.
pub fn parse(pattern: &str) -> Result<ParsedPattern, RouteError> {
    let Some(rest) = pattern.strip_prefix('/') else {
        return Err(RouteError::MissingLeadingSlash(pattern.to_string()));
    };

    let mut parts: Vec<&str> = rest.split('/').collect();
    // A trailing empty segment marks a directory route instead of a node.
    let directory = parts.last() == Some(&"");
    if directory {
        parts.pop();
    }

    let mut segments = Vec::with_capacity(parts.len());
    for part in parts {
        if part.is_empty() {
            return Err(RouteError::EmptySegment(pattern.to_string()));
        }
        segments.push(parse_segment(part)?);
    }
    Ok(ParsedPattern {
        segments,
        directory,
    })
}

fn parse_segment(segment: &str) -> Result<Segment, RouteError> {
    let Some((prefix, rest)) = segment.split_once('{') else {
        if segment.contains('}') {
            return Err(RouteError::UnbalancedBraces(segment.to_string()));
        }
        return Ok(Segment::Literal(segment.to_string()));
    };
    if prefix.contains('}') {
        return Err(RouteError::UnbalancedBraces(segment.to_string()));
    }
    let Some((name, suffix)) = rest.split_once('}') else {
        return Err(RouteError::UnbalancedBraces(segment.to_string()));
    };
    if name.contains('{') {
        return Err(RouteError::NestedBraces(segment.to_string()));
    }
    if suffix.contains('{') {
        return Err(RouteError::MultipleVariables(segment.to_string()));
    }
    if suffix.contains('}') {
        return Err(RouteError::UnbalancedBraces(segment.to_string()));
    }
    Ok(Segment::Capture {
        prefix: prefix.to_string(),
        name: name.to_string(),
        suffix: suffix.to_string(),
    })
}
