//! Metadata templates and per-request binding.
//!
//! A route registered with a metadata instance keeps that instance as an
//! immutable prototype. Matching produces an ordered list of capture
//! patches; binding clones the prototype and overwrites only the captured
//! fields, so defaults survive for everything the path did not mention and
//! no storage is ever shared between requests.

use std::any::Any;

use crate::metadata::field::FieldValue;
use crate::metadata::schema::Metadata;

/// One captured variable, produced during matching and applied to a
/// per-request clone of the template.
///
/// Patches are ordered root-to-leaf along the matched path; a variable
/// captured twice is overwritten in order, so the deepest capture wins.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturePatch {
    pub field: &'static str,
    pub value: FieldValue,
}

/// Object-safe view of a metadata instance, so the trie can hold templates
/// of different concrete types.
trait ErasedTemplate: Send + Sync {
    fn clone_instance(&self) -> Box<dyn ErasedTemplate>;
    fn set_field(&mut self, name: &str, value: FieldValue);
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<M: Metadata> ErasedTemplate for M {
    fn clone_instance(&self) -> Box<dyn ErasedTemplate> {
        Box::new(self.clone())
    }

    fn set_field(&mut self, name: &str, value: FieldValue) {
        Metadata::set_field(self, name, value);
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// Immutable prototype of a route's metadata, captured at registration.
pub struct MetadataTemplate {
    prototype: Box<dyn ErasedTemplate>,
}

impl MetadataTemplate {
    pub(crate) fn new<M: Metadata>(prototype: M) -> Self {
        MetadataTemplate {
            prototype: Box::new(prototype),
        }
    }

    /// Clone the prototype and apply capture patches in path order.
    ///
    /// The template itself is never mutated; the returned instance is owned
    /// by the request that triggered the bind.
    pub fn bind(&self, patches: Vec<CapturePatch>) -> Box<dyn Any + Send> {
        let mut instance = self.prototype.clone_instance();
        for patch in patches {
            instance.set_field(patch.field, patch.value);
        }
        instance.into_any()
    }
}

impl std::fmt::Debug for MetadataTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataTemplate").finish_non_exhaustive()
    }
}
