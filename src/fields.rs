//! Field-selection specs for the `fields=` query parameter.
//!
//! YouTrack returns only the attributes named in `fields=`, using a nested
//! comma syntax such as `id,name,value(id,minutes,presentation)`. Every
//! entity declares the selection matching the attributes its struct can hold,
//! so responses always deserialize without surprises.

use std::fmt;

/// An ordered tree of field names.
///
/// Duplicate names merge recursively, which is how the selections of a
/// polymorphic family (e.g. all custom-field variants) collapse into one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    entries: Vec<(String, FieldSpec)>,
}

impl FieldSpec {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flat selection of leaf names.
    pub fn leaves<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = Self::new();
        for name in names {
            spec.insert(name.into(), FieldSpec::new());
        }
        spec
    }

    /// Adds a leaf name.
    pub fn leaf(mut self, name: impl Into<String>) -> Self {
        self.insert(name.into(), FieldSpec::new());
        self
    }

    /// Adds a nested selection under `name`, merging with any existing entry.
    pub fn nested(mut self, name: impl Into<String>, sub: FieldSpec) -> Self {
        self.insert(name.into(), sub);
        self
    }

    /// Deep-merges `other` into this selection.
    ///
    /// New names append in order of first appearance; existing names merge
    /// their subtrees recursively.
    pub fn merge(&mut self, other: &FieldSpec) {
        for (name, sub) in &other.entries {
            self.insert(name.clone(), sub.clone());
        }
    }

    /// Merges a sequence of selections into one, in order.
    pub fn union<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = FieldSpec>,
    {
        let mut merged = Self::new();
        for spec in specs {
            merged.merge(&spec);
        }
        merged
    }

    /// Returns `true` when the selection names no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: String, sub: FieldSpec) {
        match self.entries.iter().position(|(n, _)| *n == name) {
            Some(index) => self.entries[index].1.merge(&sub),
            None => self.entries.push((name, sub)),
        }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, sub)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            f.write_str(name)?;
            if !sub.is_empty() {
                write!(f, "({sub})")?;
            }
        }
        Ok(())
    }
}

/// Declares which fields the client requests when fetching an entity.
///
/// Implemented by every entity; custom read models implement it to fetch a
/// narrower projection through [`crate::Client::get_issues_as`].
pub trait FieldSelection {
    /// The selection covering every attribute the type can deserialize.
    fn fields() -> FieldSpec;
}
