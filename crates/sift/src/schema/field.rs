//! Field references and their resolution against a header.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::header::Header;

/// A reference to one or more columns.
///
/// Deserializes untagged, so `3`, `"id"` and `["a", 1]` are all valid
/// references in a JSON rule set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldRef {
    /// Zero-based column position.
    Index(usize),
    /// Header name, normalized like the header cells before lookup.
    Name(String),
    /// Several references treated together (composite keys, bulk checks).
    Group(Vec<FieldRef>),
}

impl FieldRef {
    /// Build a group from anything convertible to field references.
    pub fn group<I, T>(members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FieldRef>,
    {
        FieldRef::Group(members.into_iter().map(Into::into).collect())
    }

    /// Leaf references in order, with groups flattened.
    pub fn leaves(&self) -> Vec<&FieldRef> {
        match self {
            FieldRef::Group(members) => members.iter().flat_map(|m| m.leaves()).collect(),
            leaf => vec![leaf],
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Index(i) => write!(f, "#{}", i),
            FieldRef::Name(name) => f.write_str(name),
            FieldRef::Group(members) => {
                let parts: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

impl From<usize> for FieldRef {
    fn from(index: usize) -> Self {
        FieldRef::Index(index)
    }
}

impl From<&str> for FieldRef {
    fn from(name: &str) -> Self {
        FieldRef::Name(name.to_string())
    }
}

impl From<String> for FieldRef {
    fn from(name: String) -> Self {
        FieldRef::Name(name)
    }
}

impl<T: Into<FieldRef>> From<Vec<T>> for FieldRef {
    fn from(members: Vec<T>) -> Self {
        FieldRef::group(members)
    }
}

/// Result of resolving a [`FieldRef`], mirroring its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Single(Option<usize>),
    Group(Vec<Resolved>),
}

impl Resolved {
    /// The index of a single reference. Groups have no single index.
    pub fn index(&self) -> Option<usize> {
        match self {
            Resolved::Single(index) => *index,
            Resolved::Group(_) => None,
        }
    }

    /// All leaf results, groups flattened.
    pub fn indices(&self) -> Vec<Option<usize>> {
        match self {
            Resolved::Single(index) => vec![*index],
            Resolved::Group(members) => members.iter().flat_map(|m| m.indices()).collect(),
        }
    }

    /// True when every leaf resolved.
    pub fn is_complete(&self) -> bool {
        self.indices().iter().all(Option::is_some)
    }
}

/// Resolves field references against a processed header.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    header: &'a Header,
}

impl<'a> FieldResolver<'a> {
    pub fn new(header: &'a Header) -> Self {
        Self { header }
    }

    /// Resolve a reference. Unknown names resolve to `None`; whether that
    /// matters is up to the caller.
    pub fn resolve(&self, field: &FieldRef) -> Resolved {
        match field {
            FieldRef::Index(i) => Resolved::Single(Some(*i)),
            FieldRef::Name(name) => Resolved::Single(self.header.position(name)),
            FieldRef::Group(members) => {
                Resolved::Group(members.iter().map(|m| self.resolve(m)).collect())
            }
        }
    }

    /// Leaf references that do not resolve.
    pub fn missing<'f>(&self, field: &'f FieldRef) -> Vec<&'f FieldRef> {
        field
            .leaves()
            .into_iter()
            .filter(|leaf| self.resolve(leaf).index().is_none())
            .collect()
    }
}
