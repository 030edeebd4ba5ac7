//! Named input geometry handed to the batch pipeline.

use super::atom::Atom;
use super::atom_set::AtomSet;

/// One molecule's raw coordinates, as read from an XYZ block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    /// Label used in logs, usually the file stem.
    pub name: String,
    /// Free-text comment line of the XYZ block.
    pub comment: String,
    pub atoms: AtomSet,
}

impl Geometry {
    pub fn new(name: impl Into<String>, atoms: impl IntoIterator<Item = Atom>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            atoms: atoms.into_iter().collect(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}
