//! Partially grown molecules and their canonical signatures.
//!
//! A [`PartialMolecule`] is a set of atom identities together with the bonds implied between
//! them. Because the implied bonds are a pure function of the member set, two molecules with
//! the same members are the same molecule no matter which growth path produced them; equality,
//! ordering, and hashing therefore only look at the [`Signature`].

use super::atom::Atom;
use super::atom_set::AtomSet;
use super::graph::ConnectivityGraph;
use super::types::{AtomId, Element};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Sorted, duplicate-free list of atom identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Signature(Vec<AtomId>);

impl Signature {
    /// Canonicalizes an arbitrary collection of identities.
    pub fn new(ids: impl IntoIterator<Item = AtomId>) -> Self {
        let mut ids: Vec<AtomId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    pub fn ids(&self) -> &[AtomId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: AtomId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Returns the signature extended by one identity.
    pub fn with(&self, id: AtomId) -> Self {
        let mut ids = self.0.clone();
        if let Err(pos) = ids.binary_search(&id) {
            ids.insert(pos, id);
        }
        Self(ids)
    }
}

/// Atom subset grown during enumeration, with the covalent bonds implied by its geometry.
#[derive(Debug, Clone)]
pub struct PartialMolecule {
    signature: Signature,
    bonds: Vec<(AtomId, AtomId)>,
}

impl PartialMolecule {
    /// Starts a molecule from a single seed atom.
    pub fn seed(id: AtomId) -> Self {
        Self {
            signature: Signature::new([id]),
            bonds: Vec::new(),
        }
    }

    /// Assembles a molecule from members and bonds, canonicalizing both.
    pub fn from_parts(signature: Signature, bonds: impl IntoIterator<Item = (AtomId, AtomId)>) -> Self {
        let mut bonds: Vec<(AtomId, AtomId)> = bonds
            .into_iter()
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .collect();
        bonds.sort_unstable();
        bonds.dedup();
        Self { signature, bonds }
    }

    /// Returns a successor molecule with `id` added and bonded to every atom in `partners`.
    ///
    /// Molecules only ever grow; the receiver is left untouched.
    pub fn extended(&self, id: AtomId, partners: &[AtomId]) -> Self {
        Self::from_parts(
            self.signature.with(id),
            self.bonds
                .iter()
                .copied()
                .chain(partners.iter().map(|&p| (p, id))),
        )
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Member identities in ascending order.
    pub fn members(&self) -> &[AtomId] {
        self.signature.ids()
    }

    pub fn contains(&self, id: AtomId) -> bool {
        self.signature.contains(id)
    }

    pub fn atom_count(&self) -> usize {
        self.signature.len()
    }

    /// Canonical bonds (`a < b`) in ascending order.
    pub fn bonds(&self) -> &[(AtomId, AtomId)] {
        &self.bonds
    }

    /// Identities bonded to `id`.
    pub fn neighbors(&self, id: AtomId) -> impl Iterator<Item = AtomId> + '_ {
        self.bonds.iter().filter_map(move |&(a, b)| {
            if a == id {
                Some(b)
            } else if b == id {
                Some(a)
            } else {
                None
            }
        })
    }

    /// Number of bonds incident to `id`.
    pub fn degree(&self, id: AtomId) -> usize {
        self.neighbors(id).count()
    }

    /// Copies the member atoms out of the owning set, in member order.
    pub fn atoms(&self, set: &AtomSet) -> Vec<Atom> {
        self.members().iter().map(|&id| *set.atom(id)).collect()
    }

    /// Elements of the members, in member order.
    pub fn elements(&self, set: &AtomSet) -> Vec<Element> {
        self.members().iter().map(|&id| set.atom(id).element).collect()
    }

    /// Builds the 0/1 adjacency matrix over the members.
    ///
    /// Row and column `k` correspond to `self.members()[k]`.
    pub fn connectivity(&self) -> ConnectivityGraph {
        let members = self.members();
        let mut graph = ConnectivityGraph::new(members.len());
        for &(a, b) in &self.bonds {
            if let (Ok(i), Ok(j)) = (members.binary_search(&a), members.binary_search(&b)) {
                graph.connect(i, j);
            }
        }
        graph
    }
}

impl PartialEq for PartialMolecule {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

impl Eq for PartialMolecule {}

impl Hash for PartialMolecule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
    }
}

impl PartialOrd for PartialMolecule {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PartialMolecule {
    fn cmp(&self, other: &Self) -> Ordering {
        self.signature.cmp(&other.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn signature_is_sorted_and_deduplicated() {
        let sig = Signature::new([4, 1, 3, 1]);
        assert_eq!(sig.ids(), &[1, 3, 4]);
        assert!(sig.contains(3));
        assert!(!sig.contains(2));
        assert_eq!(sig.with(2).ids(), &[1, 2, 3, 4]);
        assert_eq!(sig.with(3), sig);
    }

    #[test]
    fn extended_adds_member_and_canonical_bonds() {
        let mol = PartialMolecule::seed(5).extended(2, &[5]).extended(7, &[2, 5]);

        assert_eq!(mol.members(), &[2, 5, 7]);
        assert_eq!(mol.bonds(), &[(2, 5), (2, 7), (5, 7)]);
        assert_eq!(mol.degree(2), 2);
        let mut neighbors: Vec<_> = mol.neighbors(7).collect();
        neighbors.sort();
        assert_eq!(neighbors, vec![2, 5]);
    }

    #[test]
    fn molecules_with_equal_members_collapse_in_sets() {
        let a = PartialMolecule::seed(0).extended(1, &[0]).extended(2, &[1]);
        let b = PartialMolecule::seed(0).extended(2, &[]).extended(1, &[0, 2]);

        let set: BTreeSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn connectivity_uses_member_local_indices() {
        let mol = PartialMolecule::seed(10).extended(20, &[10]).extended(30, &[20]);
        let graph = mol.connectivity();

        assert_eq!(graph.size(), 3);
        assert!(graph.is_connected(0, 1));
        assert!(graph.is_connected(1, 2));
        assert!(!graph.is_connected(0, 2));
        assert_eq!(graph.degree(1), 2);
    }
}
