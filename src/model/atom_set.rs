//! Ordered atom universe for a single inference run.
//!
//! An [`AtomSet`] owns its atoms and assigns each one a stable identity (its index). Atoms are
//! grouped into *sites*: a site is one physical atom of the input geometry, and every atom
//! belonging to a site is an alternative placement of it. Plain geometries have exactly one
//! atom per site; [`AtomSet::with_sign_ambiguity`] expands each site into its mirror images.

use super::atom::Atom;
use super::types::{AtomId, Element, Point};

/// Atoms of one geometry, indexed by identity and grouped into sites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomSet {
    atoms: Vec<Atom>,
    site_of: Vec<usize>,
    site_count: usize,
}

impl AtomSet {
    /// Builds a set in which every atom is its own site.
    pub fn new(atoms: Vec<Atom>) -> Self {
        let site_count = atoms.len();
        Self {
            site_of: (0..site_count).collect(),
            atoms,
            site_count,
        }
    }

    /// Returns `true` when the set holds no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Number of atoms (identities), counting every placement of every site.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Number of physical sites.
    pub fn site_count(&self) -> usize {
        self.site_count
    }

    /// Returns the atom with the given identity.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn atom(&self, id: AtomId) -> &Atom {
        &self.atoms[id]
    }

    /// Returns the site that the atom with identity `id` occupies.
    pub fn site_of(&self, id: AtomId) -> usize {
        self.site_of[id]
    }

    /// Iterates the atoms in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    /// All atoms as a slice, indexed by identity.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Identities of every placement belonging to `site`, in placement order.
    pub fn placements(&self, site: usize) -> impl Iterator<Item = AtomId> + '_ {
        self.site_of
            .iter()
            .enumerate()
            .filter(move |&(_, &s)| s == site)
            .map(|(id, _)| id)
    }

    /// Identity of the first (as-given) placement of `site`.
    pub fn primary_placement(&self, site: usize) -> Option<AtomId> {
        self.placements(site).next()
    }

    /// Distinct elements present in the set.
    pub fn elements(&self) -> Vec<Element> {
        let mut elements: Vec<Element> = self.atoms.iter().map(|a| a.element).collect();
        elements.sort();
        elements.dedup();
        elements
    }

    /// Geometric center of the primary placements of all sites.
    ///
    /// # Returns
    ///
    /// `None` for an empty set.
    pub fn centroid(&self) -> Option<Point> {
        if self.site_count == 0 {
            return None;
        }
        let sum = (0..self.site_count)
            .filter_map(|site| self.primary_placement(site))
            .fold(nalgebra::Vector3::zeros(), |acc, id| acc + self.atoms[id].pos.coords);
        Some(Point::from(sum / self.site_count as f64))
    }

    /// Selects the primary placement of the site farthest from the centroid.
    ///
    /// Growing molecules from a peripheral atom keeps the early branching factor small. Ties
    /// resolve to the lowest site index.
    pub fn farthest_atom(&self) -> Option<AtomId> {
        let center = self.centroid()?;
        let mut best: Option<(AtomId, f64)> = None;
        for site in 0..self.site_count {
            let Some(id) = self.primary_placement(site) else {
                continue;
            };
            let d = nalgebra::distance_squared(&self.atoms[id].pos, &center);
            if best.is_none_or(|(_, best_d)| d > best_d) {
                best = Some((id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Returns a new set keeping only the primary placements of the atoms accepted by
    /// `keep`, renumbered from zero.
    pub fn retain_primary<F>(&self, mut keep: F) -> AtomSet
    where
        F: FnMut(&Atom) -> bool,
    {
        let atoms = (0..self.site_count)
            .filter_map(|site| self.primary_placement(site))
            .map(|id| self.atoms[id])
            .filter(|atom| keep(atom))
            .collect();
        AtomSet::new(atoms)
    }

    /// Expands every site into all of its coordinate sign variants.
    ///
    /// Each site keeps its as-given placement first, so seeding from a primary placement
    /// pins the overall orientation of the candidate structures.
    pub fn with_sign_ambiguity(&self) -> AtomSet {
        let mut atoms = Vec::new();
        let mut site_of = Vec::new();
        for site in 0..self.site_count {
            let Some(id) = self.primary_placement(site) else {
                continue;
            };
            for variant in self.atoms[id].sign_variants() {
                atoms.push(variant);
                site_of.push(site);
            }
        }
        Self {
            atoms,
            site_of,
            site_count: self.site_count,
        }
    }
}

impl FromIterator<Atom> for AtomSet {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        AtomSet::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> AtomSet {
        AtomSet::new(vec![
            Atom::new(Element::O, Point::new(0.0, 0.0, 0.1)),
            Atom::new(Element::H, Point::new(0.76, 0.59, 0.0)),
            Atom::new(Element::H, Point::new(-0.76, 0.59, 0.0)),
        ])
    }

    #[test]
    fn new_assigns_one_site_per_atom() {
        let set = water();
        assert_eq!(set.len(), 3);
        assert_eq!(set.site_count(), 3);
        for id in 0..3 {
            assert_eq!(set.site_of(id), id);
        }
    }

    #[test]
    fn empty_set_has_no_centroid_or_seed() {
        let set = AtomSet::default();
        assert!(set.is_empty());
        assert!(set.centroid().is_none());
        assert!(set.farthest_atom().is_none());
    }

    #[test]
    fn farthest_atom_prefers_peripheral_site() {
        let set = AtomSet::new(vec![
            Atom::new(Element::C, Point::new(0.0, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(1.5, 0.0, 0.0)),
            Atom::new(Element::O, Point::new(4.0, 0.0, 0.0)),
        ]);
        assert_eq!(set.farthest_atom(), Some(2));
    }

    #[test]
    fn retain_primary_strips_hydrogens_and_renumbers() {
        let heavy = water().retain_primary(|a| a.element.is_heavy_atom());
        assert_eq!(heavy.len(), 1);
        assert_eq!(heavy.atom(0).element, Element::O);
        assert_eq!(heavy.site_of(0), 0);
    }

    #[test]
    fn sign_ambiguity_groups_variants_by_site() {
        let expanded = water().with_sign_ambiguity();

        assert_eq!(expanded.site_count(), 3);
        // O has a zero x and y: flips only along z. Each H lies in the z = 0 plane.
        assert_eq!(expanded.placements(0).count(), 2);
        assert_eq!(expanded.placements(1).count(), 4);
        assert_eq!(expanded.placements(2).count(), 4);
        assert_eq!(expanded.len(), 10);

        let primary = expanded.primary_placement(1).unwrap();
        assert_eq!(expanded.atom(primary).pos, Point::new(0.76, 0.59, 0.0));
    }

    #[test]
    fn elements_are_sorted_and_unique() {
        assert_eq!(water().elements(), vec![Element::H, Element::O]);
    }
}
