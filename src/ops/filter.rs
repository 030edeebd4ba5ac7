//! Geometric and valence predicates that gate every extension of a partial molecule.
//!
//! A [`Filter`] is a pure function of the current molecule and one candidate atom. Active
//! filters are combined by conjunction through a [`FilterSet`]; tunable thresholds live in
//! [`FilterParams`]. The enumerator evaluates filters against the *extended* molecule, so a
//! predicate sees the bonds the candidate would form together with everything already built.

use crate::db;
use crate::model::atom_set::AtomSet;
use crate::model::molecule::PartialMolecule;
use crate::model::types::{AtomId, Point};
use std::fmt;
use std::str::FromStr;

/// One pluggable chemical-validity predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Filter {
    /// Rejects candidates that overlap an included atom.
    MinimumBondLength = 0,
    /// Requires a covalent-length contact with at least one included atom.
    BondTypeLength = 1,
    /// Rejects extensions that push any atom past its largest tabulated valence.
    Valence = 2,
    /// Rejects bond angles below the floor for the centre element and ring size.
    BondAngle = 3,
    /// Rejects planar four-coordinate centres.
    Coplanarity = 4,
}

impl Filter {
    pub const ALL: [Filter; 5] = [
        Filter::MinimumBondLength,
        Filter::BondTypeLength,
        Filter::Valence,
        Filter::BondAngle,
        Filter::Coplanarity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Filter::MinimumBondLength => "minimum-bond-length",
            Filter::BondTypeLength => "bond-type-length",
            Filter::Valence => "valence",
            Filter::BondAngle => "bond-angle",
            Filter::Coplanarity => "coplanarity",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Filter::ALL
            .into_iter()
            .find(|f| f.name() == normalized)
            .ok_or_else(|| format!("Invalid filter: {}", s))
    }
}

/// Conjunction of active filters, stored as a bit mask so it can key caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterSet(u8);

impl FilterSet {
    /// No filters: every extension is accepted.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// The three pre-processing filters: minimum length, bond-type length, and valence.
    pub fn basic() -> Self {
        Self::empty()
            .with(Filter::MinimumBondLength)
            .with(Filter::BondTypeLength)
            .with(Filter::Valence)
    }

    /// All five filters.
    pub fn all() -> Self {
        Filter::ALL.into_iter().collect()
    }

    pub fn with(self, filter: Filter) -> Self {
        Self(self.0 | filter.bit())
    }

    pub fn without(self, filter: Filter) -> Self {
        Self(self.0 & !filter.bit())
    }

    pub fn contains(&self, filter: Filter) -> bool {
        self.0 & filter.bit() != 0
    }

    pub fn is_superset_of(&self, other: &FilterSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Active filters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Filter> + '_ {
        Filter::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Filter> for FilterSet {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        iter.into_iter().fold(FilterSet::empty(), FilterSet::with)
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|filter| filter.name()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Thresholds used by the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    /// Absolute minimum interatomic distance in ångströms.
    pub min_bond_length: f64,
    /// Relative slack applied to tabulated bond lengths when forming bond windows.
    pub bond_length_tolerance: f64,
    /// Normalized triple product below which three bonds around a centre count as coplanar.
    pub coplanarity_threshold: f64,
    /// Angle floor, in degrees, inside three-membered rings.
    pub three_ring_min_angle: f64,
    /// Angle floor, in degrees, inside four-membered rings.
    pub four_ring_min_angle: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_bond_length: 0.6,
            bond_length_tolerance: 0.1,
            coplanarity_threshold: 0.2,
            three_ring_min_angle: 50.0,
            four_ring_min_angle: 80.0,
        }
    }
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_bond_length(mut self, length: f64) -> Self {
        self.min_bond_length = length;
        self
    }

    pub fn bond_length_tolerance(mut self, tolerance: f64) -> Self {
        self.bond_length_tolerance = tolerance;
        self
    }

    pub fn coplanarity_threshold(mut self, threshold: f64) -> Self {
        self.coplanarity_threshold = threshold;
        self
    }
}

/// Everything a filter may inspect when judging one extension.
pub(crate) struct Extension<'a> {
    pub atoms: &'a AtomSet,
    /// Molecule before the candidate is added.
    pub current: &'a PartialMolecule,
    /// Molecule after the candidate is added, including its implied bonds.
    pub extended: &'a PartialMolecule,
    pub candidate: AtomId,
    /// Included atoms the candidate would bond to.
    pub partners: &'a [AtomId],
    /// Placements of sites that are still empty once the candidate is added.
    pub pending: &'a [AtomId],
    /// Whether two atoms of the pool lie inside their pair's bond window.
    pub bondable: &'a dyn Fn(AtomId, AtomId) -> bool,
}

impl Extension<'_> {
    fn pos(&self, id: AtomId) -> &Point {
        &self.atoms.atom(id).pos
    }

    fn bonded(&self, a: AtomId, b: AtomId) -> bool {
        self.extended.neighbors(a).any(|n| n == b)
    }

    /// Whether a later atom could still bond to both `a` and `b`, closing a four-membered ring.
    fn ring_may_close(&self, a: AtomId, b: AtomId) -> bool {
        self.pending
            .iter()
            .any(|&p| (self.bondable)(p, a) && (self.bondable)(p, b))
    }
}

/// Evaluates every active filter; `true` means the extension is acceptable.
pub(crate) fn accepts(filters: FilterSet, params: &FilterParams, ext: &Extension) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::MinimumBondLength => passes_minimum_bond_length(params, ext),
        Filter::BondTypeLength => passes_bond_type_length(ext),
        Filter::Valence => passes_valence(ext),
        Filter::BondAngle => passes_bond_angle(params, ext),
        Filter::Coplanarity => passes_coplanarity(params, ext),
    })
}

fn passes_minimum_bond_length(params: &FilterParams, ext: &Extension) -> bool {
    let min_sq = params.min_bond_length * params.min_bond_length;
    let candidate = ext.pos(ext.candidate);
    ext.current
        .members()
        .iter()
        .all(|&m| nalgebra::distance_squared(candidate, ext.pos(m)) >= min_sq)
}

fn passes_bond_type_length(ext: &Extension) -> bool {
    !ext.partners.is_empty()
}

fn passes_valence(ext: &Extension) -> bool {
    let within = |id: AtomId, bonds: usize| {
        db::element(ext.atoms.atom(id).element)
            .is_some_and(|view| bonds <= view.max_valence() as usize)
    };
    within(ext.candidate, ext.partners.len())
        && ext
            .partners
            .iter()
            .all(|&p| within(p, ext.extended.degree(p)))
}

fn passes_bond_angle(params: &FilterParams, ext: &Extension) -> bool {
    // Angles centred on a partner with the candidate on one arm.
    for &center in ext.partners {
        for other in ext.extended.neighbors(center) {
            if other != ext.candidate
                && !angle_allowed(params, ext, other, center, ext.candidate)
            {
                return false;
            }
        }
    }

    // Angles centred on the candidate itself.
    for (k, &a) in ext.partners.iter().enumerate() {
        for &b in &ext.partners[k + 1..] {
            if !angle_allowed(params, ext, a, ext.candidate, b) {
                return false;
            }
        }
    }

    true
}

fn angle_allowed(
    params: &FilterParams,
    ext: &Extension,
    a: AtomId,
    center: AtomId,
    b: AtomId,
) -> bool {
    let floor = if ext.bonded(a, b) {
        params.three_ring_min_angle
    } else if ext
        .extended
        .neighbors(a)
        .any(|n| n != center && ext.bonded(n, b))
        || ext.ring_may_close(a, b)
    {
        params.four_ring_min_angle
    } else {
        db::element(ext.atoms.atom(center).element)
            .map(|view| view.min_bond_angle())
            .unwrap_or(90.0)
    };

    bond_angle(ext.pos(a), ext.pos(center), ext.pos(b)) >= floor
}

fn passes_coplanarity(params: &FilterParams, ext: &Extension) -> bool {
    std::iter::once(ext.candidate)
        .chain(ext.partners.iter().copied())
        .all(|center| !has_planar_tetracoordination(params, ext, center))
}

/// A centre with four or more neighbours is planar when no neighbour triple spans volume.
///
/// Octahedral and trigonal-bipyramidal centres contain collinear trans pairs, so a single
/// flat triple is not enough to reject them.
fn has_planar_tetracoordination(params: &FilterParams, ext: &Extension, center: AtomId) -> bool {
    let neighbors: Vec<AtomId> = ext.extended.neighbors(center).collect();
    if neighbors.len() < 4 {
        return false;
    }
    let origin = ext.pos(center);
    let units: Vec<_> = neighbors
        .iter()
        .map(|&n| (ext.pos(n) - origin).normalize())
        .collect();

    for i in 0..units.len() {
        for j in (i + 1)..units.len() {
            for k in (j + 1)..units.len() {
                let volume = units[i].dot(&units[j].cross(&units[k])).abs();
                if volume >= params.coplanarity_threshold {
                    return false;
                }
            }
        }
    }
    true
}

/// Angle a–center–b in degrees.
pub fn bond_angle(a: &Point, center: &Point, b: &Point) -> f64 {
    let u = a - center;
    let v = b - center;
    let cos = u.dot(&v) / (u.norm() * v.norm());
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::types::Element;

    fn check(
        filters: FilterSet,
        atoms: &AtomSet,
        current: &PartialMolecule,
        candidate: AtomId,
        partners: &[AtomId],
    ) -> bool {
        let extended = current.extended(candidate, partners);
        let ext = Extension {
            atoms,
            current,
            extended: &extended,
            candidate,
            partners,
            pending: &[],
            bondable: &|_, _| false,
        };
        accepts(filters, &FilterParams::default(), &ext)
    }

    #[test]
    fn filter_set_presets_have_expected_members() {
        assert_eq!(FilterSet::basic().len(), 3);
        assert!(FilterSet::basic().contains(Filter::Valence));
        assert!(!FilterSet::basic().contains(Filter::BondAngle));
        assert_eq!(FilterSet::all().len(), 5);
        assert!(FilterSet::all().is_superset_of(&FilterSet::basic()));
        assert!(!FilterSet::basic().is_superset_of(&FilterSet::all()));
        assert!(FilterSet::empty().is_empty());
    }

    #[test]
    fn filter_set_with_and_without_toggle_bits() {
        let set = FilterSet::empty().with(Filter::BondAngle);
        assert!(set.contains(Filter::BondAngle));
        assert!(set.without(Filter::BondAngle).is_empty());
        assert_eq!(format!("{}", set), "{bond-angle}");
    }

    #[test]
    fn filter_from_str_accepts_names() {
        assert_eq!("valence".parse::<Filter>().unwrap(), Filter::Valence);
        assert_eq!(
            "Bond_Type_Length".parse::<Filter>().unwrap(),
            Filter::BondTypeLength
        );
        assert!("bogus".parse::<Filter>().is_err());
    }

    #[test]
    fn minimum_bond_length_rejects_overlap() {
        let atoms = AtomSet::new(vec![
            Atom::new(Element::C, Point::new(0.0, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(0.3, 0.0, 0.0)),
        ]);
        let seed = PartialMolecule::seed(0);
        let only = FilterSet::empty().with(Filter::MinimumBondLength);

        assert!(!check(only, &atoms, &seed, 1, &[]));
    }

    #[test]
    fn bond_type_length_requires_a_partner() {
        let atoms = AtomSet::new(vec![
            Atom::new(Element::C, Point::new(0.0, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(3.0, 0.0, 0.0)),
        ]);
        let seed = PartialMolecule::seed(0);
        let only = FilterSet::empty().with(Filter::BondTypeLength);

        assert!(!check(only, &atoms, &seed, 1, &[]));
        assert!(check(only, &atoms, &seed, 1, &[0]));
    }

    #[test]
    fn valence_rejects_overbonded_partner() {
        // F already bonded to one carbon cannot take a second bond.
        let atoms = AtomSet::new(vec![
            Atom::new(Element::F, Point::new(0.0, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(1.35, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(-1.35, 0.0, 0.0)),
        ]);
        let mol = PartialMolecule::seed(0).extended(1, &[0]);
        let only = FilterSet::empty().with(Filter::Valence);

        assert!(!check(only, &atoms, &mol, 2, &[0]));
    }

    #[test]
    fn bond_angle_rejects_acute_acyclic_angle() {
        let atoms = AtomSet::new(vec![
            Atom::new(Element::C, Point::new(0.0, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(1.54, 0.0, 0.0)),
            Atom::new(Element::O, Point::new(1.0, 1.2, 0.0)),
            Atom::new(Element::O, Point::new(-0.5, 1.35, 0.0)),
        ]);
        let mol = PartialMolecule::seed(0).extended(1, &[0]);
        let only = FilterSet::empty().with(Filter::BondAngle);

        // O2 at ~50 degrees from the C-C bond around C0.
        assert!(!check(only, &atoms, &mol, 2, &[0]));
        // O3 at ~110 degrees around C0.
        assert!(check(only, &atoms, &mol, 3, &[0]));
    }

    #[test]
    fn bond_angle_allows_three_membered_rings() {
        let h = 1.5 * (3.0f64).sqrt() / 2.0;
        let atoms = AtomSet::new(vec![
            Atom::new(Element::C, Point::new(0.0, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(1.5, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(0.75, h, 0.0)),
        ]);
        let mol = PartialMolecule::seed(0).extended(1, &[0]);
        let only = FilterSet::empty().with(Filter::BondAngle);

        assert!(check(only, &atoms, &mol, 2, &[0, 1]));
    }

    #[test]
    fn bond_angle_allows_open_path_that_can_still_close_a_four_ring() {
        let s = 1.55;
        let atoms = AtomSet::new(vec![
            Atom::new(Element::C, Point::new(0.0, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(s, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(s, s, 0.0)),
            Atom::new(Element::C, Point::new(0.0, s, 0.0)),
        ]);
        let current = PartialMolecule::seed(0).extended(1, &[0]);
        let extended = current.extended(2, &[1]);
        let closes = |i: AtomId, j: AtomId| {
            matches!((i.min(j), i.max(j)), (0, 1) | (1, 2) | (2, 3) | (0, 3))
        };
        let only = FilterSet::empty().with(Filter::BondAngle);
        let ext = |pending: &'static [AtomId]| {
            accepts(
                only,
                &FilterParams::default(),
                &Extension {
                    atoms: &atoms,
                    current: &current,
                    extended: &extended,
                    candidate: 2,
                    partners: &[1],
                    pending,
                    bondable: &closes,
                },
            )
        };

        // The 90 degree angle at C1 is below the carbon floor unless C3 can close the ring.
        assert!(ext(&[3]));
        assert!(!ext(&[]));
    }

    #[test]
    fn coplanarity_rejects_square_planar_carbon() {
        let atoms = AtomSet::new(vec![
            Atom::new(Element::C, Point::new(0.0, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(1.5, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(0.0, 1.5, 0.0)),
            Atom::new(Element::C, Point::new(-1.5, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(0.0, -1.5, 0.0)),
        ]);
        let mol = PartialMolecule::seed(0)
            .extended(1, &[0])
            .extended(2, &[0])
            .extended(3, &[0]);
        let only = FilterSet::empty().with(Filter::Coplanarity);

        assert!(!check(only, &atoms, &mol, 4, &[0]));
    }

    #[test]
    fn coplanarity_accepts_tetrahedral_carbon() {
        let d = 1.54 / (3.0f64).sqrt();
        let atoms = AtomSet::new(vec![
            Atom::new(Element::C, Point::new(0.0, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(d, d, d)),
            Atom::new(Element::C, Point::new(d, -d, -d)),
            Atom::new(Element::C, Point::new(-d, d, -d)),
            Atom::new(Element::C, Point::new(-d, -d, d)),
        ]);
        let mol = PartialMolecule::seed(0)
            .extended(1, &[0])
            .extended(2, &[0])
            .extended(3, &[0]);
        let only = FilterSet::empty().with(Filter::Coplanarity);

        assert!(check(only, &atoms, &mol, 4, &[0]));
    }

    #[test]
    fn coplanarity_accepts_octahedral_centre_with_trans_pairs() {
        let d = 1.56;
        let atoms = AtomSet::new(vec![
            Atom::new(Element::S, Point::origin()),
            Atom::new(Element::F, Point::new(d, 0.0, 0.0)),
            Atom::new(Element::F, Point::new(-d, 0.0, 0.0)),
            Atom::new(Element::F, Point::new(0.0, d, 0.0)),
            Atom::new(Element::F, Point::new(0.0, -d, 0.0)),
            Atom::new(Element::F, Point::new(0.0, 0.0, d)),
        ]);
        let mol = PartialMolecule::seed(0)
            .extended(1, &[0])
            .extended(2, &[0])
            .extended(3, &[0])
            .extended(4, &[0]);
        let only = FilterSet::empty().with(Filter::Coplanarity);

        assert!(check(only, &atoms, &mol, 5, &[0]));
    }

    #[test]
    fn bond_angle_helper_measures_degrees() {
        let angle = bond_angle(
            &Point::new(1.0, 0.0, 0.0),
            &Point::origin(),
            &Point::new(0.0, 1.0, 0.0),
        );
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn empty_filter_set_accepts_anything() {
        let atoms = AtomSet::new(vec![
            Atom::new(Element::C, Point::new(0.0, 0.0, 0.0)),
            Atom::new(Element::C, Point::new(0.1, 0.0, 0.0)),
        ]);
        let seed = PartialMolecule::seed(0);
        assert!(check(FilterSet::empty(), &atoms, &seed, 1, &[]));
    }
}
