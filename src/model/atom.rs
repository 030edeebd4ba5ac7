//! Fundamental atom representation: a chemical element pinned to a Cartesian position.
//!
//! Atoms are immutable once created. Identity is not stored on the atom itself but is the
//! atom's index inside the [`AtomSet`](super::atom_set::AtomSet) that owns it, so the same
//! record can be copied into candidate molecules without any bookkeeping.

use super::types::{Element, Point};
use std::fmt;

/// Coordinates whose magnitude is below this threshold are treated as lying on a mirror plane
/// and are never sign-flipped.
pub const SIGN_FLIP_EPSILON: f64 = 1e-3;

/// Element plus position, measured in ångströms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atom {
    /// Chemical element of the atom.
    pub element: Element,
    /// Cartesian coordinates in ångströms.
    pub pos: Point,
}

impl Atom {
    /// Creates a new atom from an element and a position.
    ///
    /// # Arguments
    ///
    /// * `element` - `Element` variant describing the chemical identity.
    /// * `pos` - `Point` describing the Cartesian coordinates in ångströms.
    pub fn new(element: Element, pos: Point) -> Self {
        Self { element, pos }
    }

    /// Computes the squared Euclidean distance to another atom.
    ///
    /// Cheaper than [`Atom::distance`] and sufficient for comparisons against squared cutoffs.
    pub fn distance_squared(&self, other: &Atom) -> f64 {
        nalgebra::distance_squared(&self.pos, &other.pos)
    }

    /// Computes the Euclidean distance to another atom in ångströms.
    pub fn distance(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.pos, &other.pos)
    }

    /// Enumerates every distinct sign assignment of this atom's coordinates.
    ///
    /// Structure determination from rotational spectroscopy only yields the magnitudes of
    /// principal-axis coordinates, so each atom may sit at any of up to eight mirror images.
    /// The original position is always returned first; coordinates within
    /// [`SIGN_FLIP_EPSILON`] of zero are not flipped, which removes duplicate images.
    ///
    /// # Returns
    ///
    /// Between one and eight atoms sharing this atom's element.
    pub fn sign_variants(&self) -> Vec<Atom> {
        let mut variants = vec![*self];
        for mask in 1u8..8 {
            let mut flipped = self.pos;
            let mut changed = false;
            for axis in 0..3 {
                if mask & (1 << axis) != 0 && flipped[axis].abs() >= SIGN_FLIP_EPSILON {
                    flipped[axis] = -flipped[axis];
                    changed = true;
                }
            }
            if changed && !variants.iter().any(|v| v.pos == flipped) {
                variants.push(Atom::new(self.element, flipped));
            }
        }
        variants
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:.4}, {:.4}, {:.4}]",
            self.element, self.pos.x, self.pos.y, self.pos.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_new_creates_correct_atom() {
        let pos = Point::new(1.0, 2.0, 3.0);
        let atom = Atom::new(Element::C, pos);

        assert_eq!(atom.element, Element::C);
        assert_eq!(atom.pos, pos);
    }

    #[test]
    fn atom_distance_calculates_correctly() {
        let a = Atom::new(Element::C, Point::new(0.0, 0.0, 0.0));
        let b = Atom::new(Element::O, Point::new(3.0, 4.0, 0.0));

        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-12);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn sign_variants_of_general_position_yields_eight_images() {
        let atom = Atom::new(Element::N, Point::new(1.0, -2.0, 0.5));
        let variants = atom.sign_variants();

        assert_eq!(variants.len(), 8);
        assert_eq!(variants[0], atom);
        assert!(variants.contains(&Atom::new(Element::N, Point::new(-1.0, 2.0, -0.5))));
    }

    #[test]
    fn sign_variants_skip_coordinates_on_mirror_planes() {
        let on_axis = Atom::new(Element::O, Point::new(1.2, 0.0, 0.0));
        assert_eq!(on_axis.sign_variants().len(), 2);

        let at_origin = Atom::new(Element::C, Point::origin());
        assert_eq!(at_origin.sign_variants(), vec![at_origin]);
    }

    #[test]
    fn atom_display_formats_element_and_position() {
        let atom = Atom::new(Element::C, Point::new(1.0, 2.0, 3.0));
        assert_eq!(format!("{}", atom), "C [1.0000, 2.0000, 3.0000]");
    }
}
