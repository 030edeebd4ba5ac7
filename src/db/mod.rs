//! Internal database API exposing read-only views over the embedded chemistry tables.
//!
//! The tables ship inside the binary as TOML and are parsed once on first access. Callers
//! obtain [`ElementView`] handles for per-element data (valences, valence electrons, radii)
//! and query element-pair bond-length windows without cloning the underlying schema.

mod loader;
mod schema;
mod store;

use crate::model::types::Element;

/// Ratio between a typical double-bond length and the single-bond radius sum, used for
/// element pairs without tabulated lengths.
const FALLBACK_DOUBLE_BOND_RATIO: f64 = 0.87;

/// Retrieves the table entry for an element.
///
/// # Returns
///
/// `Some(ElementView)` when the element is supported, otherwise `None`.
pub fn element(element: Element) -> Option<ElementView> {
    store::get_store()
        .elements
        .get(&element)
        .map(|inner| ElementView { element, inner })
}

/// Reports whether an element has valence data and can take part in inference.
pub fn is_supported(element: Element) -> bool {
    store::get_store().elements.contains_key(&element)
}

/// Lists every supported element in atomic-number order.
pub fn supported_elements() -> Vec<Element> {
    let mut elements: Vec<Element> = store::get_store().elements.keys().copied().collect();
    elements.sort();
    elements
}

/// Returns the tabulated typical bond lengths for an element pair, if any.
///
/// Lengths are ordered single, double, triple, as far as the pair forms such bonds.
pub fn bond_lengths(a: Element, b: Element) -> Option<&'static [f64]> {
    store::get_store()
        .bond_lengths
        .get(&loader::pair_key(a, b))
        .map(Vec::as_slice)
}

/// Computes the covalent bond-length window for an element pair.
///
/// The window spans from the shortest typical length shrunk by `tolerance` to the longest
/// typical length stretched by `tolerance`. Pairs without tabulated lengths fall back to
/// the covalent-radius sum (single) and a shortened estimate of it (double).
///
/// # Arguments
///
/// * `a`, `b` - Elements of the two atoms.
/// * `tolerance` - Relative slack, e.g. `0.1` for ±10 %.
///
/// # Returns
///
/// `Some((min, max))` in ångströms, or `None` if either element is unsupported.
pub fn bond_window(a: Element, b: Element, tolerance: f64) -> Option<(f64, f64)> {
    let single = element(a)?.covalent_radius() + element(b)?.covalent_radius();
    let (shortest, longest) = match bond_lengths(a, b) {
        Some(lengths) => lengths
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &l| (lo.min(l), hi.max(l))),
        None => (single * FALLBACK_DOUBLE_BOND_RATIO, single),
    };
    Some((shortest * (1.0 - tolerance), longest * (1.0 + tolerance)))
}

/// Lightweight wrapper granting read-only access to an element's table entry.
#[derive(Debug, Clone, Copy)]
pub struct ElementView {
    element: Element,
    inner: &'static store::ElementEntry,
}

impl ElementView {
    pub fn element(&self) -> Element {
        self.element
    }

    /// Allowed total bond orders, most preferred first.
    pub fn valences(&self) -> &'static [u8] {
        &self.inner.valences
    }

    /// Largest allowed total bond order.
    pub fn max_valence(&self) -> u8 {
        self.inner.valences.iter().copied().max().unwrap_or(0)
    }

    pub fn valence_electrons(&self) -> u8 {
        self.inner.valence_electrons
    }

    /// Single-bond covalent radius in ångströms.
    pub fn covalent_radius(&self) -> f64 {
        self.inner.covalent_radius
    }

    /// Smallest acyclic bond angle, in degrees, tolerated around this element.
    pub fn min_bond_angle(&self) -> f64 {
        self.inner.min_bond_angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valence_preferences_keep_declared_order() {
        assert_eq!(element(Element::N).unwrap().valences(), &[3, 4]);
        assert_eq!(element(Element::O).unwrap().valences(), &[2, 1]);
        assert_eq!(element(Element::S).unwrap().valences(), &[6, 3, 2]);
        assert_eq!(element(Element::S).unwrap().max_valence(), 6);
    }

    #[test]
    fn valence_electrons_match_main_group_counts() {
        assert_eq!(element(Element::H).unwrap().valence_electrons(), 1);
        assert_eq!(element(Element::C).unwrap().valence_electrons(), 4);
        assert_eq!(element(Element::Cl).unwrap().valence_electrons(), 7);
    }

    #[test]
    fn unsupported_elements_have_no_entry() {
        assert!(element(Element::Fe).is_none());
        assert!(!is_supported(Element::Unknown));
        assert!(is_supported(Element::Br));
        assert!(!supported_elements().contains(&Element::Na));
    }

    #[test]
    fn bond_lengths_are_symmetric() {
        assert_eq!(
            bond_lengths(Element::C, Element::O),
            bond_lengths(Element::O, Element::C)
        );
        assert_eq!(bond_lengths(Element::C, Element::C).unwrap().len(), 3);
    }

    #[test]
    fn bond_window_applies_tolerance_to_extremes() {
        let (lo, hi) = bond_window(Element::C, Element::O, 0.1).unwrap();
        assert!((lo - 1.13 * 0.9).abs() < 1e-9);
        assert!((hi - 1.43 * 1.1).abs() < 1e-9);
    }

    #[test]
    fn bond_window_falls_back_to_covalent_radii() {
        let (lo, hi) = bond_window(Element::N, Element::Cl, 0.0).unwrap();
        let single = 0.71 + 1.02;
        assert!((hi - single).abs() < 1e-9);
        assert!((lo - single * FALLBACK_DOUBLE_BOND_RATIO).abs() < 1e-9);
    }

    #[test]
    fn bond_window_is_none_for_unsupported_pairs() {
        assert!(bond_window(Element::C, Element::Fe, 0.1).is_none());
    }
}
