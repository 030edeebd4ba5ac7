//! Bond-order and formal-charge assignment for a fixed connectivity graph.
//!
//! Every atom receives a valence from its table preferences. Atoms whose valence exceeds
//! their bond count are *under-saturated*, and the resolver raises the order of bonds between
//! pairs of them by backtracking. Each complete assignment is scored by its total absolute
//! formal charge (then distance from the requested molecular charge, then total bond order),
//! and the best-scoring one is returned.

use super::error::Error;
use crate::db::{self, ElementView};
use crate::model::atom_set::AtomSet;
use crate::model::graph::{BondOrderMatrix, ConnectivityGraph};
use crate::model::molecule::PartialMolecule;
use crate::model::types::Element;

/// How leftover electron imbalance is expressed on the emitted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Assign formal charges.
    #[default]
    Charged,
    /// Keep every atom neutral and report the imbalance as radical electrons.
    Radical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub mode: ResolveMode,
    /// Net charge the assignment should carry.
    pub molecular_charge: i32,
    /// Highest bond order the resolver may assign.
    pub max_bond_order: u8,
    /// Upper bound on the number of per-atom valence combinations tried.
    pub max_valence_combinations: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            mode: ResolveMode::Charged,
            molecular_charge: 0,
            max_bond_order: 3,
            max_valence_combinations: 256,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn molecular_charge(mut self, charge: i32) -> Self {
        self.molecular_charge = charge;
        self
    }

    pub fn max_bond_order(mut self, order: u8) -> Self {
        self.max_bond_order = order.max(1);
        self
    }

    pub fn max_valence_combinations(mut self, limit: usize) -> Self {
        self.max_valence_combinations = limit;
        self
    }
}

/// Chemically consistent bonding model for one molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondingModel {
    /// Integer bond orders, zero where no bond exists.
    pub bond_orders: BondOrderMatrix,
    /// Valence selected for each atom; no row of `bond_orders` exceeds it.
    pub valences: Vec<u8>,
    /// Formal charge per atom. All zero in radical mode.
    pub charges: Vec<i32>,
    /// Radical electrons per atom. All zero in charged mode.
    pub radicals: Vec<u32>,
}

impl BondingModel {
    pub fn net_charge(&self) -> i32 {
        self.charges.iter().sum()
    }

    pub fn total_abs_charge(&self) -> u32 {
        self.charges.iter().map(|c| c.unsigned_abs()).sum()
    }

    pub fn total_radicals(&self) -> u32 {
        self.radicals.iter().sum()
    }

    /// Checks the valence invariant for every atom.
    pub fn satisfies_valences(&self) -> bool {
        self.bond_orders.valences_not_too_large(&self.valences)
    }
}

/// Formal charge of an atom carrying `bond_valence` total bond order.
///
/// Uses the octet rule with the usual exceptions: hydrogen and boron count from their own
/// valence-electron totals, while hypervalent phosphorus (5) and sulfur (6) are neutral.
pub fn formal_charge(element: Element, valence_electrons: u8, bond_valence: u32) -> i32 {
    let bv = bond_valence as i32;
    match element {
        Element::H => 1 - bv,
        Element::B => 3 - bv,
        Element::P if bv == 5 => 0,
        Element::S if bv == 6 => 0,
        _ => valence_electrons as i32 - 8 + bv,
    }
}

/// Lexicographic score of a complete assignment; smaller is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Score {
    imbalance: u32,
    off_target: u32,
    neg_total_order: i64,
}

struct Search<'a> {
    elements: &'a [Element],
    views: Vec<ElementView>,
    config: &'a ResolverConfig,
    best: Option<(Score, BondingModel)>,
}

impl Search<'_> {
    /// Explores every bond-order augmentation under one valence combination.
    ///
    /// Returns `true` once an ideal assignment has been found.
    fn try_valences(&mut self, graph: &ConnectivityGraph, valences: Vec<u8>) -> bool {
        let mut deficiency: Vec<u8> = (0..graph.size())
            .map(|i| valences[i].saturating_sub(graph.degree(i) as u8))
            .collect();
        let edges: Vec<(usize, usize)> = graph
            .edges()
            .into_iter()
            .filter(|&(i, j)| deficiency[i] > 0 && deficiency[j] > 0)
            .collect();
        let mut orders = BondOrderMatrix::from_connectivity(graph);

        self.backtrack(0, &edges, &mut orders, &mut deficiency, &valences)
    }

    fn backtrack(
        &mut self,
        k: usize,
        edges: &[(usize, usize)],
        orders: &mut BondOrderMatrix,
        deficiency: &mut [u8],
        valences: &[u8],
    ) -> bool {
        let Some(&(i, j)) = edges.get(k) else {
            return self.evaluate(orders, deficiency, valences);
        };

        let limit = deficiency[i]
            .min(deficiency[j])
            .min(self.config.max_bond_order.saturating_sub(1));
        let base = orders.order(i, j);
        for increment in (0..=limit).rev() {
            orders.set_order(i, j, base + increment);
            deficiency[i] -= increment;
            deficiency[j] -= increment;

            let done = self.backtrack(k + 1, edges, orders, deficiency, valences);

            deficiency[i] += increment;
            deficiency[j] += increment;
            orders.set_order(i, j, base);
            if done {
                return true;
            }
        }
        false
    }

    fn evaluate(&mut self, orders: &BondOrderMatrix, deficiency: &[u8], valences: &[u8]) -> bool {
        if !orders.valences_not_too_large(valences) {
            return false;
        }

        let (charges, radicals) = assign_charges(self.elements, &self.views, orders, self.config);
        let net: i32 = charges.iter().sum();
        let score = Score {
            imbalance: charges.iter().map(|c| c.unsigned_abs()).sum::<u32>()
                + radicals.iter().sum::<u32>(),
            off_target: (net - self.config.molecular_charge).unsigned_abs(),
            neg_total_order: -(orders.total_order() as i64),
        };

        let ideal = score.imbalance == 0
            && score.off_target == 0
            && deficiency.iter().all(|&d| d == 0);

        if self.best.as_ref().is_none_or(|(best, _)| score < *best) {
            self.best = Some((
                score,
                BondingModel {
                    bond_orders: orders.clone(),
                    valences: valences.to_vec(),
                    charges,
                    radicals,
                },
            ));
        }
        ideal
    }
}

/// Computes per-atom charges and radicals for a bond-order matrix.
fn assign_charges(
    elements: &[Element],
    views: &[ElementView],
    orders: &BondOrderMatrix,
    config: &ResolverConfig,
) -> (Vec<i32>, Vec<u32>) {
    let n = elements.len();
    match config.mode {
        ResolveMode::Radical => {
            let radicals = (0..n)
                .map(|i| {
                    formal_charge(elements[i], views[i].valence_electrons(), orders.valence(i))
                        .unsigned_abs()
                })
                .collect();
            (vec![0; n], radicals)
        }
        ResolveMode::Charged => {
            let mut running = 0i32;
            let mut charges = Vec::with_capacity(n);
            for i in 0..n {
                let bond_valence = orders.valence(i);
                let mut charge =
                    formal_charge(elements[i], views[i].valence_electrons(), bond_valence);
                running += charge;

                if elements[i] == Element::C {
                    let singles = orders.single_bond_count(i);
                    if singles == 2 && bond_valence == 2 {
                        running += 1;
                        charge = 0;
                    }
                    if singles == 3 && running + 1 < config.molecular_charge {
                        running += 2;
                        charge = 1;
                    }
                }
                charges.push(charge);
            }
            (charges, vec![0; n])
        }
    }
}

/// Odometer over per-atom valence choices, rightmost atom varying fastest.
struct ValenceCombinations<'a> {
    options: &'a [Vec<u8>],
    cursor: Option<Vec<usize>>,
}

impl<'a> ValenceCombinations<'a> {
    fn new(options: &'a [Vec<u8>]) -> Self {
        let cursor = options
            .iter()
            .all(|o| !o.is_empty())
            .then(|| vec![0; options.len()]);
        Self { options, cursor }
    }
}

impl Iterator for ValenceCombinations<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        let cursor = self.cursor.as_mut()?;
        let current = cursor
            .iter()
            .zip(self.options)
            .map(|(&k, options)| options[k])
            .collect();

        let mut exhausted = true;
        for pos in (0..cursor.len()).rev() {
            cursor[pos] += 1;
            if cursor[pos] < self.options[pos].len() {
                exhausted = false;
                break;
            }
            cursor[pos] = 0;
        }
        if exhausted {
            self.cursor = None;
        }
        Some(current)
    }
}

/// Assigns bond orders and formal charges (or radicals) to a connectivity graph.
///
/// # Arguments
///
/// * `graph` - Atom connectivity; index `k` refers to `elements[k]`.
/// * `elements` - Element of every atom.
/// * `config` - Output mode, target charge, and search bounds.
///
/// # Returns
///
/// The best-scoring [`BondingModel`]. Its bond orders never exceed the selected valences.
///
/// # Errors
///
/// * [`Error::SizeMismatch`] when `graph` and `elements` disagree in length.
/// * [`Error::UnsupportedElement`] when an element has no valence data.
/// * [`Error::ValenceExceeded`] when an atom has more bonds than its largest valence.
/// * [`Error::NoBondingModel`] when no valence combination could be evaluated.
pub fn resolve(
    graph: &ConnectivityGraph,
    elements: &[Element],
    config: &ResolverConfig,
) -> Result<BondingModel, Error> {
    if graph.size() != elements.len() {
        return Err(Error::SizeMismatch {
            graph_atoms: graph.size(),
            elements: elements.len(),
        });
    }

    let mut views = Vec::with_capacity(elements.len());
    let mut options = Vec::with_capacity(elements.len());
    for (i, &element) in elements.iter().enumerate() {
        let view = db::element(element).ok_or(Error::unsupported_element(i, element))?;
        let degree = graph.degree(i);
        let allowed: Vec<u8> = view
            .valences()
            .iter()
            .copied()
            .filter(|&v| v as usize >= degree)
            .collect();
        if allowed.is_empty() {
            return Err(Error::valence_exceeded(
                i,
                element,
                degree,
                view.max_valence(),
            ));
        }
        views.push(view);
        options.push(allowed);
    }

    let mut search = Search {
        elements,
        views,
        config,
        best: None,
    };
    for valences in ValenceCombinations::new(&options).take(config.max_valence_combinations) {
        if search.try_valences(graph, valences) {
            break;
        }
    }

    search
        .best
        .map(|(_, model)| model)
        .ok_or_else(|| Error::no_bonding_model("no valence combination was evaluated"))
}

/// Resolves one enumerated candidate. Indices of the model follow `molecule.members()`.
pub fn resolve_candidate(
    molecule: &PartialMolecule,
    atoms: &AtomSet,
    config: &ResolverConfig,
) -> Result<BondingModel, Error> {
    resolve(&molecule.connectivity(), &molecule.elements(atoms), config)
}
