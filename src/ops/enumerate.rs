//! Dynamic-programming enumeration of candidate molecules.
//!
//! Starting from a seed atom, the enumerator adds one atom at a time, keeping an extension
//! only when every active [`Filter`](super::filter::Filter) accepts it. A state is terminal
//! once every site of the universe holds an atom; a state with no acceptable extension is a
//! dead end. Because the bonds of a state are a pure function of its members, the set of
//! terminals reachable from a state is too, and [`EnumerationCache`] memoizes it per
//! canonical [`Signature`].

use super::error::Error;
use super::filter::{self, Extension, FilterParams, FilterSet};
use crate::db;
use crate::model::atom::Atom;
use crate::model::atom_set::AtomSet;
use crate::model::molecule::{PartialMolecule, Signature};
use crate::model::types::AtomId;
use log::debug;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Settings for one candidate search.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationConfig {
    /// Active filters.
    pub filters: FilterSet,
    /// Thresholds used by the filters and by bond perception.
    pub params: FilterParams,
    /// Treat coordinates as known only up to sign, expanding each site into its mirror images.
    pub sign_ambiguity: bool,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            filters: FilterSet::all(),
            params: FilterParams::default(),
            sign_ambiguity: false,
        }
    }
}

impl EnumerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    pub fn params(mut self, params: FilterParams) -> Self {
        self.params = params;
        self
    }

    pub fn sign_ambiguity(mut self, enabled: bool) -> Self {
        self.sign_ambiguity = enabled;
        self
    }
}

/// Everything a cached subtree depends on apart from the filters and the state itself.
#[derive(Debug, Clone, PartialEq)]
struct CacheScope {
    atoms: Vec<Atom>,
    pool: Signature,
    params: FilterParams,
}

/// Memo table from `(filters, state signature)` to the terminal signatures reachable from it.
///
/// A cache belongs to one enumeration universe. Binding it to a different atom set, pool,
/// or parameter set discards every entry, so a cache can never leak results between
/// unrelated geometries.
#[derive(Debug, Default)]
pub struct EnumerationCache {
    disabled: bool,
    scope: Option<CacheScope>,
    entries: HashMap<(FilterSet, Signature), Arc<[Signature]>>,
    hits: usize,
    misses: usize,
}

impl EnumerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that never stores anything; every lookup is a miss.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Number of memoized states.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries and resets the counters.
    pub fn clear(&mut self) {
        self.scope = None;
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    fn bind(&mut self, scope: CacheScope) {
        if self.scope.as_ref() != Some(&scope) {
            if self.scope.is_some() {
                debug!("enumeration cache rebound; dropping {} entries", self.entries.len());
            }
            self.clear();
            self.scope = Some(scope);
        }
    }

    fn get(&mut self, key: &(FilterSet, Signature)) -> Option<Arc<[Signature]>> {
        match self.entries.get(key) {
            Some(found) => {
                self.hits += 1;
                Some(Arc::clone(found))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn insert(&mut self, key: (FilterSet, Signature), value: Arc<[Signature]>) {
        if !self.disabled {
            self.entries.insert(key, value);
        }
    }
}

/// Result of a candidate search: the universe the search ran over and the terminal molecules.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    universe: AtomSet,
    molecules: BTreeSet<PartialMolecule>,
}

impl CandidateSet {
    /// Atom set whose identities the molecules refer to.
    pub fn universe(&self) -> &AtomSet {
        &self.universe
    }

    pub fn molecules(&self) -> &BTreeSet<PartialMolecule> {
        &self.molecules
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartialMolecule> {
        self.molecules.iter()
    }

    /// Copies the atoms of one candidate out of the universe.
    pub fn atoms_of(&self, molecule: &PartialMolecule) -> Vec<Atom> {
        molecule.atoms(&self.universe)
    }
}

/// Search state shared across one recursive enumeration.
struct Enumerator<'a> {
    atoms: &'a AtomSet,
    filters: FilterSet,
    params: &'a FilterParams,
    pool: &'a Signature,
    site_total: usize,
    bondable: Vec<bool>,
}

impl<'a> Enumerator<'a> {
    fn new(
        atoms: &'a AtomSet,
        seed: AtomId,
        pool: &'a Signature,
        filters: FilterSet,
        params: &'a FilterParams,
    ) -> Self {
        let n = atoms.len();
        let mut bondable = vec![false; n * n];
        let ids: Vec<AtomId> = pool.with(seed).ids().to_vec();
        for (k, &i) in ids.iter().enumerate() {
            for &j in &ids[k + 1..] {
                if Self::within_bond_window(atoms, i, j, params) {
                    bondable[i * n + j] = true;
                    bondable[j * n + i] = true;
                }
            }
        }

        let mut sites: Vec<usize> = ids.iter().map(|&id| atoms.site_of(id)).collect();
        sites.sort_unstable();
        sites.dedup();

        Self {
            atoms,
            filters,
            params,
            pool,
            site_total: sites.len(),
            bondable,
        }
    }

    fn within_bond_window(atoms: &AtomSet, i: AtomId, j: AtomId, params: &FilterParams) -> bool {
        let (a, b) = (atoms.atom(i), atoms.atom(j));
        db::bond_window(a.element, b.element, params.bond_length_tolerance).is_some_and(
            |(lo, hi)| {
                let d = a.distance(b);
                d >= lo && d <= hi
            },
        )
    }

    fn is_bondable(&self, i: AtomId, j: AtomId) -> bool {
        self.bondable[i * self.atoms.len() + j]
    }

    /// Rebuilds a molecule from its member set; bonds are implied by geometry.
    fn molecule(&self, signature: &Signature) -> PartialMolecule {
        let ids = signature.ids();
        let mut bonds = Vec::new();
        for (k, &i) in ids.iter().enumerate() {
            for &j in &ids[k + 1..] {
                if self.is_bondable(i, j) {
                    bonds.push((i, j));
                }
            }
        }
        PartialMolecule::from_parts(signature.clone(), bonds)
    }

    fn expand(&self, current: &PartialMolecule, cache: &mut EnumerationCache) -> Arc<[Signature]> {
        let key = (self.filters, current.signature().clone());
        if let Some(found) = cache.get(&key) {
            return found;
        }

        let terminals: Arc<[Signature]> = if current.atom_count() == self.site_total {
            Arc::from(vec![current.signature().clone()])
        } else {
            let mut found = BTreeSet::new();
            let open: Vec<AtomId> = self
                .pool
                .ids()
                .iter()
                .copied()
                .filter(|&id| !self.site_filled(current, id))
                .collect();
            let bondable = |i: AtomId, j: AtomId| self.is_bondable(i, j);
            for &candidate in &open {
                let site = self.atoms.site_of(candidate);
                let partners: Vec<AtomId> = current
                    .members()
                    .iter()
                    .copied()
                    .filter(|&m| self.is_bondable(m, candidate))
                    .collect();
                let pending: Vec<AtomId> = open
                    .iter()
                    .copied()
                    .filter(|&id| self.atoms.site_of(id) != site)
                    .collect();
                let extended = current.extended(candidate, &partners);
                let extension = Extension {
                    atoms: self.atoms,
                    current,
                    extended: &extended,
                    candidate,
                    partners: &partners,
                    pending: &pending,
                    bondable: &bondable,
                };
                if filter::accepts(self.filters, self.params, &extension) {
                    found.extend(self.expand(&extended, cache).iter().cloned());
                }
            }
            found.into_iter().collect()
        };

        cache.insert(key, Arc::clone(&terminals));
        terminals
    }

    fn site_filled(&self, current: &PartialMolecule, candidate: AtomId) -> bool {
        let site = self.atoms.site_of(candidate);
        current
            .members()
            .iter()
            .any(|&m| self.atoms.site_of(m) == site)
    }
}

/// Enumerates every terminal molecule reachable from `seed` by adding atoms from `remaining`.
///
/// The order of `remaining` does not affect the result. Identities in `remaining` that share
/// a site with the seed, or with each other, are alternative placements: at most one of them
/// ends up in any molecule.
///
/// # Arguments
///
/// * `atoms` - Universe the identities refer to.
/// * `seed` - Identity the search starts from.
/// * `remaining` - Identities that may be added.
/// * `filters` - Active filters.
/// * `params` - Filter thresholds and bond-length tolerance.
/// * `cache` - Memo table; rebound (and cleared) automatically if it was last used for a
///   different universe.
///
/// # Returns
///
/// The set of terminal molecules; empty when no path fills every site.
pub fn enumerate(
    atoms: &AtomSet,
    seed: AtomId,
    remaining: &[AtomId],
    filters: FilterSet,
    params: &FilterParams,
    cache: &mut EnumerationCache,
) -> BTreeSet<PartialMolecule> {
    let pool = Signature::new(remaining.iter().copied().filter(|&id| id != seed));
    cache.bind(CacheScope {
        atoms: atoms.atoms().to_vec(),
        pool: pool.clone(),
        params: params.clone(),
    });

    let enumerator = Enumerator::new(atoms, seed, &pool, filters, params);
    let terminals = enumerator.expand(&PartialMolecule::seed(seed), cache);

    terminals
        .iter()
        .map(|signature| enumerator.molecule(signature))
        .collect()
}

/// Finds all candidate molecules for a geometry.
///
/// Checks that every element has table data, optionally expands coordinate sign
/// ambiguity, seeds the search at the atom farthest from the centroid, and enumerates.
///
/// # Errors
///
/// Returns [`Error::UnsupportedElement`] for the first atom whose element has no valence
/// data. No search is attempted in that case.
pub fn find_candidates(
    atom_set: &AtomSet,
    config: &EnumerationConfig,
    cache: &mut EnumerationCache,
) -> Result<CandidateSet, Error> {
    if let Some((id, atom)) = atom_set
        .iter()
        .enumerate()
        .find(|(_, atom)| !db::is_supported(atom.element))
    {
        return Err(Error::unsupported_element(id, atom.element));
    }

    let universe = if config.sign_ambiguity {
        atom_set.with_sign_ambiguity()
    } else {
        atom_set.clone()
    };

    let Some(seed) = universe.farthest_atom() else {
        return Ok(CandidateSet {
            universe,
            molecules: BTreeSet::new(),
        });
    };

    let remaining: Vec<AtomId> = (0..universe.len())
        .filter(|&id| universe.site_of(id) != universe.site_of(seed))
        .collect();
    let molecules = enumerate(
        &universe,
        seed,
        &remaining,
        config.filters,
        &config.params,
        cache,
    );

    debug!(
        "enumerated {} candidate(s) over {} site(s) / {} placement(s) with filters {} (cache: {} hits, {} misses)",
        molecules.len(),
        universe.site_count(),
        universe.len(),
        config.filters,
        cache.hits(),
        cache.misses()
    );

    Ok(CandidateSet {
        universe,
        molecules,
    })
}
