//! Parallel labeling of many geometries.
//!
//! Inputs are split into contiguous chunks, one per worker. Each worker runs the complete
//! per-geometry pipeline (element policy, enumeration, resolution, oracle lookups) with its
//! own enumeration cache, then merges the outcome into the shared report inside a single
//! critical section. Per-geometry failures become counters; only an unreachable oracle or a
//! pool that cannot start aborts the run.

use super::error::Error;
use super::oracle::Oracle;
use crate::io;
use crate::model::atom::Atom;
use crate::model::atom_set::AtomSet;
use crate::model::geometry::Geometry;
use crate::model::record::LabeledRecord;
use crate::ops::{self, EnumerationCache, EnumerationConfig, ResolverConfig};
use crate::utils::parallel::{ParallelIterator, ParallelSlice};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Which atoms of an input geometry take part in inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementPolicy {
    /// Drop hydrogens before enumeration; candidates are then heavy-atom skeletons.
    pub strip_hydrogens: bool,
}

impl Default for ElementPolicy {
    fn default() -> Self {
        Self {
            strip_hydrogens: true,
        }
    }
}

impl ElementPolicy {
    /// Returns the atoms of `atoms` that this policy keeps.
    pub fn apply(&self, atoms: &AtomSet) -> AtomSet {
        if self.strip_hydrogens {
            atoms.retain_primary(|atom| atom.element.is_heavy_atom())
        } else {
            atoms.retain_primary(|_| true)
        }
    }
}

/// Settings for [`run_batch`].
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Worker count; `0` uses the available hardware parallelism.
    pub workers: usize,
    pub enumeration: EnumerationConfig,
    pub resolver: ResolverConfig,
    pub element_policy: ElementPolicy,
    /// Shuffle inputs with this seed before chunking to even out per-worker load.
    pub shuffle_seed: Option<u64>,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn enumeration(mut self, config: EnumerationConfig) -> Self {
        self.enumeration = config;
        self
    }

    pub fn resolver(mut self, config: ResolverConfig) -> Self {
        self.resolver = config;
        self
    }

    pub fn element_policy(mut self, policy: ElementPolicy) -> Self {
        self.element_policy = policy;
        self
    }

    pub fn shuffle_seed(mut self, seed: Option<u64>) -> Self {
        self.shuffle_seed = seed;
        self
    }

    /// Number of workers actually used for `inputs` geometries.
    fn effective_workers(&self, inputs: usize) -> usize {
        let requested = if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.workers
        };
        requested.min(inputs).max(1)
    }
}

/// Counters describing one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Geometries submitted.
    pub inputs: usize,
    /// Geometries that produced records.
    pub labeled: usize,
    /// Geometries skipped for containing an element without table data.
    pub unsupported: usize,
    /// Geometries with no candidate surviving enumeration and resolution.
    pub empty: usize,
    /// Inputs that could not be read or parsed.
    pub malformed: usize,
    /// Candidates dropped because no bonding model could be assigned.
    pub resolver_failures: usize,
    /// Geometries skipped because an oracle call failed.
    pub oracle_failures: usize,
    /// Distinct canonical identifiers among labeled geometries.
    pub unique_compounds: usize,
}

impl BatchStats {
    /// Geometries whose processing has finished, successfully or not.
    pub fn processed(&self) -> usize {
        self.labeled + self.unsupported + self.empty + self.malformed + self.oracle_failures
    }
}

/// Result of a batch run: the unique labeled records plus counters.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub records: HashSet<LabeledRecord>,
    pub stats: BatchStats,
}

impl BatchReport {
    /// Records in a stable order, for export.
    pub fn sorted_records(&self) -> Vec<&LabeledRecord> {
        let mut records: Vec<&LabeledRecord> = self.records.iter().collect();
        records.sort();
        records
    }
}

/// What happened to a single geometry.
enum Outcome {
    Labeled {
        canonical: String,
        records: Vec<LabeledRecord>,
        resolver_failures: usize,
    },
    Unsupported,
    Empty {
        resolver_failures: usize,
    },
    Malformed,
    OracleFailed {
        resolver_failures: usize,
    },
}

#[derive(Default)]
struct MergeState {
    records: HashSet<LabeledRecord>,
    compounds: HashSet<String>,
    stats: BatchStats,
}

impl MergeState {
    fn absorb(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Labeled {
                canonical,
                records,
                resolver_failures,
            } => {
                self.stats.labeled += 1;
                self.stats.resolver_failures += resolver_failures;
                self.compounds.insert(canonical);
                self.stats.unique_compounds = self.compounds.len();
                self.records.extend(records);
            }
            Outcome::Unsupported => self.stats.unsupported += 1,
            Outcome::Empty { resolver_failures } => {
                self.stats.empty += 1;
                self.stats.resolver_failures += resolver_failures;
            }
            Outcome::Malformed => self.stats.malformed += 1,
            Outcome::OracleFailed { resolver_failures } => {
                self.stats.oracle_failures += 1;
                self.stats.resolver_failures += resolver_failures;
            }
        }
    }
}

/// Runs the full pipeline over every input and collects unique labeled records.
///
/// # Arguments
///
/// * `inputs` - Geometries, or the errors encountered while reading them.
/// * `config` - Worker count, filters, resolver mode, element policy, and shuffling.
/// * `oracle` - Source of canonical identifiers.
///
/// # Errors
///
/// Returns [`Error::OracleUnavailable`] when the oracle fails its startup probe and
/// [`Error::ThreadPool`] when the worker pool cannot be created. Every other failure is
/// counted in [`BatchStats`].
pub fn run_batch<O>(
    inputs: Vec<Result<Geometry, io::Error>>,
    config: &BatchConfig,
    oracle: &O,
) -> Result<BatchReport, Error>
where
    O: Oracle + ?Sized,
{
    run_batch_with_progress(inputs, config, oracle, |_| {})
}

/// Like [`run_batch`], invoking `progress` with a counter snapshot after every geometry.
///
/// The callback runs inside the merge critical section and should return quickly.
pub fn run_batch_with_progress<O, P>(
    mut inputs: Vec<Result<Geometry, io::Error>>,
    config: &BatchConfig,
    oracle: &O,
    progress: P,
) -> Result<BatchReport, Error>
where
    O: Oracle + ?Sized,
    P: Fn(&BatchStats) + Sync,
{
    oracle.probe().map_err(|e| match e {
        Error::OracleUnavailable { .. } => e,
        other => Error::oracle_unavailable(other.to_string()),
    })?;

    if let Some(seed) = config.shuffle_seed {
        let mut rng = StdRng::seed_from_u64(seed);
        inputs.shuffle(&mut rng);
    }

    let workers = config.effective_workers(inputs.len());
    let chunk_size = inputs.len().div_ceil(workers).max(1);
    info!(
        "labeling {} geometries on {} worker(s), {} per chunk",
        inputs.len(),
        workers,
        chunk_size
    );

    let state = Mutex::new(MergeState {
        stats: BatchStats {
            inputs: inputs.len(),
            ..BatchStats::default()
        },
        ..MergeState::default()
    });

    let work = || {
        inputs.par_chunks(chunk_size).for_each(|chunk| {
            for item in chunk {
                let outcome = match item {
                    Ok(geometry) => process_geometry(geometry, config, oracle),
                    Err(err) => {
                        warn!("skipping malformed geometry: {}", err);
                        Outcome::Malformed
                    }
                };
                let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
                guard.absorb(outcome);
                progress(&guard.stats);
            }
        });
    };

    #[cfg(feature = "parallel")]
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| Error::thread_pool(e.to_string()))?;
        pool.install(work);
    }
    #[cfg(not(feature = "parallel"))]
    work();

    let state = state.into_inner().unwrap_or_else(PoisonError::into_inner);
    let stats = state.stats;
    info!(
        "labeled {} of {} geometries: {} records, {} unique compounds ({} unsupported, {} empty, {} malformed, {} oracle failures, {} resolver failures)",
        stats.labeled,
        stats.inputs,
        state.records.len(),
        stats.unique_compounds,
        stats.unsupported,
        stats.empty,
        stats.malformed,
        stats.oracle_failures,
        stats.resolver_failures
    );

    Ok(BatchReport {
        records: state.records,
        stats,
    })
}

/// Runs enumeration, resolution, and oracle lookups for one geometry.
fn process_geometry<O>(geometry: &Geometry, config: &BatchConfig, oracle: &O) -> Outcome
where
    O: Oracle + ?Sized,
{
    let atoms = config.element_policy.apply(&geometry.atoms);

    let mut cache = EnumerationCache::new();
    let candidates = match ops::find_candidates(&atoms, &config.enumeration, &mut cache) {
        Ok(candidates) => candidates,
        Err(err) => {
            warn!("skipping geometry '{}': {}", geometry.name, err);
            return Outcome::Unsupported;
        }
    };

    let mut resolver_failures = 0;
    let mut survivors: Vec<Vec<Atom>> = Vec::with_capacity(candidates.len());
    for molecule in candidates.iter() {
        match ops::resolve_candidate(molecule, candidates.universe(), &config.resolver) {
            Ok(_) => survivors.push(candidates.atoms_of(molecule)),
            Err(err) => {
                debug!("dropping candidate of '{}': {}", geometry.name, err);
                resolver_failures += 1;
            }
        }
    }

    if survivors.is_empty() {
        debug!("no plausible structure for geometry '{}'", geometry.name);
        return Outcome::Empty { resolver_failures };
    }

    let canonical = match oracle.canonical_identifier(atoms.atoms()) {
        Ok(id) => id,
        Err(err) => {
            warn!("skipping geometry '{}': {}", geometry.name, err);
            return Outcome::OracleFailed { resolver_failures };
        }
    };

    let mut records = Vec::with_capacity(survivors.len());
    for candidate in &survivors {
        match oracle.canonical_identifier(candidate) {
            Ok(identifier) => {
                let validity = identifier == canonical;
                records.push(LabeledRecord::new(identifier, validity));
            }
            Err(err) => {
                warn!("skipping geometry '{}': {}", geometry.name, err);
                return Outcome::OracleFailed { resolver_failures };
            }
        }
    }

    debug!(
        "geometry '{}': {} candidate(s), {} labeled, canonical '{}'",
        geometry.name,
        candidates.len(),
        records.len(),
        canonical
    );

    Outcome::Labeled {
        canonical,
        records,
        resolver_failures,
    }
}
