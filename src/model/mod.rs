//! Core data structures for structure inference.
//!
//! This module defines the plain data that flows through `struct-forge`: elements and points,
//! immutable atoms, the per-run [`AtomSet`](atom_set::AtomSet) universe, partially grown
//! molecules, index-addressed connectivity and bond-order matrices, and the labeled records
//! emitted by the batch pipeline. None of these types perform searches themselves; the
//! algorithms live under `ops` and `batch`.

pub mod atom;
pub mod atom_set;
pub mod geometry;
pub mod graph;
pub mod molecule;
pub mod record;
pub mod types;
