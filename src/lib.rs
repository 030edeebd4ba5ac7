//! # StructForge
//!
//! **StructForge** infers plausible molecular bonding graphs from raw 3-D coordinates and turns
//! them into labeled training data: every candidate structure is paired with whether its
//! canonical identifier matches that of the geometry it came from.
//!
//! ## Features
//!
//! - **Filtered enumeration** – A memoized dynamic-programming search grows molecules atom by atom from a peripheral seed, keeping only extensions that pass the active geometric and valence filters.
//! - **Bond-order resolution** – Connectivity graphs are turned into bond orders with formal charges or radicals by a bounded backtracking search that minimizes total charge.
//! - **Sign-ambiguous coordinates** – Geometries known only up to coordinate signs can be expanded into their mirror images, with at most one image per atom in every candidate.
//! - **Parallel batches** – Many geometries are processed on a worker pool with per-item failure counting and a pluggable canonical-identifier oracle.
//! - **Embedded chemistry** – Valence, electron, radius, and bond-length tables ship inside the crate as TOML.

mod db;
mod model;
mod utils;

pub mod batch;
pub mod io;
pub mod ops;

pub use db::{is_supported, supported_elements};
pub use model::atom::Atom;
pub use model::atom_set::AtomSet;
pub use model::geometry::Geometry;
pub use model::graph::{BondOrderMatrix, ConnectivityGraph};
pub use model::molecule::{PartialMolecule, Signature};
pub use model::record::LabeledRecord;
pub use model::types::{AtomId, Element, Point};
