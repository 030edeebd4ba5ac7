//! The structure-inference engine: candidate enumeration and bonding-model resolution.
//!
//! [`find_candidates`] grows every plausible molecule from a geometry under the active
//! [`FilterSet`], and [`resolve`] turns the connectivity of one candidate into bond orders
//! with formal charges or radicals. Both share a common [`Error`] type so callers can tell
//! unsupported chemistry apart from an unsatisfiable connectivity.

mod enumerate;
mod error;
mod filter;
mod resolve;

pub use filter::{Filter, FilterParams, FilterSet, bond_angle};

pub use enumerate::{
    CandidateSet, EnumerationCache, EnumerationConfig, enumerate, find_candidates,
};

pub use resolve::{
    BondingModel, ResolveMode, ResolverConfig, formal_charge, resolve, resolve_candidate,
};

pub use error::Error;
