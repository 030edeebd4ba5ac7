//! Helpers shared across the library.
//!
//! Currently only the parallel-iteration shim, which lets the batch orchestrator be written
//! once against the rayon API and still build without the `parallel` feature.

pub mod parallel;
