//! Abstraction layer for parallel iteration.
//!
//! With the `parallel` feature enabled this re-exports the rayon traits behind the batch
//! orchestrator's `par_chunks(..).for_each(..)`. Without it, `par_chunks` falls back to
//! `slice::chunks` and the same call runs serially.

#[cfg(feature = "parallel")]
pub use rayon::prelude::{ParallelIterator, ParallelSlice};

#[cfg(not(feature = "parallel"))]
pub use self::fallback::*;

#[cfg(not(feature = "parallel"))]
mod fallback {
    pub use std::iter::Iterator as ParallelIterator;

    /// Shim trait to allow `par_chunks()` on slices.
    pub trait ParallelSlice<T> {
        fn par_chunks(&self, chunk_size: usize) -> std::slice::Chunks<'_, T>;
    }

    impl<T> ParallelSlice<T> for [T] {
        fn par_chunks(&self, chunk_size: usize) -> std::slice::Chunks<'_, T> {
            self.chunks(chunk_size)
        }
    }
}
