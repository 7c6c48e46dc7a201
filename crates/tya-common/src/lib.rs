//! Shared infrastructure for the tya type algebra engine.
//!
//! Currently this is just the string interner. Anything needed by more than
//! one crate in the workspace lives here so the solver stays free of
//! infrastructure concerns.

pub mod interner;

pub use interner::{Atom, ShardedInterner};
