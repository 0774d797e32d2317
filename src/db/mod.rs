//! Entity storage for the pricing engine.
//!
//! The engine talks to storage only through [`EntityStore`] and
//! [`PairRegistry`]; [`MemoryStore`] implements both for replays and tests.

mod memory;
pub mod models;
mod store;

pub use memory::MemoryStore;
pub use store::{EntityStore, PairRegistry};
