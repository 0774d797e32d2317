//! Event handling: applies pair events to the store and drives the pricing engine.
//!
//! - [`EventHandler`] - Per-event state updates, price recomputation and aggregates
//! - [`Replay`] - JSON-lines event replay over an in-memory store

mod events;
mod handler;
mod replay;

pub use events::{PoolEvent, TokenInfo};
pub use handler::{EventHandler, EventOutcome};
pub use replay::{Replay, ReplayStats, Summary, TokenSummary};
