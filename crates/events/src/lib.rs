//! Reactive state channels.
//!
//! Services publish whole values (a rebuilt menu tree, the active org id) and
//! UI-side consumers subscribe to them. New subscribers receive the latest
//! value immediately, then every subsequent one.

pub mod bus;
pub mod in_memory_bus;

pub use bus::{StateBus, Subscription};
pub use in_memory_bus::{InMemoryStateBus, StateBusError};
