//! `guardian-core`: shared building blocks for the Guardian navigation core.
//!
//! This crate contains **pure** text utilities plus the durable key/value
//! storage seam. No routing or menu semantics live here.

pub mod error;
pub mod id;
pub mod storage;
pub mod text;

pub use error::{StorageError, StorageResult};
pub use id::{OrgId, SectionId};
pub use storage::{InMemoryStore, JsonFileStore, KeyValueStore};
