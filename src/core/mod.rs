//! Core primitives.
//!
//! Integrity helpers shared by the rest of the crate.

pub mod hash;

// Re-export core types
pub use hash::{ArtifactHash, ArtifactHasher, hash_bundle};
