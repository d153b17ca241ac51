//! Repository layer — connection-scoped note-store operations.
//!
//! The note store is insert-only: there is deliberately no update function
//! for `medical_notes`, so persisted records stay immutable.

mod note;

pub use note::*;
