//! Domain model for the NPC phonebook.
//!
//! # Responsibility
//! - Define the character and notes records shared by every storage backend.
//! - Own presence validation for new characters.
//!
//! # Invariants
//! - Every character is identified by a slug `CharacterId` that never changes.
//! - Notes are a singleton; there is no identity beyond "the" notes record.

pub mod character;
pub mod notes;
