//! Character identity assignment.
//!
//! # Responsibility
//! - Derive URL-safe slugs from display names.
//! - Resolve slug collisions deterministically against an existence oracle.
//!
//! # Invariants
//! - Assignment never returns an id the oracle reports as taken.
//! - Collision probing is bounded by `MAX_ID_SUFFIX`.

pub mod slug;
