//! Core domain logic for the NPC phonebook.
//! This crate owns character identity, storage backends and the GM notes pad.

pub mod config;
pub mod db;
pub mod identity;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{ConfigError, StorageConfig};
pub use identity::slug::{assign_id, slugify, IdExhausted, MAX_ID_SUFFIX};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::character::{
    Character, CharacterId, CharacterValidationError, NewCharacter, PLACEHOLDER_IMAGE,
};
pub use model::notes::Notes;
pub use service::character_service::{
    CharacterService, ServiceError, ServiceResult, DEFAULT_ROSTER,
};
pub use store::{
    open_store, CharacterStore, JsonCharacterStore, SqliteCharacterStore, StoreError,
    StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
