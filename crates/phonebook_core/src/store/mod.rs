//! Storage backends for characters and GM notes.
//!
//! # Responsibility
//! - Define the `CharacterStore` contract shared by every backend.
//! - Provide the SQLite and JSON-file implementations.
//! - Select and bootstrap one backend from `StorageConfig`.
//!
//! # Invariants
//! - Character ids are unique; inserting a taken id fails with `DuplicateId`.
//! - `set_availability` rewrites the flag of every stored character.
//! - `load_notes` yields empty notes when nothing was ever saved.

use crate::config::StorageConfig;
use crate::db::DbError;
use crate::model::character::{Character, CharacterId};
use crate::model::notes::Notes;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod json_store;
pub mod sqlite_store;

pub use json_store::JsonCharacterStore;
pub use sqlite_store::SqliteCharacterStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage error shared by all backends.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite open, bootstrap or query failure.
    Db(DbError),
    /// Filesystem failure on a backend file.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Backend data exists but cannot be decoded.
    Corrupt { path: PathBuf, message: String },
    /// Insert of an id that is already stored.
    DuplicateId(CharacterId),
    /// Targeted update of an id that is not stored.
    NotFound(CharacterId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Corrupt { path, message } => {
                write!(f, "corrupt store file `{}`: {message}", path.display())
            }
            Self::DuplicateId(id) => write!(f, "character id already exists: {id}"),
            Self::NotFound(id) => write!(f, "character not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for characters and the notes singleton.
pub trait CharacterStore {
    /// Lists all characters. Ordering is backend specific.
    fn load_characters(&self) -> StoreResult<Vec<Character>>;
    fn character_exists(&self, id: &str) -> StoreResult<bool>;
    fn get_character(&self, id: &str) -> StoreResult<Option<Character>>;
    /// Persists a new character; fails with `DuplicateId` for a taken id.
    fn insert_character(&self, character: &Character) -> StoreResult<()>;
    /// Sets `available` to membership in `available_ids` for every character.
    fn set_availability(&self, available_ids: &BTreeSet<CharacterId>) -> StoreResult<()>;
    /// Sets `available` on one character; fails with `NotFound` on miss.
    fn set_character_availability(&self, id: &str, available: bool) -> StoreResult<()>;
    fn load_notes(&self) -> StoreResult<Notes>;
    /// Overwrites the notes singleton.
    fn save_notes(&self, notes: &Notes) -> StoreResult<()>;
}

impl<S: CharacterStore + ?Sized> CharacterStore for Box<S> {
    fn load_characters(&self) -> StoreResult<Vec<Character>> {
        (**self).load_characters()
    }

    fn character_exists(&self, id: &str) -> StoreResult<bool> {
        (**self).character_exists(id)
    }

    fn get_character(&self, id: &str) -> StoreResult<Option<Character>> {
        (**self).get_character(id)
    }

    fn insert_character(&self, character: &Character) -> StoreResult<()> {
        (**self).insert_character(character)
    }

    fn set_availability(&self, available_ids: &BTreeSet<CharacterId>) -> StoreResult<()> {
        (**self).set_availability(available_ids)
    }

    fn set_character_availability(&self, id: &str, available: bool) -> StoreResult<()> {
        (**self).set_character_availability(id, available)
    }

    fn load_notes(&self) -> StoreResult<Notes> {
        (**self).load_notes()
    }

    fn save_notes(&self, notes: &Notes) -> StoreResult<()> {
        (**self).save_notes(notes)
    }
}

/// Opens and bootstraps the backend selected by `config`.
///
/// Call once from the composition root; the returned store is then injected
/// into `CharacterService`.
pub fn open_store(config: &StorageConfig) -> StoreResult<Box<dyn CharacterStore>> {
    match config {
        StorageConfig::Sqlite { path } => Ok(Box::new(SqliteCharacterStore::open(path)?)),
        StorageConfig::JsonFiles { data_dir } => {
            Ok(Box::new(JsonCharacterStore::open(data_dir)?))
        }
    }
}
