//! Flat-file JSON character store.
//!
//! # Responsibility
//! - Persist characters as one JSON array and notes as one JSON object.
//! - Serve as the fallback backend when no database is configured.
//!
//! # Invariants
//! - Every operation is a full read-modify-write of one file.
//! - Id uniqueness is checked before writing; the file has no constraint.
//! - Listing keeps insertion order.
//! - There is no locking: concurrent writers can lose each other's updates.

use super::{CharacterStore, StoreError, StoreResult};
use crate::model::character::{Character, CharacterId};
use crate::model::notes::Notes;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CHARACTERS_FILE_NAME: &str = "characters.json";
pub const NOTES_FILE_NAME: &str = "dm_notes.json";

/// Store over `characters.json` and `dm_notes.json` in one directory.
#[derive(Debug, Clone)]
pub struct JsonCharacterStore {
    characters_path: PathBuf,
    notes_path: PathBuf,
}

impl JsonCharacterStore {
    /// Creates `data_dir` and seeds missing files.
    ///
    /// Existing files are left untouched, so reopening is idempotent.
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir).map_err(|source| StoreError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let store = Self {
            characters_path: data_dir.join(CHARACTERS_FILE_NAME),
            notes_path: data_dir.join(NOTES_FILE_NAME),
        };

        if !store.characters_path.exists() {
            store.write_characters(&[])?;
        }
        if !store.notes_path.exists() {
            write_json(&store.notes_path, &Notes::default())?;
        }

        info!(
            "event=store_open module=store status=ok backend=json data_dir={}",
            data_dir.display()
        );
        Ok(store)
    }

    pub fn characters_path(&self) -> &Path {
        &self.characters_path
    }

    pub fn notes_path(&self) -> &Path {
        &self.notes_path
    }

    /// Replaces the whole character file with `characters`.
    ///
    /// This is the write half of every read-modify-write in this store. A
    /// writer holding a stale snapshot overwrites newer records.
    fn write_characters(&self, characters: &[Character]) -> StoreResult<()> {
        write_json(&self.characters_path, characters)
    }

    fn read_characters(&self) -> StoreResult<Vec<Character>> {
        Ok(read_json(&self.characters_path)?.unwrap_or_default())
    }
}

impl CharacterStore for JsonCharacterStore {
    fn load_characters(&self) -> StoreResult<Vec<Character>> {
        self.read_characters()
    }

    fn character_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self
            .read_characters()?
            .iter()
            .any(|character| character.id == id))
    }

    fn get_character(&self, id: &str) -> StoreResult<Option<Character>> {
        Ok(self
            .read_characters()?
            .into_iter()
            .find(|character| character.id == id))
    }

    fn insert_character(&self, character: &Character) -> StoreResult<()> {
        let mut characters = self.read_characters()?;
        if characters.iter().any(|existing| existing.id == character.id) {
            warn!(
                "event=character_insert module=store status=error backend=json error_code=duplicate_id id={}",
                character.id
            );
            return Err(StoreError::DuplicateId(character.id.clone()));
        }

        characters.push(character.clone());
        self.write_characters(&characters)
    }

    fn set_availability(&self, available_ids: &BTreeSet<CharacterId>) -> StoreResult<()> {
        let mut characters = self.read_characters()?;
        for character in &mut characters {
            character.available = available_ids.contains(&character.id);
        }
        self.write_characters(&characters)?;

        info!(
            "event=availability_replace module=store status=ok backend=json rows={} available={}",
            characters.len(),
            available_ids.len()
        );
        Ok(())
    }

    fn set_character_availability(&self, id: &str, available: bool) -> StoreResult<()> {
        let mut characters = self.read_characters()?;
        let target = characters
            .iter_mut()
            .find(|character| character.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        target.available = available;
        self.write_characters(&characters)
    }

    fn load_notes(&self) -> StoreResult<Notes> {
        Ok(read_json(&self.notes_path)?.unwrap_or_default())
    }

    fn save_notes(&self, notes: &Notes) -> StoreResult<()> {
        write_json(&self.notes_path, notes)
    }
}

/// Reads and decodes `path`; a missing file yields `None`.
fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| StoreError::Corrupt {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let encoded = serde_json::to_string_pretty(value).map_err(|err| StoreError::Corrupt {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    std::fs::write(path, encoded).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
