//! Character repository façade.
//!
//! # Responsibility
//! - Validate and create characters with slug ids.
//! - Expose listing, lookup and availability toggles to callers.
//! - Load and save the GM notes singleton.
//!
//! # Invariants
//! - Ids come from `assign_id` with the store as existence oracle.
//! - New characters start unavailable with the placeholder image unless one
//!   was supplied.
//! - Read operations never mutate the store.

use crate::identity::slug::{assign_id, IdExhausted};
use crate::model::character::{Character, CharacterId, CharacterValidationError, NewCharacter};
use crate::model::notes::Notes;
use crate::store::{CharacterStore, StoreError};
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default town roster created by `seed_roster` as `(name, role)`.
pub const DEFAULT_ROSTER: &[(&str, &str)] = &[
    ("Luiz Adams", "Deputy"),
    ("Zara and Emil Allsup", "Gas Station Market Owners"),
    ("Hal Bogle", "Rich Guy"),
    ("Marcus Hensley", "Colonel"),
    ("Carrol Higgins", "Comic Book Store Owner"),
    ("Molly Hopper", "Sheriff"),
    ("Dorris Macintosh", "Librarian"),
    ("Darnell Mantell", "Science Teacher"),
    ("Vic Pollard", "Mechanic"),
];

const ROSTER_BIO: &str = "No notes yet.";

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for character and notes use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// A required field is blank.
    Validation(CharacterValidationError),
    /// Insert collided with an existing id despite assignment.
    DuplicateId(CharacterId),
    /// No character has the requested id.
    NotFound(CharacterId),
    /// Collision probing ran out of suffixes.
    IdExhausted(IdExhausted),
    /// The backend failed or holds unreadable data.
    StorageUnavailable(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "character id already exists: {id}"),
            Self::NotFound(id) => write!(f, "character not found: {id}"),
            Self::IdExhausted(err) => write!(f, "{err}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::IdExhausted(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            Self::DuplicateId(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<CharacterValidationError> for ServiceError {
    fn from(value: CharacterValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<IdExhausted> for ServiceError {
    fn from(value: IdExhausted) -> Self {
        Self::IdExhausted(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateId(id) => Self::DuplicateId(id),
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::StorageUnavailable(other),
        }
    }
}

/// Character repository over an injected store.
pub struct CharacterService<S: CharacterStore> {
    store: S,
}

impl<S: CharacterStore> CharacterService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a character with the placeholder image.
    ///
    /// # Errors
    /// - `Validation` when `name`, `role` or `bio` is blank; nothing is stored.
    /// - `DuplicateId`, `IdExhausted` or `StorageUnavailable` from persistence.
    pub fn create_character(
        &self,
        name: impl Into<String>,
        role: impl Into<String>,
        bio: impl Into<String>,
    ) -> ServiceResult<Character> {
        self.create_character_with(NewCharacter::new(name, role, bio))
    }

    /// Creates a character from full creation input.
    ///
    /// Returns the record exactly as persisted.
    pub fn create_character_with(&self, input: NewCharacter) -> ServiceResult<Character> {
        if let Err(err) = input.validate() {
            warn!(
                "event=character_create module=service status=error error_code=validation error={}",
                err
            );
            return Err(err.into());
        }

        let id = assign_id(input.name.as_str(), |candidate| {
            self.store
                .character_exists(candidate)
                .map_err(ServiceError::from)
        })?;
        let character = input.into_character(id);
        self.store.insert_character(&character)?;

        info!(
            "event=character_create module=service status=ok id={}",
            character.id
        );
        Ok(character)
    }

    /// Lists every character in backend order.
    pub fn list_characters(&self) -> ServiceResult<Vec<Character>> {
        Ok(self.store.load_characters()?)
    }

    /// Lists characters currently visible to players.
    pub fn list_available_characters(&self) -> ServiceResult<Vec<Character>> {
        Ok(self
            .store
            .load_characters()?
            .into_iter()
            .filter(|character| character.available)
            .collect())
    }

    /// Gets one character by id.
    ///
    /// # Errors
    /// - `NotFound` when no character has `id`.
    pub fn get_character(&self, id: &str) -> ServiceResult<Character> {
        self.store
            .get_character(id)?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// Replaces availability for all characters with membership in
    /// `available_ids`.
    pub fn update_availability(&self, available_ids: &BTreeSet<CharacterId>) -> ServiceResult<()> {
        self.store.set_availability(available_ids)?;
        Ok(())
    }

    /// Makes one character visible to players.
    pub fn mark_available(&self, id: &str) -> ServiceResult<()> {
        self.store.set_character_availability(id, true)?;
        Ok(())
    }

    /// Hides one character from players.
    pub fn mark_unavailable(&self, id: &str) -> ServiceResult<()> {
        self.store.set_character_availability(id, false)?;
        Ok(())
    }

    /// Loads GM notes; empty notes when nothing was saved yet.
    pub fn load_notes(&self) -> ServiceResult<Notes> {
        Ok(self.store.load_notes()?)
    }

    /// Overwrites GM notes.
    pub fn save_notes(
        &self,
        hooks: impl Into<String>,
        previous_session: impl Into<String>,
        misc: impl Into<String>,
    ) -> ServiceResult<()> {
        self.store
            .save_notes(&Notes::new(hooks, previous_session, misc))?;
        info!("event=notes_save module=service status=ok");
        Ok(())
    }

    /// Creates `DEFAULT_ROSTER` when the store has no characters.
    ///
    /// Returns the number of characters created, `0` for a non-empty store.
    pub fn seed_roster(&self) -> ServiceResult<usize> {
        if !self.store.load_characters()?.is_empty() {
            info!("event=roster_seed module=service status=skipped reason=not_empty");
            return Ok(0);
        }

        for (name, role) in DEFAULT_ROSTER {
            self.create_character(*name, *role, ROSTER_BIO)?;
        }

        info!(
            "event=roster_seed module=service status=ok created={}",
            DEFAULT_ROSTER.len()
        );
        Ok(DEFAULT_ROSTER.len())
    }
}
