//! Character domain model.
//!
//! # Responsibility
//! - Define the canonical NPC record persisted by storage backends.
//! - Validate creation input before an id is assigned.
//!
//! # Invariants
//! - `id` is a URL-safe slug, unique across the store and immutable.
//! - `name`, `role` and `bio` are non-empty after trimming.
//! - `available` starts as `false`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slug identifier of a character (for example `hal_bogle_2`).
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type CharacterId = String;

/// Image filename used when the GM does not supply one.
pub const PLACEHOLDER_IMAGE: &str = "placeholder.png";

/// Canonical NPC record.
///
/// Field names double as the JSON keys of the flat-file backend and the
/// column names of the relational backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Slug assigned once at creation.
    pub id: CharacterId,
    /// Display name as entered by the GM.
    pub name: String,
    pub role: String,
    pub bio: String,
    /// Filename reference, `PLACEHOLDER_IMAGE` when none was given.
    pub image: String,
    /// Whether players can currently see this character.
    #[serde(default)]
    pub available: bool,
}

/// Creation input for one character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCharacter {
    pub name: String,
    pub role: String,
    pub bio: String,
    /// Optional image filename. Blank values fall back to the placeholder.
    pub image: Option<String>,
}

/// Validation error for character creation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterValidationError {
    /// A required field is missing or whitespace-only.
    MissingField(&'static str),
}

impl Display for CharacterValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "`{field}` is required and cannot be blank"),
        }
    }
}

impl Error for CharacterValidationError {}

impl NewCharacter {
    /// Builds creation input without an explicit image.
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        bio: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            bio: bio.into(),
            image: None,
        }
    }

    /// Sets the image filename reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Checks presence of every required field.
    ///
    /// Fields are checked in `name`, `role`, `bio` order so the first blank
    /// one is reported.
    pub fn validate(&self) -> Result<(), CharacterValidationError> {
        for (field, value) in [
            ("name", self.name.as_str()),
            ("role", self.role.as_str()),
            ("bio", self.bio.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(CharacterValidationError::MissingField(field));
            }
        }
        Ok(())
    }

    /// Turns validated input into a persisted record shape under `id`.
    ///
    /// # Invariants
    /// - Text fields are trimmed.
    /// - `available` is `false`.
    pub fn into_character(self, id: CharacterId) -> Character {
        let image = self
            .image
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE)
            .to_string();

        Character {
            id,
            name: self.name.trim().to_string(),
            role: self.role.trim().to_string(),
            bio: self.bio.trim().to_string(),
            image,
            available: false,
        }
    }
}
