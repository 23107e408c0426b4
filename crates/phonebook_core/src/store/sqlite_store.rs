//! SQLite-backed character store.
//!
//! # Responsibility
//! - Persist characters and notes in the `characters` / `dm_notes` tables.
//! - Scope one connection to each operation.
//!
//! # Invariants
//! - Id uniqueness is enforced by the `characters` primary key.
//! - Each write commits before the operation returns.
//! - Listing is ordered case-insensitively by name, then by id.

use super::{CharacterStore, StoreError, StoreResult};
use crate::db::{connect_db, open_db};
use crate::model::character::{Character, CharacterId};
use crate::model::notes::Notes;
use log::{info, warn};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const CHARACTER_SELECT_SQL: &str = "SELECT
    id,
    name,
    role,
    bio,
    image,
    available
FROM characters";

const NOTES_ROW_ID: i64 = 1;

/// Relational store over one SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteCharacterStore {
    path: PathBuf,
}

impl SqliteCharacterStore {
    /// Bootstraps the database at `path` and returns a store handle.
    ///
    /// # Side effects
    /// - Creates the file and applies the schema when needed.
    /// - Seeds the empty notes row.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = open_db(&path)?;
        drop(conn);
        info!(
            "event=store_open module=store status=ok backend=sqlite path={}",
            path.display()
        );
        Ok(Self { path })
    }

    /// Database file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> StoreResult<Connection> {
        Ok(connect_db(&self.path)?)
    }
}

impl CharacterStore for SqliteCharacterStore {
    fn load_characters(&self) -> StoreResult<Vec<Character>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "{CHARACTER_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut characters = Vec::new();
        while let Some(row) = rows.next()? {
            characters.push(parse_character_row(row, &self.path)?);
        }
        Ok(characters)
    }

    fn character_exists(&self, id: &str) -> StoreResult<bool> {
        let conn = self.connect()?;
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM characters WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn get_character(&self, id: &str) -> StoreResult<Option<Character>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{CHARACTER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_character_row(row, &self.path)?));
        }
        Ok(None)
    }

    fn insert_character(&self, character: &Character) -> StoreResult<()> {
        let conn = self.connect()?;
        let result = conn.execute(
            "INSERT INTO characters (
                id,
                name,
                role,
                bio,
                image,
                available
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                character.id.as_str(),
                character.name.as_str(),
                character.role.as_str(),
                character.bio.as_str(),
                character.image.as_str(),
                bool_to_int(character.available),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_constraint_violation(&err) => {
                warn!(
                    "event=character_insert module=store status=error backend=sqlite error_code=duplicate_id id={}",
                    character.id
                );
                Err(StoreError::DuplicateId(character.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn set_availability(&self, available_ids: &BTreeSet<CharacterId>) -> StoreResult<()> {
        let mut conn = self.connect()?;
        // The id set is staged in a temp table so its size is not bounded by
        // SQLite's bound-variable limit.
        let tx = conn.transaction()?;
        tx.execute_batch(
            "CREATE TEMP TABLE IF NOT EXISTS available_ids (id TEXT PRIMARY KEY NOT NULL);
             DELETE FROM temp.available_ids;",
        )?;
        {
            let mut stage =
                tx.prepare("INSERT OR IGNORE INTO temp.available_ids (id) VALUES (?1);")?;
            for id in available_ids {
                stage.execute([id.as_str()])?;
            }
        }
        let changed = tx.execute(
            "UPDATE characters
             SET available = CASE
                WHEN id IN (SELECT id FROM temp.available_ids) THEN 1
                ELSE 0
             END;",
            [],
        )?;
        tx.execute_batch("DROP TABLE temp.available_ids;")?;
        tx.commit()?;

        info!(
            "event=availability_replace module=store status=ok backend=sqlite rows={} available={}",
            changed,
            available_ids.len()
        );
        Ok(())
    }

    fn set_character_availability(&self, id: &str, available: bool) -> StoreResult<()> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE characters SET available = ?2 WHERE id = ?1;",
            params![id, bool_to_int(available)],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn load_notes(&self) -> StoreResult<Notes> {
        let conn = self.connect()?;
        let notes = conn
            .query_row(
                "SELECT hooks, previous_session, misc FROM dm_notes WHERE id = ?1;",
                [NOTES_ROW_ID],
                |row| {
                    Ok(Notes {
                        hooks: row.get("hooks")?,
                        previous_session: row.get("previous_session")?,
                        misc: row.get("misc")?,
                    })
                },
            )
            .optional()?;
        Ok(notes.unwrap_or_default())
    }

    fn save_notes(&self, notes: &Notes) -> StoreResult<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO dm_notes (id, hooks, previous_session, misc)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                hooks = excluded.hooks,
                previous_session = excluded.previous_session,
                misc = excluded.misc;",
            params![
                NOTES_ROW_ID,
                notes.hooks.as_str(),
                notes.previous_session.as_str(),
                notes.misc.as_str(),
            ],
        )?;
        Ok(())
    }
}

fn parse_character_row(row: &Row<'_>, path: &Path) -> StoreResult<Character> {
    let id: String = row.get("id")?;
    let available = match row.get::<_, i64>("available")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                message: format!("invalid available value `{other}` for character `{id}`"),
            });
        }
    };

    Ok(Character {
        id,
        name: row.get("name")?,
        role: row.get("role")?,
        bio: row.get("bio")?,
        image: row.get("image")?,
        available,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::ConstraintViolation
    )
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
