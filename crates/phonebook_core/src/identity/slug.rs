//! Slug derivation and collision probing.
//!
//! # Responsibility
//! - Normalize display names into `[a-z0-9_]` slugs.
//! - Probe `base`, `base_2`, `base_3`, ... until the oracle reports a free id.
//!
//! # Invariants
//! - Output depends only on the name and the oracle answers.
//! - The first suffix tried is `_2`; suffixes increase by one.
//! - Probing stops with `IdExhausted` after `MAX_ID_SUFFIX`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slug used when a name contains no ASCII letters or digits.
pub const FALLBACK_SLUG: &str = "character";

/// Highest numeric suffix probed before giving up.
pub const MAX_ID_SUFFIX: u32 = 10_000;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid non-slug regex"));

/// Every candidate from `base` up to `base_{MAX_ID_SUFFIX}` is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdExhausted {
    pub base: String,
    pub max_suffix: u32,
}

impl Display for IdExhausted {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no free id for base `{}` after probing up to suffix {}",
            self.base, self.max_suffix
        )
    }
}

impl Error for IdExhausted {}

/// Normalizes a display name into a base slug.
///
/// Rules:
/// - trim and lowercase;
/// - every run of characters outside `[a-z0-9]` becomes one `_` (existing
///   underscores are part of such runs, so they collapse too);
/// - leading/trailing `_` are removed;
/// - an empty result becomes `FALLBACK_SLUG`.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let replaced = NON_SLUG_RE.replace_all(&lowered, "_");
    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Assigns a unique id for `name`.
///
/// `exists` answers whether a candidate id is already taken. Oracle errors
/// abort assignment and are returned unchanged.
///
/// # Errors
/// - Returns `IdExhausted` (converted into `E`) when `base` and every suffix
///   up to `MAX_ID_SUFFIX` are taken.
pub fn assign_id<E, F>(name: &str, exists: F) -> Result<String, E>
where
    E: From<IdExhausted>,
    F: FnMut(&str) -> Result<bool, E>,
{
    assign_id_bounded(name, MAX_ID_SUFFIX, exists)
}

fn assign_id_bounded<E, F>(name: &str, max_suffix: u32, mut exists: F) -> Result<String, E>
where
    E: From<IdExhausted>,
    F: FnMut(&str) -> Result<bool, E>,
{
    let base = slugify(name);
    if !exists(&base)? {
        return Ok(base);
    }

    for suffix in 2..=max_suffix {
        let candidate = format!("{base}_{suffix}");
        if !exists(&candidate)? {
            return Ok(candidate);
        }
    }

    Err(IdExhausted { base, max_suffix }.into())
}

#[cfg(test)]
mod tests {
    use super::{assign_id_bounded, slugify, IdExhausted, FALLBACK_SLUG};

    #[test]
    fn slugify_collapses_separators_and_trims() {
        assert_eq!(slugify("  Zara and Emil Allsup "), "zara_and_emil_allsup");
        assert_eq!(slugify("--Dr. O'Neil!!"), "dr_o_neil");
        assert_eq!(slugify("already_slugged__name"), "already_slugged_name");
    }

    #[test]
    fn slugify_falls_back_when_nothing_survives() {
        assert_eq!(slugify("   "), FALLBACK_SLUG);
        assert_eq!(slugify("!!!"), FALLBACK_SLUG);
        assert_eq!(slugify("Ñ"), FALLBACK_SLUG);
    }

    #[test]
    fn bounded_probe_stops_at_max_suffix() {
        let mut probes = 0;
        let err = assign_id_bounded::<IdExhausted, _>("Hal Bogle", 5, |_| {
            probes += 1;
            Ok(true)
        })
        .expect_err("every candidate is taken");
        assert_eq!(err.base, "hal_bogle");
        assert_eq!(err.max_suffix, 5);
        // base plus suffixes 2..=5
        assert_eq!(probes, 5);
    }
}
