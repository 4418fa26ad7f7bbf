//! Operating modes and the selector that tracks the active one.
//!
//! The set of modes is closed: a [`ModeCatalog`] is built once and the
//! [`ModeSelector`] only ever points at one of its entries. Selecting an
//! unknown id is rejected and leaves the previous mode active.

use serde::{Deserialize, Serialize};

/// Id of the mode that is active when a selector is created with defaults.
pub const DEFAULT_MODE_ID: &str = "1";

/// Errors from building a catalog or selecting a mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModeError {
    #[error("unknown mode: {0}")]
    UnknownMode(String),
    #[error("duplicate mode id: {0}")]
    DuplicateMode(String),
    #[error("mode catalog is empty")]
    EmptyCatalog,
}

/// One operating mode as presented to the user.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ModeSpec {
    /// Identifier sent to the server in the `option` field.
    pub id: String,
    /// Card title shown in the UI.
    pub title: String,
    /// Whether file attachments apply to this mode.
    pub requires_attachments: bool,
}

impl ModeSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, requires_attachments: bool) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            requires_attachments,
        }
    }
}

// ── Catalog ────────────────────────────────────────────────────────

/// The closed, ordered set of modes a selector can choose from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeCatalog {
    modes: Vec<ModeSpec>,
}

impl ModeCatalog {
    /// Build a catalog, rejecting an empty list or repeated ids.
    pub fn new(modes: Vec<ModeSpec>) -> Result<Self, ModeError> {
        if modes.is_empty() {
            return Err(ModeError::EmptyCatalog);
        }
        for (i, mode) in modes.iter().enumerate() {
            if modes[..i].iter().any(|m| m.id == mode.id) {
                return Err(ModeError::DuplicateMode(mode.id.clone()));
            }
        }
        Ok(Self { modes })
    }

    pub fn get(&self, id: &str) -> Option<&ModeSpec> {
        self.modes.iter().find(|m| m.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.modes.iter().position(|m| m.id == id)
    }

    pub fn modes(&self) -> &[ModeSpec] {
        &self.modes
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl Default for ModeCatalog {
    /// The four assistant modes. Only the StackWalls mode answers from the
    /// server's own reference text, so it is the one without attachments.
    fn default() -> Self {
        Self {
            modes: vec![
                ModeSpec::new("1", "Discuss about project", true),
                ModeSpec::new("2", "Know more about StackWalls", false),
                ModeSpec::new("3", "Your AI-powered co-founder", true),
                ModeSpec::new("4", "How to choose best freelancer", true),
            ],
        }
    }
}

// ── Selector ───────────────────────────────────────────────────────

/// Tracks the active mode within a [`ModeCatalog`].
#[derive(Clone, Debug)]
pub struct ModeSelector {
    catalog: ModeCatalog,
    active: usize,
}

impl ModeSelector {
    /// Create a selector with `default_id` active.
    pub fn new(catalog: ModeCatalog, default_id: &str) -> Result<Self, ModeError> {
        let active = catalog
            .position(default_id)
            .ok_or_else(|| ModeError::UnknownMode(default_id.to_string()))?;
        Ok(Self { catalog, active })
    }

    /// Make `id` the active mode. Unknown ids keep the current mode.
    pub fn select_mode(&mut self, id: &str) -> Result<&ModeSpec, ModeError> {
        let idx = self
            .catalog
            .position(id)
            .ok_or_else(|| ModeError::UnknownMode(id.to_string()))?;
        self.active = idx;
        Ok(&self.catalog.modes[idx])
    }

    /// Step to the next (or previous) mode, wrapping around.
    pub fn cycle(&mut self, forward: bool) -> &ModeSpec {
        let len = self.catalog.len();
        self.active = if forward {
            (self.active + 1) % len
        } else {
            (self.active + len - 1) % len
        };
        &self.catalog.modes[self.active]
    }

    pub fn active_mode(&self) -> &ModeSpec {
        &self.catalog.modes[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn requires_attachments(&self) -> bool {
        self.active_mode().requires_attachments
    }

    pub fn catalog(&self) -> &ModeCatalog {
        &self.catalog
    }
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self {
            catalog: ModeCatalog::default(),
            active: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selector_starts_on_mode_one() {
        let selector = ModeSelector::default();
        assert_eq!(selector.active_mode().id, DEFAULT_MODE_ID);
        assert!(selector.requires_attachments());
    }

    #[test]
    fn only_mode_two_skips_attachments() {
        let mut selector = ModeSelector::default();
        let ids: Vec<String> = selector
            .catalog()
            .modes()
            .iter()
            .map(|m| m.id.clone())
            .collect();
        for id in ids {
            let mode = selector.select_mode(&id).unwrap();
            assert_eq!(mode.requires_attachments, id != "2", "mode {id}");
            assert_eq!(selector.requires_attachments(), id != "2");
        }
    }

    #[test]
    fn unknown_mode_keeps_previous() {
        let mut selector = ModeSelector::default();
        selector.select_mode("3").unwrap();

        let err = selector.select_mode("7").unwrap_err();
        assert_eq!(err, ModeError::UnknownMode("7".into()));
        assert_eq!(selector.active_mode().id, "3");
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let mut selector = ModeSelector::default();
        assert_eq!(selector.cycle(false).id, "4");
        assert_eq!(selector.cycle(true).id, "1");
        assert_eq!(selector.cycle(true).id, "2");
    }

    #[test]
    fn catalog_rejects_duplicates_and_empty() {
        assert_eq!(ModeCatalog::new(vec![]), Err(ModeError::EmptyCatalog));

        let dup = ModeCatalog::new(vec![
            ModeSpec::new("1", "a", true),
            ModeSpec::new("1", "b", false),
        ]);
        assert_eq!(dup, Err(ModeError::DuplicateMode("1".into())));
    }

    #[test]
    fn custom_catalog_with_unknown_default_fails() {
        let catalog = ModeCatalog::new(vec![ModeSpec::new("alpha", "Alpha", false)]).unwrap();
        assert!(ModeSelector::new(catalog.clone(), "1").is_err());

        let selector = ModeSelector::new(catalog, "alpha").unwrap();
        assert!(!selector.requires_attachments());
    }
}
