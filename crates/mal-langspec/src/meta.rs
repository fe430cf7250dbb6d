//! Free-form metadata attached to specification entities.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::LangError;

/// An ordered map of named info strings, such as `{"en": "A networked host"}`.
///
/// Every entity in a specification carries one, possibly empty. Keys are
/// identifiers and keep their insertion order through serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta {
    entries: IndexMap<String, String>,
}

impl Meta {
    pub(crate) fn new(entries: IndexMap<String, String>) -> Self {
        Meta { entries }
    }

    pub fn has_entry(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entry(&self, key: &str) -> Result<&str, LangError> {
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| LangError::EntryNotFound(key.to_owned()))
    }

    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
