use crate::keyspace::KeySpaceError;
use serde::Serialize;
use std::collections::BTreeSet;

///
/// ChoiceEntry
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct ChoiceEntry {
    pub value: i64,
    pub name: &'static str,
    pub display: &'static str,
}

///
/// Choices
///
/// Readable integer enumeration used by choice fields.
///
/// ```ignore
/// let status = Choices::new(&[(100, "ACTIVE", "Active"), (200, "BANNED", "Banned")]);
/// assert_eq!(status.value_of("BANNED"), Some(200));
/// ```
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct Choices {
    entries: Vec<ChoiceEntry>,
}

impl Choices {
    /// Build without checking for duplicates; key-space validation reports
    /// them later through `validate`.
    #[must_use]
    pub fn new(entries: &[(i64, &'static str, &'static str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|&(value, name, display)| ChoiceEntry {
                    value,
                    name,
                    display,
                })
                .collect(),
        }
    }

    /// Build and reject duplicate numerals or names immediately.
    pub fn try_new(entries: &[(i64, &'static str, &'static str)]) -> Result<Self, KeySpaceError> {
        let choices = Self::new(entries);
        choices.validate()?;

        Ok(choices)
    }

    pub fn validate(&self) -> Result<(), KeySpaceError> {
        let mut numerals = BTreeSet::new();
        let mut names = BTreeSet::new();

        for entry in &self.entries {
            if !numerals.insert(entry.value) {
                return Err(KeySpaceError::ReusedFieldKey {
                    key: format!("numeral={}", entry.value),
                    pack: "Choices".to_string(),
                });
            }
            if !names.insert(entry.name) {
                return Err(KeySpaceError::ReusedFieldKey {
                    key: format!("name={}", entry.name),
                    pack: "Choices".to_string(),
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        self.entries.iter().any(|e| e.value == value)
    }

    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.value)
    }

    #[must_use]
    pub fn name_of(&self, value: i64) -> Option<&'static str> {
        self.entry(value).map(|e| e.name)
    }

    #[must_use]
    pub fn display(&self, value: i64) -> Option<&'static str> {
        self.entry(value).map(|e| e.display)
    }

    #[must_use]
    pub fn slug(&self, value: i64) -> Option<String> {
        self.name_of(value).map(str::to_lowercase)
    }

    #[must_use]
    pub fn for_slug(&self, slug: &str) -> Option<i64> {
        self.value_of(&slug.to_uppercase())
    }

    #[must_use]
    pub fn entry(&self, value: i64) -> Option<&ChoiceEntry> {
        self.entries.iter().find(|e| e.value == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChoiceEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
