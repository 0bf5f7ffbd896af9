//! Status names and the ordered per-project status registry.

use super::ProjectDomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Color assigned to a status when none is given.
pub const DEFAULT_STATUS_COLOR: &str = "#3498db";

const DEFAULT_STATUSES: [(&str, &str); 3] = [
    ("To Do", "#3498db"),
    ("In Progress", "#f39c12"),
    ("Done", "#2ecc71"),
];

/// Trimmed, non-empty status column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatusName(String);

impl StatusName {
    /// Creates a validated status name.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyStatusName`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProjectDomainError::EmptyStatusName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the status name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StatusName {
    type Error = ProjectDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StatusName> for String {
    fn from(value: StatusName) -> Self {
        value.0
    }
}

impl AsRef<str> for StatusName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for StatusName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StatusName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for StatusName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unvalidated status definition supplied by a project owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDefinition {
    /// Requested column name.
    pub name: String,
    /// Requested display color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl StatusDefinition {
    /// Creates a definition with the default color.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }

    /// Sets the display color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// One column of a project's status registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    name: StatusName,
    color: String,
    position: usize,
}

impl StatusEntry {
    /// Returns the status name.
    #[must_use]
    pub const fn name(&self) -> &StatusName {
        &self.name
    }

    /// Returns the display color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Returns the zero-based column position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }
}

/// Ordered, non-empty set of valid status names for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusRegistry(Vec<StatusEntry>);

impl StatusRegistry {
    /// Returns the canonical registry seeded into new projects:
    /// `To Do`, `In Progress`, `Done`.
    #[must_use]
    pub fn defaults() -> Self {
        let entries = DEFAULT_STATUSES
            .iter()
            .enumerate()
            .map(|(position, (name, color))| StatusEntry {
                name: StatusName((*name).to_owned()),
                color: (*color).to_owned(),
                position,
            })
            .collect();
        Self(entries)
    }

    /// Builds a registry from owner-supplied definitions, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyStatusRegistry`] when no
    /// definitions are given, [`ProjectDomainError::EmptyStatusName`] for a
    /// blank name, and [`ProjectDomainError::DuplicateStatus`] when two
    /// definitions share a trimmed name.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = StatusDefinition>,
    ) -> Result<Self, ProjectDomainError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (position, definition) in definitions.into_iter().enumerate() {
            let name = StatusName::new(definition.name)?;
            if !seen.insert(name.clone()) {
                return Err(ProjectDomainError::DuplicateStatus(name.0));
            }
            let color = definition
                .color
                .map(|raw| raw.trim().to_owned())
                .filter(|trimmed| !trimmed.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS_COLOR.to_owned());
            entries.push(StatusEntry {
                name,
                color,
                position,
            });
        }
        if entries.is_empty() {
            return Err(ProjectDomainError::EmptyStatusRegistry);
        }
        Ok(Self(entries))
    }

    /// Returns the status new tasks land in when none is requested.
    #[must_use]
    pub fn initial(&self) -> Option<&StatusName> {
        self.0.first().map(StatusEntry::name)
    }

    /// Returns `true` when the registry defines the given status.
    #[must_use]
    pub fn contains(&self, name: &StatusName) -> bool {
        self.0.iter().any(|entry| entry.name == *name)
    }

    /// Returns the registry entries in column order.
    #[must_use]
    pub fn entries(&self) -> &[StatusEntry] {
        &self.0
    }

    /// Iterates over the status names in column order.
    pub fn names(&self) -> impl Iterator<Item = &StatusName> {
        self.0.iter().map(StatusEntry::name)
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the registry has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}
