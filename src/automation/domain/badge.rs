//! Badges awarded to users by automations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A badge in a user's badge list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    name: String,
    description: Option<String>,
    awarded_at: DateTime<Utc>,
}

impl Badge {
    /// Creates a badge awarded at the given time.
    #[must_use]
    pub const fn new(name: String, description: Option<String>, awarded_at: DateTime<Utc>) -> Self {
        Self {
            name,
            description,
            awarded_at,
        }
    }

    /// Returns the badge name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the badge description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns when the badge was awarded.
    #[must_use]
    pub const fn awarded_at(&self) -> DateTime<Utc> {
        self.awarded_at
    }
}
