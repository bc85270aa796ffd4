//! Typed identifier for schedule profiles.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for a [`ScheduleProfile`](crate::profile::ScheduleProfile).
///
/// Assigned by the profile store on creation (SQLite rowid) and immutable
/// thereafter. A freshly built, not-yet-persisted profile carries
/// [`ProfileId::UNSAVED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(i64);

impl ProfileId {
    /// Placeholder id for a profile that has not been inserted yet.
    pub const UNSAVED: Self = Self(0);

    /// Wrap a store-assigned row id.
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Access the inner integer.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }

    /// Whether the store has assigned this id.
    #[must_use]
    pub fn is_saved(self) -> bool {
        self.0 != 0
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::UNSAVED
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProfileId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}
