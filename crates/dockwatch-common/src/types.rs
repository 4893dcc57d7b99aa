//! Domain primitive types used across the dockwatch workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier the container runtime assigned to a running instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuntimeId(String);

impl RuntimeId {
    /// Number of characters shown by [`RuntimeId::short`].
    pub const SHORT_LEN: usize = 12;

    /// Creates a runtime ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the abbreviated form used in tables.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(Self::SHORT_LEN)
            .map_or(self.0.as_str(), |(idx, _)| &self.0[..idx])
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
