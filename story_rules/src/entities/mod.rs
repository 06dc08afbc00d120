//! Character definitions for the story bible.

mod character;
mod components;
mod mutation;

pub use character::*;
pub use components::*;
pub use mutation::*;

use serde::{Deserialize, Serialize};

/// Identifier for a character, assigned sequentially as `char_001`, `char_002`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub String);

impl CharacterId {
    /// Build the id for the `n`-th registered character (1-based).
    pub fn from_sequence(n: usize) -> Self {
        Self(format!("char_{:03}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CharacterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CharacterId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_ids() {
        assert_eq!(CharacterId::from_sequence(1).as_str(), "char_001");
        assert_eq!(CharacterId::from_sequence(42).to_string(), "char_042");
        assert_eq!(CharacterId::from_sequence(1234).as_str(), "char_1234");
    }
}
