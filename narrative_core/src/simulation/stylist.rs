//! Style polish applied to drafts that passed the consistency check.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleResult {
    pub text: String,
    pub edits: Vec<String>,
}

/// Removes banned phrases from a draft.
#[derive(Debug, Clone, Default)]
pub struct Stylist {
    banned_phrases: Vec<String>,
}

impl Stylist {
    pub fn new<I>(banned_phrases: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            banned_phrases: banned_phrases
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    pub fn polish(&self, text: &str) -> StyleResult {
        let mut polished = text.to_string();
        let mut edits = Vec::new();
        for phrase in &self.banned_phrases {
            if polished.contains(phrase.as_str()) {
                polished = polished.replace(phrase.as_str(), "");
                edits.push(format!("removed phrase: {}", phrase));
            }
        }
        let mut text = polished.trim().to_string();
        text.push('\n');
        StyleResult { text, edits }
    }
}
