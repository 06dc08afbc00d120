//! Chapter ordering used for log storage and replay cutoffs.

use std::cmp::Ordering;

/// Sort key for a chapter id.
///
/// The first run of ASCII digits anywhere in the id is the chapter number.
/// Numbered chapters sort by that number, then by the full id. Chapters with
/// no digits sort after every numbered chapter, by the full id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterOrder {
    number: Option<u64>,
    id: String,
}

impl ChapterOrder {
    /// Compute the sort key for a chapter id.
    pub fn of(chapter_id: &str) -> Self {
        Self {
            number: chapter_number(chapter_id),
            id: chapter_id.to_string(),
        }
    }

    /// The extracted chapter number, if any.
    pub fn number(&self) -> Option<u64> {
        self.number
    }

    /// The chapter id this key was computed from.
    pub fn chapter_id(&self) -> &str {
        &self.id
    }
}

impl PartialOrd for ChapterOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChapterOrder {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.number, other.number) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.id.cmp(&other.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.id.cmp(&other.id),
        }
    }
}

/// Extract the first run of digits in a chapter id.
///
/// Runs too long for `u64` saturate so they still sort after every other number.
pub fn chapter_number(chapter_id: &str) -> Option<u64> {
    let start = chapter_id.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = {
        let rest = &chapter_id[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Compare two chapter ids by chapter order.
pub fn compare_chapters(a: &str, b: &str) -> Ordering {
    ChapterOrder::of(a).cmp(&ChapterOrder::of(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_order() {
        assert_eq!(compare_chapters("ch_002", "ch_001"), Ordering::Greater);
        assert_eq!(compare_chapters("ch_010", "ch_9"), Ordering::Greater);
        assert_eq!(compare_chapters("ch_001", "ch_001"), Ordering::Equal);
    }

    #[test]
    fn test_digitless_sorts_last() {
        assert_eq!(compare_chapters("prologue", "ch_999"), Ordering::Greater);
        assert_eq!(compare_chapters("epilogue", "prologue"), Ordering::Less);
    }

    #[test]
    fn test_first_digit_run_wins() {
        assert_eq!(chapter_number("vol2_ch015"), Some(2));
        assert_eq!(chapter_number("第12章"), Some(12));
        assert_eq!(chapter_number("序章"), None);
    }

    #[test]
    fn test_tie_break_by_full_id() {
        assert_eq!(compare_chapters("ch_1", "ch_001"), Ordering::Greater);
    }

    #[test]
    fn test_huge_numbers_saturate() {
        let key = ChapterOrder::of("ch_99999999999999999999999");
        assert_eq!(key.number(), Some(u64::MAX));
        assert!(key < ChapterOrder::of("afterword"));
    }

    #[test]
    fn test_sort_mixed_ids() {
        let mut ids = vec!["终章", "ch_003", "ch_001", "番外", "ch_002"];
        ids.sort_by(|a, b| compare_chapters(a, b));
        assert_eq!(ids, vec!["ch_001", "ch_002", "ch_003", "番外", "终章"]);
    }
}
