use std::collections::{BTreeSet, HashMap};

/// An ordered index of unique members, each carrying an integer score.
///
/// Ranking follows the cache tier's reverse order: highest score first, ties
/// broken by member in descending byte order.
#[derive(Debug, Default, Clone)]
pub struct SortedSet {
    scores: HashMap<String, i64>,
    ranked: BTreeSet<(i64, String)>,
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `member` unless it is already present. Existing scores are never
    /// overwritten. Returns `true` if the member was added.
    pub fn insert_if_absent(&mut self, member: &str, score: i64) -> bool {
        if self.scores.contains_key(member) {
            return false;
        }
        self.scores.insert(member.to_string(), score);
        self.ranked.insert((score, member.to_string()));
        true
    }

    pub fn score(&self, member: &str) -> Option<i64> {
        self.scores.get(member).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Members ranked `[start, stop]` inclusive in reverse order. Negative
    /// indexes count from the lowest-ranked end, `-1` being the last member.
    pub fn rev_range(&self, start: i64, stop: i64) -> Vec<String> {
        let len = self.len() as i64;
        if len == 0 {
            return Vec::new();
        }

        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Vec::new();
        }

        self.ranked
            .iter()
            .rev()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .map(|(_, member)| member.clone())
            .collect()
    }
}
