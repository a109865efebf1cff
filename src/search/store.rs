//! Per-term result groups and the store they are committed into.

use crate::geometry::Quad;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Caller-assigned identifier joining a highlight definition to its results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(String);

impl TermId {
    /// Create a term id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TermId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TermId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TermId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One accepted match: its page and normalized quads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    /// 1-based page number reported by the engine
    pub page_number: u32,
    /// Normalized quads covering the match (several when it wraps lines)
    pub quads: Vec<Quad>,
}

/// Ordered matches for a single term, one entry per engine-reported match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermResultGroup {
    entries: Vec<MatchEntry>,
}

impl TermResultGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a match.
    pub fn push(&mut self, entry: MatchEntry) {
        self.entries.push(entry);
    }

    /// Matches in the order the engine reported them.
    pub fn entries(&self) -> &[MatchEntry] {
        &self.entries
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the term produced no matches.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct page numbers with at least one match, ascending.
    pub fn pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.entries.iter().map(|e| e.page_number).collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}

impl FromIterator<MatchEntry> for TermResultGroup {
    fn from_iter<I: IntoIterator<Item = MatchEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Term id → committed result group.
///
/// Only complete groups ever enter the store: the search driver fills a
/// private buffer during a pass and moves it in with [`commit`](Self::commit)
/// once the engine signals document end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    groups: IndexMap<TermId, TermResultGroup>,
}

impl ResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a finished group into the store, replacing any previous group
    /// for the same term.
    pub fn commit(&mut self, term_id: TermId, group: TermResultGroup) {
        log::debug!("committing {} match(es) for term '{}'", group.len(), term_id);
        self.groups.insert(term_id, group);
    }

    /// Look up the group for a term.
    pub fn get(&self, term_id: &str) -> Option<&TermResultGroup> {
        self.groups.get(term_id)
    }

    /// Whether a group was committed for a term.
    pub fn contains(&self, term_id: &str) -> bool {
        self.groups.contains_key(term_id)
    }

    /// Iterate over committed groups in commit order.
    pub fn iter(&self) -> impl Iterator<Item = (&TermId, &TermResultGroup)> {
        self.groups.iter()
    }

    /// Number of committed groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total matches across all groups.
    pub fn total_matches(&self) -> usize {
        self.groups.values().map(TermResultGroup::len).sum()
    }

    /// Drop every group.
    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
