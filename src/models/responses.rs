use crate::models::domain::{Record, WardMap};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One page of a `/people` search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeoplePage {
    /// Total number of matching people across all pages
    pub count: i64,
    pub items: Vec<Record>,
    #[serde(rename = "nextPageLink", default)]
    pub next_page_link: Option<String>,
}

impl PeoplePage {
    /// Reject shapes the API contract rules out.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.count < 0 {
            return Err(format!("negative count {}", self.count));
        }
        if self.count > 0 && self.items.is_empty() {
            return Err(format!("count is {} but items is empty", self.count));
        }
        Ok(())
    }

    /// Pages the server should need for `count` results at `page_size` per page
    pub fn expected_pages(&self, page_size: u32) -> u64 {
        let count = self.count.max(0) as u64;
        let size = u64::from(page_size.max(1));
        count.div_ceil(size)
    }
}

/// A criterion that could not be searched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFailure {
    pub index: usize,
    pub error: String,
}

/// Outcome of a batch search.
///
/// `matched[k]` was produced by criterion `matched_indices[k]`. Every criterion
/// index either contributes one or more identifiers to `matched` or is listed
/// once in `unmatched`, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Vec<String>,
    pub matched_indices: Vec<usize>,
    pub unmatched: Vec<usize>,
    #[serde(default)]
    pub failures: Vec<SearchFailure>,
}

impl MatchResult {
    pub(crate) fn push_matches(&mut self, index: usize, van_ids: Vec<String>) {
        for van_id in van_ids {
            self.matched.push(van_id);
            self.matched_indices.push(index);
        }
    }

    pub(crate) fn push_unmatched(&mut self, index: usize) {
        self.unmatched.push(index);
    }

    pub(crate) fn push_failure(&mut self, index: usize, error: impl ToString) {
        self.unmatched.push(index);
        self.failures.push(SearchFailure {
            index,
            error: error.to_string(),
        });
    }

    /// True when each of `0..criteria` is accounted for exactly once: either as
    /// the source of at least one match or as an unmatched index.
    pub fn is_partition_of(&self, criteria: usize) -> bool {
        let matched: HashSet<usize> = self.matched_indices.iter().copied().collect();
        let unmatched: HashSet<usize> = self.unmatched.iter().copied().collect();

        unmatched.len() == self.unmatched.len()
            && matched.is_disjoint(&unmatched)
            && (0..criteria).all(|i| matched.contains(&i) || unmatched.contains(&i))
            && matched.iter().chain(&unmatched).all(|&i| i < criteria)
    }
}

/// Why pagination stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum PaginationStop {
    /// The server returned no `nextPageLink`
    Exhausted,
    /// The configured page bound was reached with pages still outstanding
    PageLimit,
    /// A later page failed; the mapping holds everything fetched before it
    Failed(String),
}

/// A person left out of a ward lookup because their record could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPerson {
    /// 1-based page the person appeared on
    pub page: usize,
    /// Position within that page's items
    pub position: usize,
    pub van_id: Option<String>,
    pub reason: String,
}

/// Ward lookup for every person in a zip code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipWards {
    pub zip: String,
    pub wards: WardMap,
    #[serde(default)]
    pub skipped: Vec<SkippedPerson>,
    pub pages_fetched: usize,
    pub expected_pages: u64,
    pub stop: PaginationStop,
}

impl ZipWards {
    pub fn is_complete(&self) -> bool {
        self.stop == PaginationStop::Exhausted
    }
}
