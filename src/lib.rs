//! VAN Search - client for VAN/NGP-style voter directory APIs
//!
//! This library pages through `/people` result sets to build VanId -> ward
//! mappings, and matches lists of names (optionally with wards) against the
//! directory.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{FixedDelay, PersonSearch, Throttle, Unthrottled, WardCollector, WardMatcher};
pub use models::{MatchResult, PeoplePage, PeopleQuery, Record, SearchCriterion, SkippedPerson, WardMap, ZipWards};
pub use services::{DirectoryApi, VanClient, VanError};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ward_lookup_from_crate_root() {
        // ward lookup through the crate-root re-exports
        let record: Record = json!({"districts": [{"districtFieldValues": [{"name": "Ward 2"}]}]})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(WardMatcher::new(0).extract_ward(&record).unwrap(), "Ward 2");
    }
}
