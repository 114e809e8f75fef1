// Unit tests for VAN Search

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use van_search::core::{dedupe, extract_field_across_records, ExtractError};
use van_search::{
    DirectoryApi, PeoplePage, PeopleQuery, PersonSearch, Record, SearchCriterion, Unthrottled,
    VanError, WardMatcher,
};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn person(van_id: u64, wards_by_district: &[&str]) -> Record {
    let districts: Vec<Value> = wards_by_district
        .iter()
        .map(|w| json!({"districtFieldValues": [{"name": w}]}))
        .collect();
    record(json!({"vanId": van_id, "districts": districts}))
}

/// Directory keyed by "first last", answering every lookup with a fixed page
struct NameDirectory {
    people: HashMap<String, Vec<Record>>,
}

#[async_trait]
impl DirectoryApi for NameDirectory {
    async fn search_people(&self, query: &PeopleQuery) -> Result<PeoplePage, VanError> {
        let key = format!(
            "{} {}",
            query.first_name.as_deref().unwrap_or_default(),
            query.last_name.as_deref().unwrap_or_default()
        );
        let items = self.people.get(&key).cloned().unwrap_or_default();
        Ok(PeoplePage {
            count: items.len() as i64,
            items,
            next_page_link: None,
        })
    }

    async fn fetch_page(&self, _next_page_link: &str) -> Result<PeoplePage, VanError> {
        Err(VanError::NotFound("single page directory".into()))
    }

    async fn get_person(&self, van_id: &str, _expand_districts: bool) -> Result<Record, VanError> {
        Err(VanError::NotFound(van_id.to_string()))
    }
}

#[test]
fn test_dedupe_idempotent_over_inputs() {
    let inputs: Vec<Vec<u32>> = vec![
        vec![],
        vec![1],
        vec![1, 1, 1],
        vec![5, 3, 5, 2, 3, 1],
        (0..100).map(|i| i % 7).collect(),
    ];

    for input in inputs {
        let once = dedupe(input.clone());
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
        assert!(input.iter().all(|x| once.contains(x)));
    }
}

#[test]
fn test_extract_across_records_rejects_non_list() {
    for value in [json!(null), json!(1), json!("x"), json!({"a": 1})] {
        assert!(matches!(
            extract_field_across_records(&value, "a"),
            Err(ExtractError::NotAList { .. })
        ));
    }
}

#[test]
fn test_matches_ward_reflexive_at_every_index() {
    let record = person(1, &["Ward 4", "Precinct 12", "Council 2"]);

    for index in 0..3 {
        let matcher = WardMatcher::new(index);
        let ward = matcher.extract_ward(&record).unwrap();
        assert!(matcher.matches_ward(&record, &ward).unwrap());
    }
}

#[test]
fn test_criterion_serializes_with_api_names() {
    let criterion = SearchCriterion::new("Jane", "Doe", Some("Ward 1".into()));
    let value = serde_json::to_value(&criterion).unwrap();
    assert_eq!(value, json!({"firstName": "Jane", "lastName": "Doe", "ward": "Ward 1"}));
}

#[tokio::test]
async fn test_every_index_accounted_for_exactly_once() {
    let mut people = HashMap::new();
    people.insert("Ann One".to_string(), vec![person(1, &["Ward 1"])]);
    people.insert(
        "Bo Two".to_string(),
        vec![person(2, &["Ward 1"]), person(3, &["Ward 2"])],
    );
    people.insert(
        "Cy Three".to_string(),
        vec![person(4, &["Ward 2"]), person(5, &["Ward 2"])],
    );
    let api = NameDirectory { people };
    let search = PersonSearch::new(&api, &Unthrottled, WardMatcher::new(0));

    let criteria = vec![
        SearchCriterion::new("Ann", "One", Some("Ward 1".into())),
        SearchCriterion::new("Bo", "Two", Some("Ward 2".into())),
        SearchCriterion::new("Cy", "Three", Some("Ward 2".into())),
        SearchCriterion::new("Di", "Four", Some("Ward 1".into())),
        SearchCriterion::new("Ann", "One", Some("Ward 9".into())),
    ];

    let by_ward = search.search_by_name_and_ward(&criteria).await.unwrap();
    assert!(by_ward.is_partition_of(criteria.len()));
    assert_eq!(by_ward.matched, vec!["1", "3", "4", "5"]);
    assert_eq!(by_ward.unmatched, vec![3, 4]);
    // more identifiers than criteria produced them
    assert!(by_ward.matched.len() + by_ward.unmatched.len() > criteria.len());

    let by_name = search.search_by_name(&criteria).await.unwrap();
    assert!(by_name.is_partition_of(criteria.len()));
    assert_eq!(by_name.matched, vec!["1", "1"]);
    assert_eq!(by_name.unmatched, vec![1, 2, 3]);
}
