use crate::models::{PeoplePage, PeopleQuery, Record};
use crate::services::{DirectoryApi, VanError};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// A person whose ward sits in the first district
pub fn person(van_id: u64, ward: &str) -> Record {
    json!({
        "vanId": van_id,
        "firstName": "Test",
        "lastName": "Person",
        "districts": [{
            "districtId": 1,
            "name": "Ward",
            "districtFieldValues": [{"districtFieldValueId": 1, "name": ward}]
        }]
    })
    .as_object()
    .cloned()
    .unwrap()
}

pub fn page_of(people: Vec<Record>) -> PeoplePage {
    PeoplePage {
        count: people.len() as i64,
        items: people,
        next_page_link: None,
    }
}

/// In-memory directory that replays queued responses in order
#[derive(Default)]
pub struct FakeDirectory {
    responses: Mutex<VecDeque<Result<PeoplePage, VanError>>>,
    people: HashMap<String, Record>,
    queries: Mutex<Vec<PeopleQuery>>,
    links: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub fn with_pages(pages: Vec<PeoplePage>) -> Self {
        Self::with_responses(pages.into_iter().map(Ok).collect())
    }

    pub fn with_responses(responses: Vec<Result<PeoplePage, VanError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    pub fn with_person(mut self, record: Record) -> Self {
        let id = record["vanId"].to_string();
        self.people.insert(id, record);
        self
    }

    pub fn queries(&self) -> Vec<PeopleQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn links_followed(&self) -> Vec<String> {
        self.links.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<PeoplePage, VanError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(VanError::NotFound("no queued response".into())))
    }
}

#[async_trait]
impl DirectoryApi for FakeDirectory {
    async fn search_people(&self, query: &PeopleQuery) -> Result<PeoplePage, VanError> {
        self.queries.lock().unwrap().push(query.clone());
        self.next_response()
    }

    async fn fetch_page(&self, next_page_link: &str) -> Result<PeoplePage, VanError> {
        self.links.lock().unwrap().push(next_page_link.to_string());
        self.next_response()
    }

    async fn get_person(&self, van_id: &str, _expand_districts: bool) -> Result<Record, VanError> {
        self.people
            .get(van_id)
            .cloned()
            .ok_or_else(|| VanError::NotFound(format!("/people/{}", van_id)))
    }
}
