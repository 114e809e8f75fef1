use crate::core::extract::{extract_field, value_to_string};
use crate::core::throttle::Throttle;
use crate::core::ward::WardMatcher;
use crate::models::{MatchResult, PeoplePage, PeopleQuery, SearchCriterion};
use crate::services::{DirectoryApi, VanError};
use validator::Validate;

/// Per-person search orchestrator
///
/// Issues one `/people` query per criterion, strictly in order, and sorts the
/// criteria into matched VanIds and unmatched indices.
///
/// # Failure handling
/// A criterion whose request or response fails is recorded in
/// `MatchResult::failures` and listed as unmatched; the batch carries on.
/// Authentication failures abort the batch, since every later request would
/// be rejected the same way.
pub struct PersonSearch<'a, A: DirectoryApi, T: Throttle> {
    api: &'a A,
    throttle: &'a T,
    wards: WardMatcher,
    city: Option<String>,
}

impl<'a, A: DirectoryApi, T: Throttle> PersonSearch<'a, A, T> {
    pub fn new(api: &'a A, throttle: &'a T, wards: WardMatcher) -> Self {
        Self {
            api,
            throttle,
            wards,
            city: None,
        }
    }

    /// Narrow ward searches to one city
    pub fn with_city(mut self, city: Option<String>) -> Self {
        self.city = city;
        self
    }

    /// Search by first and last name only.
    ///
    /// A criterion matches only when the name is unique in the directory; zero
    /// or several hits leave it unmatched. Wards on the criteria are ignored.
    pub async fn search_by_name(&self, criteria: &[SearchCriterion]) -> Result<MatchResult, VanError> {
        let mut result = MatchResult::default();

        for (index, criterion) in criteria.iter().enumerate() {
            if let Err(e) = criterion.validate() {
                tracing::warn!(index, "Skipping invalid criterion: {}", e);
                result.push_failure(index, e);
                continue;
            }

            let query = PeopleQuery::by_name(&criterion.first_name, &criterion.last_name);
            let outcome = match self.fetch(&query).await {
                Ok(page) => single_match(&page),
                Err(e) => Err(e),
            };
            record(&mut result, index, criteria.len(), outcome)?;
        }

        Ok(result)
    }

    /// Search by name, narrowed by city, keeping only hits in the expected ward.
    ///
    /// Every candidate in the criterion's ward is matched, so one criterion can
    /// yield several VanIds. A criterion without a ward falls back to the
    /// unique-name rule of [`search_by_name`](Self::search_by_name).
    pub async fn search_by_name_and_ward(
        &self,
        criteria: &[SearchCriterion],
    ) -> Result<MatchResult, VanError> {
        let mut result = MatchResult::default();

        for (index, criterion) in criteria.iter().enumerate() {
            if let Err(e) = criterion.validate() {
                tracing::warn!(index, "Skipping invalid criterion: {}", e);
                result.push_failure(index, e);
                continue;
            }

            let query = PeopleQuery::by_name(&criterion.first_name, &criterion.last_name)
                .with_city(self.city.as_deref())
                .with_districts();

            let outcome = match self.fetch(&query).await {
                Ok(page) => match &criterion.ward {
                    Some(ward) => self.ward_matches(&page, ward),
                    None => single_match(&page),
                },
                Err(e) => Err(e),
            };
            record(&mut result, index, criteria.len(), outcome)?;
        }

        Ok(result)
    }

    /// Look up one person's ward
    pub async fn get_ward(&self, van_id: &str) -> Result<String, VanError> {
        self.throttle.wait().await;
        let record = self.api.get_person(van_id, true).await?;
        Ok(self.wards.extract_ward(&record)?)
    }

    async fn fetch(&self, query: &PeopleQuery) -> Result<PeoplePage, VanError> {
        self.throttle.wait().await;
        self.api.search_people(query).await
    }

    /// VanIds of every candidate whose ward equals `ward`.
    ///
    /// A candidate whose ward or VanId cannot be read is logged and left out.
    fn ward_matches(&self, page: &PeoplePage, ward: &str) -> Result<Vec<String>, VanError> {
        if page.count == 0 {
            return Ok(Vec::new());
        }

        let mut van_ids = Vec::new();
        for (position, candidate) in page.items.iter().enumerate() {
            let matched = self.wards.matches_ward(candidate, ward).and_then(|hit| {
                hit.then(|| extract_field(candidate, "vanId").map(value_to_string))
                    .transpose()
            });
            match matched {
                Ok(Some(van_id)) => van_ids.push(van_id),
                Ok(None) => {}
                Err(e) => tracing::warn!(position, "Skipping unreadable candidate: {}", e),
            }
        }
        Ok(van_ids)
    }
}

/// The VanId when the page holds exactly one person, nothing otherwise
fn single_match(page: &PeoplePage) -> Result<Vec<String>, VanError> {
    match page.count {
        0 => Ok(Vec::new()),
        1 => match page.items.as_slice() {
            [only] => Ok(vec![value_to_string(extract_field(only, "vanId")?)]),
            items => Err(VanError::UnexpectedResponse(format!(
                "count is 1 but {} items returned",
                items.len()
            ))),
        },
        n if n > 1 => Ok(Vec::new()),
        n => Err(VanError::UnexpectedResponse(format!("negative count {}", n))),
    }
}

/// Fold one criterion's outcome into the batch result
fn record(
    result: &mut MatchResult,
    index: usize,
    total: usize,
    outcome: Result<Vec<String>, VanError>,
) -> Result<(), VanError> {
    match outcome {
        Ok(van_ids) if van_ids.is_empty() => {
            tracing::info!(search = index + 1, total, "No confident match");
            result.push_unmatched(index);
        }
        Ok(van_ids) => {
            tracing::info!(search = index + 1, total, matches = van_ids.len(), "Matched");
            result.push_matches(index, van_ids);
        }
        Err(VanError::AuthenticationFailure) => return Err(VanError::AuthenticationFailure),
        Err(e) => {
            tracing::warn!(search = index + 1, total, "Search failed: {}", e);
            result.push_failure(index, e);
        }
    }
    Ok(())
}
