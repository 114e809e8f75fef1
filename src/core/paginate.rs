use crate::core::extract::{extract_field, value_to_string, zip_by_index};
use crate::core::throttle::Throttle;
use crate::core::ward::WardMatcher;
use crate::models::{PaginationStop, PeoplePage, PeopleQuery, SkippedPerson, WardMap, ZipWards};
use crate::services::{DirectoryApi, VanError};

/// What one page contributed: the wards it resolved and the people it could not
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageWards {
    pub wards: WardMap,
    pub skipped: Vec<SkippedPerson>,
}

/// Map every person on one page to their ward.
///
/// A person without a VanId or a readable ward is skipped and reported in
/// `skipped`; the rest of the page is still mapped. `page_number` is 1-based
/// and only labels the skipped entries.
pub fn unpack_ward_page(
    page: &PeoplePage,
    page_number: usize,
    wards: &WardMatcher,
) -> Result<PageWards, VanError> {
    let mut van_ids = Vec::with_capacity(page.items.len());
    let mut names = Vec::with_capacity(page.items.len());
    let mut skipped = Vec::new();

    for (position, item) in page.items.iter().enumerate() {
        let van_id = extract_field(item, "vanId").map(value_to_string);
        let unpacked = van_id
            .clone()
            .and_then(|id| wards.extract_ward(item).map(|ward| (id, ward)));
        match unpacked {
            Ok((id, ward)) => {
                van_ids.push(id);
                names.push(ward);
            }
            Err(e) => {
                let person = SkippedPerson {
                    page: page_number,
                    position,
                    van_id: van_id.ok(),
                    reason: e.to_string(),
                };
                tracing::warn!(
                    page = page_number,
                    position,
                    van_id = ?person.van_id,
                    "Skipping person: {}",
                    e
                );
                skipped.push(person);
            }
        }
    }

    Ok(PageWards {
        wards: zip_by_index(van_ids, names)?.into_iter().collect(),
        skipped,
    })
}

/// Walks a `/people` result set page by page, following `nextPageLink`.
///
/// The loop ends when the server stops returning a link, when `max_pages`
/// pages have been fetched, or when fetching a page after the first fails. In
/// the last two cases everything collected so far is still returned. Bad
/// people never end the walk; they are skipped and listed in the result.
pub struct WardCollector<'a, A: DirectoryApi, T: Throttle> {
    api: &'a A,
    throttle: &'a T,
    wards: WardMatcher,
    page_size: u32,
    max_pages: usize,
}

impl<'a, A: DirectoryApi, T: Throttle> WardCollector<'a, A, T> {
    pub fn new(api: &'a A, throttle: &'a T, wards: WardMatcher, page_size: u32, max_pages: usize) -> Self {
        Self {
            api,
            throttle,
            wards,
            page_size,
            max_pages: max_pages.max(1),
        }
    }

    /// Collect VanId -> ward for everyone in a zip code.
    ///
    /// Fails only if the first page cannot be fetched.
    pub async fn collect_by_zip(&self, zip: &str) -> Result<ZipWards, VanError> {
        let query = PeopleQuery::by_zip(zip);

        self.throttle.wait().await;
        let mut page = self.api.search_people(&query).await?;
        let PageWards { mut wards, mut skipped } = unpack_ward_page(&page, 1, &self.wards)?;
        let mut pages_fetched = 1;

        let expected_pages = page.expected_pages(self.page_size);
        tracing::info!(zip = %zip, count = page.count, expected_pages, "Starting ward pagination");

        let stop = loop {
            let Some(link) = page.next_page_link.take() else {
                break PaginationStop::Exhausted;
            };
            if pages_fetched >= self.max_pages {
                tracing::warn!(
                    zip = %zip,
                    max_pages = self.max_pages,
                    "Page limit reached with pages outstanding"
                );
                break PaginationStop::PageLimit;
            }

            self.throttle.wait().await;
            let next = match self.api.fetch_page(&link).await {
                Ok(next) => next,
                Err(e) => {
                    tracing::error!(zip = %zip, page = pages_fetched + 1, "Page fetch failed: {}", e);
                    break PaginationStop::Failed(e.to_string());
                }
            };
            match unpack_ward_page(&next, pages_fetched + 1, &self.wards) {
                // later pages win on duplicate VanIds
                Ok(more) => {
                    wards.extend(more.wards);
                    skipped.extend(more.skipped);
                }
                Err(e) => {
                    tracing::error!(zip = %zip, page = pages_fetched + 1, "Page unpack failed: {}", e);
                    break PaginationStop::Failed(e.to_string());
                }
            }
            pages_fetched += 1;
            page = next;

            tracing::debug!(
                zip = %zip,
                page = pages_fetched,
                expected_pages,
                collected = wards.len(),
                "Fetched page"
            );
        };

        tracing::info!(
            zip = %zip,
            pages = pages_fetched,
            people = wards.len(),
            skipped = skipped.len(),
            stop = ?stop,
            "Ward pagination finished"
        );

        Ok(ZipWards {
            zip: zip.to_string(),
            wards,
            skipped,
            pages_fetched,
            expected_pages,
            stop,
        })
    }
}
