// Core algorithm exports
pub mod extract;
pub mod paginate;
pub mod search;
pub mod throttle;
pub mod ward;

#[cfg(test)]
pub(crate) mod test_support;

pub use extract::{dedupe, extract_field, extract_field_across_records, zip_by_index, ExtractError};
pub use paginate::{unpack_ward_page, PageWards, WardCollector};
pub use search::PersonSearch;
pub use throttle::{FixedDelay, Throttle, Unthrottled};
pub use ward::WardMatcher;
