// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Record, WardMap};
pub use requests::{PeopleQuery, SearchCriterion};
pub use responses::{MatchResult, PaginationStop, PeoplePage, SearchFailure, SkippedPerson, ZipWards};
