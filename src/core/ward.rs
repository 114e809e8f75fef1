use crate::core::extract::{
    extract_field, extract_field_across_records, type_name, value_to_string, ExtractError,
};
use crate::models::Record;

/// Reads the ward out of person records.
///
/// Which entry of a record's `districts` list holds the ward depends on how the
/// target database is configured, so the position is supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WardMatcher {
    district_index: usize,
}

impl WardMatcher {
    pub fn new(district_index: usize) -> Self {
        Self { district_index }
    }

    pub fn district_index(&self) -> usize {
        self.district_index
    }

    /// All ward names listed in the configured district, in order
    pub fn ward_names(&self, record: &Record) -> Result<Vec<String>, ExtractError> {
        let districts = extract_field(record, "districts")?;
        let list = districts.as_array().ok_or(ExtractError::NotAList {
            found: type_name(districts),
        })?;

        let district = list
            .get(self.district_index)
            .ok_or(ExtractError::DistrictIndexOutOfRange {
                index: self.district_index,
                len: list.len(),
            })?;
        let district = district.as_object().ok_or(ExtractError::NotAnObject {
            found: type_name(district),
        })?;

        let field_values = extract_field(district, "districtFieldValues")?;
        Ok(extract_field_across_records(field_values, "name")?
            .into_iter()
            .map(value_to_string)
            .collect())
    }

    /// The record's ward: the first name in the configured district
    pub fn extract_ward(&self, record: &Record) -> Result<String, ExtractError> {
        self.ward_names(record)?
            .into_iter()
            .next()
            .ok_or(ExtractError::EmptyDistrict)
    }

    /// Whether the record's ward equals `expected`, compared as text
    pub fn matches_ward(&self, record: &Record, expected: &str) -> Result<bool, ExtractError> {
        Ok(self.extract_ward(record)? == expected)
    }
}
