use crate::core::extract::ExtractError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One person to look up: first name, last name, and an optional ward to
/// disambiguate between people sharing a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SearchCriterion {
    #[validate(length(min = 1))]
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[validate(length(min = 1))]
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub ward: Option<String>,
}

impl SearchCriterion {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, ward: Option<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ward,
        }
    }

    /// Build criteria from parallel columns: first names, last names and
    /// (optionally) wards, matched by index.
    ///
    /// A ward column shorter than the name columns leaves the remaining
    /// criteria without a ward; empty ward cells are treated as absent.
    pub fn from_columns(columns: &[Vec<String>]) -> Result<Vec<Self>, ExtractError> {
        let (first, last) = match columns {
            [first, last, ..] => (first, last),
            _ => {
                return Err(ExtractError::LengthMismatch {
                    expected: 2,
                    found: columns.len(),
                })
            }
        };
        if first.len() != last.len() {
            return Err(ExtractError::LengthMismatch {
                expected: first.len(),
                found: last.len(),
            });
        }
        let wards = columns.get(2);

        Ok(first
            .iter()
            .zip(last)
            .enumerate()
            .map(|(i, (f, l))| {
                let ward = wards
                    .and_then(|w| w.get(i))
                    .map(|w| w.trim())
                    .filter(|w| !w.is_empty())
                    .map(str::to_string);
                Self::new(f.trim(), l.trim(), ward)
            })
            .collect())
    }
}

/// Query against `/people`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeopleQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub zip_or_postal_code: Option<String>,
    pub expand_districts: bool,
}

impl PeopleQuery {
    pub fn by_name(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            ..Self::default()
        }
    }

    pub fn by_zip(zip: &str) -> Self {
        Self {
            zip_or_postal_code: Some(zip.to_string()),
            expand_districts: true,
            ..Self::default()
        }
    }

    pub fn with_city(mut self, city: Option<&str>) -> Self {
        self.city = city.map(str::to_string);
        self
    }

    pub fn with_districts(mut self) -> Self {
        self.expand_districts = true;
        self
    }

    /// Render as query parameters in the API's naming
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(first) = &self.first_name {
            params.push(("firstName", first.clone()));
        }
        if let Some(last) = &self.last_name {
            params.push(("lastName", last.clone()));
        }
        if let Some(city) = &self.city {
            params.push(("city", city.clone()));
        }
        if let Some(zip) = &self.zip_or_postal_code {
            params.push(("zipOrPostalCode", zip.clone()));
        }
        if self.expand_districts {
            params.push(("$expand", "districts".to_string()));
        }
        params
    }
}
