use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One person record as returned by the directory API.
///
/// Records are loosely shaped JSON objects. The fields this crate relies on are
/// `vanId` and, when districts are expanded, `districts[*].districtFieldValues[*].name`.
pub type Record = Map<String, Value>;

/// VanId -> ward name, ordered by VanId so persisted files are stable
pub type WardMap = BTreeMap<String, String>;
