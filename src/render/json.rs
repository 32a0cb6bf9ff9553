use serde::Serialize;

use crate::error::AdvisorError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, AdvisorError> {
    Ok(serde_json::to_string_pretty(value)?)
}
