use uuid::Uuid;

use crate::domain::Month;
use crate::shared::{DomainError, DomainResult};

/// Parse an identifier, rejecting malformed strings and the nil UUID.
pub fn parse_id(field: &str, raw: &str) -> DomainResult<Uuid> {
    let id = Uuid::parse_str(raw.trim())
        .map_err(|e| DomainError::Validation(format!("invalid {} '{}': {}", field, raw, e)))?;
    if id.is_nil() {
        return Err(DomainError::Validation(format!("{} must not be the nil UUID", field)));
    }
    Ok(id)
}

/// Parse a required `MM-YYYY` month.
pub fn parse_month(field: &str, raw: &str) -> DomainResult<Month> {
    raw.parse()
        .map_err(|e: DomainError| DomainError::Validation(format!("{}: {}", field, strip_prefix(e))))
}

/// Parse an optional `MM-YYYY` month; absent or blank means `None`.
pub fn parse_optional_month(field: &str, raw: Option<&str>) -> DomainResult<Option<Month>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_month(field, value).map(Some),
    }
}

fn strip_prefix(e: DomainError) -> String {
    match e {
        DomainError::Validation(msg) => msg,
        other => other.to_string(),
    }
}
