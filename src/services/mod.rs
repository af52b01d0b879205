use rust_decimal::Decimal;
use uuid::Uuid;
use validator::ValidationError;

use crate::errors::ServiceError;

// Stock-mutation workflows
pub mod inventories;
pub mod repricings;
pub mod transfers;
pub mod workflow;
pub mod write_offs;

// Lookup entities referenced by the workflows
pub mod products;
pub mod stores;

/// Parses a client-supplied identifier.
pub fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::InvalidId(format!("'{}' is not a valid id", raw)))
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}
