//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every engine operation raises one of these for the caller to translate into
/// a transport-level response. Storage adapters map their own failures onto
/// `Conflict` (stale row version) or `NotFound`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced entity (order, warehouse, product, shipment...) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation is invalid for the entity's current lifecycle state.
    #[error("business rule violated: {0}")]
    Business(String),

    /// Requested quantity exceeds the available quantity.
    #[error("stock unavailable (requested: {requested}, available: {available})")]
    StockUnavailable { requested: i64, available: i64 },

    /// A uniqueness constraint was violated (e.g. tracking number).
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// A value failed validation (non-positive quantity, malformed adjustment).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A conflict occurred (stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn business(msg: impl Into<String>) -> Self {
        Self::Business(msg.into())
    }

    pub fn stock_unavailable(requested: i64, available: i64) -> Self {
        Self::StockUnavailable {
            requested,
            available,
        }
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// True for failures a caller may retry (stale reads under concurrency).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Reject non-positive quantities.
pub fn ensure_positive(quantity: i64, what: &str) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::validation(format!(
            "{what} must be positive (got {quantity})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(1, "quantity").is_ok());
        assert!(matches!(
            ensure_positive(0, "quantity"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            ensure_positive(-4, "quantity"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn stock_unavailable_message_carries_quantities() {
        let err = DomainError::stock_unavailable(10, 3);
        assert_eq!(
            err.to_string(),
            "stock unavailable (requested: 10, available: 3)"
        );
        assert!(!err.is_conflict());
        assert!(DomainError::conflict("stale").is_conflict());
    }
}
