//! Aggregate roots and optimistic concurrency.

use crate::error::{DomainError, DomainResult};

/// Aggregate root marker + minimal interface.
///
/// Persisted aggregates carry a row version that storage adapters compare on
/// every write. A write only succeeds when the stored version still equals the
/// version the caller read.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing row version (+1 per committed write).
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for an aggregate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (inserts, last-writer-wins documents).
    Any,
    /// The row must not exist yet.
    NoRow,
    /// Require the aggregate to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    /// Expectation matching the state the caller just read.
    pub fn of<A: AggregateRoot>(aggregate: &A) -> Self {
        ExpectedVersion::Exact(aggregate.version())
    }

    /// `actual` is `None` when no row is stored.
    pub fn matches(self, actual: Option<u64>) -> bool {
        match (self, actual) {
            (ExpectedVersion::Any, _) => true,
            (ExpectedVersion::NoRow, None) => true,
            (ExpectedVersion::NoRow, Some(_)) => false,
            (ExpectedVersion::Exact(v), Some(a)) => v == a,
            (ExpectedVersion::Exact(_), None) => false,
        }
    }

    pub fn check(self, actual: Option<u64>) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual:?})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_version_matches_only_same_row_version() {
        assert!(ExpectedVersion::Exact(3).matches(Some(3)));
        assert!(!ExpectedVersion::Exact(3).matches(Some(4)));
        assert!(!ExpectedVersion::Exact(0).matches(None));
    }

    #[test]
    fn no_row_rejects_existing_rows() {
        assert!(ExpectedVersion::NoRow.matches(None));
        assert!(matches!(
            ExpectedVersion::NoRow.check(Some(1)),
            Err(DomainError::Conflict(_))
        ));
    }
}
