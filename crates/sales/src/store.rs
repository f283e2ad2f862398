//! Persistence contract for sales orders and their lines.

use logiflow_core::{DomainResult, ExpectedVersion, SalesOrderId};

use crate::order::{SalesOrder, SalesOrderLine};

/// Order rows and line rows are stored side by side; lines are looked up by
/// their `order_id`.
pub trait SalesOrderStore: Send + Sync {
    fn find(&self, id: &SalesOrderId) -> DomainResult<Option<SalesOrder>>;

    fn lines(&self, order_id: &SalesOrderId) -> DomainResult<Vec<SalesOrderLine>>;

    /// Persist the order and replace its lines in one step.
    ///
    /// Fails with `Conflict` when the stored version does not match `expected`.
    fn save(
        &self,
        order: SalesOrder,
        lines: Vec<SalesOrderLine>,
        expected: ExpectedVersion,
    ) -> DomainResult<SalesOrder>;

    /// Delete the order together with its lines.
    ///
    /// Fails with `Conflict` when the stored version does not match `expected`.
    fn delete(&self, id: &SalesOrderId, expected: ExpectedVersion) -> DomainResult<()>;
}

impl<S> SalesOrderStore for std::sync::Arc<S>
where
    S: SalesOrderStore + ?Sized,
{
    fn find(&self, id: &SalesOrderId) -> DomainResult<Option<SalesOrder>> {
        (**self).find(id)
    }

    fn lines(&self, order_id: &SalesOrderId) -> DomainResult<Vec<SalesOrderLine>> {
        (**self).lines(order_id)
    }

    fn save(
        &self,
        order: SalesOrder,
        lines: Vec<SalesOrderLine>,
        expected: ExpectedVersion,
    ) -> DomainResult<SalesOrder> {
        (**self).save(order, lines, expected)
    }

    fn delete(&self, id: &SalesOrderId, expected: ExpectedVersion) -> DomainResult<()> {
        (**self).delete(id, expected)
    }
}
