//! Persistence contract for purchase orders and their lines.

use logiflow_core::{DomainResult, ExpectedVersion, PurchaseOrderId, SupplierId};

use crate::order::{PurchaseOrder, PurchaseOrderLine};

pub trait PurchaseOrderStore: Send + Sync {
    fn find(&self, id: &PurchaseOrderId) -> DomainResult<Option<PurchaseOrder>>;

    fn lines(&self, order_id: &PurchaseOrderId) -> DomainResult<Vec<PurchaseOrderLine>>;

    fn find_by_supplier(&self, supplier_id: &SupplierId) -> DomainResult<Vec<PurchaseOrder>>;

    /// Persist the order header. `Some(lines)` replaces the order's lines,
    /// `None` leaves them as stored.
    ///
    /// Fails with `Conflict` when the stored version does not match `expected`.
    fn save(
        &self,
        order: PurchaseOrder,
        lines: Option<Vec<PurchaseOrderLine>>,
        expected: ExpectedVersion,
    ) -> DomainResult<PurchaseOrder>;
}

impl<S> PurchaseOrderStore for std::sync::Arc<S>
where
    S: PurchaseOrderStore + ?Sized,
{
    fn find(&self, id: &PurchaseOrderId) -> DomainResult<Option<PurchaseOrder>> {
        (**self).find(id)
    }

    fn lines(&self, order_id: &PurchaseOrderId) -> DomainResult<Vec<PurchaseOrderLine>> {
        (**self).lines(order_id)
    }

    fn find_by_supplier(&self, supplier_id: &SupplierId) -> DomainResult<Vec<PurchaseOrder>> {
        (**self).find_by_supplier(supplier_id)
    }

    fn save(
        &self,
        order: PurchaseOrder,
        lines: Option<Vec<PurchaseOrderLine>>,
        expected: ExpectedVersion,
    ) -> DomainResult<PurchaseOrder> {
        (**self).save(order, lines, expected)
    }
}
