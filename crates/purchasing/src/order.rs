use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use logiflow_core::{
    AggregateRoot, DomainError, DomainResult, Entity, ProductId, PurchaseOrderId,
    PurchaseOrderLineId, SupplierId, UserId,
};

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "PENDING",
            PurchaseOrderStatus::Confirmed => "CONFIRMED",
            PurchaseOrderStatus::Delivered => "DELIVERED",
            PurchaseOrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Delivered | PurchaseOrderStatus::Cancelled
        )
    }
}

/// Purchase order line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub id: PurchaseOrderLineId,
    pub order_id: PurchaseOrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
}

impl PurchaseOrderLine {
    pub fn new(
        order_id: PurchaseOrderId,
        product_id: ProductId,
        quantity: i64,
        unit_price: u64,
    ) -> Self {
        Self {
            id: PurchaseOrderLineId::new(),
            order_id,
            product_id,
            quantity,
            unit_price,
        }
    }
}

impl Entity for PurchaseOrderLine {
    type Id = PurchaseOrderLineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Aggregate root: PurchaseOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    supplier_id: SupplierId,
    warehouse_manager_id: UserId,
    status: PurchaseOrderStatus,
    created_at: DateTime<Utc>,
    expected_delivery_at: Option<DateTime<Utc>>,
    version: u64,
}

impl PurchaseOrder {
    pub fn new(
        id: PurchaseOrderId,
        supplier_id: SupplierId,
        warehouse_manager_id: UserId,
        created_at: DateTime<Utc>,
        expected_delivery_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            supplier_id,
            warehouse_manager_id,
            status: PurchaseOrderStatus::Pending,
            created_at,
            expected_delivery_at,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> PurchaseOrderId {
        self.id
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn warehouse_manager_id(&self) -> UserId {
        self.warehouse_manager_id
    }

    pub fn status(&self) -> PurchaseOrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expected_delivery_at(&self) -> Option<DateTime<Utc>> {
        self.expected_delivery_at
    }

    /// Document reference written on inbound movements.
    pub fn reference(&self) -> String {
        format!("PO-{}", self.id)
    }

    /// Stamp the row version assigned by the storage adapter on commit.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// PENDING → CONFIRMED; an order without lines cannot be approved.
    pub fn approve(&mut self, line_count: usize) -> DomainResult<()> {
        if self.status != PurchaseOrderStatus::Pending {
            return Err(DomainError::business(format!(
                "only pending purchase orders can be approved (status: {})",
                self.status.as_str()
            )));
        }
        if line_count == 0 {
            return Err(DomainError::business(
                "cannot approve purchase order without lines",
            ));
        }
        self.status = PurchaseOrderStatus::Confirmed;
        Ok(())
    }

    pub fn ensure_receivable(&self) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::business(format!(
                "cannot receive a {} purchase order",
                self.status.as_str()
            )));
        }
        Ok(())
    }

    pub fn mark_delivered(&mut self) -> DomainResult<()> {
        self.ensure_receivable()?;
        self.status = PurchaseOrderStatus::Delivered;
        Ok(())
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        match self.status {
            PurchaseOrderStatus::Delivered => Err(DomainError::business(
                "cannot cancel a delivered purchase order",
            )),
            PurchaseOrderStatus::Cancelled => Err(DomainError::business(
                "purchase order is already cancelled",
            )),
            PurchaseOrderStatus::Pending | PurchaseOrderStatus::Confirmed => {
                self.status = PurchaseOrderStatus::Cancelled;
                Ok(())
            }
        }
    }
}

impl AggregateRoot for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order() -> PurchaseOrder {
        PurchaseOrder::new(
            PurchaseOrderId::new(),
            SupplierId::new(),
            UserId::new(),
            Utc::now(),
            None,
        )
    }

    #[test]
    fn approve_moves_pending_to_confirmed() {
        let mut po = test_order();
        po.approve(2).unwrap();
        assert_eq!(po.status(), PurchaseOrderStatus::Confirmed);
    }

    #[test]
    fn cannot_approve_without_lines() {
        let mut po = test_order();
        let err = po.approve(0).unwrap_err();
        match err {
            DomainError::Business(msg) if msg.contains("without lines") => {}
            other => panic!("expected Business error, got {other:?}"),
        }
        assert_eq!(po.status(), PurchaseOrderStatus::Pending);
    }

    #[test]
    fn cannot_approve_twice() {
        let mut po = test_order();
        po.approve(1).unwrap();
        assert!(matches!(po.approve(1), Err(DomainError::Business(_))));
    }

    #[test]
    fn pending_orders_can_be_received_directly() {
        let mut po = test_order();
        po.mark_delivered().unwrap();
        assert_eq!(po.status(), PurchaseOrderStatus::Delivered);
        assert!(matches!(po.mark_delivered(), Err(DomainError::Business(_))));
    }

    #[test]
    fn cancel_is_rejected_after_delivery_or_cancellation() {
        let mut delivered = test_order();
        delivered.mark_delivered().unwrap();
        assert!(matches!(delivered.cancel(), Err(DomainError::Business(_))));

        let mut po = test_order();
        po.approve(1).unwrap();
        po.cancel().unwrap();
        assert_eq!(po.status(), PurchaseOrderStatus::Cancelled);
        assert!(matches!(po.cancel(), Err(DomainError::Business(_))));
        assert!(matches!(po.ensure_receivable(), Err(DomainError::Business(_))));
    }
}
