use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use logiflow_core::{
    AggregateRoot, ClientId, DomainError, DomainResult, Entity, ProductId, SalesOrderId,
    SalesOrderLineId,
};

/// Sales order lifecycle state, derived from which timestamps are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalesOrderStatus {
    Created,
    Reserved,
    Shipped,
    Delivered,
}

/// Order line: product, quantity, unit price.
///
/// Lines are owned by exactly one order and looked up by `order_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrderLine {
    pub id: SalesOrderLineId,
    pub order_id: SalesOrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    /// Set when reservation could not satisfy the line.
    pub backordered: bool,
}

impl SalesOrderLine {
    pub fn new(
        order_id: SalesOrderId,
        product_id: ProductId,
        quantity: i64,
        unit_price: u64,
    ) -> Self {
        Self {
            id: SalesOrderLineId::new(),
            order_id,
            product_id,
            quantity,
            unit_price,
            backordered: false,
        }
    }
}

impl Entity for SalesOrderLine {
    type Id = SalesOrderLineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Aggregate root: SalesOrder.
///
/// The presence of `reserved_at`, `shipped_at` and `delivered_at` is the
/// lifecycle state; [`SalesOrder::status`] only reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrder {
    id: SalesOrderId,
    client_id: ClientId,
    created_at: DateTime<Utc>,
    reserved_at: Option<DateTime<Utc>>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    version: u64,
}

impl SalesOrder {
    pub fn new(id: SalesOrderId, client_id: ClientId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            client_id,
            created_at,
            reserved_at: None,
            shipped_at: None,
            delivered_at: None,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> SalesOrderId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn reserved_at(&self) -> Option<DateTime<Utc>> {
        self.reserved_at
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn status(&self) -> SalesOrderStatus {
        if self.delivered_at.is_some() {
            SalesOrderStatus::Delivered
        } else if self.shipped_at.is_some() {
            SalesOrderStatus::Shipped
        } else if self.reserved_at.is_some() {
            SalesOrderStatus::Reserved
        } else {
            SalesOrderStatus::Created
        }
    }

    /// Document reference written on movements and reservations.
    pub fn reference(&self) -> String {
        format!("SO-{}", self.id)
    }

    /// Stamp the row version assigned by the storage adapter on commit.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn mark_reserved(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        if self.reserved_at.is_some() {
            return Err(DomainError::business(format!(
                "sales order {} is already reserved",
                self.id
            )));
        }
        self.reserved_at = Some(at);
        Ok(())
    }

    pub fn ensure_shippable(&self) -> DomainResult<()> {
        match self.status() {
            SalesOrderStatus::Reserved => Ok(()),
            SalesOrderStatus::Created => Err(DomainError::business(format!(
                "sales order {} must be reserved before shipping",
                self.id
            ))),
            SalesOrderStatus::Shipped | SalesOrderStatus::Delivered => Err(
                DomainError::business(format!("sales order {} has already shipped", self.id)),
            ),
        }
    }

    pub fn mark_shipped(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_shippable()?;
        self.shipped_at = Some(at);
        Ok(())
    }

    pub fn mark_delivered(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        match self.status() {
            SalesOrderStatus::Shipped => {
                self.delivered_at = Some(at);
                Ok(())
            }
            SalesOrderStatus::Delivered => Err(DomainError::business(format!(
                "sales order {} is already delivered",
                self.id
            ))),
            SalesOrderStatus::Created | SalesOrderStatus::Reserved => Err(
                DomainError::business(format!(
                    "sales order {} must be shipped before delivery",
                    self.id
                )),
            ),
        }
    }

    /// Cancellation is only possible before shipment.
    pub fn ensure_cancellable(&self) -> DomainResult<()> {
        if self.shipped_at.is_some() || self.delivered_at.is_some() {
            return Err(DomainError::business(format!(
                "sales order {} cannot be cancelled after shipment",
                self.id
            )));
        }
        Ok(())
    }
}

impl AggregateRoot for SalesOrder {
    type Id = SalesOrderId;

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
    use chrono::TimeZone;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn test_order() -> SalesOrder {
        SalesOrder::new(SalesOrderId::new(), ClientId::new(), test_time())
    }

    #[test]
    fn status_follows_timestamps() {
        let mut order = test_order();
        assert_eq!(order.status(), SalesOrderStatus::Created);

        order.mark_reserved(test_time()).unwrap();
        assert_eq!(order.status(), SalesOrderStatus::Reserved);

        order.mark_shipped(test_time()).unwrap();
        assert_eq!(order.status(), SalesOrderStatus::Shipped);

        order.mark_delivered(test_time()).unwrap();
        assert_eq!(order.status(), SalesOrderStatus::Delivered);
        assert_eq!(order.delivered_at(), Some(test_time()));
    }

    #[test]
    fn cannot_reserve_twice() {
        let mut order = test_order();
        order.mark_reserved(test_time()).unwrap();
        let err = order.mark_reserved(test_time()).unwrap_err();
        match err {
            DomainError::Business(msg) if msg.contains("already reserved") => {}
            other => panic!("expected Business error, got {other:?}"),
        }
    }

    #[test]
    fn cannot_ship_before_reserving() {
        let mut order = test_order();
        assert!(matches!(
            order.mark_shipped(test_time()),
            Err(DomainError::Business(_))
        ));
        assert_eq!(order.shipped_at(), None);
    }

    #[test]
    fn cannot_ship_twice_or_deliver_unshipped() {
        let mut order = test_order();
        assert!(matches!(
            order.mark_delivered(test_time()),
            Err(DomainError::Business(_))
        ));
        order.mark_reserved(test_time()).unwrap();
        order.mark_shipped(test_time()).unwrap();
        assert!(matches!(
            order.mark_shipped(test_time()),
            Err(DomainError::Business(_))
        ));
    }

    #[test]
    fn cancellable_only_before_shipment() {
        let mut order = test_order();
        assert!(order.ensure_cancellable().is_ok());
        order.mark_reserved(test_time()).unwrap();
        assert!(order.ensure_cancellable().is_ok());
        order.mark_shipped(test_time()).unwrap();
        assert!(matches!(
            order.ensure_cancellable(),
            Err(DomainError::Business(_))
        ));
    }

    #[test]
    fn failed_transition_does_not_mutate() {
        let mut order = test_order();
        let before = order.clone();
        let _ = order.mark_delivered(test_time());
        let _ = order.mark_shipped(test_time());
        assert_eq!(order, before);
    }
}
