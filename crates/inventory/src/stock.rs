use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use logiflow_core::{
    AggregateRoot, DomainError, DomainResult, InventoryId, MovementId, ProductId, WarehouseId,
    ensure_positive,
};

/// Aggregate root: Inventory.
///
/// Stock of one product in one warehouse. Invariant: `0 <= qty_reserved <= qty_on_hand`.
/// Mutators check first and only then write, so a failed call leaves the row untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    id: InventoryId,
    product_id: ProductId,
    warehouse_id: WarehouseId,
    qty_on_hand: i64,
    qty_reserved: i64,
    version: u64,
}

impl Inventory {
    /// A freshly tracked, empty row (not yet persisted).
    pub fn new(id: InventoryId, product_id: ProductId, warehouse_id: WarehouseId) -> Self {
        Self {
            id,
            product_id,
            warehouse_id,
            qty_on_hand: 0,
            qty_reserved: 0,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> InventoryId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn qty_on_hand(&self) -> i64 {
        self.qty_on_hand
    }

    pub fn qty_reserved(&self) -> i64 {
        self.qty_reserved
    }

    /// `qty_on_hand - qty_reserved`.
    pub fn available(&self) -> i64 {
        self.qty_on_hand - self.qty_reserved
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.available() <= 0
    }

    /// Stamp the row version assigned by the storage adapter on commit.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Physical receipt: `qty_on_hand += quantity`.
    pub fn receive(&mut self, quantity: i64) -> DomainResult<()> {
        ensure_positive(quantity, "inbound quantity")?;
        self.qty_on_hand += quantity;
        Ok(())
    }

    /// Physical issue. Consumes reservations first.
    ///
    /// Fails with `StockUnavailable` when `quantity > available`.
    pub fn issue(&mut self, quantity: i64) -> DomainResult<()> {
        ensure_positive(quantity, "outbound quantity")?;
        let available = self.available();
        if quantity > available {
            return Err(DomainError::stock_unavailable(quantity, available));
        }
        self.qty_on_hand -= quantity;
        self.qty_reserved -= quantity.min(self.qty_reserved);
        Ok(())
    }

    /// Signed correction of `qty_on_hand`.
    pub fn adjust(&mut self, delta: i64) -> DomainResult<()> {
        if delta == 0 {
            return Err(DomainError::validation("adjustment delta cannot be zero"));
        }
        let new_on_hand = self.qty_on_hand + delta;
        if new_on_hand < 0 {
            return Err(DomainError::validation(format!(
                "adjustment would make stock negative ({} + {delta})",
                self.qty_on_hand
            )));
        }
        if new_on_hand < self.qty_reserved {
            return Err(DomainError::validation(format!(
                "adjustment would leave stock ({new_on_hand}) below reserved quantity ({})",
                self.qty_reserved
            )));
        }
        self.qty_on_hand = new_on_hand;
        Ok(())
    }

    /// Commit `quantity` against available stock.
    pub fn reserve(&mut self, quantity: i64) -> DomainResult<()> {
        ensure_positive(quantity, "reservation quantity")?;
        let available = self.available();
        if available < quantity {
            return Err(DomainError::stock_unavailable(quantity, available));
        }
        self.qty_reserved += quantity;
        Ok(())
    }

    /// Undo a reservation. Over-release floors at zero.
    pub fn release(&mut self, quantity: i64) -> DomainResult<()> {
        ensure_positive(quantity, "release quantity")?;
        self.qty_reserved = (self.qty_reserved - quantity).max(0);
        Ok(())
    }
}

impl AggregateRoot for Inventory {
    type Id = InventoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Kind of physical stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Inbound,
    Outbound,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Inbound => "INBOUND",
            MovementType::Outbound => "OUTBOUND",
            MovementType::Adjustment => "ADJUSTMENT",
        }
    }
}

/// Immutable ledger entry.
///
/// `quantity` is a positive magnitude for inbound/outbound and the signed
/// effect for adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub id: MovementId,
    pub inventory_id: InventoryId,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
    pub reference_document: String,
    pub description: String,
}

impl InventoryMovement {
    /// Net change this movement made to `qty_on_hand`.
    pub fn on_hand_delta(&self) -> i64 {
        match self.movement_type {
            MovementType::Inbound | MovementType::Adjustment => self.quantity,
            MovementType::Outbound => -self.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row() -> Inventory {
        Inventory::new(InventoryId::new(), ProductId::new(), WarehouseId::new())
    }

    fn row_with(on_hand: i64, reserved: i64) -> Inventory {
        let mut inv = row();
        if on_hand > 0 {
            inv.receive(on_hand).unwrap();
        }
        if reserved > 0 {
            inv.reserve(reserved).unwrap();
        }
        inv
    }

    #[test]
    fn available_is_on_hand_minus_reserved() {
        let inv = row_with(50, 20);
        assert_eq!(inv.available(), 30);
        assert!(!inv.is_out_of_stock());
        assert!(row_with(5, 5).is_out_of_stock());
    }

    #[test]
    fn issue_consumes_reservation_first() {
        let mut inv = row_with(50, 10);
        inv.issue(30).unwrap();
        assert_eq!(inv.qty_on_hand(), 20);
        assert_eq!(inv.qty_reserved(), 0);
    }

    #[test]
    fn issue_beyond_available_leaves_row_untouched() {
        let mut inv = row_with(50, 30);
        let before = inv.clone();
        let err = inv.issue(21).unwrap_err();
        assert_eq!(err, DomainError::stock_unavailable(21, 20));
        assert_eq!(inv, before);
    }

    #[test]
    fn reserve_rejects_more_than_available() {
        let mut inv = row_with(10, 4);
        assert!(matches!(
            inv.reserve(7),
            Err(DomainError::StockUnavailable { requested: 7, available: 6 })
        ));
        inv.reserve(6).unwrap();
        assert_eq!(inv.available(), 0);
    }

    #[test]
    fn release_floors_at_zero() {
        let mut inv = row_with(10, 4);
        inv.release(100).unwrap();
        assert_eq!(inv.qty_reserved(), 0);
        assert_eq!(inv.qty_on_hand(), 10);
    }

    #[test]
    fn adjustment_cannot_go_negative_or_below_reserved() {
        let mut inv = row_with(10, 6);
        assert!(matches!(inv.adjust(-11), Err(DomainError::Validation(_))));
        assert!(matches!(inv.adjust(-5), Err(DomainError::Validation(_))));
        assert!(matches!(inv.adjust(0), Err(DomainError::Validation(_))));
        inv.adjust(-4).unwrap();
        assert_eq!(inv.qty_on_hand(), 6);
        inv.adjust(3).unwrap();
        assert_eq!(inv.qty_on_hand(), 9);
    }

    #[test]
    fn non_positive_quantities_are_validation_errors() {
        let mut inv = row_with(10, 0);
        for result in [inv.receive(0), inv.issue(-1), inv.reserve(0), inv.release(-2)] {
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Receive(i64),
        Issue(i64),
        Adjust(i64),
        Reserve(i64),
        Release(i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-5i64..100).prop_map(Op::Receive),
            (-5i64..100).prop_map(Op::Issue),
            (-100i64..100).prop_map(Op::Adjust),
            (-5i64..100).prop_map(Op::Reserve),
            (-5i64..100).prop_map(Op::Release),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of operations (successful or not) keeps
        /// `0 <= reserved <= on_hand`, and failures never change the row.
        #[test]
        fn reserved_never_exceeds_on_hand(ops in prop::collection::vec(op_strategy(), 1..40)) {
            let mut inv = row();
            for op in ops {
                let before = inv.clone();
                let result = match op {
                    Op::Receive(q) => inv.receive(q),
                    Op::Issue(q) => inv.issue(q),
                    Op::Adjust(q) => inv.adjust(q),
                    Op::Reserve(q) => inv.reserve(q),
                    Op::Release(q) => inv.release(q),
                };
                if result.is_err() {
                    prop_assert_eq!(&inv, &before);
                }
                prop_assert!(inv.qty_reserved() >= 0);
                prop_assert!(inv.qty_reserved() <= inv.qty_on_hand());
                prop_assert!(inv.available() >= 0);
            }
        }
    }
}
