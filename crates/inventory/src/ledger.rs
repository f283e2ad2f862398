//! Stock ledger: the single writer of `qty_on_hand`.
//!
//! Every physical change (inbound, outbound, adjustment) is applied to the
//! inventory row and appended to the movement log in one [`StockWrite`].
//!
//! [`StockWrite`]: crate::store::StockWrite

use tracing::{info, instrument};

use logiflow_core::{
    Clock, DomainError, DomainResult, ExpectedVersion, InventoryId, MovementId, ProductId,
    WarehouseId, ensure_positive,
};

use crate::stock::{Inventory, InventoryMovement, MovementType};
use crate::store::{InventoryStore, StockWrite, update_row};

/// Default bound on optimistic-concurrency retries per operation.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct StockLedger<S, C> {
    store: S,
    clock: C,
    max_retries: u32,
}

impl<S, C> StockLedger<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            max_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    pub fn with_max_conflict_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S, C> StockLedger<S, C>
where
    S: InventoryStore,
    C: Clock,
{
    /// Start tracking stock for a (product, warehouse) pair.
    ///
    /// Idempotent: returns the existing row when one is already tracked.
    #[instrument(skip(self))]
    pub fn track_stock(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Inventory> {
        if let Some(existing) = self
            .store
            .find_by_product_and_warehouse(&product_id, &warehouse_id)?
        {
            return Ok(existing);
        }

        let row = Inventory::new(InventoryId::new(), product_id, warehouse_id);
        let write = StockWrite {
            inventory: row,
            expected: ExpectedVersion::NoRow,
            movement: None,
        };
        match self.store.commit(write) {
            Ok(saved) => {
                info!(inventory_id = %saved.id_typed(), "inventory row created");
                Ok(saved)
            }
            // Lost an insert race: the other writer's row is the one to use.
            Err(err) if err.is_conflict() => self
                .store
                .find_by_product_and_warehouse(&product_id, &warehouse_id)?
                .ok_or(err),
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, reference_document, description))]
    pub fn record_inbound(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: i64,
        reference_document: impl Into<String>,
        description: impl Into<String>,
    ) -> DomainResult<InventoryMovement> {
        self.record(
            product_id,
            warehouse_id,
            MovementType::Inbound,
            quantity,
            reference_document.into(),
            description.into(),
        )
    }

    /// Fails with `StockUnavailable` (and changes nothing) when
    /// `quantity > available`.
    #[instrument(skip(self, reference_document, description))]
    pub fn record_outbound(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: i64,
        reference_document: impl Into<String>,
        description: impl Into<String>,
    ) -> DomainResult<InventoryMovement> {
        self.record(
            product_id,
            warehouse_id,
            MovementType::Outbound,
            quantity,
            reference_document.into(),
            description.into(),
        )
    }

    /// `signed_quantity` is added to `qty_on_hand` as-is.
    #[instrument(skip(self, reference_document, reason))]
    pub fn record_adjustment(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        signed_quantity: i64,
        reference_document: impl Into<String>,
        reason: impl Into<String>,
    ) -> DomainResult<InventoryMovement> {
        self.record(
            product_id,
            warehouse_id,
            MovementType::Adjustment,
            signed_quantity,
            reference_document.into(),
            reason.into(),
        )
    }

    pub fn calculate_available_qty(&self, inventory_id: InventoryId) -> DomainResult<i64> {
        let row = self
            .store
            .find(&inventory_id)?
            .ok_or_else(|| DomainError::not_found(format!("inventory {inventory_id}")))?;
        Ok(row.available())
    }

    /// An untracked pair counts as out of stock.
    pub fn is_out_of_stock(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<bool> {
        Ok(self
            .store
            .find_by_product_and_warehouse(&product_id, &warehouse_id)?
            .map_or(true, |row| row.is_out_of_stock()))
    }

    pub fn inventory_for(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Option<Inventory>> {
        self.store
            .find_by_product_and_warehouse(&product_id, &warehouse_id)
    }

    pub fn movements(&self, inventory_id: InventoryId) -> DomainResult<Vec<InventoryMovement>> {
        self.store.movements(&inventory_id)
    }

    fn record(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        movement_type: MovementType,
        quantity: i64,
        reference_document: String,
        description: String,
    ) -> DomainResult<InventoryMovement> {
        if movement_type != MovementType::Adjustment {
            ensure_positive(quantity, "quantity")?;
        }

        let (row, movement) = update_row(
            &self.store,
            &product_id,
            &warehouse_id,
            self.max_retries,
            |row| {
                match movement_type {
                    MovementType::Inbound => row.receive(quantity)?,
                    MovementType::Outbound => row.issue(quantity)?,
                    MovementType::Adjustment => row.adjust(quantity)?,
                }
                Ok(InventoryMovement {
                    id: MovementId::new(),
                    inventory_id: row.id_typed(),
                    movement_type,
                    quantity,
                    occurred_at: self.clock.now(),
                    reference_document: reference_document.clone(),
                    description: description.clone(),
                })
            },
        )?;

        info!(
            movement_id = %movement.id,
            movement_type = movement_type.as_str(),
            quantity,
            qty_on_hand = row.qty_on_hand(),
            qty_reserved = row.qty_reserved(),
            "stock movement recorded"
        );
        Ok(movement)
    }
}
