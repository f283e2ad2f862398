use std::collections::HashMap;
use std::sync::RwLock;

use logiflow_core::{
    AggregateRoot, DomainError, DomainResult, ExpectedVersion, InventoryId, ProductId, WarehouseId,
};
use logiflow_inventory::{Inventory, InventoryMovement, InventoryStore, StockWrite};

use super::{next_version, poisoned};

#[derive(Debug, Default)]
struct InventoryTables {
    rows: HashMap<InventoryId, Inventory>,
    by_pair: HashMap<(ProductId, WarehouseId), InventoryId>,
    movements: Vec<InventoryMovement>,
}

/// In-memory inventory rows + append-only movement log.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    tables: RwLock<InventoryTables>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of movements across all rows.
    pub fn movement_count(&self) -> usize {
        self.tables.read().map(|t| t.movements.len()).unwrap_or(0)
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn find(&self, id: &InventoryId) -> DomainResult<Option<Inventory>> {
        let tables = self.tables.read().map_err(|_| poisoned("inventory"))?;
        Ok(tables.rows.get(id).cloned())
    }

    fn find_by_product_and_warehouse(
        &self,
        product_id: &ProductId,
        warehouse_id: &WarehouseId,
    ) -> DomainResult<Option<Inventory>> {
        let tables = self.tables.read().map_err(|_| poisoned("inventory"))?;
        Ok(tables
            .by_pair
            .get(&(*product_id, *warehouse_id))
            .and_then(|id| tables.rows.get(id))
            .cloned())
    }

    fn commit(&self, write: StockWrite) -> DomainResult<Inventory> {
        let StockWrite {
            inventory,
            expected,
            movement,
        } = write;

        if let Some(m) = &movement {
            if m.inventory_id != inventory.id_typed() {
                return Err(DomainError::validation(
                    "movement does not belong to the written inventory row",
                ));
            }
        }

        let mut tables = self.tables.write().map_err(|_| poisoned("inventory"))?;

        let pair = (inventory.product_id(), inventory.warehouse_id());
        if expected == ExpectedVersion::NoRow {
            if let Some(existing) = tables.by_pair.get(&pair) {
                return Err(DomainError::conflict(format!(
                    "inventory {existing} already tracks product {} in warehouse {}",
                    pair.0, pair.1
                )));
            }
        }

        let current = tables.rows.get(inventory.id()).map(|row| row.version());
        let version = next_version(expected, current)?;
        let saved = inventory.with_version(version);

        tables.by_pair.insert(pair, saved.id_typed());
        tables.rows.insert(saved.id_typed(), saved.clone());
        if let Some(m) = movement {
            tables.movements.push(m);
        }
        Ok(saved)
    }

    fn movements(&self, inventory_id: &InventoryId) -> DomainResult<Vec<InventoryMovement>> {
        let tables = self.tables.read().map_err(|_| poisoned("inventory"))?;
        Ok(tables
            .movements
            .iter()
            .filter(|m| &m.inventory_id == inventory_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use logiflow_core::MovementId;
    use logiflow_inventory::MovementType;

    fn fresh_row() -> Inventory {
        Inventory::new(InventoryId::new(), ProductId::new(), WarehouseId::new())
    }

    #[test]
    fn stale_version_is_rejected_and_nothing_is_written() {
        let store = InMemoryInventoryStore::new();
        let row = store
            .commit(StockWrite {
                inventory: fresh_row(),
                expected: ExpectedVersion::NoRow,
                movement: None,
            })
            .unwrap();
        assert_eq!(row.version(), 1);

        let mut first = row.clone();
        first.receive(10).unwrap();
        store
            .commit(StockWrite {
                inventory: first,
                expected: ExpectedVersion::Exact(1),
                movement: None,
            })
            .unwrap();

        let mut stale = row.clone();
        stale.receive(99).unwrap();
        let movement = InventoryMovement {
            id: MovementId::new(),
            inventory_id: row.id_typed(),
            movement_type: MovementType::Inbound,
            quantity: 99,
            occurred_at: Utc::now(),
            reference_document: "TEST".to_string(),
            description: String::new(),
        };
        let err = store
            .commit(StockWrite {
                inventory: stale,
                expected: ExpectedVersion::Exact(1),
                movement: Some(movement),
            })
            .unwrap_err();
        assert!(err.is_conflict());

        let stored = store.find(&row.id_typed()).unwrap().unwrap();
        assert_eq!(stored.qty_on_hand(), 10);
        assert_eq!(stored.version(), 2);
        assert_eq!(store.movement_count(), 0);
    }

    #[test]
    fn second_row_for_same_pair_is_rejected() {
        let store = InMemoryInventoryStore::new();
        let row = fresh_row();
        store
            .commit(StockWrite {
                inventory: row.clone(),
                expected: ExpectedVersion::NoRow,
                movement: None,
            })
            .unwrap();

        let twin = Inventory::new(InventoryId::new(), row.product_id(), row.warehouse_id());
        let err = store
            .commit(StockWrite {
                inventory: twin,
                expected: ExpectedVersion::NoRow,
                movement: None,
            })
            .unwrap_err();
        assert!(err.is_conflict());
    }
}
