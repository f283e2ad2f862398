use std::collections::HashMap;
use std::sync::RwLock;

use logiflow_core::{
    AggregateRoot, DomainError, DomainResult, ExpectedVersion, PurchaseOrderId, SupplierId,
};
use logiflow_purchasing::{PurchaseOrder, PurchaseOrderLine, PurchaseOrderStore};

use super::{next_version, poisoned};

#[derive(Debug, Default)]
struct PurchaseTables {
    orders: HashMap<PurchaseOrderId, PurchaseOrder>,
    lines: HashMap<PurchaseOrderId, Vec<PurchaseOrderLine>>,
}

#[derive(Debug, Default)]
pub struct InMemoryPurchaseOrderStore {
    tables: RwLock<PurchaseTables>,
}

impl InMemoryPurchaseOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PurchaseOrderStore for InMemoryPurchaseOrderStore {
    fn find(&self, id: &PurchaseOrderId) -> DomainResult<Option<PurchaseOrder>> {
        let tables = self.tables.read().map_err(|_| poisoned("purchase order"))?;
        Ok(tables.orders.get(id).cloned())
    }

    fn lines(&self, order_id: &PurchaseOrderId) -> DomainResult<Vec<PurchaseOrderLine>> {
        let tables = self.tables.read().map_err(|_| poisoned("purchase order"))?;
        Ok(tables.lines.get(order_id).cloned().unwrap_or_default())
    }

    fn find_by_supplier(&self, supplier_id: &SupplierId) -> DomainResult<Vec<PurchaseOrder>> {
        let tables = self.tables.read().map_err(|_| poisoned("purchase order"))?;
        let mut orders: Vec<PurchaseOrder> = tables
            .orders
            .values()
            .filter(|o| &o.supplier_id() == supplier_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at());
        Ok(orders)
    }

    fn save(
        &self,
        order: PurchaseOrder,
        lines: Option<Vec<PurchaseOrderLine>>,
        expected: ExpectedVersion,
    ) -> DomainResult<PurchaseOrder> {
        let order_id = order.id_typed();
        if let Some(stray) = lines.iter().flatten().find(|l| l.order_id != order_id) {
            return Err(DomainError::validation(format!(
                "line {} belongs to another order",
                stray.id
            )));
        }

        let mut tables = self.tables.write().map_err(|_| poisoned("purchase order"))?;
        let current = tables.orders.get(&order_id).map(|o| o.version());
        let version = next_version(expected, current)?;
        let saved = order.with_version(version);

        if let Some(lines) = lines {
            tables.lines.insert(order_id, lines);
        }
        tables.orders.insert(order_id, saved.clone());
        Ok(saved)
    }
}
