use std::collections::HashMap;
use std::sync::RwLock;

use logiflow_core::{
    AggregateRoot, DomainError, DomainResult, ExpectedVersion, SalesOrderId, SalesOrderLineId,
};
use logiflow_sales::{SalesOrder, SalesOrderLine, SalesOrderStore};

use super::{next_version, poisoned};

/// Orders and lines live in separate tables keyed by id; lines are found
/// through the per-order index, never through back-pointers.
#[derive(Debug, Default)]
struct SalesTables {
    orders: HashMap<SalesOrderId, SalesOrder>,
    lines: HashMap<SalesOrderLineId, SalesOrderLine>,
    lines_by_order: HashMap<SalesOrderId, Vec<SalesOrderLineId>>,
}

impl SalesTables {
    fn drop_lines(&mut self, order_id: &SalesOrderId) {
        if let Some(ids) = self.lines_by_order.remove(order_id) {
            for id in ids {
                self.lines.remove(&id);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemorySalesOrderStore {
    tables: RwLock<SalesTables>,
}

impl InMemorySalesOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SalesOrderStore for InMemorySalesOrderStore {
    fn find(&self, id: &SalesOrderId) -> DomainResult<Option<SalesOrder>> {
        let tables = self.tables.read().map_err(|_| poisoned("sales order"))?;
        Ok(tables.orders.get(id).cloned())
    }

    fn lines(&self, order_id: &SalesOrderId) -> DomainResult<Vec<SalesOrderLine>> {
        let tables = self.tables.read().map_err(|_| poisoned("sales order"))?;
        Ok(tables
            .lines_by_order
            .get(order_id)
            .map(|ids| ids.iter().filter_map(|id| tables.lines.get(id).cloned()).collect())
            .unwrap_or_default())
    }

    fn save(
        &self,
        order: SalesOrder,
        lines: Vec<SalesOrderLine>,
        expected: ExpectedVersion,
    ) -> DomainResult<SalesOrder> {
        let order_id = order.id_typed();
        if let Some(stray) = lines.iter().find(|l| l.order_id != order_id) {
            return Err(DomainError::validation(format!(
                "line {} belongs to another order",
                stray.id
            )));
        }

        let mut tables = self.tables.write().map_err(|_| poisoned("sales order"))?;
        let current = tables.orders.get(&order_id).map(|o| o.version());
        let version = next_version(expected, current)?;
        let saved = order.with_version(version);

        tables.drop_lines(&order_id);
        let ids = lines.iter().map(|l| l.id).collect();
        for line in lines {
            tables.lines.insert(line.id, line);
        }
        tables.lines_by_order.insert(order_id, ids);
        tables.orders.insert(order_id, saved.clone());
        Ok(saved)
    }

    fn delete(&self, id: &SalesOrderId, expected: ExpectedVersion) -> DomainResult<()> {
        let mut tables = self.tables.write().map_err(|_| poisoned("sales order"))?;
        let current = tables.orders.get(id).map(|o| o.version());
        if current.is_none() && expected == ExpectedVersion::Any {
            return Err(DomainError::not_found(format!("sales order {id}")));
        }
        expected.check(current)?;
        tables.orders.remove(id);
        tables.drop_lines(id);
        Ok(())
    }
}
