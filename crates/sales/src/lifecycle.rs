//! Sales order lifecycle: reserve → ship → deliver, or cancel.
//!
//! ```text
//! CREATED --reserve--> RESERVED --ship--> SHIPPED --deliver--> DELIVERED
//!    |                     |
//!    +------cancel---------+-----> (order deleted)
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use logiflow_core::{
    AggregateRoot, Clock, DomainError, DomainResult, ExpectedVersion, ProductId, SalesOrderId,
    SalesOrderLineId, WarehouseId, ensure_positive,
};
use logiflow_inventory::{InventoryMovement, InventoryStore, ReservationEngine, StockLedger};

use crate::order::{SalesOrder, SalesOrderLine};
use crate::store::SalesOrderStore;

/// A line that could not be reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackorderLine {
    pub line_id: SalesOrderLineId,
    pub product_id: ProductId,
    pub requested_quantity: i64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationResult {
    pub order_id: SalesOrderId,
    pub fully_reserved: bool,
    pub reserved_at: DateTime<Utc>,
    pub reserved_lines: usize,
    pub backorders: Vec<BackorderLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAvailability {
    pub line_id: SalesOrderLineId,
    pub product_id: ProductId,
    pub required_quantity: i64,
    pub available_quantity: i64,
    pub sufficient: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCheck {
    pub order_id: SalesOrderId,
    pub warehouse_id: WarehouseId,
    pub can_reserve_completely: bool,
    pub lines: Vec<LineAvailability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentResult {
    pub order_id: SalesOrderId,
    pub shipped_at: DateTime<Utc>,
    pub movements: Vec<InventoryMovement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub order_id: SalesOrderId,
    pub delivered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationResult {
    pub order_id: SalesOrderId,
    pub reason: String,
    pub cancelled_at: DateTime<Utc>,
    pub released_lines: usize,
}

/// Accumulator for the per-line reservation fold.
#[derive(Debug, Default)]
struct ReservationTally {
    reserved: Vec<(ProductId, i64)>,
    backorders: Vec<BackorderLine>,
}

pub struct SalesOrderLifecycle<O, I, C> {
    orders: O,
    ledger: StockLedger<I, C>,
    reservations: ReservationEngine<I>,
    clock: C,
}

impl<O, I, C> SalesOrderLifecycle<O, I, C> {
    pub fn new(
        orders: O,
        ledger: StockLedger<I, C>,
        reservations: ReservationEngine<I>,
        clock: C,
    ) -> Self {
        Self {
            orders,
            ledger,
            reservations,
            clock,
        }
    }
}

impl<O, I, C> SalesOrderLifecycle<O, I, C>
where
    O: SalesOrderStore,
    I: InventoryStore,
    C: Clock,
{
    /// Reserve every line against `warehouse_id`, best effort.
    ///
    /// A line that cannot be reserved is flagged `backordered` and the fold
    /// moves on; the order is marked reserved either way.
    #[instrument(skip(self))]
    pub fn reserve_order(
        &self,
        order_id: SalesOrderId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<ReservationResult> {
        let (mut order, mut lines) = self.load(order_id)?;
        let expected = ExpectedVersion::of(&order);
        let now = self.clock.now();
        order.mark_reserved(now)?;

        let reference = order.reference();
        let tally = lines
            .iter_mut()
            .fold(ReservationTally::default(), |mut tally, line| {
                match self.reservations.reserve_stock(
                    line.product_id,
                    warehouse_id,
                    line.quantity,
                    &reference,
                ) {
                    Ok(_) => {
                        line.backordered = false;
                        tally.reserved.push((line.product_id, line.quantity));
                    }
                    Err(err) => {
                        warn!(
                            line_id = %line.id,
                            product_id = %line.product_id,
                            quantity = line.quantity,
                            error = %err,
                            "line backordered"
                        );
                        line.backordered = true;
                        tally.backorders.push(BackorderLine {
                            line_id: line.id,
                            product_id: line.product_id,
                            requested_quantity: line.quantity,
                            reason: err.to_string(),
                        });
                    }
                }
                tally
            });

        if let Err(err) = self.orders.save(order, lines, expected) {
            // The order row moved underneath us: hand back what we took.
            self.release_all(&tally.reserved, warehouse_id, &reference);
            return Err(err);
        }

        let result = ReservationResult {
            order_id,
            fully_reserved: tally.backorders.is_empty(),
            reserved_at: now,
            reserved_lines: tally.reserved.len(),
            backorders: tally.backorders,
        };
        info!(
            fully_reserved = result.fully_reserved,
            reserved_lines = result.reserved_lines,
            backorders = result.backorders.len(),
            "sales order reserved"
        );
        Ok(result)
    }

    /// Read-only: compare each line with current availability.
    pub fn check_availability(
        &self,
        order_id: SalesOrderId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<AvailabilityCheck> {
        let (_, lines) = self.load(order_id)?;

        let mut report = Vec::with_capacity(lines.len());
        for line in &lines {
            let available = self
                .ledger
                .inventory_for(line.product_id, warehouse_id)?
                .map_or(0, |row| row.available());
            report.push(LineAvailability {
                line_id: line.id,
                product_id: line.product_id,
                required_quantity: line.quantity,
                available_quantity: available,
                sufficient: available >= line.quantity,
            });
        }

        Ok(AvailabilityCheck {
            order_id,
            warehouse_id,
            can_reserve_completely: report.iter().all(|l| l.sufficient),
            lines: report,
        })
    }

    /// Record an outbound movement for every non-backordered line.
    ///
    /// `shipped_at` is claimed with a versioned save before any stock moves,
    /// so a concurrent cancel or ship fails this call with `Conflict` and
    /// leaves the ledger untouched. If an outbound fails after the claim, the
    /// lines already issued are restocked and the order goes back to reserved.
    #[instrument(skip(self))]
    pub fn ship_order(
        &self,
        order_id: SalesOrderId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<ShipmentResult> {
        let (mut order, lines) = self.load(order_id)?;
        let expected = ExpectedVersion::of(&order);
        order.ensure_shippable()?;

        let to_ship: Vec<SalesOrderLine> = lines
            .iter()
            .filter(|l| !l.backordered)
            .cloned()
            .collect();
        self.ensure_can_ship(&to_ship, warehouse_id)?;

        let reserved = order.clone();
        let now = self.clock.now();
        order.mark_shipped(now)?;
        let claimed = self.orders.save(order, lines.clone(), expected)?;

        let reference = claimed.reference();
        let movements = match self.issue_lines(&to_ship, warehouse_id, &reference) {
            Ok(movements) => movements,
            Err(err) => {
                let revert = self
                    .orders
                    .save(reserved, lines, ExpectedVersion::of(&claimed));
                if let Err(revert) = revert {
                    warn!(error = %revert, "failed to revert shipped order");
                }
                return Err(err);
            }
        };

        info!(movements = movements.len(), "sales order shipped");
        Ok(ShipmentResult {
            order_id,
            shipped_at: now,
            movements,
        })
    }

    #[instrument(skip(self))]
    pub fn deliver_order(&self, order_id: SalesOrderId) -> DomainResult<DeliveryResult> {
        let (mut order, lines) = self.load(order_id)?;
        let expected = ExpectedVersion::of(&order);
        let now = self.clock.now();
        order.mark_delivered(now)?;
        self.orders.save(order, lines, expected)?;

        info!("sales order delivered");
        Ok(DeliveryResult {
            order_id,
            delivered_at: now,
        })
    }

    /// Delete the order, then release the reservations it held.
    ///
    /// The delete carries the loaded version, so of two racing cancels only
    /// one releases stock. Only a reserved order holds reservations; a
    /// never-reserved order is deleted without touching stock.
    #[instrument(skip(self, reason))]
    pub fn cancel_order(
        &self,
        order_id: SalesOrderId,
        reason: &str,
        warehouse_id: WarehouseId,
    ) -> DomainResult<CancellationResult> {
        let (order, lines) = self.load(order_id)?;
        order.ensure_cancellable()?;
        self.orders.delete(&order_id, ExpectedVersion::of(&order))?;

        let mut released_lines = 0;
        let mut first_error = None;
        if order.reserved_at().is_some() {
            let reference = order.reference();
            for line in lines.iter().filter(|l| !l.backordered) {
                match self.reservations.release_reservation(
                    line.product_id,
                    warehouse_id,
                    line.quantity,
                    &reference,
                ) {
                    Ok(_) => released_lines += 1,
                    Err(err) => {
                        warn!(line_id = %line.id, error = %err, "failed to release reservation");
                        first_error.get_or_insert(err);
                    }
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        let cancelled_at = self.clock.now();
        info!(reason, released_lines, "sales order cancelled");
        Ok(CancellationResult {
            order_id,
            reason: reason.to_string(),
            cancelled_at,
            released_lines,
        })
    }

    fn load(&self, order_id: SalesOrderId) -> DomainResult<(SalesOrder, Vec<SalesOrderLine>)> {
        let order = self
            .orders
            .find(&order_id)?
            .ok_or_else(|| DomainError::not_found(format!("sales order {order_id}")))?;
        let lines = self.orders.lines(&order_id)?;
        Ok((order, lines))
    }

    /// Pre-flight so a short line fails the call before any movement is written.
    fn ensure_can_ship(
        &self,
        lines: &[SalesOrderLine],
        warehouse_id: WarehouseId,
    ) -> DomainResult<()> {
        let mut required: HashMap<ProductId, i64> = HashMap::new();
        for line in lines {
            *required.entry(line.product_id).or_default() += line.quantity;
        }
        for (product_id, quantity) in required {
            let row = self
                .ledger
                .inventory_for(product_id, warehouse_id)?
                .ok_or_else(|| {
                    DomainError::not_found(format!(
                        "no inventory for product {product_id} in warehouse {warehouse_id}"
                    ))
                })?;
            if quantity > row.available() {
                return Err(DomainError::stock_unavailable(quantity, row.available()));
            }
        }
        Ok(())
    }

    /// One outbound per line; on failure the lines already issued are restocked.
    fn issue_lines(
        &self,
        lines: &[SalesOrderLine],
        warehouse_id: WarehouseId,
        reference: &str,
    ) -> DomainResult<Vec<InventoryMovement>> {
        let mut movements = Vec::with_capacity(lines.len());
        for line in lines {
            match self.ledger.record_outbound(
                line.product_id,
                warehouse_id,
                line.quantity,
                reference,
                format!("Shipment of sales order {}", line.order_id),
            ) {
                Ok(movement) => movements.push(movement),
                Err(err) => {
                    self.restock(&lines[..movements.len()], warehouse_id, reference);
                    return Err(err);
                }
            }
        }
        Ok(movements)
    }

    /// Undo issued lines: put the units back and re-reserve them.
    fn restock(&self, lines: &[SalesOrderLine], warehouse_id: WarehouseId, reference: &str) {
        for line in lines {
            let restored = self
                .ledger
                .record_adjustment(
                    line.product_id,
                    warehouse_id,
                    line.quantity,
                    reference,
                    format!("Reversal of shipment of sales order {}", line.order_id),
                )
                .and_then(|_| {
                    self.reservations.reserve_stock(
                        line.product_id,
                        warehouse_id,
                        line.quantity,
                        reference,
                    )
                });
            if let Err(err) = restored {
                warn!(product_id = %line.product_id, error = %err, "failed to restock line");
            }
        }
    }

    fn release_all(
        &self,
        reserved: &[(ProductId, i64)],
        warehouse_id: WarehouseId,
        reference: &str,
    ) {
        for (product_id, quantity) in reserved {
            if let Err(err) =
                self.reservations
                    .release_reservation(*product_id, warehouse_id, *quantity, reference)
            {
                warn!(%product_id, error = %err, "failed to roll back reservation");
            }
        }
    }
}

impl<O, I, C> SalesOrderLifecycle<O, I, C>
where
    O: SalesOrderStore,
{
    /// Current state of an order and its lines.
    pub fn order(
        &self,
        order_id: SalesOrderId,
    ) -> DomainResult<Option<(SalesOrder, Vec<SalesOrderLine>)>> {
        match self.orders.find(&order_id)? {
            Some(order) => {
                let lines = self.orders.lines(&order_id)?;
                Ok(Some((order, lines)))
            }
            None => Ok(None),
        }
    }

    /// Persist a newly created order (owned by the plain order service).
    pub fn create_order(
        &self,
        order: SalesOrder,
        lines: Vec<SalesOrderLine>,
    ) -> DomainResult<SalesOrder> {
        if order.version() != 0 {
            return Err(DomainError::business("order has already been persisted"));
        }
        for line in &lines {
            if line.order_id != order.id_typed() {
                return Err(DomainError::validation(format!(
                    "line {} belongs to another order",
                    line.id
                )));
            }
            ensure_positive(line.quantity, "line quantity")?;
        }
        self.orders.save(order, lines, ExpectedVersion::NoRow)
    }
}
