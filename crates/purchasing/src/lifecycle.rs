//! Purchase order lifecycle: approve → receive, or cancel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use logiflow_core::{
    AggregateRoot, Clock, Directory, DomainError, DomainResult, ExpectedVersion, ProductId,
    PurchaseOrderId, PurchaseOrderLineId, SupplierId, WarehouseId, ensure_positive,
};
use logiflow_inventory::{InventoryMovement, InventoryStore, StockLedger};

use crate::order::{PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus};
use crate::store::PurchaseOrderStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResult {
    pub order_id: PurchaseOrderId,
    pub status: PurchaseOrderStatus,
    pub approved_at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptResult {
    pub order_id: PurchaseOrderId,
    pub status: PurchaseOrderStatus,
    pub fully_received: bool,
    pub total_lines_processed: usize,
    pub received_at: DateTime<Utc>,
    pub movements: Vec<InventoryMovement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationResult {
    pub order_id: PurchaseOrderId,
    pub status: PurchaseOrderStatus,
    pub reason: String,
    pub cancelled_at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReceptionStatus {
    pub line_id: PurchaseOrderLineId,
    pub product_id: ProductId,
    pub ordered_quantity: i64,
    pub received_quantity: i64,
    pub pending_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceptionStatus {
    pub order_id: PurchaseOrderId,
    pub status: PurchaseOrderStatus,
    pub total_ordered: i64,
    pub total_received: i64,
    pub total_pending: i64,
    pub percentage_received: f64,
    pub fully_received: bool,
    pub lines: Vec<LineReceptionStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStockInfo {
    pub product_id: ProductId,
    pub product_code: String,
    pub product_name: String,
    pub po_line_quantity: i64,
    pub current_qty_on_hand: i64,
    pub current_qty_reserved: i64,
    pub current_available: i64,
    /// Current availability already covers the line (not a post-receipt projection).
    pub will_be_sufficient: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAvailabilityForPO {
    pub order_id: PurchaseOrderId,
    pub warehouse_id: WarehouseId,
    pub products: Vec<ProductStockInfo>,
}

pub struct PurchaseOrderLifecycle<P, I, C, D> {
    orders: P,
    ledger: StockLedger<I, C>,
    directory: D,
    clock: C,
}

impl<P, I, C, D> PurchaseOrderLifecycle<P, I, C, D> {
    pub fn new(orders: P, ledger: StockLedger<I, C>, directory: D, clock: C) -> Self {
        Self {
            orders,
            ledger,
            directory,
            clock,
        }
    }
}

impl<P, I, C, D> PurchaseOrderLifecycle<P, I, C, D>
where
    P: PurchaseOrderStore,
    I: InventoryStore,
    C: Clock,
    D: Directory,
{
    #[instrument(skip(self))]
    pub fn approve_purchase_order(
        &self,
        order_id: PurchaseOrderId,
    ) -> DomainResult<ApprovalResult> {
        let mut order = self.load(order_id)?;
        let expected = ExpectedVersion::of(&order);
        let lines = self.orders.lines(&order_id)?;
        order.approve(lines.len())?;
        let saved = self.orders.save(order, None, expected)?;

        let approved_at = self.clock.now();
        info!(lines = lines.len(), "purchase order approved");
        Ok(ApprovalResult {
            order_id,
            status: saved.status(),
            approved_at,
            message: format!("Purchase order {order_id} approved"),
        })
    }

    /// Receive every line into `warehouse_id` and mark the order delivered.
    ///
    /// `DELIVERED` is claimed with a versioned save before any stock is
    /// booked, so a concurrent cancel or receive fails this call with
    /// `Conflict` and books nothing. If an inbound fails after the claim, the
    /// lines already booked are reversed and the previous status restored.
    /// Pairs not yet tracked in the warehouse get an inventory row first.
    #[instrument(skip(self))]
    pub fn receive_full_order(
        &self,
        order_id: PurchaseOrderId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<ReceiptResult> {
        let mut order = self.load(order_id)?;
        let expected = ExpectedVersion::of(&order);
        order.ensure_receivable()?;
        if !self.directory.warehouse_exists(&warehouse_id) {
            return Err(DomainError::business(format!(
                "warehouse {warehouse_id} does not exist"
            )));
        }
        let lines = self.orders.lines(&order_id)?;

        let previous = order.clone();
        order.mark_delivered()?;
        let claimed = self.orders.save(order, None, expected)?;

        let reference = claimed.reference();
        let movements = match self.book_inbounds(&lines, warehouse_id, &reference) {
            Ok(movements) => movements,
            Err(err) => {
                let revert = self
                    .orders
                    .save(previous, None, ExpectedVersion::of(&claimed));
                if let Err(revert) = revert {
                    warn!(error = %revert, "failed to revert received purchase order");
                }
                return Err(err);
            }
        };

        let received_at = self.clock.now();
        info!(lines = lines.len(), "purchase order received");
        Ok(ReceiptResult {
            order_id,
            status: claimed.status(),
            fully_received: true,
            total_lines_processed: lines.len(),
            received_at,
            movements,
        })
    }

    #[instrument(skip(self, reason))]
    pub fn cancel_purchase_order(
        &self,
        order_id: PurchaseOrderId,
        reason: &str,
    ) -> DomainResult<CancellationResult> {
        let mut order = self.load(order_id)?;
        let expected = ExpectedVersion::of(&order);
        order.cancel()?;
        let saved = self.orders.save(order, None, expected)?;

        let cancelled_at = self.clock.now();
        info!(reason, "purchase order cancelled");
        Ok(CancellationResult {
            order_id,
            status: saved.status(),
            reason: reason.to_string(),
            cancelled_at,
            message: format!("Purchase order {order_id} cancelled"),
        })
    }

    /// Ordered vs. received quantities.
    ///
    /// Received quantities are not tracked per line, so `total_received` is
    /// always 0, even after [`receive_full_order`](Self::receive_full_order).
    pub fn check_reception_status(
        &self,
        order_id: PurchaseOrderId,
    ) -> DomainResult<ReceptionStatus> {
        let order = self.load(order_id)?;
        let lines = self.orders.lines(&order_id)?;

        let line_status: Vec<LineReceptionStatus> = lines
            .iter()
            .map(|line| {
                let received = 0;
                LineReceptionStatus {
                    line_id: line.id,
                    product_id: line.product_id,
                    ordered_quantity: line.quantity,
                    received_quantity: received,
                    pending_quantity: line.quantity - received,
                }
            })
            .collect();

        let total_ordered: i64 = line_status.iter().map(|l| l.ordered_quantity).sum();
        let total_received: i64 = line_status.iter().map(|l| l.received_quantity).sum();
        let total_pending = total_ordered - total_received;
        let percentage_received = if total_ordered == 0 {
            0.0
        } else {
            total_received as f64 * 100.0 / total_ordered as f64
        };

        Ok(ReceptionStatus {
            order_id,
            status: order.status(),
            total_ordered,
            total_received,
            total_pending,
            percentage_received,
            fully_received: total_pending == 0,
            lines: line_status,
        })
    }

    /// Current stock in `warehouse_id` for each product on the order.
    pub fn get_stock_availability(
        &self,
        order_id: PurchaseOrderId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<StockAvailabilityForPO> {
        self.load(order_id)?;
        if !self.directory.warehouse_exists(&warehouse_id) {
            return Err(DomainError::not_found(format!("warehouse {warehouse_id}")));
        }

        let lines = self.orders.lines(&order_id)?;
        let mut products = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = self
                .directory
                .product(&line.product_id)
                .ok_or_else(|| DomainError::not_found(format!("product {}", line.product_id)))?;
            let (on_hand, reserved, available) = self
                .ledger
                .inventory_for(line.product_id, warehouse_id)?
                .map_or((0, 0, 0), |row| {
                    (row.qty_on_hand(), row.qty_reserved(), row.available())
                });

            products.push(ProductStockInfo {
                product_id: line.product_id,
                product_code: product.code,
                product_name: product.name,
                po_line_quantity: line.quantity,
                current_qty_on_hand: on_hand,
                current_qty_reserved: reserved,
                current_available: available,
                will_be_sufficient: available >= line.quantity,
            });
        }

        Ok(StockAvailabilityForPO {
            order_id,
            warehouse_id,
            products,
        })
    }

    /// One inbound per line; on failure the lines already booked are reversed
    /// with negative adjustments.
    fn book_inbounds(
        &self,
        lines: &[PurchaseOrderLine],
        warehouse_id: WarehouseId,
        reference: &str,
    ) -> DomainResult<Vec<InventoryMovement>> {
        let mut movements = Vec::with_capacity(lines.len());
        for line in lines {
            let booked = self
                .ledger
                .track_stock(line.product_id, warehouse_id)
                .and_then(|_| {
                    self.ledger.record_inbound(
                        line.product_id,
                        warehouse_id,
                        line.quantity,
                        reference,
                        format!("Receipt of purchase order {}", line.order_id),
                    )
                });
            match booked {
                Ok(movement) => movements.push(movement),
                Err(err) => {
                    self.reverse_inbounds(&lines[..movements.len()], warehouse_id, reference);
                    return Err(err);
                }
            }
        }
        Ok(movements)
    }

    fn reverse_inbounds(
        &self,
        lines: &[PurchaseOrderLine],
        warehouse_id: WarehouseId,
        reference: &str,
    ) {
        for line in lines {
            if let Err(err) = self.ledger.record_adjustment(
                line.product_id,
                warehouse_id,
                -line.quantity,
                reference,
                format!("Reversal of receipt of purchase order {}", line.order_id),
            ) {
                warn!(product_id = %line.product_id, error = %err, "failed to reverse inbound");
            }
        }
    }

    fn load(&self, order_id: PurchaseOrderId) -> DomainResult<PurchaseOrder> {
        self.orders
            .find(&order_id)?
            .ok_or_else(|| DomainError::not_found(format!("purchase order {order_id}")))
    }
}

impl<P, I, C, D> PurchaseOrderLifecycle<P, I, C, D>
where
    P: PurchaseOrderStore,
    D: Directory,
{
    /// Persist a newly created order (owned by the plain order service).
    pub fn create_order(
        &self,
        order: PurchaseOrder,
        lines: Vec<PurchaseOrderLine>,
    ) -> DomainResult<PurchaseOrder> {
        if order.version() != 0 {
            return Err(DomainError::business("order has already been persisted"));
        }
        if self.directory.supplier(&order.supplier_id()).is_none() {
            return Err(DomainError::not_found(format!(
                "supplier {}",
                order.supplier_id()
            )));
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
        self.orders.save(order, Some(lines), ExpectedVersion::NoRow)
    }

    pub fn orders_for_supplier(&self, supplier_id: SupplierId) -> DomainResult<Vec<PurchaseOrder>> {
        self.orders.find_by_supplier(&supplier_id)
    }
}
