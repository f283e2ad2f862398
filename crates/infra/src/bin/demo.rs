//! Walks one purchase order and one sales order through the in-memory engine
//! and prints the resulting stock position.

use anyhow::Context;
use tracing::info;

use logiflow_core::{ClientId, PurchaseOrderId, SalesOrderId, UserId};
use logiflow_infra::{Engine, EngineConfig};
use logiflow_purchasing::{PurchaseOrder, PurchaseOrderLine};
use logiflow_sales::{SalesOrder, SalesOrderLine};
use logiflow_shipping::ShipmentStatus;

fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env()?;
    logiflow_observability::init_with_filter(&config.default_log_filter);

    let engine = Engine::with_system_clock(&config);
    let now = chrono::Utc::now();

    let directory = engine.directory();
    let warehouse = directory.add_warehouse("Central")?;
    let product = directory.add_product("WID-01", "Widget")?;
    let supplier = directory.add_supplier("Acme Supplies")?;
    let carrier = directory.add_carrier("FastFreight")?;

    let po = PurchaseOrder::new(PurchaseOrderId::new(), supplier, UserId::new(), now, None);
    let po_id = po.id_typed();
    engine
        .purchasing()
        .create_order(po, vec![PurchaseOrderLine::new(po_id, product, 40, 350)])?;
    engine.purchasing().approve_purchase_order(po_id)?;
    engine
        .purchasing()
        .receive_full_order(po_id, warehouse)
        .context("receiving purchase order")?;

    let so = SalesOrder::new(SalesOrderId::new(), ClientId::new(), now);
    let so_id = so.id_typed();
    engine
        .sales()
        .create_order(so, vec![SalesOrderLine::new(so_id, product, 15, 900)])?;
    let reservation = engine.sales().reserve_order(so_id, warehouse)?;
    info!(fully_reserved = reservation.fully_reserved, "reservation done");
    engine.sales().ship_order(so_id, warehouse)?;

    let shipment = engine
        .shipping()
        .register_shipment(&format!("TRK-{so_id}"), carrier, Some(now), "demo order")?;
    engine
        .shipping()
        .update_status(shipment.id_typed(), ShipmentStatus::InTransit)?;
    engine.sales().deliver_order(so_id)?;

    let row = engine
        .ledger()
        .inventory_for(product, warehouse)?
        .context("widget stock is tracked")?;
    let summary = serde_json::json!({
        "product": product.to_string(),
        "warehouse": warehouse.to_string(),
        "qty_on_hand": row.qty_on_hand(),
        "qty_reserved": row.qty_reserved(),
        "available": row.available(),
        "movements": engine.ledger().movements(row.id_typed())?.len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
