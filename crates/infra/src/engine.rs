//! Composition root: wires the in-memory adapters into the domain services.

use std::sync::Arc;

use logiflow_core::{Clock, SystemClock};
use logiflow_inventory::{ReservationEngine, StockLedger};
use logiflow_purchasing::PurchaseOrderLifecycle;
use logiflow_sales::SalesOrderLifecycle;
use logiflow_shipping::ShipmentLifecycle;

use crate::config::EngineConfig;
use crate::store::{
    InMemoryDirectory, InMemoryInventoryStore, InMemoryPurchaseOrderStore, InMemorySalesOrderStore,
    InMemoryShipmentStore,
};

pub type InventoryHandle = Arc<InMemoryInventoryStore>;
pub type Ledger<C> = StockLedger<InventoryHandle, C>;
pub type Reservations = ReservationEngine<InventoryHandle>;
pub type SalesLifecycle<C> = SalesOrderLifecycle<Arc<InMemorySalesOrderStore>, InventoryHandle, C>;
pub type PurchasingLifecycle<C> = PurchaseOrderLifecycle<
    Arc<InMemoryPurchaseOrderStore>,
    InventoryHandle,
    C,
    Arc<InMemoryDirectory>,
>;
pub type ShippingLifecycle<C> =
    ShipmentLifecycle<Arc<InMemoryShipmentStore>, C, Arc<InMemoryDirectory>>;

/// Every service shares the same inventory store, so ledger writes made by
/// one lifecycle are visible to the others immediately.
pub struct Engine<C> {
    directory: Arc<InMemoryDirectory>,
    inventory: InventoryHandle,
    ledger: Ledger<C>,
    reservations: Reservations,
    sales: SalesLifecycle<C>,
    purchasing: PurchasingLifecycle<C>,
    shipping: ShippingLifecycle<C>,
}

impl Engine<SystemClock> {
    pub fn with_system_clock(config: &EngineConfig) -> Self {
        Self::new(SystemClock, config)
    }
}

impl<C> Engine<C>
where
    C: Clock + Clone,
{
    pub fn new(clock: C, config: &EngineConfig) -> Self {
        let retries = config.max_conflict_retries;
        let directory = Arc::new(InMemoryDirectory::new());
        let inventory = Arc::new(InMemoryInventoryStore::new());

        let ledger = StockLedger::new(inventory.clone(), clock.clone())
            .with_max_conflict_retries(retries);
        let reservations =
            ReservationEngine::new(inventory.clone()).with_max_conflict_retries(retries);

        let sales = SalesOrderLifecycle::new(
            Arc::new(InMemorySalesOrderStore::new()),
            ledger.clone(),
            reservations.clone(),
            clock.clone(),
        );
        let purchasing = PurchaseOrderLifecycle::new(
            Arc::new(InMemoryPurchaseOrderStore::new()),
            ledger.clone(),
            directory.clone(),
            clock.clone(),
        );
        let shipping = ShipmentLifecycle::new(
            Arc::new(InMemoryShipmentStore::new()),
            clock,
            directory.clone(),
        );

        Self {
            directory,
            inventory,
            ledger,
            reservations,
            sales,
            purchasing,
            shipping,
        }
    }

    pub fn directory(&self) -> &InMemoryDirectory {
        &self.directory
    }

    pub fn inventory_store(&self) -> &InMemoryInventoryStore {
        &self.inventory
    }

    pub fn ledger(&self) -> &Ledger<C> {
        &self.ledger
    }

    pub fn reservations(&self) -> &Reservations {
        &self.reservations
    }

    pub fn sales(&self) -> &SalesLifecycle<C> {
        &self.sales
    }

    pub fn purchasing(&self) -> &PurchasingLifecycle<C> {
        &self.purchasing
    }

    pub fn shipping(&self) -> &ShippingLifecycle<C> {
        &self.shipping
    }
}
