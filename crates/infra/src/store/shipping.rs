use std::collections::HashMap;
use std::sync::RwLock;

use logiflow_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion, ShipmentId};
use logiflow_shipping::{Shipment, ShipmentStore};

use super::{next_version, poisoned};

#[derive(Debug, Default)]
struct ShipmentTables {
    shipments: HashMap<ShipmentId, Shipment>,
    by_tracking_number: HashMap<String, ShipmentId>,
}

/// Shipments with a unique index on tracking number.
#[derive(Debug, Default)]
pub struct InMemoryShipmentStore {
    tables: RwLock<ShipmentTables>,
}

impl InMemoryShipmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShipmentStore for InMemoryShipmentStore {
    fn find(&self, id: &ShipmentId) -> DomainResult<Option<Shipment>> {
        let tables = self.tables.read().map_err(|_| poisoned("shipment"))?;
        Ok(tables.shipments.get(id).cloned())
    }

    fn find_by_tracking_number(&self, tracking_number: &str) -> DomainResult<Option<Shipment>> {
        let tables = self.tables.read().map_err(|_| poisoned("shipment"))?;
        Ok(tables
            .by_tracking_number
            .get(tracking_number)
            .and_then(|id| tables.shipments.get(id))
            .cloned())
    }

    fn save(&self, shipment: Shipment, expected: ExpectedVersion) -> DomainResult<Shipment> {
        let mut tables = self.tables.write().map_err(|_| poisoned("shipment"))?;
        let id = shipment.id_typed();

        if let Some(owner) = tables.by_tracking_number.get(shipment.tracking_number()) {
            if *owner != id {
                return Err(DomainError::duplicate(format!(
                    "tracking number {} already exists",
                    shipment.tracking_number()
                )));
            }
        }

        let current = tables.shipments.get(&id).map(|s| s.version());
        let version = next_version(expected, current)?;
        let saved = shipment.with_version(version);

        // Tracking numbers are immutable once assigned.
        tables
            .by_tracking_number
            .retain(|_, owner| *owner != id);
        tables
            .by_tracking_number
            .insert(saved.tracking_number().to_string(), id);
        tables.shipments.insert(id, saved.clone());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use logiflow_core::CarrierId;

    use super::*;

    fn planned(tracking: &str) -> Shipment {
        Shipment::planned(ShipmentId::new(), tracking, CarrierId::new(), None, "").unwrap()
    }

    #[test]
    fn tracking_number_index_is_unique() {
        let store = InMemoryShipmentStore::new();
        let first = store.save(planned("TRK-1"), ExpectedVersion::NoRow).unwrap();

        let err = store
            .save(planned("TRK-1"), ExpectedVersion::NoRow)
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate(_)));

        let found = store.find_by_tracking_number("TRK-1").unwrap().unwrap();
        assert_eq!(found.id_typed(), first.id_typed());
        assert!(store.find_by_tracking_number("TRK-2").unwrap().is_none());
    }

    #[test]
    fn resaving_the_same_shipment_keeps_its_tracking_number() {
        let store = InMemoryShipmentStore::new();
        let saved = store.save(planned("TRK-9"), ExpectedVersion::NoRow).unwrap();
        let resaved = store
            .save(saved.clone(), ExpectedVersion::of(&saved))
            .unwrap();
        assert_eq!(resaved.version(), 2);
        assert!(store.find_by_tracking_number("TRK-9").unwrap().is_some());
    }
}
