//! Persistence contract for shipments.

use logiflow_core::{DomainResult, ExpectedVersion, ShipmentId};

use crate::shipment::Shipment;

pub trait ShipmentStore: Send + Sync {
    fn find(&self, id: &ShipmentId) -> DomainResult<Option<Shipment>>;

    fn find_by_tracking_number(&self, tracking_number: &str) -> DomainResult<Option<Shipment>>;

    /// Insert or update a shipment.
    ///
    /// Fails with `Duplicate` when another shipment already uses the tracking
    /// number, and with `Conflict` when the version check fails.
    fn save(&self, shipment: Shipment, expected: ExpectedVersion) -> DomainResult<Shipment>;
}

impl<S> ShipmentStore for std::sync::Arc<S>
where
    S: ShipmentStore + ?Sized,
{
    fn find(&self, id: &ShipmentId) -> DomainResult<Option<Shipment>> {
        (**self).find(id)
    }

    fn find_by_tracking_number(&self, tracking_number: &str) -> DomainResult<Option<Shipment>> {
        (**self).find_by_tracking_number(tracking_number)
    }

    fn save(&self, shipment: Shipment, expected: ExpectedVersion) -> DomainResult<Shipment> {
        (**self).save(shipment, expected)
    }
}
