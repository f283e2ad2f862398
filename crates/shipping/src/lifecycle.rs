use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use logiflow_core::{
    CarrierId, Clock, Directory, DomainError, DomainResult, ExpectedVersion, ShipmentId,
};

use crate::shipment::{Shipment, ShipmentStatus};
use crate::store::ShipmentStore;

/// Read-only tracking projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentTracking {
    pub tracking_number: String,
    /// `None` when the carrier is no longer in the directory.
    pub carrier_name: Option<String>,
    pub status: ShipmentStatus,
    pub planned_date: Option<DateTime<Utc>>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateResult {
    pub shipment_id: ShipmentId,
    pub tracking_number: String,
    pub previous_status: ShipmentStatus,
    pub new_status: ShipmentStatus,
    pub updated_at: DateTime<Utc>,
}

pub struct ShipmentLifecycle<S, C, D> {
    shipments: S,
    clock: C,
    directory: D,
}

impl<S, C, D> ShipmentLifecycle<S, C, D> {
    pub fn new(shipments: S, clock: C, directory: D) -> Self {
        Self {
            shipments,
            clock,
            directory,
        }
    }
}

impl<S, C, D> ShipmentLifecycle<S, C, D>
where
    S: ShipmentStore,
    C: Clock,
    D: Directory,
{
    /// Register a new `PLANNED` shipment; tracking numbers are unique.
    #[instrument(skip(self, description))]
    pub fn register_shipment(
        &self,
        tracking_number: &str,
        carrier_id: CarrierId,
        planned_date: Option<DateTime<Utc>>,
        description: &str,
    ) -> DomainResult<Shipment> {
        if self.directory.carrier(&carrier_id).is_none() {
            return Err(DomainError::not_found(format!("carrier {carrier_id}")));
        }
        let shipment = Shipment::planned(
            ShipmentId::new(),
            tracking_number,
            carrier_id,
            planned_date,
            description,
        )?;
        if self
            .shipments
            .find_by_tracking_number(shipment.tracking_number())?
            .is_some()
        {
            return Err(DomainError::duplicate(format!(
                "tracking number {} already exists",
                shipment.tracking_number()
            )));
        }

        let saved = self.shipments.save(shipment, ExpectedVersion::NoRow)?;
        info!(shipment_id = %saved.id_typed(), "shipment registered");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub fn update_status(
        &self,
        shipment_id: ShipmentId,
        new_status: ShipmentStatus,
    ) -> DomainResult<StatusUpdateResult> {
        let mut shipment = self
            .shipments
            .find(&shipment_id)?
            .ok_or_else(|| DomainError::not_found(format!("shipment {shipment_id}")))?;
        let expected = ExpectedVersion::of(&shipment);
        let previous_status = shipment.status();
        let now = self.clock.now();

        shipment.transition_to(new_status, now)?;
        let saved = self.shipments.save(shipment, expected)?;

        info!(
            from = previous_status.as_str(),
            to = new_status.as_str(),
            "shipment status updated"
        );
        Ok(StatusUpdateResult {
            shipment_id,
            tracking_number: saved.tracking_number().to_string(),
            previous_status,
            new_status: saved.status(),
            updated_at: now,
        })
    }

    pub fn track_shipment(&self, tracking_number: &str) -> DomainResult<ShipmentTracking> {
        let shipment = self
            .shipments
            .find_by_tracking_number(tracking_number)?
            .ok_or_else(|| {
                DomainError::not_found(format!("shipment with tracking number {tracking_number}"))
            })?;
        let carrier_name = self
            .directory
            .carrier(&shipment.carrier_id())
            .map(|c| c.name);

        Ok(ShipmentTracking {
            tracking_number: shipment.tracking_number().to_string(),
            carrier_name,
            status: shipment.status(),
            planned_date: shipment.planned_date(),
            shipped_date: shipment.shipped_date(),
            delivered_date: shipment.delivered_date(),
        })
    }
}
