use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use logiflow_core::{AggregateRoot, CarrierId, DomainError, DomainResult, ShipmentId};

/// Shipment status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Planned,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Planned => "PLANNED",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::Cancelled => "CANCELLED",
        }
    }

    /// Statuses reachable in one step from `self`.
    pub fn allowed_transitions(&self) -> &'static [ShipmentStatus] {
        match self {
            ShipmentStatus::Planned => &[ShipmentStatus::InTransit, ShipmentStatus::Cancelled],
            ShipmentStatus::InTransit => &[ShipmentStatus::Delivered],
            ShipmentStatus::Delivered | ShipmentStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: ShipmentStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

/// Aggregate root: Shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    id: ShipmentId,
    tracking_number: String,
    carrier_id: CarrierId,
    status: ShipmentStatus,
    planned_date: Option<DateTime<Utc>>,
    shipped_date: Option<DateTime<Utc>>,
    delivered_date: Option<DateTime<Utc>>,
    description: String,
    version: u64,
}

impl Shipment {
    /// A new shipment in `PLANNED` status.
    pub fn planned(
        id: ShipmentId,
        tracking_number: impl Into<String>,
        carrier_id: CarrierId,
        planned_date: Option<DateTime<Utc>>,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        let tracking_number = tracking_number.into().trim().to_string();
        if tracking_number.is_empty() {
            return Err(DomainError::validation("tracking number cannot be empty"));
        }
        Ok(Self {
            id,
            tracking_number,
            carrier_id,
            status: ShipmentStatus::Planned,
            planned_date,
            shipped_date: None,
            delivered_date: None,
            description: description.into(),
            version: 0,
        })
    }

    pub fn id_typed(&self) -> ShipmentId {
        self.id
    }

    pub fn tracking_number(&self) -> &str {
        &self.tracking_number
    }

    pub fn carrier_id(&self) -> CarrierId {
        self.carrier_id
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn planned_date(&self) -> Option<DateTime<Utc>> {
        self.planned_date
    }

    pub fn shipped_date(&self) -> Option<DateTime<Utc>> {
        self.shipped_date
    }

    pub fn delivered_date(&self) -> Option<DateTime<Utc>> {
        self.delivered_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Stamp the row version assigned by the storage adapter on commit.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Apply a status change from the transition table.
    ///
    /// `IN_TRANSIT` stamps `shipped_date`, `DELIVERED` stamps `delivered_date`.
    pub fn transition_to(&mut self, next: ShipmentStatus, at: DateTime<Utc>) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::business(format!(
                "invalid shipment status transition {} -> {}",
                self.status.as_str(),
                next.as_str()
            )));
        }
        match next {
            ShipmentStatus::InTransit => self.shipped_date = Some(at),
            ShipmentStatus::Delivered => self.delivered_date = Some(at),
            ShipmentStatus::Planned | ShipmentStatus::Cancelled => {}
        }
        self.status = next;
        Ok(())
    }
}

impl AggregateRoot for Shipment {
    type Id = ShipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ShipmentStatus; 4] = [
        ShipmentStatus::Planned,
        ShipmentStatus::InTransit,
        ShipmentStatus::Delivered,
        ShipmentStatus::Cancelled,
    ];

    fn test_shipment() -> Shipment {
        Shipment::planned(
            ShipmentId::new(),
            "TRK-001",
            CarrierId::new(),
            None,
            "pallets",
        )
        .unwrap()
    }

    #[test]
    fn transition_table_is_exactly_three_edges() {
        let mut allowed = Vec::new();
        for from in ALL {
            for to in ALL {
                if from.can_transition_to(to) {
                    allowed.push((from, to));
                }
            }
        }
        assert_eq!(
            allowed,
            vec![
                (ShipmentStatus::Planned, ShipmentStatus::InTransit),
                (ShipmentStatus::Planned, ShipmentStatus::Cancelled),
                (ShipmentStatus::InTransit, ShipmentStatus::Delivered),
            ]
        );
    }

    #[test]
    fn in_transit_then_delivered_stamps_dates() {
        let mut shipment = test_shipment();
        let shipped = Utc::now();
        shipment
            .transition_to(ShipmentStatus::InTransit, shipped)
            .unwrap();
        assert_eq!(shipment.shipped_date(), Some(shipped));
        assert_eq!(shipment.delivered_date(), None);

        let delivered = Utc::now();
        shipment
            .transition_to(ShipmentStatus::Delivered, delivered)
            .unwrap();
        assert_eq!(shipment.status(), ShipmentStatus::Delivered);
        assert_eq!(shipment.delivered_date(), Some(delivered));
    }

    #[test]
    fn planned_to_delivered_is_rejected_without_changes() {
        let mut shipment = test_shipment();
        let before = shipment.clone();
        let err = shipment
            .transition_to(ShipmentStatus::Delivered, Utc::now())
            .unwrap_err();
        match err {
            DomainError::Business(msg) if msg.contains("PLANNED -> DELIVERED") => {}
            other => panic!("expected Business error, got {other:?}"),
        }
        assert_eq!(shipment, before);
    }

    #[test]
    fn blank_tracking_number_is_rejected() {
        let err =
            Shipment::planned(ShipmentId::new(), "   ", CarrierId::new(), None, "").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
