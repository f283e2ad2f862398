//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_id!(
    /// Catalog product.
    ProductId,
    "ProductId"
);
uuid_id!(
    /// Physical stock location.
    WarehouseId,
    "WarehouseId"
);
uuid_id!(SupplierId, "SupplierId");
uuid_id!(CarrierId, "CarrierId");
uuid_id!(
    /// Customer placing sales orders.
    ClientId,
    "ClientId"
);
uuid_id!(
    /// Staff member (e.g. the warehouse manager responsible for a PO).
    UserId,
    "UserId"
);
uuid_id!(
    /// One `Inventory` row: stock of a product in a warehouse.
    InventoryId,
    "InventoryId"
);
uuid_id!(MovementId, "MovementId");
uuid_id!(SalesOrderId, "SalesOrderId");
uuid_id!(SalesOrderLineId, "SalesOrderLineId");
uuid_id!(PurchaseOrderId, "PurchaseOrderId");
uuid_id!(PurchaseOrderLineId, "PurchaseOrderLineId");
uuid_id!(ShipmentId, "ShipmentId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        let id = WarehouseId::new();
        let parsed: WarehouseId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_failure_names_the_id_type() {
        let err = "not-a-uuid".parse::<ProductId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) if msg.starts_with("ProductId") => {}
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }
}
