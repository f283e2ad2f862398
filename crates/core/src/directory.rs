//! Read-only reference data owned by the plain CRUD services.
//!
//! The engine only needs existence checks and display fields for products,
//! warehouses, suppliers and carriers; it never mutates them.

use serde::{Deserialize, Serialize};

use crate::id::{CarrierId, ProductId, SupplierId, WarehouseId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseRef {
    pub id: WarehouseId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRef {
    pub id: SupplierId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierRef {
    pub id: CarrierId,
    pub name: String,
}

/// Lookup contract for reference entities.
pub trait Directory: Send + Sync {
    fn product(&self, id: &ProductId) -> Option<ProductRef>;
    fn warehouse(&self, id: &WarehouseId) -> Option<WarehouseRef>;
    fn supplier(&self, id: &SupplierId) -> Option<SupplierRef>;
    fn carrier(&self, id: &CarrierId) -> Option<CarrierRef>;

    fn warehouse_exists(&self, id: &WarehouseId) -> bool {
        self.warehouse(id).is_some()
    }
}

impl<D> Directory for std::sync::Arc<D>
where
    D: Directory + ?Sized,
{
    fn product(&self, id: &ProductId) -> Option<ProductRef> {
        (**self).product(id)
    }

    fn warehouse(&self, id: &WarehouseId) -> Option<WarehouseRef> {
        (**self).warehouse(id)
    }

    fn supplier(&self, id: &SupplierId) -> Option<SupplierRef> {
        (**self).supplier(id)
    }

    fn carrier(&self, id: &CarrierId) -> Option<CarrierRef> {
        (**self).carrier(id)
    }

    fn warehouse_exists(&self, id: &WarehouseId) -> bool {
        (**self).warehouse_exists(id)
    }
}
