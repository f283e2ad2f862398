use std::collections::HashMap;
use std::sync::RwLock;

use logiflow_core::{
    CarrierId, CarrierRef, Directory, DomainResult, ProductId, ProductRef, SupplierId,
    SupplierRef, WarehouseId, WarehouseRef,
};

use super::poisoned;

#[derive(Debug, Default)]
struct DirectoryTables {
    products: HashMap<ProductId, ProductRef>,
    warehouses: HashMap<WarehouseId, WarehouseRef>,
    suppliers: HashMap<SupplierId, SupplierRef>,
    carriers: HashMap<CarrierId, CarrierRef>,
}

/// Reference data seeded by the caller; stands in for the CRUD services.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    tables: RwLock<DirectoryTables>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(
        &self,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> DomainResult<ProductId> {
        let id = ProductId::new();
        let mut tables = self.tables.write().map_err(|_| poisoned("directory"))?;
        tables.products.insert(
            id,
            ProductRef {
                id,
                code: code.into(),
                name: name.into(),
            },
        );
        Ok(id)
    }

    pub fn add_warehouse(&self, name: impl Into<String>) -> DomainResult<WarehouseId> {
        let id = WarehouseId::new();
        let mut tables = self.tables.write().map_err(|_| poisoned("directory"))?;
        tables.warehouses.insert(
            id,
            WarehouseRef {
                id,
                name: name.into(),
            },
        );
        Ok(id)
    }

    pub fn add_supplier(&self, name: impl Into<String>) -> DomainResult<SupplierId> {
        let id = SupplierId::new();
        let mut tables = self.tables.write().map_err(|_| poisoned("directory"))?;
        tables.suppliers.insert(
            id,
            SupplierRef {
                id,
                name: name.into(),
            },
        );
        Ok(id)
    }

    pub fn add_carrier(&self, name: impl Into<String>) -> DomainResult<CarrierId> {
        let id = CarrierId::new();
        let mut tables = self.tables.write().map_err(|_| poisoned("directory"))?;
        tables.carriers.insert(
            id,
            CarrierRef {
                id,
                name: name.into(),
            },
        );
        Ok(id)
    }
}

impl Directory for InMemoryDirectory {
    fn product(&self, id: &ProductId) -> Option<ProductRef> {
        self.tables.read().ok()?.products.get(id).cloned()
    }

    fn warehouse(&self, id: &WarehouseId) -> Option<WarehouseRef> {
        self.tables.read().ok()?.warehouses.get(id).cloned()
    }

    fn supplier(&self, id: &SupplierId) -> Option<SupplierRef> {
        self.tables.read().ok()?.suppliers.get(id).cloned()
    }

    fn carrier(&self, id: &CarrierId) -> Option<CarrierRef> {
        self.tables.read().ok()?.carriers.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_entries_are_visible_through_the_directory() {
        let directory = InMemoryDirectory::new();
        let product = directory.add_product("BLT-01", "Bolts").unwrap();
        let warehouse = directory.add_warehouse("Central").unwrap();

        assert_eq!(directory.product(&product).unwrap().code, "BLT-01");
        assert!(directory.warehouse_exists(&warehouse));
        assert!(!directory.warehouse_exists(&WarehouseId::new()));
        assert!(directory.carrier(&CarrierId::new()).is_none());
    }

    #[test]
    fn poisoned_lock_is_reported_instead_of_returning_an_unstored_id() {
        let directory = InMemoryDirectory::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = directory.tables.write().unwrap();
            panic!("writer panicked");
        }));

        let err = directory.add_supplier("Acme").unwrap_err();
        assert!(err.is_conflict());
    }
}
