//! Purchasing domain module (Purchase Orders).
//!
//! Receiving a purchase order books inbound movements through the inventory
//! crate's stock ledger.

pub mod lifecycle;
pub mod order;
pub mod store;

pub use lifecycle::{
    ApprovalResult, CancellationResult, LineReceptionStatus, ProductStockInfo,
    PurchaseOrderLifecycle, ReceiptResult, ReceptionStatus, StockAvailabilityForPO,
};
pub use order::{PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus};
pub use store::PurchaseOrderStore;
