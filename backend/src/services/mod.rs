//! Business logic services for the Smart Inventory server

pub mod auth;
pub mod catalog;
pub mod inventory;
pub mod ledger;
pub mod replenishment;
pub mod reporting;
pub mod sale;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use inventory::InventoryService;
pub use ledger::LedgerService;
pub use replenishment::ReplenishmentService;
pub use reporting::ReportingService;
pub use sale::SaleService;
