//! Shared types and domain rules for the Smart Inventory system
//!
//! This crate holds the inventory model and the pure rules that keep the
//! stock ledger consistent: movement arithmetic, sale planning and the
//! replenishment forecast. The backend wraps these in database transactions.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
