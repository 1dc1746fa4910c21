//! Domain models for the Smart Inventory system

mod movement;
mod product;
mod replenishment;
mod report;
mod sale;
mod user;

pub use movement::*;
pub use product::*;
pub use replenishment::*;
pub use report::*;
pub use sale::*;
pub use user::*;
