//! HTTP handlers for the Smart Inventory API

pub mod auth;
pub mod health;
pub mod inventory;
pub mod products;
pub mod replenishment;
pub mod reporting;
pub mod sales;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

pub use auth::*;
pub use health::*;
pub use inventory::*;
pub use products::*;
pub use replenishment::*;
pub use reporting::*;
pub use sales::*;

/// `?transaction_date=YYYY-MM-DD`, defaulting to today (UTC)
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub transaction_date: Option<NaiveDate>,
}

impl DateQuery {
    pub fn date_or_today(&self) -> NaiveDate {
        self.transaction_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}
