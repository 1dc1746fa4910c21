//! Replenishment forecasting models and policy

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StockError;

/// Longest sales history a run may look back over
pub const MAX_LOOKBACK_DAYS: i32 = 3650;

/// Longest horizon a run may forecast
pub const MAX_FORECAST_DAYS: i32 = 365;

pub const MAX_SAFETY_STOCK_FACTOR: Decimal = Decimal::TEN;

/// Parameters of one generation run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastParams {
    pub lookback_days: i32,
    pub forecast_days: i32,
    pub safety_stock_factor: Decimal,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            forecast_days: 7,
            safety_stock_factor: Decimal::new(15, 1),
        }
    }
}

impl ForecastParams {
    pub fn validate(&self) -> Result<(), (&'static str, &'static str)> {
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(("lookback_days", "Lookback window must be between 1 and 3650 days"));
        }
        if !(1..=MAX_FORECAST_DAYS).contains(&self.forecast_days) {
            return Err(("forecast_days", "Forecast horizon must be between 1 and 365 days"));
        }
        if self.safety_stock_factor <= Decimal::ZERO
            || self.safety_stock_factor > MAX_SAFETY_STOCK_FACTOR
        {
            return Err((
                "safety_stock_factor",
                "Safety stock factor must be greater than 0 and at most 10",
            ));
        }
        Ok(())
    }
}

/// What a new run does with suggestions that nobody acted on yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenerationPolicy {
    /// Keep them; a product may carry several live suggestions
    #[default]
    Additive,
    /// Remove unacted suggestions for every product the run scanned
    SupersedeUnacted,
}

/// Sales velocity input for one active product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesVelocity {
    pub sku: String,
    pub current_stock: i32,
    /// Units sold (movement type `sale`) inside the lookback window
    pub units_sold: i64,
}

/// A suggestion computed by a run, before it is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionDraft {
    pub sku: String,
    pub forecasted_demand: i32,
    pub current_stock: i32,
    pub suggested_quantity: i32,
}

/// Writes a run performs, in order: deletions then inserts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationPlan {
    pub supersede: Vec<Uuid>,
    pub drafts: Vec<SuggestionDraft>,
}

/// An unacted suggestion already in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSuggestion {
    pub id: Uuid,
    pub sku: String,
}

/// Persisted replenishment suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplenishmentSuggestion {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub product_sku: String,
    pub product_name: Option<String>,
    pub product_barcode: Option<String>,
    pub forecasted_demand: i32,
    pub current_stock: i32,
    pub suggested_quantity: i32,
    pub date_generated: DateTime<Utc>,
    pub is_acted_upon: bool,
    pub acted_upon_at: Option<DateTime<Utc>>,
}

/// User decision on a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionAction {
    Accept,
    Ignore,
}

impl FromStr for SuggestionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(SuggestionAction::Accept),
            "ignore" => Ok(SuggestionAction::Ignore),
            _ => Err("Action must be 'accept' or 'ignore'".to_string()),
        }
    }
}

impl fmt::Display for SuggestionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionAction::Accept => f.write_str("accept"),
            SuggestionAction::Ignore => f.write_str("ignore"),
        }
    }
}

pub fn average_daily_sales(units_sold: i64, lookback_days: i32) -> Decimal {
    if lookback_days <= 0 {
        return Decimal::ZERO;
    }
    Decimal::from(units_sold) / Decimal::from(lookback_days)
}

/// `round(avg_daily_sales * forecast_days * safety_stock_factor)`, half away from zero.
/// The division by the window is done last so exact midpoints stay exact.
/// `None` when the result overflows a `Decimal`.
pub fn forecast_demand(units_sold: i64, params: &ForecastParams) -> Option<Decimal> {
    if params.lookback_days <= 0 {
        return Some(Decimal::ZERO);
    }
    Decimal::from(units_sold)
        .checked_mul(Decimal::from(params.forecast_days))?
        .checked_mul(params.safety_stock_factor)?
        .checked_div(Decimal::from(params.lookback_days))
        .map(|demand| demand.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

pub fn suggested_quantity(forecasted_demand: i64, current_stock: i32) -> i64 {
    (forecasted_demand - i64::from(current_stock)).max(0)
}

/// Compute a product's suggestion; `None` when nothing needs ordering
pub fn draft_suggestion(
    velocity: &SalesVelocity,
    params: &ForecastParams,
) -> Result<Option<SuggestionDraft>, StockError> {
    let overflow = || StockError::QuantityOverflow(velocity.sku.clone());

    let demand = forecast_demand(velocity.units_sold, params)
        .and_then(|d| d.to_i64())
        .ok_or_else(overflow)?;
    let quantity = suggested_quantity(demand, velocity.current_stock);
    if quantity == 0 {
        return Ok(None);
    }

    Ok(Some(SuggestionDraft {
        sku: velocity.sku.clone(),
        forecasted_demand: i32::try_from(demand).map_err(|_| overflow())?,
        current_stock: velocity.current_stock,
        suggested_quantity: i32::try_from(quantity).map_err(|_| overflow())?,
    }))
}

/// Plan a full generation run over the scanned products
pub fn plan_generation(
    velocities: &[SalesVelocity],
    open: &[OpenSuggestion],
    params: &ForecastParams,
    policy: RegenerationPolicy,
) -> Result<GenerationPlan, StockError> {
    let drafts = velocities
        .iter()
        .map(|v| draft_suggestion(v, params))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect();

    let supersede = match policy {
        RegenerationPolicy::Additive => Vec::new(),
        RegenerationPolicy::SupersedeUnacted => {
            let scanned: HashSet<&str> = velocities.iter().map(|v| v.sku.as_str()).collect();
            open.iter()
                .filter(|s| scanned.contains(s.sku.as_str()))
                .map(|s| s.id)
                .collect()
        }
    };

    Ok(GenerationPlan { supersede, drafts })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn velocity(sku: &str, stock: i32, sold: i64) -> SalesVelocity {
        SalesVelocity {
            sku: sku.to_string(),
            current_stock: stock,
            units_sold: sold,
        }
    }

    #[test]
    fn default_params() {
        let params = ForecastParams::default();
        assert_eq!(params.lookback_days, 30);
        assert_eq!(params.forecast_days, 7);
        assert_eq!(params.safety_stock_factor, Decimal::new(15, 1));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn forecast_rounds_half_away_from_zero() {
        // 30 sold over 30 days, 7 day horizon, factor 1.5 => 10.5 => 11
        assert_eq!(
            forecast_demand(30, &ForecastParams::default()),
            Some(Decimal::from(11))
        );
        // 10 sold => 3.5 => 4
        assert_eq!(
            forecast_demand(10, &ForecastParams::default()),
            Some(Decimal::from(4))
        );
    }

    #[test]
    fn no_draft_when_stock_covers_demand() {
        let params = ForecastParams::default();
        assert_eq!(draft_suggestion(&velocity("A", 11, 30), &params).unwrap(), None);
        assert_eq!(draft_suggestion(&velocity("A", 0, 0), &params).unwrap(), None);
    }

    #[test]
    fn draft_orders_the_shortfall() {
        let draft = draft_suggestion(&velocity("A", 4, 30), &ForecastParams::default())
            .unwrap()
            .unwrap();
        assert_eq!(draft.forecasted_demand, 11);
        assert_eq!(draft.suggested_quantity, 7);
    }

    #[test]
    fn params_upper_bounds() {
        let mut params = ForecastParams::default();
        params.lookback_days = MAX_LOOKBACK_DAYS;
        params.forecast_days = MAX_FORECAST_DAYS;
        params.safety_stock_factor = MAX_SAFETY_STOCK_FACTOR;
        assert!(params.validate().is_ok());

        params.forecast_days = 2_000_000_000;
        assert_eq!(params.validate().unwrap_err().0, "forecast_days");
    }

    #[test]
    fn action_parsing() {
        assert_eq!("accept".parse::<SuggestionAction>().unwrap(), SuggestionAction::Accept);
        assert!("delete".parse::<SuggestionAction>().is_err());
    }
}
