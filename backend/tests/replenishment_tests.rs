//! Replenishment engine tests
//!
//! Property-based and unit tests for the forecast:
//! - Suggested quantity is the non-negative shortfall against forecast demand
//! - Nothing is drafted when stock covers the forecast
//! - Regeneration policies

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    average_daily_sales, draft_suggestion, forecast_demand, plan_generation, suggested_quantity,
    ForecastParams, OpenSuggestion, RegenerationPolicy, SalesVelocity, StockError,
    SuggestionAction, MAX_FORECAST_DAYS, MAX_LOOKBACK_DAYS, MAX_SAFETY_STOCK_FACTOR,
};
use uuid::Uuid;

// ============================================================================
// Test Helpers
// ============================================================================

fn velocity(sku: &str, current_stock: i32, units_sold: i64) -> SalesVelocity {
    SalesVelocity {
        sku: sku.to_string(),
        current_stock,
        units_sold,
    }
}

fn open(sku: &str) -> OpenSuggestion {
    OpenSuggestion {
        id: Uuid::new_v4(),
        sku: sku.to_string(),
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn params_strategy() -> impl Strategy<Value = ForecastParams> {
    (1i32..120, 1i32..60, 1i64..40).prop_map(|(lookback_days, forecast_days, tenths)| {
        ForecastParams {
            lookback_days,
            forecast_days,
            safety_stock_factor: Decimal::new(tenths, 1),
        }
    })
}

fn velocity_strategy() -> impl Strategy<Value = SalesVelocity> {
    ("[A-Z]{3}-[0-9]{3}", 0i32..500, 0i64..5_000).prop_map(|(sku, current_stock, units_sold)| {
        SalesVelocity {
            sku,
            current_stock,
            units_sold,
        }
    })
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A draft orders exactly max(0, forecast - stock) and never zero
        #[test]
        fn prop_draft_orders_shortfall(v in velocity_strategy(), params in params_strategy()) {
            let demand = forecast_demand(v.units_sold, &params).unwrap();
            let shortfall = (demand - Decimal::from(v.current_stock)).max(Decimal::ZERO);

            match draft_suggestion(&v, &params).unwrap() {
                Some(draft) => {
                    prop_assert!(draft.suggested_quantity > 0);
                    prop_assert_eq!(Decimal::from(draft.suggested_quantity), shortfall);
                    prop_assert_eq!(Decimal::from(draft.forecasted_demand), demand);
                    prop_assert_eq!(draft.current_stock, v.current_stock);
                }
                None => prop_assert_eq!(shortfall, Decimal::ZERO),
            }
        }

        /// The forecast is within half a unit of the exact product
        #[test]
        fn prop_forecast_rounds_to_nearest(sold in 0i64..5_000, params in params_strategy()) {
            let exact = Decimal::from(sold)
                * Decimal::from(params.forecast_days)
                * params.safety_stock_factor
                / Decimal::from(params.lookback_days);
            let forecast = forecast_demand(sold, &params).unwrap();

            prop_assert_eq!(forecast.fract(), Decimal::ZERO);
            prop_assert!((forecast - exact).abs() <= Decimal::new(5, 1));
        }

        /// Shortfall is never negative
        #[test]
        fn prop_suggested_quantity_non_negative(demand in 0i64..10_000, stock in 0i32..10_000) {
            let quantity = suggested_quantity(demand, stock);
            prop_assert!(quantity >= 0);
            prop_assert_eq!(quantity, (demand - i64::from(stock)).max(0));
        }

        /// The additive policy never supersedes anything
        #[test]
        fn prop_additive_keeps_open_suggestions(
            velocities in prop::collection::vec(velocity_strategy(), 0..10),
            params in params_strategy()
        ) {
            let existing: Vec<OpenSuggestion> = velocities.iter().map(|v| open(&v.sku)).collect();
            let plan = plan_generation(&velocities, &existing, &params, RegenerationPolicy::Additive)
                .unwrap();
            prop_assert!(plan.supersede.is_empty());
            prop_assert!(plan.drafts.iter().all(|d| d.suggested_quantity > 0));
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

mod unit_tests {
    use super::*;

    #[test]
    fn test_default_run_example() {
        // 60 sold over 30 days => 2/day; 7 days at 1.5 => 21; 5 in stock => 16
        let draft = draft_suggestion(&velocity("A", 5, 60), &ForecastParams::default())
            .unwrap()
            .unwrap();
        assert_eq!(draft.forecasted_demand, 21);
        assert_eq!(draft.current_stock, 5);
        assert_eq!(draft.suggested_quantity, 16);
    }

    #[test]
    fn test_no_sales_no_suggestion() {
        let params = ForecastParams::default();
        assert_eq!(draft_suggestion(&velocity("A", 0, 0), &params).unwrap(), None);
    }

    #[test]
    fn test_stock_covering_forecast_no_suggestion() {
        let params = ForecastParams::default();
        assert_eq!(draft_suggestion(&velocity("A", 21, 60), &params).unwrap(), None);
        assert_eq!(draft_suggestion(&velocity("A", 100, 60), &params).unwrap(), None);
    }

    #[test]
    fn test_average_daily_sales() {
        assert_eq!(average_daily_sales(60, 30), Decimal::from(2));
        assert_eq!(average_daily_sales(10, 0), Decimal::ZERO);
    }

    #[test]
    fn test_supersede_scans_every_scanned_product() {
        let velocities = vec![velocity("A", 5, 60), velocity("B", 100, 60)];
        let stale_a = open("A");
        let stale_b = open("B");
        let unscanned = open("RETIRED");

        let plan = plan_generation(
            &velocities,
            &[stale_a.clone(), stale_b.clone(), unscanned.clone()],
            &ForecastParams::default(),
            RegenerationPolicy::SupersedeUnacted,
        )
        .unwrap();

        // B gets no new suggestion but its stale one is still removed
        assert_eq!(plan.supersede, vec![stale_a.id, stale_b.id]);
        assert!(!plan.supersede.contains(&unscanned.id));
        assert_eq!(plan.drafts.len(), 1);
        assert_eq!(plan.drafts[0].sku, "A");
    }

    #[test]
    fn test_additive_allows_multiple_live_suggestions() {
        let velocities = vec![velocity("A", 5, 60)];
        let plan = plan_generation(
            &velocities,
            &[open("A")],
            &ForecastParams::default(),
            RegenerationPolicy::Additive,
        )
        .unwrap();
        assert!(plan.supersede.is_empty());
        assert_eq!(plan.drafts.len(), 1);
    }

    #[test]
    fn test_invalid_params() {
        let mut params = ForecastParams::default();
        params.lookback_days = 0;
        assert_eq!(params.validate().unwrap_err().0, "lookback_days");

        let mut params = ForecastParams::default();
        params.forecast_days = 0;
        assert_eq!(params.validate().unwrap_err().0, "forecast_days");

        let mut params = ForecastParams::default();
        params.safety_stock_factor = Decimal::ZERO;
        assert_eq!(params.validate().unwrap_err().0, "safety_stock_factor");
    }

    #[test]
    fn test_params_upper_bounds() {
        let mut params = ForecastParams::default();
        params.lookback_days = MAX_LOOKBACK_DAYS + 1;
        assert_eq!(params.validate().unwrap_err().0, "lookback_days");

        let mut params = ForecastParams::default();
        params.forecast_days = 2_000_000_000;
        assert_eq!(params.validate().unwrap_err().0, "forecast_days");

        let mut params = ForecastParams::default();
        params.safety_stock_factor = Decimal::from_i128_with_scale(10i128.pow(20), 0);
        assert_eq!(params.validate().unwrap_err().0, "safety_stock_factor");

        let params = ForecastParams {
            lookback_days: MAX_LOOKBACK_DAYS,
            forecast_days: MAX_FORECAST_DAYS,
            safety_stock_factor: MAX_SAFETY_STOCK_FACTOR,
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_extreme_params_overflow_is_an_error() {
        let params = ForecastParams {
            lookback_days: 1,
            forecast_days: 2_000_000_000,
            safety_stock_factor: Decimal::from_i128_with_scale(10i128.pow(20), 0),
        };
        assert_eq!(forecast_demand(1, &params), None);
        assert_eq!(
            draft_suggestion(&velocity("A", 0, 1), &params),
            Err(StockError::QuantityOverflow("A".to_string()))
        );
    }

    #[test]
    fn test_largest_valid_params_do_not_overflow() {
        let params = ForecastParams {
            lookback_days: 1,
            forecast_days: MAX_FORECAST_DAYS,
            safety_stock_factor: MAX_SAFETY_STOCK_FACTOR,
        };
        assert!(forecast_demand(i64::MAX, &params).is_some());
        assert_eq!(
            draft_suggestion(&velocity("A", 0, i64::MAX), &params),
            Err(StockError::QuantityOverflow("A".to_string()))
        );
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("accept".parse::<SuggestionAction>(), Ok(SuggestionAction::Accept));
        assert_eq!("ignore".parse::<SuggestionAction>(), Ok(SuggestionAction::Ignore));
        assert!("approve".parse::<SuggestionAction>().is_err());
    }

    #[test]
    fn test_default_policy_is_additive() {
        assert_eq!(RegenerationPolicy::default(), RegenerationPolicy::Additive);
    }
}
