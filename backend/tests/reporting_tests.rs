//! Reporting and dashboard tests
//!
//! Unit and property tests for the read-only projections:
//! - Low-stock alert messages and stock status labels
//! - Potential revenue
//! - Empty daily summaries

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    low_stock_message, potential_revenue, DailySalesSummary, LowStockAlert, ProductPerformance,
    StockLevel, StockStatus,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn threshold_strategy() -> impl Strategy<Value = i32> {
    0i32..100
}

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Status is out of stock at zero, low at or below threshold, OK above
        #[test]
        fn prop_status_partitions_quantities(quantity in 0i32..200, threshold in threshold_strategy()) {
            let status = StockStatus::classify(quantity, threshold);
            let expected = if quantity == 0 {
                StockStatus::OutOfStock
            } else if quantity <= threshold {
                StockStatus::LowStock
            } else {
                StockStatus::Ok
            };
            prop_assert_eq!(status, expected);
            prop_assert_eq!(status.needs_reorder(), quantity <= threshold);
        }

        /// Stock level labels only distinguish OK from Low Stock
        #[test]
        fn prop_stock_level_label(quantity in 0i32..200, threshold in threshold_strategy()) {
            let level = StockLevel::new("SKU-1".into(), "Widget".into(), quantity, threshold);
            let expected = if quantity <= threshold { "Low Stock" } else { "OK" };
            prop_assert_eq!(level.status.as_str(), expected);
        }

        /// Potential revenue is price times units on hand
        #[test]
        fn prop_potential_revenue(price in price_strategy(), quantity in 0i32..10_000) {
            let revenue = potential_revenue(price, quantity);
            prop_assert_eq!(revenue, price * Decimal::from(quantity));
            prop_assert!(revenue >= Decimal::ZERO);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

mod unit_tests {
    use super::*;

    #[test]
    fn test_low_stock_alert_messages() {
        let alert = LowStockAlert::new("WID-1".into(), "Widget".into(), 3, 5);
        assert_eq!(alert.alert_message, "Only 3 left (reorder threshold 5)");

        assert_eq!(low_stock_message(0, 5), "Out of stock (reorder threshold 5)");
    }

    #[test]
    fn test_empty_daily_summary() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let summary = DailySalesSummary::empty(date);

        assert_eq!(summary.transaction_date, date);
        assert_eq!(summary.transaction_count, 0);
        assert_eq!(summary.unique_products_sold, 0);
        assert_eq!(summary.total_items_sold, 0);
        assert_eq!(summary.total_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_performance_status_labels() {
        assert_eq!(ProductPerformance::status_for(0, 5), "Out of Stock");
        assert_eq!(ProductPerformance::status_for(4, 5), "Low Stock");
        assert_eq!(ProductPerformance::status_for(40, 5), "OK");
    }

    #[test]
    fn test_zero_threshold_only_flags_empty_stock() {
        assert_eq!(StockStatus::classify(0, 0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(1, 0), StockStatus::Ok);
    }
}
