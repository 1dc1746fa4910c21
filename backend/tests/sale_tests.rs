//! Sale transaction tests
//!
//! Property-based and unit tests for sale planning:
//! - A sale is applied completely or not at all
//! - Header total equals the sum of line totals
//! - Repeated SKUs decrement sequentially

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    lock_order, plan_sale, sale_total, ProductStatus, SaleLineInput, StockError, StockSnapshot,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn line(sku: &str, quantity: i32, cents: i64) -> SaleLineInput {
    SaleLineInput {
        sku: sku.to_string(),
        quantity,
        unit_price: Decimal::new(cents, 2),
    }
}

fn stock_of(entries: &[(&str, i32)]) -> HashMap<String, StockSnapshot> {
    entries
        .iter()
        .map(|(sku, quantity)| {
            (
                sku.to_string(),
                StockSnapshot {
                    quantity_in_stock: *quantity,
                    status: ProductStatus::Active,
                },
            )
        })
        .collect()
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn sku_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("A-100".to_string()),
        Just("B-200".to_string()),
        Just("C-300".to_string()),
    ]
}

fn sale_line_strategy() -> impl Strategy<Value = SaleLineInput> {
    (sku_strategy(), 1i32..20, 0i64..100_000).prop_map(|(sku, quantity, cents)| SaleLineInput {
        sku,
        quantity,
        unit_price: Decimal::new(cents, 2),
    })
}

fn cart_strategy() -> impl Strategy<Value = Vec<SaleLineInput>> {
    prop::collection::vec(sale_line_strategy(), 1..8)
}

fn stock_strategy() -> impl Strategy<Value = (i32, i32, i32)> {
    (0i32..60, 0i32..60, 0i32..60)
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A plan succeeds exactly when every SKU covers its summed demand
        #[test]
        fn prop_sale_is_all_or_nothing(cart in cart_strategy(), levels in stock_strategy()) {
            let (a, b, c) = levels;
            let stock = stock_of(&[("A-100", a), ("B-200", b), ("C-300", c)]);

            let mut demand: HashMap<&str, i32> = HashMap::new();
            for l in &cart {
                *demand.entry(l.sku.as_str()).or_insert(0) += l.quantity;
            }
            let covered = demand
                .iter()
                .all(|(sku, wanted)| stock[*sku].quantity_in_stock >= *wanted);

            match plan_sale(&cart, &stock) {
                Ok(plan) => {
                    prop_assert!(covered);
                    prop_assert_eq!(plan.lines.len(), cart.len());
                    for (sku, wanted) in &demand {
                        let remaining = plan.final_quantities()[sku];
                        prop_assert_eq!(remaining, stock[*sku].quantity_in_stock - wanted);
                    }
                }
                Err(err) => {
                    prop_assert!(!covered);
                    let is_insufficient = matches!(err, StockError::InsufficientStock { .. });
                    prop_assert!(is_insufficient);
                }
            }
        }

        /// The header total is the sum of quantity times unit price
        #[test]
        fn prop_total_is_sum_of_lines(cart in cart_strategy()) {
            let stock = stock_of(&[("A-100", 10_000), ("B-200", 10_000), ("C-300", 10_000)]);
            let plan = plan_sale(&cart, &stock).unwrap();

            let expected: Decimal = cart
                .iter()
                .map(|l| Decimal::from(l.quantity) * l.unit_price)
                .sum();
            prop_assert_eq!(plan.total_amount, expected);
            prop_assert_eq!(sale_total(&cart).unwrap(), expected);

            let line_sum: Decimal = plan.lines.iter().map(|l| l.line_total).sum();
            prop_assert_eq!(plan.total_amount, line_sum);
        }

        /// Each planned line starts where the previous line for its SKU ended
        #[test]
        fn prop_snapshots_chain_per_sku(cart in cart_strategy()) {
            let stock = stock_of(&[("A-100", 10_000), ("B-200", 10_000), ("C-300", 10_000)]);
            let plan = plan_sale(&cart, &stock).unwrap();

            let mut running: HashMap<&str, i32> = HashMap::new();
            for planned in &plan.lines {
                let before = running
                    .get(planned.sku.as_str())
                    .copied()
                    .unwrap_or(10_000);
                prop_assert_eq!(planned.change.previous_quantity, before);
                prop_assert_eq!(planned.change.new_quantity, before - planned.quantity);
                running.insert(planned.sku.as_str(), planned.change.new_quantity);
            }
        }

        /// Locks are taken once per SKU in ascending order
        #[test]
        fn prop_lock_order_sorted_and_distinct(cart in cart_strategy()) {
            let order = lock_order(&cart);
            let mut expected: Vec<String> = cart.iter().map(|l| l.sku.clone()).collect();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(order, expected);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

mod unit_tests {
    use super::*;

    #[test]
    fn test_failing_line_rejects_whole_cart() {
        let stock = stock_of(&[("A-100", 10), ("B-200", 1)]);
        let cart = vec![line("A-100", 3, 250), line("B-200", 2, 1000)];

        let result = plan_sale(&cart, &stock);
        assert_eq!(
            result,
            Err(StockError::InsufficientStock {
                sku: "B-200".to_string(),
                available: 1,
                requested: 2,
            })
        );
    }

    #[test]
    fn test_repeated_sku_uses_running_quantity() {
        let stock = stock_of(&[("A-100", 5)]);
        let cart = vec![line("A-100", 3, 100), line("A-100", 3, 100)];

        assert_eq!(
            plan_sale(&cart, &stock),
            Err(StockError::InsufficientStock {
                sku: "A-100".to_string(),
                available: 2,
                requested: 3,
            })
        );

        let cart = vec![line("A-100", 3, 100), line("A-100", 2, 100)];
        let plan = plan_sale(&cart, &stock).unwrap();
        assert_eq!(plan.lines[1].change.previous_quantity, 2);
        assert_eq!(plan.lines[1].change.new_quantity, 0);
        assert_eq!(plan.items_sold(), 5);
    }

    #[test]
    fn test_line_numbers_follow_input_order() {
        let stock = stock_of(&[("A-100", 10), ("B-200", 10)]);
        let cart = vec![line("B-200", 1, 100), line("A-100", 1, 100)];
        let plan = plan_sale(&cart, &stock).unwrap();

        assert_eq!(plan.lines[0].line_number, 1);
        assert_eq!(plan.lines[0].sku, "B-200");
        assert_eq!(plan.lines[1].line_number, 2);
    }

    #[test]
    fn test_unknown_product_rejected() {
        let stock = stock_of(&[("A-100", 10)]);
        let cart = vec![line("A-100", 1, 100), line("Z-999", 1, 100)];
        assert_eq!(
            plan_sale(&cart, &stock),
            Err(StockError::ProductNotFound("Z-999".to_string()))
        );
    }

    #[test]
    fn test_retired_product_rejected() {
        let mut stock = stock_of(&[("A-100", 10)]);
        stock.insert(
            "OLD-1".to_string(),
            StockSnapshot {
                quantity_in_stock: 10,
                status: ProductStatus::Retired,
            },
        );
        let cart = vec![line("OLD-1", 1, 100)];
        assert_eq!(
            plan_sale(&cart, &stock),
            Err(StockError::ProductInactive("OLD-1".to_string()))
        );
    }

    #[test]
    fn test_negative_price_rejected() {
        let stock = stock_of(&[("A-100", 10)]);
        let cart = vec![line("A-100", 1, -1)];
        assert_eq!(
            plan_sale(&cart, &stock),
            Err(StockError::InvalidPrice {
                sku: "A-100".to_string(),
                reason: "Price must not be negative",
            })
        );
    }

    #[test]
    fn test_sub_cent_price_rejected() {
        // Two lines at 0.005 would store 0.01 each under a 0.01 header total
        let stock = stock_of(&[("A-100", 10)]);
        let half_cent = SaleLineInput {
            sku: "A-100".to_string(),
            quantity: 1,
            unit_price: Decimal::new(5, 3),
        };
        let cart = vec![half_cent.clone(), half_cent];

        let err = plan_sale(&cart, &stock).unwrap_err();
        assert!(matches!(err, StockError::InvalidPrice { ref sku, .. } if sku == "A-100"));
        assert_eq!(err.field(), Some("unit_price"));
    }

    #[test]
    fn test_oversized_price_rejected() {
        let stock = stock_of(&[("A-100", i32::MAX)]);
        let cart = vec![SaleLineInput {
            sku: "A-100".to_string(),
            quantity: 1_000_000_000,
            unit_price: Decimal::from_i128_with_scale(10i128.pow(20), 0),
        }];
        assert!(matches!(
            plan_sale(&cart, &stock),
            Err(StockError::InvalidPrice { .. })
        ));
        assert_eq!(sale_total(&cart), Err(StockError::AmountOverflow("A-100".to_string())));
    }

    #[test]
    fn test_total_beyond_column_range_rejected() {
        let stock = stock_of(&[("A-100", i32::MAX)]);
        let cart = vec![line("A-100", 1_000_000, 99_999_999_999)];
        assert_eq!(
            plan_sale(&cart, &stock),
            Err(StockError::AmountOverflow("A-100".to_string()))
        );
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert_eq!(plan_sale(&[], &stock_of(&[])), Err(StockError::EmptySale));
    }

    #[test]
    fn test_free_item_total() {
        let stock = stock_of(&[("A-100", 10)]);
        let plan = plan_sale(&[line("A-100", 4, 0)], &stock).unwrap();
        assert_eq!(plan.total_amount, Decimal::ZERO);
    }
}
