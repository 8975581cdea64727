//! # Analytics Engine
//!
//! Read-only queries over the ledger and catalog that feed the manager
//! dashboard.
//!
//! ## Query Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Analytics Queries                                   │
//! │                                                                         │
//! │  Ledger (&[Order])                   Catalog (&[Product])               │
//! │  ├── total_sales_for_day/period      ├── low_stock_products            │
//! │  ├── sales_by_hour (24 buckets)      ├── out_of_stock_products         │
//! │  ├── top_products                    └── restock_suggestions           │
//! │  ├── customers_served                                                   │
//! │  ├── top_customer                                                       │
//! │  ├── payment_method_distribution                                        │
//! │  ├── average_purchase_by_payment_method                                 │
//! │  └── sales_comparison                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function takes its reference date explicitly; nothing in here
//! reads the clock, so yesterday's numbers are reproducible today.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{Order, PaymentMethod, Product};

// =============================================================================
// Result Types
// =============================================================================

/// Lifetime sales figures for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSales {
    pub code: String,
    pub name: String,
    pub quantity: Quantity,
    pub revenue: Money,
}

/// A customer and everything they have ever spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerTotal {
    pub name: String,
    pub total: Money,
}

/// Side-by-side revenue figures for the comparison card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesComparison {
    pub today: Money,
    pub yesterday: Money,
    /// The single calendar day seven days back.
    pub same_day_last_week: Money,
    /// From the 1st of the current month through today.
    pub month_to_date: Money,
    /// The whole previous month, 1st through last day.
    pub previous_month: Money,
}

/// A reorder hint for a product running low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestockSuggestion {
    pub code: String,
    pub name: String,
    pub current: Quantity,
    pub suggested: Quantity,
}

// =============================================================================
// Revenue Totals
// =============================================================================

fn orders_on(sales: &[Order], day: NaiveDate) -> impl Iterator<Item = &Order> {
    sales.iter().filter(move |order| order.placed_on() == day)
}

fn orders_between(sales: &[Order], start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = &Order> {
    sales
        .iter()
        .filter(move |order| order.placed_on() >= start && order.placed_on() <= end)
}

/// Revenue for one calendar day.
pub fn total_sales_for_day(sales: &[Order], day: NaiveDate) -> Money {
    orders_on(sales, day).map(|order| order.total).sum()
}

/// Revenue for an inclusive date range.
pub fn total_sales_for_period(sales: &[Order], start: NaiveDate, end: NaiveDate) -> Money {
    orders_between(sales, start, end)
        .map(|order| order.total)
        .sum()
}

/// Revenue per hour of the day, for one calendar day.
///
/// Always 24 buckets; hours without sales hold zero so the chart's
/// x-axis never shifts.
pub fn sales_by_hour(sales: &[Order], day: NaiveDate) -> [Money; 24] {
    let mut buckets = [Money::zero(); 24];
    for order in orders_on(sales, day) {
        buckets[order.hour()] += order.total;
    }
    buckets
}

// =============================================================================
// Rankings
// =============================================================================

/// Best sellers over the whole ledger, by quantity sold.
///
/// Ties break on revenue, then code, so the ranking is deterministic.
/// The name shown is the one recorded when the product first sold.
pub fn top_products(sales: &[Order], n: usize) -> Vec<ProductSales> {
    let mut by_code: BTreeMap<&str, ProductSales> = BTreeMap::new();

    for order in sales {
        for item in &order.items {
            let entry = by_code
                .entry(item.code.as_str())
                .or_insert_with(|| ProductSales {
                    code: item.code.clone(),
                    name: item.name.clone(),
                    quantity: Quantity::zero(),
                    revenue: Money::zero(),
                });
            entry.quantity += item.quantity;
            entry.revenue += item.line_total();
        }
    }

    let mut ranked: Vec<ProductSales> = by_code.into_values().collect();
    ranked.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then(b.revenue.cmp(&a.revenue))
            .then(a.code.cmp(&b.code))
    });
    ranked.truncate(n);
    ranked
}

/// Products at or below the stock threshold, lowest first.
///
/// Zero-stock products are included; a product can appear both here and
/// in [`out_of_stock_products`].
pub fn low_stock_products(products: &[Product], threshold: Quantity, n: usize) -> Vec<&Product> {
    let mut low: Vec<&Product> = products
        .iter()
        .filter(|product| product.quantity <= threshold)
        .collect();
    low.sort_by_key(|product| product.quantity);
    low.truncate(n);
    low
}

/// Products with exactly zero stock.
pub fn out_of_stock_products(products: &[Product]) -> Vec<&Product> {
    products
        .iter()
        .filter(|product| product.quantity.is_zero())
        .collect()
}

/// Reorder hints for every product at or below the threshold.
///
/// The suggestion refills to the threshold and adds a buffer on top:
/// `threshold - current + top_up` (stock 3 with both at 10 suggests 17).
pub fn restock_suggestions(
    products: &[Product],
    threshold: Quantity,
    top_up: Quantity,
) -> Vec<RestockSuggestion> {
    products
        .iter()
        .filter(|product| product.quantity <= threshold)
        .map(|product| RestockSuggestion {
            code: product.code.clone(),
            name: product.name.clone(),
            current: product.quantity,
            suggested: threshold - product.quantity + top_up,
        })
        .collect()
}

// =============================================================================
// Customers
// =============================================================================

/// Distinct customer names served on a day. Walk-ins all record the
/// same default name and count once.
pub fn customers_served(sales: &[Order], day: NaiveDate) -> usize {
    orders_on(sales, day)
        .map(|order| order.client.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// The customer with the greatest lifetime spend.
///
/// ## Errors
/// `NoData` on an empty ledger. Ties resolve to the lexicographically
/// first name.
pub fn top_customer(sales: &[Order]) -> CoreResult<CustomerTotal> {
    let mut totals: BTreeMap<&str, Money> = BTreeMap::new();
    for order in sales {
        *totals.entry(order.client.as_str()).or_insert_with(Money::zero) += order.total;
    }

    let mut best: Option<CustomerTotal> = None;
    for (name, total) in totals {
        // Strict comparison keeps the first (alphabetically smallest)
        // name on ties.
        let beats = match &best {
            Some(current) => total > current.total,
            None => true,
        };
        if beats {
            best = Some(CustomerTotal {
                name: name.to_string(),
                total,
            });
        }
    }

    best.ok_or(CoreError::NoData)
}

// =============================================================================
// Payment Methods
// =============================================================================

/// Order counts per payment method over an inclusive date range.
///
/// Only methods that actually occur appear in the map.
pub fn payment_method_distribution(
    sales: &[Order],
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<PaymentMethod, u64> {
    let mut counts = BTreeMap::new();
    for order in orders_between(sales, start, end) {
        *counts.entry(order.payment_method).or_insert(0) += 1;
    }
    counts
}

/// Mean order total per payment method over an inclusive date range.
///
/// Methods without sales are absent rather than zero, so there is never
/// a division by zero.
pub fn average_purchase_by_payment_method(
    sales: &[Order],
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<PaymentMethod, Money> {
    let mut sums: BTreeMap<PaymentMethod, (Money, i64)> = BTreeMap::new();
    for order in orders_between(sales, start, end) {
        let entry = sums.entry(order.payment_method).or_insert((Money::zero(), 0));
        entry.0 += order.total;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(method, (sum, count))| (method, mean(sum, count)))
        .collect()
}

/// Centavo-rounded mean, half away from zero. `count` is at least 1 at
/// every call site.
fn mean(sum: Money, count: i64) -> Money {
    if count <= 0 {
        return Money::zero();
    }
    let s = sum.centavos() as i128;
    let c = count as i128;
    let rounded = if s >= 0 { (s + c / 2) / c } else { -((-s + c / 2) / c) };
    Money::from_centavos(rounded as i64)
}

// =============================================================================
// Comparisons and Goals
// =============================================================================

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Revenue for today against the recent past.
pub fn sales_comparison(sales: &[Order], today: NaiveDate) -> SalesComparison {
    let yesterday = today - Duration::days(1);
    let same_day_last_week = today - Duration::days(7);
    let month_start = first_of_month(today);
    let previous_month_end = month_start.pred_opt().unwrap_or(month_start);
    let previous_month_start = first_of_month(previous_month_end);

    SalesComparison {
        today: total_sales_for_day(sales, today),
        yesterday: total_sales_for_day(sales, yesterday),
        same_day_last_week: total_sales_for_day(sales, same_day_last_week),
        month_to_date: total_sales_for_period(sales, month_start, today),
        previous_month: total_sales_for_period(sales, previous_month_start, previous_month_end),
    }
}

/// Month-to-date revenue as a percentage of the monthly goal.
///
/// A goal of zero (or less) reports 0.0 instead of dividing by it.
pub fn goal_progress_percent(month_to_date: Money, goal: Money) -> f64 {
    if !goal.is_positive() {
        return 0.0;
    }
    month_to_date.centavos() as f64 / goal.centavos() as f64 * 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================
