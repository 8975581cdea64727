//! # Dashboard Refresher Module
//!
//! Builds dashboard snapshots from the persisted state and keeps a
//! background task republishing them.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Dashboard Refresher                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        Task Loop                                │   │
//! │  │                                                                 │   │
//! │  │  RefreshNow ──┐                                                 │   │
//! │  │               │ mpsc                                            │   │
//! │  │  Shutdown ────┼────────────────▶ ┌─────────────────┐            │   │
//! │  │               │                  │                 │            │   │
//! │  │  interval ────┘                  │   Refresher     │            │   │
//! │  │  (every 5 min)                   │                 │            │   │
//! │  │                                  │  load state     │            │   │
//! │  │                                  │  run queries    │            │   │
//! │  │                                  │  publish        │            │   │
//! │  │                                  └────────┬────────┘            │   │
//! │  │                                           │                     │   │
//! │  │                                           ▼                     │   │
//! │  │                            Arc<RwLock<Option<Snapshot>>>        │   │
//! │  │                             (read by any number of UIs)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Refreshes are serialized by construction: one loop, one refresh       │
//! │  at a time. A failed refresh keeps the previous snapshot.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::config::PosConfig;
use crate::error::{PosError, PosResult};
use mercadinho_core::analytics::{
    self, CustomerTotal, ProductSales, RestockSuggestion, SalesComparison,
};
use mercadinho_core::types::{br_date_time, PaymentMethod, Product, ShopState};
use mercadinho_core::Money;
use mercadinho_db::StateStore;

// =============================================================================
// Dashboard Snapshot
// =============================================================================

/// Everything the dashboard screen shows, computed in one pass.
///
/// Distribution and average figures cover the current month, matching
/// the monthly sales goal; rankings cover the whole ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// When this snapshot was computed.
    #[serde(with = "br_date_time")]
    pub generated_at: NaiveDateTime,

    /// Today against yesterday, last week and the month windows.
    pub comparison: SalesComparison,

    /// Revenue per hour of day, 24 buckets, zeros included.
    pub sales_by_hour: [Money; 24],

    /// Distinct client names served today.
    pub customers_today: usize,

    /// Best sellers by quantity over the whole ledger.
    pub top_products: Vec<ProductSales>,

    /// Highest-spending customer, if any sales exist.
    pub top_customer: Option<CustomerTotal>,

    /// Products at or below the low-stock threshold.
    pub low_stock: Vec<Product>,

    /// Products with exactly zero stock.
    pub out_of_stock: Vec<Product>,

    /// Replenishment amounts for products under the threshold.
    pub restock_suggestions: Vec<RestockSuggestion>,

    /// Sales count per payment method, month to date.
    pub payment_distribution: BTreeMap<PaymentMethod, u64>,

    /// Mean sale value per payment method, month to date.
    pub average_by_method: BTreeMap<PaymentMethod, Money>,

    /// The monthly sales goal.
    pub sales_goal: Money,

    /// Month-to-date revenue as a percentage of the goal.
    pub goal_progress: f64,
}

impl DashboardSnapshot {
    /// Computes a snapshot from loaded state. Pure aside from the
    /// timestamps handed in.
    pub fn build(
        state: &ShopState,
        goal: Money,
        config: &PosConfig,
        today: NaiveDate,
        generated_at: NaiveDateTime,
    ) -> Self {
        let comparison = analytics::sales_comparison(&state.sales, today);
        let month_start = today.with_day(1).unwrap_or(today);
        let threshold = config.low_stock_threshold();
        let top_n = config.dashboard.top_n;

        DashboardSnapshot {
            generated_at,
            sales_by_hour: analytics::sales_by_hour(&state.sales, today),
            customers_today: analytics::customers_served(&state.sales, today),
            top_products: analytics::top_products(&state.sales, top_n),
            top_customer: analytics::top_customer(&state.sales).ok(),
            low_stock: analytics::low_stock_products(&state.products, threshold, top_n)
                .into_iter()
                .cloned()
                .collect(),
            out_of_stock: analytics::out_of_stock_products(&state.products)
                .into_iter()
                .cloned()
                .collect(),
            restock_suggestions: analytics::restock_suggestions(
                &state.products,
                threshold,
                config.restock_top_up(),
            ),
            payment_distribution: analytics::payment_method_distribution(
                &state.sales,
                month_start,
                today,
            ),
            average_by_method: analytics::average_purchase_by_payment_method(
                &state.sales,
                month_start,
                today,
            ),
            goal_progress: analytics::goal_progress_percent(comparison.month_to_date, goal),
            sales_goal: goal,
            comparison,
        }
    }
}

// =============================================================================
// Refresher
// =============================================================================

/// Commands for the refresher task.
#[derive(Debug)]
enum RefreshCommand {
    /// Rebuild the snapshot immediately.
    RefreshNow,

    /// Stop the refresher task.
    Shutdown,
}

/// Background task that keeps the dashboard snapshot fresh.
pub struct DashboardRefresher {
    store: StateStore,
    config: PosConfig,
    snapshot: Arc<RwLock<Option<DashboardSnapshot>>>,
}

/// Handle for reading snapshots and controlling the refresher.
#[derive(Clone)]
pub struct DashboardHandle {
    cmd_tx: mpsc::Sender<RefreshCommand>,
    snapshot: Arc<RwLock<Option<DashboardSnapshot>>>,
}

impl DashboardHandle {
    /// Requests an immediate refresh.
    pub async fn refresh_now(&self) -> PosResult<()> {
        self.cmd_tx
            .send(RefreshCommand::RefreshNow)
            .await
            .map_err(|_| PosError::ChannelClosed("dashboard refresher is not running".into()))
    }

    /// Stops the refresher. Safe to call more than once: a closed
    /// channel means the task is already gone.
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(RefreshCommand::Shutdown).await;
    }

    /// Returns the latest published snapshot, if one exists yet.
    pub async fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.snapshot.read().await.clone()
    }
}

impl DashboardRefresher {
    /// Creates a refresher over the given store.
    pub fn new(store: StateStore, config: PosConfig) -> Self {
        DashboardRefresher {
            store,
            config,
            snapshot: Arc::new(RwLock::new(None)),
        }
    }

    /// Spawns the refresher task and returns its handle.
    pub fn start(self) -> DashboardHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let snapshot = Arc::clone(&self.snapshot);

        tokio::spawn(async move {
            self.run(cmd_rx).await;
        });

        DashboardHandle { cmd_tx, snapshot }
    }

    /// Main refresher loop.
    ///
    /// The first interval tick fires immediately, so a snapshot is
    /// published right at startup.
    async fn run(self, mut cmd_rx: mpsc::Receiver<RefreshCommand>) {
        info!(
            interval_secs = self.config.dashboard.refresh_secs,
            "Dashboard refresher started"
        );

        let mut tick = interval(self.config.refresh_interval());

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(RefreshCommand::RefreshNow) => self.refresh().await,
                        Some(RefreshCommand::Shutdown) | None => {
                            info!("Dashboard refresher shutting down");
                            break;
                        }
                    }
                }
                _ = tick.tick() => self.refresh().await,
            }
        }
    }

    /// Rebuilds and publishes the snapshot. On failure the previous
    /// snapshot stays in place.
    async fn refresh(&self) {
        let state = match self.store.load_state().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Dashboard refresh failed; keeping previous snapshot");
                return;
            }
        };
        let goal = match self.store.load_sales_goal().await {
            Ok(goal) => goal,
            Err(e) => {
                warn!(error = %e, "Dashboard refresh failed; keeping previous snapshot");
                return;
            }
        };

        let now = Local::now().naive_local();
        let snapshot = DashboardSnapshot::build(&state, goal, &self.config, now.date(), now);

        *self.snapshot.write().await = Some(snapshot);
        debug!("Dashboard snapshot refreshed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use mercadinho_core::types::{CartItem, DiscountRate, Order, OrderNumber, Unit};
    use mercadinho_core::Quantity;
    use mercadinho_db::{Database, DbConfig};
    use std::time::Duration;

    fn product(code: &str, stock: i64) -> Product {
        Product {
            code: code.to_string(),
            name: format!("Produto {}", code),
            price: Money::from_centavos(1000),
            quantity: Quantity::from_units(stock),
            unit: Unit::Unit,
            category: "Alimentos".to_string(),
            image: None,
        }
    }

    fn sale(seq: u64, placed_at: NaiveDateTime, total_centavos: i64, client: &str) -> Order {
        Order {
            number: OrderNumber::new(seq),
            items: vec![CartItem {
                code: "ALI0001".to_string(),
                name: "Arroz 5kg".to_string(),
                price: Money::from_centavos(total_centavos),
                unit: Unit::Unit,
                quantity: Quantity::from_units(1),
            }],
            subtotal: Money::from_centavos(total_centavos),
            discount: DiscountRate::zero(),
            total: Money::from_centavos(total_centavos),
            payment_method: PaymentMethod::Pix,
            change: Money::zero(),
            placed_at,
            client: client.to_string(),
        }
    }

    fn seeded_state(now: NaiveDateTime) -> ShopState {
        let mut state = ShopState::default();
        state.products.push(product("ALI0001", 3));
        state.products.push(product("ALI0002", 50));
        state.sales.push(sale(1, now, 2000, "Ana"));
        state.sales.push(sale(2, now - ChronoDuration::days(1), 1500, "Zé"));
        state.last_order_number = 2;
        state
    }

    #[test]
    fn test_snapshot_build_covers_every_panel() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let state = seeded_state(now);
        let goal = Money::from_centavos(10_000);

        let snapshot =
            DashboardSnapshot::build(&state, goal, &PosConfig::default(), now.date(), now);

        assert_eq!(snapshot.comparison.today, Money::from_centavos(2000));
        assert_eq!(snapshot.comparison.yesterday, Money::from_centavos(1500));
        assert_eq!(snapshot.sales_by_hour.len(), 24);
        assert_eq!(snapshot.sales_by_hour[14], Money::from_centavos(2000));
        assert_eq!(snapshot.customers_today, 1);
        assert_eq!(snapshot.top_products[0].code, "ALI0001");
        assert_eq!(snapshot.top_customer.as_ref().unwrap().name, "Ana");
        // Stock 3 is under the default threshold of 10; stock 50 is not.
        assert_eq!(snapshot.low_stock.len(), 1);
        assert_eq!(snapshot.restock_suggestions.len(), 1);
        assert_eq!(
            snapshot.restock_suggestions[0].suggested,
            Quantity::from_units(17)
        );
        assert_eq!(snapshot.payment_distribution[&PaymentMethod::Pix], 2);
        assert_eq!(
            snapshot.average_by_method[&PaymentMethod::Pix],
            Money::from_centavos(1750)
        );
        // Month to date 3500 of a 10000 goal.
        assert!((snapshot.goal_progress - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_state_snapshot_is_all_zeroes() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let snapshot = DashboardSnapshot::build(
            &ShopState::default(),
            Money::from_centavos(10_000_000),
            &PosConfig::default(),
            now.date(),
            now,
        );

        assert!(snapshot.comparison.today.is_zero());
        assert_eq!(snapshot.customers_today, 0);
        assert!(snapshot.top_products.is_empty());
        assert!(snapshot.top_customer.is_none());
        assert!(snapshot.payment_distribution.is_empty());
        assert_eq!(snapshot.goal_progress, 0.0);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let state = seeded_state(now);
        let snapshot = DashboardSnapshot::build(
            &state,
            Money::from_centavos(10_000),
            &PosConfig::default(),
            now.date(),
            now,
        );

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["generatedAt"], "09/03/2025 14:30");
        assert!(json["salesByHour"].is_array());
        assert!(json["paymentDistribution"]["PIX"].is_number());
    }

    async fn seeded_store() -> (Database, StateStore) {
        let db = Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database");
        let store = db.state();
        store
            .persist_state(&seeded_state(Local::now().naive_local()))
            .await
            .expect("seed state");
        (db, store)
    }

    async fn wait_for_snapshot(handle: &DashboardHandle) -> DashboardSnapshot {
        for _ in 0..100 {
            if let Some(snapshot) = handle.snapshot().await {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("refresher never published a snapshot");
    }

    #[tokio::test]
    async fn test_refresher_publishes_on_demand() {
        let (_db, store) = seeded_store().await;
        let handle = DashboardRefresher::new(store, PosConfig::default()).start();

        handle.refresh_now().await.unwrap();
        let snapshot = wait_for_snapshot(&handle).await;
        assert_eq!(snapshot.comparison.today, Money::from_centavos(2000));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let (_db, store) = seeded_store().await;
        let handle = DashboardRefresher::new(store, PosConfig::default()).start();

        handle.shutdown().await;
        handle.shutdown().await;

        // Once the task is gone, refresh requests report the closed channel.
        for _ in 0..100 {
            if handle.refresh_now().await.is_err() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("refresher kept accepting commands after shutdown");
    }

    #[tokio::test]
    async fn test_failed_refresh_retains_previous_snapshot() {
        let (db, store) = seeded_store().await;
        let handle = DashboardRefresher::new(store, PosConfig::default()).start();

        // The startup tick publishes the only successful snapshot; the
        // next interval tick is minutes away.
        let first = wait_for_snapshot(&handle).await;

        // Kill the pool; the next refresh cannot load state.
        db.close().await;
        handle.refresh_now().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let retained = wait_for_snapshot(&handle).await;
        assert_eq!(retained.generated_at, first.generated_at);

        handle.shutdown().await;
    }
}
