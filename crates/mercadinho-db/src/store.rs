//! # State Store
//!
//! Typed load/save for the POS state documents.
//!
//! ## Key Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StateStore                                                             │
//! │                                                                         │
//! │  Rust value                      key                default             │
//! │  ──────────────────────────────  ─────────────────  ─────────────       │
//! │  Vec<Product>                    products           []                  │
//! │  Vec<Order>                      salesHistory       []                  │
//! │  u64 (order counter)             lastOrderNumber    0                   │
//! │  Cart                            cart               empty cart          │
//! │  Option<String> (operator)       loggedIn           None                │
//! │  Money (monthly goal)            salesGoal          R$ 100.000,00       │
//! │                                                                         │
//! │  load_state()    = products + salesHistory + lastOrderNumber + cart    │
//! │  persist_state() = same four keys, one transaction                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A key that was never written reads back as its default, so a fresh
//! database behaves like an empty shop without any seeding step.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::kv::KvRepository;
use mercadinho_core::{Cart, Money, Order, Product, ShopState, DEFAULT_SALES_GOAL};

// =============================================================================
// Well-Known Keys
// =============================================================================

/// Catalog: JSON array of products.
pub const KEY_PRODUCTS: &str = "products";

/// Ledger: JSON array of orders.
pub const KEY_SALES_HISTORY: &str = "salesHistory";

/// Order counter: JSON integer, the last number handed out.
pub const KEY_LAST_ORDER_NUMBER: &str = "lastOrderNumber";

/// Open cart: JSON object with lines and discount.
pub const KEY_CART: &str = "cart";

/// Operator display name: JSON string, absent when nobody is signed in.
pub const KEY_LOGGED_IN: &str = "loggedIn";

/// Monthly sales goal: JSON integer in centavos.
pub const KEY_SALES_GOAL: &str = "salesGoal";

// =============================================================================
// State Store
// =============================================================================

/// Typed facade over the key/value table.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.state();
/// let mut state = store.load_state().await?;
/// // ... apply a core operation ...
/// store.persist_state(&state).await?;
/// ```
#[derive(Debug, Clone)]
pub struct StateStore {
    kv: KvRepository,
}

impl StateStore {
    /// Creates a new StateStore.
    pub fn new(pool: SqlitePool) -> Self {
        StateStore {
            kv: KvRepository::new(pool),
        }
    }

    async fn load_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        match self.kv.get(key).await? {
            Some(text) => {
                let value =
                    serde_json::from_str(&text).map_err(|e| DbError::serialization(key, e))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn save_json<T: Serialize>(&self, key: &str, value: &T) -> DbResult<()> {
        let text = serde_json::to_string(value).map_err(|e| DbError::serialization(key, e))?;
        self.kv.put(key, &text).await
    }

    fn encode<T: Serialize>(key: &str, value: &T) -> DbResult<String> {
        serde_json::to_string(value).map_err(|e| DbError::serialization(key, e))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Loads the product catalog; a fresh database has none.
    pub async fn load_products(&self) -> DbResult<Vec<Product>> {
        Ok(self.load_json(KEY_PRODUCTS).await?.unwrap_or_default())
    }

    /// Saves the product catalog.
    pub async fn save_products(&self, products: &[Product]) -> DbResult<()> {
        self.save_json(KEY_PRODUCTS, &products).await
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    /// Loads the sales history; a fresh database has none.
    pub async fn load_sales(&self) -> DbResult<Vec<Order>> {
        Ok(self.load_json(KEY_SALES_HISTORY).await?.unwrap_or_default())
    }

    /// Saves the sales history.
    pub async fn save_sales(&self, sales: &[Order]) -> DbResult<()> {
        self.save_json(KEY_SALES_HISTORY, &sales).await
    }

    /// Loads the order counter; starts at zero.
    pub async fn load_last_order_number(&self) -> DbResult<u64> {
        Ok(self
            .load_json(KEY_LAST_ORDER_NUMBER)
            .await?
            .unwrap_or_default())
    }

    /// Saves the order counter.
    pub async fn save_last_order_number(&self, number: u64) -> DbResult<()> {
        self.save_json(KEY_LAST_ORDER_NUMBER, &number).await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Loads the open cart; a fresh database has an empty one.
    pub async fn load_cart(&self) -> DbResult<Cart> {
        Ok(self.load_json(KEY_CART).await?.unwrap_or_default())
    }

    /// Saves the open cart.
    pub async fn save_cart(&self, cart: &Cart) -> DbResult<()> {
        self.save_json(KEY_CART, cart).await
    }

    // =========================================================================
    // Operator and Goal
    // =========================================================================

    /// Loads the signed-in operator's display name, if any.
    pub async fn load_operator(&self) -> DbResult<Option<String>> {
        self.load_json(KEY_LOGGED_IN).await
    }

    /// Records the signed-in operator.
    pub async fn save_operator(&self, name: &str) -> DbResult<()> {
        self.save_json(KEY_LOGGED_IN, &name).await
    }

    /// Clears the signed-in operator.
    pub async fn clear_operator(&self) -> DbResult<()> {
        self.kv.delete(KEY_LOGGED_IN).await?;
        Ok(())
    }

    /// Loads the monthly sales goal, defaulting to R$ 100.000,00.
    pub async fn load_sales_goal(&self) -> DbResult<Money> {
        Ok(self
            .load_json(KEY_SALES_GOAL)
            .await?
            .unwrap_or(DEFAULT_SALES_GOAL))
    }

    /// Saves the monthly sales goal.
    pub async fn save_sales_goal(&self, goal: Money) -> DbResult<()> {
        self.save_json(KEY_SALES_GOAL, &goal).await
    }

    // =========================================================================
    // Whole-State Operations
    // =========================================================================

    /// Assembles the whole mutable POS state from its four keys.
    pub async fn load_state(&self) -> DbResult<ShopState> {
        let state = ShopState {
            products: self.load_products().await?,
            cart: self.load_cart().await?,
            sales: self.load_sales().await?,
            last_order_number: self.load_last_order_number().await?,
        };

        debug!(
            products = state.products.len(),
            sales = state.sales.len(),
            cart_lines = state.cart.items.len(),
            last_order_number = state.last_order_number,
            "State loaded"
        );
        Ok(state)
    }

    /// Writes the whole mutable POS state in a single transaction.
    ///
    /// Checkout touches catalog, ledger, counter, and cart at once; all
    /// four keys land together or not at all.
    pub async fn persist_state(&self, state: &ShopState) -> DbResult<()> {
        let entries = [
            (KEY_PRODUCTS, Self::encode(KEY_PRODUCTS, &state.products)?),
            (
                KEY_SALES_HISTORY,
                Self::encode(KEY_SALES_HISTORY, &state.sales)?,
            ),
            (
                KEY_LAST_ORDER_NUMBER,
                Self::encode(KEY_LAST_ORDER_NUMBER, &state.last_order_number)?,
            ),
            (KEY_CART, Self::encode(KEY_CART, &state.cart)?),
        ];

        self.kv.put_many(&entries).await?;

        debug!(
            products = state.products.len(),
            sales = state.sales.len(),
            "State persisted"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use mercadinho_core::types::{CartItem, DiscountRate, OrderNumber, PaymentMethod, Unit};
    use mercadinho_core::Quantity;

    async fn store() -> StateStore {
        Database::new(DbConfig::in_memory()).await.unwrap().state()
    }

    fn sample_product() -> Product {
        Product {
            code: "ALI0001".to_string(),
            name: "Arroz 5kg".to_string(),
            price: Money::from_centavos(2490),
            quantity: Quantity::from_units(12),
            unit: Unit::Unit,
            category: "Alimentos".to_string(),
            image: None,
        }
    }

    fn sample_order() -> Order {
        Order {
            number: OrderNumber::new(1),
            items: vec![CartItem {
                code: "ALI0001".to_string(),
                name: "Arroz 5kg".to_string(),
                price: Money::from_centavos(2490),
                unit: Unit::Unit,
                quantity: Quantity::from_units(2),
            }],
            subtotal: Money::from_centavos(4980),
            discount: DiscountRate::from_bps(1000),
            total: Money::from_centavos(4482),
            payment_method: PaymentMethod::Cash,
            change: Money::from_centavos(518),
            placed_at: NaiveDate::from_ymd_opt(2025, 3, 9)
                .unwrap()
                .and_hms_opt(14, 35, 0)
                .unwrap(),
            client: "Maria".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fresh_database_yields_defaults() {
        let store = store().await;

        assert!(store.load_products().await.unwrap().is_empty());
        assert!(store.load_sales().await.unwrap().is_empty());
        assert_eq!(store.load_last_order_number().await.unwrap(), 0);
        assert!(store.load_cart().await.unwrap().is_empty());
        assert_eq!(store.load_operator().await.unwrap(), None);
        assert_eq!(store.load_sales_goal().await.unwrap(), DEFAULT_SALES_GOAL);
    }

    #[tokio::test]
    async fn test_state_round_trip() {
        let store = store().await;

        let state = ShopState {
            products: vec![sample_product()],
            cart: Cart::default(),
            sales: vec![sample_order()],
            last_order_number: 1,
        };

        store.persist_state(&state).await.unwrap();
        let loaded = store.load_state().await.unwrap();

        assert_eq!(loaded.products, state.products);
        assert_eq!(loaded.sales, state.sales);
        assert_eq!(loaded.last_order_number, 1);
        assert!(loaded.cart.is_empty());

        // The ledger's date format survives the trip.
        assert_eq!(
            loaded.sales[0].placed_at,
            state.sales[0].placed_at
        );
    }

    #[tokio::test]
    async fn test_sales_goal_round_trip() {
        let store = store().await;

        store
            .save_sales_goal(Money::from_centavos(25_000_000))
            .await
            .unwrap();
        assert_eq!(
            store.load_sales_goal().await.unwrap(),
            Money::from_centavos(25_000_000)
        );
    }

    #[tokio::test]
    async fn test_operator_round_trip() {
        let store = store().await;

        store.save_operator("Maria").await.unwrap();
        assert_eq!(store.load_operator().await.unwrap().as_deref(), Some("Maria"));

        store.clear_operator().await.unwrap();
        assert_eq!(store.load_operator().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_a_serialization_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.kv().put(KEY_PRODUCTS, "not json").await.unwrap();

        let result = db.state().load_products().await;
        assert!(matches!(result, Err(DbError::Serialization { .. })));
    }
}
