//! # POS Service
//!
//! The operations the till actually runs, wired over the state store.
//!
//! ## Service Call Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Every Mutating Operation                           │
//! │                                                                         │
//! │   load state ──▶ core operation (pure) ──▶ persist state               │
//! │        │                   │                      │                     │
//! │        │                   │ Err? nothing         │ one transaction,    │
//! │        │                   ▼ was persisted        ▼ all four keys       │
//! │   StateStore          mercadinho-core        StateStore                 │
//! │                                                                         │
//! │   Checkout adds one best-effort step AFTER persistence:                 │
//! │        render coupon ──▶ printer                                        │
//! │   A printer failure is logged at warn and never undoes the sale.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Free-text input from the edge (quantities, money, discount rates,
//! order numbers) is parsed here with the pt-BR parsers; the core only
//! ever sees typed values.

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::config::PosConfig;
use crate::dashboard::DashboardSnapshot;
use crate::error::PosResult;
use crate::receipt::{self, ReceiptPrinter, RenderedReceipt};
use mercadinho_core::catalog::{self, NewProduct, ProductUpdate};
use mercadinho_core::ledger::{self, EditOrderRequest};
use mercadinho_core::types::{
    Cart, DiscountRate, Order, OrderNumber, PaymentMethod, Product,
};
use mercadinho_core::{cart, checkout, CartTotals, CheckoutRequest};
use mercadinho_core::{CoreError, Money, Quantity, ValidationError};
use mercadinho_db::StateStore;

// =============================================================================
// Input Types
// =============================================================================

/// Raw checkout input as it arrives from the till screen.
///
/// `payment_method` takes the short wire ids (`cash`, `pix`, `credit`,
/// `debit`, `food-voucher`); `cash_tendered` is pt-BR money text
/// (`50,00`).
#[derive(Debug, Clone, Default)]
pub struct CheckoutInput {
    pub payment_method: Option<String>,
    pub cash_tendered: Option<String>,
    pub client: Option<String>,
}

/// The open cart together with its computed totals.
#[derive(Debug, Clone)]
pub struct CartView {
    pub cart: Cart,
    pub totals: CartTotals,
}

// =============================================================================
// POS Service
// =============================================================================

/// Service facade over the store, the printer and the config.
///
/// One instance serves the whole till; operations serialize state
/// mutations by running load → mutate → persist inside a single call.
pub struct PosService {
    store: StateStore,
    printer: Box<dyn ReceiptPrinter>,
    config: PosConfig,
}

impl PosService {
    /// Creates a service over an opened state store.
    pub fn new(store: StateStore, printer: Box<dyn ReceiptPrinter>, config: PosConfig) -> Self {
        PosService {
            store,
            printer,
            config,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &PosConfig {
        &self.config
    }

    /// Returns a handle to the underlying state store.
    pub fn store(&self) -> StateStore {
        self.store.clone()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Registers a product and returns its generated code.
    pub async fn add_product(&self, draft: NewProduct) -> PosResult<String> {
        let mut state = self.store.load_state().await?;
        let code = catalog::add_product(&mut state.products, draft)?;
        self.store.persist_state(&state).await?;
        info!(code = %code, "Product registered");
        Ok(code)
    }

    /// Applies a partial edit to a product.
    pub async fn edit_product(&self, code: &str, changes: ProductUpdate) -> PosResult<()> {
        let mut state = self.store.load_state().await?;
        catalog::edit_product(&mut state.products, code, changes)?;
        self.store.persist_state(&state).await?;
        info!(code = %code, "Product updated");
        Ok(())
    }

    /// Removes a product from the catalog and returns it.
    ///
    /// Cart lines keep their snapshot; removing them later simply skips
    /// the stock restore.
    pub async fn remove_product(&self, code: &str) -> PosResult<Product> {
        let mut state = self.store.load_state().await?;
        let removed = catalog::remove_product(&mut state.products, code)?;
        self.store.persist_state(&state).await?;
        info!(code = %code, "Product removed");
        Ok(removed)
    }

    /// Returns the full catalog.
    pub async fn products(&self) -> PosResult<Vec<Product>> {
        Ok(self.store.load_products().await?)
    }

    /// Looks up a single product.
    pub async fn product(&self, code: &str) -> PosResult<Product> {
        let products = self.store.load_products().await?;
        catalog::find_product(&products, code)
            .cloned()
            .ok_or_else(|| CoreError::ProductNotFound(code.to_string()).into())
    }

    /// Returns the distinct category names, sorted.
    pub async fn categories(&self) -> PosResult<Vec<String>> {
        let products = self.store.load_products().await?;
        Ok(catalog::categories(&products))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds a product to the cart, reserving stock immediately.
    ///
    /// Returns the quantity actually added (whole-unit products truncate
    /// fractional requests).
    pub async fn add_to_cart(&self, code: &str, quantity_text: &str) -> PosResult<Quantity> {
        let requested = parse_quantity(quantity_text)?;
        let mut state = self.store.load_state().await?;
        let added = cart::add_item(&mut state.products, &mut state.cart, code, requested)?;
        self.store.persist_state(&state).await?;
        debug!(code = %code, added = %added, "Cart line added");
        Ok(added)
    }

    /// Removes a cart line, restoring its reserved stock.
    pub async fn remove_from_cart(&self, code: &str) -> PosResult<Quantity> {
        let mut state = self.store.load_state().await?;
        let restored = cart::remove_item(&mut state.products, &mut state.cart, code)?;
        self.store.persist_state(&state).await?;
        debug!(code = %code, restored = %restored, "Cart line removed");
        Ok(restored)
    }

    /// Empties the cart, restoring all reserved stock and resetting the
    /// discount.
    pub async fn clear_cart(&self) -> PosResult<()> {
        let mut state = self.store.load_state().await?;
        cart::clear(&mut state.products, &mut state.cart);
        self.store.persist_state(&state).await?;
        debug!("Cart cleared");
        Ok(())
    }

    /// Sets the cart-wide discount from pt-BR percentage text (`10`,
    /// `2,5`).
    pub async fn apply_discount(&self, rate_text: &str) -> PosResult<DiscountRate> {
        let rate: DiscountRate = rate_text
            .trim()
            .parse()
            .map_err(CoreError::Validation)?;
        let mut state = self.store.load_state().await?;
        cart::apply_discount(&mut state.cart, rate);
        self.store.persist_state(&state).await?;
        debug!(rate = %rate, "Discount applied");
        Ok(rate)
    }

    /// Returns the open cart with its totals.
    pub async fn cart(&self) -> PosResult<CartView> {
        let cart = self.store.load_cart().await?;
        let totals = cart::totals(&cart);
        Ok(CartView { cart, totals })
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Commits the open cart as a sale, stamped with the local clock.
    pub async fn checkout(&self, input: CheckoutInput) -> PosResult<Order> {
        self.checkout_at(input, Local::now().naive_local()).await
    }

    /// Commits the open cart as a sale placed at `now`.
    ///
    /// The sale is persisted before the coupon prints; printer failures
    /// are logged and swallowed.
    pub async fn checkout_at(&self, input: CheckoutInput, now: NaiveDateTime) -> PosResult<Order> {
        let request = CheckoutRequest {
            payment: input
                .payment_method
                .as_deref()
                .map(parse_payment_method)
                .transpose()?,
            cash_tendered: input
                .cash_tendered
                .as_deref()
                .map(parse_money)
                .transpose()?,
            client: input.client,
        };

        let mut state = self.store.load_state().await?;
        let order = checkout::commit(&mut state, request, now)?;
        self.store.persist_state(&state).await?;
        info!(
            number = %order.number,
            total = %order.total,
            method = %order.payment_method,
            "Sale committed"
        );

        // The sale is durable from here on; the coupon is best effort.
        let operator = match self.store.load_operator().await {
            Ok(operator) => operator,
            Err(e) => {
                warn!(error = %e, "Could not load operator for the coupon");
                None
            }
        };
        let rendered = receipt::render(
            &order,
            operator.as_deref(),
            &self.config.store,
            self.config.receipt.width,
        );
        if let Err(e) = self.printer.print(&rendered) {
            warn!(
                number = %order.number,
                error = %e,
                "Receipt printing failed; sale is already recorded"
            );
        }

        Ok(order)
    }

    // =========================================================================
    // Sales Ledger
    // =========================================================================

    /// Returns the full sales history, oldest first.
    pub async fn orders(&self) -> PosResult<Vec<Order>> {
        Ok(self.store.load_sales().await?)
    }

    /// Looks up one order by number text (`PED000042` or `42`).
    pub async fn order(&self, number_text: &str) -> PosResult<Order> {
        let number = parse_order_number(number_text)?;
        let sales = self.store.load_sales().await?;
        ledger::find_by_number(&sales, number)
            .cloned()
            .ok_or_else(|| CoreError::OrderNotFound(number).into())
    }

    /// Edits a same-day order (client, discount, payment method).
    pub async fn edit_order(&self, number_text: &str, changes: EditOrderRequest) -> PosResult<Order> {
        self.edit_order_at(number_text, changes, Local::now().date_naive())
            .await
    }

    /// Edits an order against an explicit "today".
    pub async fn edit_order_at(
        &self,
        number_text: &str,
        changes: EditOrderRequest,
        today: NaiveDate,
    ) -> PosResult<Order> {
        let number = parse_order_number(number_text)?;
        let mut state = self.store.load_state().await?;
        let updated = ledger::edit_same_day(&mut state, number, changes, today)?;
        self.store.persist_state(&state).await?;
        info!(number = %updated.number, "Order updated");
        Ok(updated)
    }

    /// Deletes a same-day order, restoring its stock.
    pub async fn delete_order(&self, number_text: &str) -> PosResult<Order> {
        self.delete_order_at(number_text, Local::now().date_naive())
            .await
    }

    /// Deletes an order against an explicit "today".
    pub async fn delete_order_at(&self, number_text: &str, today: NaiveDate) -> PosResult<Order> {
        let number = parse_order_number(number_text)?;
        let mut state = self.store.load_state().await?;
        let removed = ledger::delete_same_day(&mut state, number, today)?;
        self.store.persist_state(&state).await?;
        info!(number = %removed.number, "Order deleted, stock restored");
        Ok(removed)
    }

    /// Re-renders and re-prints the coupon for a past sale.
    ///
    /// Unlike checkout, a printer failure here is returned to the caller:
    /// there is no sale at risk, only the reprint itself.
    pub async fn reprint_receipt(&self, number_text: &str) -> PosResult<RenderedReceipt> {
        let order = self.order(number_text).await?;
        let operator = self.store.load_operator().await?;
        let rendered = receipt::render(
            &order,
            operator.as_deref(),
            &self.config.store,
            self.config.receipt.width,
        );
        self.printer.print(&rendered)?;
        info!(number = %rendered.number, "Coupon reprinted");
        Ok(rendered)
    }

    // =========================================================================
    // Operator
    // =========================================================================

    /// Returns the logged-in operator, if any.
    pub async fn operator(&self) -> PosResult<Option<String>> {
        Ok(self.store.load_operator().await?)
    }

    /// Records the operator shown on coupons.
    pub async fn set_operator(&self, name: &str) -> PosResult<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation(ValidationError::Required {
                field: "operator".to_string(),
            })
            .into());
        }
        self.store.save_operator(trimmed).await?;
        info!(operator = %trimmed, "Operator set");
        Ok(())
    }

    /// Clears the logged-in operator.
    pub async fn clear_operator(&self) -> PosResult<()> {
        self.store.clear_operator().await?;
        info!("Operator cleared");
        Ok(())
    }

    // =========================================================================
    // Sales Goal
    // =========================================================================

    /// Returns the monthly sales goal.
    pub async fn sales_goal(&self) -> PosResult<Money> {
        Ok(self.store.load_sales_goal().await?)
    }

    /// Sets the monthly sales goal from pt-BR money text.
    pub async fn set_sales_goal(&self, goal_text: &str) -> PosResult<Money> {
        let goal = parse_money(goal_text)?;
        if goal.is_negative() {
            return Err(CoreError::Validation(ValidationError::MustNotBeNegative {
                field: "sales goal".to_string(),
            })
            .into());
        }
        self.store.save_sales_goal(goal).await?;
        info!(goal = %goal, "Sales goal updated");
        Ok(goal)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Builds a dashboard snapshot on demand, outside the refresher.
    pub async fn dashboard_snapshot(&self) -> PosResult<DashboardSnapshot> {
        let state = self.store.load_state().await?;
        let goal = self.store.load_sales_goal().await?;
        let now = Local::now().naive_local();
        Ok(DashboardSnapshot::build(
            &state,
            goal,
            &self.config,
            now.date(),
            now,
        ))
    }
}

// =============================================================================
// pt-BR Input Parsers
// =============================================================================

fn parse_quantity(text: &str) -> Result<Quantity, CoreError> {
    text.trim().parse().map_err(|_| CoreError::InvalidQuantity {
        value: text.trim().to_string(),
    })
}

fn parse_payment_method(text: &str) -> Result<PaymentMethod, CoreError> {
    text.parse().map_err(CoreError::Validation)
}

fn parse_money(text: &str) -> Result<Money, CoreError> {
    text.trim().parse().map_err(CoreError::Validation)
}

fn parse_order_number(text: &str) -> Result<OrderNumber, CoreError> {
    text.parse().map_err(CoreError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{NoOpReceiptPrinter, ReceiptError, ReceiptResult};
    use mercadinho_core::types::Unit;
    use mercadinho_db::{Database, DbConfig};

    /// Printer that always fails, for the commit-then-print contract.
    struct FailingPrinter;

    impl ReceiptPrinter for FailingPrinter {
        fn print(&self, _receipt: &RenderedReceipt) -> ReceiptResult<()> {
            Err(ReceiptError::Unavailable("out of paper".to_string()))
        }
    }

    async fn service_with_printer(printer: Box<dyn ReceiptPrinter>) -> PosService {
        let db = Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database");
        PosService::new(db.state(), printer, PosConfig::default())
    }

    async fn service() -> PosService {
        service_with_printer(Box::new(NoOpReceiptPrinter)).await
    }

    fn arroz(stock: i64) -> NewProduct {
        NewProduct {
            name: "Arroz 5kg".to_string(),
            price: Money::from_centavos(1000),
            quantity: Quantity::from_units(stock),
            unit: Unit::Unit,
            category: "Alimentos".to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_checkout_flow_end_to_end() {
        let service = service().await;
        let code = service.add_product(arroz(5)).await.unwrap();

        let added = service.add_to_cart(&code, "3").await.unwrap();
        assert_eq!(added, Quantity::from_units(3));

        let order = service
            .checkout(CheckoutInput {
                payment_method: Some("cash".to_string()),
                cash_tendered: Some("50,00".to_string()),
                client: None,
            })
            .await
            .unwrap();

        assert_eq!(order.number.to_string(), "PED000001");
        assert_eq!(order.total, Money::from_centavos(3000));
        assert_eq!(order.change, Money::from_centavos(2000));
        assert_eq!(order.client, "Consumidor Final");

        // Stock deduction, the ledger entry and the counter survived
        // persistence.
        let products = service.products().await.unwrap();
        assert_eq!(products[0].quantity, Quantity::from_units(2));
        let orders = service.orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        let store = service.store();
        assert_eq!(store.load_last_order_number().await.unwrap(), 1);

        // Cart is reset for the next customer.
        let view = service.cart().await.unwrap();
        assert!(view.cart.items.is_empty());
        assert!(view.totals.total.is_zero());
    }

    #[tokio::test]
    async fn test_printer_failure_does_not_roll_back_the_sale() {
        let service = service_with_printer(Box::new(FailingPrinter)).await;
        let code = service.add_product(arroz(5)).await.unwrap();
        service.add_to_cart(&code, "1").await.unwrap();

        let order = service
            .checkout(CheckoutInput {
                payment_method: Some("pix".to_string()),
                ..CheckoutInput::default()
            })
            .await
            .unwrap();

        assert_eq!(order.number.to_string(), "PED000001");
        let orders = service.orders().await.unwrap();
        assert_eq!(orders.len(), 1);

        // But an explicit reprint does surface the failure.
        let err = service.reprint_receipt("PED000001").await.unwrap_err();
        assert!(matches!(err, crate::error::PosError::Receipt(_)));
    }

    #[tokio::test]
    async fn test_quantity_text_is_parsed_per_unit_rules() {
        let service = service().await;
        let code = service.add_product(arroz(5)).await.unwrap();

        // Whole-unit products truncate fractional requests.
        let added = service.add_to_cart(&code, "2,9").await.unwrap();
        assert_eq!(added, Quantity::from_units(2));

        // Unparseable text maps to InvalidQuantity with the raw input.
        let err = service.add_to_cart(&code, "abc").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::PosError::Core(CoreError::InvalidQuantity { ref value }) if value == "abc"
        ));
    }

    #[tokio::test]
    async fn test_discount_applies_to_totals() {
        let service = service().await;
        let code = service.add_product(arroz(5)).await.unwrap();
        service.add_to_cart(&code, "3").await.unwrap();
        service.apply_discount("10").await.unwrap();

        let view = service.cart().await.unwrap();
        assert_eq!(view.totals.subtotal, Money::from_centavos(3000));
        assert_eq!(view.totals.total, Money::from_centavos(2700));
    }

    #[tokio::test]
    async fn test_consecutive_orders_number_sequentially() {
        let service = service().await;
        let code = service.add_product(arroz(10)).await.unwrap();

        for expected in ["PED000001", "PED000002", "PED000003"] {
            service.add_to_cart(&code, "1").await.unwrap();
            let order = service
                .checkout(CheckoutInput {
                    payment_method: Some("pix".to_string()),
                    ..CheckoutInput::default()
                })
                .await
                .unwrap();
            assert_eq!(order.number.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn test_edit_window_enforced_through_service() {
        let service = service().await;
        let code = service.add_product(arroz(5)).await.unwrap();
        service.add_to_cart(&code, "1").await.unwrap();
        let order = service
            .checkout(CheckoutInput {
                payment_method: Some("cash".to_string()),
                cash_tendered: Some("10,00".to_string()),
                client: None,
            })
            .await
            .unwrap();

        let changes = EditOrderRequest {
            client: "Ana".to_string(),
            discount: DiscountRate::zero(),
            payment_method: PaymentMethod::Pix,
        };

        // A later day closes the window.
        let tomorrow = order.placed_on().succ_opt().unwrap();
        let err = service
            .edit_order_at("PED000001", changes.clone(), tomorrow)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::PosError::Core(CoreError::EditWindowClosed { .. })
        ));

        // Same day goes through and persists.
        let updated = service
            .edit_order_at("PED000001", changes, order.placed_on())
            .await
            .unwrap();
        assert_eq!(updated.client, "Ana");
        assert_eq!(service.order("PED000001").await.unwrap().client, "Ana");
    }

    #[tokio::test]
    async fn test_delete_restores_stock_through_service() {
        let service = service().await;
        let code = service.add_product(arroz(5)).await.unwrap();
        service.add_to_cart(&code, "3").await.unwrap();
        let order = service
            .checkout(CheckoutInput {
                payment_method: Some("pix".to_string()),
                ..CheckoutInput::default()
            })
            .await
            .unwrap();

        service
            .delete_order_at("PED000001", order.placed_on())
            .await
            .unwrap();

        let products = service.products().await.unwrap();
        assert_eq!(products[0].quantity, Quantity::from_units(5));
        assert!(service.orders().await.unwrap().is_empty());

        // The number is spent; the next sale takes PED000002.
        service.add_to_cart(&code, "1").await.unwrap();
        let next = service
            .checkout(CheckoutInput {
                payment_method: Some("pix".to_string()),
                ..CheckoutInput::default()
            })
            .await
            .unwrap();
        assert_eq!(next.number.to_string(), "PED000002");
    }

    #[tokio::test]
    async fn test_operator_round_trip() {
        let service = service().await;
        assert_eq!(service.operator().await.unwrap(), None);

        service.set_operator("  Maria  ").await.unwrap();
        assert_eq!(service.operator().await.unwrap(), Some("Maria".to_string()));

        assert!(service.set_operator("   ").await.is_err());

        service.clear_operator().await.unwrap();
        assert_eq!(service.operator().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sales_goal_round_trip() {
        let service = service().await;
        // Default until the owner sets one.
        assert_eq!(
            service.sales_goal().await.unwrap(),
            Money::from_centavos(10_000_000)
        );

        let goal = service.set_sales_goal("150.000,00").await.unwrap();
        assert_eq!(goal, Money::from_centavos(15_000_000));
        assert_eq!(service.sales_goal().await.unwrap(), goal);

        assert!(service.set_sales_goal("-1,00").await.is_err());
    }

    #[tokio::test]
    async fn test_dashboard_snapshot_on_demand() {
        let service = service().await;
        let code = service.add_product(arroz(5)).await.unwrap();
        service.add_to_cart(&code, "2").await.unwrap();
        service
            .checkout(CheckoutInput {
                payment_method: Some("cash".to_string()),
                cash_tendered: Some("20,00".to_string()),
                client: Some("Ana".to_string()),
            })
            .await
            .unwrap();

        let snapshot = service.dashboard_snapshot().await.unwrap();
        assert_eq!(snapshot.comparison.today, Money::from_centavos(2000));
        assert_eq!(snapshot.customers_today, 1);
        assert_eq!(snapshot.top_products.len(), 1);
        assert_eq!(snapshot.top_products[0].code, code);
        assert!(snapshot.top_products.len() <= service.config().dashboard.top_n);
    }
}
