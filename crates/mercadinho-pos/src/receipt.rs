//! # Receipt Rendering and Printing
//!
//! Renders the classic fixed-width coupon and hands it to a printer
//! adapter.
//!
//! ## Coupon Layout (40 columns)
//! ```text
//! ┌────────────────────────────────────────┐
//! │            MINI MERCADINHOS            │
//! │        CNPJ: 00.000.000/0001-00        │
//! │   Rua Exemplo, 123 - Cidade - Estado   │
//! │  CEP: 12345-678 - Tel: (11) 1234-5678  │
//! │ -------------------------------------- │
//! │ Pedido: PED000042                      │
//! │ Data: 09/03/2025 12:30                 │
//! │ Cliente: Consumidor Final              │
//! │ Atendente: Maria                       │
//! │ -------------------------------------- │
//! │              CUPOM FISCAL              │
//! │ Arroz 5kg                              │
//! │ 2 un x R$ 10,00                R$ 20,00│
//! │ -------------------------------------- │
//! │ Subtotal:                      R$ 20,00│
//! │ Desconto (10%):                 R$ 2,00│
//! │ TOTAL:                         R$ 18,00│
//! │ Forma de Pagamento: Dinheiro           │
//! │ Troco:                          R$ 2,00│
//! │ -------------------------------------- │
//! │       Obrigado pela preferência!       │
//! │             Volte sempre!              │
//! └────────────────────────────────────────┘
//! ```
//!
//! The `Troco` line appears only on cash sales with change to give back.
//! Printing is always best effort from the service's point of view: the
//! sale is committed and persisted before any printer runs.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::StoreInfo;
use mercadinho_core::types::{format_br_date_time, Order, OrderNumber, PaymentMethod};

// =============================================================================
// Receipt Error
// =============================================================================

/// Errors raised by receipt printers.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing the coupon file failed.
    #[error("Receipt I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The printer cannot take jobs right now.
    #[error("Printer unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for receipt operations.
pub type ReceiptResult<T> = Result<T, ReceiptError>;

// =============================================================================
// Rendered Receipt
// =============================================================================

/// A fully rendered coupon, ready for any printer adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReceipt {
    /// Order this coupon belongs to.
    pub number: OrderNumber,

    /// The coupon text, one line per row, trailing newline included.
    pub text: String,
}

impl RenderedReceipt {
    /// Canonical coupon file name: `cupom_fiscal_PED000042.txt`.
    pub fn file_name(&self) -> String {
        format!("cupom_fiscal_{}.txt", self.number)
    }
}

// =============================================================================
// Coupon Builder
// =============================================================================

/// Fixed-width line builder for coupon text.
///
/// All measurements count characters, not bytes, so accented pt-BR text
/// centers correctly.
struct CouponBuilder {
    width: usize,
    lines: Vec<String>,
}

impl CouponBuilder {
    fn new(width: usize) -> Self {
        CouponBuilder {
            width,
            lines: Vec::new(),
        }
    }

    /// Left-aligned line, printed as-is.
    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// Horizontally centered line.
    fn center(&mut self, text: &str) {
        let len = text.chars().count();
        let pad = self.width.saturating_sub(len) / 2;
        self.lines.push(format!("{}{}", " ".repeat(pad), text));
    }

    /// Left label with a right-aligned value on the same line.
    ///
    /// If the two do not fit, the value moves to its own right-aligned
    /// line below the label.
    fn two_column(&mut self, left: &str, right: &str) {
        let left_len = left.chars().count();
        let right_len = right.chars().count();

        if left_len + right_len < self.width {
            let pad = self.width - left_len - right_len;
            self.lines.push(format!("{}{}{}", left, " ".repeat(pad), right));
        } else {
            self.lines.push(left.to_string());
            let pad = self.width.saturating_sub(right_len);
            self.lines.push(format!("{}{}", " ".repeat(pad), right));
        }
    }

    /// Full-width rule between coupon sections.
    fn separator(&mut self) {
        self.lines.push("-".repeat(self.width));
    }

    fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders the coupon for a committed order.
///
/// `operator` is the logged-in attendant; coupons for unattended sales
/// show a dash.
pub fn render(
    order: &Order,
    operator: Option<&str>,
    store: &StoreInfo,
    width: usize,
) -> RenderedReceipt {
    let mut coupon = CouponBuilder::new(width);

    // Header
    coupon.center(&store.name);
    coupon.center(&format!("CNPJ: {}", store.cnpj));
    coupon.center(&store.address);
    coupon.center(&store.phone);
    coupon.separator();

    // Order details
    coupon.line(format!("Pedido: {}", order.number));
    coupon.line(format!("Data: {}", format_br_date_time(order.placed_at)));
    coupon.line(format!("Cliente: {}", order.client));
    coupon.line(format!("Atendente: {}", operator.unwrap_or("-")));
    coupon.separator();

    // Items
    coupon.center("CUPOM FISCAL");
    for item in &order.items {
        coupon.line(item.name.clone());
        coupon.two_column(
            &format!(
                "{} {} x {}",
                item.quantity.format_br(item.unit),
                item.unit,
                item.price
            ),
            &item.line_total().to_string(),
        );
    }
    coupon.separator();

    // Totals
    coupon.two_column("Subtotal:", &order.subtotal.to_string());
    coupon.two_column(
        &format!("Desconto ({}):", order.discount),
        &order.subtotal.discount_amount(order.discount).to_string(),
    );
    coupon.two_column("TOTAL:", &order.total.to_string());
    coupon.line(format!("Forma de Pagamento: {}", order.payment_method));
    if order.payment_method == PaymentMethod::Cash && order.change.is_positive() {
        coupon.two_column("Troco:", &order.change.to_string());
    }
    coupon.separator();

    // Closing message
    coupon.center("Obrigado pela preferência!");
    coupon.center("Volte sempre!");

    RenderedReceipt {
        number: order.number,
        text: coupon.finish(),
    }
}

// =============================================================================
// Printer Adapters
// =============================================================================

/// Trait for coupon printer adapters.
///
/// Object safe so the service can swap adapters at runtime (file output
/// in production, no-op or failing printers in tests).
pub trait ReceiptPrinter: Send + Sync {
    /// Sends a rendered coupon to the output device.
    fn print(&self, receipt: &RenderedReceipt) -> ReceiptResult<()>;
}

/// Writes each coupon as a text file under a configured directory.
///
/// The directory is created on first print.
#[derive(Debug, Clone)]
pub struct FileReceiptPrinter {
    output_dir: PathBuf,
}

impl FileReceiptPrinter {
    /// Creates a printer targeting the given directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        FileReceiptPrinter {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the directory coupons are written to.
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }
}

impl ReceiptPrinter for FileReceiptPrinter {
    fn print(&self, receipt: &RenderedReceipt) -> ReceiptResult<()> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join(receipt.file_name());
        std::fs::write(&path, &receipt.text)?;

        info!(?path, number = %receipt.number, "Coupon written");
        Ok(())
    }
}

/// Printer that drops every coupon. For tests and headless setups.
#[derive(Debug, Clone, Default)]
pub struct NoOpReceiptPrinter;

impl ReceiptPrinter for NoOpReceiptPrinter {
    fn print(&self, receipt: &RenderedReceipt) -> ReceiptResult<()> {
        debug!(number = %receipt.number, "Discarding coupon (no-op printer)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mercadinho_core::types::{CartItem, DiscountRate, Unit};
    use mercadinho_core::{Money, Quantity};

    fn sample_order(payment_method: PaymentMethod, change_centavos: i64) -> Order {
        Order {
            number: OrderNumber::new(42),
            items: vec![
                CartItem {
                    code: "ALI0001".to_string(),
                    name: "Arroz 5kg".to_string(),
                    price: Money::from_centavos(1000),
                    unit: Unit::Unit,
                    quantity: Quantity::from_units(2),
                },
                CartItem {
                    code: "HOR0001".to_string(),
                    name: "Tomate".to_string(),
                    price: Money::from_centavos(799),
                    unit: Unit::Kg,
                    quantity: Quantity::from_thousandths(355),
                },
            ],
            subtotal: Money::from_centavos(2284),
            discount: DiscountRate::from_bps(1000),
            total: Money::from_centavos(2056),
            payment_method,
            change: Money::from_centavos(change_centavos),
            placed_at: NaiveDate::from_ymd_opt(2025, 3, 9)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
            client: "Consumidor Final".to_string(),
        }
    }

    fn render_default(order: &Order) -> RenderedReceipt {
        render(order, Some("Maria"), &StoreInfo::default(), 40)
    }

    #[test]
    fn test_cash_receipt_shows_change() {
        let order = sample_order(PaymentMethod::Cash, 444);
        let receipt = render_default(&order);
        assert!(receipt.text.contains("Troco:"));
        assert!(receipt.text.contains("R$ 4,44"));
    }

    #[test]
    fn test_cash_receipt_without_change_hides_troco() {
        let order = sample_order(PaymentMethod::Cash, 0);
        let receipt = render_default(&order);
        assert!(!receipt.text.contains("Troco:"));
    }

    #[test]
    fn test_non_cash_receipt_hides_troco() {
        let order = sample_order(PaymentMethod::Pix, 0);
        let receipt = render_default(&order);
        assert!(!receipt.text.contains("Troco:"));
        assert!(receipt.text.contains("Forma de Pagamento: PIX"));
    }

    #[test]
    fn test_header_and_closing_lines() {
        let order = sample_order(PaymentMethod::Cash, 444);
        let receipt = render_default(&order);
        let lines: Vec<&str> = receipt.text.lines().collect();

        assert_eq!(lines[0].trim(), "MINI MERCADINHOS");
        assert_eq!(lines[1].trim(), "CNPJ: 00.000.000/0001-00");
        assert!(receipt.text.contains("CUPOM FISCAL"));
        assert!(receipt.text.contains("Obrigado pela preferência!"));
        assert!(receipt.text.contains("Volte sempre!"));

        // Centering: header line sits in the middle of the 40 columns.
        let pad = lines[0].chars().take_while(|c| *c == ' ').count();
        assert_eq!(pad, (40 - "MINI MERCADINHOS".len()) / 2);
    }

    #[test]
    fn test_order_details_block() {
        let order = sample_order(PaymentMethod::Cash, 444);
        let receipt = render_default(&order);
        assert!(receipt.text.contains("Pedido: PED000042"));
        assert!(receipt.text.contains("Data: 09/03/2025 12:30"));
        assert!(receipt.text.contains("Cliente: Consumidor Final"));
        assert!(receipt.text.contains("Atendente: Maria"));
    }

    #[test]
    fn test_item_lines_use_br_quantity_formats() {
        let order = sample_order(PaymentMethod::Cash, 444);
        let receipt = render_default(&order);

        // Whole units print without decimals, weights with three.
        assert!(receipt.text.contains("2 un x R$ 10,00"));
        assert!(receipt.text.contains("0,355 kg x R$ 7,99"));
        // Line totals are right-aligned on the same row.
        assert!(receipt
            .text
            .lines()
            .any(|l| l.starts_with("2 un x R$ 10,00") && l.ends_with("R$ 20,00")));
    }

    #[test]
    fn test_totals_block_shows_discount_rate() {
        let order = sample_order(PaymentMethod::Cash, 444);
        let receipt = render_default(&order);
        assert!(receipt.text.contains("Subtotal:"));
        assert!(receipt.text.contains("Desconto (10%):"));
        assert!(receipt.text.contains("TOTAL:"));
        // 10% of R$ 22,84 rounds to R$ 2,28.
        assert!(receipt
            .text
            .lines()
            .any(|l| l.starts_with("Desconto (10%):") && l.ends_with("R$ 2,28")));
    }

    #[test]
    fn test_missing_operator_renders_dash() {
        let order = sample_order(PaymentMethod::Cash, 444);
        let receipt = render(&order, None, &StoreInfo::default(), 40);
        assert!(receipt.text.contains("Atendente: -"));
    }

    #[test]
    fn test_every_line_fits_the_width() {
        let order = sample_order(PaymentMethod::Cash, 444);
        let receipt = render_default(&order);
        for line in receipt.text.lines() {
            assert!(
                line.chars().count() <= 40,
                "line wider than coupon: {:?}",
                line
            );
        }
    }

    #[test]
    fn test_file_printer_writes_coupon() {
        let dir = std::env::temp_dir().join(format!("mercadinho-coupons-{}", std::process::id()));
        let printer = FileReceiptPrinter::new(&dir);

        let order = sample_order(PaymentMethod::Cash, 444);
        let receipt = render_default(&order);
        printer.print(&receipt).unwrap();

        let path = printer.output_dir().join("cupom_fiscal_PED000042.txt");
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, receipt.text);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_noop_printer_accepts_everything() {
        let order = sample_order(PaymentMethod::Pix, 0);
        let receipt = render_default(&order);
        assert!(NoOpReceiptPrinter.print(&receipt).is_ok());
    }
}
