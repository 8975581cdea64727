//! # mercadinho-pos: Service Layer for Mercadinho POS
//!
//! This crate wires the pure business core to the persistence layer and
//! adds everything the till and dashboard screens call: the service
//! facade, receipt printing, the dashboard refresher and configuration.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Service Layer Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     PosService (Facade)                          │  │
//! │  │                                                                  │  │
//! │  │  One entry point per screen action: catalog CRUD, cart ops,     │  │
//! │  │  checkout, order editing, operator session, sales goal.         │  │
//! │  │  Every mutation runs load state → core op → persist.            │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ mercadinho-core│  │ mercadinho-db  │  │  ReceiptPrinter        │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Pure catalog/  │  │ StateStore     │  │ 40-column coupon to    │    │
//! │  │ cart/checkout/ │  │ over SQLite    │  │ file (or no-op);       │    │
//! │  │ ledger/queries │  │ kv_store       │  │ best effort only      │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard Refresher                           │   │
//! │  │                                                                 │   │
//! │  │ Background tokio task on a 5-minute interval                    │   │
//! │  │ RefreshNow / Shutdown over an mpsc command channel              │   │
//! │  │ Publishes snapshots behind Arc<RwLock<_>> for any reader        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - TOML configuration with env overrides
//! - [`dashboard`] - Snapshot queries and the background refresher
//! - [`error`] - Service error type wrapping core/db/receipt/config errors
//! - [`receipt`] - Coupon rendering and printer backends
//! - [`service`] - The `PosService` facade
//!
//! ## Usage
//! ```rust,ignore
//! use mercadinho_db::{Database, DbConfig};
//! use mercadinho_pos::{DashboardRefresher, FileReceiptPrinter, PosConfig, PosService};
//!
//! mercadinho_pos::init_tracing();
//!
//! let config = PosConfig::load_or_default(None);
//! let db = Database::new(DbConfig::new(config.database.path.clone())).await?;
//!
//! let printer = FileReceiptPrinter::new(config.receipt.output_dir.clone());
//! let service = PosService::new(db.state(), Box::new(printer), config.clone());
//!
//! let dashboard = DashboardRefresher::new(db.state(), config).start();
//!
//! service.add_to_cart("ALI0001", "2").await?;
//! let order = service.checkout(Default::default()).await?;
//! println!("Sale {} recorded", order.number);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod dashboard;
pub mod error;
pub mod receipt;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{
    ConfigError, ConfigResult, DashboardSettings, DatabaseSettings, InventorySettings, PosConfig,
    ReceiptSettings, StoreInfo,
};
pub use dashboard::{DashboardHandle, DashboardRefresher, DashboardSnapshot};
pub use error::{PosError, PosResult};
pub use receipt::{
    FileReceiptPrinter, NoOpReceiptPrinter, ReceiptError, ReceiptPrinter, ReceiptResult,
    RenderedReceipt,
};
pub use service::{CartView, CheckoutInput, PosService};

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// Call once from the embedding binary before anything else logs.
/// Subsequent calls are no-ops, so tests can call it freely.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=mercadinho_pos=trace` - Trace the service layer only
/// - Default: INFO, with sqlx query noise capped at WARN
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mercadinho=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_tracing_twice_is_harmless() {
        super::init_tracing();
        super::init_tracing();
    }
}
