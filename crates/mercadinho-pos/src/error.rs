//! # Service Error Types
//!
//! Error types for the POS service layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Service Error Sources                              │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │ mercadinho-core │  │ mercadinho-db   │  │ mercadinho-pos          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ CoreError       │  │ DbError         │  │ ReceiptError            │ │
//! │  │ (business rule  │  │ (SQLite,        │  │ ConfigError             │ │
//! │  │  violations)    │  │  serialization) │  │ ChannelClosed           │ │
//! │  └────────┬────────┘  └────────┬────────┘  └────────────┬────────────┘ │
//! │           │                    │                        │              │
//! │           └────────────────────┼────────────────────────┘              │
//! │                                ▼                                       │
//! │                            PosError                                    │
//! │                     (what the caller sees)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Core errors are operator-facing ("Insufficient stock"); everything else
//! is infrastructure and belongs in the log, not on the till screen.

use thiserror::Error;

use crate::config::ConfigError;
use crate::receipt::ReceiptError;
use mercadinho_core::CoreError;
use mercadinho_db::DbError;

/// Result type alias for service operations.
pub type PosResult<T> = Result<T, PosError>;

/// Service error covering every failure a POS operation can surface.
#[derive(Debug, Error)]
pub enum PosError {
    /// Business rule violation from the core (insufficient stock,
    /// empty cart, closed edit window, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// State store failure (connection, query, corrupt document).
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Receipt rendering or printing failure.
    ///
    /// Checkout swallows this one deliberately: the sale is already
    /// recorded by the time the printer runs.
    #[error("Receipt error: {0}")]
    Receipt(#[from] ReceiptError),

    /// Configuration load, save or validation failure.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A background task channel is closed (refresher already shut down).
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl PosError {
    /// Returns true if this error should be shown to the operator
    /// rather than logged as an infrastructure failure.
    pub fn is_user_error(&self) -> bool {
        matches!(self, PosError::Core(_))
    }
}
