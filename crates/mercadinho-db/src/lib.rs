//! # mercadinho-db: Persistence Layer for Mercadinho POS
//!
//! SQLite-backed storage for the mini-market POS. The whole POS state
//! lives as JSON documents in one key/value table, accessed through a
//! typed store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Mercadinho POS Data Flow                            │
//! │                                                                         │
//! │  PosService (load → mutate → persist)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  mercadinho-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  StateStore   │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  (store.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ KvRepository  │    │ 001_kv_store │  │   │
//! │  │   │ WAL + NORMAL  │    │  (kv.rs)      │    │     .sql     │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │            kv_store(key, value, updated_at)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`kv`] - Raw key/value repository
//! - [`store`] - Typed state load/persist (the main entry point)
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mercadinho_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/mercadinho.db")).await?;
//!
//! let store = db.state();
//! let mut state = store.load_state().await?;
//! // ... apply core operations to `state` ...
//! store.persist_state(&state).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use kv::KvRepository;
pub use pool::{Database, DbConfig};
pub use store::StateStore;
