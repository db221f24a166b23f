//! stellarx - Stellar network explorer
//!
//! Library side of the `stellarx` terminal explorer: Horizon and Soroban RPC
//! clients, the operation normaliser and formatter, paginated fetch loops,
//! order-book maths and one controller per route.
//!
//! ## Architecture
//!
//! - **Data**: `horizon`, `contract` (Soroban RPC), `paging`, `types`
//! - **Domain**: `operation`, `render`, `data_value`, `orderbook`,
//!   `counter_assets`, `account`, `year_stats`, `trades`
//! - **Views**: `views::*` turn a route into a `ViewModel`
//! - **Terminal**: `app`, `ui` and the `stellarx` binary (feature `native`)
//!
//! ## Usage
//!
//! ```bash
//! cargo run -- /account/GA...        # terminal UI at a route
//! cargo run -- --print /ledger/5     # render once to stdout
//! ```

// Codecs and data model
pub mod asset;
pub mod data_value;
pub mod error;
pub mod strkey;
pub mod types;
pub mod util_text;

// Operation normalising and formatting
pub mod i18n;
pub mod operation;
pub mod render;

// Network clients and pagination
pub mod contract;
pub mod horizon;
pub mod net;
pub mod paging;

// Domain logic
pub mod account;
pub mod counter_assets;
pub mod orderbook;
pub mod trades;
pub mod year_stats;

// Routing, search and views
pub mod router;
pub mod search;
pub mod views;

// Terminal application
pub mod app;
pub mod config;
pub mod theme;
pub mod ui;

// SQLite preferences (native-only)
#[cfg(feature = "native")]
pub mod prefs;

pub use error::{Result, StellarxError};
