//! banca — blackjack-table betting ledger
//!
//! Library crate exposing the settlement engine, the session that owns
//! table state, and the HTTP surface used by the binary and integration tests.

pub mod config;
pub mod types;
pub mod engine;
pub mod session;
pub mod display;
pub mod server;
