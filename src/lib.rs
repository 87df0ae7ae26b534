//! TradeTracker: a personal trading journal engine.
//!
//! The heart of the crate is [`engine`], a pure, stateless computation core
//! that turns a filtered snapshot of trade records into aggregate statistics
//! (win rate, profit factor, drawdown) and a chronological equity curve.
//! [`db`] persists the trade store and settings in sqlite, and [`commands`]
//! wires the two together: each operation loads a snapshot, applies the live
//! filter once, and hands the working set to the engine.

pub mod commands;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;

pub use db::Database;
pub use engine::equity::{EquityCurve, EquityPoint};
pub use engine::profile::{RecentTrend, TraderProfile};
pub use engine::stats::TradeStats;
pub use error::JournalError;
pub use models::{Settings, Trade, TradeFilter, TradeInput, TradeType, UpdateSettingsInput};
