use crate::commands::{settings, trades};
use crate::db::Database;
use crate::engine::capital::current_capital;
use crate::engine::equity::{build_equity_curve, EquityCurve};
use crate::engine::profile::{analyze_trader_profile, TraderProfile};
use crate::engine::stats::{compute_stats, TradeStats};
use crate::error::JournalError;
use crate::models::TradeFilter;

/// Dashboard metrics over the filtered store. Recomputed from scratch on
/// every call; the engine keeps no state between calls.
pub fn get_dashboard_stats(db: &Database, filter: &TradeFilter) -> Result<TradeStats, JournalError> {
    let filtered = trades::get_trades(db, Some(filter))?;
    Ok(compute_stats(&filtered))
}

pub fn get_equity_curve(db: &Database, filter: &TradeFilter) -> Result<EquityCurve, JournalError> {
    let filtered = trades::get_trades(db, Some(filter))?;
    Ok(build_equity_curve(&filtered))
}

/// Initial capital plus the *filtered* total P&L. The capital display
/// deliberately follows the live filter rather than all-time P&L.
pub fn get_current_capital(db: &Database, filter: &TradeFilter) -> Result<f64, JournalError> {
    let settings = settings::get_settings(db)?;
    let stats = get_dashboard_stats(db, filter)?;
    Ok(current_capital(settings.initial_capital, &stats))
}

/// Deterministic coaching context for the AI narrative collaborator.
pub fn get_trader_profile(db: &Database, filter: &TradeFilter) -> Result<TraderProfile, JournalError> {
    let filtered = trades::get_trades(db, Some(filter))?;
    Ok(analyze_trader_profile(&filtered))
}
