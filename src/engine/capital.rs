use crate::engine::stats::TradeStats;

/// Current capital is the user-set initial capital plus the total P&L of the
/// currently *filtered* set, so the capital display follows the live filter.
pub fn current_capital(initial_capital: f64, stats: &TradeStats) -> f64 {
    initial_capital + stats.total_pnl
}
