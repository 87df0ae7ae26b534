use serde::{Deserialize, Serialize};

use crate::engine::equity;
use crate::models::Trade;

/// Aggregate performance metrics for a (filtered) trade collection.
/// Ephemeral: fully recomputed from scratch on every call, never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub trades: i32,
    pub wins: i32,
    pub losses: i32,
    #[serde(rename = "winRate")]
    pub win_rate: f64,
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
    #[serde(rename = "avgPnL")]
    pub avg_pnl: f64,
    #[serde(rename = "profitFactor")]
    pub profit_factor: f64,
    #[serde(rename = "maxDrawdown")]
    pub max_drawdown: f64,
}

/// Round half away from zero at `decimals` places, matching fixed-point
/// display rounding.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Computes [`TradeStats`] over an already-filtered snapshot.
///
/// Win/loss counts and sums iterate the snapshot in its given order
/// (summation is order-independent); max drawdown comes from a separate
/// chronologically sorted pass, since drawdown is order-sensitive.
pub fn compute_stats(trades: &[Trade]) -> TradeStats {
    let mut stats = TradeStats {
        trades: trades.len() as i32,
        ..Default::default()
    };

    if trades.is_empty() {
        return stats;
    }

    let mut gross_profit = 0.0;
    let mut gross_loss = 0.0;

    for trade in trades {
        stats.total_pnl += trade.pnl;
        if trade.pnl > 0.0 {
            stats.wins += 1;
            gross_profit += trade.pnl;
        } else if trade.pnl < 0.0 {
            // Breakeven trades (pnl == 0) count toward neither bucket.
            stats.losses += 1;
            gross_loss += trade.pnl.abs();
        }
    }

    stats.win_rate = round_to(stats.wins as f64 / stats.trades as f64 * 100.0, 1);
    stats.avg_pnl = round_to(stats.total_pnl / stats.trades as f64, 2);
    stats.profit_factor = if gross_loss > 0.0 {
        round_to(gross_profit / gross_loss, 2)
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };
    stats.max_drawdown = equity::max_drawdown(trades);

    stats
}
