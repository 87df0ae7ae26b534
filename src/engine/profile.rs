use serde::{Deserialize, Serialize};

use crate::models::Trade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecentTrend {
    Winning,
    Losing,
    Neutral,
}

/// Behavioral summary fed to the AI coach as context. Deterministic, unlike
/// the narrative text built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderProfile {
    /// Whole-percent win rate (coarser than the dashboard's 1-decimal rate).
    pub win_rate: f64,
    pub total_trades: i32,
    pub best_pair: String,
    pub worst_pair: String,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub recent_trend: RecentTrend,
}

/// Profiles a trade snapshot: per-symbol P&L ranking, average win/loss and
/// the trend over the 5 most recent trades. Expects the store's newest-first
/// order.
pub fn analyze_trader_profile(trades: &[Trade]) -> TraderProfile {
    if trades.is_empty() {
        return TraderProfile {
            win_rate: 0.0,
            total_trades: 0,
            best_pair: "None".to_string(),
            worst_pair: "None".to_string(),
            avg_win: 0.0,
            avg_loss: 0.0,
            recent_trend: RecentTrend::Neutral,
        };
    }

    let wins: Vec<&Trade> = trades.iter().filter(|t| t.pnl > 0.0).collect();
    let losses: Vec<&Trade> = trades.iter().filter(|t| t.pnl < 0.0).collect();

    // Per-symbol totals, first-seen order preserved so ties rank stably.
    let mut pair_stats: Vec<(String, f64)> = Vec::new();
    for trade in trades {
        match pair_stats.iter_mut().find(|(s, _)| *s == trade.symbol) {
            Some((_, pnl)) => *pnl += trade.pnl,
            None => pair_stats.push((trade.symbol.clone(), trade.pnl)),
        }
    }
    pair_stats.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let best_pair = pair_stats.first().map(|(s, _)| s.clone()).unwrap_or_else(|| "None".to_string());
    let worst_pair = pair_stats.last().map(|(s, _)| s.clone()).unwrap_or_else(|| "None".to_string());

    let last5 = &trades[..trades.len().min(5)];
    let recent_wins = last5.iter().filter(|t| t.pnl > 0.0).count();
    let mut recent_trend = RecentTrend::Neutral;
    if recent_wins >= 4 {
        recent_trend = RecentTrend::Winning;
    }
    if recent_wins <= 1 && last5.len() >= 3 {
        recent_trend = RecentTrend::Losing;
    }

    let avg_win = if wins.is_empty() {
        0.0
    } else {
        wins.iter().map(|t| t.pnl).sum::<f64>() / wins.len() as f64
    };
    let avg_loss = if losses.is_empty() {
        0.0
    } else {
        (losses.iter().map(|t| t.pnl).sum::<f64>() / losses.len() as f64).abs()
    };

    TraderProfile {
        win_rate: (wins.len() as f64 / trades.len() as f64 * 100.0).round(),
        total_trades: trades.len() as i32,
        best_pair,
        worst_pair,
        avg_win,
        avg_loss,
        recent_trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradeType;

    fn trade(symbol: &str, pnl: f64) -> Trade {
        Trade {
            id: format!("T-{}-{}", symbol, pnl),
            date: "2024-01-01".to_string(),
            time: None,
            symbol: symbol.to_string(),
            trade_type: TradeType::Long,
            entry: None,
            exit: None,
            size: None,
            stop_loss: None,
            take_profit: None,
            pnl,
            strategy: String::new(),
            notes: String::new(),
            entry_reason: None,
            emotions: None,
            screenshot: None,
            ai_analysis: None,
        }
    }

    #[test]
    fn empty_profile_is_neutral() {
        let profile = analyze_trader_profile(&[]);
        assert_eq!(profile.total_trades, 0);
        assert_eq!(profile.best_pair, "None");
        assert_eq!(profile.recent_trend, RecentTrend::Neutral);
    }

    #[test]
    fn ranks_pairs_by_summed_pnl() {
        let trades = vec![
            trade("EURUSD", 100.0),
            trade("GBPUSD", -80.0),
            trade("EURUSD", 50.0),
            trade("XAUUSD", 10.0),
        ];
        let profile = analyze_trader_profile(&trades);
        assert_eq!(profile.best_pair, "EURUSD");
        assert_eq!(profile.worst_pair, "GBPUSD");
        assert_eq!(profile.total_trades, 4);
        assert_eq!(profile.win_rate, 75.0);
    }

    #[test]
    fn average_win_and_loss() {
        let trades = vec![trade("EURUSD", 30.0), trade("EURUSD", 10.0), trade("EURUSD", -40.0)];
        let profile = analyze_trader_profile(&trades);
        assert_eq!(profile.avg_win, 20.0);
        assert_eq!(profile.avg_loss, 40.0);
    }

    #[test]
    fn four_recent_wins_is_a_winning_trend() {
        let trades = vec![
            trade("A", 1.0),
            trade("A", 2.0),
            trade("A", 3.0),
            trade("A", 4.0),
            trade("A", -1.0),
            trade("A", -100.0), // outside the 5 most recent
        ];
        assert_eq!(analyze_trader_profile(&trades).recent_trend, RecentTrend::Winning);
    }

    #[test]
    fn one_win_in_recent_trades_is_a_losing_trend() {
        let trades = vec![trade("A", 1.0), trade("A", -2.0), trade("A", -3.0)];
        assert_eq!(analyze_trader_profile(&trades).recent_trend, RecentTrend::Losing);
    }

    #[test]
    fn two_trades_are_not_enough_for_a_losing_trend() {
        let trades = vec![trade("A", -1.0), trade("A", -2.0)];
        assert_eq!(analyze_trader_profile(&trades).recent_trend, RecentTrend::Neutral);
    }
}
