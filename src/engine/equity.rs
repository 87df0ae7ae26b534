use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Trade;

/// One point of the cumulative P&L series; one point is emitted per trade,
/// so multiple trades on the same date produce multiple points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: String,
    #[serde(rename = "cumulativePnL")]
    pub cumulative_pnl: f64,
    #[serde(rename = "dailyPnL")]
    pub daily_pnl: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    pub points: Vec<EquityPoint>,
    #[serde(rename = "maxDrawdown")]
    pub max_drawdown: f64,
}

fn parse_trade_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Builds the chronological cumulative P&L series and the maximum drawdown
/// for an already-filtered snapshot.
///
/// The sort is stable, so trades sharing a date keep their original relative
/// order (the store is newest-first). Dates are parsed as calendar dates;
/// unparseable dates order before all valid ones.
pub fn build_equity_curve(trades: &[Trade]) -> EquityCurve {
    if trades.is_empty() {
        return EquityCurve::default();
    }

    let mut timeline: Vec<&Trade> = trades.iter().collect();
    timeline.sort_by_key(|t| parse_trade_date(&t.date));

    let mut points = Vec::with_capacity(timeline.len());
    let mut cumulative = 0.0;
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0f64;

    for trade in timeline {
        cumulative += trade.pnl;
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = peak - cumulative;
        if drawdown > max_dd {
            max_dd = drawdown;
        }
        points.push(EquityPoint {
            date: trade.date.clone(),
            cumulative_pnl: cumulative,
            daily_pnl: trade.pnl,
        });
    }

    EquityCurve {
        points,
        max_drawdown: if max_dd > 0.0 { -max_dd } else { 0.0 },
    }
}

/// Maximum drawdown of the snapshot: zero or negative, zero iff the
/// cumulative curve never declines.
pub fn max_drawdown(trades: &[Trade]) -> f64 {
    build_equity_curve(trades).max_drawdown
}
