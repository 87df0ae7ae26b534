use crate::models::{Trade, TradeFilter};

/// True iff the trade passes every active constraint of the filter.
///
/// Symbol and strategy are case-insensitive substring matches. Date bounds
/// compare lexicographically, which equals chronological order for
/// zero-padded `YYYY-MM-DD` dates.
pub fn matches_filter(trade: &Trade, filter: &TradeFilter) -> bool {
    if !filter.symbol.is_empty()
        && !trade
            .symbol
            .to_lowercase()
            .contains(&filter.symbol.to_lowercase())
    {
        return false;
    }
    // A trade with an empty strategy never matches a non-empty strategy
    // filter.
    if !filter.strategy.is_empty()
        && !trade
            .strategy
            .to_lowercase()
            .contains(&filter.strategy.to_lowercase())
    {
        return false;
    }
    if !filter.from.is_empty() && trade.date.as_str() < filter.from.as_str() {
        return false;
    }
    if !filter.to.is_empty() && trade.date.as_str() > filter.to.as_str() {
        return false;
    }
    true
}

/// Narrows a trade snapshot to the working set for all downstream
/// computation. Compute this once per filter-state change and reuse it.
pub fn apply_filter(trades: &[Trade], filter: &TradeFilter) -> Vec<Trade> {
    trades
        .iter()
        .filter(|t| matches_filter(t, filter))
        .cloned()
        .collect()
}
