use chrono::Utc;
use rusqlite::Connection;

use crate::db::Database;
use crate::engine::filter::apply_filter;
use crate::error::JournalError;
use crate::models::{Trade, TradeFilter, TradeInput, TradeType};

/// Maps a database row to a Trade; column order must match [`TRADE_COLUMNS`].
fn map_row_to_trade(row: &rusqlite::Row) -> rusqlite::Result<Trade> {
    let trade_type: String = row.get(4)?;
    Ok(Trade {
        id: row.get(0)?,
        date: row.get(1)?,
        time: row.get(2)?,
        symbol: row.get(3)?,
        trade_type: TradeType::parse(&trade_type).unwrap_or(TradeType::Long),
        entry: row.get(5)?,
        exit: row.get(6)?,
        size: row.get(7)?,
        stop_loss: row.get(8)?,
        take_profit: row.get(9)?,
        pnl: row.get(10)?,
        strategy: row.get(11)?,
        notes: row.get(12)?,
        entry_reason: row.get(13)?,
        emotions: row.get(14)?,
        screenshot: row.get(15)?,
        ai_analysis: row.get(16)?,
    })
}

const TRADE_COLUMNS: &str = "id, date, time, symbol, trade_type, entry, exit_price, size, \
     stop_loss, take_profit, pnl, strategy, notes, entry_reason, emotions, screenshot, ai_analysis";

pub(crate) fn load_trades(conn: &Connection) -> Result<Vec<Trade>, JournalError> {
    // Newest-first: created trades prepend, imports land ahead of older rows.
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM trades ORDER BY rowid DESC",
        TRADE_COLUMNS
    ))?;
    let trades = stmt
        .query_map([], map_row_to_trade)?
        .collect::<Result<Vec<Trade>, _>>()?;
    Ok(trades)
}

/// The full store newest-first, optionally narrowed by the live filter.
pub fn get_trades(db: &Database, filter: Option<&TradeFilter>) -> Result<Vec<Trade>, JournalError> {
    let conn = db.conn.lock().map_err(|_| JournalError::LockPoisoned)?;
    let trades = load_trades(&conn)?;
    Ok(match filter {
        Some(f) => apply_filter(&trades, f),
        None => trades,
    })
}

pub fn get_trade(db: &Database, id: &str) -> Result<Trade, JournalError> {
    let conn = db.conn.lock().map_err(|_| JournalError::LockPoisoned)?;
    conn.query_row(
        &format!("SELECT {} FROM trades WHERE id = ?", TRADE_COLUMNS),
        [id],
        map_row_to_trade,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => JournalError::TradeNotFound(id.to_string()),
        other => JournalError::Database(other),
    })
}

pub(crate) fn mint_trade_id() -> String {
    format!("TRADE-{}-{}", Utc::now().timestamp_millis(), uuid::Uuid::new_v4())
}

fn validate_input(input: &TradeInput) -> Result<(), JournalError> {
    if input.date.trim().is_empty() {
        return Err(JournalError::InvalidInput("date is required".to_string()));
    }
    if input.symbol.trim().is_empty() {
        return Err(JournalError::InvalidInput("symbol is required".to_string()));
    }
    if !input.pnl.is_finite() {
        return Err(JournalError::InvalidInput(
            "pnl must be a finite number".to_string(),
        ));
    }
    Ok(())
}

pub fn create_trade(db: &Database, input: TradeInput) -> Result<Trade, JournalError> {
    validate_input(&input)?;

    let id = mint_trade_id();
    {
        let conn = db.conn.lock().map_err(|_| JournalError::LockPoisoned)?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO trades (
                id, date, time, symbol, trade_type, entry, exit_price, size,
                stop_loss, take_profit, pnl, strategy, notes, entry_reason,
                emotions, screenshot, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                id,
                input.date,
                input.time,
                input.symbol,
                input.trade_type.as_str(),
                input.entry,
                input.exit,
                input.size,
                input.stop_loss,
                input.take_profit,
                input.pnl,
                input.strategy,
                input.notes,
                input.entry_reason,
                input.emotions,
                input.screenshot,
                now,
                now
            ],
        )?;
    }

    log::debug!("Created trade {}", id);
    get_trade(db, &id)
}

/// Replaces every stored field except `id` and `ai_analysis`; the cached
/// analysis survives an edit and only changes through [`attach_analysis`].
pub fn update_trade(db: &Database, id: &str, input: TradeInput) -> Result<Trade, JournalError> {
    validate_input(&input)?;

    {
        let conn = db.conn.lock().map_err(|_| JournalError::LockPoisoned)?;
        let now = Utc::now().timestamp();

        let changed = conn.execute(
            "UPDATE trades SET
                date = ?, time = ?, symbol = ?, trade_type = ?, entry = ?,
                exit_price = ?, size = ?, stop_loss = ?, take_profit = ?,
                pnl = ?, strategy = ?, notes = ?, entry_reason = ?,
                emotions = ?, screenshot = ?, updated_at = ?
             WHERE id = ?",
            rusqlite::params![
                input.date,
                input.time,
                input.symbol,
                input.trade_type.as_str(),
                input.entry,
                input.exit,
                input.size,
                input.stop_loss,
                input.take_profit,
                input.pnl,
                input.strategy,
                input.notes,
                input.entry_reason,
                input.emotions,
                input.screenshot,
                now,
                id
            ],
        )?;

        if changed == 0 {
            return Err(JournalError::TradeNotFound(id.to_string()));
        }
    }

    get_trade(db, id)
}

/// Stores opaque AI commentary on the trade; the engine never parses it.
pub fn attach_analysis(db: &Database, id: &str, analysis: &str) -> Result<Trade, JournalError> {
    {
        let conn = db.conn.lock().map_err(|_| JournalError::LockPoisoned)?;
        let changed = conn.execute(
            "UPDATE trades SET ai_analysis = ?, updated_at = ? WHERE id = ?",
            rusqlite::params![analysis, Utc::now().timestamp(), id],
        )?;
        if changed == 0 {
            return Err(JournalError::TradeNotFound(id.to_string()));
        }
    }
    get_trade(db, id)
}

pub fn delete_trade(db: &Database, id: &str) -> Result<(), JournalError> {
    let conn = db.conn.lock().map_err(|_| JournalError::LockPoisoned)?;
    let deleted = conn.execute("DELETE FROM trades WHERE id = ?", [id])?;
    if deleted == 0 {
        return Err(JournalError::TradeNotFound(id.to_string()));
    }
    Ok(())
}

pub fn delete_all_trades(db: &Database) -> Result<usize, JournalError> {
    let conn = db.conn.lock().map_err(|_| JournalError::LockPoisoned)?;
    let count = conn.execute("DELETE FROM trades", [])?;
    log::info!("Cleared {} trades", count);
    Ok(count)
}

/// Overwrites the whole store with `trades` given newest-first, preserving
/// that order on the next load.
pub fn replace_all_trades(db: &Database, trades: &[Trade]) -> Result<(), JournalError> {
    let conn = db.conn.lock().map_err(|_| JournalError::LockPoisoned)?;
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM trades", [])?;

    let now = Utc::now().timestamp();
    // Insert oldest-first so rowid DESC reproduces the given order.
    for trade in trades.iter().rev() {
        tx.execute(
            "INSERT INTO trades (
                id, date, time, symbol, trade_type, entry, exit_price, size,
                stop_loss, take_profit, pnl, strategy, notes, entry_reason,
                emotions, screenshot, ai_analysis, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                trade.id,
                trade.date,
                trade.time,
                trade.symbol,
                trade.trade_type.as_str(),
                trade.entry,
                trade.exit,
                trade.size,
                trade.stop_loss,
                trade.take_profit,
                trade.pnl,
                trade.strategy,
                trade.notes,
                trade.entry_reason,
                trade.emotions,
                trade.screenshot,
                trade.ai_analysis,
                now,
                now
            ],
        )?;
    }

    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn input(symbol: &str, pnl: f64, date: &str) -> TradeInput {
        TradeInput {
            date: date.to_string(),
            time: None,
            symbol: symbol.to_string(),
            trade_type: TradeType::Long,
            entry: Some(1.105),
            exit: Some(1.110),
            size: None,
            stop_loss: None,
            take_profit: None,
            pnl,
            strategy: "breakout".to_string(),
            notes: String::new(),
            entry_reason: None,
            emotions: None,
            screenshot: None,
        }
    }

    #[test]
    fn create_and_get_roundtrip() {
        let db = test_db();
        let created = create_trade(&db, input("EURUSD", 42.5, "2024-03-01")).unwrap();
        assert!(created.id.starts_with("TRADE-"));
        assert_eq!(created.pnl, 42.5);
        assert_eq!(created.entry, Some(1.105));
        assert_eq!(created.size, None);

        let fetched = get_trade(&db, &created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn store_is_newest_first() {
        let db = test_db();
        let first = create_trade(&db, input("EURUSD", 1.0, "2024-01-01")).unwrap();
        let second = create_trade(&db, input("GBPUSD", 2.0, "2024-01-02")).unwrap();

        let trades = get_trades(&db, None).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].id, second.id);
        assert_eq!(trades[1].id, first.id);
    }

    #[test]
    fn get_trades_applies_the_filter() {
        let db = test_db();
        create_trade(&db, input("EURUSD", 1.0, "2024-01-01")).unwrap();
        create_trade(&db, input("GBPUSD", 2.0, "2024-01-02")).unwrap();

        let filter = TradeFilter {
            symbol: "eur".to_string(),
            ..Default::default()
        };
        let trades = get_trades(&db, Some(&filter)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].symbol, "EURUSD");
    }

    #[test]
    fn update_replaces_fields_but_keeps_analysis() {
        let db = test_db();
        let created = create_trade(&db, input("EURUSD", 10.0, "2024-01-01")).unwrap();
        attach_analysis(&db, &created.id, "overtraded the news").unwrap();

        let mut edit = input("XAUUSD", -5.0, "2024-01-02");
        edit.trade_type = TradeType::Short;
        let updated = update_trade(&db, &created.id, edit).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.symbol, "XAUUSD");
        assert_eq!(updated.pnl, -5.0);
        assert_eq!(updated.trade_type, TradeType::Short);
        assert_eq!(updated.ai_analysis.as_deref(), Some("overtraded the news"));
    }

    #[test]
    fn missing_trade_is_reported() {
        let db = test_db();
        assert!(matches!(
            get_trade(&db, "nope"),
            Err(JournalError::TradeNotFound(_))
        ));
        assert!(matches!(
            update_trade(&db, "nope", input("EURUSD", 0.0, "2024-01-01")),
            Err(JournalError::TradeNotFound(_))
        ));
        assert!(matches!(
            delete_trade(&db, "nope"),
            Err(JournalError::TradeNotFound(_))
        ));
    }

    #[test]
    fn invalid_input_is_rejected_at_the_boundary() {
        let db = test_db();
        assert!(matches!(
            create_trade(&db, input("", 1.0, "2024-01-01")),
            Err(JournalError::InvalidInput(_))
        ));
        assert!(matches!(
            create_trade(&db, input("EURUSD", 1.0, "")),
            Err(JournalError::InvalidInput(_))
        ));
        assert!(matches!(
            create_trade(&db, input("EURUSD", f64::NAN, "2024-01-01")),
            Err(JournalError::InvalidInput(_))
        ));
        assert!(get_trades(&db, None).unwrap().is_empty());
    }

    #[test]
    fn delete_and_clear() {
        let db = test_db();
        let t = create_trade(&db, input("EURUSD", 1.0, "2024-01-01")).unwrap();
        create_trade(&db, input("GBPUSD", 2.0, "2024-01-02")).unwrap();

        delete_trade(&db, &t.id).unwrap();
        assert_eq!(get_trades(&db, None).unwrap().len(), 1);

        assert_eq!(delete_all_trades(&db).unwrap(), 1);
        assert!(get_trades(&db, None).unwrap().is_empty());
    }

    #[test]
    fn replace_all_preserves_given_order() {
        let db = test_db();
        let a = create_trade(&db, input("EURUSD", 1.0, "2024-01-01")).unwrap();
        let b = create_trade(&db, input("GBPUSD", 2.0, "2024-01-02")).unwrap();

        let snapshot = vec![a.clone(), b.clone()];
        replace_all_trades(&db, &snapshot).unwrap();

        let reloaded = get_trades(&db, None).unwrap();
        assert_eq!(reloaded, snapshot);
    }
}
