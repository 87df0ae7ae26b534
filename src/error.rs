use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV export failed: {0}")]
    CsvExport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Trade not found: {0}")]
    TradeNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
