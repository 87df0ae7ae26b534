use crate::db::Database;
use crate::error::JournalError;
use crate::models::{Settings, UpdateSettingsInput};

pub fn get_settings(db: &Database) -> Result<Settings, JournalError> {
    let conn = db.conn.lock().map_err(|_| JournalError::LockPoisoned)?;

    let settings = conn.query_row(
        "SELECT id, initial_capital, theme, language, created_at, updated_at
         FROM settings WHERE id = 1",
        [],
        |row| {
            Ok(Settings {
                id: row.get(0)?,
                initial_capital: row.get(1)?,
                theme: row.get(2)?,
                language: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        },
    )?;

    Ok(settings)
}

pub fn update_settings(db: &Database, input: UpdateSettingsInput) -> Result<Settings, JournalError> {
    if let Some(capital) = input.initial_capital {
        if !capital.is_finite() || capital < 0.0 {
            return Err(JournalError::InvalidInput(
                "initial capital must be a non-negative number".to_string(),
            ));
        }
    }
    if let Some(theme) = &input.theme {
        if theme != "light" && theme != "dark" {
            return Err(JournalError::InvalidInput(format!("unknown theme: {}", theme)));
        }
    }
    if let Some(language) = &input.language {
        if language != "ar" && language != "en" {
            return Err(JournalError::InvalidInput(format!(
                "unknown language: {}",
                language
            )));
        }
    }

    {
        let conn = db.conn.lock().map_err(|_| JournalError::LockPoisoned)?;

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(val) = input.initial_capital {
            updates.push("initial_capital = ?");
            values.push(Box::new(val));
        }
        if let Some(val) = input.theme {
            updates.push("theme = ?");
            values.push(Box::new(val));
        }
        if let Some(val) = input.language {
            updates.push("language = ?");
            values.push(Box::new(val));
        }

        updates.push("updated_at = strftime('%s', 'now')");

        let query = format!("UPDATE settings SET {} WHERE id = 1", updates.join(", "));
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        conn.execute(&query, params.as_slice())?;
    }

    get_settings(db)
}
