use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::JournalError;

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

impl Migration {
    pub fn new(version: u32, name: &'static str, sql: &'static str) -> Self {
        Self { version, name, sql }
    }

    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.sql.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

pub struct MigrationRunner {
    migrations: Vec<Migration>,
}

impl MigrationRunner {
    pub fn new() -> Self {
        Self {
            migrations: Self::collect_migrations(),
        }
    }

    fn collect_migrations() -> Vec<Migration> {
        vec![
            Migration::new(
                1,
                "initial_schema",
                include_str!("migrations/001_initial_schema.sql"),
            ),
            Migration::new(
                2,
                "add_ai_analysis",
                include_str!("migrations/002_add_ai_analysis.sql"),
            ),
        ]
    }

    #[cfg(test)]
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    fn has_schema_migrations_table(&self, conn: &Connection) -> Result<bool, JournalError> {
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_migrations'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn ensure_schema_migrations_table(&self, conn: &Connection) -> Result<(), JournalError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at INTEGER NOT NULL,
                checksum TEXT,
                execution_time_ms INTEGER
            )",
        )?;
        Ok(())
    }

    pub fn get_current_version(&self, conn: &Connection) -> Result<Option<u32>, JournalError> {
        if !self.has_schema_migrations_table(conn)? {
            return Ok(None);
        }

        let version: Option<u32> = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .optional()?
            .flatten();

        Ok(version)
    }

    pub fn run_pending_migrations(
        &self,
        conn: &Connection,
        db_path: &str,
    ) -> Result<usize, JournalError> {
        self.ensure_schema_migrations_table(conn)?;

        let current_version = self.get_current_version(conn)?;

        let pending: Vec<&Migration> = self
            .migrations
            .iter()
            .filter(|m| match current_version {
                Some(v) => m.version > v,
                None => true,
            })
            .collect();

        if pending.is_empty() {
            return Ok(0);
        }

        log::info!("Found {} pending migrations", pending.len());

        // Back up file-backed databases before touching the schema. A failed
        // backup is logged but does not block the migration of a fresh file.
        if db_path != ":memory:" && Path::new(db_path).exists() && current_version.is_some() {
            let target_version = pending[pending.len() - 1].version;
            match self.create_backup(db_path, target_version) {
                Ok(path) => log::info!("Backup created: {}", path.display()),
                Err(e) => log::warn!("Could not create pre-migration backup: {}", e),
            }
        }

        let mut applied = 0;
        for migration in pending {
            match self.apply_migration(conn, migration) {
                Ok(_) => {
                    applied += 1;
                    log::info!("Applied migration {}: {}", migration.version, migration.name);
                }
                Err(e) => {
                    log::error!("Migration {} failed: {}", migration.version, e);
                    log::error!("Database rolled back to before this migration.");
                    return Err(e);
                }
            }
        }

        Ok(applied)
    }

    fn apply_migration(&self, conn: &Connection, migration: &Migration) -> Result<(), JournalError> {
        let start = SystemTime::now();

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)?;

        let execution_time = start.elapsed().map(|d| d.as_millis() as i64).unwrap_or(0);
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at, checksum, execution_time_ms)
             VALUES (?, ?, ?, ?, ?)",
            params![
                migration.version,
                migration.name,
                current_timestamp(),
                migration.checksum(),
                execution_time
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Compares stored checksums against the compiled-in migration SQL. A
    /// mismatch means a migration file changed after it was applied.
    pub fn verify_migrations(&self, conn: &Connection) -> Result<(), JournalError> {
        let mut stmt = conn.prepare(
            "SELECT version, name, checksum FROM schema_migrations
             WHERE checksum IS NOT NULL ORDER BY version",
        )?;

        let applied: Vec<(u32, String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        for (version, name, stored_checksum) in applied {
            if let Some(migration) = self.migrations.iter().find(|m| m.version == version) {
                let expected_checksum = migration.checksum();
                if stored_checksum != expected_checksum {
                    log::error!("Checksum mismatch for migration {} ({})", version, name);
                    log::error!("Expected: {}", expected_checksum);
                    log::error!("Actual:   {}", stored_checksum);
                    return Err(JournalError::Migration(format!(
                        "checksum mismatch for migration {} ({})",
                        version, name
                    )));
                }
            }
        }

        Ok(())
    }

    fn create_backup(&self, db_path: &str, target_version: u32) -> Result<PathBuf, JournalError> {
        let db_path_buf = PathBuf::from(db_path);
        let db_dir = db_path_buf
            .parent()
            .ok_or_else(|| JournalError::Migration(format!("invalid database path: {}", db_path)))?;

        let backup_dir = db_dir.join("backups");
        std::fs::create_dir_all(&backup_dir)
            .map_err(|e| JournalError::Migration(format!("failed to create backup dir: {}", e)))?;

        let backup_name = format!("pre_migration_v{}_{}.db", target_version, current_timestamp());
        let backup_path = backup_dir.join(&backup_name);

        let src = Connection::open(db_path)?;
        let mut dst = Connection::open(&backup_path)?;
        {
            let backup = rusqlite::backup::Backup::new(&src, &mut dst)?;
            backup.run_to_completion(5, std::time::Duration::from_millis(250), None)?;
        }

        Ok(backup_path)
    }
}

impl Default for MigrationRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
