use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::Path;

/// Default database file, same one the original deployment used.
pub const DEFAULT_DB_PATH: &str = "pg_accounts.db";

/// Open (or create) the database file and make sure the schema exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {:?}", path))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // The bundled SQLite enforces foreign keys by default; the documented
    // policy is tolerate-orphan (deletes are unguarded, dangling references
    // degrade to zero/null on read), so keep enforcement off.
    conn.pragma_update(None, "foreign_keys", "OFF")?;

    // ==========================================================================
    // Rooms Table
    // status: vacant | occupied | maintenance
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS rooms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            rent REAL NOT NULL,
            deposit REAL DEFAULT 0,
            status TEXT DEFAULT 'vacant'
        )",
        [],
    )?;

    // ==========================================================================
    // Tenants Table
    // room_id carries no cascade: deleting a room leaves the reference
    // dangling, and every read path degrades it to rent 0 / no room name.
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tenants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            phone TEXT,
            email TEXT,
            room_id INTEGER,
            join_date TEXT,
            leave_date TEXT,
            deposit_paid REAL DEFAULT 0,
            FOREIGN KEY(room_id) REFERENCES rooms(id)
        )",
        [],
    )?;

    // ==========================================================================
    // Payments Table
    // (month, year) is the billing period the payment is credited against.
    // It is independent of `date` - a late payment can be tagged retroactively.
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tenant_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            kind TEXT NOT NULL,
            notes TEXT,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            FOREIGN KEY(tenant_id) REFERENCES tenants(id)
        )",
        [],
    )?;

    // ==========================================================================
    // Expenses Table (not tied to any tenant or room)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT,
            vendor TEXT,
            notes TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_period ON payments(year, month)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_tenant ON payments(tenant_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    Ok(())
}

/// Read the whole database file as an opaque backup blob.
///
/// With WAL journaling, committed data sits in the `-wal` sidecar until a
/// checkpoint, so the main file alone can be stale (or, on a fresh database,
/// missing the schema entirely). Checkpoint through the live connection
/// first, then read the file.
pub fn backup_database(conn: &Connection, path: &Path) -> Result<Vec<u8>> {
    conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_row| Ok(()))?;
    fs::read(path).with_context(|| format!("Failed to read database at {:?}", path))
}

/// Overwrite the database file from a previously downloaded backup blob.
/// Callers must not hold an open connection on `path` while restoring.
pub fn restore_database(path: &Path, blob: &[u8]) -> Result<()> {
    fs::write(path, blob).with_context(|| format!("Failed to restore database at {:?}", path))?;

    // A leftover WAL/SHM pair from the replaced file must not be replayed
    // over the restored blob on next open.
    for suffix in ["-wal", "-shm"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        let sidecar = std::path::PathBuf::from(name);
        if sidecar.exists() {
            fs::remove_file(&sidecar)
                .with_context(|| format!("Failed to remove stale sidecar {:?}", sidecar))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        setup_database(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN
                 ('rooms', 'tenants', 'payments', 'expenses')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 4, "All four tables should exist");
    }

    #[test]
    fn test_backup_restore_roundtrip() {
        let dir = std::env::temp_dir().join("pg_accounting_backup_test");
        fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("test.db");
        let _ = fs::remove_file(&db_path);

        let blob;
        {
            let conn = open_database(&db_path).unwrap();
            conn.execute(
                "INSERT INTO rooms(name, rent, deposit, status) VALUES ('101', 5000, 0, 'vacant')",
                [],
            )
            .unwrap();
            blob = backup_database(&conn, &db_path).unwrap();
        }
        assert!(!blob.is_empty());

        let restored_path = dir.join("restored.db");
        restore_database(&restored_path, &blob).unwrap();

        let conn = Connection::open(&restored_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_backup_with_open_connection_includes_wal_data() {
        let dir = std::env::temp_dir().join("pg_accounting_wal_backup_test");
        fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("live.db");
        let _ = fs::remove_file(&db_path);

        // Connection stays open for the whole backup, the way the server
        // holds one: recent commits live only in the WAL sidecar here.
        let conn = open_database(&db_path).unwrap();
        conn.execute(
            "INSERT INTO rooms(name, rent, deposit, status) VALUES ('101', 5000, 0, 'vacant')",
            [],
        )
        .unwrap();

        let blob = backup_database(&conn, &db_path).unwrap();

        let restored_path = dir.join("restored.db");
        restore_database(&restored_path, &blob).unwrap();

        let restored = Connection::open(&restored_path).unwrap();
        let count: i64 = restored
            .query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1, "Backup must contain data still in the WAL");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_restore_clears_stale_sidecars() {
        let dir = std::env::temp_dir().join("pg_accounting_restore_sidecar_test");
        fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("target.db");

        let blob;
        {
            let conn = open_database(&db_path).unwrap();
            conn.execute(
                "INSERT INTO rooms(name, rent, deposit, status) VALUES ('101', 5000, 0, 'vacant')",
                [],
            )
            .unwrap();
            blob = backup_database(&conn, &db_path).unwrap();
        }

        // Plant leftover sidecars as if the replaced file was mid-WAL
        fs::write(dir.join("target.db-wal"), b"stale").unwrap();
        fs::write(dir.join("target.db-shm"), b"stale").unwrap();

        restore_database(&db_path, &blob).unwrap();
        assert!(!dir.join("target.db-wal").exists());
        assert!(!dir.join("target.db-shm").exists());

        let conn = Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let _ = fs::remove_dir_all(&dir);
    }
}
