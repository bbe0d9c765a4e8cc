//! Local product store for fastprint-sync
//!
//! Categories and statuses are lookup rows resolved by name
//! (find-or-create); products are upserted by their upstream id.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

use crate::models::{ProductRecord, SyncReport};

/// Thread-safe database wrapper
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(path).context("Failed to open database")?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            -- Lookup tables, keyed by name
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS statuses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            -- Products, keyed by the identifier the API assigns
            CREATE TABLE IF NOT EXISTS products (
                id_produk TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                price REAL NOT NULL DEFAULT 0,
                category_id INTEGER NOT NULL,
                status_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (category_id) REFERENCES categories(id),
                FOREIGN KEY (status_id) REFERENCES statuses(id)
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
            CREATE INDEX IF NOT EXISTS idx_products_status ON products(status_id);
            "#,
        )?;

        Ok(())
    }

    /// Persist one batch of raw API records. Each record is independent:
    /// a failure is logged and accumulated while the rest continue.
    pub fn sync_products(&self, records: &[serde_json::Value]) -> Result<SyncReport> {
        let conn = self.conn.lock().unwrap();
        let mut report = SyncReport::default();

        for raw in records {
            match Self::sync_one(&conn, raw) {
                Ok(created) => {
                    if created {
                        report.created += 1;
                    } else {
                        report.updated += 1;
                    }
                }
                Err(error) => {
                    let name = raw
                        .get("nama_produk")
                        .and_then(|value| value.as_str())
                        .unwrap_or("N/A");
                    let message = format!("Product '{name}': {error:#}");
                    tracing::warn!("{message}");
                    report.errors.push(message);
                }
            }
        }

        Ok(report)
    }

    fn sync_one(conn: &Connection, raw: &serde_json::Value) -> Result<bool> {
        let record: ProductRecord =
            serde_json::from_value(raw.clone()).context("Malformed product record")?;
        let price = parse_price(&record.harga)?;

        let category_id = Self::find_or_create_category(conn, or_unknown(&record.kategori))?;
        let status_id = Self::find_or_create_status(conn, or_unknown(&record.status))?;

        Self::upsert_product(conn, &record, price, category_id, status_id)
    }

    fn find_or_create_category(conn: &Connection, name: &str) -> Result<i64> {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .ok();

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute("INSERT INTO categories (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    fn find_or_create_status(conn: &Connection, name: &str) -> Result<i64> {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM statuses WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .ok();

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute("INSERT INTO statuses (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// Returns true when a new row was created, false on overwrite.
    fn upsert_product(
        conn: &Connection,
        record: &ProductRecord,
        price: f64,
        category_id: i64,
        status_id: i64,
    ) -> Result<bool> {
        let existing: Option<String> = conn
            .query_row(
                "SELECT id_produk FROM products WHERE id_produk = ?1",
                params![&record.id_produk],
                |row| row.get(0),
            )
            .ok();

        let now = Utc::now().to_rfc3339();

        if existing.is_some() {
            conn.execute(
                r#"UPDATE products SET name = ?2, price = ?3, category_id = ?4,
                   status_id = ?5, updated_at = ?6 WHERE id_produk = ?1"#,
                params![
                    &record.id_produk,
                    &record.nama_produk,
                    price,
                    category_id,
                    status_id,
                    &now,
                ],
            )?;
            Ok(false)
        } else {
            conn.execute(
                r#"INSERT INTO products (id_produk, name, price, category_id, status_id,
                   created_at, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                params![
                    &record.id_produk,
                    &record.nama_produk,
                    price,
                    category_id,
                    status_id,
                    &now,
                    &now,
                ],
            )?;
            Ok(true)
        }
    }

    pub fn product_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn category_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn status_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM statuses", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn list_categories(&self) -> Result<Vec<(i64, String)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_statuses(&self) -> Result<Vec<(i64, String)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, name FROM statuses ORDER BY name")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

/// Missing or empty lookup names collapse to a shared "Unknown" row.
fn or_unknown(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() { "Unknown" } else { trimmed }
}

fn parse_price(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse()
        .with_context(|| format!("Invalid price {trimmed:?}"))
}
