//! libSQL backend — async `TodoStore` implementation.
//!
//! One fixed `todos` table shared by every deployed copy of the app; rows are
//! scoped by a `deployment_id` column resolved at startup. Supports local
//! file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::TodoStore;
use crate::todos::TodoItem;

/// Columns selected for todo rows, in `row_to_todo` order.
const TODO_COLUMNS: &str = "id, text, completed, created_at";

/// libSQL todo store.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    deployment_id: String,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path, deployment_id: &str) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Pool(format!("Failed to create database directory: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
            deployment_id: deployment_id.to_string(),
        };
        migrations::run_migrations(backend.conn()).await?;
        info!(path = %path.display(), deployment = deployment_id, "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory(deployment_id: &str) -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Pool(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
            deployment_id: deployment_id.to_string(),
        };
        migrations::run_migrations(backend.conn()).await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// The deployment identifier scoping this store's rows.
    pub fn deployment_id(&self) -> &str {
        &self.deployment_id
    }
}

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    // Try RFC 3339 first (our canonical write format)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    // Try SQLite datetime() output with fractional seconds
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    // Try SQLite datetime() output without fractional seconds
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Map a libsql row to a TodoItem.
///
/// Column order matches TODO_COLUMNS: 0:id, 1:text, 2:completed, 3:created_at
fn row_to_todo(row: &libsql::Row) -> Result<TodoItem, StoreError> {
    let id: i64 = row
        .get(0)
        .map_err(|e| StoreError::Query(format!("row id: {e}")))?;
    let text: String = row
        .get(1)
        .map_err(|e| StoreError::Query(format!("row text: {e}")))?;
    let completed: i64 = row
        .get(2)
        .map_err(|e| StoreError::Query(format!("row completed: {e}")))?;
    let created_str: String = row
        .get(3)
        .map_err(|e| StoreError::Query(format!("row created_at: {e}")))?;

    Ok(TodoItem {
        id,
        text,
        completed: completed != 0,
        created_at: parse_datetime(&created_str),
    })
}

#[async_trait]
impl TodoStore for LibSqlBackend {
    async fn list_todos(&self) -> Result<Vec<TodoItem>, StoreError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {TODO_COLUMNS} FROM todos WHERE deployment_id = ?1 ORDER BY id DESC"
                ),
                params![self.deployment_id.as_str()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("list_todos: {e}")))?;

        let mut todos = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            todos.push(row_to_todo(&row)?);
        }
        Ok(todos)
    }

    async fn get_todo(&self, id: i64) -> Result<Option<TodoItem>, StoreError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1 AND deployment_id = ?2"
                ),
                params![id, self.deployment_id.as_str()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("get_todo: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_todo(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("get_todo row: {e}"))),
        }
    }

    async fn create_todo(&self, text: &str) -> Result<TodoItem, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }

        let conn = self.conn();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO todos (deployment_id, text, completed, created_at) VALUES (?1, ?2, 0, ?3)",
            params![self.deployment_id.as_str(), text, now.to_rfc3339()],
        )
        .await
        .map_err(|e| StoreError::Query(format!("create_todo: {e}")))?;

        let id = conn.last_insert_rowid();
        debug!(id, deployment = %self.deployment_id, "Todo created");
        Ok(TodoItem::new(id, text, now))
    }

    async fn set_completion(&self, id: i64, completed: bool) -> Result<TodoItem, StoreError> {
        let conn = self.conn();
        let affected = conn
            .execute(
                "UPDATE todos SET completed = ?1 WHERE id = ?2 AND deployment_id = ?3",
                params![completed as i64, id, self.deployment_id.as_str()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("set_completion: {e}")))?;

        if affected == 0 {
            return Err(StoreError::NotFound { id });
        }

        debug!(id, completed, "Todo completion updated");
        self.get_todo(id).await?.ok_or(StoreError::NotFound { id })
    }

    async fn delete_todo(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn();
        let count = conn
            .execute(
                "DELETE FROM todos WHERE id = ?1 AND deployment_id = ?2",
                params![id, self.deployment_id.as_str()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("delete_todo: {e}")))?;

        if count > 0 {
            debug!(id, "Todo deleted");
        }
        Ok(count > 0)
    }
}
