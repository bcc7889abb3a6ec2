//! Relational task storage.
//!
//! Defines the [`TaskStore`] trait the service talks to, and
//! [`SqliteStore`], which keeps one row per task in a single `tasks` table.
//! Every call runs on tokio's blocking pool so that SQLite I/O never stalls
//! request handling.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use taskdeck_proto::patch::TaskPatch;
use taskdeck_proto::task::{NewTask, Priority, Task, TaskId};

/// Current schema version, recorded in `PRAGMA user_version`.
const SCHEMA_VERSION: i64 = 1;

const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id TEXT NOT NULL PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(title) > 0),
    due_date TEXT,
    due_time TEXT,
    priority TEXT NOT NULL CHECK (priority IN ('LOW', 'MEDIUM', 'HIGH', 'URGENT')),
    link TEXT,
    is_completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";
const SELECT_TASKS: &str = "SELECT id, title, due_date, due_time, priority, link, is_completed, created_at, updated_at FROM tasks";
const ORDER_NEWEST: &str = "ORDER BY created_at DESC, id DESC";
const WHERE_ID: &str = "WHERE id = ?1";
const INSERT_TASK: &str = "INSERT INTO tasks (id, title, due_date, due_time, priority, link, is_completed, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database rejected or failed a statement.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The database directory could not be created.
    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking task running the statement panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The store is unavailable for another reason.
    ///
    /// Not produced by [`SqliteStore`]; for other [`TaskStore`]
    /// implementations whose backend can go away.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for tasks.
///
/// Each method is a single round trip. Implementations must be safe to
/// share across request handlers.
pub trait TaskStore: Send + Sync {
    /// All tasks, newest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Task>, StoreError>> + Send;

    /// The task with the given id, if any.
    fn get(
        &self,
        id: TaskId,
    ) -> impl std::future::Future<Output = Result<Option<Task>, StoreError>> + Send;

    /// Inserts a new row with a fresh id and `created_at = updated_at = now`.
    fn insert(
        &self,
        task: NewTask,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Task, StoreError>> + Send;

    /// Writes the present fields of `patch` and sets `updated_at = now`.
    ///
    /// Returns `None` if no row has the given id.
    fn update(
        &self,
        id: TaskId,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Option<Task>, StoreError>> + Send;

    /// Removes the row. Returns whether a row was removed.
    fn delete(
        &self,
        id: TaskId,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;
}

/// SQLite-backed [`TaskStore`].
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "opened task database");
        Self::init(conn)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version < SCHEMA_VERSION {
            conn.execute(SCHEMA_TASKS, [])?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tracing::debug!(from = version, to = SCHEMA_VERSION, "task schema migrated");
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&conn.lock())).await?
    }
}

impl TaskStore for SqliteStore {
    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_TASKS} {ORDER_NEWEST}"))?;
            let rows = stmt.query_map([], task_from_row)?;
            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row?);
            }
            Ok(tasks)
        })
        .await
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        self.with_conn(move |conn| fetch_one(conn, id)).await
    }

    async fn insert(&self, task: NewTask, now: DateTime<Utc>) -> Result<Task, StoreError> {
        self.with_conn(move |conn| {
            let id = TaskId::new();
            conn.execute(
                INSERT_TASK,
                params![
                    id.to_string(),
                    task.title,
                    task.due_date,
                    task.due_time,
                    task.priority.as_str(),
                    task.link,
                    timestamp(now),
                ],
            )?;
            Ok(Task {
                id,
                title: task.title,
                due_date: task.due_date,
                due_time: task.due_time,
                priority: task.priority,
                link: task.link,
                is_completed: false,
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn update(
        &self,
        id: TaskId,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, StoreError> {
        self.with_conn(move |conn| {
            let (sql, values) = build_update(id, &patch, now);
            let changed = conn.execute(&sql, params_from_iter(values))?;
            if changed == 0 {
                return Ok(None);
            }
            fetch_one(conn, id)
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> Result<bool, StoreError> {
        self.with_conn(move |conn| Ok(conn.execute(DELETE_TASK, params![id.to_string()])? > 0))
            .await
    }
}

fn fetch_one(conn: &Connection, id: TaskId) -> Result<Option<Task>, StoreError> {
    let task = conn
        .query_row(
            &format!("{SELECT_TASKS} {WHERE_ID}"),
            params![id.to_string()],
            task_from_row,
        )
        .optional()?;
    Ok(task)
}

/// Builds an `UPDATE` touching only the columns present in `patch`.
fn build_update(id: TaskId, patch: &TaskPatch, now: DateTime<Utc>) -> (String, Vec<Value>) {
    let mut columns: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(title) = &patch.title {
        columns.push("title");
        values.push(Value::Text(title.clone()));
    }
    if let Some(due_date) = patch.due_date {
        columns.push("due_date");
        values.push(due_date.map_or(Value::Null, |d| Value::Text(d.format("%F").to_string())));
    }
    if let Some(due_time) = patch.due_time {
        columns.push("due_time");
        values.push(due_time.map_or(Value::Null, |t| Value::Text(t.format("%T").to_string())));
    }
    if let Some(priority) = patch.priority {
        columns.push("priority");
        values.push(Value::Text(priority.as_str().to_string()));
    }
    if let Some(link) = &patch.link {
        columns.push("link");
        values.push(link.clone().map_or(Value::Null, Value::Text));
    }
    if let Some(done) = patch.is_completed {
        columns.push("is_completed");
        values.push(Value::Integer(i64::from(done)));
    }
    columns.push("updated_at");
    values.push(Value::Text(timestamp(now)));

    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{col} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE tasks SET {assignments} WHERE id = ?{}", values.len() + 1);
    values.push(Value::Text(id.to_string()));

    (sql, values)
}

/// Fixed-width timestamp text, so that column order matches time order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%F %T%.6f%:z").to_string()
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let priority: String = row.get(4)?;
    Ok(Task {
        id: id.parse().map_err(|e| conversion_error(0, e))?,
        title: row.get(1)?,
        due_date: row.get::<_, Option<NaiveDate>>(2)?,
        due_time: row.get::<_, Option<NaiveTime>>(3)?,
        priority: priority
            .parse::<Priority>()
            .map_err(|e| conversion_error(4, e))?,
        link: row.get(5)?,
        is_completed: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}
