//! Persistence for sessions, chat history and the tool execution log
//!
//! The rest of the crate only sees the [`SessionStore`], [`HistoryStore`] and
//! [`ExecutionLogStore`] traits. [`SqliteStorage`] implements all three on a
//! single SQLite file; every call opens its own connection on the blocking
//! thread pool so the database is the only serialization point.

use crate::config::StorageConfig;
use crate::error::{NexusError, Result};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub mod types;
pub use types::{
    ChatMessage, ExecutionStatus, Role, Session, SortOrder, ToolCallDescriptor,
    ToolExecutionRecord, ToolExecutionResponse, ToolInvocationRequest, ToolParameters,
};

/// Append-only message history, partitioned by session
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends a message to its session's history
    async fn append(&self, message: &ChatMessage) -> Result<()>;

    /// Returns up to `limit` messages of a session in the given order
    ///
    /// With [`SortOrder::Descending`] the newest `limit` messages are
    /// returned newest first; callers wanting the most recent window in
    /// chronological order reverse the result.
    async fn query_messages(
        &self,
        session_id: &str,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<ChatMessage>>;

    /// Removes every message of a session, returning how many were removed
    async fn delete_all(&self, session_id: &str) -> Result<u64>;
}

/// Session metadata
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new session
    async fn create(&self, session: &Session) -> Result<()>;

    /// Looks up a session by id
    async fn get(&self, session_id: &str) -> Result<Option<Session>>;

    /// Returns up to `limit` sessions, most recently updated first
    async fn list_by_update(&self, limit: usize) -> Result<Vec<Session>>;

    /// Refreshes `updated_at` and adds `increment_by` to the message count
    ///
    /// Touching an unknown session is a no-op.
    async fn touch(
        &self,
        session_id: &str,
        updated_at: DateTime<Utc>,
        increment_by: u64,
    ) -> Result<()>;

    /// Deletes a session, returning whether it existed
    async fn delete(&self, session_id: &str) -> Result<bool>;
}

/// Log of tool invocations
#[async_trait]
pub trait ExecutionLogStore: Send + Sync {
    /// Inserts a new record (normally in the `running` state)
    async fn insert(&self, record: &ToolExecutionRecord) -> Result<()>;

    /// Moves a `running` record to a terminal status
    ///
    /// # Errors
    ///
    /// Returns `NexusError::Storage` when the record does not exist, is
    /// already terminal, or `status` is not terminal.
    async fn update_status(
        &self,
        record_id: &str,
        status: ExecutionStatus,
        output: &str,
    ) -> Result<()>;

    /// Returns up to `limit` records of a session in the given order
    async fn query_executions(
        &self,
        session_id: &str,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<ToolExecutionRecord>>;
}

fn storage_error(e: anyhow::Error) -> NexusError {
    NexusError::Storage(format!("{:#}", e))
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    // Fixed precision keeps lexical order equal to chronological order
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp in database: {}", value))
        .map_err(|e| storage_error(e).into())
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// SQLite-backed implementation of every store trait
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Opens the database named by the storage config
    ///
    /// Falls back to `nexus.db` in the user's data directory when no path
    /// is configured.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        match &config.db_path {
            Some(path) => Self::new_with_path(path.clone()),
            None => Self::new(),
        }
    }

    /// Create a storage instance in the user's data directory
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "nexus", "nexus")
            .ok_or_else(|| NexusError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("nexus.db"))
    }

    /// Create a storage instance that uses the specified database path
    ///
    /// # Examples
    ///
    /// ```
    /// use nexus::storage::SqliteStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("nexus.db")).unwrap();
    /// assert!(storage.db_path().exists());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(storage_error)?;
        }

        let storage = Self { db_path };
        storage.init()?;
        tracing::debug!(path = %storage.db_path.display(), "Storage initialized");
        Ok(storage)
    }

    /// Location of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn init(&self) -> Result<()> {
        let conn = open_connection(&self.db_path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                message_count INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS chat_messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                tool_calls TEXT,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chat_messages_session
                ON chat_messages (session_id, timestamp);
            CREATE TABLE IF NOT EXISTS tool_executions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                session_id TEXT NOT NULL,
                tool_name TEXT NOT NULL,
                parameters TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                status TEXT NOT NULL,
                output TEXT NOT NULL DEFAULT ''
            );
            CREATE INDEX IF NOT EXISTS idx_tool_executions_session
                ON tool_executions (session_id, timestamp);",
        )
        .context("Failed to create tables")
        .map_err(storage_error)?;

        Ok(())
    }

    /// Runs `f` against a fresh connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = open_connection(&db_path)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| NexusError::Storage(format!("Storage task failed: {}", e)))?
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    Connection::open(path)
        .context("Failed to open database")
        .map_err(|e| storage_error(e).into())
}

/// Raw message row before timestamp and JSON decoding
type MessageRow = (String, String, String, String, Option<String>, String);

fn message_from_row(row: MessageRow) -> Result<ChatMessage> {
    let (id, session_id, role, content, tool_calls, timestamp) = row;
    let tool_calls = match tool_calls {
        Some(json) => Some(
            serde_json::from_str(&json)
                .context("Failed to deserialize tool calls")
                .map_err(storage_error)?,
        ),
        None => None,
    };
    Ok(ChatMessage {
        id,
        session_id,
        role: role.parse()?,
        content,
        tool_calls,
        timestamp: parse_timestamp(&timestamp)?,
    })
}

/// Raw execution row before decoding
type ExecutionRow = (String, String, String, String, String, String, String);

fn execution_from_row(row: ExecutionRow) -> Result<ToolExecutionRecord> {
    let (id, session_id, tool_name, parameters, timestamp, status, output) = row;
    Ok(ToolExecutionRecord {
        id,
        session_id,
        tool_name,
        parameters: serde_json::from_str(&parameters)
            .context("Failed to deserialize parameters")
            .map_err(storage_error)?,
        timestamp: parse_timestamp(&timestamp)?,
        status: status.parse()?,
        output,
    })
}

type SessionRow = (String, String, String, String, i64);

fn session_from_row(row: SessionRow) -> Result<Session> {
    let (id, name, created_at, updated_at, message_count) = row;
    Ok(Session {
        id,
        name,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        message_count: u64::try_from(message_count).unwrap_or_default(),
    })
}

#[async_trait]
impl HistoryStore for SqliteStorage {
    async fn append(&self, message: &ChatMessage) -> Result<()> {
        let tool_calls = match &message.tool_calls {
            Some(calls) => Some(
                serde_json::to_string(calls)
                    .context("Failed to serialize tool calls")
                    .map_err(storage_error)?,
            ),
            None => None,
        };
        let message = message.clone();
        tracing::debug!(session_id = %message.session_id, role = %message.role, "Appending message");

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO chat_messages (id, session_id, role, content, tool_calls, timestamp)
                VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    message.id,
                    message.session_id,
                    message.role.as_str(),
                    message.content,
                    tool_calls,
                    format_timestamp(&message.timestamp)
                ],
            )
            .context("Failed to insert message")
            .map_err(storage_error)?;
            Ok(())
        })
        .await
    }

    async fn query_messages(
        &self,
        session_id: &str,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<ChatMessage>> {
        let session_id = session_id.to_string();
        self.with_conn(move |conn| {
            let query = match order {
                SortOrder::Ascending => {
                    "SELECT id, session_id, role, content, tool_calls, timestamp
                    FROM chat_messages WHERE session_id = ?
                    ORDER BY timestamp ASC, seq ASC LIMIT ?"
                }
                SortOrder::Descending => {
                    "SELECT id, session_id, role, content, tool_calls, timestamp
                    FROM chat_messages WHERE session_id = ?
                    ORDER BY timestamp DESC, seq DESC LIMIT ?"
                }
            };

            let mut stmt = conn
                .prepare(query)
                .context("Failed to prepare statement")
                .map_err(storage_error)?;

            let rows = stmt
                .query_map(
                    params![session_id, sql_limit(limit)],
                    |row| -> rusqlite::Result<MessageRow> {
                        Ok((
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                            row.get(5)?,
                        ))
                    },
                )
                .context("Failed to query messages")
                .map_err(storage_error)?;

            let mut messages = Vec::new();
            for row in rows {
                let row = row.context("Failed to read message").map_err(storage_error)?;
                messages.push(message_from_row(row)?);
            }
            Ok(messages)
        })
        .await
    }

    async fn delete_all(&self, session_id: &str) -> Result<u64> {
        let session_id = session_id.to_string();
        self.with_conn(move |conn| {
            let removed = conn
                .execute(
                    "DELETE FROM chat_messages WHERE session_id = ?",
                    params![session_id],
                )
                .context("Failed to delete messages")
                .map_err(storage_error)?;
            Ok(removed as u64)
        })
        .await
    }
}

#[async_trait]
impl SessionStore for SqliteStorage {
    async fn create(&self, session: &Session) -> Result<()> {
        let session = session.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, name, created_at, updated_at, message_count)
                VALUES (?, ?, ?, ?, ?)",
                params![
                    session.id,
                    session.name,
                    format_timestamp(&session.created_at),
                    format_timestamp(&session.updated_at),
                    i64::try_from(session.message_count).unwrap_or(i64::MAX)
                ],
            )
            .context("Failed to insert session")
            .map_err(storage_error)?;
            Ok(())
        })
        .await
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let session_id = session_id.to_string();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, name, created_at, updated_at, message_count
                    FROM sessions WHERE id = ?",
                    params![session_id],
                    |row| -> rusqlite::Result<SessionRow> {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                    },
                )
                .optional()
                .context("Failed to query session")
                .map_err(storage_error)?;
            row.map(session_from_row).transpose()
        })
        .await
    }

    async fn list_by_update(&self, limit: usize) -> Result<Vec<Session>> {
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, name, created_at, updated_at, message_count
                    FROM sessions
                    ORDER BY updated_at DESC
                    LIMIT ?",
                )
                .context("Failed to prepare statement")
                .map_err(storage_error)?;

            let rows = stmt
                .query_map(params![sql_limit(limit)], |row| -> rusqlite::Result<SessionRow> {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                })
                .context("Failed to query sessions")
                .map_err(storage_error)?;

            let mut sessions = Vec::new();
            for row in rows {
                let row = row.context("Failed to read session").map_err(storage_error)?;
                sessions.push(session_from_row(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    async fn touch(
        &self,
        session_id: &str,
        updated_at: DateTime<Utc>,
        increment_by: u64,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE sessions SET updated_at = ?, message_count = message_count + ?
                WHERE id = ?",
                params![
                    format_timestamp(&updated_at),
                    i64::try_from(increment_by).unwrap_or(i64::MAX),
                    session_id
                ],
            )
            .context("Failed to update session")
            .map_err(storage_error)?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, session_id: &str) -> Result<bool> {
        let session_id = session_id.to_string();
        self.with_conn(move |conn| {
            let tx = conn
                .transaction()
                .context("Failed to start transaction")
                .map_err(storage_error)?;

            tx.execute(
                "DELETE FROM chat_messages WHERE session_id = ?",
                params![session_id],
            )
            .context("Failed to delete session messages")
            .map_err(storage_error)?;

            let removed = tx
                .execute("DELETE FROM sessions WHERE id = ?", params![session_id])
                .context("Failed to delete session")
                .map_err(storage_error)?;

            tx.commit()
                .context("Failed to commit transaction")
                .map_err(storage_error)?;

            Ok(removed > 0)
        })
        .await
    }
}

#[async_trait]
impl ExecutionLogStore for SqliteStorage {
    async fn insert(&self, record: &ToolExecutionRecord) -> Result<()> {
        let parameters = serde_json::to_string(&record.parameters)
            .context("Failed to serialize parameters")
            .map_err(storage_error)?;
        let record = record.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO tool_executions
                    (id, session_id, tool_name, parameters, timestamp, status, output)
                VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    record.id,
                    record.session_id,
                    record.tool_name,
                    parameters,
                    format_timestamp(&record.timestamp),
                    record.status.as_str(),
                    record.output
                ],
            )
            .context("Failed to insert execution record")
            .map_err(storage_error)?;
            Ok(())
        })
        .await
    }

    async fn update_status(
        &self,
        record_id: &str,
        status: ExecutionStatus,
        output: &str,
    ) -> Result<()> {
        if !status.is_terminal() {
            return Err(NexusError::Storage(format!(
                "Cannot move execution {} back to {}",
                record_id, status
            ))
            .into());
        }

        let record_id = record_id.to_string();
        let output = output.to_string();
        self.with_conn(move |conn| {
            let updated = conn
                .execute(
                    "UPDATE tool_executions SET status = ?, output = ?
                    WHERE id = ? AND status = 'running'",
                    params![status.as_str(), output, record_id],
                )
                .context("Failed to update execution record")
                .map_err(storage_error)?;

            if updated == 0 {
                return Err(NexusError::Storage(format!(
                    "Execution {} is unknown or already completed",
                    record_id
                ))
                .into());
            }
            Ok(())
        })
        .await
    }

    async fn query_executions(
        &self,
        session_id: &str,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<ToolExecutionRecord>> {
        let session_id = session_id.to_string();
        self.with_conn(move |conn| {
            let query = match order {
                SortOrder::Ascending => {
                    "SELECT id, session_id, tool_name, parameters, timestamp, status, output
                    FROM tool_executions WHERE session_id = ?
                    ORDER BY timestamp ASC, seq ASC LIMIT ?"
                }
                SortOrder::Descending => {
                    "SELECT id, session_id, tool_name, parameters, timestamp, status, output
                    FROM tool_executions WHERE session_id = ?
                    ORDER BY timestamp DESC, seq DESC LIMIT ?"
                }
            };

            let mut stmt = conn
                .prepare(query)
                .context("Failed to prepare statement")
                .map_err(storage_error)?;

            let rows = stmt
                .query_map(
                    params![session_id, sql_limit(limit)],
                    |row| -> rusqlite::Result<ExecutionRow> {
                        Ok((
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                            row.get(5)?,
                            row.get(6)?,
                        ))
                    },
                )
                .context("Failed to query executions")
                .map_err(storage_error)?;

            let mut records = Vec::new();
            for row in rows {
                let row = row
                    .context("Failed to read execution record")
                    .map_err(storage_error)?;
                records.push(execution_from_row(row)?);
            }
            Ok(records)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    /// Helper: create a temporary storage instance backed by a temp directory.
    ///
    /// Returns both the `SqliteStorage` and the `TempDir` so the caller keeps
    /// ownership of the directory (preventing it from being removed).
    fn create_test_storage() -> (SqliteStorage, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("nexus.db");
        let storage = SqliteStorage::new_with_path(db_path).expect("failed to create storage");
        (storage, dir)
    }

    fn request(session_id: &str, tool: &str) -> ToolInvocationRequest {
        ToolInvocationRequest {
            tool_name: tool.to_string(),
            parameters: serde_json::Map::new(),
            session_id: session_id.to_string(),
        }
    }

    #[test]
    fn test_init_creates_tables() {
        let (storage, _dir) = create_test_storage();
        let conn = Connection::open(storage.db_path()).expect("open connection");
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table'
                AND name IN ('sessions', 'chat_messages', 'tool_executions')",
                [],
                |r| r.get(0),
            )
            .expect("query row");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_new_with_path_creates_parent_directories() {
        let dir = tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("nested").join("nexus.db");
        let storage = SqliteStorage::new_with_path(&db_path).expect("storage");
        assert_eq!(storage.db_path(), db_path.as_path());
        assert!(db_path.parent().unwrap().exists());
    }

    #[test]
    fn test_open_uses_configured_path() {
        let dir = tempdir().expect("failed to create tempdir");
        let config = StorageConfig {
            db_path: Some(dir.path().join("configured.db")),
        };
        let storage = SqliteStorage::open(&config).expect("open");
        assert!(storage.db_path().ends_with("configured.db"));
    }

    #[test]
    fn test_timestamp_keeps_nanosecond_precision() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let text = format_timestamp(&at);
        assert_eq!(text, "2023-11-14T22:13:20.123456789Z");
        assert_eq!(parse_timestamp(&text).unwrap(), at);
    }

    #[tokio::test]
    async fn test_session_timestamps_round_trip_exactly() {
        let (storage, _dir) = create_test_storage();
        let session = Session::new("Precise");
        storage.create(&session).await.expect("create");

        let loaded = storage.get(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.created_at, session.created_at);
        assert_eq!(loaded.updated_at, session.updated_at);
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (storage, _dir) = create_test_storage();
        let session = Session::new("Recon");
        storage.create(&session).await.expect("create");

        let loaded = storage.get(&session.id).await.expect("get").expect("exists");
        assert_eq!(loaded.name, "Recon");
        assert_eq!(loaded.message_count, 0);
        assert!(storage.get("missing").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_touch_refreshes_updated_at_and_count() {
        let (storage, _dir) = create_test_storage();
        let session = Session::new("Touched");
        storage.create(&session).await.expect("create");

        let later = session.updated_at + Duration::seconds(5);
        storage.touch(&session.id, later, 2).await.expect("touch");
        storage.touch(&session.id, later, 2).await.expect("touch");

        let loaded = storage.get(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.message_count, 4);
        assert_eq!(loaded.created_at, session.created_at);
        assert!(loaded.updated_at > session.updated_at);
    }

    #[tokio::test]
    async fn test_touch_unknown_session_is_noop() {
        let (storage, _dir) = create_test_storage();
        storage
            .touch("ghost", Utc::now(), 2)
            .await
            .expect("touch unknown");
        assert!(storage.get("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_update_orders_and_limits() {
        let (storage, _dir) = create_test_storage();
        let first = Session::new("first");
        let second = Session::new("second");
        let third = Session::new("third");
        for s in [&first, &second, &third] {
            storage.create(s).await.unwrap();
        }
        storage
            .touch(&first.id, Utc::now() + Duration::seconds(60), 2)
            .await
            .unwrap();

        let sessions = storage.list_by_update(2).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, first.id);
    }

    #[tokio::test]
    async fn test_query_messages_orders_and_limits() {
        let (storage, _dir) = create_test_storage();
        for i in 0..5 {
            storage
                .append(&ChatMessage::user("s1", format!("m{}", i)))
                .await
                .unwrap();
        }

        let oldest = storage
            .query_messages("s1", 3, SortOrder::Ascending)
            .await
            .unwrap();
        let contents: Vec<&str> = oldest.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2"]);

        let newest = storage
            .query_messages("s1", 2, SortOrder::Descending)
            .await
            .unwrap();
        let contents: Vec<&str> = newest.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m4", "m3"]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let (storage, _dir) = create_test_storage();
        let at = Utc::now();
        for content in ["a", "b", "c"] {
            let mut message = ChatMessage::user("s1", content);
            message.timestamp = at;
            storage.append(&message).await.unwrap();
        }

        let messages = storage
            .query_messages("s1", 10, SortOrder::Ascending)
            .await
            .unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_tool_calls_survive_storage() {
        let (storage, _dir) = create_test_storage();
        let message = ChatMessage::assistant(
            "s1",
            "EXECUTE_TOOL: nmap -sV 10.0.0.5",
            Some(vec![ToolCallDescriptor::raw("nmap -sV 10.0.0.5")]),
        );
        storage.append(&message).await.unwrap();

        let loaded = storage
            .query_messages("s1", 10, SortOrder::Ascending)
            .await
            .unwrap();
        assert_eq!(loaded[0].role, Role::Assistant);
        assert_eq!(
            loaded[0].tool_calls.as_ref().unwrap()[0].raw,
            "nmap -sV 10.0.0.5"
        );
    }

    #[tokio::test]
    async fn test_delete_session_cascades_to_its_messages_only() {
        let (storage, _dir) = create_test_storage();
        let doomed = Session::new("doomed");
        let kept = Session::new("kept");
        storage.create(&doomed).await.unwrap();
        storage.create(&kept).await.unwrap();
        storage.append(&ChatMessage::user(&doomed.id, "x")).await.unwrap();
        storage.append(&ChatMessage::user(&kept.id, "y")).await.unwrap();

        assert!(storage.delete(&doomed.id).await.unwrap());
        assert!(!storage.delete(&doomed.id).await.unwrap());

        assert!(storage
            .query_messages(&doomed.id, 10, SortOrder::Ascending)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            storage
                .query_messages(&kept.id, 10, SortOrder::Ascending)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_delete_all_reports_removed_count() {
        let (storage, _dir) = create_test_storage();
        storage.append(&ChatMessage::user("s1", "a")).await.unwrap();
        storage.append(&ChatMessage::user("s1", "b")).await.unwrap();
        assert_eq!(storage.delete_all("s1").await.unwrap(), 2);
        assert_eq!(storage.delete_all("s1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_execution_moves_from_running_to_terminal_once() {
        let (storage, _dir) = create_test_storage();
        let record = ToolExecutionRecord::running(&request("s1", "nmap"));
        storage.insert(&record).await.unwrap();

        let stored = storage
            .query_executions("s1", 10, SortOrder::Descending)
            .await
            .unwrap();
        assert_eq!(stored[0].status, ExecutionStatus::Running);
        assert!(stored[0].output.is_empty());

        storage
            .update_status(&record.id, ExecutionStatus::Success, "done")
            .await
            .unwrap();

        let second = storage
            .update_status(&record.id, ExecutionStatus::Error, "again")
            .await;
        let err = second.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NexusError>(),
            Some(NexusError::Storage(_))
        ));

        let stored = storage
            .query_executions("s1", 10, SortOrder::Descending)
            .await
            .unwrap();
        assert_eq!(stored[0].status, ExecutionStatus::Success);
        assert_eq!(stored[0].output, "done");
    }

    #[tokio::test]
    async fn test_update_status_rejects_running_target() {
        let (storage, _dir) = create_test_storage();
        let record = ToolExecutionRecord::running(&request("s1", "nmap"));
        storage.insert(&record).await.unwrap();
        assert!(storage
            .update_status(&record.id, ExecutionStatus::Running, "")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_update_status_unknown_record_fails() {
        let (storage, _dir) = create_test_storage();
        assert!(storage
            .update_status("missing", ExecutionStatus::Success, "x")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_query_executions_newest_first_with_limit() {
        let (storage, _dir) = create_test_storage();
        for tool in ["nmap", "nikto", "hydra"] {
            storage
                .insert(&ToolExecutionRecord::running(&request("s1", tool)))
                .await
                .unwrap();
        }
        storage
            .insert(&ToolExecutionRecord::running(&request("s2", "john")))
            .await
            .unwrap();

        let records = storage
            .query_executions("s1", 2, SortOrder::Descending)
            .await
            .unwrap();
        let tools: Vec<&str> = records.iter().map(|r| r.tool_name.as_str()).collect();
        assert_eq!(tools, vec!["hydra", "nikto"]);
    }
}
