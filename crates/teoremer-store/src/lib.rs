//! Teoremer Storage Layer
//!
//! Implements the ItemStore and SourceStore traits using SQLite.
//!
//! # Transactions
//!
//! [`ItemStore::atomically`] opens `BEGIN IMMEDIATE`, so the write lock is
//! taken before any check runs. A second connection attempting the same
//! unit of work waits (up to the busy timeout) and then sees the committed
//! result. Nested calls use savepoints.
//!
//! # Examples
//!
//! ```no_run
//! use teoremer_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for item operations
//! ```

#![warn(missing_docs)]

use std::path::Path;
use std::time::Duration;

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use teoremer_domain::traits::{
    DraftQuery, FinalQuery, IntegrityError, ItemCounts, ItemStore, SourceStore,
};
use teoremer_domain::{
    current_timestamp, DraftId, DraftItem, DraftStatus, Endorsement, FinalId, FinalItem,
    FinalStatus, ItemType, MediaId, MediaItem, NewDraft, NewSource, RefNode, SourceId, User,
    UserId, ValidationEntry, ValidationId, ValidationTarget,
};
use thiserror::Error;

/// How long a connection waits for another writer before giving up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Referenced row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A uniqueness or reference constraint was violated
    #[error("Integrity violation: {0}")]
    Integrity(String),
}

impl IntegrityError for StoreError {
    fn is_integrity_violation(&self) -> bool {
        matches!(self, StoreError::Integrity(_))
    }
}

/// SQLite-based implementation of ItemStore and SourceStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance opened on the same database file.
pub struct SqliteStore {
    conn: Connection,
    depth: usize,
}

const DRAFT_COLUMNS: &str =
    "id, itemtype, status, body, created_by, parent, created_at, modified_at";

const FINAL_COLUMNS: &str = "final_id, itemtype, status, body, created_by, parent, created_at";

const SOURCE_COLUMNS: &str = "id, created_by, created_at, sourcetype, title, publisher, year, \
     volume, number, series, address, edition, month, journal, pages, isbn10, isbn13, note";

const VALIDATION_COLUMNS: &str = "id, source_id, location, created_by, created_at";

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Create a store with a custom wait for concurrent writers
    pub fn with_busy_timeout<P: AsRef<Path>>(path: P, timeout: Duration) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(timeout)?;
        let mut store = Self { conn, depth: 0 };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert ValidationId to bytes for storage
    fn validation_id_to_bytes(id: ValidationId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to ValidationId
    fn bytes_to_validation_id(bytes: &[u8]) -> Result<ValidationId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!("Expected 16 bytes for ValidationId, got {}", bytes.len()))
        })?;
        Ok(ValidationId::from_value(u128::from_be_bytes(arr)))
    }

    fn row_to_draft(row: &Row<'_>) -> rusqlite::Result<DraftItem> {
        let itemtype = code_column(row, 1, ItemType::from_code)?;
        let status = code_column(row, 2, DraftStatus::from_code)?;
        let parent: Option<String> = row.get(5)?;
        Ok(DraftItem {
            id: DraftId::from_value(row.get::<_, i64>(0)? as u64),
            itemtype,
            status,
            body: row.get(3)?,
            created_by: UserId::from_value(row.get::<_, i64>(4)? as u64),
            parent: parent.map(|p| final_id_column(5, p)).transpose()?,
            created_at: row.get::<_, i64>(6)? as u64,
            modified_at: row.get::<_, i64>(7)? as u64,
        })
    }

    fn row_to_final(row: &Row<'_>) -> rusqlite::Result<FinalItem> {
        let final_id = final_id_column(0, row.get(0)?)?;
        let itemtype = code_column(row, 1, ItemType::from_code)?;
        let status = code_column(row, 2, FinalStatus::from_code)?;
        let parent: Option<String> = row.get(5)?;
        Ok(FinalItem {
            final_id,
            itemtype,
            status,
            body: row.get(3)?,
            created_by: UserId::from_value(row.get::<_, i64>(4)? as u64),
            parent: parent.map(|p| final_id_column(5, p)).transpose()?,
            created_at: row.get::<_, i64>(6)? as u64,
        })
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: UserId::from_value(row.get::<_, i64>(0)? as u64),
            name: row.get(1)?,
            created_at: row.get::<_, i64>(2)? as u64,
        })
    }

    /// Map a validation row; `target` is rebuilt from the column after the shared ones
    fn row_to_validation(row: &Row<'_>, target: ValidationTarget) -> rusqlite::Result<ValidationEntry> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_validation_id(&id_bytes)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Blob, Box::new(e)))?;
        Ok(ValidationEntry {
            id,
            target,
            source: SourceId::from_value(row.get::<_, i64>(1)? as u64),
            location: row.get(2)?,
            created_by: UserId::from_value(row.get::<_, i64>(3)? as u64),
            created_at: row.get::<_, i64>(4)? as u64,
        })
    }

    fn item_validation_row(row: &Row<'_>) -> rusqlite::Result<ValidationEntry> {
        let final_id = final_id_column(5, row.get(5)?)?;
        Self::row_to_validation(row, ValidationTarget::Final(final_id))
    }

    fn draft_validation_row(row: &Row<'_>) -> rusqlite::Result<ValidationEntry> {
        let draft_id = DraftId::from_value(row.get::<_, i64>(5)? as u64);
        Self::row_to_validation(row, ValidationTarget::Draft(draft_id))
    }

    fn row_to_source_fields(row: &Row<'_>) -> rusqlite::Result<(SourceId, UserId, u64, NewSource)> {
        let fields = NewSource {
            sourcetype: row.get(3)?,
            authors: Vec::new(),
            editors: Vec::new(),
            title: row.get(4)?,
            publisher: row.get(5)?,
            year: row.get(6)?,
            volume: row.get(7)?,
            number: row.get(8)?,
            series: row.get(9)?,
            address: row.get(10)?,
            edition: row.get(11)?,
            month: row.get(12)?,
            journal: row.get(13)?,
            pages: row.get(14)?,
            isbn10: row.get(15)?,
            isbn13: row.get(16)?,
            note: row.get(17)?,
        };
        Ok((
            SourceId::from_value(row.get::<_, i64>(0)? as u64),
            UserId::from_value(row.get::<_, i64>(1)? as u64),
            row.get::<_, i64>(2)? as u64,
            fields,
        ))
    }

    /// Load authors or editors of a source in citation order
    fn load_people(&self, node: SourceId, role: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT a.name FROM ref_node_people p JOIN ref_authors a ON a.id = p.author_id
             WHERE p.node_id = ?1 AND p.role = ?2 ORDER BY p.position",
        )?;
        let names = stmt
            .query_map(params![node.value() as i64, role], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn complete_source(&self, raw: (SourceId, UserId, u64, NewSource)) -> Result<RefNode, StoreError> {
        let (id, created_by, created_at, mut fields) = raw;
        fields.authors = self.load_people(id, "author")?;
        fields.editors = self.load_people(id, "editor")?;
        Ok(RefNode {
            id,
            fields,
            created_by,
            created_at,
        })
    }

    fn link_people(&mut self, node: SourceId, role: &str, names: &[String]) -> Result<(), StoreError> {
        for (position, name) in names.iter().enumerate() {
            self.conn.execute(
                "INSERT OR IGNORE INTO ref_authors (name) VALUES (?1)",
                params![name],
            )?;
            let author_id: i64 = self.conn.query_row(
                "SELECT id FROM ref_authors WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            self.conn.execute(
                "INSERT INTO ref_node_people (node_id, author_id, role, position) VALUES (?1, ?2, ?3, ?4)",
                params![node.value() as i64, author_id, role, position as i64],
            )?;
        }
        Ok(())
    }

    fn count_by_type(&self, sql: &str, code: char) -> Result<std::collections::BTreeMap<ItemType, usize>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![code.to_string()], |row| {
                let itemtype = code_column(row, 0, ItemType::from_code)?;
                Ok((itemtype, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().collect())
    }
}

/// Read a single-letter code column into a domain enum
fn code_column<T>(row: &Row<'_>, idx: usize, parse: fn(char) -> Option<T>) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    text.chars().next().and_then(parse).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(StoreError::InvalidData(format!("Unknown code: '{}'", text))),
        )
    })
}

fn final_id_column(idx: usize, value: String) -> rusqlite::Result<FinalId> {
    FinalId::new(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(StoreError::InvalidData(e)))
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl ItemStore for SqliteStore {
    type Error = StoreError;

    fn atomically<T, E, F>(&mut self, f: F) -> Result<Result<T, E>, Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let outermost = self.depth == 0;
        self.conn
            .execute_batch(if outermost { "BEGIN IMMEDIATE" } else { "SAVEPOINT nested" })?;
        self.depth += 1;
        let outcome = f(self);
        self.depth -= 1;

        let finish = match (outcome.is_ok(), outermost) {
            (true, true) => "COMMIT",
            (true, false) => "RELEASE nested",
            (false, true) => "ROLLBACK",
            (false, false) => "ROLLBACK TO nested; RELEASE nested",
        };
        if outcome.is_err() {
            tracing::debug!(depth = self.depth, "rolling back unit of work");
        }
        if let Err(e) = self.conn.execute_batch(finish) {
            if outermost && !self.conn.is_autocommit() {
                self.conn.execute_batch("ROLLBACK")?;
            }
            return Err(e.into());
        }
        Ok(outcome)
    }

    fn create_user(&mut self, name: &str) -> Result<User, Self::Error> {
        let now = current_timestamp();
        self.conn
            .execute(
                "INSERT INTO users (name, created_at) VALUES (?1, ?2)",
                params![name, now as i64],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::Integrity(format!("User '{}' already exists", name))
                } else {
                    e.into()
                }
            })?;
        Ok(User {
            id: UserId::from_value(self.conn.last_insert_rowid() as u64),
            name: name.to_string(),
            created_at: now,
        })
    }

    fn get_user(&self, id: UserId) -> Result<Option<User>, Self::Error> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM users WHERE id = ?1",
                params![id.value() as i64],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user(&self, name: &str) -> Result<Option<User>, Self::Error> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM users WHERE name = ?1",
                params![name],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn list_users(&self) -> Result<Vec<User>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM users ORDER BY name")?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn create_draft(&mut self, draft: NewDraft) -> Result<DraftItem, Self::Error> {
        let now = current_timestamp();
        self.conn.execute(
            "INSERT INTO draft_items (itemtype, status, body, created_by, parent, created_at, modified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                draft.itemtype.code().to_string(),
                DraftStatus::Draft.code().to_string(),
                &draft.body,
                draft.created_by.value() as i64,
                draft.parent.as_ref().map(|p| p.as_str()),
                now as i64,
            ],
        )?;
        Ok(DraftItem {
            id: DraftId::from_value(self.conn.last_insert_rowid() as u64),
            itemtype: draft.itemtype,
            status: DraftStatus::Draft,
            body: draft.body,
            created_by: draft.created_by,
            parent: draft.parent,
            created_at: now,
            modified_at: now,
        })
    }

    fn get_draft(&self, id: DraftId) -> Result<Option<DraftItem>, Self::Error> {
        let draft = self
            .conn
            .query_row(
                &format!("SELECT {} FROM draft_items WHERE id = ?1", DRAFT_COLUMNS),
                params![id.value() as i64],
                Self::row_to_draft,
            )
            .optional()?;
        Ok(draft)
    }

    fn set_draft_status(&mut self, id: DraftId, status: DraftStatus) -> Result<bool, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE draft_items SET status = ?1, modified_at = ?2 WHERE id = ?3",
            params![status.code().to_string(), current_timestamp() as i64, id.value() as i64],
        )?;
        Ok(changed == 1)
    }

    fn set_draft_body(&mut self, id: DraftId, body: &str) -> Result<bool, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE draft_items SET body = ?1, modified_at = ?2 WHERE id = ?3",
            params![body, current_timestamp() as i64, id.value() as i64],
        )?;
        Ok(changed == 1)
    }

    fn carry_validations(&mut self, draft: DraftId, item: &FinalId) -> Result<usize, Self::Error> {
        let draft_id = draft.value() as i64;
        let moved = self
            .conn
            .execute(
                "INSERT INTO item_validations (id, final_id, source_id, location, created_by, created_at)
                 SELECT id, ?2, source_id, location, created_by, created_at
                 FROM draft_validations WHERE draft_id = ?1",
                params![draft_id, item.as_str()],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::Integrity(format!("Cannot attach evidence to {}: {}", item, e))
                } else {
                    StoreError::Database(e)
                }
            })?;
        self.conn.execute(
            "INSERT OR IGNORE INTO user_item_validations (validation_id, created_by, created_at)
             SELECT id, created_by, created_at FROM draft_validations WHERE draft_id = ?1",
            params![draft_id],
        )?;
        self.conn
            .execute("DELETE FROM draft_validations WHERE draft_id = ?1", params![draft_id])?;

        tracing::debug!(draft_id = %draft, final_id = %item, moved, "draft validations carried");
        Ok(moved)
    }

    fn delete_draft(&mut self, id: DraftId) -> Result<bool, Self::Error> {
        self.conn.execute(
            "DELETE FROM draft_validations WHERE draft_id = ?1",
            params![id.value() as i64],
        )?;
        let deleted = self
            .conn
            .execute("DELETE FROM draft_items WHERE id = ?1", params![id.value() as i64])?;
        Ok(deleted == 1)
    }

    fn query_drafts(&self, query: &DraftQuery) -> Result<Vec<DraftItem>, Self::Error> {
        let mut sql = format!("SELECT {} FROM draft_items WHERE 1=1", DRAFT_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(itemtype) = query.itemtype {
            sql.push_str(" AND itemtype = ?");
            params.push(Box::new(itemtype.code().to_string()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.code().to_string()));
        }

        if let Some(user) = query.created_by {
            sql.push_str(" AND created_by = ?");
            params.push(Box::new(user.value() as i64));
        }

        sql.push_str(" ORDER BY id");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let drafts = stmt
            .query_map(&param_refs[..], Self::row_to_draft)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(drafts)
    }

    fn final_exists(&self, id: &FinalId) -> Result<bool, Self::Error> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM final_items WHERE final_id = ?1 AND status = 'F'",
                params![id.as_str()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    fn get_final(&self, id: &FinalId) -> Result<Option<FinalItem>, Self::Error> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {} FROM final_items WHERE final_id = ?1", FINAL_COLUMNS),
                params![id.as_str()],
                Self::row_to_final,
            )
            .optional()?;
        Ok(item)
    }

    fn create_final(&mut self, draft: &DraftItem) -> Result<FinalItem, Self::Error> {
        let seq: i64 = self.conn.query_row(
            "SELECT next_value FROM final_id_seq WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        self.conn
            .execute("UPDATE final_id_seq SET next_value = next_value + 1 WHERE id = 1", [])?;

        let item = FinalItem {
            final_id: FinalId::from_sequence(draft.itemtype, seq as u64),
            itemtype: draft.itemtype,
            status: FinalStatus::Final,
            body: draft.body.clone(),
            created_by: draft.created_by,
            parent: draft.parent.clone(),
            created_at: current_timestamp(),
        };

        self.conn
            .execute(
                "INSERT INTO final_items (final_id, itemtype, status, body, created_by, parent, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    item.final_id.as_str(),
                    item.itemtype.code().to_string(),
                    item.status.code().to_string(),
                    &item.body,
                    item.created_by.value() as i64,
                    item.parent.as_ref().map(|p| p.as_str()),
                    item.created_at as i64,
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::Integrity(format!("Item id '{}' already assigned", item.final_id))
                } else {
                    e.into()
                }
            })?;

        tracing::debug!(final_id = %item.final_id, draft_id = %draft.id, "final item created");
        Ok(item)
    }

    fn set_final_status(&mut self, id: &FinalId, status: FinalStatus) -> Result<bool, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE final_items SET status = ?1 WHERE final_id = ?2",
            params![status.code().to_string(), id.as_str()],
        )?;
        Ok(changed == 1)
    }

    fn query_finals(&self, query: &FinalQuery) -> Result<Vec<FinalItem>, Self::Error> {
        let mut sql = format!("SELECT {} FROM final_items WHERE 1=1", FINAL_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(itemtype) = query.itemtype {
            sql.push_str(" AND itemtype = ?");
            params.push(Box::new(itemtype.code().to_string()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.code().to_string()));
        }

        if let Some(user) = query.created_by {
            sql.push_str(" AND created_by = ?");
            params.push(Box::new(user.value() as i64));
        }

        if let Some(parent) = &query.parent {
            sql.push_str(" AND parent = ?");
            params.push(Box::new(parent.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_at, rowid");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let items = stmt
            .query_map(&param_refs[..], Self::row_to_final)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn add_media(&mut self, media: &MediaItem) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO media_items (public_id, kind, path) VALUES (?1, ?2, ?3)
             ON CONFLICT(public_id, kind) DO UPDATE SET path = excluded.path",
            params![media.public_id.as_str(), media.kind.code().to_string(), &media.path],
        )?;
        Ok(())
    }

    fn media_exists(&self, id: &MediaId) -> Result<bool, Self::Error> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM media_items WHERE public_id = ?1 AND kind = 'O'",
                params![id.as_str()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    fn count_items(&self) -> Result<ItemCounts, Self::Error> {
        let finals = self.count_by_type(
            "SELECT itemtype, COUNT(*) FROM final_items WHERE status = ?1 GROUP BY itemtype",
            FinalStatus::Final.code(),
        )?;
        let drafts_sql = "SELECT itemtype, COUNT(*) FROM draft_items WHERE status = ?1 GROUP BY itemtype";
        let in_review = self.count_by_type(drafts_sql, DraftStatus::Review.code())?;
        let drafts = self.count_by_type(drafts_sql, DraftStatus::Draft.code())?;
        let users: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;

        Ok(ItemCounts {
            finals,
            in_review,
            drafts,
            users: users as usize,
        })
    }
}

impl SourceStore for SqliteStore {
    type Error = StoreError;

    fn create_source(&mut self, source: NewSource, created_by: UserId) -> Result<RefNode, Self::Error> {
        let fields = source.normalized();
        let now = current_timestamp();
        self.conn.execute(
            "INSERT INTO ref_nodes (created_by, created_at, sourcetype, title, publisher, year,
                 volume, number, series, address, edition, month, journal, pages, isbn10, isbn13, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                created_by.value() as i64,
                now as i64,
                &fields.sourcetype,
                &fields.title,
                &fields.publisher,
                &fields.year,
                &fields.volume,
                &fields.number,
                &fields.series,
                &fields.address,
                &fields.edition,
                &fields.month,
                &fields.journal,
                &fields.pages,
                &fields.isbn10,
                &fields.isbn13,
                &fields.note,
            ],
        )?;
        let id = SourceId::from_value(self.conn.last_insert_rowid() as u64);
        self.link_people(id, "author", &fields.authors)?;
        self.link_people(id, "editor", &fields.editors)?;

        Ok(RefNode {
            id,
            fields,
            created_by,
            created_at: now,
        })
    }

    fn get_source(&self, id: SourceId) -> Result<Option<RefNode>, Self::Error> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM ref_nodes WHERE id = ?1", SOURCE_COLUMNS),
                params![id.value() as i64],
                Self::row_to_source_fields,
            )
            .optional()?;
        raw.map(|r| self.complete_source(r)).transpose()
    }

    fn list_sources(&self) -> Result<Vec<RefNode>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM ref_nodes ORDER BY id", SOURCE_COLUMNS))?;
        let raws = stmt
            .query_map([], Self::row_to_source_fields)?
            .collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(|r| self.complete_source(r)).collect()
    }

    fn list_authors(&self) -> Result<Vec<String>, Self::Error> {
        let mut stmt = self.conn.prepare("SELECT name FROM ref_authors ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn add_validation(&mut self, entry: &ValidationEntry) -> Result<(), Self::Error> {
        let id_bytes = Self::validation_id_to_bytes(entry.id);
        let result = match &entry.target {
            ValidationTarget::Final(final_id) => self.conn.execute(
                "INSERT INTO item_validations (id, final_id, source_id, location, created_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    &id_bytes,
                    final_id.as_str(),
                    entry.source.value() as i64,
                    &entry.location,
                    entry.created_by.value() as i64,
                    entry.created_at as i64,
                ],
            ),
            ValidationTarget::Draft(draft_id) => self.conn.execute(
                "INSERT INTO draft_validations (id, draft_id, source_id, location, created_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    &id_bytes,
                    draft_id.value() as i64,
                    entry.source.value() as i64,
                    &entry.location,
                    entry.created_by.value() as i64,
                    entry.created_at as i64,
                ],
            ),
        };
        result.map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Integrity(format!("Validation {} rejected for {}", entry.id, entry.target))
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    fn get_validation(&self, id: ValidationId) -> Result<Option<ValidationEntry>, Self::Error> {
        let id_bytes = Self::validation_id_to_bytes(id);
        let item = self
            .conn
            .query_row(
                &format!("SELECT {}, final_id FROM item_validations WHERE id = ?1", VALIDATION_COLUMNS),
                params![&id_bytes],
                Self::item_validation_row,
            )
            .optional()?;
        if item.is_some() {
            return Ok(item);
        }
        let draft = self
            .conn
            .query_row(
                &format!("SELECT {}, draft_id FROM draft_validations WHERE id = ?1", VALIDATION_COLUMNS),
                params![&id_bytes],
                Self::draft_validation_row,
            )
            .optional()?;
        Ok(draft)
    }

    fn validations_for(&self, target: &ValidationTarget) -> Result<Vec<ValidationEntry>, Self::Error> {
        let entries = match target {
            ValidationTarget::Final(final_id) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {}, final_id FROM item_validations WHERE final_id = ?1 ORDER BY id",
                    VALIDATION_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![final_id.as_str()], Self::item_validation_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            ValidationTarget::Draft(draft_id) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {}, draft_id FROM draft_validations WHERE draft_id = ?1 ORDER BY id",
                    VALIDATION_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![draft_id.value() as i64], Self::draft_validation_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(entries)
    }

    fn validations_citing(&self, source: SourceId) -> Result<Vec<ValidationEntry>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, final_id FROM item_validations WHERE source_id = ?1",
            VALIDATION_COLUMNS
        ))?;
        let mut entries = stmt
            .query_map(params![source.value() as i64], Self::item_validation_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, draft_id FROM draft_validations WHERE source_id = ?1",
            VALIDATION_COLUMNS
        ))?;
        let drafts = stmt
            .query_map(params![source.value() as i64], Self::draft_validation_row)?
            .collect::<Result<Vec<_>, _>>()?;

        entries.extend(drafts);
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }

    fn add_endorsement(&mut self, endorsement: &Endorsement) -> Result<bool, Self::Error> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO user_item_validations (validation_id, created_by, created_at)
             VALUES (?1, ?2, ?3)",
            params![
                Self::validation_id_to_bytes(endorsement.validation),
                endorsement.created_by.value() as i64,
                endorsement.created_at as i64,
            ],
        )?;
        Ok(inserted == 1)
    }

    fn endorsements(&self, validation: ValidationId) -> Result<Vec<Endorsement>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT created_by, created_at FROM user_item_validations
             WHERE validation_id = ?1 ORDER BY created_at, rowid",
        )?;
        let endorsements = stmt
            .query_map(params![Self::validation_id_to_bytes(validation)], |row| {
                Ok(Endorsement {
                    validation,
                    created_by: UserId::from_value(row.get::<_, i64>(0)? as u64),
                    created_at: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(endorsements)
    }

    fn set_item_points(&mut self, item: &FinalId, points: f64) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO item_points (final_id, points, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(final_id) DO UPDATE SET points = excluded.points, updated_at = excluded.updated_at",
            params![item.as_str(), points, current_timestamp() as i64],
        )?;
        Ok(())
    }

    fn item_points(&self, item: &FinalId) -> Result<Option<f64>, Self::Error> {
        let points = self
            .conn
            .query_row(
                "SELECT points FROM item_points WHERE final_id = ?1",
                params![item.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(points)
    }
}
