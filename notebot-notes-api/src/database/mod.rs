pub mod migrations;

use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use shared_types::{NoteOut, UserOut};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub type DbConnection = Arc<Mutex<Connection>>;

/// A stored user, including the password hash
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserOut {
    fn from(user: UserRecord) -> Self {
        UserOut {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// One page of a user's notes plus the number of notes matching the filter
#[derive(Debug, Clone)]
pub struct NotePage {
    pub notes: Vec<NoteOut>,
    pub total: i64,
}

pub struct Database {
    connection: DbConnection,
}

impl Database {
    pub fn new(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> AppResult<Self> {
        // SQLite ships with foreign keys disabled
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations::run_migrations(&mut conn)?;
        Ok(Database {
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))
    }

    // ============ Users ============

    /// Insert a user. Returns `None` when the email is already registered.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<Option<UserRecord>> {
        let conn = self.lock()?;
        let created_at = Utc::now().timestamp();

        let inserted = conn.execute(
            "INSERT INTO users (name, email, password, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(email) DO NOTHING",
            params![name, email, password_hash, created_at],
        )?;
        if inserted == 0 {
            return Ok(None);
        }

        Ok(Some(UserRecord {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: timestamp(created_at),
        }))
    }

    pub fn get_user_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                "SELECT id, name, email, password, created_at FROM users WHERE email = ?1",
                [email],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        password_hash: row.get(3)?,
                        created_at: timestamp(row.get(4)?),
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Remove a user and, through the foreign key, all of their notes.
    ///
    /// No route exposes this. It is test support for account-removal cases,
    /// such as a still-valid token whose user is gone.
    #[doc(hidden)]
    pub fn delete_user(&self, user_id: i64) -> AppResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [user_id])?;
        Ok(deleted > 0)
    }

    // ============ Notes ============

    pub fn get_note(&self, note_id: i64, owner_id: i64) -> AppResult<Option<NoteOut>> {
        let conn = self.lock()?;
        let note = conn
            .query_row(
                "SELECT id, title, note, created_at FROM notes WHERE id = ?1 AND owner_id = ?2",
                params![note_id, owner_id],
                note_from_row,
            )
            .optional()?;
        Ok(note)
    }

    /// Newest first, filtered on titles containing `search`
    pub fn list_notes(
        &self,
        owner_id: i64,
        limit: u32,
        page: u32,
        search: &str,
    ) -> AppResult<NotePage> {
        let conn = self.lock()?;
        let pattern = format!("%{}%", escape_like(search));
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notes WHERE owner_id = ?1 AND title LIKE ?2 ESCAPE '\\'",
            params![owner_id, pattern],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, title, note, created_at FROM notes
             WHERE owner_id = ?1 AND title LIKE ?2 ESCAPE '\\'
             ORDER BY created_at DESC, id DESC
             LIMIT ?3 OFFSET ?4",
        )?;
        let notes = stmt
            .query_map(params![owner_id, pattern, limit, offset], note_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NotePage { notes, total })
    }

    pub fn create_note(&self, owner_id: i64, title: &str, note: &str) -> AppResult<NoteOut> {
        let conn = self.lock()?;
        let created_at = Utc::now().timestamp();
        conn.execute(
            "INSERT INTO notes (title, note, created_at, owner_id) VALUES (?1, ?2, ?3, ?4)",
            params![title, note, created_at, owner_id],
        )?;

        Ok(NoteOut {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            note: note.to_string(),
            created_at: timestamp(created_at),
        })
    }

    /// Returns `None` when the note does not exist or belongs to someone else
    pub fn update_note(
        &self,
        note_id: i64,
        owner_id: i64,
        title: &str,
        note: &str,
    ) -> AppResult<Option<NoteOut>> {
        let conn = self.lock()?;
        let updated = conn
            .query_row(
                "UPDATE notes SET title = ?1, note = ?2 WHERE id = ?3 AND owner_id = ?4
                 RETURNING id, title, note, created_at",
                params![title, note, note_id, owner_id],
                note_from_row,
            )
            .optional()?;
        Ok(updated)
    }

    pub fn delete_note(&self, note_id: i64, owner_id: i64) -> AppResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND owner_id = ?2",
            params![note_id, owner_id],
        )?;
        Ok(deleted > 0)
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<NoteOut> {
    Ok(NoteOut {
        id: row.get(0)?,
        title: row.get(1)?,
        note: row.get(2)?,
        created_at: timestamp(row.get(3)?),
    })
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
