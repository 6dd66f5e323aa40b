use crate::Database;
use crate::models::{PostRow, UserRow};
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension};

impl Database {
    // -- Users --

    /// Insert a user. Returns `None` when the username is already taken.
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<UserRow>> {
        let created_at = now_timestamp();
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, password, created_at) VALUES (?1, ?2, ?3, ?4)",
                (id, username, password_hash, &created_at),
            );

            match inserted {
                Ok(_) => Ok(Some(UserRow {
                    id: id.to_string(),
                    username: username.to_string(),
                    password: password_hash.to_string(),
                    created_at,
                })),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Registration order, capped at `limit`.
    pub fn list_users(&self, limit: u32) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password, created_at FROM users
                 ORDER BY created_at ASC, rowid ASC
                 LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Posts --

    pub fn insert_post(
        &self,
        id: &str,
        wall_owner: &str,
        author: &str,
        content: &str,
    ) -> Result<PostRow> {
        let created_at = now_timestamp();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (id, wall_owner, author, content, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, wall_owner, author, content, &created_at],
            )?;
            Ok(PostRow {
                id: id.to_string(),
                wall_owner: wall_owner.to_string(),
                author: author.to_string(),
                content: content.to_string(),
                created_at,
            })
        })
    }

    /// Posts on `wall_owner`'s wall, newest first.
    pub fn get_wall_posts(&self, wall_owner: &str, limit: u32) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, wall_owner, author, content, created_at FROM posts
                 WHERE wall_owner = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![wall_owner, limit], |row| {
                    Ok(PostRow {
                        id: row.get(0)?,
                        wall_owner: row.get(1)?,
                        author: row.get(2)?,
                        content: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is always one of our own literals, never user input.
    let sql = format!(
        "SELECT id, username, password, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([value], user_from_row).optional()?;

    Ok(row)
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        created_at: row.get(3)?,
    })
}
