use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use matrix_db::models::{PostRow, UserRow};
use matrix_types::models::{Post, User};

pub fn user_from_row(row: UserRow) -> User {
    User {
        id: parse_id(&row.id, "user"),
        created_at: parse_timestamp(&row.created_at, &row.id),
        username: row.username,
    }
}

pub fn post_from_row(row: PostRow) -> Post {
    Post {
        id: parse_id(&row.id, "post"),
        created_at: parse_timestamp(&row.created_at, &row.id),
        wall_owner: row.wall_owner,
        author: row.author,
        content: row.content,
    }
}

fn parse_id(raw: &str, kind: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", kind, raw, e);
        Uuid::default()
    })
}

fn parse_timestamp(raw: &str, row_id: &str) -> DateTime<Utc> {
    matrix_types::timestamp::parse(raw).unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on row '{}'", raw, row_id);
        DateTime::default()
    })
}
