use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// A single entry on a user's wall.
///
/// `author` is whoever created the post; `wall_owner` is the user whose wall
/// it appears on. When the two differ the post is a visitor message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub wall_owner: String,
    pub author: String,
    pub content: String,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_visitor_message(&self) -> bool {
        self.author != self.wall_owner
    }
}
