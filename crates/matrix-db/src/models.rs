//! Database row types. These map directly to SQLite rows and stay separate
//! from the matrix-types wire models.
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct PostRow {
    pub id: String,
    pub wall_owner: String,
    pub author: String,
    pub content: String,
    pub created_at: String,
}
