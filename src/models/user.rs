use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub email: String,

    #[serde(default)]
    pub username: Option<String>,

    pub password_hash: String,

    // Gates the /admin area.
    #[serde(default)]
    pub is_admin: bool,
}

/// Lightweight copy stored in request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: ObjectId,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
}

impl From<User> for CurrentUser {
    fn from(u: User) -> Self {
        CurrentUser {
            id: u.id,
            username: u.username.unwrap_or_else(|| u.email.clone()),
            email: u.email,
            is_admin: u.is_admin,
        }
    }
}
