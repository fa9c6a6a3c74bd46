use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A staff account for the admin dashboard. The bcrypt hash stays in this
/// struct for storage; the API layer exposes `AdminView` instead.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminUser {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

fn default_role() -> String {
    "admin".to_string()
}

impl AdminUser {
    pub fn new(email: String, password_hash: String) -> AdminUser {
        AdminUser {
            id: ObjectId::new(),
            email,
            password_hash,
            role: default_role(),
            created_at: Utc::now(),
        }
    }
}

/// What the dashboard sees; never stored, so dates serialize as plain JSON.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminView {
    pub id: ObjectId,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<AdminUser> for AdminView {
    fn from(user: AdminUser) -> AdminView {
        AdminView {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
