use bson::oid::ObjectId;
use chrono::{DateTime, Duration, Utc};
use rand::Rng as _;
use serde::{Deserialize, Serialize};

/// A server-side session token handed out at login and carried back in the
/// `auth` cookie. Keys expire by age; expiry is checked on lookup.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthKey {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub key: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl AuthKey {
    pub fn gen(user_id: ObjectId) -> Self {
        let mut buf = [0u8; 32];
        rand::thread_rng().fill(&mut buf);
        AuthKey {
            id: ObjectId::new(),
            user_id,
            key: hex::encode(buf),
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_and_hex() {
        let a = AuthKey::gen(ObjectId::new());
        let b = AuthKey::gen(ObjectId::new());
        assert_eq!(a.key.len(), 64);
        assert_ne!(a.key, b.key);
        assert!(a.key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn expiry_is_age_based() {
        let key = AuthKey::gen(ObjectId::new());
        let ttl = Duration::hours(24);
        assert!(!key.is_expired(ttl, key.created_at + Duration::hours(23)));
        assert!(key.is_expired(ttl, key.created_at + Duration::hours(25)));
    }
}
