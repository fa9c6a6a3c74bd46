use std::sync::Arc;

use bson::doc;
use eyre::Error;
use model::{auth::AuthKey, session::Session};
use mongodb::{Collection, IndexModel};

const COLLECTION: &str = "auth_keys";

#[derive(Clone)]
pub struct AuthKeys {
    keys: Arc<Collection<AuthKey>>,
}

impl AuthKeys {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self, Error> {
        let keys = db.collection(COLLECTION);
        keys.create_index(IndexModel::builder().keys(doc! { "key": 1 }).build())
            .await?;
        Ok(AuthKeys {
            keys: Arc::new(keys),
        })
    }

    pub async fn insert(&self, session: &mut Session, key: &AuthKey) -> Result<(), Error> {
        self.keys.insert_one(key).session(&mut *session).await?;
        Ok(())
    }

    pub async fn get_by_key(
        &self,
        session: &mut Session,
        key: &str,
    ) -> Result<Option<AuthKey>, Error> {
        Ok(self
            .keys
            .find_one(doc! { "key": key })
            .session(&mut *session)
            .await?)
    }

    pub async fn delete_by_key(&self, session: &mut Session, key: &str) -> Result<(), Error> {
        self.keys
            .delete_one(doc! { "key": key })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
