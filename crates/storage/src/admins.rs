use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use eyre::Error;
use log::info;
use model::{admin::AdminUser, session::Session};
use mongodb::{options::IndexOptions, Collection, IndexModel};

const COLLECTION: &str = "admins";

#[derive(Clone)]
pub struct AdminStore {
    admins: Arc<Collection<AdminUser>>,
}

impl AdminStore {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self, Error> {
        let admins = db.collection(COLLECTION);
        admins
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        Ok(AdminStore {
            admins: Arc::new(admins),
        })
    }

    pub async fn get(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<Option<AdminUser>, Error> {
        Ok(self
            .admins
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn get_by_email(
        &self,
        session: &mut Session,
        email: &str,
    ) -> Result<Option<AdminUser>, Error> {
        Ok(self
            .admins
            .find_one(doc! { "email": email })
            .session(&mut *session)
            .await?)
    }

    pub async fn count(&self, session: &mut Session) -> Result<u64, Error> {
        Ok(self
            .admins
            .count_documents(doc! {})
            .session(&mut *session)
            .await?)
    }

    pub async fn insert(&self, session: &mut Session, user: &AdminUser) -> Result<(), Error> {
        info!("Inserting admin {}", user.email);
        self.admins.insert_one(user).session(&mut *session).await?;
        Ok(())
    }

    pub async fn list(&self, session: &mut Session) -> Result<Vec<AdminUser>, Error> {
        let mut cursor = self
            .admins
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .session(&mut *session)
            .await?;
        let mut admins = Vec::new();
        while let Some(admin) = cursor.next(&mut *session).await {
            admins.push(admin?);
        }
        Ok(admins)
    }

    pub async fn set_email(
        &self,
        session: &mut Session,
        id: ObjectId,
        email: &str,
    ) -> Result<(), Error> {
        self.admins
            .update_one(doc! { "_id": id }, doc! { "$set": { "email": email } })
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn set_password_hash(
        &self,
        session: &mut Session,
        id: ObjectId,
        password_hash: &str,
    ) -> Result<(), Error> {
        self.admins
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "password_hash": password_hash } },
            )
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        self.admins
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
