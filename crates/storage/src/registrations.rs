use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use eyre::Error;
use model::{
    registration::{Registration, RegistrationStatus},
    session::Session,
};
use mongodb::{options::IndexOptions, Collection, IndexModel};

const COLLECTION: &str = "registrations";

#[derive(Clone)]
pub struct RegistrationStore {
    registrations: Arc<Collection<Registration>>,
}

impl RegistrationStore {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self, Error> {
        let registrations: Collection<Registration> = db.collection(COLLECTION);
        // One registration per (class, client); admission relies on this as
        // the backstop for its idempotency check.
        registrations
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "class_id": 1, "client_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        registrations
            .create_index(IndexModel::builder().keys(doc! { "client_id": 1 }).build())
            .await?;
        Ok(RegistrationStore {
            registrations: Arc::new(registrations),
        })
    }

    pub async fn get(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<Option<Registration>, Error> {
        Ok(self
            .registrations
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn get_pair(
        &self,
        session: &mut Session,
        class_id: ObjectId,
        client_id: ObjectId,
    ) -> Result<Option<Registration>, Error> {
        Ok(self
            .registrations
            .find_one(doc! { "class_id": class_id, "client_id": client_id })
            .session(&mut *session)
            .await?)
    }

    pub async fn count_for_class(
        &self,
        session: &mut Session,
        class_id: ObjectId,
    ) -> Result<u64, Error> {
        Ok(self
            .registrations
            .count_documents(doc! { "class_id": class_id })
            .session(&mut *session)
            .await?)
    }

    pub async fn count_for_client(
        &self,
        session: &mut Session,
        client_id: ObjectId,
    ) -> Result<u64, Error> {
        Ok(self
            .registrations
            .count_documents(doc! { "client_id": client_id })
            .session(&mut *session)
            .await?)
    }

    pub async fn insert(
        &self,
        session: &mut Session,
        registration: &Registration,
    ) -> Result<(), mongodb::error::Error> {
        // Returns the raw driver error so admission can spot E11000.
        self.registrations
            .insert_one(registration)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn set_status(
        &self,
        session: &mut Session,
        id: ObjectId,
        status: RegistrationStatus,
    ) -> Result<(), Error> {
        self.registrations
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.to_string() } },
            )
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn find_for_class(
        &self,
        session: &mut Session,
        class_id: ObjectId,
    ) -> Result<Vec<Registration>, Error> {
        let mut cursor = self
            .registrations
            .find(doc! { "class_id": class_id })
            .session(&mut *session)
            .await?;
        let mut registrations = Vec::new();
        while let Some(registration) = cursor.next(&mut *session).await {
            registrations.push(registration?);
        }
        Ok(registrations)
    }

    pub async fn find_for_client(
        &self,
        session: &mut Session,
        client_id: ObjectId,
    ) -> Result<Vec<Registration>, Error> {
        let mut cursor = self
            .registrations
            .find(doc! { "client_id": client_id })
            .session(&mut *session)
            .await?;
        let mut registrations = Vec::new();
        while let Some(registration) = cursor.next(&mut *session).await {
            registrations.push(registration?);
        }
        Ok(registrations)
    }

    pub async fn delete_pair(
        &self,
        session: &mut Session,
        class_id: ObjectId,
        client_id: ObjectId,
    ) -> Result<bool, Error> {
        let result = self
            .registrations
            .delete_one(doc! { "class_id": class_id, "client_id": client_id })
            .session(&mut *session)
            .await?;
        Ok(result.deleted_count == 1)
    }
}
