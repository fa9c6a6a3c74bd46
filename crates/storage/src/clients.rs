use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use eyre::Error;
use log::info;
use model::{client::Client, session::Session};
use mongodb::{Collection, IndexModel};

const COLLECTION: &str = "clients";

#[derive(Clone)]
pub struct ClientStore {
    clients: Arc<Collection<Client>>,
}

impl ClientStore {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self, Error> {
        let clients = db.collection(COLLECTION);
        clients
            .create_index(IndexModel::builder().keys(doc! { "email": 1 }).build())
            .await?;
        Ok(ClientStore {
            clients: Arc::new(clients),
        })
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Client>, Error> {
        Ok(self
            .clients
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    /// Emails are stored normalized (lowercase), so lookup is exact-match.
    pub async fn get_by_email(
        &self,
        session: &mut Session,
        email: &str,
    ) -> Result<Option<Client>, Error> {
        Ok(self
            .clients
            .find_one(doc! { "email": email })
            .session(&mut *session)
            .await?)
    }

    pub async fn insert(&self, session: &mut Session, client: &Client) -> Result<(), Error> {
        info!("Inserting client {}", client.email);
        self.clients
            .insert_one(client)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn update(&self, session: &mut Session, client: &Client) -> Result<(), Error> {
        self.clients
            .update_one(
                doc! { "_id": client.id },
                doc! {
                    "$set": {
                        "first_name": &client.first_name,
                        "last_name": &client.last_name,
                        "phone": &client.phone,
                        "dob": &client.dob,
                        "address": &client.address,
                    },
                    "$inc": { "version": 1 },
                },
            )
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn list(&self, session: &mut Session) -> Result<Vec<Client>, Error> {
        let mut cursor = self
            .clients
            .find(doc! {})
            .sort(doc! { "last_name": 1, "first_name": 1 })
            .session(&mut *session)
            .await?;
        let mut clients = Vec::new();
        while let Some(client) = cursor.next(&mut *session).await {
            clients.push(client?);
        }
        Ok(clients)
    }

    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        self.clients
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
