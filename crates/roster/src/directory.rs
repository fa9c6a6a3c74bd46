use std::collections::HashMap;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use model::{
    client::{Client, ClientFields},
    registration::RegistrationStatus,
    session::Session,
};
use serde::Serialize;
use storage::{
    classes::{ClassFilter, ClassStore},
    clients::ClientStore,
    registrations::RegistrationStore,
};
use tx_macro::tx;

use crate::error::Error;

/// One line of the admin clients listing: a client joined with one of their
/// registrations (class columns empty for clients who never registered).
#[derive(Debug, Serialize, Clone)]
pub struct ClientListRow {
    pub client_id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub status: Option<RegistrationStatus>,
    pub class_id: Option<ObjectId>,
    pub course_type: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

#[derive(Clone)]
pub struct Directory {
    clients: ClientStore,
    classes: ClassStore,
    registrations: RegistrationStore,
}

impl Directory {
    pub(crate) fn new(
        clients: ClientStore,
        classes: ClassStore,
        registrations: RegistrationStore,
    ) -> Self {
        Directory {
            clients,
            classes,
            registrations,
        }
    }

    pub async fn find_by_email(
        &self,
        session: &mut Session,
        email: &str,
    ) -> Result<Option<Client>, Error> {
        Ok(self
            .clients
            .get_by_email(session, &model::client::normalize_email(email))
            .await?)
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Client, Error> {
        self.clients
            .get(session, id)
            .await?
            .ok_or(Error::ClientNotFound)
    }

    /// Direct admin entry. Unlike admission this is not an upsert: a taken
    /// email is a conflict, not a merge.
    #[tx]
    pub async fn create(
        &self,
        session: &mut Session,
        fields: ClientFields,
    ) -> Result<ObjectId, Error> {
        let fields = fields.sanitize();
        crate::admission::validate_identity(&fields)?;
        if self.clients.get_by_email(session, &fields.email).await?.is_some() {
            return Err(Error::EmailTaken);
        }
        let client = Client::new(fields);
        self.clients.insert(session, &client).await?;
        Ok(client.id)
    }

    /// Admin edit; same non-destructive merge as admission.
    #[tx]
    pub async fn update(
        &self,
        session: &mut Session,
        id: ObjectId,
        fields: ClientFields,
    ) -> Result<(), Error> {
        let mut client = self
            .clients
            .get(session, id)
            .await?
            .ok_or(Error::ClientNotFound)?;
        if client.merge(&fields.sanitize()) {
            self.clients.update(session, &client).await?;
        }
        Ok(())
    }

    /// Blocked while any registration references the client.
    #[tx]
    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        self.clients
            .get(session, id)
            .await?
            .ok_or(Error::ClientNotFound)?;
        let registrations = self.registrations.count_for_client(session, id).await?;
        crate::catalog::check_unreferenced(registrations)?;
        self.clients.delete(session, id).await?;
        Ok(())
    }

    /// Clients joined with their registrations. With a class filter only
    /// rows registered into matching classes come back; without one,
    /// never-registered clients appear too, their class columns empty.
    pub async fn list(
        &self,
        session: &mut Session,
        filter: &ClassFilter,
    ) -> Result<Vec<ClientListRow>, Error> {
        let classes: HashMap<ObjectId, _> = self
            .classes
            .list(session, filter)
            .await?
            .into_iter()
            .map(|class| (class.id, class))
            .collect();

        let mut rows = Vec::new();
        for client in self.clients.list(session).await? {
            let registrations = self.registrations.find_for_client(session, client.id).await?;
            let mut matched = false;
            for registration in &registrations {
                if let Some(class) = classes.get(&registration.class_id) {
                    matched = true;
                    rows.push(ClientListRow {
                        client_id: client.id,
                        first_name: client.first_name.clone(),
                        last_name: client.last_name.clone(),
                        email: client.email.clone(),
                        phone: client.phone.clone(),
                        dob: client.dob.clone(),
                        status: Some(registration.status),
                        class_id: Some(class.id),
                        course_type: Some(class.course_type.clone()),
                        start_at: class.start_at,
                        location: class.location.clone(),
                    });
                }
            }
            if !matched && filter.is_empty() {
                rows.push(ClientListRow {
                    client_id: client.id,
                    first_name: client.first_name.clone(),
                    last_name: client.last_name.clone(),
                    email: client.email.clone(),
                    phone: client.phone.clone(),
                    dob: client.dob.clone(),
                    status: None,
                    class_id: None,
                    course_type: None,
                    start_at: None,
                    location: None,
                });
            }
        }

        // Newest class first, then by name, matching the dashboard ordering.
        rows.sort_by(|a, b| {
            b.start_at
                .cmp(&a.start_at)
                .then_with(|| a.last_name.cmp(&b.last_name))
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(rows)
    }
}
