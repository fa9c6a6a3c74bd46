use bson::oid::ObjectId;
use log::info;
use model::{
    client::{Client, ClientFields},
    registration::{Registration, RegistrationStatus},
    session::Session,
};
use mongodb::error::{ErrorKind, WriteFailure};
use serde::Serialize;
use storage::{classes::ClassStore, clients::ClientStore, registrations::RegistrationStore};
use tx_macro::tx;

use crate::{error::Error, locks::ClassLocks};

/// Outcome of an admission, rich enough for the UI to render new sign-up,
/// re-registration and forced-overbooking states without a second query.
#[derive(Debug, Serialize, Clone)]
pub struct Admitted {
    pub client_id: ObjectId,
    pub created_new_client: bool,
    pub already_registered: bool,
    pub forced: bool,
}

/// The only writer path for registrations; the capacity invariant lives here
/// and nowhere else.
#[derive(Clone)]
pub struct Admission {
    classes: ClassStore,
    clients: ClientStore,
    registrations: RegistrationStore,
    locks: ClassLocks,
}

impl Admission {
    pub(crate) fn new(
        classes: ClassStore,
        clients: ClientStore,
        registrations: RegistrationStore,
        locks: ClassLocks,
    ) -> Self {
        Admission {
            classes,
            clients,
            registrations,
            locks,
        }
    }

    /// Binds a client (new or existing, resolved by email) to a class.
    ///
    /// The per-class lock is taken before the transaction starts and held
    /// until after commit: a registration only becomes visible to other
    /// sessions at commit time, so releasing the lock any earlier would let
    /// a concurrent admission count the seats before this one lands.
    pub async fn admit(
        &self,
        session: &mut Session,
        form: ClientFields,
        class_id: Option<ObjectId>,
        force: bool,
    ) -> Result<Admitted, Error> {
        let form = form.sanitize();
        validate_identity(&form)?;

        match class_id {
            Some(class_id) => {
                let gate = self.locks.for_class(class_id);
                let _guard = gate.lock().await;
                self.admit_tx(session, form, Some(class_id), force).await
            }
            None => self.admit_tx(session, form, None, force).await,
        }
    }

    #[tx]
    async fn admit_tx(
        &self,
        session: &mut Session,
        form: ClientFields,
        class_id: Option<ObjectId>,
        force: bool,
    ) -> Result<Admitted, Error> {
        let (client_id, created_new_client) = self.resolve_client(session, &form).await?;

        let class_id = match class_id {
            Some(class_id) => class_id,
            None => {
                // Client-only intake, e.g. a walk-in captured by the office.
                return Ok(Admitted {
                    client_id,
                    created_new_client,
                    already_registered: false,
                    forced: false,
                });
            }
        };

        let class = self
            .classes
            .get(session, class_id)
            .await?
            .ok_or(Error::ClassNotFound)?;

        if self
            .registrations
            .get_pair(session, class_id, client_id)
            .await?
            .is_some()
        {
            return Ok(Admitted {
                client_id,
                created_new_client,
                already_registered: true,
                forced: false,
            });
        }

        if class.capacity.is_some() && !force {
            let registered = self.registrations.count_for_class(session, class_id).await?;
            check_capacity(class.capacity, registered)?;
        }

        let registration = Registration::new(class_id, client_id);
        if let Err(err) = self.registrations.insert(session, &registration).await {
            if is_duplicate_key(&err) {
                // The unique (class_id, client_id) index caught a double
                // submit that slipped past the lookup above.
                return Ok(Admitted {
                    client_id,
                    created_new_client,
                    already_registered: true,
                    forced: false,
                });
            }
            return Err(err.into());
        }

        if force {
            info!(
                "Forced admission of {} into class {} past capacity",
                client_id, class_id
            );
        }

        Ok(Admitted {
            client_id,
            created_new_client,
            already_registered: false,
            forced: force,
        })
    }

    /// Looks the client up by email; inserts on first contact, otherwise
    /// merges incoming contact fields non-destructively.
    async fn resolve_client(
        &self,
        session: &mut Session,
        form: &ClientFields,
    ) -> Result<(ObjectId, bool), Error> {
        match self.clients.get_by_email(session, &form.email).await? {
            Some(mut client) => {
                if client.merge(form) {
                    self.clients.update(session, &client).await?;
                }
                Ok((client.id, false))
            }
            None => {
                let client = Client::new(form.clone());
                self.clients.insert(session, &client).await?;
                Ok((client.id, true))
            }
        }
    }

    pub async fn set_status(
        &self,
        session: &mut Session,
        id: ObjectId,
        status: RegistrationStatus,
    ) -> Result<(), Error> {
        self.registrations
            .get(session, id)
            .await?
            .ok_or(Error::RegistrationNotFound)?;
        self.registrations.set_status(session, id, status).await?;
        Ok(())
    }

    /// Unregisters a client from a class, freeing the seat.
    pub async fn remove(
        &self,
        session: &mut Session,
        class_id: ObjectId,
        client_id: ObjectId,
    ) -> Result<(), Error> {
        let removed = self
            .registrations
            .delete_pair(session, class_id, client_id)
            .await?;
        if !removed {
            return Err(Error::RegistrationNotFound);
        }
        Ok(())
    }

    /// Read view Registration ⋈ Client for one class, ordered by name.
    pub async fn roster(
        &self,
        session: &mut Session,
        class_id: ObjectId,
    ) -> Result<Vec<RosterRow>, Error> {
        self.classes
            .get(session, class_id)
            .await?
            .ok_or(Error::ClassNotFound)?;

        let mut rows = Vec::new();
        for registration in self.registrations.find_for_class(session, class_id).await? {
            let client = self
                .clients
                .get(session, registration.client_id)
                .await?
                .ok_or(Error::ClientNotFound)?;
            rows.push(RosterRow {
                first_name: client.first_name,
                last_name: client.last_name,
                email: client.email,
                phone: client.phone,
                dob: client.dob,
                address: client.address,
                status: registration.status,
            });
        }
        rows.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });
        Ok(rows)
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct RosterRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub status: RegistrationStatus,
}

pub(crate) fn validate_identity(form: &ClientFields) -> Result<(), Error> {
    for (value, field) in [
        (&form.first_name, "first_name"),
        (&form.last_name, "last_name"),
        (&form.email, "email"),
    ] {
        if value.is_empty() {
            return Err(Error::validation(format!("{} required", field)));
        }
    }
    if !form.email.contains('@') {
        return Err(Error::validation("email invalid"));
    }
    Ok(())
}

fn check_capacity(capacity: Option<u32>, registered: u64) -> Result<(), Error> {
    match capacity {
        Some(capacity) if registered >= capacity as u64 => Err(Error::ClassFull {
            capacity,
            registered,
        }),
        _ => Ok(()),
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_check_rejects_full_class() {
        let err = check_capacity(Some(2), 2).unwrap_err();
        match err {
            Error::ClassFull {
                capacity,
                registered,
            } => {
                assert_eq!(capacity, 2);
                assert_eq!(registered, 2);
            }
            other => panic!("expected ClassFull, got {other}"),
        }
    }

    #[test]
    fn capacity_check_allows_open_seat() {
        assert!(check_capacity(Some(2), 1).is_ok());
    }

    #[test]
    fn capacity_check_ignores_unlimited() {
        assert!(check_capacity(None, 10_000).is_ok());
    }

    #[test]
    fn capacity_check_rejects_overbooked_class() {
        // force=true skips the check entirely; without force an already
        // overbooked class keeps rejecting.
        assert!(check_capacity(Some(2), 5).is_err());
    }

    #[test]
    fn identity_requires_name_and_email() {
        let mut form = ClientFields {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            ..Default::default()
        };
        assert!(validate_identity(&form).is_ok());

        form.last_name.clear();
        let err = validate_identity(&form).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("last_name")));
    }

    #[test]
    fn duplicate_key_detection_ignores_other_driver_errors() {
        // Only an E11000 write error means "already registered"; anything
        // else must surface as a storage failure.
        assert!(!is_duplicate_key(&mongodb::error::Error::custom(
            "connection reset"
        )));
    }

    #[test]
    fn identity_rejects_bad_email() {
        let form = ClientFields {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "not-an-email".to_string(),
            ..Default::default()
        };
        assert!(validate_identity(&form).is_err());
    }
}
