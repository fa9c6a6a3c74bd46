use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use model::{
    class::{Class, ClassFields},
    session::Session,
};
use serde::Serialize;
use storage::{
    classes::{ClassFilter, ClassStore},
    registrations::RegistrationStore,
};
use tx_macro::tx;

use crate::{error::Error, locks::ClassLocks};

/// Reduced class view for the public registration page.
#[derive(Debug, Serialize, Clone)]
pub struct PublicClass {
    pub id: ObjectId,
    pub course_type: String,
    pub start_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub price: Option<f64>,
    pub capacity: Option<u32>,
    pub registrations: u64,
    /// None when the class has no capacity limit.
    pub spots_left: Option<u64>,
}

#[derive(Clone)]
pub struct Catalog {
    classes: ClassStore,
    registrations: RegistrationStore,
    locks: ClassLocks,
}

impl Catalog {
    pub(crate) fn new(
        classes: ClassStore,
        registrations: RegistrationStore,
        locks: ClassLocks,
    ) -> Self {
        Catalog {
            classes,
            registrations,
            locks,
        }
    }

    pub async fn create(
        &self,
        session: &mut Session,
        fields: ClassFields,
    ) -> Result<ObjectId, Error> {
        if fields.course_type.trim().is_empty() {
            return Err(Error::validation("course_type required"));
        }
        let class = Class::new(fields);
        self.classes.insert(session, &class).await?;
        Ok(class.id)
    }

    pub async fn list(
        &self,
        session: &mut Session,
        filter: &ClassFilter,
    ) -> Result<Vec<Class>, Error> {
        Ok(self.classes.list(session, filter).await?)
    }

    /// Listing with live registration counts for the dashboard table.
    pub async fn list_with_counts(
        &self,
        session: &mut Session,
        filter: &ClassFilter,
    ) -> Result<Vec<(Class, u64)>, Error> {
        let mut rows = Vec::new();
        for class in self.classes.list(session, filter).await? {
            let registered = self.registrations.count_for_class(session, class.id).await?;
            rows.push((class, registered));
        }
        Ok(rows)
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Class, Error> {
        self.classes
            .get(session, id)
            .await?
            .ok_or(Error::ClassNotFound)
    }

    pub async fn public_view(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<PublicClass, Error> {
        let class = self.get(session, id).await?;
        let registrations = self.registrations.count_for_class(session, id).await?;
        Ok(PublicClass {
            id: class.id,
            course_type: class.course_type.clone(),
            start_at: class.start_at,
            location: class.location.clone(),
            price: class.price,
            capacity: class.capacity,
            registrations,
            spots_left: class.spots_left(registrations),
        })
    }

    /// Rejects a capacity below the live registration count. Holds the class
    /// lock so the count cannot grow between the guard check and the write.
    pub async fn update(
        &self,
        session: &mut Session,
        id: ObjectId,
        fields: ClassFields,
    ) -> Result<(), Error> {
        if fields.course_type.trim().is_empty() {
            return Err(Error::validation("course_type required"));
        }
        let gate = self.locks.for_class(id);
        let _guard = gate.lock().await;
        self.update_tx(session, id, fields).await
    }

    #[tx]
    async fn update_tx(
        &self,
        session: &mut Session,
        id: ObjectId,
        fields: ClassFields,
    ) -> Result<(), Error> {
        self.classes
            .get(session, id)
            .await?
            .ok_or(Error::ClassNotFound)?;
        if let Some(capacity) = fields.capacity {
            let registered = self.registrations.count_for_class(session, id).await?;
            check_capacity_cut(capacity, registered)?;
        }
        self.classes.update(session, id, &fields).await?;
        Ok(())
    }

    /// Blocked while any registration references the class.
    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        let gate = self.locks.for_class(id);
        let _guard = gate.lock().await;
        self.delete_tx(session, id).await
    }

    #[tx]
    async fn delete_tx(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        self.classes
            .get(session, id)
            .await?
            .ok_or(Error::ClassNotFound)?;
        let registrations = self.registrations.count_for_class(session, id).await?;
        check_unreferenced(registrations)?;
        self.classes.delete(session, id).await?;
        Ok(())
    }
}

fn check_capacity_cut(capacity: u32, registered: u64) -> Result<(), Error> {
    if (capacity as u64) < registered {
        return Err(Error::CapacityBelowRegistered {
            capacity,
            registered,
        });
    }
    Ok(())
}

/// Shared by class and client deletion: a record with live registrations
/// stays put.
pub(crate) fn check_unreferenced(registrations: u64) -> Result<(), Error> {
    if registrations > 0 {
        return Err(Error::DeleteBlocked { registrations });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_cut_below_live_count_is_a_conflict() {
        let err = check_capacity_cut(1, 4).unwrap_err();
        match err {
            Error::CapacityBelowRegistered {
                capacity,
                registered,
            } => {
                assert_eq!(capacity, 1);
                assert_eq!(registered, 4);
            }
            other => panic!("expected CapacityBelowRegistered, got {other}"),
        }
    }

    #[test]
    fn capacity_cut_down_to_live_count_is_allowed() {
        assert!(check_capacity_cut(4, 4).is_ok());
        assert!(check_capacity_cut(5, 4).is_ok());
        assert!(check_capacity_cut(0, 0).is_ok());
    }

    #[test]
    fn delete_blocked_reports_the_blocking_count() {
        let err = check_unreferenced(3).unwrap_err();
        assert!(matches!(err, Error::DeleteBlocked { registrations: 3 }));
        assert!(check_unreferenced(0).is_ok());
    }
}
