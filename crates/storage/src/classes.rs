use std::sync::Arc;

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use eyre::Error;
use model::{
    class::{Class, ClassFields},
    session::Session,
};
use mongodb::{Collection, IndexModel};

const COLLECTION: &str = "classes";

/// Optional filters for class listings; both bounds are inclusive on the
/// scheduled start time, so unscheduled classes fall out of any dated query.
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub course_type: Option<String>,
}

impl ClassFilter {
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && self.course_type.is_none()
    }

    fn to_query(&self) -> Document {
        let mut query = doc! {};
        let mut range = doc! {};
        if let Some(from) = self.from {
            range.insert("$gte", bson::DateTime::from_chrono(from));
        }
        if let Some(to) = self.to {
            range.insert("$lte", bson::DateTime::from_chrono(to));
        }
        if !range.is_empty() {
            query.insert("start_at", range);
        }
        if let Some(course_type) = &self.course_type {
            query.insert("course_type", course_type);
        }
        query
    }
}

#[derive(Clone)]
pub struct ClassStore {
    classes: Arc<Collection<Class>>,
}

impl ClassStore {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self, Error> {
        let classes = db.collection(COLLECTION);
        classes
            .create_index(IndexModel::builder().keys(doc! { "start_at": -1 }).build())
            .await?;
        Ok(ClassStore {
            classes: Arc::new(classes),
        })
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Class>, Error> {
        Ok(self
            .classes
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn insert(&self, session: &mut Session, class: &Class) -> Result<(), Error> {
        self.classes
            .insert_one(class)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn list(
        &self,
        session: &mut Session,
        filter: &ClassFilter,
    ) -> Result<Vec<Class>, Error> {
        let mut cursor = self
            .classes
            .find(filter.to_query())
            .sort(doc! { "start_at": -1 })
            .session(&mut *session)
            .await?;
        let mut classes = Vec::new();
        while let Some(class) = cursor.next(&mut *session).await {
            classes.push(class?);
        }
        Ok(classes)
    }

    pub async fn update(
        &self,
        session: &mut Session,
        id: ObjectId,
        fields: &ClassFields,
    ) -> Result<(), Error> {
        self.classes
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "course_type": &fields.course_type,
                        "start_at": fields.start_at.map(bson::DateTime::from_chrono),
                        "location": &fields.location,
                        "price": fields.price,
                        "capacity": fields.capacity.map(|c| c as i64),
                        "notes": &fields.notes,
                    },
                    "$inc": { "version": 1 },
                },
            )
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        self.classes
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
