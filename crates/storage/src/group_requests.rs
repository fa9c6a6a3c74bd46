use std::sync::Arc;

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use eyre::Error;
use model::{
    group_request::{GroupRequest, GroupRequestStatus},
    session::Session,
};
use mongodb::{Collection, IndexModel};

const COLLECTION: &str = "group_requests";

// The admin list view is capped; nobody pages past this in practice.
const LIST_LIMIT: i64 = 500;

#[derive(Debug, Clone, Default)]
pub struct GroupRequestFilter {
    pub status: Option<GroupRequestStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl GroupRequestFilter {
    fn to_query(&self) -> Document {
        let mut query = doc! {};
        if let Some(status) = self.status {
            query.insert("status", status.to_string());
        }
        let mut range = doc! {};
        if let Some(from) = self.from {
            range.insert("$gte", bson::DateTime::from_chrono(from));
        }
        if let Some(to) = self.to {
            range.insert("$lte", bson::DateTime::from_chrono(to));
        }
        if !range.is_empty() {
            query.insert("created_at", range);
        }
        query
    }
}

#[derive(Clone)]
pub struct GroupRequestStore {
    requests: Arc<Collection<GroupRequest>>,
}

impl GroupRequestStore {
    pub(crate) async fn new(db: &mongodb::Database) -> Result<Self, Error> {
        let requests = db.collection(COLLECTION);
        requests
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "created_at": -1 })
                    .build(),
            )
            .await?;
        requests
            .create_index(IndexModel::builder().keys(doc! { "status": 1 }).build())
            .await?;
        Ok(GroupRequestStore {
            requests: Arc::new(requests),
        })
    }

    pub async fn add(&self, session: &mut Session, request: &GroupRequest) -> Result<(), Error> {
        self.requests
            .insert_one(request)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn get(
        &self,
        session: &mut Session,
        id: ObjectId,
    ) -> Result<Option<GroupRequest>, Error> {
        Ok(self
            .requests
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn list(
        &self,
        session: &mut Session,
        filter: &GroupRequestFilter,
    ) -> Result<Vec<GroupRequest>, Error> {
        let mut cursor = self
            .requests
            .find(filter.to_query())
            .sort(doc! { "created_at": -1 })
            .limit(LIST_LIMIT)
            .session(&mut *session)
            .await?;
        let mut requests = Vec::new();
        while let Some(request) = cursor.next(&mut *session).await {
            requests.push(request?);
        }
        Ok(requests)
    }

    pub async fn update(
        &self,
        session: &mut Session,
        id: ObjectId,
        status: Option<GroupRequestStatus>,
        notes: Option<&str>,
    ) -> Result<(), Error> {
        let mut set = doc! { "updated_at": bson::DateTime::now() };
        if let Some(status) = status {
            set.insert("status", status.to_string());
        }
        if let Some(notes) = notes {
            set.insert("notes", notes);
        }
        self.requests
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
