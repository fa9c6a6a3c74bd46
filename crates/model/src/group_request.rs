use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An inquiry about on-site training for a whole organization. Never tied to
/// a class or client record; the office follows up by hand.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GroupRequest {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub org_name: String,
    pub contact_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub course_type: String,
    pub participants: u32,
    #[serde(default)]
    pub location_pref: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub preferred_dates: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: GroupRequestStatus,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl GroupRequest {
    pub fn new(form: GroupRequestForm) -> GroupRequest {
        let now = Utc::now();
        GroupRequest {
            id: ObjectId::new(),
            org_name: form.org_name,
            contact_name: form.contact_name,
            email: form.email,
            phone: form.phone,
            course_type: form.course_type,
            participants: form.participants,
            location_pref: form.location_pref,
            address: form.address,
            preferred_dates: form.preferred_dates,
            notes: form.notes,
            status: GroupRequestStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GroupRequestStatus {
    #[default]
    New,
    Contacted,
    Scheduled,
    Closed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GroupRequestForm {
    #[serde(default)]
    pub org_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub course_type: String,
    #[serde(default)]
    pub participants: u32,
    #[serde(default)]
    pub location_pref: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub preferred_dates: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}
