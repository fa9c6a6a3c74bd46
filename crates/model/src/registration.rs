use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Registration {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub class_id: ObjectId,
    pub client_id: ObjectId,
    #[serde(default)]
    pub status: RegistrationStatus,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(class_id: ObjectId, client_id: ObjectId) -> Registration {
        Registration {
            id: ObjectId::new(),
            class_id,
            client_id,
            status: RegistrationStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Legacy rows carry empty/unknown statuses; those read back as Pending.
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
pub enum RegistrationStatus {
    Paid,
    // serde requires the catch-all variant to come last
    #[default]
    #[serde(other)]
    Pending,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    #[test]
    fn status_round_trips_lowercase() {
        assert_eq!(RegistrationStatus::Paid.to_string(), "paid");
        assert_eq!(
            RegistrationStatus::from_str("paid").unwrap(),
            RegistrationStatus::Paid
        );
        assert!(RegistrationStatus::from_str("refunded").is_err());
    }

    #[test]
    fn unknown_stored_status_reads_back_pending() {
        for raw in ["refunded", "", "PAID?"] {
            let status: RegistrationStatus =
                bson::from_bson(bson::Bson::String(raw.to_string())).unwrap();
            assert_eq!(status, RegistrationStatus::Pending);
        }
        let paid: RegistrationStatus =
            bson::from_bson(bson::Bson::String("paid".to_string())).unwrap();
        assert_eq!(paid, RegistrationStatus::Paid);
    }
}
