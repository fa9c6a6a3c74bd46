use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Class {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub course_type: String,
    #[serde(default)]
    #[serde(with = "crate::datetime::opt_chrono_datetime_as_bson_datetime")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    /// None means unlimited seats.
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Class {
    pub fn new(fields: ClassFields) -> Class {
        Class {
            id: ObjectId::new(),
            course_type: fields.course_type,
            start_at: fields.start_at,
            location: fields.location,
            price: fields.price,
            capacity: fields.capacity,
            notes: fields.notes,
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// Seats left given a live registration count. None when unlimited.
    pub fn spots_left(&self, registered: u64) -> Option<u64> {
        self.capacity
            .map(|cap| (cap as u64).saturating_sub(registered))
    }
}

/// Mutable class attributes as they arrive from the admin UI.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ClassFields {
    pub course_type: String,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(capacity: Option<u32>) -> Class {
        Class::new(ClassFields {
            course_type: "BLS".to_string(),
            capacity,
            ..Default::default()
        })
    }

    #[test]
    fn spots_left_unlimited() {
        assert_eq!(class(None).spots_left(42), None);
    }

    #[test]
    fn spots_left_counts_down() {
        assert_eq!(class(Some(10)).spots_left(3), Some(7));
    }

    #[test]
    fn spots_left_clamps_at_zero() {
        // forced admissions can push past capacity
        assert_eq!(class(Some(2)).spots_left(5), Some(0));
    }
}
