/// Serde helper for `Option<DateTime<Utc>>` stored as an optional bson date.
///
/// bson ships `chrono_datetime_as_bson_datetime` for the non-optional case
/// only, so nullable fields (e.g. an unscheduled class) go through here.
pub mod opt_chrono_datetime_as_bson_datetime {
    use bson::DateTime as BsonDateTime;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(BsonDateTime::from_chrono).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<BsonDateTime>::deserialize(deserializer)?.map(|dt| dt.to_chrono()))
    }
}
