use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Client {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    /// Natural dedup key; always stored normalized (see `normalize_email`).
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Client {
    pub fn new(fields: ClientFields) -> Client {
        Client {
            id: ObjectId::new(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone: fields.phone,
            dob: fields.dob,
            address: fields.address,
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// Non-destructive merge: an empty incoming field never clears a stored
    /// value. Returns true if anything changed.
    pub fn merge(&mut self, fields: &ClientFields) -> bool {
        let mut changed = false;
        if !fields.first_name.is_empty() && fields.first_name != self.first_name {
            self.first_name = fields.first_name.clone();
            changed = true;
        }
        if !fields.last_name.is_empty() && fields.last_name != self.last_name {
            self.last_name = fields.last_name.clone();
            changed = true;
        }
        changed |= merge_opt(&mut self.phone, &fields.phone);
        changed |= merge_opt(&mut self.dob, &fields.dob);
        changed |= merge_opt(&mut self.address, &fields.address);
        changed
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn merge_opt(current: &mut Option<String>, incoming: &Option<String>) -> bool {
    match incoming {
        Some(value) if !value.is_empty() && current.as_deref() != Some(value) => {
            *current = Some(value.clone());
            true
        }
        _ => false,
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Contact fields as they arrive from the registration form.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ClientFields {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ClientFields {
    /// Trims whitespace, lowercases the email and drops empty optionals.
    pub fn sanitize(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = normalize_email(&self.email);
        for field in [&mut self.phone, &mut self.dob, &mut self.address] {
            if let Some(value) = field {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    *field = None;
                } else if trimmed.len() != value.len() {
                    *value = trimmed.to_string();
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Client {
        Client::new(ClientFields {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            phone: Some("555-0100".to_string()),
            dob: Some("1990-01-02".to_string()),
            address: None,
        })
    }

    #[test]
    fn merge_keeps_stored_values_on_blank_input() {
        let mut client = stored();
        let changed = client.merge(&ClientFields {
            first_name: "Ann".to_string(),
            last_name: String::new(),
            email: "ann@example.com".to_string(),
            phone: None,
            dob: Some(String::new()),
            address: None,
        });
        assert!(!changed);
        assert_eq!(client.last_name, "Lee");
        assert_eq!(client.phone.as_deref(), Some("555-0100"));
        assert_eq!(client.dob.as_deref(), Some("1990-01-02"));
    }

    #[test]
    fn merge_overwrites_with_new_values() {
        let mut client = stored();
        let changed = client.merge(&ClientFields {
            phone: Some("555-0199".to_string()),
            address: Some("1 Main St".to_string()),
            ..Default::default()
        });
        assert!(changed);
        assert_eq!(client.phone.as_deref(), Some("555-0199"));
        assert_eq!(client.address.as_deref(), Some("1 Main St"));
        assert_eq!(client.first_name, "Ann");
    }

    #[test]
    fn sanitize_normalizes_email_and_drops_blanks() {
        let fields = ClientFields {
            first_name: " Ann ".to_string(),
            last_name: "Lee".to_string(),
            email: " Ann@Example.COM ".to_string(),
            phone: Some("  ".to_string()),
            ..Default::default()
        }
        .sanitize();
        assert_eq!(fields.first_name, "Ann");
        assert_eq!(fields.email, "ann@example.com");
        assert_eq!(fields.phone, None);
    }
}
