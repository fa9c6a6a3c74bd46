use bson::oid::ObjectId;
use log::info;
use model::{
    group_request::{GroupRequest, GroupRequestForm, GroupRequestStatus},
    session::Session,
};
use storage::group_requests::{GroupRequestFilter, GroupRequestStore};
use tx_macro::tx;

use crate::error::Error;

#[derive(Clone)]
pub struct GroupRequests {
    requests: GroupRequestStore,
}

impl GroupRequests {
    pub(crate) fn new(requests: GroupRequestStore) -> Self {
        GroupRequests { requests }
    }

    /// Public intake from the "train my team" form.
    pub async fn submit(
        &self,
        session: &mut Session,
        form: GroupRequestForm,
    ) -> Result<ObjectId, Error> {
        let form = sanitize(form);
        validate(&form)?;
        let request = GroupRequest::new(form);
        self.requests.add(session, &request).await?;
        info!(
            "Group request {} from {} ({} participants)",
            request.id, request.org_name, request.participants
        );
        Ok(request.id)
    }

    pub async fn list(
        &self,
        session: &mut Session,
        filter: &GroupRequestFilter,
    ) -> Result<Vec<GroupRequest>, Error> {
        Ok(self.requests.list(session, filter).await?)
    }

    #[tx]
    pub async fn update(
        &self,
        session: &mut Session,
        id: ObjectId,
        status: Option<GroupRequestStatus>,
        notes: Option<String>,
    ) -> Result<(), Error> {
        let notes = notes.filter(|n| !n.trim().is_empty());
        if status.is_none() && notes.is_none() {
            return Err(Error::validation("No changes provided"));
        }
        self.requests
            .get(session, id)
            .await?
            .ok_or(Error::RequestNotFound)?;
        self.requests
            .update(session, id, status, notes.as_deref())
            .await?;
        Ok(())
    }
}

fn sanitize(mut form: GroupRequestForm) -> GroupRequestForm {
    form.org_name = form.org_name.trim().to_string();
    form.contact_name = form.contact_name.trim().to_string();
    form.email = model::client::normalize_email(&form.email);
    form.course_type = form.course_type.trim().to_string();
    form
}

fn validate(form: &GroupRequestForm) -> Result<(), Error> {
    for (value, field) in [
        (&form.org_name, "org_name"),
        (&form.contact_name, "contact_name"),
        (&form.email, "email"),
        (&form.course_type, "course_type"),
    ] {
        if value.is_empty() {
            return Err(Error::validation(format!("{} required", field)));
        }
    }
    if form.participants < 1 {
        return Err(Error::validation("participants must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> GroupRequestForm {
        GroupRequestForm {
            org_name: "Acme Corp".to_string(),
            contact_name: "Ann Lee".to_string(),
            email: "ann@acme.example".to_string(),
            course_type: "BLS".to_string(),
            participants: 12,
            ..Default::default()
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(validate(&form()).is_ok());
    }

    #[test]
    fn zero_participants_rejected() {
        let mut f = form();
        f.participants = 0;
        assert!(validate(&f).is_err());
    }

    #[test]
    fn missing_org_rejected() {
        let f = sanitize(GroupRequestForm {
            org_name: "   ".to_string(),
            ..form()
        });
        let err = validate(&f).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("org_name")));
    }
}
