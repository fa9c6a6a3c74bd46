use eyre::Result;
use model::group_request::GroupRequest;

use crate::admission::RosterRow;

/// CSV rendering for the two admin downloads. Pure formatting; the callers
/// fetch the rows so the capacity/registration logic stays in one place.

pub fn group_requests_csv(requests: &[GroupRequest]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "id",
        "org_name",
        "contact_name",
        "email",
        "phone",
        "course_type",
        "participants",
        "location_pref",
        "address",
        "preferred_dates",
        "status",
        "created_at",
    ])?;
    for request in requests {
        wtr.write_record([
            request.id.to_hex(),
            request.org_name.clone(),
            request.contact_name.clone(),
            request.email.clone(),
            request.phone.clone().unwrap_or_default(),
            request.course_type.clone(),
            request.participants.to_string(),
            request.location_pref.clone().unwrap_or_default(),
            request.address.clone().unwrap_or_default(),
            request.preferred_dates.clone().unwrap_or_default(),
            request.status.to_string(),
            request.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ])?;
    }
    let buff = wtr.into_inner()?;
    Ok(String::from_utf8(buff)?)
}

pub fn roster_csv(rows: &[RosterRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "First Name",
        "Last Name",
        "Email",
        "Phone",
        "DOB",
        "Address",
        "Payment Status",
    ])?;
    for row in rows {
        wtr.write_record([
            row.first_name.clone(),
            row.last_name.clone(),
            row.email.clone(),
            row.phone.clone().unwrap_or_default(),
            row.dob.clone().unwrap_or_default(),
            row.address.clone().unwrap_or_default(),
            row.status.to_string(),
        ])?;
    }
    let buff = wtr.into_inner()?;
    Ok(String::from_utf8(buff)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::group_request::{GroupRequestForm, GroupRequestStatus};
    use model::registration::RegistrationStatus;

    #[test]
    fn roster_csv_header_and_rows() {
        let rows = vec![RosterRow {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            phone: Some("555-0100".to_string()),
            dob: None,
            address: Some("1 Main St".to_string()),
            status: RegistrationStatus::Paid,
        }];
        let csv = roster_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "First Name,Last Name,Email,Phone,DOB,Address,Payment Status"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Ann,Lee,ann@example.com,555-0100,,1 Main St,paid"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn group_requests_csv_escapes_commas() {
        let mut request = GroupRequest::new(GroupRequestForm {
            org_name: "Acme, Inc.".to_string(),
            contact_name: "Ann Lee".to_string(),
            email: "ann@acme.example".to_string(),
            course_type: "BLS".to_string(),
            participants: 5,
            ..Default::default()
        });
        request.status = GroupRequestStatus::Contacted;
        let csv = group_requests_csv(&[request]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"Acme, Inc.\""));
        assert!(row.contains("contacted"));
    }

    #[test]
    fn empty_export_is_header_only() {
        let csv = group_requests_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
