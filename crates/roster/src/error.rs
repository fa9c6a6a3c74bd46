use thiserror::Error;

/// Domain errors the HTTP layer maps onto status codes. Conflict-class
/// variants carry the live counts so the admin UI can offer an informed
/// override or explain what blocks a delete.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("Class not found")]
    ClassNotFound,
    #[error("Client not found")]
    ClientNotFound,
    #[error("Registration not found")]
    RegistrationNotFound,
    #[error("Group request not found")]
    RequestNotFound,
    #[error("Admin user not found")]
    AdminNotFound,
    #[error("Class is full ({registered}/{capacity})")]
    ClassFull { capacity: u32, registered: u64 },
    #[error("Blocked by {registrations} existing registration(s)")]
    DeleteBlocked { registrations: u64 },
    #[error("Capacity {capacity} is below the current registration count {registered}")]
    CapacityBelowRegistered { capacity: u32, registered: u64 },
    #[error("Email already exists")]
    EmailTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Cannot delete your own account")]
    SelfDelete,
    #[error("Cannot delete the last admin user")]
    LastAdmin,
    #[error("{0}")]
    Common(#[from] eyre::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(value: mongodb::error::Error) -> Self {
        Error::Common(value.into())
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(value: bcrypt::BcryptError) -> Self {
        Error::Common(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_message_is_the_top_cause_only() {
        // The full chain (and backtrace) belongs in the server log, not in
        // the message handed to clients.
        let err = Error::Common(eyre::eyre!("connection reset"));
        assert_eq!(err.to_string(), "connection reset");
    }
}
