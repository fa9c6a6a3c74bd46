use bson::oid::ObjectId;
use chrono::{Duration, Utc};
use log::{info, warn};
use model::{
    admin::{AdminUser, AdminView},
    auth::AuthKey,
    client::normalize_email,
    session::Session,
};
use storage::{admins::AdminStore, auth_key::AuthKeys};
use tx_macro::tx;

use crate::error::Error;

const SESSION_TTL_HOURS: i64 = 24;
const MIN_PASSWORD_LEN: usize = 8;

/// Admin directory plus the server-side session store backing the `auth`
/// cookie.
#[derive(Clone)]
pub struct Admins {
    admins: AdminStore,
    auth_keys: AuthKeys,
}

impl Admins {
    pub(crate) fn new(admins: AdminStore, auth_keys: AuthKeys) -> Self {
        Admins { admins, auth_keys }
    }

    #[tx]
    pub async fn login(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<(AuthKey, AdminView), Error> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(Error::validation("Email and password required"));
        }
        let user = match self.admins.get_by_email(session, &email).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown admin {}", email);
                return Err(Error::InvalidCredentials);
            }
        };
        if !bcrypt::verify(password, &user.password_hash)? {
            return Err(Error::InvalidCredentials);
        }
        let key = AuthKey::gen(user.id);
        self.auth_keys.insert(session, &key).await?;
        Ok((key, user.into()))
    }

    /// TTL-checked lookup of the cookie token. Expired keys are dropped
    /// lazily on the lookup that discovers them.
    pub async fn authenticate(
        &self,
        session: &mut Session,
        key: &str,
    ) -> Result<Option<AdminUser>, Error> {
        let auth_key = match self.auth_keys.get_by_key(session, key).await? {
            Some(auth_key) => auth_key,
            None => return Ok(None),
        };
        if auth_key.is_expired(Duration::hours(SESSION_TTL_HOURS), Utc::now()) {
            self.auth_keys.delete_by_key(session, key).await?;
            return Ok(None);
        }
        Ok(self.admins.get(session, auth_key.user_id).await?)
    }

    pub async fn logout(&self, session: &mut Session, key: &str) -> Result<(), Error> {
        self.auth_keys.delete_by_key(session, key).await?;
        Ok(())
    }

    /// Creates the first admin from config when the directory is empty.
    /// Called once at startup; a no-op on any later boot.
    pub async fn bootstrap(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<(), Error> {
        if self.admins.count(session).await? > 0 {
            return Ok(());
        }
        info!("Admin directory empty, creating bootstrap admin");
        self.create(session, email, password).await?;
        Ok(())
    }

    pub async fn list(&self, session: &mut Session) -> Result<Vec<AdminView>, Error> {
        Ok(self
            .admins
            .list(session)
            .await?
            .into_iter()
            .map(AdminView::from)
            .collect())
    }

    #[tx]
    pub async fn create(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<ObjectId, Error> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;
        if self.admins.get_by_email(session, &email).await?.is_some() {
            return Err(Error::EmailTaken);
        }
        let user = AdminUser::new(email, bcrypt::hash(password, bcrypt::DEFAULT_COST)?);
        self.admins.insert(session, &user).await?;
        Ok(user.id)
    }

    /// A new password re-hashes; an email change alone keeps the hash.
    #[tx]
    pub async fn update(
        &self,
        session: &mut Session,
        id: ObjectId,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), Error> {
        self.admins
            .get(session, id)
            .await?
            .ok_or(Error::AdminNotFound)?;
        match (email, password) {
            (_, Some(password)) if !password.is_empty() => {
                validate_password(password)?;
                let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
                self.admins.set_password_hash(session, id, &hash).await?;
            }
            (Some(email), _) => {
                let email = normalize_email(email);
                validate_email(&email)?;
                self.admins.set_email(session, id, &email).await?;
            }
            _ => return Err(Error::validation("No changes provided")),
        }
        Ok(())
    }

    /// You cannot remove yourself, and the directory never goes empty. The
    /// acting admin comes from the session (bound by the HTTP layer).
    #[tx]
    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        let actor = session
            .actor()
            .ok_or_else(|| Error::Common(eyre::eyre!("No actor bound to session")))?;
        self.admins
            .get(session, id)
            .await?
            .ok_or(Error::AdminNotFound)?;
        let remaining = self.admins.count(session).await?;
        delete_guard(actor, id, remaining)?;
        self.admins.delete(session, id).await?;
        Ok(())
    }
}

fn delete_guard(actor: ObjectId, id: ObjectId, admins: u64) -> Result<(), Error> {
    if id == actor {
        return Err(Error::SelfDelete);
    }
    if admins <= 1 {
        return Err(Error::LastAdmin);
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), Error> {
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation("Valid email is required"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), Error> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_at_sign() {
        assert!(validate_email("ops@example.com").is_ok());
        assert!(validate_email("ops.example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn cannot_delete_yourself() {
        let me = ObjectId::new();
        assert!(matches!(delete_guard(me, me, 5), Err(Error::SelfDelete)));
    }

    #[test]
    fn cannot_delete_the_last_admin() {
        let me = ObjectId::new();
        let other = ObjectId::new();
        assert!(matches!(
            delete_guard(me, other, 1),
            Err(Error::LastAdmin)
        ));
        assert!(delete_guard(me, other, 2).is_ok());
    }
}
