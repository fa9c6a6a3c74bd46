use std::ops::{Deref, DerefMut};

use bson::oid::ObjectId;
use mongodb::ClientSession;

/// Wraps a mongo session with the acting admin (None for public requests).
/// Every store method takes `&mut Session` so reads and writes always run
/// inside the caller's transaction when one is open.
pub struct Session {
    client_session: ClientSession,
    actor: Option<ObjectId>,
}

impl Session {
    pub fn new(client_session: ClientSession) -> Self {
        Session {
            client_session,
            actor: None,
        }
    }

    pub fn actor(&self) -> Option<ObjectId> {
        self.actor
    }

    pub fn set_actor(&mut self, actor: ObjectId) {
        self.actor = Some(actor);
    }
}

impl Deref for Session {
    type Target = ClientSession;

    fn deref(&self) -> &Self::Target {
        &self.client_session
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.client_session
    }
}

impl<'a> From<&'a mut Session> for &'a mut ClientSession {
    fn from(session: &'a mut Session) -> &'a mut ClientSession {
        &mut session.client_session
    }
}
