use admins::Admins;
use admission::Admission;
use catalog::Catalog;
use directory::Directory;
use locks::ClassLocks;
use requests::GroupRequests;
use storage::{session::Db, Storage};

pub mod admins;
pub mod admission;
pub mod catalog;
pub mod directory;
pub mod error;
pub mod export;
pub mod locks;
pub mod requests;

pub use error::Error;

/// The business layer: one façade over the stores. Catalog and Admission
/// share the per-class locks so a class delete or capacity cut cannot race
/// an admission for the same class.
#[derive(Clone)]
pub struct Roster {
    pub db: Db,
    pub catalog: Catalog,
    pub directory: Directory,
    pub admission: Admission,
    pub requests: GroupRequests,
    pub admins: Admins,
}

impl Roster {
    pub fn new(storage: Storage) -> Self {
        let locks = ClassLocks::new();
        let catalog = Catalog::new(
            storage.classes.clone(),
            storage.registrations.clone(),
            locks.clone(),
        );
        let directory = Directory::new(
            storage.clients.clone(),
            storage.classes.clone(),
            storage.registrations.clone(),
        );
        let admission = Admission::new(
            storage.classes,
            storage.clients,
            storage.registrations,
            locks,
        );
        let requests = GroupRequests::new(storage.group_requests);
        let admins = Admins::new(storage.admins, storage.auth_keys);
        Roster {
            db: storage.db,
            catalog,
            directory,
            admission,
            requests,
            admins,
        }
    }
}
