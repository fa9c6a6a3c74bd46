pub mod admins;
pub mod auth_key;
pub mod classes;
pub mod clients;
pub mod group_requests;
pub mod registrations;
pub mod session;

use admins::AdminStore;
use auth_key::AuthKeys;
use classes::ClassStore;
use clients::ClientStore;
use eyre::Result;
use group_requests::GroupRequestStore;
use registrations::RegistrationStore;
use session::Db;

const DB_NAME: &str = "cpr_desk";

#[derive(Clone)]
pub struct Storage {
    pub db: Db,
    pub classes: ClassStore,
    pub clients: ClientStore,
    pub registrations: RegistrationStore,
    pub group_requests: GroupRequestStore,
    pub admins: AdminStore,
    pub auth_keys: AuthKeys,
}

impl Storage {
    pub async fn new(uri: &str) -> Result<Self> {
        let db = Db::new(uri, DB_NAME).await?;
        let classes = ClassStore::new(&db).await?;
        let clients = ClientStore::new(&db).await?;
        let registrations = RegistrationStore::new(&db).await?;
        let group_requests = GroupRequestStore::new(&db).await?;
        let admins = AdminStore::new(&db).await?;
        let auth_keys = AuthKeys::new(&db).await?;

        Ok(Storage {
            db,
            classes,
            clients,
            registrations,
            group_requests,
            admins,
            auth_keys,
        })
    }
}
