pub mod identity;
pub mod notifications;
pub mod storage;

pub use identity::{IdentityAccount, IdentityError, IdentityProvider, KeycloakClient};
pub use notifications::{NotificationDispatcher, NotificationRequest};
pub use storage::{ObjectStore, S3ObjectStore};
