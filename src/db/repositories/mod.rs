pub mod badge;
pub mod discovery;
pub mod interests;
pub mod notification_settings;
pub mod password_reset;
pub mod user;
