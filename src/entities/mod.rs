pub mod prelude;

pub mod badges;
pub mod discovery_preferences;
pub mod interests;
pub mod notification_settings;
pub mod password_reset_tokens;
pub mod user_badges;
pub mod user_interests;
pub mod users;
