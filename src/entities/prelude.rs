pub use super::badges::Entity as Badges;
pub use super::discovery_preferences::Entity as DiscoveryPreferences;
pub use super::interests::Entity as Interests;
pub use super::notification_settings::Entity as NotificationSettings;
pub use super::password_reset_tokens::Entity as PasswordResetTokens;
pub use super::user_badges::Entity as UserBadges;
pub use super::user_interests::Entity as UserInterests;
pub use super::users::Entity as Users;
