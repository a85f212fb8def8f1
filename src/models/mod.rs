pub mod preferences;
pub mod user;

pub use preferences::{
    ChannelToggles, DiscoveryPreferences, InterestUpdate, InterestValue, NotificationSettings,
    NotificationSettingsPatch, NotificationSettingsView,
};
pub use user::{NewUser, ProfileUpdate, PublicUserInfo, TokenSet, User};
