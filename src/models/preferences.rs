use serde::{Deserialize, Serialize};

use crate::entities::notification_settings;

pub const DEFAULT_DISCOVERY_RADIUS_KM: i32 = 50;
pub const MIN_DISCOVERY_RADIUS_KM: i32 = 1;
pub const MAX_DISCOVERY_RADIUS_KM: i32 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct NotificationSettings {
    pub email: String,
    pub like_email: bool,
    pub like_push: bool,
    pub favorite_email: bool,
    pub favorite_push: bool,
    pub chat_email: bool,
    pub chat_push: bool,
    pub system_email: bool,
    pub system_push: bool,
    pub expo_push_token: String,
}

impl NotificationSettings {
    /// Everything on except system push.
    #[must_use]
    pub fn defaults_for(email: &str) -> Self {
        Self {
            email: email.to_string(),
            like_email: true,
            like_push: true,
            favorite_email: true,
            favorite_push: true,
            chat_email: true,
            chat_push: true,
            system_email: true,
            system_push: false,
            expo_push_token: String::new(),
        }
    }

    /// Applies the provided fields of `patch`. System channels are not patchable
    /// and are rejected by [`NotificationSettingsPatch::validate`] beforehand.
    pub fn merge(&mut self, patch: &NotificationSettingsPatch) {
        let toggles = [
            (patch.like_email, &mut self.like_email),
            (patch.like_push, &mut self.like_push),
            (patch.favorite_email, &mut self.favorite_email),
            (patch.favorite_push, &mut self.favorite_push),
            (patch.chat_email, &mut self.chat_email),
            (patch.chat_push, &mut self.chat_push),
        ];
        for (value, slot) in toggles {
            if let Some(v) = value {
                *slot = v;
            }
        }

        if let Some(token) = &patch.expo_push_token {
            self.expo_push_token = token.trim().to_string();
        }
    }
}

impl From<notification_settings::Model> for NotificationSettings {
    fn from(model: notification_settings::Model) -> Self {
        Self {
            email: model.user_email,
            like_email: model.like_email,
            like_push: model.like_push,
            favorite_email: model.favorite_email,
            favorite_push: model.favorite_push,
            chat_email: model.chat_email,
            chat_push: model.chat_push,
            system_email: model.system_email,
            system_push: model.system_push,
            expo_push_token: model.expo_push_token,
        }
    }
}

/// Body of `PUT /users/me/notification-settings`. Unknown fields are a client error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationSettingsPatch {
    pub like_email: Option<bool>,
    pub like_push: Option<bool>,
    pub favorite_email: Option<bool>,
    pub favorite_push: Option<bool>,
    pub chat_email: Option<bool>,
    pub chat_push: Option<bool>,
    pub system_email: Option<bool>,
    pub system_push: Option<bool>,
    pub expo_push_token: Option<String>,
}

impl NotificationSettingsPatch {
    pub fn validate(&self) -> Result<(), String> {
        if self.system_email.is_some() || self.system_push.is_some() {
            return Err("system_alert settings cannot be modified".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChannelToggles {
    pub email: bool,
    pub push: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationChannels {
    pub like: ChannelToggles,
    pub favorite: ChannelToggles,
    pub chat_message: ChannelToggles,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_alert: Option<ChannelToggles>,
}

/// Grouped view of the settings. `system_alert` is only exposed to internal callers.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationSettingsView {
    pub settings: NotificationChannels,
    pub expo_push_token: String,
}

impl NotificationSettingsView {
    #[must_use]
    pub fn user_facing(settings: &NotificationSettings) -> Self {
        Self::build(settings, false)
    }

    #[must_use]
    pub fn internal(settings: &NotificationSettings) -> Self {
        Self::build(settings, true)
    }

    fn build(s: &NotificationSettings, include_system: bool) -> Self {
        Self {
            settings: NotificationChannels {
                like: ChannelToggles {
                    email: s.like_email,
                    push: s.like_push,
                },
                favorite: ChannelToggles {
                    email: s.favorite_email,
                    push: s.favorite_push,
                },
                chat_message: ChannelToggles {
                    email: s.chat_email,
                    push: s.chat_push,
                },
                system_alert: include_system.then_some(ChannelToggles {
                    email: s.system_email,
                    push: s.system_push,
                }),
            },
            expo_push_token: s.expo_push_token.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryPreferences {
    pub email: String,
    pub radius_km: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InterestValue {
    pub id: i32,
    pub key: String,
    pub value: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InterestUpdate {
    pub id: i32,
    pub value: bool,
}
