pub mod badge_service;
pub use badge_service::{BadgeError, BadgeService};

pub mod badge_service_impl;
pub use badge_service_impl::SeaOrmBadgeService;

pub mod password_reset_service;
pub use password_reset_service::{PasswordResetService, ResetError};

pub mod password_reset_service_impl;
pub use password_reset_service_impl::SeaOrmPasswordResetService;

pub mod preferences_service;
pub use preferences_service::{PreferencesError, PreferencesService};

pub mod preferences_service_impl;
pub use preferences_service_impl::SeaOrmPreferencesService;

pub mod user_service;
pub use user_service::{RegisterInput, UserError, UserService};

pub mod user_service_impl;
pub use user_service_impl::SeaOrmUserService;
