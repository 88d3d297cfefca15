pub mod user;
pub mod session;
pub mod wallet;
pub mod user_settings;
pub mod notification;

pub use user::Entity as User;
pub use session::Entity as Session;
pub use wallet::Entity as Wallet;
pub use user_settings::Entity as UserSettings;
pub use notification::Entity as Notification;
