pub mod auth_service;
pub mod wallet_service;
pub mod balance_service;
pub mod settings_service;
pub mod notification_service;

pub use auth_service::AuthService;
pub use wallet_service::WalletService;
pub use balance_service::BalanceService;
pub use settings_service::SettingsService;
pub use notification_service::NotificationService;
