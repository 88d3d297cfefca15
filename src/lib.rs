pub mod config;
pub mod enums;
pub mod error;
pub mod db;
pub mod providers;
pub mod chains;
pub mod email;
pub mod services;
pub mod api;
pub mod scheduler;
pub mod alert_checker;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use enums::{ NotificationFrequency, WalletStatus };
pub use error::{ AppError, Result };
