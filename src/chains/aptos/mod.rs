pub mod provider;

pub use provider::AptosProvider;
