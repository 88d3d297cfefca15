use std::env;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AptosNetwork {
    Mainnet,
    Testnet,
    Devnet,
}

impl AptosNetwork {
    /// Public fullnode REST endpoint for the network.
    pub fn default_node_url(&self) -> &'static str {
        match self {
            AptosNetwork::Mainnet => "https://fullnode.mainnet.aptoslabs.com",
            AptosNetwork::Testnet => "https://fullnode.testnet.aptoslabs.com",
            AptosNetwork::Devnet => "https://fullnode.devnet.aptoslabs.com",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub aptos_network: AptosNetwork,
    pub aptos_node_url: String,
    pub fetch_timeout_secs: u64,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub cron_secret: Option<String>,
    /// Interval of the in-process alert loop. `None` leaves scheduling to an external trigger.
    pub alert_check_interval_secs: Option<u64>,
    pub owner_page_size: u64,
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let aptos_network = Self::parse_network(
            &env::var("APTOS_NETWORK").unwrap_or_else(|_| "mainnet".to_string())
        )?;

        let aptos_node_url = env::var("APTOS_NODE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| aptos_network.default_node_url().to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;
        let fetch_timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()?;

        let resend_api_key = Self::optional("RESEND_API_KEY");
        let email_from = env::var("EMAIL_FROM").unwrap_or_else(|_| "alerts@localhost".to_string());
        let cron_secret = Self::optional("CRON_SECRET");

        let alert_check_interval_secs = match Self::optional("ALERT_CHECK_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse()?;
                (secs > 0).then_some(secs)
            }
            None => None,
        };

        let owner_page_size: u64 = env::var("OWNER_PAGE_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()?;
        if owner_page_size == 0 {
            return Err("OWNER_PAGE_SIZE must be greater than zero".into());
        }

        let session_ttl_hours: i64 = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "168".to_string())
            .parse()?;
        if session_ttl_hours <= 0 {
            return Err("SESSION_TTL_HOURS must be greater than zero".into());
        }

        Ok(Config {
            database_url,
            server_host,
            server_port,
            aptos_network,
            aptos_node_url,
            fetch_timeout_secs,
            resend_api_key,
            email_from,
            cron_secret,
            alert_check_interval_secs,
            owner_page_size,
            session_ttl_hours,
        })
    }

    fn parse_network(value: &str) -> Result<AptosNetwork, Box<dyn std::error::Error>> {
        match value.trim().to_lowercase().as_str() {
            "mainnet" => Ok(AptosNetwork::Mainnet),
            "testnet" => Ok(AptosNetwork::Testnet),
            "devnet" => Ok(AptosNetwork::Devnet),
            _ => Err("APTOS_NETWORK must be 'mainnet', 'testnet' or 'devnet'".into()),
        }
    }

    fn optional(key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
