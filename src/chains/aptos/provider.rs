use async_trait::async_trait;
use sea_orm::prelude::Decimal;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{ AppError, Result };
use crate::providers::BalanceFetcher;

/// 1 APT = 10^8 octas.
const APT_DECIMALS: u32 = 8;
const COIN_BALANCE_FUNCTION: &str = "0x1::coin::balance";
const APTOS_COIN_TYPE: &str = "0x1::aptos_coin::AptosCoin";

#[derive(Clone)]
pub struct AptosProvider {
    client: reqwest::Client,
    base_url: String,
}

// ── Aptos REST response types ───────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AptosErrorBody {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

// ── Implementation ──────────────────────────────────────────────────

impl AptosProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client
            ::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build Aptos HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn octas_to_apt(octas: u64) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(octas), APT_DECIMALS)
    }

    /// The view endpoint answers with a one-element array holding the
    /// octa amount as a decimal string (u64 values are strings in Aptos JSON).
    fn parse_view_response(body: &serde_json::Value) -> Result<u64> {
        let first = body
            .as_array()
            .and_then(|values| values.first())
            .ok_or_else(|| AppError::Rpc("Empty Aptos view response".to_string()))?;

        match first {
            serde_json::Value::String(raw) =>
                raw
                    .parse::<u64>()
                    .map_err(|e| AppError::Rpc(format!("Invalid octa amount '{}': {}", raw, e))),
            serde_json::Value::Number(n) =>
                n
                    .as_u64()
                    .ok_or_else(|| AppError::Rpc(format!("Invalid octa amount: {}", n))),
            other => Err(AppError::Rpc(format!("Unexpected Aptos view value: {}", other))),
        }
    }
}

#[async_trait]
impl BalanceFetcher for AptosProvider {
    async fn fetch_balance(&self, address: &str) -> Result<Decimal> {
        let url = format!("{}/v1/view", self.base_url);

        let body =
            serde_json::json!({
            "function": COIN_BALANCE_FUNCTION,
            "type_arguments": [APTOS_COIN_TYPE],
            "arguments": [address]
        });

        let resp = self.client
            .post(&url)
            .json(&body)
            .send().await
            .map_err(|e| AppError::Rpc(format!("Aptos request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            // Aptos returns a JSON error body with a human-readable message
            let detail = match resp.json::<AptosErrorBody>().await {
                Ok(err) =>
                    match err.error_code {
                        Some(code) => format!("{} ({})", err.message, code),
                        None => err.message,
                    }
                Err(_) => status.to_string(),
            };
            return Err(AppError::Rpc(format!("Aptos API error for {}: {}", address, detail)));
        }

        let data: serde_json::Value = resp
            .json().await
            .map_err(|e| AppError::Rpc(format!("Failed to parse Aptos response: {}", e)))?;

        let octas = Self::parse_view_response(&data)?;
        Ok(Self::octas_to_apt(octas))
    }

    fn symbol(&self) -> &'static str {
        "APT"
    }
}
