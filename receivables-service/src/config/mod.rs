//! Configuration module for receivables-service.

use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct ReceivablesConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub database: DatabaseConfig,
    pub aging: AgingConfig,
    pub resolution: ResolutionConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Aging bucket boundaries in whole days.
///
/// The 0-30/31-60/61-90/90+ split mirrors the dashboard's AR report. The
/// boundaries are configuration so the invoicing policy can be corrected
/// without touching call sites.
#[derive(Debug, Clone, Copy)]
pub struct AgingConfig {
    pub current_max_days: i64,
    pub tier_two_max_days: i64,
    pub tier_three_max_days: i64,
}

impl Default for AgingConfig {
    fn default() -> Self {
        Self {
            current_max_days: 30,
            tier_two_max_days: 60,
            tier_three_max_days: 90,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolutionConfig {
    /// Hard minimum for trimmed resolution notes.
    pub min_notes_len: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self { min_notes_len: 10 }
    }
}

impl ReceivablesConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "receivables-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_default(),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1),
            },
            aging: AgingConfig {
                current_max_days: env::var("AGING_CURRENT_MAX_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
                tier_two_max_days: env::var("AGING_TIER_TWO_MAX_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
                tier_three_max_days: env::var("AGING_TIER_THREE_MAX_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(90),
            },
            resolution: ResolutionConfig {
                min_notes_len: env::var("RESOLUTION_MIN_NOTES_LEN")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            },
        })
    }
}
