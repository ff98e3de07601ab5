use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::shipping::{is_valid_rounding_increment, FEE_ROUNDING_INCREMENT};
use crate::utils::geo::{is_valid_tolerance_factor, ROAD_TOLERANCE_FACTOR};

/// Vendor WhatsApp number used when no branch has been quoted yet.
pub const DEFAULT_WHATSAPP_NUMBER: &str = "6285273598919";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub storage_path: PathBuf,
    pub road_tolerance_factor: f64,
    pub fee_rounding_increment: f64,
    pub location_timeout_secs: u64,
    pub whatsapp_number: String,
    pub rate_limit_replenish_secs: u64,
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            storage_path: PathBuf::from("masgan-storage.json"),
            road_tolerance_factor: ROAD_TOLERANCE_FACTOR,
            fee_rounding_increment: FEE_ROUNDING_INCREMENT,
            location_timeout_secs: 10,
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            rate_limit_replenish_secs: 1,
            rate_limit_burst: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            storage_path: env::var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            road_tolerance_factor: env::var("ROAD_TOLERANCE_FACTOR")
                .map(|v| v.parse().expect("ROAD_TOLERANCE_FACTOR must be a number"))
                .unwrap_or(defaults.road_tolerance_factor),
            fee_rounding_increment: env::var("FEE_ROUNDING_INCREMENT")
                .map(|v| v.parse().expect("FEE_ROUNDING_INCREMENT must be a number"))
                .unwrap_or(defaults.fee_rounding_increment),
            location_timeout_secs: env::var("LOCATION_TIMEOUT_SECS")
                .map(|v| v.parse().expect("LOCATION_TIMEOUT_SECS must be a number"))
                .unwrap_or(defaults.location_timeout_secs),
            whatsapp_number: env::var("WHATSAPP_NUMBER").unwrap_or(defaults.whatsapp_number),
            rate_limit_replenish_secs: env::var("RATE_LIMIT_REPLENISH_SECS")
                .map(|v| v.parse().expect("RATE_LIMIT_REPLENISH_SECS must be a number"))
                .unwrap_or(defaults.rate_limit_replenish_secs),
            rate_limit_burst: env::var("RATE_LIMIT_BURST")
                .map(|v| v.parse().expect("RATE_LIMIT_BURST must be a number"))
                .unwrap_or(defaults.rate_limit_burst),
        };

        config.validate().expect("Invalid configuration");
        config
    }

    /// Reject settings that would break fee quotes or the rate limiter.
    pub fn validate(&self) -> AppResult<()> {
        if !is_valid_tolerance_factor(self.road_tolerance_factor) {
            return Err(AppError::Internal(format!(
                "ROAD_TOLERANCE_FACTOR must be a finite number above 1.0, got {}",
                self.road_tolerance_factor
            )));
        }
        if !is_valid_rounding_increment(self.fee_rounding_increment) {
            return Err(AppError::Internal(format!(
                "FEE_ROUNDING_INCREMENT must be a finite number above 0, got {}",
                self.fee_rounding_increment
            )));
        }
        if self.rate_limit_replenish_secs == 0 || self.rate_limit_burst == 0 {
            return Err(AppError::Internal(
                "RATE_LIMIT_REPLENISH_SECS and RATE_LIMIT_BURST must be above 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }
}
