use serde::Deserialize;
use std::env;
use tripway_core::pricing::PricingRules;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    #[serde(default = "default_child_price_factor")]
    pub child_price_factor: f64,
    #[serde(default = "default_code_ttl")]
    pub confirmation_code_ttl_seconds: u64,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u64,
}

fn default_tax_rate() -> f64 { tripway_core::pricing::DEFAULT_TAX_RATE }
fn default_child_price_factor() -> f64 { tripway_core::pricing::DEFAULT_CHILD_PRICE_FACTOR }
fn default_code_ttl() -> u64 { 300 }
fn default_rate_limit() -> u64 { 100 }

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            child_price_factor: default_child_price_factor(),
            confirmation_code_ttl_seconds: default_code_ttl(),
            rate_limit_per_minute: default_rate_limit(),
        }
    }
}

impl BusinessRules {
    pub fn pricing(&self) -> PricingRules {
        PricingRules {
            tax_rate: self.tax_rate,
            child_price_factor: self.child_price_factor,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 { 10 }
fn default_acquire_timeout() -> u64 { 3 }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Provider credentials. A provider whose keys are missing falls back to logging.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotificationConfig {
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_from: Option<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `TRIPWAY__DATABASE__URL=mysql://...` sets `database.url`
            .add_source(config::Environment::with_prefix("TRIPWAY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
