//! Store configuration file.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_api::ServerConfig;
use storefront_commerce::orders::PricingPolicy;
use storefront_commerce::{Currency, Money};
use storefront_db::DbConfig;
use storefront_observability::LoggingConfig;

/// Config file names searched for, in order, from the working directory up.
pub const CONFIG_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// Store configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite connection.
    #[serde(default)]
    pub database: DbConfig,

    /// Order pricing.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Environment-specific overrides.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub environments: HashMap<String, EnvironmentConfig>,
}

impl StoreConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Get environment-specific config.
    pub fn for_environment(&self, env: &str) -> Result<StoreConfig> {
        let Some(env_config) = self.environments.get(env) else {
            bail!("Unknown environment '{}'", env);
        };

        let mut config = self.clone();
        if let Some(ref server) = env_config.server {
            config.server = server.clone();
        }
        if let Some(ref database) = env_config.database {
            config.database = database.clone();
        }
        if let Some(ref pricing) = env_config.pricing {
            config.pricing = pricing.clone();
        }
        if let Some(ref logging) = env_config.logging {
            config.logging = logging.clone();
        }

        Ok(config)
    }

    /// Collect errors and warnings about the values.
    pub fn check(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.server.host.trim().is_empty() {
            errors.push("server.host is required".to_string());
        }
        if self.server.port == 0 {
            warnings.push("server.port 0 binds a random port".to_string());
        }
        if !self.database.url.starts_with("sqlite:") {
            errors.push(format!("database.url '{}' is not a sqlite url", self.database.url));
        }
        if self.database.max_connections == 0 {
            errors.push("database.max_connections must be at least 1".to_string());
        }
        if self.database.busy_timeout_ms < 1_000 {
            warnings.push("database.busy_timeout_ms below 1000 makes checkouts fail under load".to_string());
        }
        if let Err(e) = self.pricing.policy() {
            errors.push(format!("pricing: {e:#}"));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(format!("logging: {e}"));
        }

        (errors, warnings)
    }
}

/// `[pricing]` section, in decimal units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// ISO currency code.
    pub currency: String,
    /// Flat shipping fee, e.g. `"10.00"`.
    pub shipping_flat: Decimal,
    /// Tax rate over the subtotal, e.g. `"0.18"`.
    pub tax_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let policy = PricingPolicy::default();
        Self {
            currency: policy.currency.code().to_string(),
            shipping_flat: policy.shipping_flat.to_decimal(),
            tax_rate: policy.tax_rate,
        }
    }
}

impl PricingConfig {
    /// Convert to the policy the order workflow uses.
    pub fn policy(&self) -> Result<PricingPolicy> {
        let Some(currency) = Currency::from_code(&self.currency) else {
            bail!("unknown currency '{}'", self.currency);
        };
        if self.shipping_flat.is_sign_negative() {
            bail!("shipping_flat must not be negative");
        }
        if self.tax_rate.is_sign_negative() || self.tax_rate > Decimal::ONE {
            bail!("tax_rate must be between 0 and 1");
        }

        Ok(PricingPolicy {
            currency,
            shipping_flat: Money::from_decimal(self.shipping_flat, currency)?,
            tax_rate: self.tax_rate,
        })
    }
}

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub server: Option<ServerConfig>,
    #[serde(default)]
    pub database: Option<DbConfig>,
    #[serde(default)]
    pub pricing: Option<PricingConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

/// Generate a default storefront.toml config file.
pub fn generate_default_config() -> String {
    r#"# Storefront configuration

[server]
host = "127.0.0.1"
port = 8000
frontend_url = "http://localhost:3000"

[database]
url = "sqlite://storefront.db"
max_connections = 8
busy_timeout_ms = 5000

[pricing]
currency = "PEN"
shipping_flat = "10.00"
tax_rate = "0.18"

[logging]
level = "info"
format = "human"

[environments.production]
[environments.production.server]
host = "0.0.0.0"
port = 8000
frontend_url = "https://shop.example.com"

[environments.production.logging]
level = "info"
format = "json"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use storefront_observability::LogFormat;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_default_file_parses() -> TestResult {
        let config: StoreConfig = toml::from_str(&generate_default_config())?;

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.pricing, PricingConfig::default());
        assert_eq!(config.logging.format, LogFormat::Human);
        assert!(config.check().0.is_empty());

        Ok(())
    }

    #[test]
    fn test_missing_sections_use_defaults() -> TestResult {
        let config: StoreConfig = toml::from_str("[server]\nport = 9000\n")?;

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database, DbConfig::default());

        Ok(())
    }

    #[test]
    fn test_environment_overrides() -> TestResult {
        let config: StoreConfig = toml::from_str(&generate_default_config())?;

        let production = config.for_environment("production")?;
        assert_eq!(production.server.host, "0.0.0.0");
        assert_eq!(production.logging.format, LogFormat::Json);
        assert_eq!(production.database, config.database);

        assert!(config.for_environment("staging").is_err());

        Ok(())
    }

    #[test]
    fn test_pricing_policy() -> TestResult {
        let policy = PricingConfig::default().policy()?;
        assert_eq!(policy, PricingPolicy::default());
        assert_eq!(policy.shipping_flat.amount_cents, 1_000);

        let bad = PricingConfig {
            currency: "XYZ".to_string(),
            ..PricingConfig::default()
        };
        assert!(bad.policy().is_err());

        let bad = PricingConfig {
            tax_rate: Decimal::new(15, 1),
            ..PricingConfig::default()
        };
        assert!(bad.policy().is_err());

        Ok(())
    }

    #[test]
    fn test_check_reports_errors() {
        let mut config = StoreConfig::default();
        config.database.url = "postgres://db".to_string();
        config.database.max_connections = 0;

        let (errors, _) = config.check();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_load_json() -> TestResult {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
        write!(file, r#"{{"server": {{"port": 8080}}}}"#)?;

        let path = file.path().to_str().ok_or("non-utf8 temp path")?;
        let config = StoreConfig::load(path)?;
        assert_eq!(config.server.port, 8080);

        Ok(())
    }
}
