use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Base URL of the record-store adapter.
    pub store_url: String,
    /// Base URL of the answer-model service.
    pub judge_url: String,
    /// Similarity cutoff forwarded to the answer model, in (0, 1].
    pub similarity_threshold: f64,
    /// Per-request timeout for both upstream services.
    pub rpc_timeout: Duration,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5001".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let store_url = std::env::var("STORE_URL")
            .unwrap_or_else(|_| "http://database_adapter:5000".to_string());

        let judge_url =
            std::env::var("JUDGE_URL").unwrap_or_else(|_| "http://answer_model:5002".to_string());

        let threshold_str =
            std::env::var("SIMILARITY_THRESHOLD").unwrap_or_else(|_| "0.7".to_string());
        let similarity_threshold = threshold_str.parse::<f64>().map_err(|e| {
            ConfigError::InvalidValue("SIMILARITY_THRESHOLD".to_string(), e.to_string())
        })?;
        if !(similarity_threshold > 0.0 && similarity_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue(
                "SIMILARITY_THRESHOLD".to_string(),
                format!("{similarity_threshold} is outside (0, 1]"),
            ));
        }

        let timeout_str = std::env::var("RPC_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("RPC_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        let rpc_timeout = Duration::from_secs(timeout_secs);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            store_url,
            judge_url,
            similarity_threshold,
            rpc_timeout,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("STORE_URL");
            env::remove_var("JUDGE_URL");
            env::remove_var("SIMILARITY_THRESHOLD");
            env::remove_var("RPC_TIMEOUT_SECS");
            env::remove_var("RUST_LOG");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        clear_env_vars();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:5001");
        assert_eq!(config.store_url, "http://database_adapter:5000");
        assert_eq!(config.judge_url, "http://answer_model:5002");
        assert_eq!(config.similarity_threshold, 0.7);
        assert_eq!(config.rpc_timeout, Duration::from_secs(10));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("STORE_URL", "http://localhost:5000");
            env::set_var("JUDGE_URL", "http://localhost:5002");
            env::set_var("SIMILARITY_THRESHOLD", "0.9");
            env::set_var("RPC_TIMEOUT_SECS", "3");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.store_url, "http://localhost:5000");
        assert_eq!(config.judge_url, "http://localhost:5002");
        assert_eq!(config.similarity_threshold, 0.9);
        assert_eq!(config.rpc_timeout, Duration::from_secs(3));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_threshold_out_of_range() {
        clear_env_vars();
        unsafe {
            env::set_var("SIMILARITY_THRESHOLD", "0.0");
        }
        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "SIMILARITY_THRESHOLD"),
            _ => panic!("Expected InvalidValue for SIMILARITY_THRESHOLD"),
        }

        clear_env_vars();
        unsafe {
            env::set_var("SIMILARITY_THRESHOLD", "1.5");
        }
        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "SIMILARITY_THRESHOLD"),
            _ => panic!("Expected InvalidValue for SIMILARITY_THRESHOLD"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_timeout() {
        clear_env_vars();
        unsafe {
            env::set_var("RPC_TIMEOUT_SECS", "soon");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RPC_TIMEOUT_SECS"),
            _ => panic!("Expected InvalidValue for RPC_TIMEOUT_SECS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }
}
