use envconfig::Envconfig;
use paypal_checkout::paypal::GatewayConfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: log::Level,

    #[envconfig(from = "SERVER_PORT", default = "3000")]
    pub server_port: u16,

    #[envconfig(from = "SERVER_HOST", default = "0.0.0.0")]
    pub server_host: String,

    #[envconfig(nested)]
    pub paypal: GatewayConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, envconfig::Error> {
        Config::init_from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_credentials_error_names_variable() {
        let err = Config::init_from_hashmap(&HashMap::new()).err().unwrap();
        assert!(err.to_string().contains("PAYPAL_USERNAME"));
    }

    #[test]
    fn test_server_defaults() {
        let mut env = HashMap::new();
        env.insert("PAYPAL_USERNAME".to_string(), "merchant_api1.example.com".to_string());
        env.insert("PAYPAL_PASSWORD".to_string(), "s3cr3t".to_string());

        let config = Config::init_from_hashmap(&env).unwrap();
        assert_eq!(config.log_level, log::Level::Info);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert!(config.paypal.test_mode);
    }
}
