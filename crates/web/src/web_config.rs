use std::net::SocketAddr;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WebConfig {
    /// Address to bind the web server to
    /// Defaults to 127.0.0.1:3000
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl WebConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CREDREGEN").separator("__"))
            .build()?;
        let web_config = config.try_deserialize::<WebConfig>()?;

        web_config.validate()?;

        Ok(web_config)
    }

    /// Validate that the web configuration is complete and usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr().map(|_| ())
    }

    /// Get the socket address to bind the web server to
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address.parse().map_err(|e| {
            ConfigError::Message(format!(
                "Web bind_address is not a valid socket address: {e}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address_validation() {
        let config = WebConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.socket_addr().unwrap(),
            SocketAddr::from(([127, 0, 0, 1], 3000))
        );

        let config = WebConfig {
            bind_address: "localhost".to_string(),
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("not a valid socket address")
        );
    }
}
