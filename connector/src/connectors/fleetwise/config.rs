use fleetsync::Configuration;
use std::fmt;

pub const ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const SESSION_TOKEN: &str = "aws_session_token";
pub const REGION: &str = "region";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Validated AWS settings for the FleetWise client.
///
/// Built from the connector configuration:
/// - `aws_access_key_id` (required)
/// - `aws_secret_access_key` (required)
/// - `aws_session_token` (optional, temporary credentials)
/// - `region` (optional, defaults to `us-east-1`)
#[derive(Clone, PartialEq)]
pub struct FleetWiseConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub region: String,
}

impl FleetWiseConfig {
    /// Validate the configuration without touching the network.
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ConfigError> {
        let access_key_id = required(configuration, ACCESS_KEY_ID)?;
        let secret_access_key = required(configuration, SECRET_ACCESS_KEY)?;
        let session_token = optional(configuration, SESSION_TOKEN);
        let region = optional(configuration, REGION).unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token,
            region,
        })
    }
}

impl fmt::Debug for FleetWiseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FleetWiseConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .finish()
    }
}

fn required(configuration: &Configuration, key: &'static str) -> Result<String, ConfigError> {
    match configuration.get(key) {
        None => Err(ConfigError::MissingField(key)),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyField(key)),
        Some(value) => Ok(value.trim().to_string()),
    }
}

fn optional(configuration: &Configuration, key: &str) -> Option<String> {
    configuration
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Configuration errors, reported before any client is built.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    MissingField(&'static str),
    EmptyField(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingField(key) => {
                write!(f, "configuration is missing required field '{}'", key)
            }
            ConfigError::EmptyField(key) => {
                write!(f, "configuration field '{}' must not be empty", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
