//! Environment-derived configuration

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is set but not valid unicode")]
    NotUnicode(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Deployment settings resolved once at startup.
///
/// The account id may be absent here; the binary fills it in from STS
/// before building clients, so library code can assume it is present.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    /// Deployment environment, prefixes every resource name
    pub environment: String,
    pub aws_region: String,
    pub aws_account_id: Option<String>,
}

impl ProvisionerConfig {
    /// Read `APP_ENV` (default `dev`), `AWS_REGION` (default `us-east-1`)
    /// and `AWS_ACCOUNT_ID` (optional, STS fallback) from the process
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: read_or("APP_ENV", "dev")?,
            aws_region: read_or("AWS_REGION", "us-east-1")?,
            aws_account_id: read_optional("AWS_ACCOUNT_ID")?,
        })
    }

    /// Account id, once resolved. Library entry points that need it call
    /// this after the binary's STS fallback has run.
    pub fn account_id(&self) -> Result<&str, ConfigError> {
        self.aws_account_id
            .as_deref()
            .ok_or(ConfigError::Empty("AWS_ACCOUNT_ID"))
    }
}

fn read_optional(name: &'static str) -> Result<Option<String>, ConfigError> {
    match std::env::var(name) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(name)),
    }
}

fn read_or(name: &'static str, default: &str) -> Result<String, ConfigError> {
    Ok(read_optional(name)?.unwrap_or_else(|| default.to_string()))
}
