use serde::Deserialize;
use statusgen::{BucketConfig, Distribution, DistributionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Main and admin listeners share {0}")]
    ListenerConflict(String),

    #[error("Invalid status code distribution: {0}")]
    Distribution(#[from] DistributionError),
}

/// Demo API configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener serving the demo endpoints
    pub listener: Listener,
    /// Admin listener for health and readiness checks
    pub admin_listener: Listener,
    /// Seed for a reproducible random stream. Without it every worker thread
    /// draws from its own stream.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Replaces the built-in 30/40/30 table
    #[serde(default)]
    pub distribution: Option<Vec<BucketConfig>>,
}

impl Config {
    /// Validates the demo API configuration and returns the distribution it
    /// describes.
    pub fn validate(&self) -> Result<Distribution, ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.listener == self.admin_listener {
            return Err(ValidationError::ListenerConflict(format!(
                "{}:{}",
                self.listener.host, self.listener.port
            )));
        }

        Ok(self.build_distribution()?)
    }

    /// Builds the configured distribution, falling back to the default table.
    pub fn build_distribution(&self) -> Result<Distribution, DistributionError> {
        match &self.distribution {
            Some(buckets) => Distribution::new(buckets.clone()),
            None => Ok(Distribution::default()),
        }
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    /// Validates the listener configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}
