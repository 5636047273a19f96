use std::fs::File;
use std::io::{ErrorKind, Read};
use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::errors::Result;
use crate::registrar::Descriptions;
use crate::registry::SageMakerConfig;
use crate::retry::RetryConfig;

pub const DEFAULT_CONFIG_FILE: &str = "./dev-config.yml";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub registry: RegistryBackend,
    pub retry: RetryConfig,
    pub descriptions: Descriptions,
    pub listen: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: RegistryBackend::SageMaker(SageMakerConfig::default()),
            retry: RetryConfig::default(),
            descriptions: Descriptions::default(),
            listen: SocketAddr::from(([0, 0, 0, 0], 9000)),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum RegistryBackend {
    SageMaker(SageMakerConfig),
}

impl Config {
    /// Load configuration from `path`. Without a path, `./dev-config.yml` is used if present and
    /// built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Config::default());
            }
            Err(e) => return Err(e.into()),
        };
        let mut s = String::new();
        file.read_to_string(&mut s)?;
        Config::from_yaml(&s)
    }

    pub fn from_yaml(s: &str) -> Result<Config> {
        Ok(serde_yaml::from_str(s)?)
    }
}
