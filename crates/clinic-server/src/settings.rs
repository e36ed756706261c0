//! Runtime configuration: an optional TOML file layered under `CLINIC_*`
//! environment variables.

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

/// Server configuration, deserialised from `config.toml` and the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:      String,
  pub port:      u16,
  /// Connection URL of the backing Redis instance.
  pub redis_url: String,
}

impl ServerConfig {
  pub const DEFAULT_HOST: &'static str = "0.0.0.0";
  pub const DEFAULT_PORT: u16 = 8888;
  pub const DEFAULT_REDIS_URL: &'static str = "redis://localhost:6379";

  /// Load from `path` (missing file is fine) and the environment, e.g.
  /// `CLINIC_PORT=9000`, `CLINIC_REDIS_URL=redis://cache:6379/1`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", Self::DEFAULT_HOST)?
      .set_default("port", i64::from(Self::DEFAULT_PORT))?
      .set_default("redis_url", Self::DEFAULT_REDIS_URL)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CLINIC"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let cfg = ServerConfig::load(Path::new("definitely-not-here.toml")).unwrap();
    assert_eq!(cfg.host, ServerConfig::DEFAULT_HOST);
    assert_eq!(cfg.port, ServerConfig::DEFAULT_PORT);
    assert_eq!(cfg.address(), "0.0.0.0:8888");
  }
}
