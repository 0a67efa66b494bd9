//! Settings loading.
//!
//! Instances come from an optional config file (TOML, JSON or YAML, chosen
//! by extension), overlaid with `XMRWATCH_` environment variables, plus at
//! most one instance given on the command line.
//!
//! ```toml
//! [[instances]]
//! name = "rig1"
//! address = "http://10.0.0.5:8080"
//! token = "secret"
//! ```

use std::path::Path;

use anyhow::{bail, Result};
use config::{Config, Environment, File, Map};
use serde::Deserialize;

use xmrwatch_types::InstanceConfig;

/// Environment variable prefix, e.g. `XMRWATCH_UI_REFRESH_MS`.
///
/// Nested keys are separated by `__` after the prefix.
pub const ENV_PREFIX: &str = "XMRWATCH";

/// Instance name used when `--address` is given without `--name`.
pub const DEFAULT_INSTANCE_NAME: &str = "xmrig";

/// Loaded settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Configured miner instances, in the order they are set up.
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,

    /// Redraw interval of the terminal UI, in milliseconds.
    #[serde(default)]
    pub ui_refresh_ms: Option<u64>,
}

/// An instance given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliInstance {
    pub name: Option<String>,
    pub address: Option<String>,
    pub token: Option<String>,
}

impl CliInstance {
    fn into_instance(self) -> Option<InstanceConfig> {
        let address = self.address?;
        let name = self.name.unwrap_or_else(|| DEFAULT_INSTANCE_NAME.to_string());
        let instance = InstanceConfig::new(name, address);
        Some(match self.token {
            Some(token) => instance.with_token(token),
            None => instance,
        })
    }
}

impl Settings {
    /// Load settings from `path` (if given) and the environment, then append
    /// the command line instance.
    ///
    /// Fails if the file cannot be read or parsed, or if no instance is
    /// configured at all.
    pub fn load(path: Option<&Path>, cli: CliInstance) -> Result<Self> {
        Self::load_from(path, cli, environment(None))
    }

    fn load_from(path: Option<&Path>, cli: CliInstance, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(env);

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Some(instance) = cli.into_instance() {
            settings.instances.push(instance);
        }

        if settings.instances.is_empty() {
            bail!("No instances configured; pass --address or list [[instances]] in --config");
        }

        Ok(settings)
    }
}

/// The environment layer; `source` replaces the process environment.
fn environment(source: Option<Map<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .source(source)
}
