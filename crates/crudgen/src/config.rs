//! Generator configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. `crudgen.toml` in the working directory (or an explicit file)
//! 3. `CRUDGEN_`-prefixed environment variables, `__` separating sections
//!    (`CRUDGEN_DEFAULTS__FRAMEWORK=DJANGO` sets `defaults.framework`)

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crudgen_core::{Framework, GenerationType, KeyStrategy};
use crudgen_export::ArchiveOptions;

/// Default config file name.
pub const CONFIG_FILE: &str = "crudgen.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "CRUDGEN_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub defaults: RequestDefaults,
    pub model: ModelSettings,
    pub archive: ArchiveOptions,
    pub logging: LogSettings,
}

/// Values used when a request leaves a field out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    pub package_name: String,
    pub framework: Framework,
    pub generation_type: GenerationType,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            package_name: "com.example".to_string(),
            framework: Framework::SpringBoot,
            generation_type: GenerationType::FilesOnly,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Type of synthesized surrogate keys.
    pub key_strategy: KeyStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl GeneratorConfig {
    /// Load from `crudgen.toml` and the environment.
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::figment().extract()?)
    }

    /// Load from an explicit file and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Self::figment_from(path).extract()?)
    }

    pub fn figment() -> Figment {
        Self::figment_from(CONFIG_FILE)
    }

    pub fn figment_from(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
