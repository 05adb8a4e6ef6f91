//! # syl-config
//!
//! Layered configuration loading for syllabus using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SYLLABUS_*` prefix, `__` as separator)
//! 2. Project-level `.syllabus/config.toml`
//! 3. User-level `~/.config/syllabus/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! `SYLLABUS_GENERATION__MODEL` -> `generation.model`,
//! `SYLLABUS_RETRIEVAL__MIN_SCORE` -> `retrieval.min_score`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use syl_config::SylConfig;
//!
//! let config = SylConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//!
//! if config.generation.is_configured() {
//!     println!("model: {}", config.generation.model);
//! }
//! ```

mod ambiguity;
mod assembler;
mod cache;
mod error;
mod general;
mod generation;
mod knowledge;
mod retrieval;
mod suggestions;

pub use ambiguity::AmbiguityConfig;
pub use assembler::AssemblerConfig;
pub use cache::CacheConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use generation::GenerationConfig;
pub use knowledge::KnowledgeConfig;
pub use retrieval::RetrievalConfig;
pub use suggestions::SuggestionConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix for every config key.
pub const ENV_PREFIX: &str = "SYLLABUS_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SylConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub ambiguity: AmbiguityConfig,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    #[serde(default)]
    pub assembler: AssemblerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl SylConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests and the CLI can layer extra providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".syllabus/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check cross-field constraints figment cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retrieval.validate()?;
        self.ambiguity.validate()?;
        if self.cache.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.max_entries".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.general.namespace.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.namespace".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// The generation section, or an error naming it when incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when endpoint or model is missing.
    pub fn require_generation(&self) -> Result<&GenerationConfig, ConfigError> {
        if self.generation.is_configured() {
            Ok(&self.generation)
        } else {
            Err(ConfigError::NotConfigured {
                section: "generation".into(),
            })
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("syllabus").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current dir.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}
