use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "./vaultsite.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VaultsiteConfig {
    /// Build configuration
    #[serde(default)]
    pub build: BuildConfig,
    /// Site configuration (from vaultsite-core)
    #[serde(flatten)]
    pub settings: vaultsite_core::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Vault root containing markdown files
    pub source: String,
    /// Output directory for generated site
    pub output: String,
    /// Configuration file path
    pub config: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: ".".to_string(),
            output: "./_site".to_string(),
            config: DEFAULT_CONFIG_FILE.to_string(),
        }
    }
}

impl Default for VaultsiteConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            settings: vaultsite_core::Config::default(),
        }
    }
}

impl VaultsiteConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (VAULTSITE_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = args
            .try_get_one::<String>("config")
            .unwrap_or(None)
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        }

        // 3. Add environment variables with VAULTSITE_ prefix
        builder = builder.add_source(
            Environment::with_prefix("VAULTSITE")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        // Only args that are defined for this command and actually given
        for (arg, key) in [
            ("source", "build.source"),
            ("output", "build.output"),
            ("config", "build.config"),
            ("base_path", "site.base_path"),
        ] {
            if let Some(value) = args.try_get_one::<String>(arg).unwrap_or(None) {
                builder = builder.set_override(key, value.clone())?;
            }
        }

        // Build and deserialize
        let config = builder.build()?;
        let vaultsite_config: VaultsiteConfig = config.try_deserialize()?;

        Ok(vaultsite_config)
    }

    /// Get just the site configuration for passing to vaultsite-core
    pub fn site_config(&self) -> &vaultsite_core::Config {
        &self.settings
    }

    /// Get the build configuration
    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }
}

/// Load configuration specifically for build commands
pub fn load_build_config(args: &ArgMatches) -> Result<VaultsiteConfig> {
    VaultsiteConfig::load(args)
}

/// Load configuration specifically for rewrite commands
pub fn load_rewrite_config(args: &ArgMatches) -> Result<VaultsiteConfig> {
    VaultsiteConfig::load(args)
}
