use std::collections::HashMap;
use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use serde::{Deserialize, Serialize};
use tracing::debug;
use xdg::BaseDirectories;

/// Name of storefront managed directories
const STOREFRONT_DIR_NAME: &str = "storefront";
const STOREFRONT_CONFIG_DIR_VAR: &str = "STOREFRONT_CONFIG_DIR";
const STOREFRONT_ENV_PREFIX: &str = "STOREFRONT_";
pub const STOREFRONT_CONFIG_FILE: &str = "storefront.toml";

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Base URL of the remote catalog (default: the public instance)
    // Using a URL here adds an extra trailing slash,
    // so just use a String.
    pub api_url: Option<String>,

    /// How many products `storefront list` shows per page by default
    pub page_size: Option<NonZeroU32>,

    /// Value of the `User-Agent` header sent to the catalog
    pub user_agent: Option<String>,

    /// Directory the user configuration file is read from (default:
    /// `$XDG_CONFIG_HOME/storefront`)
    ///
    /// Set through `$STOREFRONT_CONFIG_DIR`, the config file cannot change it.
    pub config_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a [Config] from the environment and config files
    pub fn parse() -> Result<Config> {
        let raw_config = read_raw_config()?;
        let config: Config = raw_config
            .try_deserialize()
            .context("Could not parse config")?;
        debug!(?config, "parsed config");
        Ok(config)
    }
}

/// Layer the config sources, lowest precedence first:
///
/// 1. `/etc/storefront/storefront.toml`
/// 2. `storefront.toml` in the XDG config directories
/// 3. `storefront.toml` in `$STOREFRONT_CONFIG_DIR`
/// 4. `STOREFRONT_*` environment variables
fn read_raw_config() -> Result<HierarchicalConfig> {
    let storefront_dirs = BaseDirectories::with_prefix(STOREFRONT_DIR_NAME);

    let config_dir = match env::var(STOREFRONT_CONFIG_DIR_VAR) {
        Ok(v) => {
            debug!("`${STOREFRONT_CONFIG_DIR_VAR}` set: {v}");
            Some(PathBuf::from(v))
        },
        Err(_) => {
            let config_dir = storefront_dirs.get_config_home();
            debug!("`${STOREFRONT_CONFIG_DIR_VAR}` not set, using {config_dir:?}");
            config_dir
        },
    };

    let mut builder = HierarchicalConfig::builder();
    if let Some(config_dir) = &config_dir {
        builder = builder.set_override("config_dir", config_dir.to_string_lossy().as_ref())?;
    }

    // read from /etc
    builder = builder.add_source(
        config::File::from(
            PathBuf::from("/etc")
                .join(STOREFRONT_DIR_NAME)
                .join(STOREFRONT_CONFIG_FILE),
        )
        .format(config::FileFormat::Toml)
        .required(false),
    );

    // look for files in XDG_CONFIG_DIRS locations
    for file in storefront_dirs.find_config_files(STOREFRONT_CONFIG_FILE) {
        debug!(file = %file.display(), "adding config file");
        builder = builder.add_source(config::File::from(file).format(config::FileFormat::Toml));
    }

    // add explicit config dir file last
    if let Some(config_dir) = &config_dir {
        builder = builder.add_source(
            config::File::from(config_dir.join(STOREFRONT_CONFIG_FILE))
                .format(config::FileFormat::Toml)
                .required(false),
        );
    }

    // override via env variables
    let storefront_envs = env::vars()
        .filter_map(|(k, v)| {
            k.strip_prefix(STOREFRONT_ENV_PREFIX)
                .filter(|k| *k != "CONFIG_DIR")
                .map(|k| (k.to_lowercase(), v))
        })
        .collect::<HashMap<_, _>>();

    let builder = builder.add_source(
        Environment::default()
            .source(Some(storefront_envs))
            .try_parsing(true),
    );

    Ok(builder.build()?)
}
