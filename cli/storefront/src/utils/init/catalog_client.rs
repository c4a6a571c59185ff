use std::path::PathBuf;

use anyhow::{Context, bail};
use storefront_sdk::providers::catalog::{
    CatalogClient,
    CatalogClientConfig,
    Client,
    DEFAULT_API_URL,
    MockClient,
    STOREFRONT_CATALOG_MOCK_DATA_VAR,
};
use tracing::debug;

use crate::config::Config;

/// Initialize the catalog client
///
/// - Initialize a mock client if `_STOREFRONT_USE_CATALOG_MOCK` is set to
///   the path of a mock data file
/// - Initialize a real client otherwise
pub fn init_catalog_client(config: &Config) -> Result<Client, anyhow::Error> {
    if let Ok(path_str) = std::env::var(STOREFRONT_CATALOG_MOCK_DATA_VAR) {
        let path = PathBuf::from(path_str);
        if !path.exists() {
            bail!("path to mock data file doesn't exist: {}", path.display());
        }

        debug!(mock_data_path = %path.display(), "using mock catalog client");
        return Ok(MockClient::new(Some(path))?.into());
    }

    Ok(CatalogClient::new(catalog_client_config(config))
        .context("could not create catalog client")?
        .into())
}

fn catalog_client_config(config: &Config) -> CatalogClientConfig {
    // If not configured, use the default URL
    let api_url = config.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
    debug!(api_url, "using catalog client");

    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| format!("storefront/{}", env!("CARGO_PKG_VERSION")));

    CatalogClientConfig {
        user_agent: Some(user_agent),
        ..CatalogClientConfig::new(api_url)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use serial_test::serial;

    use super::*;

    #[test]
    fn client_config_defaults() {
        let config = catalog_client_config(&Config::default());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(
            config.user_agent,
            Some(format!("storefront/{}", env!("CARGO_PKG_VERSION")))
        );
    }

    #[test]
    fn client_config_from_config() {
        let config = catalog_client_config(&Config {
            api_url: Some("http://localhost:3000/api/v1".to_string()),
            user_agent: Some("tester".to_string()),
            ..Default::default()
        });
        assert_eq!(config.api_url, "http://localhost:3000/api/v1");
        assert_eq!(config.user_agent.as_deref(), Some("tester"));
    }

    #[test]
    #[serial]
    fn mock_client_from_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[]").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let client = temp_env::with_var(STOREFRONT_CATALOG_MOCK_DATA_VAR, Some(&path), || {
            init_catalog_client(&Config::default()).unwrap()
        });
        assert!(matches!(client, Client::Mock(_)));
    }

    #[test]
    #[serial]
    fn missing_mock_file_is_an_error() {
        let result = temp_env::with_var(
            STOREFRONT_CATALOG_MOCK_DATA_VAR,
            Some("/does/not/exist.json"),
            || init_catalog_client(&Config::default()),
        );
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn real_client_by_default() {
        let client = temp_env::with_var_unset(STOREFRONT_CATALOG_MOCK_DATA_VAR, || {
            init_catalog_client(&Config::default()).unwrap()
        });
        assert!(matches!(client, Client::Catalog(_)));
    }
}
