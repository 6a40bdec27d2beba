use delight_core::{ClientConfig, DelightConfig, DelightResult};

/// Loaded configuration plus command-line overrides.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub inner: DelightConfig,
}

impl CliConfig {
    pub fn load(base_url: Option<String>) -> DelightResult<Self> {
        let inner = DelightConfig::load()?;
        Self::from_config(inner, base_url)
    }

    pub fn from_config(mut inner: DelightConfig, base_url: Option<String>) -> DelightResult<Self> {
        if let Some(url) = base_url {
            inner.client.base_url = url;
        }
        inner.validate()?;
        Ok(Self { inner })
    }

    pub fn client(&self) -> &ClientConfig {
        &self.inner.client
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}
