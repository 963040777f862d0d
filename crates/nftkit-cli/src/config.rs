use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, File, Source};
use nftkit::{AuctionSettings, LaunchpadSettings};
use nftkit_fake_ledger::FakeLedgerConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    #[default]
    Fake,
    JsonRpc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub backend: LedgerBackend,
    pub rpc_url: Option<String>,
    pub poll_interval_ms: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Ledger {
            backend: LedgerBackend::Fake,
            rpc_url: None,
            poll_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub seconds_per_block: u64,
    pub default_price: u64,
}

impl Default for Auction {
    fn default() -> Self {
        Auction {
            seconds_per_block: nftkit::auction::DEFAULT_SECONDS_PER_BLOCK,
            default_price: nftkit::pricing::DEFAULT_TOKEN_PRICE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub ledger: Ledger,
    #[serde(default)]
    pub auction: Auction,
    #[serde(default)]
    pub fake_ledger: FakeLedgerConfig,
}

impl Settings {
    #[must_use]
    pub fn new<P>(config_file_name: Option<P>) -> Self
    where
        P: Into<PathBuf>,
    {
        let default_settings = Self::default();

        let Some(config_file_name) = config_file_name else {
            return default_settings;
        };

        let path = config_file_name.into().to_string_lossy().to_string();

        match Self::new_from_default(&default_settings, File::with_name(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!(
                    "Error reading config file, falling back to defaults. Error: {e:?}"
                );
                default_settings
            }
        }
    }

    fn new_from_default<S>(default: &Settings, source: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let config: Config = Config::builder()
            // use defaults
            .add_source(Config::try_from(default)?)
            // override with file contents
            .add_source(source)
            .build()?;
        let settings: Settings = config.try_deserialize()?;

        if settings.ledger.backend == LedgerBackend::JsonRpc
            && settings.ledger.rpc_url.is_none()
        {
            return Err(ConfigError::Message(
                "jsonrpc backend requires ledger.rpc_url".to_string(),
            ));
        }

        if settings.ledger.poll_interval_ms == 0 {
            return Err(ConfigError::Message(
                "ledger.poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(settings)
    }

    #[cfg(test)]
    fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Self::new_from_default(
            &Self::default(),
            File::from_str(contents, config::FileFormat::Toml),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.ledger.poll_interval_ms)
    }

    pub fn launchpad_settings(&self) -> LaunchpadSettings {
        LaunchpadSettings {
            poll_interval: self.poll_interval(),
            auction: AuctionSettings {
                seconds_per_block: self.auction.seconds_per_block,
            },
        }
    }
}
