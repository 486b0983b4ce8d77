use std::{fs, path::Path};

use alloy_primitives::Address;
use portal_codec::Portals;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Deployment addresses the application trusts. Missing fields fall back to
/// the well-known portal deployment.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortalConfig {
    pub portals: Portals,
    /// Sender of ERC-721 and ERC-1155 withdrawal vouchers.
    pub app_contract: Address,
}

impl PortalConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_config_uses_known_portals() {
        let config = PortalConfig::from_json("{}").unwrap();
        assert_eq!(config.portals, Portals::default());
        assert_eq!(config.app_contract, Address::ZERO);
    }

    #[test]
    fn loads_overrides_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"app_contract":"0x1111111111111111111111111111111111111111","portals":{{"erc20":"0x2222222222222222222222222222222222222222"}}}}"#
        )
        .unwrap();

        let config = PortalConfig::load(file.path()).unwrap();
        assert_eq!(config.app_contract, Address::repeat_byte(0x11));
        assert_eq!(config.portals.erc20, Address::repeat_byte(0x22));
        assert_eq!(config.portals.ether, Portals::default().ether);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            PortalConfig::load(Path::new("/nonexistent/portal.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
