use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::asn_cache::WhoisField;
use crate::dispatcher::DispatchSettings;
use crate::error::ConfigError;
use crate::shared::DEFAULT_BGPMAP_INFO;

const CONFIG_FILE_NAME: &str = "bird-lg.toml";

/// Frontend configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Allow-listed backends, either `host` or `Display<host>`.
    pub servers: Vec<String>,

    /// Suffix appended to every backend host name.
    pub domain: String,

    pub proxy_port: u16,

    /// WHOIS server (`host[:port]`) or absolute path to a whois executable.
    pub whois: String,

    /// DNS zone queried as `AS<n>.<zone>` for TXT records.
    pub dns_interface: String,

    /// Comma separated WHOIS fields shown on bgpmap nodes.
    pub bgpmap_info: String,

    /// Overall per-backend timeout in seconds.
    pub timeout: u64,

    /// Per-backend connect timeout in seconds.
    pub connection_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            servers: Vec::new(),
            domain: String::new(),
            proxy_port: 8000,
            whois: "whois.verisign-grs.com".to_string(),
            dns_interface: "asn.cymru.com".to_string(),
            bgpmap_info: DEFAULT_BGPMAP_INFO.to_string(),
            timeout: 120,
            connection_timeout: 5,
        }
    }
}

/// A configured backend: the name shown to operators and the host queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    pub display: String,
    pub host: String,
}

impl Backend {
    /// Parses `host` or `Display<host>`.
    pub fn parse(entry: &str) -> Result<Self, ConfigError> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(ConfigError::InvalidServer(entry.to_string()));
        }

        match entry.find('<') {
            Some(pos) => {
                let host = entry[pos + 1..]
                    .strip_suffix('>')
                    .filter(|host| !host.is_empty())
                    .ok_or_else(|| ConfigError::InvalidServer(entry.to_string()))?;
                Ok(Backend {
                    display: entry[..pos].to_string(),
                    host: host.to_string(),
                })
            }
            None => Ok(Backend {
                display: entry.to_string(),
                host: entry.to_string(),
            }),
        }
    }
}

/// Which external sources name AS numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConfig {
    pub dns_interface: Option<String>,
    pub whois: Option<String>,
    pub fields: Vec<WhoisField>,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded config from {:?} ({} servers)", path, config.servers.len());
        Ok(config)
    }

    /// Loads the first config file found in the usual places, or the defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        for path in Self::search_paths() {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }
        tracing::warn!("No {} found, using defaults", CONFIG_FILE_NAME);
        Ok(Config::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".").join(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("bird-lg").join(CONFIG_FILE_NAME));
        }
        paths.push(PathBuf::from("/etc/bird-lg").join(CONFIG_FILE_NAME));
        paths
    }

    pub fn backends(&self) -> Result<Vec<Backend>, ConfigError> {
        self.servers.iter().map(|entry| Backend::parse(entry)).collect()
    }

    pub fn dispatch_settings(&self) -> Result<DispatchSettings, ConfigError> {
        let allowed = self.backends()?.into_iter().map(|backend| backend.host).collect();
        Ok(DispatchSettings {
            allowed,
            domain: self.domain.clone(),
            proxy_port: self.proxy_port,
            timeout: Duration::from_secs(self.timeout),
            connect_timeout: Duration::from_secs(self.connection_timeout),
        })
    }

    pub fn naming(&self) -> NamingConfig {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        let info = if self.bgpmap_info.trim().is_empty() {
            DEFAULT_BGPMAP_INFO
        } else {
            self.bgpmap_info.as_str()
        };

        NamingConfig {
            dns_interface: non_empty(self.dns_interface.as_str()),
            whois: non_empty(self.whois.as_str()),
            fields: WhoisField::parse_list(info),
        }
    }
}
