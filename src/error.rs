use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid server entry {0:?}")]
    InvalidServer(String),

    #[error("invalid whois command {0:?}")]
    InvalidWhoisCommand(String),

    #[error("dns resolver unavailable: {0}")]
    Resolver(#[source] io::Error),

    #[error("http client unavailable: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Why a single backend call failed. Always rendered into the result text.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("{0}")]
    Read(#[from] io::Error),
}

/// Why an ASN lookup strategy produced nothing. Never surfaced past the cache.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("dns lookup failed: {0}")]
    Dns(#[from] hickory_resolver::error::ResolveError),

    #[error("whois i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("no address for whois server {0}")]
    NoAddress(String),

    #[error("whois command exited with {0}")]
    Command(std::process::ExitStatus),

    #[error("lookup returned no usable data")]
    Empty,
}
