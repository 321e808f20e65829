use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};

use crate::error::{ConfigError, TransportError};
use crate::shared::MAX_RESPONSE_BYTES;

/// Performs one GET against a proxy and returns the (possibly truncated) body.
pub trait ProxyTransport: Send + Sync {
    fn get(&self, url: &Url) -> Result<String, TransportError>;
}

/// Blocking HTTP transport. Idle connections are never kept, so every call
/// opens its own connection and a timeout tears that connection down.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(HttpTransport { client })
    }
}

impl ProxyTransport for HttpTransport {
    fn get(&self, url: &Url) -> Result<String, TransportError> {
        let response = self.client.get(url.clone()).send()?;
        if response.status() != StatusCode::OK {
            return Err(TransportError::Status(response.status()));
        }

        let mut body = Vec::new();
        response.take(MAX_RESPONSE_BYTES as u64).read_to_end(&mut body)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
