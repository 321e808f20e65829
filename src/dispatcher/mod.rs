pub mod transport;

use std::collections::HashSet;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use reqwest::Url;

use crate::error::{ConfigError, TransportError};
use crate::shared::{
    request_failed, Endpoint, EMPTY_RESPONSE_PLACEHOLDER, INVALID_SERVER_RESPONSE,
};

pub use transport::{HttpTransport, ProxyTransport};

/// Everything the dispatcher needs to know about the proxy fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Backend hosts that may be queried.
    pub allowed: HashSet<String>,
    pub domain: String,
    pub proxy_port: u16,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl DispatchSettings {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DispatchSettings {
            allowed: allowed.into_iter().map(Into::into).collect(),
            domain: String::new(),
            proxy_port: 8000,
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    pub fn with_proxy_port(mut self, port: u16) -> Self {
        self.proxy_port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendQuery {
    pub backend: String,
    pub command: String,
}

/// The text one backend produced, at the position it was requested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResult {
    pub backend: String,
    pub text: String,
    pub index: usize,
}

impl BackendResult {
    pub fn new(backend: &str, text: &str, index: usize) -> Self {
        BackendResult {
            backend: backend.to_string(),
            text: text.to_string(),
            index,
        }
    }
}

/// Builds `http://<host>:<port>/<endpoint>?q=<command>` for a backend.
pub fn backend_url(
    settings: &DispatchSettings,
    backend: &str,
    endpoint: Endpoint,
    command: &str,
) -> Result<Url, TransportError> {
    let mut host = backend.to_string();
    if host.contains(':') {
        host = format!("[{}]", host);
    }
    if !settings.domain.is_empty() {
        host = format!("{}.{}", host, settings.domain);
    }

    let mut url = Url::parse(&format!("http://{}:{}/", host, settings.proxy_port))?;
    url.path_segments_mut()
        .map_err(|_| TransportError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .clear()
        .push(endpoint.as_str());
    url.query_pairs_mut().append_pair("q", command);
    Ok(url)
}

/// Fans one command out to many proxies in parallel.
pub struct Dispatcher<T: ProxyTransport = HttpTransport> {
    settings: DispatchSettings,
    transport: T,
}

impl Dispatcher<HttpTransport> {
    pub fn new(settings: DispatchSettings) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(settings.timeout, settings.connect_timeout)?;
        Ok(Dispatcher { settings, transport })
    }
}

impl<T: ProxyTransport> Dispatcher<T> {
    pub fn with_transport(settings: DispatchSettings, transport: T) -> Self {
        Dispatcher { settings, transport }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_allowed(&self, backend: &str) -> bool {
        self.settings.allowed.contains(backend)
    }

    /// Queries every backend and returns one result per backend, in the
    /// order `backends` was given. Failures come back as text.
    pub fn dispatch(
        &self,
        backends: &[String],
        endpoint: Endpoint,
        command: &str,
    ) -> Vec<BackendResult> {
        let mut slots: Vec<Option<String>> = vec![None; backends.len()];

        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<(usize, String)>();

            for (index, backend) in backends.iter().enumerate() {
                if !self.is_allowed(backend) {
                    tracing::warn!("Rejected backend {:?}: not in server list", backend);
                    slots[index] = Some(INVALID_SERVER_RESPONSE.to_string());
                    continue;
                }

                let query = BackendQuery {
                    backend: backend.clone(),
                    command: command.to_string(),
                };
                let tx = tx.clone();
                scope.spawn(move || {
                    let text = self.query_backend(&query, endpoint);
                    // The receiver outlives every sender inside this scope.
                    let _ = tx.send((index, text));
                });
            }
            drop(tx);

            for (index, text) in rx {
                slots[index] = Some(text);
            }
        });

        backends
            .iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (backend, text))| {
                let text = match text {
                    Some(text) if !text.is_empty() => text,
                    _ => EMPTY_RESPONSE_PLACEHOLDER.to_string(),
                };
                BackendResult {
                    backend: backend.clone(),
                    text,
                    index,
                }
            })
            .collect()
    }

    pub fn dispatch_text(&self, backends: &[String], endpoint: Endpoint, command: &str) -> Vec<String> {
        self.dispatch(backends, endpoint, command)
            .into_iter()
            .map(|result| result.text)
            .collect()
    }

    fn query_backend(&self, query: &BackendQuery, endpoint: Endpoint) -> String {
        let response = backend_url(&self.settings, &query.backend, endpoint, &query.command)
            .and_then(|url| {
                tracing::debug!("Querying {} at {}", query.backend, url);
                self.transport.get(&url)
            });

        match response {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("Backend {} failed: {}", query.backend, err);
                request_failed(err)
            }
        }
    }
}
