use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::asn_cache::AsnCache;
use crate::config::Config;
use crate::dispatcher::{Dispatcher, HttpTransport, ProxyTransport};
use crate::error::ConfigError;
use crate::path_builder::PathBuilder;
use crate::shared::{BgpMapQuery, Endpoint};

/// Queries backends for routes to a target and draws the AS paths.
pub struct BgpMap<T: ProxyTransport = HttpTransport> {
    dispatcher: Dispatcher<T>,
    builder: PathBuilder,
}

impl BgpMap<HttpTransport> {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let dispatcher = Dispatcher::new(config.dispatch_settings()?)?;
        let cache = Arc::new(AsnCache::from_config(&config.naming())?);
        Ok(BgpMap::new(dispatcher, cache))
    }
}

impl<T: ProxyTransport> BgpMap<T> {
    /// The cache may be shared with other maps built from the same config.
    pub fn new(dispatcher: Dispatcher<T>, cache: Arc<AsnCache>) -> Self {
        BgpMap {
            dispatcher,
            builder: PathBuilder::new(cache),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn render(&self, backends: &[String], target: &str, query: BgpMapQuery) -> String {
        let command = query.command(target);
        tracing::info!("{} for {:?} on {} backends", query, target, backends.len());
        let results = self.dispatcher.dispatch(backends, Endpoint::Bird, &command);
        self.builder.render(&results, target)
    }

    /// Same as [`render`](Self::render), base64 encoded for embedding in a page.
    pub fn render_base64(&self, backends: &[String], target: &str, query: BgpMapQuery) -> String {
        STANDARD.encode(self.render(backends, target, query))
    }
}
