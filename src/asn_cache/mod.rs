//! Resolves AS numbers into the text drawn on bgpmap nodes.
//!
//! Lookup order is DNS TXT, then WHOIS, then the bare `AS<n>` literal. Every
//! answer, the literal included, is cached for the lifetime of the cache, so a
//! cache is tied to the naming sources it was built with.

pub mod dns;
pub mod whois;

use lru::LruCache;
use parking_lot::Mutex;

use crate::config::NamingConfig;
use crate::error::{ConfigError, LookupError};

pub use dns::{format_txt_answer, SystemTxtResolver, TxtResolver};
pub use whois::{extract_whois_fields, WhoisClient, WhoisField, WhoisQuery};

struct DnsSource {
    zone: String,
    resolver: Box<dyn TxtResolver>,
}

struct WhoisSource {
    client: Box<dyn WhoisQuery>,
    fields: Vec<WhoisField>,
}

pub struct AsnCache {
    dns: Option<DnsSource>,
    whois: Option<WhoisSource>,
    entries: Mutex<LruCache<String, String>>,
}

impl AsnCache {
    /// A cache with no external sources; everything resolves to `AS<n>`.
    pub fn new() -> Self {
        AsnCache {
            dns: None,
            whois: None,
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    pub fn from_config(naming: &NamingConfig) -> Result<Self, ConfigError> {
        let mut cache = AsnCache::new();
        if let Some(zone) = &naming.dns_interface {
            cache = cache.with_dns(zone, Box::new(SystemTxtResolver::new()?));
        }
        if let Some(server) = &naming.whois {
            let client = WhoisClient::from_server(server)?;
            cache = cache.with_whois(Box::new(client), naming.fields.clone());
        }
        Ok(cache)
    }

    pub fn with_dns(mut self, zone: &str, resolver: Box<dyn TxtResolver>) -> Self {
        self.dns = Some(DnsSource {
            zone: zone.to_string(),
            resolver,
        });
        self
    }

    pub fn with_whois(mut self, client: Box<dyn WhoisQuery>, fields: Vec<WhoisField>) -> Self {
        self.whois = Some(WhoisSource { client, fields });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display text for `asn` (digits only, no `AS` prefix).
    ///
    /// The lock is not held during the lookup; two callers racing on the same
    /// ASN may both query, and the later answer wins.
    pub fn resolve(&self, asn: &str) -> String {
        let key = asn.to_string();
        if let Some(cached) = self.entries.lock().get(&key) {
            return cached.clone();
        }

        let representation = self.lookup(asn).unwrap_or_else(|| format!("AS{}", asn));
        self.entries.lock().put(key, representation.clone());
        representation
    }

    fn lookup(&self, asn: &str) -> Option<String> {
        if let Some(dns) = &self.dns {
            match self.lookup_dns(dns, asn) {
                Ok(text) => return Some(text),
                Err(err) => tracing::debug!("DNS lookup for AS{} failed: {}", asn, err),
            }
        }

        if let Some(whois) = &self.whois {
            match self.lookup_whois(whois, asn) {
                Ok(text) => return Some(text),
                Err(err) => tracing::debug!("WHOIS lookup for AS{} failed: {}", asn, err),
            }
        }

        None
    }

    fn lookup_dns(&self, dns: &DnsSource, asn: &str) -> Result<String, LookupError> {
        let name = format!("AS{}.{}", asn, dns.zone);
        let records = dns.resolver.txt_records(&name)?;
        if records.is_empty() {
            return Err(LookupError::Empty);
        }
        Ok(format_txt_answer(asn, &records))
    }

    fn lookup_whois(&self, whois: &WhoisSource, asn: &str) -> Result<String, LookupError> {
        let answer = whois.client.query(&format!("AS{}", asn))?;
        if answer.is_empty() {
            return Err(LookupError::Empty);
        }
        extract_whois_fields(asn, &answer, &whois.fields).ok_or(LookupError::Empty)
    }
}

impl Default for AsnCache {
    fn default() -> Self {
        Self::new()
    }
}
