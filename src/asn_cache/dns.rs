use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::Resolver;

use crate::error::{ConfigError, LookupError};

/// Answers TXT queries. One string per record.
pub trait TxtResolver: Send + Sync {
    fn txt_records(&self, name: &str) -> Result<Vec<String>, LookupError>;
}

/// TXT lookups through the host's resolver configuration.
pub struct SystemTxtResolver {
    resolver: Resolver,
}

impl SystemTxtResolver {
    pub fn new() -> Result<Self, ConfigError> {
        let resolver = match Resolver::from_system_conf() {
            Ok(resolver) => resolver,
            Err(err) => {
                tracing::warn!("System resolver config unusable ({}), using defaults", err);
                Resolver::new(ResolverConfig::default(), ResolverOpts::default())
                    .map_err(ConfigError::Resolver)?
            }
        };
        Ok(SystemTxtResolver { resolver })
    }
}

impl TxtResolver for SystemTxtResolver {
    fn txt_records(&self, name: &str) -> Result<Vec<String>, LookupError> {
        let lookup = self.resolver.txt_lookup(name)?;
        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk))
                    .collect::<String>()
            })
            .collect())
    }
}

/// Formats the TXT answer for `AS<asn>.<zone>` as node text.
///
/// Cymru-style answers (`6939 | US | arin | ... | NAME`) drop the leading
/// number and put every remaining column on its own line.
pub fn format_txt_answer(asn: &str, records: &[String]) -> String {
    let joined = records.join(" ");
    let parts: Vec<&str> = joined.split(" | ").collect();
    let text = if parts.len() > 1 {
        parts[1..].join("\n")
    } else {
        joined.clone()
    };
    format!("AS{}\n{}", asn, text)
}
