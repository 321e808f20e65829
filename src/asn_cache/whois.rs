use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::process::Command;
use std::time::Duration;

use crate::error::{ConfigError, LookupError};
use crate::shared::{DEFAULT_WHOIS_PORT, MAX_RESPONSE_BYTES, MAX_WHOIS_COMMAND_BYTES};

const WHOIS_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends one WHOIS query and returns the raw answer.
pub trait WhoisQuery: Send + Sync {
    fn query(&self, query: &str) -> Result<String, LookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhoisClient {
    /// Plain WHOIS over TCP, `host:port`.
    Tcp { server: String, timeout: Duration },
    /// Local executable; the query is appended as the last argument.
    Command { argv: Vec<String> },
}

impl WhoisClient {
    /// `/path/to/whois -h host` runs a command, anything else is a server.
    pub fn from_server(server: &str) -> Result<Self, ConfigError> {
        let server = server.trim();
        if server.starts_with('/') {
            let argv = shlex::split(server)
                .filter(|argv| !argv.is_empty())
                .ok_or_else(|| ConfigError::InvalidWhoisCommand(server.to_string()))?;
            return Ok(WhoisClient::Command { argv });
        }

        let server = if server.contains(':') {
            server.to_string()
        } else {
            format!("{}:{}", server, DEFAULT_WHOIS_PORT)
        };
        Ok(WhoisClient::Tcp {
            server,
            timeout: WHOIS_TIMEOUT,
        })
    }

    fn query_tcp(server: &str, timeout: Duration, query: &str) -> Result<String, LookupError> {
        let addrs = server.to_socket_addrs()?;
        let mut last_err = None;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(err) => last_err = Some(err),
            }
        }
        let mut stream = match (stream, last_err) {
            (Some(stream), _) => stream,
            (None, Some(err)) => return Err(err.into()),
            (None, None) => return Err(LookupError::NoAddress(server.to_string())),
        };

        stream.set_read_timeout(Some(timeout))?;
        stream.write_all(format!("{}\r\n", query).as_bytes())?;

        let mut buf = Vec::new();
        stream.take(MAX_RESPONSE_BYTES as u64).read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn query_command(argv: &[String], query: &str) -> Result<String, LookupError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| LookupError::NoAddress(String::new()))?;
        let output = Command::new(program).args(args).arg(query).output()?;
        if !output.status.success() {
            return Err(LookupError::Command(output.status));
        }

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        combined.truncate(MAX_WHOIS_COMMAND_BYTES);
        Ok(String::from_utf8_lossy(&combined).into_owned())
    }
}

impl WhoisQuery for WhoisClient {
    fn query(&self, query: &str) -> Result<String, LookupError> {
        match self {
            WhoisClient::Tcp { server, timeout } => Self::query_tcp(server, *timeout, query),
            WhoisClient::Command { argv } => Self::query_command(argv, query),
        }
    }
}

/// One entry of the bgpmap info list. A leading `:` keeps every match
/// instead of only the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhoisField {
    pub name: String,
    pub multiline: bool,
}

impl WhoisField {
    pub fn parse(field: &str) -> Self {
        match field.strip_prefix(':') {
            Some(name) if !name.is_empty() => WhoisField {
                name: name.to_string(),
                multiline: true,
            },
            _ => WhoisField {
                name: field.to_string(),
                multiline: false,
            },
        }
    }

    pub fn parse_list(fields: &str) -> Vec<Self> {
        fields
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(Self::parse)
            .collect()
    }
}

/// Picks the configured fields out of a WHOIS answer, one per line.
/// A plain `asn` entry contributes `AS<asn>` first. `None` if nothing matched.
pub fn extract_whois_fields(asn: &str, whois: &str, fields: &[WhoisField]) -> Option<String> {
    let mut result = Vec::new();

    if fields.iter().any(|field| !field.multiline && field.name == "asn") {
        result.push(format!("AS{}", asn));
    }

    for field in fields {
        for line in whois.lines() {
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            let Some((title, content)) = line.split_once(':') else {
                continue;
            };
            if title != field.name {
                continue;
            }
            result.push(content.trim().to_string());
            if !field.multiline {
                break;
            }
        }
    }

    (!result.is_empty()).then(|| result.join("\n"))
}
