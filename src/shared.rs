use std::fmt;

/// Upper bound on a proxy response body; anything past it is dropped.
pub const MAX_RESPONSE_BYTES: usize = 65536;

/// Upper bound on output captured from a local WHOIS executable.
pub const MAX_WHOIS_COMMAND_BYTES: usize = 65535;

pub const DEFAULT_WHOIS_PORT: u16 = 43;

pub const REQUEST_FAILED_PREFIX: &str = "request failed: ";

pub const INVALID_SERVER_RESPONSE: &str = "request failed: invalid server\n";

pub const EMPTY_RESPONSE_PLACEHOLDER: &str =
    "node returned empty response, please refresh to try again.";

/// WHOIS fields shown on bgpmap nodes when nothing else is configured.
pub const DEFAULT_BGPMAP_INFO: &str = "asn,as-name,ASName,descr";

/// Text a failed backend call is replaced with.
pub fn request_failed(description: impl fmt::Display) -> String {
    format!("{}{}\n", REQUEST_FAILED_PREFIX, description)
}

/// Proxy endpoints a backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Bird,
    Traceroute,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Bird => "bird",
            Endpoint::Traceroute => "traceroute",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// BIRD commands that produce a route dump suitable for a bgpmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BgpMapQuery {
    #[default]
    RouteFor,
    RouteWhere,
}

impl BgpMapQuery {
    pub fn command(&self, target: &str) -> String {
        match self {
            BgpMapQuery::RouteFor => format!("show route for {} all", target),
            BgpMapQuery::RouteWhere => format!("show route where net ~ [ {} ] all", target),
        }
    }
}

impl fmt::Display for BgpMapQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BgpMapQuery::RouteFor => "route_bgpmap",
            BgpMapQuery::RouteWhere => "route_where_bgpmap",
        };
        write!(f, "{}", s)
    }
}
