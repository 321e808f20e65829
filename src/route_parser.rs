use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Route introducers as printed by BIRD 2 (nest/rt-attr.c). Text before
    // the first one is the destination banner.
    static ref ROUTE_SPLIT_RE: Regex =
        Regex::new(r"(unicast|blackhole|unreachable|prohibited)").unwrap();

    // `unicast [ibgp_sea02 2021-08-27 from fd86:bad:11b7:1::1] * (100/1015) [i]`
    static ref PROTOCOL_NAME_RE: Regex = Regex::new(r"\[(.*?) .*\]").unwrap();

    static ref VIA_RE: Regex = Regex::new(r"(?m)^\t(via .*?)$").unwrap();
    static ref AS_PATH_RE: Regex = Regex::new(r"(?m)^\tBGP\.as_path: (.*?)$").unwrap();
}

/// One route out of a `show route ... all` dump.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteRecord {
    pub preferred: bool,
    pub via: Option<String>,
    /// AS numbers in path order, confederation brackets removed. Empty for
    /// routes that did not come from BGP.
    pub as_path: Vec<String>,
    /// Protocol instance name, with `*` appended for the preferred route.
    pub protocol: Option<String>,
}

impl RouteRecord {
    pub fn is_bgp(&self) -> bool {
        !self.as_path.is_empty()
    }

    /// `protocol\nvia`, with missing parts left out.
    pub fn label(&self) -> String {
        let protocol = self.protocol.as_deref().unwrap_or("");
        let via = self.via.as_deref().unwrap_or("");
        format!("{}\n{}", protocol, via).trim().to_string()
    }
}

/// Turns a routing daemon's route dump into records. Dump formats differ
/// between daemon versions, so the graph code only sees this trait.
pub trait RouteParser: Send + Sync {
    fn parse(&self, dump: &str) -> Vec<RouteRecord>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BirdRouteParser;

impl BirdRouteParser {
    pub fn new() -> Self {
        BirdRouteParser
    }

    fn parse_chunk(chunk: &str) -> RouteRecord {
        let preferred = chunk.contains('*');

        let via = VIA_RE
            .captures(chunk)
            .map(|caps| caps[1].trim().to_string())
            .filter(|via| !via.is_empty());

        let as_path = AS_PATH_RE
            .captures(chunk)
            .map(|caps| {
                caps[1]
                    .split_whitespace()
                    .map(|asn| {
                        let asn = asn.strip_prefix('(').unwrap_or(asn);
                        asn.strip_suffix(')').unwrap_or(asn).to_string()
                    })
                    .filter(|asn| !asn.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let protocol = PROTOCOL_NAME_RE.captures(chunk).map(|caps| {
            let name = caps[1].trim();
            if preferred {
                format!("{}*", name)
            } else {
                name.to_string()
            }
        });

        RouteRecord {
            preferred,
            via,
            as_path,
            protocol,
        }
    }
}

impl RouteParser for BirdRouteParser {
    fn parse(&self, dump: &str) -> Vec<RouteRecord> {
        ROUTE_SPLIT_RE
            .split(dump)
            .skip(1)
            .map(Self::parse_chunk)
            .collect()
    }
}
