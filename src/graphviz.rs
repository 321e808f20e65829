use std::fmt::Write;

use crate::asn_cache::AsnCache;
use crate::route_graph::{Attrs, RouteGraph};

/// Quotes `s` as a Graphviz string literal.
///
/// Uses JSON string escaping and additionally encodes `<`, `>` and `&`, so no
/// route text can close the string or be read as markup by the page.
pub fn graphviz_escape(s: &str) -> String {
    let quoted = serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string());
    quoted
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn attrs_to_string(attrs: &Attrs) -> String {
    let body = attrs
        .iter()
        .map(|(k, v)| {
            assert!(!k.is_empty(), "graphviz attribute with empty key");
            format!("{}={}", graphviz_escape(k), graphviz_escape(v))
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("[{}]", body)
}

fn statement(out: &mut String, subject: &str, attrs: &Attrs) {
    // Writing into a String cannot fail.
    if attrs.is_empty() {
        let _ = writeln!(out, "{};", subject);
    } else {
        let _ = writeln!(out, "{} {};", subject, attrs_to_string(attrs));
    }
}

/// Serializes a [`RouteGraph`] as a `digraph`, labelling AS points with the
/// name the cache resolves. Points and edges come out sorted by key.
pub struct GraphvizRenderer<'a> {
    cache: &'a AsnCache,
}

impl<'a> GraphvizRenderer<'a> {
    pub fn new(cache: &'a AsnCache) -> Self {
        GraphvizRenderer { cache }
    }

    pub fn render(&self, graph: &RouteGraph) -> String {
        let mut out = String::from("digraph {\n");

        // Node IDs stay the graph keys; resolved AS names only become labels,
        // so two ASNs with the same name remain two nodes.
        for (name, point) in graph.points() {
            if point.resolve_as_asn {
                let mut attrs = point.attrs.clone();
                attrs.insert("label".to_string(), self.cache.resolve(name));
                statement(&mut out, &graphviz_escape(name), &attrs);
            } else {
                statement(&mut out, &graphviz_escape(name), &point.attrs);
            }
        }

        for (key, edge) in graph.edges() {
            let mut attrs = edge.attrs.clone();
            if !edge.labels.is_empty() {
                attrs.insert("label".to_string(), edge.labels.join("\n"));
            }
            let subject = format!("{} -> {}", graphviz_escape(&key.src), graphviz_escape(&key.dest));
            statement(&mut out, &subject, &attrs);
        }

        out.push_str("}\n");
        out
    }
}
