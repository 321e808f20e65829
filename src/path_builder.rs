use std::sync::Arc;

use crate::asn_cache::AsnCache;
use crate::dispatcher::BackendResult;
use crate::graphviz::GraphvizRenderer;
use crate::route_graph::{attrs, Attrs, RouteGraph};
use crate::route_parser::{BirdRouteParser, RouteParser, RouteRecord};
use crate::shared::REQUEST_FAILED_PREFIX;

pub fn target_point_name(target: &str) -> String {
    format!("Target: {}", target)
}

fn edge_attrs(preferred: bool) -> Attrs {
    let mut result = attrs([("fontsize", "12")]);
    if preferred {
        result.insert("color".to_string(), "red".to_string());
    }
    result
}

fn as_point_attrs(preferred: bool) -> Attrs {
    if preferred {
        attrs([("color", "red")])
    } else {
        Attrs::new()
    }
}

/// Builds the AS-path graph for one target out of every backend's route dump.
pub struct PathBuilder<P: RouteParser = BirdRouteParser> {
    cache: Arc<AsnCache>,
    parser: P,
}

impl PathBuilder<BirdRouteParser> {
    pub fn new(cache: Arc<AsnCache>) -> Self {
        PathBuilder {
            cache,
            parser: BirdRouteParser::new(),
        }
    }
}

impl<P: RouteParser> PathBuilder<P> {
    pub fn with_parser<Q: RouteParser>(self, parser: Q) -> PathBuilder<Q> {
        PathBuilder {
            cache: self.cache,
            parser,
        }
    }

    pub fn cache(&self) -> &Arc<AsnCache> {
        &self.cache
    }

    pub fn build_graph(&self, results: &[BackendResult], target: &str) -> RouteGraph {
        let mut graph = RouteGraph::new();
        let target = target_point_name(target);
        graph.add_point(&target, false, attrs([("color", "red"), ("shape", "diamond")]));

        for result in results {
            if result.text.is_empty() {
                continue;
            }
            graph.add_point(&result.backend, false, attrs([("color", "blue"), ("shape", "box")]));

            // Error text may contain route introducers ("Network is unreachable").
            if result.text.starts_with(REQUEST_FAILED_PREFIX) {
                tracing::debug!("{}: no routes, backend failed", result.backend);
                continue;
            }

            let records = self.parser.parse(&result.text);
            tracing::debug!("{}: {} routes to {}", result.backend, records.len(), target);
            for record in &records {
                add_route(&mut graph, &result.backend, &target, record);
            }
        }

        graph
    }

    /// Builds the graph and renders it as a digraph document.
    pub fn render(&self, results: &[BackendResult], target: &str) -> String {
        let graph = self.build_graph(results, target);
        GraphvizRenderer::new(&self.cache).render(&graph)
    }
}

fn add_route(graph: &mut RouteGraph, backend: &str, target: &str, record: &RouteRecord) {
    let label = record.label();
    let preferred = record.preferred;

    // Non-BGP routes go straight to the target, named by their protocol.
    if !record.is_bgp() {
        graph.add_edge(backend, target, &label, edge_attrs(preferred));
        return;
    }

    let mut src = backend;
    for (i, asn) in record.as_path.iter().enumerate() {
        let edge_label = if i == 0 { label.as_str() } else { "" };
        graph.add_edge(src, asn, edge_label, edge_attrs(preferred));
        graph.add_point(asn, true, as_point_attrs(preferred));
        src = asn.as_str();
    }
    graph.add_edge(src, target, "", edge_attrs(preferred));
}
