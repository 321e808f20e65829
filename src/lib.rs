// Re-export all public modules
pub mod shared;
pub mod error;
pub mod config;
pub mod dispatcher;
pub mod asn_cache;
pub mod route_parser;
pub mod route_graph;
pub mod graphviz;
pub mod path_builder;
pub mod bgpmap;

// Re-export commonly used types at the crate root
pub use asn_cache::AsnCache;
pub use bgpmap::BgpMap;
pub use config::{Backend, Config};
pub use dispatcher::{BackendResult, DispatchSettings, Dispatcher};
pub use graphviz::GraphvizRenderer;
pub use path_builder::PathBuilder;
pub use route_graph::{RouteGraph, GraphPoint, GraphEdge};
pub use route_parser::{BirdRouteParser, RouteParser, RouteRecord};
pub use shared::{BgpMapQuery, Endpoint};
