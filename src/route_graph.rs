use std::collections::BTreeMap;

/// Graphviz attributes. Ordered so the rendered text is stable.
pub type Attrs = BTreeMap<String, String>;

pub fn attrs<const N: usize>(pairs: [(&str, &str); N]) -> Attrs {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphPoint {
    /// The point's name is an AS number to be resolved when rendering.
    pub resolve_as_asn: bool,
    pub attrs: Attrs,
}

/// Edges are identified by their endpoints only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    pub src: String,
    pub dest: String,
}

impl EdgeKey {
    pub fn new(src: &str, dest: &str) -> Self {
        EdgeKey {
            src: src.to_string(),
            dest: dest.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphEdge {
    /// Labels in insertion order, joined by newlines when rendered.
    pub labels: Vec<String>,
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteGraph {
    points: BTreeMap<String, GraphPoint>,
    edges: BTreeMap<EdgeKey, GraphEdge>,
}

impl RouteGraph {
    pub fn new() -> Self {
        RouteGraph::default()
    }

    /// Adds a point or merges into an existing one. Passed attributes
    /// overwrite, others are kept.
    pub fn add_point(&mut self, name: &str, resolve_as_asn: bool, attrs: Attrs) {
        let point = self.points.entry(name.to_string()).or_default();
        point.resolve_as_asn = resolve_as_asn;
        point.attrs.extend(attrs);
    }

    /// Adds an edge or merges into the existing edge between the same
    /// endpoints. Non-empty labels are appended.
    pub fn add_edge(&mut self, src: &str, dest: &str, label: &str, attrs: Attrs) {
        let edge = self.edges.entry(EdgeKey::new(src, dest)).or_default();
        if !label.is_empty() {
            edge.labels.push(label.to_string());
        }
        edge.attrs.extend(attrs);
    }

    pub fn point(&self, name: &str) -> Option<&GraphPoint> {
        self.points.get(name)
    }

    pub fn edge(&self, src: &str, dest: &str) -> Option<&GraphEdge> {
        self.edges.get(&EdgeKey::new(src, dest))
    }

    pub fn points(&self) -> impl Iterator<Item = (&String, &GraphPoint)> {
        self.points.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &GraphEdge)> {
        self.edges.iter()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
