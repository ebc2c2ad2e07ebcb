//! Relationship graph construction
//!
//! Derives one node per document and one weighted edge per pair of documents
//! that share at least one keyword. Edge weight drives both the spring rest
//! length and the spring stiffness used by the layout simulator.

use std::collections::BTreeSet;
use std::f64::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::keywords::KeywordProfile;

/// Upper bound on edge weight; more shared keywords than this saturate
pub const MAX_WEIGHT: u32 = 10;

/// A document's physical representation in the layout
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentNode {
    /// Document identifier, stable for the node's lifetime
    pub id: String,
    /// Position
    pub x: f64,
    pub y: f64,
    /// Velocity
    pub vx: f64,
    pub vy: f64,
    /// Uniform mass
    pub mass: f64,
}

impl DocumentNode {
    /// Create a resting node at the given position
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            mass: 1.0,
        }
    }

    /// Current speed
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Euclidean distance to another node
    pub fn distance_to(&self, other: &DocumentNode) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Spring tuning shared by every edge of a graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeParams {
    pub min_rest_length: f64,
    pub max_rest_length: f64,
    pub spring_base_constant: f64,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            min_rest_length: 140.0,
            max_rest_length: 240.0,
            spring_base_constant: 0.08,
        }
    }
}

impl EdgeParams {
    /// Rest length for an edge of the given weight; shrinks as weight grows
    pub fn rest_length(&self, weight: u32) -> f64 {
        let w = f64::from(weight) / f64::from(MAX_WEIGHT);
        self.min_rest_length + (self.max_rest_length - self.min_rest_length) * (1.0 - w)
    }

    /// Spring constant for an edge of the given weight; stiffens as weight grows
    pub fn spring_constant(&self, weight: u32) -> f64 {
        self.spring_base_constant * (0.7 + 0.3 * f64::from(weight))
    }
}

/// A weighted relationship between two documents
///
/// `source` and `target` index into the owning graph's node list.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordEdge {
    pub source: usize,
    pub target: usize,
    /// Keywords present in both documents, never empty
    pub shared_keywords: BTreeSet<String>,
    /// `min(|shared_keywords|, 10)`
    pub weight: u32,
    pub rest_length: f64,
    pub spring_constant: f64,
}

impl KeywordEdge {
    /// Create an edge from the shared keyword set.
    ///
    /// Returns `None` for self-loops and for an empty intersection; such
    /// edges never exist.
    pub fn new(
        source: usize,
        target: usize,
        shared_keywords: BTreeSet<String>,
        params: &EdgeParams,
    ) -> Option<Self> {
        if source == target || shared_keywords.is_empty() {
            return None;
        }

        let weight = (shared_keywords.len() as u32).min(MAX_WEIGHT);
        Some(Self {
            source,
            target,
            shared_keywords,
            weight,
            rest_length: params.rest_length(weight),
            spring_constant: params.spring_constant(weight),
        })
    }

    /// Whether this edge joins the two given node indices, in either order
    pub fn connects(&self, a: usize, b: usize) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Nodes and edges for one document set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<DocumentNode>,
    pub edges: Vec<KeywordEdge>,
}

impl Graph {
    /// An empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the node with the given id
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Edge between two documents, if they share any keyword
    pub fn edge_between(&self, a: &str, b: &str) -> Option<&KeywordEdge> {
        let a = self.node_index(a)?;
        let b = self.node_index(b)?;
        self.edges.iter().find(|e| e.connects(a, b))
    }
}

impl fmt::Display for Graph {
    /// One line per edge: endpoints, weight, spring parameters and shared keywords
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for edge in &self.edges {
            let shared: Vec<&str> = edge.shared_keywords.iter().map(String::as_str).collect();
            writeln!(
                f,
                "{} -- {} weight={} rest={:.1} k={:.3} shared=[{}]",
                self.nodes[edge.source].id,
                self.nodes[edge.target].id,
                edge.weight,
                edge.rest_length,
                edge.spring_constant,
                shared.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Builds relationship graphs from keyword profiles
///
/// Nodes start evenly spaced on a circle so no two share a position.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    params: EdgeParams,
    center_x: f64,
    center_y: f64,
    radius: f64,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(EdgeParams::default())
    }
}

impl GraphBuilder {
    /// Builder centered on the origin with a 100 unit start circle
    pub fn new(params: EdgeParams) -> Self {
        Self {
            params,
            center_x: 0.0,
            center_y: 0.0,
            radius: 100.0,
        }
    }

    /// Set the circle nodes are initially placed on
    pub fn with_circle(mut self, center_x: f64, center_y: f64, radius: f64) -> Self {
        self.center_x = center_x;
        self.center_y = center_y;
        self.radius = radius;
        self
    }

    /// Build nodes and edges for `profiles`.
    ///
    /// Profile ids must be unique; this is not checked. The i-th profile is
    /// placed at angle `2π·i/n`. Every unordered pair with a non-empty keyword
    /// intersection gets exactly one edge, with the lower index as `source`.
    pub fn build(&self, profiles: &[KeywordProfile]) -> Graph {
        let n = profiles.len();
        if n == 0 {
            return Graph::new();
        }

        let nodes: Vec<DocumentNode> = profiles
            .iter()
            .enumerate()
            .map(|(i, profile)| {
                let angle = TAU * (i as f64) / (n as f64);
                DocumentNode::new(
                    profile.id.clone(),
                    self.center_x + self.radius * angle.cos(),
                    self.center_y + self.radius * angle.sin(),
                )
            })
            .collect();

        let keyword_sets: Vec<BTreeSet<String>> =
            profiles.iter().map(KeywordProfile::keyword_set).collect();

        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let shared: BTreeSet<String> = keyword_sets[i]
                    .intersection(&keyword_sets[j])
                    .cloned()
                    .collect();
                if let Some(edge) = KeywordEdge::new(i, j, shared, &self.params) {
                    edges.push(edge);
                }
            }
        }

        debug!(nodes = nodes.len(), edges = edges.len(), "built relationship graph");
        Graph { nodes, edges }
    }
}

/// Similarity of two keyword sets as a percentage: `100·|A∩B| / sqrt(|A|·|B|)`
pub fn keyword_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count() as f64;
    100.0 * shared / ((a.len() * b.len()) as f64).sqrt()
}

/// Result of comparing two profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub a: String,
    pub b: String,
    pub similarity: f64,
    pub shared_keywords: Vec<String>,
}

impl Comparison {
    /// Compare two profiles by keyword overlap
    pub fn between(a: &KeywordProfile, b: &KeywordProfile) -> Self {
        let set_a = a.keyword_set();
        let set_b = b.keyword_set();
        Self {
            a: a.id.clone(),
            b: b.id.clone(),
            similarity: keyword_similarity(&set_a, &set_b),
            shared_keywords: set_a.intersection(&set_b).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, keywords: &[&str]) -> KeywordProfile {
        KeywordProfile::from_keywords(id, keywords.iter().copied())
    }

    fn shared(keywords: &[&str]) -> BTreeSet<String> {
        keywords.iter().map(|k| k.to_string()).collect()
    }

    // ========== Build Tests ==========

    #[test]
    fn empty_profiles_produce_empty_graph() {
        let graph = GraphBuilder::default().build(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.is_empty());
    }

    #[test]
    fn nodes_start_on_circle_at_rest() {
        let profiles = vec![
            profile("a", &["x"]),
            profile("b", &["y"]),
            profile("c", &["z"]),
            profile("d", &["w"]),
        ];
        let graph = GraphBuilder::default()
            .with_circle(450.0, 300.0, 180.0)
            .build(&profiles);

        assert_eq!(graph.nodes.len(), 4);
        for node in &graph.nodes {
            let r = (node.x - 450.0).hypot(node.y - 300.0);
            assert!((r - 180.0).abs() < 1e-9);
            assert_eq!(node.vx, 0.0);
            assert_eq!(node.vy, 0.0);
            assert_eq!(node.mass, 1.0);
        }
        assert!((graph.nodes[0].x - 630.0).abs() < 1e-9);
        assert!((graph.nodes[1].y - 480.0).abs() < 1e-9);
        assert!((graph.nodes[2].x - 270.0).abs() < 1e-9);
        assert!((graph.nodes[3].y - 120.0).abs() < 1e-9);
    }

    #[test]
    fn ids_are_copied_in_order() {
        let profiles = vec![profile("first.txt", &[]), profile("second.txt", &[])];
        let graph = GraphBuilder::default().build(&profiles);
        assert_eq!(graph.nodes[0].id, "first.txt");
        assert_eq!(graph.nodes[1].id, "second.txt");
    }

    #[test]
    fn disjoint_profiles_have_no_edge() {
        let profiles = vec![profile("a", &["alpha"]), profile("b", &["beta"])];
        let graph = GraphBuilder::default().build(&profiles);
        assert!(graph.edges.is_empty());
        assert!(graph.edge_between("a", "b").is_none());
    }

    #[test]
    fn overlapping_profiles_have_one_edge_with_intersection() {
        let profiles = vec![
            profile("a", &["graph", "node", "edge"]),
            profile("b", &["node", "edge", "layout"]),
        ];
        let graph = GraphBuilder::default().build(&profiles);

        assert_eq!(graph.edges.len(), 1);
        let edge = graph.edge_between("b", "a").unwrap();
        assert_eq!(edge.shared_keywords, shared(&["edge", "node"]));
        assert_eq!(edge.weight, 2);
        assert_eq!((edge.source, edge.target), (0, 1));
    }

    #[test]
    fn shared_keywords_do_not_depend_on_build_order() {
        let a = profile("a", &["one", "two", "three"]);
        let b = profile("b", &["three", "two", "four"]);
        let forward = GraphBuilder::default().build(&[a.clone(), b.clone()]);
        let backward = GraphBuilder::default().build(&[b, a]);

        assert_eq!(
            forward.edge_between("a", "b").unwrap().shared_keywords,
            backward.edge_between("a", "b").unwrap().shared_keywords
        );
    }

    #[test]
    fn only_overlapping_pairs_are_connected() {
        let profiles = vec![
            profile("a", &["red", "blue"]),
            profile("b", &["blue", "green"]),
            profile("c", &["green", "black"]),
        ];
        let graph = GraphBuilder::default().build(&profiles);

        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edge_between("a", "b").is_some());
        assert!(graph.edge_between("b", "c").is_some());
        assert!(graph.edge_between("a", "c").is_none());
        for edge in &graph.edges {
            assert!(edge.source < graph.nodes.len());
            assert!(edge.target < graph.nodes.len());
            assert_ne!(edge.source, edge.target);
        }
    }

    // ========== Edge Parameter Tests ==========

    #[test]
    fn weight_saturates_at_ten() {
        let many: Vec<String> = (0..14).map(|i| format!("word{i}")).collect();
        let profiles = vec![
            KeywordProfile::from_keywords("a", many.clone()),
            KeywordProfile::from_keywords("b", many),
        ];
        let graph = GraphBuilder::default().build(&profiles);
        let edge = &graph.edges[0];

        assert_eq!(edge.shared_keywords.len(), 14);
        assert_eq!(edge.weight, MAX_WEIGHT);
        assert!((edge.rest_length - 140.0).abs() < 1e-9);
    }

    #[test]
    fn weight_five_parameters() {
        let params = EdgeParams::default();
        assert!((params.rest_length(5) - 190.0).abs() < 1e-9);
        assert!((params.spring_constant(5) - 0.176).abs() < 1e-9);
    }

    #[test]
    fn rest_length_and_stiffness_are_monotonic_in_weight() {
        let params = EdgeParams::default();
        for w in 1..MAX_WEIGHT {
            let rest = params.rest_length(w);
            assert!(rest >= params.min_rest_length && rest <= params.max_rest_length);
            assert!(params.rest_length(w + 1) <= rest);
            assert!(params.spring_constant(w + 1) >= params.spring_constant(w));
        }
    }

    #[test]
    fn empty_intersection_and_self_loops_are_rejected() {
        let params = EdgeParams::default();
        assert!(KeywordEdge::new(0, 1, BTreeSet::new(), &params).is_none());
        assert!(KeywordEdge::new(2, 2, shared(&["x"]), &params).is_none());
    }

    #[test]
    fn display_lists_edges() {
        let profiles = vec![
            profile("a.txt", &["graph", "node", "edge"]),
            profile("b.txt", &["node", "edge", "layout"]),
            profile("c.txt", &["layout"]),
        ];
        let graph = GraphBuilder::default().build(&profiles);
        insta::assert_snapshot!(graph.to_string(), @r"
        a.txt -- b.txt weight=2 rest=220.0 k=0.104 shared=[edge, node]
        b.txt -- c.txt weight=1 rest=230.0 k=0.080 shared=[layout]
        ");
    }

    // ========== Similarity Tests ==========

    #[test]
    fn similarity_of_identical_sets_is_one_hundred() {
        let set = shared(&["a", "b", "c"]);
        assert!((keyword_similarity(&set, &set) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn similarity_with_empty_set_is_zero() {
        assert_eq!(keyword_similarity(&shared(&["a"]), &BTreeSet::new()), 0.0);
    }

    #[test]
    fn comparison_reports_shared_keywords() {
        let a = profile("a", &["alpha", "beta", "gamma", "delta"]);
        let b = profile("b", &["beta", "delta"]);
        let cmp = Comparison::between(&a, &b);
        assert_eq!(cmp.shared_keywords, vec!["beta", "delta"]);
        // 100 * 2 / sqrt(8)
        assert!((cmp.similarity - 70.710_678).abs() < 1e-4);
    }
}
