//! Rendering readback
//!
//! A serializable, read-only copy of the current layout: node positions and
//! edge endpoints. Renderers and the HTTP API consume this instead of touching
//! simulation state.

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::radial::RadialLayout;

/// Which layout produced the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// No documents loaded
    Empty,
    /// One document, hub and keywords
    Radial,
    /// Two or more documents, force-directed
    Force,
}

/// Node kind determines rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Keyword,
}

/// A node position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
}

/// An edge with both endpoint positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    /// Source node ID
    pub source: String,

    /// Target node ID
    pub target: String,

    /// Stroke weight, 1 to 10
    pub weight: u32,

    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,

    /// Keywords behind the edge, sorted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_keywords: Vec<String>,
}

/// Complete layout readback for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub layout: LayoutKind,

    /// Simulation ticks taken so far (always 0 for non-force layouts)
    pub tick: u64,

    /// Whether the simulation is advancing
    pub running: bool,

    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl LayoutSnapshot {
    /// Snapshot with no nodes
    pub fn empty() -> Self {
        Self {
            layout: LayoutKind::Empty,
            tick: 0,
            running: false,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Read back a force-directed graph
    pub fn from_graph(graph: &Graph, tick: u64, running: bool) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .map(|n| NodeView {
                id: n.id.clone(),
                kind: NodeKind::Document,
                x: n.x,
                y: n.y,
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .map(|e| {
                let (a, b) = (&graph.nodes[e.source], &graph.nodes[e.target]);
                EdgeView {
                    source: a.id.clone(),
                    target: b.id.clone(),
                    weight: e.weight,
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                    shared_keywords: e.shared_keywords.iter().cloned().collect(),
                }
            })
            .collect();

        Self {
            layout: LayoutKind::Force,
            tick,
            running,
            nodes,
            edges,
        }
    }

    /// Read back a radial layout; every spoke is a weight-1 edge from the hub
    pub fn from_radial(layout: &RadialLayout) -> Self {
        let hub = &layout.hub;
        let mut nodes = vec![NodeView {
            id: hub.id.clone(),
            kind: NodeKind::Document,
            x: hub.x,
            y: hub.y,
        }];
        let mut edges = Vec::with_capacity(layout.spokes.len());

        for spoke in &layout.spokes {
            let node = &spoke.node;
            nodes.push(NodeView {
                id: node.id.clone(),
                kind: NodeKind::Keyword,
                x: node.x,
                y: node.y,
            });
            edges.push(EdgeView {
                source: hub.id.clone(),
                target: node.id.clone(),
                weight: 1,
                x1: hub.x,
                y1: hub.y,
                x2: node.x,
                y2: node.y,
                shared_keywords: Vec::new(),
            });
        }

        Self {
            layout: LayoutKind::Radial,
            tick: 0,
            running: false,
            nodes,
            edges,
        }
    }

    /// Position of a node by id
    pub fn position(&self, id: &str) -> Option<(f64, f64)> {
        self.nodes.iter().find(|n| n.id == id).map(|n| (n.x, n.y))
    }
}
