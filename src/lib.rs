//! docgraph - Keyword-overlap graphs of document sets with a force-directed layout engine.
//!
//! Documents become nodes; any two documents that share keywords are joined by
//! a spring whose rest length and stiffness depend on how many keywords they
//! share. A fixed-step physics simulation then lets related documents cluster
//! and unrelated ones drift apart. A single document is shown as a radial
//! hub of its keywords instead.
//!
//! Data flows text → [`keywords`] → [`graph`] → [`simulation`] → [`snapshot`],
//! with [`controller`] choosing the layout and routing ticks.

pub mod config;
pub mod controller;
pub mod corpus;
pub mod graph;
pub mod io;
pub mod keywords;
pub mod radial;
pub mod server;
pub mod simulation;
pub mod snapshot;
pub mod ticker;

pub use controller::{Layout, LayoutSettings, SimulationController};
pub use graph::{DocumentNode, Graph, GraphBuilder, KeywordEdge};
pub use keywords::{KeywordProfile, extract_keywords};
pub use simulation::{LayoutSimulator, SimulationParams, SimulationState, Viewport};
pub use snapshot::LayoutSnapshot;

/// Build the layout state for a document set: radial for one document,
/// force-directed for two or more, empty for none.
pub fn build_graph(profiles: &[KeywordProfile], settings: &LayoutSettings) -> Layout {
    Layout::select(profiles, settings)
}
