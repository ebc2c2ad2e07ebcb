//! Single-document radial layout
//!
//! With only one document there is nothing to relate, so the document becomes
//! a hub at the viewport center and its keywords are spread evenly on a
//! circle around it. Positions are computed once; there are no kinematics.

use std::f64::consts::TAU;

use crate::graph::DocumentNode;
use crate::keywords::KeywordProfile;
use crate::simulation::Viewport;

/// A keyword placed around the hub
#[derive(Debug, Clone, PartialEq)]
pub struct Spoke {
    /// Keyword node, id is the keyword itself
    pub node: DocumentNode,
    /// Keyword frequency in the document
    pub count: usize,
}

/// Hub-and-spoke placement for exactly one document
#[derive(Debug, Clone, PartialEq)]
pub struct RadialLayout {
    pub hub: DocumentNode,
    pub spokes: Vec<Spoke>,
    pub radius: f64,
}

impl RadialLayout {
    /// Default spoke radius for a viewport
    pub fn default_radius(viewport: &Viewport) -> f64 {
        viewport.width.min(viewport.height) / 2.3
    }

    /// Place `profile`'s hub at `(center_x, center_y)` and its keywords, in
    /// rank order, at angle `2π·i/k` on a circle of `radius`.
    pub fn new(profile: &KeywordProfile, center_x: f64, center_y: f64, radius: f64) -> Self {
        let hub = DocumentNode::new(profile.id.clone(), center_x, center_y);
        let k = profile.keywords.len();

        let spokes = profile
            .keywords
            .iter()
            .enumerate()
            .map(|(i, (keyword, &count))| {
                let angle = TAU * (i as f64) / (k as f64);
                Spoke {
                    node: DocumentNode::new(
                        keyword.clone(),
                        center_x + radius * angle.cos(),
                        center_y + radius * angle.sin(),
                    ),
                    count,
                }
            })
            .collect();

        Self {
            hub,
            spokes,
            radius,
        }
    }

    /// Lay out centered in `viewport`
    pub fn in_viewport(profile: &KeywordProfile, viewport: &Viewport, radius: f64) -> Self {
        let (cx, cy) = viewport.center();
        Self::new(profile, cx, cy, radius)
    }

    /// Hub followed by every keyword node
    pub fn nodes(&self) -> impl Iterator<Item = &DocumentNode> {
        std::iter::once(&self.hub).chain(self.spokes.iter().map(|s| &s.node))
    }
}
