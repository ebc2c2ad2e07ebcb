//! Force-directed layout simulation
//!
//! Advances node positions by one fixed time step per tick under three
//! influences:
//! - Coulomb-style repulsion between every pair of nodes (with damping)
//! - Hooke springs along every keyword edge (undamped)
//! - Soft walls that clamp nodes inside the padded viewport and bounce them
//!
//! The pass order inside [`LayoutSimulator::step`] is fixed; changing it
//! changes trajectories.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::graph::{DocumentNode, EdgeParams, Graph};

/// Guards the repulsion denominator against coincident nodes
const REPULSION_EPSILON: f64 = 0.01;

/// Guards the spring direction against coincident endpoints
const SPRING_EPSILON: f64 = 0.001;

/// Invalid simulation parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("restitution must be within [0, 1], got {0}")]
    Restitution(f64),

    #[error("time_step {0} is too large for a tick period")]
    TimeStepTooLarge(f64),

    #[error("min_rest_length ({min}) exceeds max_rest_length ({max})")]
    RestRange { min: f64, max: f64 },

    #[error("viewport {width}x{height} leaves no room inside boundary padding {padding}")]
    ViewportTooSmall {
        width: f64,
        height: f64,
        padding: f64,
    },
}

/// Tunable physics parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Coulomb-style repulsion strength
    pub repulsion_constant: f64,
    /// Hooke stiffness before weight scaling
    pub spring_base_constant: f64,
    /// Velocity retained per tick, applied in the repulsion pass only
    pub damping: f64,
    /// Fixed integration step in seconds
    pub time_step: f64,
    pub min_rest_length: f64,
    pub max_rest_length: f64,
    /// Cap on any single pairwise repulsive force
    pub repulsion_clamp: f64,
    /// Speed cap applied before integration
    pub max_speed: f64,
    /// Soft-wall margin from the viewport edges
    pub boundary_padding: f64,
    /// Velocity retained (sign-flipped) on wall contact
    pub restitution: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            repulsion_constant: 2800.0,
            spring_base_constant: 0.08,
            damping: 0.85,
            time_step: 1.0 / 60.0,
            min_rest_length: 140.0,
            max_rest_length: 240.0,
            repulsion_clamp: 900.0,
            max_speed: 900.0,
            boundary_padding: 80.0,
            restitution: 0.4,
        }
    }
}

impl SimulationParams {
    /// Spring parameters handed to the graph builder
    pub fn edge_params(&self) -> EdgeParams {
        EdgeParams {
            min_rest_length: self.min_rest_length,
            max_rest_length: self.max_rest_length,
            spring_base_constant: self.spring_base_constant,
        }
    }

    /// Tick period for a real-time driver
    pub fn tick_period(&self) -> Result<Duration, ParamError> {
        Duration::try_from_secs_f64(self.time_step)
            .map_err(|_| ParamError::TimeStepTooLarge(self.time_step))
    }

    /// Check that every parameter is usable with the given viewport
    pub fn validate(&self, viewport: &Viewport) -> Result<(), ParamError> {
        let positive = [
            ("repulsion_constant", self.repulsion_constant),
            ("spring_base_constant", self.spring_base_constant),
            ("damping", self.damping),
            ("time_step", self.time_step),
            ("min_rest_length", self.min_rest_length),
            ("max_rest_length", self.max_rest_length),
            ("repulsion_clamp", self.repulsion_clamp),
            ("max_speed", self.max_speed),
            ("boundary_padding", self.boundary_padding),
            ("viewport.width", viewport.width),
            ("viewport.height", viewport.height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParamError::NotPositive { name, value });
            }
        }

        self.tick_period()?;

        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ParamError::Restitution(self.restitution));
        }

        if self.min_rest_length > self.max_rest_length {
            return Err(ParamError::RestRange {
                min: self.min_rest_length,
                max: self.max_rest_length,
            });
        }

        let padding = self.boundary_padding;
        if viewport.width <= 2.0 * padding || viewport.height <= 2.0 * padding {
            return Err(ParamError::ViewportTooSmall {
                width: viewport.width,
                height: viewport.height,
                padding,
            });
        }

        Ok(())
    }
}

/// The area nodes are laid out in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center point
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Radius of the circle documents start on before the simulation runs
    pub fn start_radius(&self) -> f64 {
        let (cx, cy) = self.center();
        (cx.min(cy) - 120.0).max(1.0)
    }
}

/// Everything one simulation owns: the graph, its parameters and the
/// running flag
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub graph: Graph,
    pub params: SimulationParams,
    pub viewport: Viewport,
    running: bool,
}

impl SimulationState {
    /// Create a stopped state
    pub fn new(graph: Graph, params: SimulationParams, viewport: Viewport) -> Self {
        Self {
            graph,
            params,
            viewport,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Steps a [`SimulationState`] forward in time
#[derive(Debug, Clone)]
pub struct LayoutSimulator {
    state: SimulationState,
    ticks: u64,
}

impl LayoutSimulator {
    /// Take ownership of a freshly built graph
    pub fn new(graph: Graph, params: SimulationParams, viewport: Viewport) -> Self {
        Self::from_state(SimulationState::new(graph, params, viewport))
    }

    pub fn from_state(state: SimulationState) -> Self {
        Self { state, ticks: 0 }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn graph(&self) -> &Graph {
        &self.state.graph
    }

    pub fn nodes(&self) -> &[DocumentNode] {
        &self.state.graph.nodes
    }

    pub fn params(&self) -> &SimulationParams {
        &self.state.params
    }

    pub fn viewport(&self) -> &Viewport {
        &self.state.viewport
    }

    /// Number of steps taken since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.state.running = running;
    }

    /// Sum of `½·m·|v|²` over all nodes
    pub fn kinetic_energy(&self) -> f64 {
        self.nodes()
            .iter()
            .map(|n| 0.5 * n.mass * (n.vx * n.vx + n.vy * n.vy))
            .sum()
    }

    /// Advance the simulation by one time step.
    ///
    /// Runs the repulsion pass, the spring pass, the speed clamp, Euler
    /// integration and boundary containment, in that order. Does not consult
    /// the running flag; scheduling is the caller's concern.
    pub fn step(&mut self) {
        if self.state.graph.nodes.is_empty() {
            return;
        }

        self.apply_repulsion();
        self.apply_springs();
        self.integrate();

        self.ticks += 1;
        trace!(tick = self.ticks, "simulation step");
    }

    /// Advance by `n` steps
    pub fn step_n(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    /// All-pairs repulsion; damping is applied here and nowhere else
    fn apply_repulsion(&mut self) {
        let params = self.state.params;
        let nodes = &mut self.state.graph.nodes;
        let n = nodes.len();

        // Positions do not move during this pass, so updating velocities
        // in place is order-independent
        for i in 0..n {
            let (mut fx, mut fy) = (0.0, 0.0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = nodes[i].x - nodes[j].x;
                let dy = nodes[i].y - nodes[j].y;
                let dist_sq = dx * dx + dy * dy + REPULSION_EPSILON;
                let dist = dist_sq.sqrt();

                let force = (params.repulsion_constant / dist_sq).min(params.repulsion_clamp);
                fx += force * (dx / dist);
                fy += force * (dy / dist);
            }

            let node = &mut nodes[i];
            node.vx = (node.vx + (fx / node.mass) * params.time_step) * params.damping;
            node.vy = (node.vy + (fy / node.mass) * params.time_step) * params.damping;
        }
    }

    /// Hooke springs along every edge, equal and opposite on the endpoints
    fn apply_springs(&mut self) {
        let dt = self.state.params.time_step;
        let graph = &mut self.state.graph;

        for edge in &graph.edges {
            let (a, b) = (edge.source, edge.target);
            let dx = graph.nodes[b].x - graph.nodes[a].x;
            let dy = graph.nodes[b].y - graph.nodes[a].y;
            let dist = (dx * dx + dy * dy).sqrt() + SPRING_EPSILON;
            let stretch = dist - edge.rest_length;

            let fx = edge.spring_constant * stretch * (dx / dist);
            let fy = edge.spring_constant * stretch * (dy / dist);

            graph.nodes[a].vx += fx * dt;
            graph.nodes[a].vy += fy * dt;
            graph.nodes[b].vx -= fx * dt;
            graph.nodes[b].vy -= fy * dt;
        }
    }

    /// Speed clamp, explicit Euler step, then wall containment per axis
    fn integrate(&mut self) {
        let params = self.state.params;
        let viewport = self.state.viewport;
        let pad = params.boundary_padding;
        let (max_x, max_y) = (viewport.width - pad, viewport.height - pad);

        for node in &mut self.state.graph.nodes {
            let speed = node.speed();
            if speed > params.max_speed {
                node.vx = node.vx / speed * params.max_speed;
                node.vy = node.vy / speed * params.max_speed;
            }

            node.x += node.vx * params.time_step;
            node.y += node.vy * params.time_step;

            if node.x < pad {
                node.x = pad;
                node.vx *= -params.restitution;
            } else if node.x > max_x {
                node.x = max_x;
                node.vx *= -params.restitution;
            }

            if node.y < pad {
                node.y = pad;
                node.vy *= -params.restitution;
            } else if node.y > max_y {
                node.y = max_y;
                node.vy *= -params.restitution;
            }
        }
    }
}
