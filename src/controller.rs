//! Simulation lifecycle
//!
//! [`SimulationController`] owns whichever layout the current document set
//! calls for and routes ticks to it. Rebuilding always goes
//! stop → discard → build → adopt → start, so no tick can see a half-replaced
//! graph.

use tracing::debug;

use crate::graph::GraphBuilder;
use crate::keywords::KeywordProfile;
use crate::radial::RadialLayout;
use crate::simulation::{LayoutSimulator, SimulationParams, Viewport};
use crate::snapshot::LayoutSnapshot;

/// The layout chosen for the current document set
#[derive(Debug, Clone)]
pub enum Layout {
    /// No documents
    Empty,
    /// Exactly one document
    Radial(RadialLayout),
    /// Two or more documents
    Force(LayoutSimulator),
}

impl Layout {
    /// Pick and build the layout for `profiles`
    pub fn select(profiles: &[KeywordProfile], settings: &LayoutSettings) -> Self {
        match profiles {
            [] => Layout::Empty,
            [single] => Layout::Radial(RadialLayout::in_viewport(
                single,
                &settings.viewport,
                settings.radial_radius(),
            )),
            _ => {
                let (cx, cy) = settings.viewport.center();
                let graph = GraphBuilder::new(settings.params.edge_params())
                    .with_circle(cx, cy, settings.viewport.start_radius())
                    .build(profiles);
                Layout::Force(LayoutSimulator::new(
                    graph,
                    settings.params,
                    settings.viewport,
                ))
            }
        }
    }
}

/// Parameters the controller builds layouts with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    pub params: SimulationParams,
    pub viewport: Viewport,
    /// Spoke radius for the radial layout; derived from the viewport when unset
    pub radial_radius: Option<f64>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            params: SimulationParams::default(),
            viewport: Viewport::default(),
            radial_radius: None,
        }
    }
}

impl LayoutSettings {
    pub fn radial_radius(&self) -> f64 {
        self.radial_radius
            .unwrap_or_else(|| RadialLayout::default_radius(&self.viewport))
    }
}

/// Start/stop/toggle wrapper around the active layout
#[derive(Debug, Clone)]
pub struct SimulationController {
    settings: LayoutSettings,
    layout: Layout,
    /// Whether physics should run whenever a force layout is present
    enabled: bool,
}

impl SimulationController {
    /// Controller with no documents; physics enabled
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            settings,
            layout: Layout::Empty,
            enabled: true,
        }
    }

    /// Set whether a rebuilt graph starts simulating immediately
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether ticks currently advance the simulation
    pub fn is_running(&self) -> bool {
        match &self.layout {
            Layout::Force(sim) => sim.is_running(),
            _ => false,
        }
    }

    /// Resume ticking. State is kept, so motion continues where it stopped.
    ///
    /// The choice is remembered: later rebuilds start running too. Layouts
    /// without kinematics have nothing to start.
    pub fn start(&mut self) {
        self.enabled = true;
        self.set_running(true);
    }

    /// Stop ticking without discarding positions or velocities.
    ///
    /// Later rebuilds stay stopped until [`start`](Self::start) or
    /// [`toggle`](Self::toggle) turns physics back on.
    pub fn stop(&mut self) {
        self.enabled = false;
        self.set_running(false);
    }

    /// Flip between running and stopped. Without a force layout this flips
    /// whether the next rebuild starts running.
    pub fn toggle(&mut self) {
        let running = match &self.layout {
            Layout::Force(sim) => sim.is_running(),
            _ => self.enabled,
        };
        if running {
            self.stop();
        } else {
            self.start();
        }
    }

    fn set_running(&mut self, running: bool) {
        if let Layout::Force(sim) = &mut self.layout {
            if sim.is_running() != running {
                debug!(tick = sim.ticks(), running, "simulation state changed");
            }
            sim.set_running(running);
        }
    }

    /// Replace the document set.
    ///
    /// Profile ids must be unique.
    pub fn rebuild(&mut self, profiles: &[KeywordProfile]) {
        self.set_running(false);
        self.layout = Layout::select(profiles, &self.settings);
        debug!(documents = profiles.len(), "layout rebuilt");
        if self.enabled {
            self.set_running(true);
        }
    }

    /// Handle one tick from the timing source. Returns whether a step ran.
    pub fn tick(&mut self) -> bool {
        match &mut self.layout {
            Layout::Force(sim) if sim.is_running() => {
                sim.step();
                true
            }
            _ => false,
        }
    }

    /// Run `n` ticks back to back
    pub fn run_ticks(&mut self, n: usize) -> usize {
        (0..n).filter(|_| self.tick()).count()
    }

    /// Current positions for rendering
    pub fn snapshot(&self) -> LayoutSnapshot {
        match &self.layout {
            Layout::Empty => LayoutSnapshot::empty(),
            Layout::Radial(radial) => LayoutSnapshot::from_radial(radial),
            Layout::Force(sim) => {
                LayoutSnapshot::from_graph(sim.graph(), sim.ticks(), sim.is_running())
            }
        }
    }
}
