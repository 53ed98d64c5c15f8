//! Galaxy view: force-directed skill tree and problem graph on a canvas.
//!
//! Renders an interactive node-link diagram with:
//! - A d3-style force simulation (repulsion, springs, centering, collision,
//!   optional tier rows) that warm-starts off screen and settles on its own
//! - Pan, anchored wheel zoom, pinch zoom and fit-to-view
//! - Hover tooltips and click callbacks via inverse-camera hit-testing
//! - A layered starfield / nebula / edge / glow renderer
//!
//! # Example
//!
//! ```ignore
//! use galaxy_graph::{GalaxyCanvas, GalaxyHandle, GraphData, Node, Edge};
//!
//! let data = GraphData {
//!     nodes: vec![Node::new("a"), Node::new("b")],
//!     edges: vec![Edge::new("a", "b", 1.0)],
//! };
//! let handle = GalaxyHandle::new();
//!
//! view! { <GalaxyCanvas data=Signal::derive(move || data.clone()) handle=handle.clone() /> }
//! ```

pub mod animation;
pub mod camera;
mod canvas;
mod component;
mod controls;
pub mod error;
pub mod input;
pub mod render;
pub mod simulation;
mod starfield;
pub mod theme;
mod tooltip;
pub mod transform;
pub mod types;
mod views;

pub use animation::{AnimationLoop, CameraCommand, CancelToken, GalaxyConfig, GalaxyHandle};
pub use camera::{Camera, CameraConfig, CameraController};
pub use component::GalaxyCanvas;
pub use controls::{GalaxyLegend, LayoutStatus, LegendItem, ZoomControls, problem_legend, skill_legend};
pub use error::GalaxyError;
pub use input::{GraphEvent, InputConfig, InputController, find_node_at};
pub use simulation::{ForceSimulation, SimulationConfig, SimulationPhase};
pub use theme::{Color, GalaxyTheme, TierPalette};
pub use tooltip::{GalaxyTooltip, TooltipContent};
pub use types::{
	CuratedSubgraph, Edge, GraphData, HoverInfo, Node, NodeDetail, SubgraphEdge, SubgraphNode, Topic,
	TopicStats, TopicsResponse,
};
pub use views::{ProblemGalaxy, SkillTreeGalaxy, problem_url};
