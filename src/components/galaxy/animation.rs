//! Frame orchestration: one simulation tick, then one render.
//!
//! [`AnimationLoop`] owns everything a mounted view mutates (simulation, camera,
//! input state, renderer) and is driven from outside once per animation frame.
//! External callers never touch camera or simulation directly; they queue a
//! [`CameraCommand`] through a [`GalaxyHandle`] and the loop applies it at the
//! start of the next frame.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use log::{debug, info};
use serde::Deserialize;

use super::camera::{CameraConfig, CameraController};
use super::input::{GraphEvent, InputConfig, InputController};
use super::render::{Renderer, Surface};
use super::simulation::{ForceSimulation, SimulationConfig, SimulationPhase};
use super::theme::GalaxyTheme;
use super::types::{Edge, GraphData, Node};

/// Every tunable of a galaxy view.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
	pub simulation: SimulationConfig,
	pub camera: CameraConfig,
	pub input: InputConfig,
	pub theme: GalaxyTheme,
}

/// Request queued on a [`GalaxyHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraCommand {
	/// Zoom in around the viewport center.
	ZoomIn,
	/// Zoom out around the viewport center.
	ZoomOut,
	/// Frame every node.
	FitAll,
	/// Restart the layout from current positions.
	Reheat,
}

/// Imperative controls for a mounted view.
///
/// Cheap to clone; all clones feed the same queue.
#[derive(Clone, Debug, Default)]
pub struct GalaxyHandle {
	queue: Rc<RefCell<VecDeque<CameraCommand>>>,
}

impl GalaxyHandle {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn zoom_in(&self) {
		self.send(CameraCommand::ZoomIn);
	}

	pub fn zoom_out(&self) {
		self.send(CameraCommand::ZoomOut);
	}

	pub fn fit_all(&self) {
		self.send(CameraCommand::FitAll);
	}

	pub fn reheat(&self) {
		self.send(CameraCommand::Reheat);
	}

	/// Queue a command for the next frame.
	pub fn send(&self, command: CameraCommand) {
		self.queue.borrow_mut().push_back(command);
	}

	fn drain(&self) -> Vec<CameraCommand> {
		self.queue.borrow_mut().drain(..).collect()
	}
}

/// Shared teardown flag. Cancelling is idempotent.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.set(true);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.get()
	}
}

/// Per-view state, advanced one frame at a time.
pub struct AnimationLoop {
	simulation: ForceSimulation,
	nodes: Vec<Node>,
	simulation_config: SimulationConfig,
	camera: CameraController,
	input: InputController,
	renderer: Renderer,
	handle: GalaxyHandle,
	token: CancelToken,
	fitted: bool,
}

impl AnimationLoop {
	/// Build the simulation, warm-start it synchronously and take the first
	/// snapshot. Nothing is drawn until the first [`Self::frame`].
	pub fn new(
		data: &GraphData,
		config: GalaxyConfig,
		width: f64,
		height: f64,
		handle: GalaxyHandle,
		token: CancelToken,
	) -> Self {
		let star_seed = config.simulation.seed.unwrap_or(0x5eed);
		let mut simulation = ForceSimulation::new(data, config.simulation.clone(), width, height);
		simulation.warm_start();
		Self {
			nodes: simulation.snapshot(),
			simulation,
			simulation_config: config.simulation,
			camera: CameraController::new(width, height, config.camera),
			input: InputController::new(config.input),
			renderer: Renderer::new(config.theme, width, height, star_seed),
			handle,
			token,
			fitted: false,
		}
	}

	/// Swap in a new graph. The simulation is rebuilt from scratch; the camera
	/// is left alone. A view that has not auto-fitted yet still fits once the
	/// new layout settles.
	pub fn replace_graph(&mut self, data: &GraphData) {
		let (width, height) = self.camera.viewport();
		self.simulation = ForceSimulation::new(data, self.simulation_config.clone(), width, height);
		self.simulation.warm_start();
		self.nodes = self.simulation.snapshot();
	}

	/// Advance one frame: apply queued commands, tick if animating, then draw.
	///
	/// Returns `false` once cancelled, without drawing; the caller should stop
	/// scheduling frames.
	pub fn frame(&mut self, surface: &mut impl Surface) -> bool {
		if self.token.is_cancelled() {
			return false;
		}

		for command in self.handle.drain() {
			self.apply(command);
		}

		if self.simulation.phase() == SimulationPhase::Animating {
			self.simulation.tick();
			self.nodes = self.simulation.snapshot();
		}

		// auto-fit once per mount, and only onto a non-empty layout
		if !self.fitted && self.simulation.is_settled() && self.camera.fit_all(&self.nodes) {
			self.fitted = true;
			info!("galaxy: layout settled, fitted {} nodes", self.nodes.len());
		}

		self.renderer
			.render(surface, &self.nodes, self.simulation.edges(), &self.camera);
		true
	}

	fn apply(&mut self, command: CameraCommand) {
		debug!("galaxy: {command:?}");
		match command {
			CameraCommand::ZoomIn => self.camera.zoom_in(),
			CameraCommand::ZoomOut => self.camera.zoom_out(),
			CameraCommand::FitAll => {
				self.camera.fit_all(&self.nodes);
			}
			CameraCommand::Reheat => self.simulation.reheat(),
		}
	}

	/// Stop the loop. Further frames draw nothing.
	pub fn cancel(&self) {
		self.token.cancel();
	}

	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}

	/// Track a new viewport size. Camera offset and zoom are kept.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.resize(width, height);
		self.renderer.resize(width, height);
		self.simulation.resize(height);
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.input.pointer_down(x, y);
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<GraphEvent> {
		self.input.pointer_move(x, y, &mut self.camera, &self.nodes)
	}

	pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<GraphEvent> {
		self.input.pointer_up(x, y, &self.camera, &self.nodes)
	}

	pub fn pointer_leave(&mut self) -> Option<GraphEvent> {
		self.input.pointer_leave()
	}

	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		self.input.wheel(x, y, delta_y, &mut self.camera);
	}

	pub fn touch_start(&mut self, touches: &[(f64, f64)]) {
		self.input.touch_start(touches);
	}

	pub fn touch_move(&mut self, touches: &[(f64, f64)]) {
		self.input.touch_move(touches, &mut self.camera);
	}

	pub fn touch_end(&mut self, changed: &[(f64, f64)]) -> Option<GraphEvent> {
		self.input.touch_end(changed, &self.camera, &self.nodes)
	}

	/// Whether a press is currently panning the view.
	pub fn is_dragging(&self) -> bool {
		self.input.is_dragging()
	}

	pub fn is_settled(&self) -> bool {
		self.simulation.is_settled()
	}

	pub fn phase(&self) -> SimulationPhase {
		self.simulation.phase()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		self.simulation.edges()
	}

	pub fn camera(&self) -> &CameraController {
		&self.camera
	}

	/// Fix a node in place, e.g. while the user holds it.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		self.simulation.pin(id, x, y)
	}

	pub fn unpin(&mut self, id: &str) -> bool {
		self.simulation.unpin(id)
	}

	pub fn alpha(&self) -> f64 {
		self.simulation.alpha()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::galaxy::render::{DrawCall, RecordingSurface};

	fn config(decay: f64, warm: usize) -> GalaxyConfig {
		let mut config = GalaxyConfig::default();
		config.simulation.seed = Some(11);
		config.simulation.alpha_decay = decay;
		config.simulation.warm_start_ticks = warm;
		config.theme.star_count = 3;
		config
	}

	fn triangle() -> GraphData {
		GraphData {
			nodes: vec![Node::new("a"), Node::new("b"), Node::new("c")],
			edges: vec![
				Edge::new("a", "b", 1.0),
				Edge::new("b", "c", 1.0),
				Edge::new("c", "ghost", 1.0),
			],
		}
	}

	fn looped(data: &GraphData, config: GalaxyConfig) -> (AnimationLoop, GalaxyHandle, CancelToken) {
		let handle = GalaxyHandle::new();
		let token = CancelToken::new();
		let anim = AnimationLoop::new(data, config, 800.0, 600.0, handle.clone(), token.clone());
		(anim, handle, token)
	}

	#[test]
	fn warm_start_runs_before_the_first_frame() {
		let (anim, _, _) = looped(&triangle(), config(0.02, 100));
		assert_eq!(anim.phase(), SimulationPhase::Animating);
		assert!((anim.alpha() - 0.98f64.powi(100)).abs() < 1e-12);
		assert_eq!(anim.edges().len(), 2);
	}

	#[test]
	fn one_tick_then_one_render_per_frame() {
		let (mut anim, _, _) = looped(&triangle(), config(0.02, 10));
		let before = anim.alpha();
		let mut surface = RecordingSurface::default();
		assert!(anim.frame(&mut surface));
		assert!((anim.alpha() - before * 0.98).abs() < 1e-12);
		assert_eq!(surface.calls.len(), 5);
		assert!(matches!(surface.calls[0], DrawCall::Clear(..)));
	}

	#[test]
	fn settled_frames_render_without_ticking() {
		let (mut anim, _, _) = looped(&triangle(), config(0.3, 5));
		let mut surface = RecordingSurface::default();
		while !anim.is_settled() {
			anim.frame(&mut surface);
		}
		let alpha = anim.alpha();
		let nodes = anim.nodes().to_vec();
		surface.calls.clear();
		anim.frame(&mut surface);
		anim.frame(&mut surface);
		assert_eq!(anim.alpha(), alpha);
		assert_eq!(anim.nodes(), nodes.as_slice());
		assert_eq!(surface.calls.len(), 10);
	}

	#[test]
	fn first_settle_fits_once() {
		let (mut anim, _, _) = looped(&triangle(), config(0.3, 5));
		let mut surface = RecordingSurface::default();
		while !anim.is_settled() {
			anim.frame(&mut surface);
		}
		let fitted = anim.camera().camera();
		assert_ne!(fitted.scale, 1.0);

		anim.pointer_down(100.0, 100.0);
		anim.pointer_move(200.0, 100.0);
		anim.pointer_up(200.0, 100.0);
		anim.frame(&mut surface);
		assert_eq!(anim.camera().camera().x, fitted.x + 100.0);
	}

	#[test]
	fn settling_during_warm_start_still_fits() {
		let (mut anim, _, _) = looped(&triangle(), config(0.5, 100));
		assert!(anim.is_settled());
		let mut surface = RecordingSurface::default();
		anim.frame(&mut surface);
		assert_ne!(anim.camera().camera().scale, 1.0);
	}

	#[test]
	fn commands_apply_on_the_next_frame() {
		let (mut anim, handle, _) = looped(&triangle(), config(0.02, 10));
		handle.zoom_in();
		handle.zoom_in();
		assert_eq!(anim.camera().camera().scale, 1.0);
		anim.frame(&mut RecordingSurface::default());
		assert!((anim.camera().camera().scale - 1.69).abs() < 1e-12);
		handle.zoom_out();
		anim.frame(&mut RecordingSurface::default());
		assert!((anim.camera().camera().scale - 1.3).abs() < 1e-12);
	}

	#[test]
	fn reheat_resumes_animation() {
		let (mut anim, handle, _) = looped(&triangle(), config(0.5, 100));
		assert!(anim.is_settled());
		handle.reheat();
		anim.frame(&mut RecordingSurface::default());
		assert_eq!(anim.phase(), SimulationPhase::Animating);
		assert!((anim.alpha() - 0.15).abs() < 1e-12);
	}

	#[test]
	fn cancelled_loop_stops_drawing() {
		let (mut anim, _, token) = looped(&triangle(), config(0.02, 10));
		token.cancel();
		token.cancel();
		anim.cancel();
		let mut surface = RecordingSurface::default();
		assert!(!anim.frame(&mut surface));
		assert!(surface.calls.is_empty());
		assert!(anim.is_cancelled());
	}

	#[test]
	fn empty_graph_animates_quietly() {
		let (mut anim, handle, _) = looped(&GraphData::default(), config(0.02, 100));
		handle.fit_all();
		let mut surface = RecordingSurface::default();
		for _ in 0..3 {
			assert!(anim.frame(&mut surface));
		}
		assert_eq!(anim.camera().camera().scale, 1.0);
		assert!(anim.nodes().is_empty());
	}

	#[test]
	fn replacing_the_graph_keeps_the_camera() {
		let (mut anim, handle, _) = looped(&triangle(), config(0.02, 10));
		handle.zoom_in();
		anim.frame(&mut RecordingSurface::default());
		anim.wheel(400.0, 300.0, -1.0);
		let camera = anim.camera().camera();

		let data = GraphData {
			nodes: vec![Node::new("x"), Node::new("y")],
			edges: vec![Edge::new("x", "y", 0.5)],
		};
		anim.replace_graph(&data);
		assert_eq!(anim.camera().camera(), camera);
		assert_eq!(anim.nodes().len(), 2);
		assert_eq!(anim.phase(), SimulationPhase::Animating);
	}

	#[test]
	fn settled_replacement_does_not_refit() {
		let (mut anim, _, _) = looped(&triangle(), config(0.3, 5));
		let mut surface = RecordingSurface::default();
		while !anim.is_settled() {
			anim.frame(&mut surface);
		}
		anim.wheel(400.0, 300.0, -1.0);
		anim.pointer_down(100.0, 100.0);
		anim.pointer_move(160.0, 40.0);
		anim.pointer_up(160.0, 40.0);
		let camera = anim.camera().camera();

		let mut data = triangle();
		data.nodes.push(Node::new("d"));
		data.edges.push(Edge::new("c", "d", 1.0));
		anim.replace_graph(&data);
		for _ in 0..200 {
			anim.frame(&mut surface);
		}
		assert!(anim.is_settled());
		assert_eq!(anim.camera().camera(), camera);
	}

	#[test]
	fn empty_start_fits_the_first_real_graph() {
		let (mut anim, _, _) = looped(&GraphData::default(), config(0.3, 5));
		let mut surface = RecordingSurface::default();
		anim.frame(&mut surface);
		assert_eq!(anim.camera().camera().scale, 1.0);

		anim.replace_graph(&triangle());
		for _ in 0..200 {
			anim.frame(&mut surface);
		}
		assert_ne!(anim.camera().camera().scale, 1.0);
	}

	#[test]
	fn resize_keeps_offset_and_zoom() {
		let (mut anim, handle, _) = looped(&triangle(), config(0.02, 10));
		handle.zoom_out();
		anim.frame(&mut RecordingSurface::default());
		let camera = anim.camera().camera();
		anim.resize(1024.0, 768.0);
		assert_eq!(anim.camera().camera(), camera);
		assert_eq!(anim.camera().viewport(), (1024.0, 768.0));
	}
}
