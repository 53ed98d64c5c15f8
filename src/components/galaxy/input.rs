//! Pointer, wheel and touch interaction.
//!
//! Translates raw canvas-relative positions into camera operations and node
//! hit-tests. A press only becomes a drag once it travels past the click
//! threshold; a release that never became a drag is a click.

use serde::Deserialize;

use super::camera::CameraController;
use super::types::{HoverInfo, Node};

/// Interaction tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
	/// Mouse travel in pixels that turns a press into a drag.
	pub mouse_click_threshold: f64,
	/// Finger travel in pixels that turns a touch into a drag.
	pub touch_click_threshold: f64,
	/// Hit radius as a multiple of the node radius.
	pub hit_multiplier: f64,
	/// Zoom factor for a wheel step away from the user.
	pub wheel_zoom_in: f64,
	/// Zoom factor for a wheel step toward the user.
	pub wheel_zoom_out: f64,
}

impl Default for InputConfig {
	fn default() -> Self {
		Self {
			mouse_click_threshold: 5.0,
			touch_click_threshold: 10.0,
			hit_multiplier: 1.8,
			wheel_zoom_in: 1.1,
			wheel_zoom_out: 0.9,
		}
	}
}

/// Something the host should hear about.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	/// The pointer is over a node, or just left the last one (`None`).
	Hover(Option<HoverInfo>),
	/// A click landed on a node, or on empty space (`None`).
	Click(Option<Node>),
}

#[derive(Clone, Copy, Debug, Default)]
enum Gesture {
	#[default]
	Idle,
	Pressed {
		start: (f64, f64),
		last: (f64, f64),
		threshold: f64,
		dragging: bool,
	},
	Pinching {
		distance: f64,
	},
}

/// The node nearest to a world point among those whose hit radius
/// (`radius * hit_multiplier`) contains it.
pub fn find_node_at(nodes: &[Node], wx: f64, wy: f64, hit_multiplier: f64) -> Option<&Node> {
	let mut closest: Option<(&Node, f64)> = None;
	for node in nodes {
		let dist = (node.x - wx).hypot(node.y - wy);
		if dist >= node.radius * hit_multiplier {
			continue;
		}
		if closest.is_none_or(|(_, best)| dist < best) {
			closest = Some((node, dist));
		}
	}
	closest.map(|(node, _)| node)
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	(a.0 - b.0).hypot(a.1 - b.1)
}

/// Tracks press/drag/pinch state between events.
#[derive(Clone, Debug, Default)]
pub struct InputController {
	config: InputConfig,
	gesture: Gesture,
	hovered: Option<String>,
}

impl InputController {
	/// Idle controller.
	pub fn new(config: InputConfig) -> Self {
		Self {
			config,
			gesture: Gesture::Idle,
			hovered: None,
		}
	}

	/// Whether a press has turned into a pan.
	pub fn is_dragging(&self) -> bool {
		matches!(self.gesture, Gesture::Pressed { dragging: true, .. })
	}

	/// Node under a screen position.
	pub fn hit_test<'a>(
		&self,
		x: f64,
		y: f64,
		camera: &CameraController,
		nodes: &'a [Node],
	) -> Option<&'a Node> {
		let (wx, wy) = camera.screen_to_world(x, y);
		find_node_at(nodes, wx, wy, self.config.hit_multiplier)
	}

	/// Mouse button pressed.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.press(x, y, self.config.mouse_click_threshold);
	}

	/// Mouse moved. Pans while dragging, hit-tests for hover otherwise.
	pub fn pointer_move(
		&mut self,
		x: f64,
		y: f64,
		camera: &mut CameraController,
		nodes: &[Node],
	) -> Option<GraphEvent> {
		if let Gesture::Pressed { .. } = self.gesture {
			self.drag_to(x, y, camera);
			return None;
		}
		match self.hit_test(x, y, camera, nodes).cloned() {
			Some(node) => {
				self.hovered = Some(node.id.clone());
				Some(GraphEvent::Hover(Some(HoverInfo {
					node,
					screen_x: x,
					screen_y: y,
				})))
			}
			None => self.hovered.take().map(|_| GraphEvent::Hover(None)),
		}
	}

	/// Mouse button released.
	pub fn pointer_up(
		&mut self,
		x: f64,
		y: f64,
		camera: &CameraController,
		nodes: &[Node],
	) -> Option<GraphEvent> {
		self.release(x, y, camera, nodes)
	}

	/// Pointer left the canvas: cancel any press and clear the hover.
	pub fn pointer_leave(&mut self) -> Option<GraphEvent> {
		self.gesture = Gesture::Idle;
		self.hovered.take().map(|_| GraphEvent::Hover(None))
	}

	/// Wheel turned over the canvas. Positive `delta_y` zooms out.
	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64, camera: &mut CameraController) {
		if delta_y == 0.0 || delta_y.is_nan() {
			return;
		}
		let factor = if delta_y > 0.0 {
			self.config.wheel_zoom_out
		} else {
			self.config.wheel_zoom_in
		};
		camera.zoom_at(x, y, factor);
	}

	/// Fingers touched down. `touches` holds every active touch.
	pub fn touch_start(&mut self, touches: &[(f64, f64)]) {
		match touches {
			[(x, y)] => self.press(*x, *y, self.config.touch_click_threshold),
			[a, b, ..] => {
				self.gesture = Gesture::Pinching {
					distance: distance(*a, *b),
				}
			}
			[] => {}
		}
	}

	/// Fingers moved. One finger pans, two pinch-zoom without an anchor.
	pub fn touch_move(&mut self, touches: &[(f64, f64)], camera: &mut CameraController) {
		match touches {
			[(x, y)] => self.drag_to(*x, *y, camera),
			[a, b, ..] => {
				let current = distance(*a, *b);
				if let Gesture::Pinching { distance: previous } = &mut self.gesture {
					if *previous > 0.0 && current > 0.0 {
						camera.zoom_by(current / *previous);
					}
					*previous = current;
				} else {
					self.gesture = Gesture::Pinching { distance: current };
				}
			}
			[] => {}
		}
	}

	/// Fingers lifted. `changed` holds the lifted touches.
	pub fn touch_end(
		&mut self,
		changed: &[(f64, f64)],
		camera: &CameraController,
		nodes: &[Node],
	) -> Option<GraphEvent> {
		match changed {
			[(x, y)] => self.release(*x, *y, camera, nodes),
			_ => {
				self.gesture = Gesture::Idle;
				None
			}
		}
	}

	fn press(&mut self, x: f64, y: f64, threshold: f64) {
		self.gesture = Gesture::Pressed {
			start: (x, y),
			last: (x, y),
			threshold,
			dragging: false,
		};
	}

	fn drag_to(&mut self, x: f64, y: f64, camera: &mut CameraController) {
		let Gesture::Pressed {
			start,
			last,
			threshold,
			dragging,
		} = &mut self.gesture
		else {
			return;
		};
		if !*dragging {
			if distance(*start, (x, y)) <= *threshold {
				return;
			}
			*dragging = true;
		}
		camera.pan(x - last.0, y - last.1);
		*last = (x, y);
	}

	fn release(
		&mut self,
		x: f64,
		y: f64,
		camera: &CameraController,
		nodes: &[Node],
	) -> Option<GraphEvent> {
		let gesture = std::mem::take(&mut self.gesture);
		let Gesture::Pressed {
			start,
			threshold,
			dragging,
			..
		} = gesture
		else {
			return None;
		};
		if dragging || distance(start, (x, y)) > threshold {
			return None;
		}
		Some(GraphEvent::Click(self.hit_test(x, y, camera, nodes).cloned()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::galaxy::camera::CameraConfig;
	use proptest::prelude::*;

	fn camera() -> CameraController {
		CameraController::new(800.0, 600.0, CameraConfig::default())
	}

	fn nodes() -> Vec<Node> {
		vec![
			Node::new("left").at(-100.0, 0.0).with_radius(10.0),
			Node::new("right").at(100.0, 0.0).with_radius(10.0),
			Node::new("near-right").at(112.0, 0.0).with_radius(10.0),
		]
	}

	fn clicked_id(event: Option<GraphEvent>) -> Option<Option<String>> {
		match event {
			Some(GraphEvent::Click(node)) => Some(node.map(|n| n.id)),
			_ => None,
		}
	}

	#[test]
	fn hit_test_picks_nearest_in_range() {
		let nodes = nodes();
		assert_eq!(find_node_at(&nodes, -95.0, 3.0, 1.8).map(|n| n.id.as_str()), Some("left"));
		// inside both right-hand hit circles, closer to near-right
		assert_eq!(
			find_node_at(&nodes, 108.0, 0.0, 1.8).map(|n| n.id.as_str()),
			Some("near-right")
		);
		assert!(find_node_at(&nodes, 0.0, 0.0, 1.8).is_none());
		assert!(find_node_at(&[], 0.0, 0.0, 1.8).is_none());
		// exactly on the hit radius does not count
		assert!(find_node_at(&nodes, -118.0, 0.0, 1.8).is_none());
	}

	#[test]
	fn short_press_clicks_at_release_position() {
		let mut input = InputController::default();
		let mut cam = camera();
		let nodes = nodes();
		input.pointer_down(298.0, 300.0);
		assert_eq!(input.pointer_move(301.0, 301.0, &mut cam, &nodes), None);
		assert_eq!(cam.camera().x, 0.0);
		let event = input.pointer_up(300.0, 300.0, &cam, &nodes);
		assert_eq!(clicked_id(event), Some(Some("left".to_string())));
	}

	#[test]
	fn click_on_empty_space_reports_none() {
		let mut input = InputController::default();
		let cam = camera();
		input.pointer_down(400.0, 300.0);
		let event = input.pointer_up(401.0, 300.0, &cam, &nodes());
		assert_eq!(clicked_id(event), Some(None));
	}

	#[test]
	fn drag_pans_and_never_clicks() {
		let mut input = InputController::default();
		let mut cam = camera();
		let nodes = nodes();
		input.pointer_down(300.0, 300.0);
		input.pointer_move(320.0, 310.0, &mut cam, &nodes);
		assert!(input.is_dragging());
		assert_eq!((cam.camera().x, cam.camera().y), (20.0, 10.0));
		input.pointer_move(330.0, 310.0, &mut cam, &nodes);
		assert_eq!((cam.camera().x, cam.camera().y), (30.0, 10.0));
		// back over the start point: still a drag
		input.pointer_move(300.0, 300.0, &mut cam, &nodes);
		assert_eq!(input.pointer_up(300.0, 300.0, &cam, &nodes), None);
		assert!(!input.is_dragging());
	}

	#[test]
	fn release_far_from_press_is_not_a_click() {
		let mut input = InputController::default();
		let cam = camera();
		input.pointer_down(300.0, 300.0);
		assert_eq!(input.pointer_up(340.0, 300.0, &cam, &nodes()), None);
	}

	#[test]
	fn hover_reports_enter_and_single_leave() {
		let mut input = InputController::default();
		let mut cam = camera();
		let nodes = nodes();
		match input.pointer_move(300.0, 300.0, &mut cam, &nodes) {
			Some(GraphEvent::Hover(Some(info))) => {
				assert_eq!(info.node.id, "left");
				assert_eq!((info.screen_x, info.screen_y), (300.0, 300.0));
			}
			other => panic!("expected hover, got {other:?}"),
		}
		assert_eq!(
			input.pointer_move(400.0, 300.0, &mut cam, &nodes),
			Some(GraphEvent::Hover(None))
		);
		assert_eq!(input.pointer_move(401.0, 300.0, &mut cam, &nodes), None);
	}

	#[test]
	fn hover_follows_the_camera() {
		let mut input = InputController::default();
		let mut cam = camera();
		cam.zoom_at(400.0, 300.0, 2.0);
		let nodes = nodes();
		// world -100 now sits 200px left of center
		match input.pointer_move(200.0, 300.0, &mut cam, &nodes) {
			Some(GraphEvent::Hover(Some(info))) => assert_eq!(info.node.id, "left"),
			other => panic!("expected hover, got {other:?}"),
		}
	}

	#[test]
	fn pointer_leave_cancels_press_and_hover() {
		let mut input = InputController::default();
		let mut cam = camera();
		let nodes = nodes();
		input.pointer_move(300.0, 300.0, &mut cam, &nodes);
		input.pointer_down(300.0, 300.0);
		assert_eq!(input.pointer_leave(), Some(GraphEvent::Hover(None)));
		assert_eq!(input.pointer_up(300.0, 300.0, &cam, &nodes), None);
	}

	#[test]
	fn wheel_zooms_around_cursor() {
		let mut input = InputController::default();
		let mut cam = camera();
		let before = cam.screen_to_world(120.0, 90.0);
		input.wheel(120.0, 90.0, -100.0, &mut cam);
		assert!((cam.camera().scale - 1.1).abs() < 1e-12);
		input.wheel(120.0, 90.0, 100.0, &mut cam);
		assert!((cam.camera().scale - 0.99).abs() < 1e-12);
		let after = cam.screen_to_world(120.0, 90.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn pinch_scales_by_finger_distance_ratio() {
		let mut input = InputController::default();
		let mut cam = camera();
		input.touch_start(&[(100.0, 100.0), (200.0, 100.0)]);
		input.touch_move(&[(100.0, 100.0), (250.0, 100.0)], &mut cam);
		assert!((cam.camera().scale - 1.5).abs() < 1e-12);
		input.touch_move(&[(100.0, 100.0), (175.0, 100.0)], &mut cam);
		assert!((cam.camera().scale - 0.75).abs() < 1e-12);
		assert_eq!((cam.camera().x, cam.camera().y), (0.0, 0.0));
		assert_eq!(input.touch_end(&[(175.0, 100.0)], &cam, &nodes()), None);
	}

	#[test]
	fn touch_uses_the_wider_threshold() {
		let mut input = InputController::default();
		let mut cam = camera();
		let nodes = nodes();
		input.touch_start(&[(300.0, 300.0)]);
		input.touch_move(&[(308.0, 300.0)], &mut cam);
		assert_eq!(cam.camera().x, 0.0);
		let event = input.touch_end(&[(308.0, 300.0)], &cam, &nodes);
		assert_eq!(clicked_id(event), Some(Some("left".to_string())));

		input.touch_start(&[(300.0, 300.0)]);
		input.touch_move(&[(330.0, 300.0)], &mut cam);
		assert_eq!(cam.camera().x, 30.0);
		assert_eq!(input.touch_end(&[(330.0, 300.0)], &cam, &nodes), None);
	}

	proptest! {
		#[test]
		fn click_iff_within_threshold(dx in -20.0..20.0f64, dy in -20.0..20.0f64) {
			let mut input = InputController::default();
			let cam = camera();
			input.pointer_down(400.0, 300.0);
			let event = input.pointer_up(400.0 + dx, 300.0 + dy, &cam, &[]);
			let moved = dx.hypot(dy);
			if moved < 5.0 {
				prop_assert_eq!(event, Some(GraphEvent::Click(None)));
			} else if moved > 5.0 {
				prop_assert_eq!(event, None);
			}
		}

		#[test]
		fn hit_test_matches_brute_force_nearest(
			placed in prop::collection::vec((-50.0..50.0f64, -50.0..50.0f64, 1.0..12.0f64), 0..12),
			wx in -60.0..60.0f64,
			wy in -60.0..60.0f64,
		) {
			let nodes: Vec<Node> = placed
				.iter()
				.enumerate()
				.map(|(i, &(x, y, r))| Node::new(i.to_string()).at(x, y).with_radius(r))
				.collect();
			let dist = |n: &Node| (n.x - wx).hypot(n.y - wy);
			let nearest = nodes
				.iter()
				.filter(|n| dist(n) < n.radius * 1.8)
				.map(dist)
				.fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.min(d))));
			let hit = find_node_at(&nodes, wx, wy, 1.8);
			prop_assert_eq!(hit.map(dist), nearest);
			if let Some(node) = hit {
				prop_assert!(dist(node) < node.radius * 1.8);
			}
		}
	}
}
