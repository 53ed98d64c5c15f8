//! Camera transform for the galaxy canvas.
//!
//! The world origin sits at the viewport center shifted by the camera offset:
//!
//! ```text
//! screen = viewport_center + offset + world * scale
//! world  = (screen - viewport_center - offset) / scale
//! ```
//!
//! The offset is in screen pixels and is never scaled by pan. `scale` stays
//! inside `[min_zoom, max_zoom]` after every operation.

use log::debug;
use serde::Deserialize;

use super::types::Node;

/// Default lower zoom bound.
pub const MIN_ZOOM: f64 = 0.15;
/// Default upper zoom bound.
pub const MAX_ZOOM: f64 = 5.0;

/// Pan offset and zoom factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
	/// Horizontal offset in screen pixels, relative to the viewport center.
	pub x: f64,
	/// Vertical offset in screen pixels, relative to the viewport center.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub scale: f64,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			scale: 1.0,
		}
	}
}

/// Zoom limits and step sizes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
	/// Smallest allowed scale.
	pub min_zoom: f64,
	/// Largest allowed scale.
	pub max_zoom: f64,
	/// Fraction of the viewport the graph fills after [`CameraController::fit_all`].
	pub fit_padding: f64,
	/// Factor applied by [`CameraController::zoom_in`]; zoom out uses its inverse.
	pub zoom_step: f64,
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			min_zoom: MIN_ZOOM,
			max_zoom: MAX_ZOOM,
			fit_padding: 0.85,
			zoom_step: 1.3,
		}
	}
}

/// Owns the camera for one visualization and applies every view operation.
#[derive(Clone, Debug)]
pub struct CameraController {
	camera: Camera,
	config: CameraConfig,
	width: f64,
	height: f64,
}

impl CameraController {
	/// A camera at the origin with scale 1 for a `width` x `height` viewport.
	pub fn new(width: f64, height: f64, config: CameraConfig) -> Self {
		let mut controller = Self {
			camera: Camera::default(),
			config,
			width,
			height,
		};
		controller.camera.scale = controller.clamp_scale(1.0);
		controller
	}

	/// Current camera state.
	pub fn camera(&self) -> Camera {
		self.camera
	}

	/// Viewport size in pixels.
	pub fn viewport(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Update the viewport size. Offset and scale are kept.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Screen position of the world origin.
	pub fn origin(&self) -> (f64, f64) {
		(
			self.width / 2.0 + self.camera.x,
			self.height / 2.0 + self.camera.y,
		)
	}

	/// Project a world point to screen pixels.
	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		let (ox, oy) = self.origin();
		(ox + wx * self.camera.scale, oy + wy * self.camera.scale)
	}

	/// Inverse of [`Self::world_to_screen`].
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		let (ox, oy) = self.origin();
		((sx - ox) / self.camera.scale, (sy - oy) / self.camera.scale)
	}

	/// Shift the view by a screen-space delta.
	pub fn pan(&mut self, dx: f64, dy: f64) {
		if !(dx.is_finite() && dy.is_finite()) {
			return;
		}
		self.camera.x += dx;
		self.camera.y += dy;
	}

	/// Multiply the scale by `factor` while keeping the world point under the
	/// cursor fixed on screen.
	pub fn zoom_at(&mut self, cursor_x: f64, cursor_y: f64, factor: f64) {
		if !(factor.is_finite() && factor > 0.0) {
			return;
		}
		let new_scale = self.clamp_scale(self.camera.scale * factor);
		let ratio = new_scale / self.camera.scale;
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		self.camera.x = cursor_x - cx - (cursor_x - cx - self.camera.x) * ratio;
		self.camera.y = cursor_y - cy - (cursor_y - cy - self.camera.y) * ratio;
		self.camera.scale = new_scale;
	}

	/// Multiply the scale without moving the offset. Used by pinch zoom.
	pub fn zoom_by(&mut self, factor: f64) {
		if !(factor.is_finite() && factor > 0.0) {
			return;
		}
		self.camera.scale = self.clamp_scale(self.camera.scale * factor);
	}

	/// Zoom in one step around the viewport center.
	pub fn zoom_in(&mut self) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, self.config.zoom_step);
	}

	/// Zoom out one step around the viewport center.
	pub fn zoom_out(&mut self) {
		self.zoom_at(
			self.width / 2.0,
			self.height / 2.0,
			1.0 / self.config.zoom_step,
		);
	}

	/// Frame every node (including its radius) in the viewport. Returns `false`
	/// and leaves the camera alone when there is nothing to frame.
	pub fn fit_all(&mut self, nodes: &[Node]) -> bool {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		for n in nodes {
			if !(n.x.is_finite() && n.y.is_finite()) {
				continue;
			}
			let (x0, x1, y0, y1) = (n.x - n.radius, n.x + n.radius, n.y - n.radius, n.y + n.radius);
			bounds = Some(match bounds {
				None => (x0, x1, y0, y1),
				Some((min_x, max_x, min_y, max_y)) => {
					(min_x.min(x0), max_x.max(x1), min_y.min(y0), max_y.max(y1))
				}
			});
		}
		let Some((min_x, max_x, min_y, max_y)) = bounds else {
			return false;
		};

		let graph_w = if max_x > min_x { max_x - min_x } else { 1.0 };
		let graph_h = if max_y > min_y { max_y - min_y } else { 1.0 };
		let padding = self.config.fit_padding;
		let scale = (self.width * padding / graph_w)
			.min(self.height * padding / graph_h)
			.min(self.config.max_zoom);
		let scale = self.clamp_scale(scale);
		let (center_x, center_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

		self.camera = Camera {
			x: -center_x * scale,
			y: -center_y * scale,
			scale,
		};
		debug!("galaxy: fit {} nodes at scale {:.3}", nodes.len(), scale);
		true
	}

	fn clamp_scale(&self, scale: f64) -> f64 {
		if scale.is_nan() {
			return self.camera.scale;
		}
		scale.clamp(self.config.min_zoom, self.config.max_zoom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn controller() -> CameraController {
		CameraController::new(800.0, 600.0, CameraConfig::default())
	}

	#[test]
	fn pan_round_trip_restores_offset() {
		let mut cam = controller();
		cam.pan(37.0, -12.5);
		let before = cam.camera();
		cam.pan(10.0, 10.0);
		cam.pan(-10.0, -10.0);
		assert_eq!(cam.camera(), before);
	}

	#[test]
	fn zoom_in_then_out_restores_scale() {
		let mut cam = controller();
		cam.zoom_at(120.0, 80.0, 1.3);
		cam.zoom_at(120.0, 80.0, 1.0 / 1.3);
		assert!((cam.camera().scale - 1.0).abs() < 1e-12);

		cam.zoom_in();
		cam.zoom_out();
		assert!((cam.camera().scale - 1.0).abs() < 1e-12);
	}

	#[test]
	fn origin_maps_to_viewport_center() {
		let cam = controller();
		assert_eq!(cam.world_to_screen(0.0, 0.0), (400.0, 300.0));
		assert_eq!(cam.screen_to_world(400.0, 300.0), (0.0, 0.0));
	}

	#[test]
	fn fit_all_on_empty_is_noop() {
		let mut cam = controller();
		cam.pan(5.0, 5.0);
		let before = cam.camera();
		assert!(!cam.fit_all(&[]));
		assert_eq!(cam.camera(), before);
	}

	#[test]
	fn fit_all_frames_bounding_box() {
		let mut cam = controller();
		let nodes = vec![
			Node::new("a").at(100.0, 50.0).with_radius(10.0),
			Node::new("b").at(500.0, 250.0).with_radius(10.0),
		];
		assert!(cam.fit_all(&nodes));
		let scale = cam.camera().scale;
		// bbox is 420 x 220: width is the binding axis
		assert!((scale - 800.0 * 0.85 / 420.0).abs() < 1e-12);
		let (sx, sy) = cam.world_to_screen(300.0, 150.0);
		assert!((sx - 400.0).abs() < 1e-9 && (sy - 300.0).abs() < 1e-9);
	}

	#[test]
	fn fit_all_caps_at_max_zoom() {
		let mut cam = controller();
		assert!(cam.fit_all(&[Node::new("solo").at(3.0, 4.0).with_radius(1.0)]));
		assert_eq!(cam.camera().scale, MAX_ZOOM);
	}

	#[test]
	fn fit_all_respects_min_zoom() {
		let mut cam = controller();
		let nodes = vec![
			Node::new("a").at(-100_000.0, 0.0),
			Node::new("b").at(100_000.0, 0.0),
		];
		cam.fit_all(&nodes);
		assert_eq!(cam.camera().scale, MIN_ZOOM);
	}

	#[test]
	fn invalid_zoom_factors_are_ignored() {
		let mut cam = controller();
		cam.zoom_at(10.0, 10.0, f64::NAN);
		cam.zoom_at(10.0, 10.0, 0.0);
		cam.zoom_by(-2.0);
		assert_eq!(cam.camera(), Camera::default());
	}

	#[test]
	fn resize_keeps_camera() {
		let mut cam = controller();
		cam.pan(3.0, 4.0);
		cam.zoom_by(2.0);
		let before = cam.camera();
		cam.resize(1024.0, 768.0);
		assert_eq!(cam.camera(), before);
		assert_eq!(cam.viewport(), (1024.0, 768.0));
	}

	#[derive(Clone, Debug)]
	enum Op {
		Pan(f64, f64),
		Zoom(f64, f64, f64),
		Pinch(f64),
		In,
		Out,
		Fit(f64, f64),
	}

	fn op() -> impl Strategy<Value = Op> {
		prop_oneof![
			(-500.0..500.0, -500.0..500.0).prop_map(|(x, y)| Op::Pan(x, y)),
			(0.0..800.0, 0.0..600.0, 0.01..20.0).prop_map(|(x, y, f)| Op::Zoom(x, y, f)),
			(0.01..20.0).prop_map(Op::Pinch),
			Just(Op::In),
			Just(Op::Out),
			(1.0..5000.0, 1.0..5000.0).prop_map(|(w, h)| Op::Fit(w, h)),
		]
	}

	proptest! {
		#[test]
		fn zoom_keeps_cursor_anchored(
			cx in 0.0..800.0f64,
			cy in 0.0..600.0f64,
			factor in 0.05..20.0f64,
			pan_x in -300.0..300.0f64,
			pan_y in -300.0..300.0f64,
			start in 0.2..4.0f64,
		) {
			let mut cam = controller();
			cam.pan(pan_x, pan_y);
			cam.zoom_by(start);
			let before = cam.screen_to_world(cx, cy);
			cam.zoom_at(cx, cy, factor);
			let after = cam.screen_to_world(cx, cy);
			prop_assert!((before.0 - after.0).abs() < 1e-6);
			prop_assert!((before.1 - after.1).abs() < 1e-6);
		}

		#[test]
		fn scale_stays_in_bounds(ops in proptest::collection::vec(op(), 1..40)) {
			let mut cam = controller();
			for op in ops {
				match op {
					Op::Pan(x, y) => cam.pan(x, y),
					Op::Zoom(x, y, f) => cam.zoom_at(x, y, f),
					Op::Pinch(f) => cam.zoom_by(f),
					Op::In => cam.zoom_in(),
					Op::Out => cam.zoom_out(),
					Op::Fit(w, h) => {
						cam.fit_all(&[Node::new("a").at(-w / 2.0, 1.0), Node::new("b").at(w / 2.0, h)]);
					}
				}
				let scale = cam.camera().scale;
				prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&scale));
			}
		}
	}
}
