//! Layered draw pipeline for the galaxy view.
//!
//! Each frame is four passes, every pass one batched call on the [`Surface`]:
//! 1. Background and starfield (screen space, ignores the camera)
//! 2. Per-tier nebula haze around each tier's centroid
//! 3. Edge lines
//! 4. Node glows, cores and highlights, in array order
//!
//! World coordinates are projected to screen space here, so a surface only ever
//! sees pixels.

use std::collections::{BTreeMap, HashMap};

use super::camera::CameraController;
use super::starfield::Starfield;
use super::theme::{Color, GalaxyTheme};
use super::types::{Edge, Node};

/// Filled circle in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub color: Color,
}

/// Stroked line in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub width: f64,
	pub color: Color,
}

/// Something the renderer can draw on.
pub trait Surface {
	/// Fill the whole surface with a solid color.
	fn clear(&mut self, width: f64, height: f64, color: Color);
	/// Fill every circle, in order.
	fn fill_circles(&mut self, circles: &[Circle]);
	/// Stroke every line, in order.
	fn stroke_lines(&mut self, lines: &[Line]);
}

/// Draws node/edge snapshots through a camera onto a [`Surface`].
pub struct Renderer {
	theme: GalaxyTheme,
	starfield: Starfield,
}

impl Renderer {
	pub fn new(theme: GalaxyTheme, width: f64, height: f64, seed: u64) -> Self {
		let starfield = Starfield::new(&theme, width, height, seed);
		Self { theme, starfield }
	}

	pub fn theme(&self) -> &GalaxyTheme {
		&self.theme
	}

	/// Track a viewport change; the starfield is regenerated when the size differs.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.starfield.resize(&self.theme, width, height);
	}

	/// Draw one frame.
	pub fn render(
		&self,
		surface: &mut impl Surface,
		nodes: &[Node],
		edges: &[Edge],
		camera: &CameraController,
	) {
		let (width, height) = camera.viewport();
		surface.clear(width, height, self.theme.background);
		surface.fill_circles(&self.stars());
		surface.fill_circles(&self.nebulae(nodes, camera));
		surface.stroke_lines(&self.edge_lines(nodes, edges, camera));
		surface.fill_circles(&self.node_circles(nodes, camera));
	}

	fn stars(&self) -> Vec<Circle> {
		self.starfield
			.stars
			.iter()
			.map(|s| Circle {
				x: s.x,
				y: s.y,
				radius: s.radius,
				color: self.theme.star_color.with_alpha(s.alpha),
			})
			.collect()
	}

	fn nebulae(&self, nodes: &[Node], camera: &CameraController) -> Vec<Circle> {
		// tier -> (sum x, sum y, count, color of the first node seen)
		let mut tiers: BTreeMap<u32, (f64, f64, usize, &str)> = BTreeMap::new();
		for node in nodes {
			let entry = tiers.entry(node.tier).or_insert((0.0, 0.0, 0, node.color.as_str()));
			entry.0 += node.x;
			entry.1 += node.y;
			entry.2 += 1;
		}

		let scale = camera.camera().scale;
		tiers
			.values()
			.flat_map(|&(sx, sy, count, color)| {
				let n = count as f64;
				let (x, y) = camera.world_to_screen(sx / n, sy / n);
				let color = Color::parse_or_gray(color);
				self.theme.nebula.iter().map(move |ring| Circle {
					x,
					y,
					radius: ring.radius * scale,
					color: color.with_alpha(ring.alpha),
				})
			})
			.collect()
	}

	fn edge_lines(&self, nodes: &[Node], edges: &[Edge], camera: &CameraController) -> Vec<Line> {
		let by_id: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
		let width = self.theme.edge_width * camera.camera().scale;
		edges
			.iter()
			.filter_map(|edge| {
				let source = by_id.get(edge.source.as_str())?;
				let target = by_id.get(edge.target.as_str())?;
				let (x1, y1) = camera.world_to_screen(source.x, source.y);
				let (x2, y2) = camera.world_to_screen(target.x, target.y);
				Some(Line {
					x1,
					y1,
					x2,
					y2,
					width,
					color: Color::parse_or_gray(&edge.color).with_alpha(self.theme.edge_alpha(edge.weight)),
				})
			})
			.collect()
	}

	fn node_circles(&self, nodes: &[Node], camera: &CameraController) -> Vec<Circle> {
		let scale = camera.camera().scale;
		let theme = &self.theme;
		let mut circles = Vec::with_capacity(nodes.len() * 4);
		for node in nodes {
			let (x, y) = camera.world_to_screen(node.x, node.y);
			let radius = node.radius * scale;
			let glow = Color::parse_or_gray(&node.glow_color);
			let glow_alpha = node.glow_intensity * node.opacity;
			circles.extend([
				Circle {
					x,
					y,
					radius: radius * theme.outer_glow.radius_mult,
					color: glow.with_alpha(glow_alpha * theme.outer_glow.alpha_mult),
				},
				Circle {
					x,
					y,
					radius: radius * theme.mid_glow.radius_mult,
					color: glow.with_alpha(glow_alpha * theme.mid_glow.alpha_mult),
				},
				Circle {
					x,
					y,
					radius,
					color: Color::parse_or_gray(&node.color).with_alpha(node.opacity),
				},
				Circle {
					x,
					y,
					radius: radius * theme.highlight_radius,
					color: theme
						.highlight
						.with_alpha(theme.highlight_alpha * node.opacity),
				},
			]);
		}
		circles
	}
}

/// Surface that records every call, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
	pub calls: Vec<DrawCall>,
}

#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DrawCall {
	Clear(f64, f64, Color),
	Circles(Vec<Circle>),
	Lines(Vec<Line>),
}

#[cfg(test)]
impl Surface for RecordingSurface {
	fn clear(&mut self, width: f64, height: f64, color: Color) {
		self.calls.push(DrawCall::Clear(width, height, color));
	}

	fn fill_circles(&mut self, circles: &[Circle]) {
		self.calls.push(DrawCall::Circles(circles.to_vec()));
	}

	fn stroke_lines(&mut self, lines: &[Line]) {
		self.calls.push(DrawCall::Lines(lines.to_vec()));
	}
}
