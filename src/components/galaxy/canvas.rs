//! `CanvasRenderingContext2d` backend for the renderer, plus the claim that
//! keeps one mount at a time drawing on a given canvas.

use std::cell::Cell;
use std::f64::consts::TAU;

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::error::GalaxyError;
use super::render::{Circle, Line, Surface};
use super::theme::Color;

const CLAIM_ATTR: &str = "data-galaxy-claim";

thread_local! {
	static NEXT_CLAIM: Cell<u64> = const { Cell::new(1) };
}

/// A mount's stake on a canvas element.
///
/// Claiming stamps the canvas with a fresh id. A later claim overwrites it, so
/// an older mount that has not yet acquired its context can see it lost the race.
pub struct SurfaceClaim {
	canvas: HtmlCanvasElement,
	id: String,
}

impl SurfaceClaim {
	pub fn claim(canvas: HtmlCanvasElement) -> Self {
		let id = NEXT_CLAIM.with(|next| {
			let id = next.get();
			next.set(id + 1);
			id.to_string()
		});
		let _ = canvas.set_attribute(CLAIM_ATTR, &id);
		Self { canvas, id }
	}

	/// Whether no later mount has claimed the canvas.
	pub fn is_current(&self) -> bool {
		self.canvas.get_attribute(CLAIM_ATTR).as_deref() == Some(self.id.as_str())
	}

	/// Give the canvas up. Safe to call more than once, and a no-op once a
	/// later mount owns it.
	pub fn release(&self) {
		if self.is_current() {
			let _ = self.canvas.remove_attribute(CLAIM_ATTR);
		}
	}

	pub fn canvas(&self) -> &HtmlCanvasElement {
		&self.canvas
	}
}

/// Renderer surface over a 2D canvas context.
pub struct CanvasSurface {
	ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
	/// Fetch the 2D context for a claimed canvas.
	pub fn acquire(claim: &SurfaceClaim) -> Result<Self, GalaxyError> {
		if !claim.is_current() {
			return Err(GalaxyError::SurfaceSuperseded);
		}
		let ctx = claim
			.canvas()
			.get_context("2d")?
			.ok_or(GalaxyError::SurfaceUnavailable)?
			.dyn_into::<CanvasRenderingContext2d>()
			.map_err(|_| GalaxyError::SurfaceUnavailable)?;
		Ok(Self { ctx })
	}

	/// Like [`Self::acquire`], logging instead of failing.
	pub fn try_acquire(claim: &SurfaceClaim) -> Option<Self> {
		match Self::acquire(claim) {
			Ok(surface) => Some(surface),
			Err(e) => {
				warn!("galaxy: no rendering surface: {e}");
				None
			}
		}
	}
}

impl Surface for CanvasSurface {
	fn clear(&mut self, width: f64, height: f64, color: Color) {
		self.ctx.set_global_alpha(1.0);
		self.ctx.set_fill_style_str(&color.to_css());
		self.ctx.fill_rect(0.0, 0.0, width, height);
	}

	fn fill_circles(&mut self, circles: &[Circle]) {
		for c in circles {
			if c.radius <= 0.0 || c.color.a <= 0.0 {
				continue;
			}
			self.ctx.set_fill_style_str(&c.color.to_css());
			self.ctx.begin_path();
			let _ = self.ctx.arc(c.x, c.y, c.radius, 0.0, TAU);
			self.ctx.fill();
		}
	}

	fn stroke_lines(&mut self, lines: &[Line]) {
		for l in lines {
			self.ctx.set_stroke_style_str(&l.color.to_css());
			self.ctx.set_line_width(l.width);
			self.ctx.begin_path();
			self.ctx.move_to(l.x1, l.y1);
			self.ctx.line_to(l.x2, l.y2);
			self.ctx.stroke();
		}
	}
}
