//! Errors surfaced by the galaxy view.
//!
//! Only host-level failures are errors. Dangling edges, diverged positions and
//! empty graphs are repaired in place and never reach this type.

use thiserror::Error;

/// Failure talking to the host page.
#[derive(Debug, Error)]
pub enum GalaxyError {
	/// A required DOM element was not found.
	#[error("missing element: {0}")]
	MissingElement(String),

	/// The embedded payload was not valid JSON for any view.
	#[error("failed to parse galaxy payload: {0}")]
	Parse(#[from] serde_json::Error),

	/// The canvas refused to hand out a 2D context.
	#[error("2d rendering context unavailable")]
	SurfaceUnavailable,

	/// A later mount claimed the canvas before this one acquired it.
	#[error("canvas claimed by a newer mount")]
	SurfaceSuperseded,

	/// Any other exception thrown by a host call.
	#[error("javascript error: {0}")]
	Js(String),
}

impl From<wasm_bindgen::JsValue> for GalaxyError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}
