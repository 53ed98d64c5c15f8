//! Static background stars.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::theme::GalaxyTheme;

/// A single background star in screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct Star {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub alpha: f64,
}

/// Seeded star layer, regenerated whenever the viewport size changes.
pub struct Starfield {
	pub stars: Vec<Star>,
	width: f64,
	height: f64,
	seed: u64,
}

impl Starfield {
	pub fn new(theme: &GalaxyTheme, width: f64, height: f64, seed: u64) -> Self {
		Self {
			stars: Self::generate(theme, width, height, seed),
			width,
			height,
			seed,
		}
	}

	fn generate(theme: &GalaxyTheme, width: f64, height: f64, seed: u64) -> Vec<Star> {
		if !(width > 0.0 && height > 0.0) {
			return Vec::new();
		}
		let mut rng = StdRng::seed_from_u64(seed);
		let radius = theme.star_radius_min..=theme.star_radius_max.max(theme.star_radius_min);
		let alpha = theme.star_alpha_min..=theme.star_alpha_max.max(theme.star_alpha_min);
		(0..theme.star_count)
			.map(|_| Star {
				x: rng.gen_range(0.0..width),
				y: rng.gen_range(0.0..height),
				radius: rng.gen_range(radius.clone()),
				alpha: rng.gen_range(alpha.clone()),
			})
			.collect()
	}

	/// Regenerate for a new viewport. Returns `false` when the size is unchanged.
	pub fn resize(&mut self, theme: &GalaxyTheme, width: f64, height: f64) -> bool {
		if width == self.width && height == self.height {
			return false;
		}
		self.width = width;
		self.height = height;
		self.stars = Self::generate(theme, width, height, self.seed);
		true
	}
}
