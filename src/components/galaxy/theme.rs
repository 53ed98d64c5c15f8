//! Visual theming for the galaxy view.
//!
//! Colors, glow multipliers and layer constants used by the transform and the
//! renderer.

use serde::Deserialize;

/// Glow color for fully solved topics and solved problems.
pub const COMPLETE_COLOR: &str = "#00ffa3";

/// Line color for problem similarity edges.
pub const SIMILARITY_EDGE_COLOR: &str = "#ffffff";

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque color from channels.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Translucent color from channels.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with a different alpha, clamped to `0.0..=1.0`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self {
			a: a.clamp(0.0, 1.0),
			..self
		}
	}

	/// Parses `#RRGGBB` or `#RGB`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let digits = hex.strip_prefix('#')?;
		if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
			return None;
		}
		let channel = |s: &str| u8::from_str_radix(s, 16).ok();
		match digits.len() {
			6 => Some(Self::rgb(
				channel(&digits[0..2])?,
				channel(&digits[2..4])?,
				channel(&digits[4..6])?,
			)),
			3 => {
				let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
				Some(Self::rgb(short(0)?, short(1)?, short(2)?))
			}
			_ => None,
		}
	}

	/// Parses a hex color, falling back to neutral gray for anything unreadable.
	pub fn parse_or_gray(hex: &str) -> Self {
		Self::from_hex(hex).unwrap_or(Self::rgb(128, 128, 128))
	}

	/// CSS `rgba()` string.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// CSS hex string, ignoring alpha.
	pub fn to_css_rgb(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

impl TryFrom<String> for Color {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::from_hex(&value).ok_or_else(|| format!("invalid hex color: {value}"))
	}
}

/// Tier colors used when the topic payload does not define one.
#[derive(Clone, Debug)]
pub struct TierPalette {
	/// Colors indexed by tier, wrapping.
	pub colors: Vec<Color>,
}

impl TierPalette {
	/// Cool-to-warm progression, entry tiers first.
	pub fn nebula() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(130, 120, 150), // Wisteria
				Color::rgb(180, 136, 100), // Tan
				Color::rgb(180, 120, 100), // Terracotta
			],
		}
	}

	/// Color for a tier index.
	pub fn get(&self, tier: u32) -> Color {
		self.colors[tier as usize % self.colors.len()]
	}
}

impl Default for TierPalette {
	fn default() -> Self {
		Self::nebula()
	}
}

/// One concentric haze circle drawn at each tier centroid.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct NebulaRing {
	/// Radius in world units.
	pub radius: f64,
	/// Fill alpha.
	pub alpha: f64,
}

/// One concentric glow circle drawn around each node.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct GlowLayer {
	/// Multiplier applied to the node radius.
	pub radius_mult: f64,
	/// Multiplier applied to the node's glow intensity.
	pub alpha_mult: f64,
}

/// Complete visual theme for the galaxy canvas.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GalaxyTheme {
	/// Canvas clear color.
	pub background: Color,
	/// Star color.
	pub star_color: Color,
	/// Number of stars in the static starfield.
	pub star_count: usize,
	/// Smallest star radius in pixels.
	pub star_radius_min: f64,
	/// Largest star radius in pixels.
	pub star_radius_max: f64,
	/// Dimmest star alpha.
	pub star_alpha_min: f64,
	/// Brightest star alpha.
	pub star_alpha_max: f64,
	/// Haze circles per tier, outermost first.
	pub nebula: Vec<NebulaRing>,
	/// Edge alpha never drops below this.
	pub edge_alpha_floor: f64,
	/// Edge alpha per unit of weight.
	pub edge_alpha_weight: f64,
	/// Edge line width in world units.
	pub edge_width: f64,
	/// Outer node glow.
	pub outer_glow: GlowLayer,
	/// Inner node glow.
	pub mid_glow: GlowLayer,
	/// Center highlight color.
	pub highlight: Color,
	/// Center highlight radius as a fraction of the node radius.
	pub highlight_radius: f64,
	/// Center highlight alpha before node opacity.
	pub highlight_alpha: f64,
	/// Fallback tier colors.
	#[serde(skip)]
	pub palette: TierPalette,
}

impl Default for GalaxyTheme {
	fn default() -> Self {
		Self {
			background: Color::rgb(10, 10, 15),
			star_color: Color::rgb(255, 255, 255),
			star_count: 300,
			star_radius_min: 0.5,
			star_radius_max: 1.7,
			star_alpha_min: 0.08,
			star_alpha_max: 0.43,
			nebula: vec![
				NebulaRing {
					radius: 180.0,
					alpha: 0.025,
				},
				NebulaRing {
					radius: 100.0,
					alpha: 0.015,
				},
			],
			edge_alpha_floor: 0.04,
			edge_alpha_weight: 0.2,
			edge_width: 1.0,
			outer_glow: GlowLayer {
				radius_mult: 2.5,
				alpha_mult: 0.12,
			},
			mid_glow: GlowLayer {
				radius_mult: 1.6,
				alpha_mult: 0.2,
			},
			highlight: Color::rgb(255, 255, 255),
			highlight_radius: 0.35,
			highlight_alpha: 0.5,
			palette: TierPalette::nebula(),
		}
	}
}

impl GalaxyTheme {
	/// Alpha of an edge line for a given weight.
	pub fn edge_alpha(&self, weight: f64) -> f64 {
		(weight * self.edge_alpha_weight).max(self.edge_alpha_floor)
	}
}
