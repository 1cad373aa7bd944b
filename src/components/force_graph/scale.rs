//! Zoom-dependent scaling configuration for graph visuals.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: the coordinate system of the layout. Values in
//!   world-space scale with zoom (appear larger when zoomed in).
//! - **Screen-space**: CSS pixels on the canvas. Values in screen-space stay
//!   constant regardless of zoom level.
//!
//! Node radii and the hit margin live in world-space so that hit-testing and
//! drawing agree at every zoom level. Line widths and the selection ring are
//! screen-constant; the label font is world-space but clamped so text stays
//! readable.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
#[allow(
	dead_code,
	reason = "World completes the set for callers customizing label scaling"
)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped {
		/// Smallest on-screen size in pixels.
		min_screen: f64,
		/// Largest on-screen size in pixels.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// Compute the world-space value for a given base value and zoom level.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Node sizing. Radius is `base_radius + score * radius_gain`.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Radius of a node with score 0.
	pub base_radius: f64,
	/// Added radius at score 1.
	pub radius_gain: f64,
	/// Extra hit-test tolerance in world units.
	pub hit_margin: f64,
	/// Label font size in world units.
	pub label_size: f64,
	/// How the label font follows zoom.
	pub label_behavior: ScaleBehavior,
	/// Gap between the node and its label, in world units.
	pub label_offset: f64,
}

impl NodeScaleConfig {
	/// World-space radius for a relevance score; the score is clamped to [0, 1].
	pub fn radius_for(&self, score: f64) -> f64 {
		let score = if score.is_finite() {
			score.clamp(0.0, 1.0)
		} else {
			0.0
		};
		(self.base_radius + score * self.radius_gain).max(0.0)
	}
}

/// Edge sizing. Width and opacity interpolate over the edge weight.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Line width in screen pixels for the weakest edge.
	pub min_width: f64,
	/// Line width in screen pixels for the strongest edge.
	pub max_width: f64,
	/// Stroke opacity for the weakest edge.
	pub min_alpha: f64,
	/// Stroke opacity for the strongest edge.
	pub max_alpha: f64,
}

/// Halo and outline sizing for selected/hovered nodes.
#[derive(Clone, Debug)]
pub struct GlowScaleConfig {
	/// Halo radius as a multiple of the node radius.
	pub halo_radius: f64,
	/// Outline stroke width in screen pixels.
	pub ring_width: f64,
	/// Outline offset from the node edge in screen pixels.
	pub ring_offset: f64,
}

/// Zoom bounds and step sizes.
#[derive(Clone, Debug)]
pub struct ZoomConfig {
	/// Smallest zoom factor.
	pub min: f64,
	/// Largest zoom factor.
	pub max: f64,
	/// Additive step for the zoom buttons.
	pub step: f64,
	/// Multiplicative factor per wheel notch.
	pub wheel_factor: f64,
}

impl ZoomConfig {
	/// Clamp a zoom value into range. The result is always strictly positive.
	pub fn clamp(&self, k: f64) -> f64 {
		let min = if self.min > 0.0 { self.min } else { 0.01 };
		let max = self.max.max(min);
		if k.is_nan() { 1.0_f64.clamp(min, max) } else { k.clamp(min, max) }
	}
}

impl Default for ZoomConfig {
	fn default() -> Self {
		Self {
			min: 0.5,
			max: 2.0,
			step: 0.2,
			wheel_factor: 1.1,
		}
	}
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Node radius, hit margin and labels.
	pub node: NodeScaleConfig,
	/// Edge width and opacity.
	pub edge: EdgeScaleConfig,
	/// Halo and outline sizes.
	pub glow: GlowScaleConfig,
	/// Zoom bounds and steps.
	pub zoom: ZoomConfig,
	/// Backing-store pixels per CSS pixel.
	pub pixel_ratio: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				base_radius: 6.0,
				radius_gain: 8.0,
				hit_margin: 5.0,
				label_size: 9.0,
				label_behavior: ScaleBehavior::Clamped {
					min_screen: 7.0,
					max_screen: 14.0,
				},
				label_offset: 3.0,
			},
			edge: EdgeScaleConfig {
				min_width: 0.5,
				max_width: 1.5,
				min_alpha: 0.08,
				max_alpha: 0.3,
			},
			glow: GlowScaleConfig {
				halo_radius: 2.5,
				ring_width: 2.0,
				ring_offset: 1.0,
			},
			zoom: ZoomConfig::default(),
			pixel_ratio: 2.0,
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
/// All sizes are in world-space (ready to use after the canvas transform).
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom factor these values were computed for.
	pub k: f64,
	/// CSS font shorthand for labels.
	pub label_font: String,
	/// Label font size in world units.
	pub label_size: f64,
	/// Width of the weakest edge.
	pub edge_min_width: f64,
	/// Width of the strongest edge.
	pub edge_max_width: f64,
	/// Selection outline stroke width.
	pub ring_width: f64,
	/// Gap between a node and its outline.
	pub ring_offset: f64,
}

impl ScaledValues {
	/// Compute sizes for zoom factor `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_size = config
			.node
			.label_behavior
			.apply(config.node.label_size, k);
		Self {
			k,
			label_font: format!("{}px sans-serif", label_size),
			label_size,
			edge_min_width: ScaleBehavior::Screen.apply(config.edge.min_width, k),
			edge_max_width: ScaleBehavior::Screen.apply(config.edge.max_width, k),
			ring_width: ScaleBehavior::Screen.apply(config.glow.ring_width, k),
			ring_offset: ScaleBehavior::Screen.apply(config.glow.ring_offset, k),
		}
	}

	/// World-space line width for an edge of the given weight.
	pub fn edge_width(&self, weight: f64) -> f64 {
		let w = weight.clamp(0.0, 1.0);
		self.edge_min_width + (self.edge_max_width - self.edge_min_width) * w
	}
}

/// Stroke opacity for an edge of the given weight.
pub fn edge_alpha(config: &EdgeScaleConfig, weight: f64) -> f64 {
	let w = weight.clamp(0.0, 1.0);
	config.min_alpha + (config.max_alpha - config.min_alpha) * w
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn radius_follows_score() {
		let node = ScaleConfig::default().node;
		assert_eq!(node.radius_for(0.0), 6.0);
		assert_eq!(node.radius_for(0.5), 10.0);
		assert_eq!(node.radius_for(1.0), 14.0);
	}

	#[test]
	fn radius_clamps_out_of_range_scores() {
		let node = ScaleConfig::default().node;
		assert_eq!(node.radius_for(-3.0), 6.0);
		assert_eq!(node.radius_for(7.0), 14.0);
		assert_eq!(node.radius_for(f64::NAN), 6.0);
		let negative = NodeScaleConfig {
			base_radius: -20.0,
			..node
		};
		assert_eq!(negative.radius_for(0.5), 0.0);
	}

	#[test]
	fn zoom_clamp_stays_positive() {
		let zoom = ZoomConfig::default();
		assert_eq!(zoom.clamp(10.0), 2.0);
		assert_eq!(zoom.clamp(0.0), 0.5);
		assert_eq!(zoom.clamp(f64::NAN), 1.0);
		let broken = ZoomConfig {
			min: -1.0,
			max: -2.0,
			..ZoomConfig::default()
		};
		assert!(broken.clamp(-5.0) > 0.0);
	}

	#[test]
	fn screen_values_shrink_in_world_space_when_zoomed_in() {
		let config = ScaleConfig::default();
		let near = ScaledValues::new(&config, 2.0);
		let far = ScaledValues::new(&config, 0.5);
		assert!(near.ring_width < far.ring_width);
		assert!(near.edge_width(1.0) > near.edge_width(0.0));
	}

	#[test]
	fn label_font_is_clamped_in_screen_space() {
		let config = ScaleConfig::default();
		let far = ScaledValues::new(&config, 0.5);
		// 9 world units would be 4.5px on screen; clamped up to 7px.
		assert!((far.label_size * 0.5 - 7.0).abs() < 1e-9);
		let unzoomed = ScaledValues::new(&config, 1.0);
		assert!((unzoomed.label_size - 9.0).abs() < 1e-9);
		// 9 world units would be 18px on screen; clamped down to 14px.
		let near = ScaledValues::new(&config, 2.0);
		assert!((near.label_size * 2.0 - 14.0).abs() < 1e-9);
	}

	#[test]
	fn edge_alpha_interpolates_weight() {
		let edge = ScaleConfig::default().edge;
		assert_eq!(edge_alpha(&edge, 0.0), edge.min_alpha);
		assert_eq!(edge_alpha(&edge, 1.0), edge.max_alpha);
	}
}
