//! Visual theming for the force graph.
//!
//! Colors for the background, edges, labels, and the category palette that
//! maps a node's `country` to its fill.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in [0, 1].
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color, different opacity.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// CSS color string: hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fixed category → color table with a fallback for everything else.
#[derive(Clone, Debug)]
pub struct CategoryPalette {
	/// Category name and its color.
	pub entries: Vec<(&'static str, Color)>,
	/// Color for categories not in `entries`.
	pub other: Color,
}

impl CategoryPalette {
	/// Palette for the research country categories.
	pub fn research() -> Self {
		Self {
			entries: vec![
				("USA", Color::rgb(88, 166, 255)),     // Blue
				("China", Color::rgb(248, 113, 113)),  // Coral
				("UK", Color::rgb(74, 222, 128)),      // Green
				("Germany", Color::rgb(250, 204, 21)), // Amber
			],
			other: Color::rgb(167, 139, 250), // Violet
		}
	}

	/// Color for a category; matching ignores ASCII case and surrounding space.
	pub fn get(&self, category: &str) -> Color {
		let category = category.trim();
		self.entries
			.iter()
			.find(|(name, _)| name.eq_ignore_ascii_case(category))
			.map(|&(_, color)| color)
			.unwrap_or(self.other)
	}
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Canvas fill.
	pub background: Color,
	/// Base edge color; opacity comes from the edge weight.
	pub edge: Color,
	/// Label color for highlighted nodes (and all nodes when nothing is highlighted).
	pub label: Color,
	/// Label color for the rest while something is highlighted.
	pub label_dim: Color,
	/// Outline around the selected node.
	pub selection_ring: Color,
	/// Node fill by category.
	pub palette: CategoryPalette,
}

impl Theme {
	/// Dark cockpit theme (default)
	pub fn cockpit() -> Self {
		Self {
			background: Color::rgb(15, 17, 26),
			edge: Color::rgb(148, 163, 184),
			label: Color::rgba(226, 232, 240, 0.9),
			label_dim: Color::rgba(148, 163, 184, 0.45),
			selection_ring: Color::rgb(255, 255, 255),
			palette: CategoryPalette::research(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::cockpit()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn palette_falls_back_to_other() {
		let palette = CategoryPalette::research();
		assert_eq!(palette.get("UK"), Color::rgb(74, 222, 128));
		assert_eq!(palette.get(" usa "), Color::rgb(88, 166, 255));
		assert_eq!(palette.get("Canada"), palette.other);
		assert_eq!(palette.get(""), palette.other);
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(
			Color::rgb(1, 2, 3).with_alpha(0.5).to_css(),
			"rgba(1, 2, 3, 0.5)"
		);
		assert_eq!(Color::rgb(0, 0, 0).lighten(1.0), Color::rgb(255, 255, 255));
	}
}
