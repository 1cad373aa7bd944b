//! Graph view state and interaction handling.
//!
//! Combines the layout [`Simulation`] with per-node display metadata, the
//! pan/zoom view transform, selection and hover, and smooth halo transitions.
//! Pointer input arrives in canvas CSS pixels; hit-testing maps it back into
//! world space through the inverse of the view transform.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::debug;

use super::scale::ScaleConfig;
use super::simulation::{LayoutState, Simulation, SimulationConfig};
use super::theme::{Color, Theme};
use super::types::GraphData;

/// Pointer travel (CSS pixels) below which a press-and-release counts as a click.
const CLICK_SLOP: f64 = 3.0;

/// Per-node display metadata, parallel to the layout order.
#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub label: Option<String>,
	pub color: Color,
	/// World-space radius derived from the node score.
	pub radius: f64,
}

/// Pan and zoom transform: `screen = (x, y) + k * world`.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%), always within the configured zoom range.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(self.x + gx * self.k, self.y + gy * self.k)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	/// Set once the pointer travels further than a click would.
	pub moved: bool,
}

/// Smooth halo transitions with per-node intensity tracking.
///
/// Each node has an intensity in [0, 1] that eases towards 1 while the node
/// is selected or hovered and decays back to 0 afterwards. A short hold time
/// keeps the halo from flashing when the pointer skims the edge of a node.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	target_set: HashSet<usize>,
	node_intensity: HashMap<usize, f64>,
	hold_timer: HashMap<usize, f64>,
}

/// Minimum time (seconds) a halo is held before it can fade out.
const MIN_HOLD_TIME: f64 = 0.12;

impl HighlightState {
	/// Replace the set of nodes whose halo should be lit.
	pub fn set_targets(&mut self, targets: impl IntoIterator<Item = usize>) {
		self.target_set = targets.into_iter().collect();
		for &idx in &self.target_set {
			self.hold_timer.insert(idx, MIN_HOLD_TIME);
		}
	}

	/// Exponential smoothing: value += (target - value) * (1 - e^(-speed * dt))
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 10.0;
		const FADE_OUT_SPEED: f64 = 6.0;

		let fade_in_factor = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out_decay = (-FADE_OUT_SPEED * dt).exp();

		for &idx in &self.target_set {
			let intensity = self.node_intensity.entry(idx).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in_factor;
			if *intensity > 0.995 {
				*intensity = 1.0;
			}
		}

		self.hold_timer.retain(|idx, timer| {
			if self.target_set.contains(idx) {
				true
			} else {
				*timer -= dt;
				*timer > 0.0
			}
		});

		self.node_intensity.retain(|idx, intensity| {
			if self.target_set.contains(idx) {
				return true;
			}
			if self.hold_timer.get(idx).copied().unwrap_or(0.0) <= 0.0 {
				*intensity *= fade_out_decay;
			}
			*intensity > 0.005
		});
	}

	pub fn node_intensity(&self, idx: usize) -> f64 {
		self.node_intensity.get(&idx).copied().unwrap_or(0.0)
	}

	/// Whether any halo is still moving towards its target.
	pub fn is_animating(&self) -> bool {
		self.node_intensity
			.iter()
			.any(|(idx, &t)| !self.target_set.contains(idx) || t < 1.0)
			|| self
				.target_set
				.iter()
				.any(|idx| !self.node_intensity.contains_key(idx))
	}

	pub fn clear(&mut self) {
		self.target_set.clear();
		self.node_intensity.clear();
		self.hold_timer.clear();
	}
}

/// A selection or hover change to report to the host application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeChange(pub Option<String>);

/// Linear scan for the first node whose hit circle contains the world point.
///
/// Nodes are tested in layout order; the first match wins even if a later
/// node is closer.
pub fn hit_test(
	layout: &LayoutState,
	nodes: &[NodeInfo],
	gx: f64,
	gy: f64,
	margin: f64,
) -> Option<usize> {
	layout
		.bodies
		.iter()
		.zip(nodes)
		.position(|(body, info)| {
			let (dx, dy) = (body.x - gx, body.y - gy);
			(dx * dx + dy * dy).sqrt() <= info.radius + margin
		})
}

fn node_infos(data: &GraphData, theme: &Theme, scale: &ScaleConfig) -> Vec<NodeInfo> {
	data.nodes
		.iter()
		.map(|node| NodeInfo {
			label: node.short_label(),
			color: theme.palette.get(&node.country),
			radius: scale.node.radius_for(node.score),
		})
		.collect()
}

/// Core view state: layout simulation plus interaction and highlight tracking.
///
/// Created once when the component mounts and re-seeded whenever the node
/// set changes. The renderer only reads [`ForceGraphState::layout`].
pub struct ForceGraphState {
	pub simulation: Simulation,
	pub nodes: Vec<NodeInfo>,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub highlight: HighlightState,
	pub scale: ScaleConfig,
	pub selected: Option<usize>,
	pub hovered: Option<usize>,
	pub width: f64,
	pub height: f64,
	layout: Rc<LayoutState>,
	dirty: bool,
}

impl ForceGraphState {
	pub fn new(
		data: &GraphData,
		width: f64,
		height: f64,
		theme: &Theme,
		scale: ScaleConfig,
		config: SimulationConfig,
	) -> Self {
		let simulation = Simulation::new(&data.nodes, &data.edges, (width / 2.0, height / 2.0), config);
		let layout = simulation.snapshot();
		Self {
			nodes: node_infos(data, theme, &scale),
			simulation,
			transform: ViewTransform::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			scale,
			selected: None,
			hovered: None,
			width,
			height,
			layout,
			dirty: true,
		}
	}

	/// Take a new value of the graph data.
	///
	/// With the same set of node ids the layout carries on where it is and
	/// only display metadata and links change. A different id set re-seeds
	/// the layout under the same view and drops hover. The selection survives
	/// whenever its id is still present. Returns the selection change the host
	/// needs to hear about, if any.
	pub fn set_data(
		&mut self,
		data: &GraphData,
		theme: &Theme,
		config: SimulationConfig,
	) -> Option<NodeChange> {
		let selected_id = self.selected_id().map(str::to_string);
		let hovered_id = self.hovered_id().map(str::to_string);
		let (old_selected, old_hovered) = (self.selected, self.hovered);

		let reseeded = !self.simulation.refresh(&data.nodes, &data.edges);
		if reseeded {
			self.simulation = Simulation::new(
				&data.nodes,
				&data.edges,
				(self.width / 2.0, self.height / 2.0),
				config,
			);
			self.pan = PanState::default();
		}
		self.layout = self.simulation.snapshot();
		self.nodes = node_infos(data, theme, &self.scale);

		let lookup = |id: Option<String>| id.and_then(|id| self.layout.index.get(&id));
		self.selected = lookup(selected_id.clone());
		self.hovered = if reseeded { None } else { lookup(hovered_id) };
		// Halo intensities are keyed by index.
		if reseeded || self.selected != old_selected || self.hovered != old_hovered {
			self.highlight.clear();
		}
		self.sync_highlight();
		self.dirty = true;

		let current = self.selected_id().map(str::to_string);
		(current != selected_id).then(|| NodeChange(current))
	}

	/// Latest layout snapshot.
	pub fn layout(&self) -> &LayoutState {
		&self.layout
	}

	/// Advance physics and halo animation by one frame.
	pub fn tick(&mut self, dt: f64) {
		if self.simulation.advance() {
			self.layout = self.simulation.snapshot();
			self.dirty = true;
		}
		if self.highlight.is_animating() {
			self.highlight.tick(dt);
			self.dirty = true;
		}
	}

	/// Whether another frame is needed without further input.
	pub fn is_animating(&self) -> bool {
		self.simulation.is_running() || self.highlight.is_animating()
	}

	/// Returns whether a redraw is pending and clears the flag.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform.screen_to_graph(sx, sy)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		hit_test(&self.layout, &self.nodes, gx, gy, self.scale.node.hit_margin)
	}

	fn id_of(&self, idx: Option<usize>) -> Option<&str> {
		idx.and_then(|i| self.layout.index.id(i))
	}

	pub fn selected_id(&self) -> Option<&str> {
		self.id_of(self.selected)
	}

	pub fn hovered_id(&self) -> Option<&str> {
		self.id_of(self.hovered)
	}

	fn sync_highlight(&mut self) {
		let targets = self.selected.into_iter().chain(self.hovered);
		self.highlight.set_targets(targets);
	}

	/// Apply a selection driven from outside (e.g. a companion table).
	/// Unknown ids clear the selection. Returns whether anything changed.
	pub fn set_selected_id(&mut self, id: Option<&str>) -> bool {
		let idx = id.and_then(|id| self.layout.index.get(id));
		if idx == self.selected {
			return false;
		}
		self.selected = idx;
		self.sync_highlight();
		self.dirty = true;
		true
	}

	/// Apply a hover driven from outside. Returns whether anything changed.
	pub fn set_hovered_id(&mut self, id: Option<&str>) -> bool {
		let idx = id.and_then(|id| self.layout.index.get(id));
		self.set_hover(idx).is_some()
	}

	fn set_hover(&mut self, idx: Option<usize>) -> Option<NodeChange> {
		if self.hovered == idx {
			return None;
		}
		self.hovered = idx;
		self.sync_highlight();
		self.dirty = true;
		Some(NodeChange(self.hovered_id().map(str::to_string)))
	}

	/// Toggle selection of the node under the pointer; empty space clears.
	pub fn click(&mut self, sx: f64, sy: f64) -> NodeChange {
		let hit = self.node_at_position(sx, sy);
		self.selected = match hit {
			Some(idx) if self.selected == Some(idx) => None,
			other => other,
		};
		debug!("research-graph: selection -> {:?}", self.selected_id());
		self.sync_highlight();
		self.dirty = true;
		NodeChange(self.selected_id().map(str::to_string))
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
			moved: false,
		};
	}

	/// Pan while dragging, otherwise update hover.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> Option<NodeChange> {
		if self.pan.active {
			let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
			if (dx * dx + dy * dy).sqrt() > CLICK_SLOP {
				self.pan.moved = true;
			}
			if self.pan.moved {
				self.transform.x = self.pan.transform_start_x + dx;
				self.transform.y = self.pan.transform_start_y + dy;
				self.dirty = true;
			}
			return None;
		}
		let hovered = self.node_at_position(sx, sy);
		self.set_hover(hovered)
	}

	/// End a drag. A release that barely moved is treated as a click.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Option<NodeChange> {
		let was_click = self.pan.active && !self.pan.moved;
		self.pan.active = false;
		was_click.then(|| self.click(sx, sy))
	}

	/// Pointer left the canvas: end any drag and clear hover.
	pub fn pointer_leave(&mut self) -> Option<NodeChange> {
		self.pan.active = false;
		self.set_hover(None)
	}

	fn set_zoom(&mut self, k: f64) {
		let k = self.scale.zoom.clamp(k);
		if k != self.transform.k {
			self.transform.k = k;
			self.dirty = true;
		}
	}

	pub fn zoom_in(&mut self) {
		self.set_zoom(self.transform.k + self.scale.zoom.step);
	}

	pub fn zoom_out(&mut self) {
		self.set_zoom(self.transform.k - self.scale.zoom.step);
	}

	/// Wheel zoom anchored at the pointer.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		// Horizontal scroll carries no zoom intent.
		if delta_y == 0.0 || delta_y.is_nan() {
			return;
		}
		let factor = if delta_y > 0.0 {
			1.0 / self.scale.zoom.wheel_factor
		} else {
			self.scale.zoom.wheel_factor
		};
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		self.transform.k = self.scale.zoom.clamp(self.transform.k * factor);
		let (nx, ny) = self.transform.graph_to_screen(gx, gy);
		self.transform.x += sx - nx;
		self.transform.y += sy - ny;
		self.dirty = true;
	}

	/// Zoom back to 1.0 and pan to the origin. The layout is untouched.
	pub fn reset_view(&mut self) {
		self.transform = ViewTransform::default();
		self.pan = PanState::default();
		self.dirty = true;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.dirty = true;
	}
}
