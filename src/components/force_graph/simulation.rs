//! Force-directed layout physics.
//!
//! The layout is a classic spring embedder: every pair of nodes repels with an
//! inverse-square force, every edge pulls its endpoints together like a spring
//! with zero rest length, and a weak centering force keeps the graph from
//! drifting. Velocities are damped each tick so the system settles instead of
//! oscillating forever.
//!
//! [`step`] is pure: it takes a snapshot and returns the next one. The
//! [`Simulation`] driver owns the current snapshot and stops advancing after a
//! fixed iteration budget. Repulsion is O(n²) per tick, which is fine for a
//! few hundred nodes; thousands would need a Barnes-Hut quadtree.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};
use std::rc::Rc;

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use super::types::{Edge, Node};

/// Physics constants for the layout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Pull towards the center per unit of displacement.
	pub center_gain: f64,
	/// Pairwise repulsion constant (`force = repulsion / distance²`).
	pub repulsion: f64,
	/// Spring gain per unit of displacement, scaled by edge weight.
	pub attraction: f64,
	/// Velocity multiplier applied each tick (0..1).
	pub damping: f64,
	/// Ticks run after each (re)seed before the layout freezes.
	pub iterations: u32,
	/// Distance floor for the repulsion term.
	pub min_distance: f64,
	/// Inner radius of the seeding ring.
	pub seed_radius_min: f64,
	/// Outer radius of the seeding ring.
	pub seed_radius_max: f64,
	/// Seed for the radius jitter of the initial ring.
	pub seed: u64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			center_gain: 0.005,
			repulsion: 2000.0,
			attraction: 0.01,
			damping: 0.85,
			iterations: 100,
			min_distance: 1.0,
			seed_radius_min: 150.0,
			seed_radius_max: 250.0,
			seed: 0x5eed,
		}
	}
}

/// Position and velocity of one node in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Horizontal velocity, world units per tick.
	pub vx: f64,
	/// Vertical velocity, world units per tick.
	pub vy: f64,
}

/// Node ids in layout order plus the reverse lookup.
#[derive(Debug, Default)]
pub struct NodeIndex {
	ids: Vec<String>,
	by_id: HashMap<String, usize>,
}

impl NodeIndex {
	/// Index ids in the given order.
	pub fn new(ids: Vec<String>) -> Self {
		let mut by_id = HashMap::with_capacity(ids.len());
		for (i, id) in ids.iter().enumerate() {
			// First occurrence wins for duplicated ids.
			by_id.entry(id.clone()).or_insert(i);
		}
		Self { ids, by_id }
	}

	/// Layout position of an id.
	pub fn get(&self, id: &str) -> Option<usize> {
		self.by_id.get(id).copied()
	}

	/// Id at a layout position.
	pub fn id(&self, idx: usize) -> Option<&str> {
		self.ids.get(idx).map(String::as_str)
	}

	/// Number of indexed nodes.
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// Whether no nodes are indexed.
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	/// Whether both indices hold the same ids, regardless of order.
	pub fn same_ids(&self, other: &NodeIndex) -> bool {
		self.ids.len() == other.ids.len()
			&& self.by_id.len() == other.by_id.len()
			&& self.by_id.keys().all(|id| other.by_id.contains_key(id))
	}
}

/// An edge resolved to layout indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
	/// Index of one endpoint.
	pub source: usize,
	/// Index of the other endpoint.
	pub target: usize,
	/// Spring strength multiplier, clamped to [0, 1].
	pub weight: f64,
}

/// Resolve edges against the node index, dropping any that reference an
/// unknown node or loop back onto the same node.
pub fn resolve_links(index: &NodeIndex, edges: &[Edge]) -> Vec<Link> {
	let mut links = Vec::with_capacity(edges.len());
	let mut skipped = 0usize;
	for edge in edges {
		match (index.get(&edge.source_id), index.get(&edge.target_id)) {
			(Some(source), Some(target)) if source != target => links.push(Link {
				source,
				target,
				weight: edge.weight.clamp(0.0, 1.0),
			}),
			_ => skipped += 1,
		}
	}
	if skipped > 0 {
		debug!("research-graph: skipped {} unresolvable edges", skipped);
	}
	links
}

/// Immutable layout snapshot: one [`Body`] per node, in [`NodeIndex`] order.
#[derive(Clone, Debug)]
pub struct LayoutState {
	/// Shared id lookup; unchanged across ticks.
	pub index: Rc<NodeIndex>,
	/// One body per indexed node.
	pub bodies: Vec<Body>,
	/// Ticks applied since seeding.
	pub tick: u32,
	/// Point the centering force pulls towards.
	pub center: (f64, f64),
}

impl LayoutState {
	/// Place nodes on a ring around `center` with zero velocity.
	///
	/// Node `i` of `n` sits at angle `2π·i/n`; the radius is jittered within
	/// the configured band so nodes never start on a degenerate all-equal ring.
	pub fn seed(index: Rc<NodeIndex>, center: (f64, f64), config: &SimulationConfig) -> Self {
		let n = index.len();
		let mut rng = SmallRng::seed_from_u64(config.seed);
		let (r_min, r_max) = if config.seed_radius_min <= config.seed_radius_max {
			(config.seed_radius_min, config.seed_radius_max)
		} else {
			(config.seed_radius_max, config.seed_radius_min)
		};
		let bodies = (0..n)
			.map(|i| {
				let angle = 2.0 * PI * i as f64 / n as f64;
				let radius = if r_max > r_min {
					rng.random_range(r_min..=r_max)
				} else {
					r_min
				};
				Body {
					x: center.0 + radius * angle.cos(),
					y: center.1 + radius * angle.sin(),
					vx: 0.0,
					vy: 0.0,
				}
			})
			.collect();

		Self {
			index,
			bodies,
			tick: 0,
			center,
		}
	}

	/// Position of the node at `idx`.
	pub fn position(&self, idx: usize) -> Option<(f64, f64)> {
		self.bodies.get(idx).map(|b| (b.x, b.y))
	}

	/// Whether the layout has no nodes.
	pub fn is_empty(&self) -> bool {
		self.bodies.is_empty()
	}
}

/// Direction used to separate two nodes that sit exactly on top of each other.
fn separation_direction(i: usize, j: usize) -> (f64, f64) {
	let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * TAU;
	(angle.cos(), angle.sin())
}

/// Advance the layout by one tick.
pub fn step(state: &LayoutState, links: &[Link], config: &SimulationConfig) -> LayoutState {
	let n = state.bodies.len();
	let (cx, cy) = state.center;
	let mut forces = vec![(0.0_f64, 0.0_f64); n];

	for (force, body) in forces.iter_mut().zip(&state.bodies) {
		force.0 += (cx - body.x) * config.center_gain;
		force.1 += (cy - body.y) * config.center_gain;
	}

	let floor = config.min_distance.max(f64::MIN_POSITIVE);
	for i in 0..n {
		let a = state.bodies[i];
		for j in (i + 1)..n {
			let b = state.bodies[j];
			let (dx, dy) = (a.x - b.x, a.y - b.y);
			let raw = (dx * dx + dy * dy).sqrt();
			let (ux, uy) = if raw > 1e-9 {
				(dx / raw, dy / raw)
			} else {
				separation_direction(i, j)
			};
			let dist = raw.max(floor);
			let magnitude = config.repulsion / (dist * dist);
			forces[i].0 += ux * magnitude;
			forces[i].1 += uy * magnitude;
			forces[j].0 -= ux * magnitude;
			forces[j].1 -= uy * magnitude;
		}
	}

	for link in links {
		let (Some(a), Some(b)) = (state.bodies.get(link.source), state.bodies.get(link.target))
		else {
			continue;
		};
		let gain = config.attraction * link.weight;
		let (fx, fy) = ((b.x - a.x) * gain, (b.y - a.y) * gain);
		forces[link.source].0 += fx;
		forces[link.source].1 += fy;
		forces[link.target].0 -= fx;
		forces[link.target].1 -= fy;
	}

	let bodies = state
		.bodies
		.iter()
		.zip(&forces)
		.map(|(body, &(fx, fy))| {
			let vx = (body.vx + fx) * config.damping;
			let vy = (body.vy + fy) * config.damping;
			Body {
				x: body.x + vx,
				y: body.y + vy,
				vx,
				vy,
			}
		})
		.collect();

	LayoutState {
		index: Rc::clone(&state.index),
		bodies,
		tick: state.tick + 1,
		center: state.center,
	}
}

/// Drives [`step`] for a fixed iteration budget after each seed.
///
/// A new node set means a new `Simulation`; there is no incremental
/// reconciliation of positions between node sets.
#[derive(Debug)]
pub struct Simulation {
	config: SimulationConfig,
	links: Vec<Link>,
	snapshot: Rc<LayoutState>,
}

impl Simulation {
	/// Seed a layout for `nodes` around `center`.
	pub fn new(nodes: &[Node], edges: &[Edge], center: (f64, f64), config: SimulationConfig) -> Self {
		let index = Rc::new(NodeIndex::new(nodes.iter().map(|n| n.id.clone()).collect()));
		let links = resolve_links(&index, edges);
		let snapshot = Rc::new(LayoutState::seed(index, center, &config));
		debug!(
			"research-graph: seeded layout with {} nodes, {} links",
			snapshot.bodies.len(),
			links.len()
		);
		Self {
			config,
			links,
			snapshot,
		}
	}

	/// Latest immutable snapshot, shared with the renderer and hit-testing.
	pub fn snapshot(&self) -> Rc<LayoutState> {
		Rc::clone(&self.snapshot)
	}

	/// Edges that resolved to known, distinct nodes.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Take new node and edge data without re-seeding.
	///
	/// Only possible when the node ids are the same set as before; bodies
	/// are carried over by id and the tick count is kept. Returns `false`
	/// (leaving the simulation untouched) when the id set differs.
	pub fn refresh(&mut self, nodes: &[Node], edges: &[Edge]) -> bool {
		let index = Rc::new(NodeIndex::new(nodes.iter().map(|n| n.id.clone()).collect()));
		let current = Rc::clone(&self.snapshot);
		if !index.same_ids(&current.index) {
			return false;
		}
		let bodies = (0..index.len())
			.map(|i| {
				index
					.id(i)
					.and_then(|id| current.index.get(id))
					.and_then(|old| current.bodies.get(old).copied())
					.unwrap_or_default()
			})
			.collect();
		self.links = resolve_links(&index, edges);
		self.snapshot = Rc::new(LayoutState {
			index,
			bodies,
			tick: current.tick,
			center: current.center,
		});
		true
	}

	/// Whether ticks remain in the budget.
	pub fn is_running(&self) -> bool {
		!self.snapshot.is_empty() && self.snapshot.tick < self.config.iterations
	}

	/// Apply one tick if the budget allows. Returns whether a tick was applied.
	pub fn advance(&mut self) -> bool {
		if !self.is_running() {
			return false;
		}
		self.snapshot = Rc::new(step(&self.snapshot, &self.links, &self.config));
		if !self.is_running() {
			debug!(
				"research-graph: layout settled after {} ticks",
				self.snapshot.tick
			);
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn nodes(n: usize) -> Vec<Node> {
		(0..n)
			.map(|i| Node {
				id: format!("n{}", i),
				..Node::default()
			})
			.collect()
	}

	fn finite(body: &Body) -> bool {
		body.x.is_finite() && body.y.is_finite() && body.vx.is_finite() && body.vy.is_finite()
	}

	fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
		((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
	}

	#[test]
	fn seeding_places_nodes_on_ring() {
		let config = SimulationConfig::default();
		let sim = Simulation::new(&nodes(12), &[], (400.0, 300.0), config.clone());
		let snapshot = sim.snapshot();
		assert_eq!(snapshot.bodies.len(), 12);
		for body in &snapshot.bodies {
			let r = distance((body.x, body.y), (400.0, 300.0));
			assert!(r >= config.seed_radius_min - 1e-9 && r <= config.seed_radius_max + 1e-9);
			assert_eq!((body.vx, body.vy), (0.0, 0.0));
		}
		// First node sits at angle zero, to the right of the center.
		let first = snapshot.bodies[0];
		assert!(first.x > 400.0);
		assert!((first.y - 300.0).abs() < 1e-9);
	}

	#[test]
	fn unknown_and_self_edges_are_skipped() {
		let edges = vec![
			Edge::new("n0", "n1", 0.5),
			Edge::new("n0", "ghost", 0.5),
			Edge::new("n1", "n1", 0.5),
		];
		let sim = Simulation::new(&nodes(2), &edges, (0.0, 0.0), SimulationConfig::default());
		assert_eq!(sim.links().len(), 1);
	}

	#[test]
	fn budget_stops_advancing() {
		let config = SimulationConfig {
			iterations: 5,
			..SimulationConfig::default()
		};
		let mut sim = Simulation::new(&nodes(3), &[], (0.0, 0.0), config);
		let mut ticks = 0;
		while sim.advance() {
			ticks += 1;
		}
		assert_eq!(ticks, 5);
		assert!(!sim.is_running());
		let before = sim.snapshot();
		assert!(!sim.advance());
		assert!(Rc::ptr_eq(&before, &sim.snapshot()));
	}

	#[test]
	fn refresh_keeps_bodies_for_the_same_ids() {
		let mut sim = Simulation::new(&nodes(3), &[], (0.0, 0.0), SimulationConfig::default());
		for _ in 0..7 {
			sim.advance();
		}
		let before = sim.snapshot();
		let mut reordered = nodes(3);
		reordered.reverse();
		assert!(sim.refresh(&reordered, &[Edge::new("n0", "n2", 0.5)]));
		let after = sim.snapshot();
		assert_eq!(after.tick, 7);
		assert_eq!(after.bodies[0], before.bodies[2]);
		assert_eq!(after.bodies[2], before.bodies[0]);
		assert_eq!(sim.links(), &[Link { source: 2, target: 0, weight: 0.5 }]);

		assert!(!sim.refresh(&nodes(4), &[]));
		assert!(Rc::ptr_eq(&after, &sim.snapshot()));
	}

	#[test]
	fn empty_graph_is_a_no_op() {
		let mut sim = Simulation::new(&[], &[], (0.0, 0.0), SimulationConfig::default());
		assert!(!sim.is_running());
		assert!(!sim.advance());
		assert!(sim.snapshot().is_empty());
	}

	#[test]
	fn step_does_not_mutate_input_snapshot() {
		let sim = Simulation::new(&nodes(4), &[], (0.0, 0.0), SimulationConfig::default());
		let before = sim.snapshot();
		let copy = before.bodies.clone();
		let next = step(&before, sim.links(), &SimulationConfig::default());
		assert_eq!(before.bodies, copy);
		assert_eq!(next.tick, 1);
		assert_ne!(next.bodies, copy);
	}

	#[test]
	fn lone_node_drifts_towards_center() {
		let config = SimulationConfig::default();
		let sim = Simulation::new(&nodes(1), &[], (250.0, 250.0), config.clone());
		let mut state = (*sim.snapshot()).clone();
		let start = distance(state.position(0).unwrap(), state.center);
		for _ in 0..config.iterations {
			state = step(&state, &[], &config);
		}
		let after_budget = distance(state.position(0).unwrap(), state.center);
		assert!(after_budget < start * 0.5);
		for _ in 0..1000 {
			state = step(&state, &[], &config);
		}
		assert!(distance(state.position(0).unwrap(), state.center) < 1.0);
	}

	#[test]
	fn coincident_nodes_separate() {
		let config = SimulationConfig::default();
		let index = Rc::new(NodeIndex::new(vec!["a".into(), "b".into()]));
		let state = LayoutState {
			index,
			bodies: vec![Body::default(), Body::default()],
			tick: 0,
			center: (0.0, 0.0),
		};
		let next = step(&state, &[], &config);
		assert!(next.bodies.iter().all(finite));
		let gap = distance(next.position(0).unwrap(), next.position(1).unwrap());
		assert!(gap > 0.0);
	}

	#[test]
	fn connected_pair_ends_closer_than_unconnected_pair() {
		let config = SimulationConfig::default();
		let mut linked = Simulation::new(
			&nodes(2),
			&[Edge::new("n0", "n1", 1.0)],
			(0.0, 0.0),
			config.clone(),
		);
		let mut free = Simulation::new(&nodes(2), &[], (0.0, 0.0), config);
		while linked.advance() {}
		while free.advance() {}
		let (l, f) = (linked.snapshot(), free.snapshot());
		let linked_gap = distance(l.position(0).unwrap(), l.position(1).unwrap());
		let free_gap = distance(f.position(0).unwrap(), f.position(1).unwrap());
		assert!(linked_gap < free_gap);
	}

	proptest! {
		#[test]
		fn positions_stay_finite(
			node_count in 0..24usize,
			pairs in proptest::collection::vec((0..24usize, 0..24usize, 0.05..1.0f64), 0..60),
			complete in any::<bool>(),
		) {
			let ns = nodes(node_count);
			let edges: Vec<Edge> = if complete {
				let mut all = Vec::new();
				for i in 0..node_count.min(8) {
					for j in (i + 1)..node_count.min(8) {
						all.push(Edge::new(format!("n{}", i), format!("n{}", j), 1.0));
					}
				}
				all
			} else {
				pairs
					.iter()
					.map(|(a, b, w)| Edge::new(format!("n{}", a), format!("n{}", b), *w))
					.collect()
			};
			let mut sim = Simulation::new(&ns, &edges, (400.0, 300.0), SimulationConfig::default());
			while sim.advance() {}
			let snapshot = sim.snapshot();
			prop_assert_eq!(snapshot.bodies.len(), node_count);
			prop_assert!(snapshot.bodies.iter().all(finite));
		}
	}
}
