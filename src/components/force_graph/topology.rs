//! Synthetic topology expansion for stress-testing the layout at scale.
//!
//! Takes a handful of seed nodes and grows them into a ~200 node graph: five
//! clusters of satellite nodes, dense links inside each cluster, and a sparse
//! set of bridges between clusters. Node attributes come from a pure
//! pseudo-random function of (cluster, index); edge selection uses a seeded
//! [`SmallRng`] so a given seed always yields the same graph.

use std::collections::HashSet;

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::types::{Edge, GraphData, Node};

/// Number of visual clusters.
pub const CLUSTER_COUNT: usize = 5;

/// Cluster pairs that receive cross-cluster edges. Covers a connected
/// topology over all clusters without linking every pair.
pub const BRIDGES: [(usize, usize); 7] = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (0, 2), (1, 3)];

const SATELLITE_COUNTRIES: [&str; 5] = ["USA", "China", "UK", "Germany", "Canada"];
const SATELLITE_TOPICS: [&str; 5] = [
	"cohort outcomes",
	"meta-analysis",
	"randomized trial",
	"mechanistic study",
	"observational follow-up",
];

/// Generator sizing.
#[derive(Clone, Debug)]
pub struct TopologyConfig {
	/// Satellites generated for each cluster.
	pub satellites_per_cluster: usize,
	/// Upper bound on intra-cluster edges kept by [`combine`].
	pub intra_edge_cap: usize,
	/// First year of the publication window given to satellites.
	pub first_year: i32,
	/// Seed for edge selection.
	pub seed: u64,
}

impl Default for TopologyConfig {
	fn default() -> Self {
		Self {
			satellites_per_cluster: 40,
			intra_edge_cap: 400,
			first_year: 2019,
			seed: 0x70b0,
		}
	}
}

/// Stable cluster assignment from a 32-bit polynomial hash of the id.
pub fn cluster_index_of(id: &str) -> usize {
	let hash = id
		.encode_utf16()
		.fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(c as i32));
	(hash.unsigned_abs() as usize) % CLUSTER_COUNT
}

/// Cluster of a node: satellites carry theirs in the id, others are hashed.
pub fn cluster_of(node: &Node) -> usize {
	node.id
		.strip_prefix("sat-")
		.and_then(|rest| rest.split('-').next())
		.and_then(|c| c.parse::<usize>().ok())
		.filter(|&c| c < CLUSTER_COUNT)
		.unwrap_or_else(|| cluster_index_of(&node.id))
}

/// Deterministic pseudo-random value in [0, 1).
fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

fn satellite(cluster: usize, index: usize, config: &TopologyConfig) -> Node {
	let seed = (cluster * 1000 + index + 1) as f64;
	let score = 0.15 + pseudo_random(seed) * 0.3;
	let year = config.first_year + (pseudo_random(seed * 1.7) * 5.0).floor().min(4.0) as i32;
	let angle = cluster as f64 / CLUSTER_COUNT as f64 * std::f64::consts::TAU;
	let spread = 0.12 * pseudo_random(seed * 2.9);
	let topic = SATELLITE_TOPICS[index % SATELLITE_TOPICS.len()];

	Node {
		id: format!("sat-{}-{}", cluster, index),
		title: format!("Related {} {}.{}", topic, cluster, index),
		umap_x: 0.5 + 0.3 * angle.cos() + spread * (seed * 3.1).cos(),
		umap_y: 0.5 + 0.3 * angle.sin() + spread * (seed * 3.1).sin(),
		country: SATELLITE_COUNTRIES[(cluster + index) % SATELLITE_COUNTRIES.len()].to_string(),
		score,
		year,
		citations: (pseudo_random(seed * 4.3) * 120.0) as u32,
		..Node::default()
	}
}

/// Synthesize satellite nodes for every cluster.
///
/// Satellite ids that already exist among `base` are skipped.
pub fn generate_satellites(base: &[Node], config: &TopologyConfig) -> Vec<Node> {
	let taken: HashSet<&str> = base.iter().map(|n| n.id.as_str()).collect();
	(0..CLUSTER_COUNT)
		.flat_map(|cluster| {
			(0..config.satellites_per_cluster).map(move |index| satellite(cluster, index, config))
		})
		.filter(|node| !taken.contains(node.id.as_str()))
		.collect()
}

/// Group node indices by cluster.
fn members_by_cluster(nodes: &[Node]) -> [Vec<usize>; CLUSTER_COUNT] {
	let mut clusters: [Vec<usize>; CLUSTER_COUNT] = Default::default();
	for (i, node) in nodes.iter().enumerate() {
		clusters[cluster_of(node)].push(i);
	}
	clusters
}

fn pair(a: usize, b: usize) -> (usize, usize) {
	if a <= b { (a, b) } else { (b, a) }
}

/// Connect every node to 5–8 other members of its cluster.
///
/// Never emits self-loops or duplicate unordered pairs. Members are visited
/// round-robin across clusters, so a capped prefix of the result still
/// reaches every cluster.
pub fn generate_intra_cluster_edges<R: Rng + ?Sized>(nodes: &[Node], rng: &mut R) -> Vec<Edge> {
	let clusters = members_by_cluster(nodes);
	let rounds = clusters.iter().map(Vec::len).max().unwrap_or(0);
	let mut seen = HashSet::new();
	let mut edges = Vec::new();

	for round in 0..rounds {
		for members in &clusters {
			let Some(&member) = members.get(round) else {
				continue;
			};
			let others: Vec<usize> = members.iter().copied().filter(|&m| m != member).collect();
			let wanted = rng.random_range(5..=8usize).min(others.len());
			let picks: Vec<usize> = others.choose_multiple(rng, wanted).copied().collect();
			for other in picks {
				if !seen.insert(pair(member, other)) {
					continue;
				}
				edges.push(Edge::new(
					nodes[member].id.clone(),
					nodes[other].id.clone(),
					rng.random_range(0.4..=0.8),
				));
			}
		}
	}
	edges
}

/// Add 5–12 cross edges for each bridged cluster pair.
///
/// A bridge touching an empty cluster contributes nothing.
pub fn generate_inter_cluster_edges<R: Rng + ?Sized>(nodes: &[Node], rng: &mut R) -> Vec<Edge> {
	let clusters = members_by_cluster(nodes);
	let mut edges = Vec::new();

	for (a, b) in BRIDGES {
		let (from, to) = (&clusters[a], &clusters[b]);
		if from.is_empty() || to.is_empty() {
			continue;
		}
		// Never ask for more distinct pairs than the two clusters can form.
		let count = rng.random_range(5..=12usize).min(from.len() * to.len());
		let mut seen = HashSet::new();
		while seen.len() < count {
			let (Some(&s), Some(&t)) = (from.choose(rng), to.choose(rng)) else {
				break;
			};
			if !seen.insert((s, t)) {
				continue;
			}
			edges.push(Edge::new(
				nodes[s].id.clone(),
				nodes[t].id.clone(),
				rng.random_range(0.3..=0.7),
			));
		}
	}
	edges
}

/// Expand seed data into the full stress-test graph with default sizing.
pub fn combine(base_nodes: &[Node], base_edges: &[Edge], seed: u64) -> GraphData {
	combine_with(
		base_nodes,
		base_edges,
		&TopologyConfig {
			seed,
			..TopologyConfig::default()
		},
	)
}

/// Expand seed data: base + satellites, base + capped intra + inter edges.
pub fn combine_with(base_nodes: &[Node], base_edges: &[Edge], config: &TopologyConfig) -> GraphData {
	let mut rng = SmallRng::seed_from_u64(config.seed);

	let mut nodes = base_nodes.to_vec();
	nodes.extend(generate_satellites(base_nodes, config));

	let intra = generate_intra_cluster_edges(&nodes, &mut rng);
	let inter = generate_inter_cluster_edges(&nodes, &mut rng);

	let mut edges = base_edges.to_vec();
	edges.extend(intra.into_iter().take(config.intra_edge_cap));
	edges.extend(inter);

	debug!(
		"research-graph: expanded {} seed nodes to {} nodes, {} edges",
		base_nodes.len(),
		nodes.len(),
		edges.len()
	);
	GraphData { nodes, edges }
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn seeds() -> Vec<Node> {
		["paper-a", "paper-b", "paper-c", "paper-d"]
			.iter()
			.map(|id| Node {
				id: id.to_string(),
				score: 0.9,
				..Node::default()
			})
			.collect()
	}

	fn cluster_of_id(nodes: &[Node], id: &str) -> usize {
		cluster_of(nodes.iter().find(|n| n.id == id).unwrap())
	}

	fn ids(nodes: &[Node]) -> HashSet<&str> {
		nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn cluster_hash_is_stable() {
		for id in ["", "a", "paper-42", "sat-3-17", "Ünïcödé"] {
			let first = cluster_index_of(id);
			assert!(first < CLUSTER_COUNT);
			assert_eq!(first, cluster_index_of(id));
		}
		assert_eq!(cluster_index_of(""), 0);
		// 'a' = 97
		assert_eq!(cluster_index_of("a"), 97 % 5);
	}

	#[test]
	fn cluster_hash_spreads_ids() {
		let mut buckets = [0usize; CLUSTER_COUNT];
		for i in 0..10_000 {
			buckets[cluster_index_of(&format!("node-{}", i))] += 1;
		}
		for count in buckets {
			assert!((1500..=2500).contains(&count), "buckets: {:?}", buckets);
		}
	}

	#[test]
	fn satellites_are_deterministic_and_in_range() {
		let config = TopologyConfig::default();
		let a = generate_satellites(&seeds(), &config);
		let b = generate_satellites(&seeds(), &config);
		assert_eq!(a, b);
		assert_eq!(a.len(), CLUSTER_COUNT * 40);
		for node in &a {
			assert!((0.15..=0.45).contains(&node.score), "{}", node.score);
			assert!((2019..=2023).contains(&node.year));
			assert!(SATELLITE_COUNTRIES.contains(&node.country.as_str()));
		}
		assert_eq!(a[0].id, "sat-0-0");
		assert_eq!(cluster_of(&a[41]), 1);
	}

	#[test]
	fn satellites_skip_taken_ids() {
		let base = vec![Node {
			id: "sat-0-0".into(),
			..Node::default()
		}];
		let sats = generate_satellites(&base, &TopologyConfig::default());
		assert_eq!(sats.len(), CLUSTER_COUNT * 40 - 1);
		assert!(sats.iter().all(|n| n.id != "sat-0-0"));
	}

	#[test]
	fn intra_edges_are_valid() {
		let mut nodes = seeds();
		nodes.extend(generate_satellites(&nodes, &TopologyConfig::default()));
		let mut rng = SmallRng::seed_from_u64(7);
		let edges = generate_intra_cluster_edges(&nodes, &mut rng);
		let known = ids(&nodes);
		let mut pairs = HashSet::new();
		for edge in &edges {
			assert!(known.contains(edge.source_id.as_str()));
			assert!(known.contains(edge.target_id.as_str()));
			assert_ne!(edge.source_id, edge.target_id);
			assert!(pairs.insert(edge.pair_key()), "duplicate {:?}", edge.pair_key());
			assert!((0.4..=0.8).contains(&edge.weight));
			let source = nodes.iter().find(|n| n.id == edge.source_id).unwrap();
			let target = nodes.iter().find(|n| n.id == edge.target_id).unwrap();
			assert_eq!(cluster_of(source), cluster_of(target));
		}
		assert!(edges.len() > 400);
	}

	#[test]
	fn inter_edges_follow_bridges() {
		let nodes = generate_satellites(&[], &TopologyConfig::default());
		let mut rng = SmallRng::seed_from_u64(11);
		let edges = generate_inter_cluster_edges(&nodes, &mut rng);
		assert!(edges.len() >= BRIDGES.len());
		assert!(edges.len() <= BRIDGES.len() * 12);
		for edge in &edges {
			let s = nodes.iter().find(|n| n.id == edge.source_id).unwrap();
			let t = nodes.iter().find(|n| n.id == edge.target_id).unwrap();
			assert!(BRIDGES.contains(&(cluster_of(s), cluster_of(t))));
			assert!((0.3..=0.7).contains(&edge.weight));
		}
	}

	#[test]
	fn every_member_reaches_its_minimum_degree() {
		let mut nodes = seeds();
		nodes.extend(generate_satellites(&nodes, &TopologyConfig::default()));
		let clusters = members_by_cluster(&nodes);
		for seed in 0..8 {
			let mut rng = SmallRng::seed_from_u64(seed);
			let edges = generate_intra_cluster_edges(&nodes, &mut rng);
			for members in &clusters {
				let floor = 5.min(members.len().saturating_sub(1));
				for &m in members {
					let id = nodes[m].id.as_str();
					let degree = edges
						.iter()
						.filter(|e| e.source_id == id || e.target_id == id)
						.count();
					assert!(degree >= floor, "{} has degree {}", id, degree);
				}
			}
		}
	}

	#[test]
	fn small_clusters_link_every_other_member() {
		let nodes: Vec<Node> = (0..3)
			.map(|i| Node {
				id: format!("sat-1-{}", i),
				..Node::default()
			})
			.collect();
		let mut rng = SmallRng::seed_from_u64(5);
		let edges = generate_intra_cluster_edges(&nodes, &mut rng);
		assert_eq!(edges.len(), 3);
	}

	#[test]
	fn each_bridge_gets_five_to_twelve_edges() {
		let nodes = generate_satellites(&[], &TopologyConfig::default());
		for seed in 0..16 {
			let mut rng = SmallRng::seed_from_u64(seed);
			let edges = generate_inter_cluster_edges(&nodes, &mut rng);
			for (a, b) in BRIDGES {
				let count = edges
					.iter()
					.filter(|e| {
						cluster_of_id(&nodes, &e.source_id) == a
							&& cluster_of_id(&nodes, &e.target_id) == b
					})
					.count();
				assert!((5..=12).contains(&count), "bridge {:?}: {}", (a, b), count);
			}
		}
	}

	#[test]
	fn bridges_into_empty_clusters_get_no_edges() {
		// Only clusters 0 and 1 are populated: bridge (0, 1) is the only live one.
		let nodes: Vec<Node> = generate_satellites(&[], &TopologyConfig::default())
			.into_iter()
			.filter(|n| cluster_of(n) < 2)
			.collect();
		let mut rng = SmallRng::seed_from_u64(9);
		let edges = generate_inter_cluster_edges(&nodes, &mut rng);
		assert!((5..=12).contains(&edges.len()));
		for edge in &edges {
			assert_eq!(cluster_of_id(&nodes, &edge.source_id), 0);
			assert_eq!(cluster_of_id(&nodes, &edge.target_id), 1);
		}
	}

	#[test]
	fn capped_intra_edges_reach_every_cluster() {
		let data = combine(&seeds(), &[], 42);
		let mut per_cluster = [0usize; CLUSTER_COUNT];
		for edge in &data.edges {
			let (a, b) = (
				cluster_of_id(&data.nodes, &edge.source_id),
				cluster_of_id(&data.nodes, &edge.target_id),
			);
			if a == b {
				per_cluster[a] += 1;
			}
		}
		for count in per_cluster {
			assert!(count >= 40, "per cluster: {:?}", per_cluster);
		}
	}

	#[test]
	fn empty_clusters_do_not_panic() {
		let lonely = vec![Node {
			id: "sat-2-0".into(),
			..Node::default()
		}];
		let mut rng = SmallRng::seed_from_u64(1);
		assert!(generate_inter_cluster_edges(&lonely, &mut rng).is_empty());
		assert!(generate_intra_cluster_edges(&lonely, &mut rng).is_empty());
		assert!(generate_inter_cluster_edges(&[], &mut rng).is_empty());
	}

	#[test]
	fn combine_caps_intra_edges_and_keeps_base() {
		let base_edges = vec![Edge::new("paper-a", "paper-b", 1.0)];
		let data = combine(&seeds(), &base_edges, 3);
		assert_eq!(data.nodes.len(), 4 + CLUSTER_COUNT * 40);
		assert_eq!(data.edges[0], base_edges[0]);
		assert!(data.edges.len() <= 1 + 400 + BRIDGES.len() * 12);
		assert_eq!(data, combine(&seeds(), &base_edges, 3));
	}

	proptest! {
		#[test]
		fn cluster_hash_is_pure(id in ".*") {
			let c = cluster_index_of(&id);
			prop_assert!(c < CLUSTER_COUNT);
			prop_assert_eq!(c, cluster_index_of(&id));
		}

		#[test]
		fn combined_edges_reference_known_nodes(seed in any::<u64>()) {
			let data = combine(&seeds(), &[], seed);
			let known = ids(&data.nodes);
			for edge in &data.edges {
				prop_assert!(known.contains(edge.source_id.as_str()));
				prop_assert!(known.contains(edge.target_id.as_str()));
				prop_assert_ne!(&edge.source_id, &edge.target_id);
			}
		}
	}
}
