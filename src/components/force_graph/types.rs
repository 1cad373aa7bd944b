//! Graph data structures for input to the force graph component.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::simulation::SimulationConfig;

/// Confidence attached to an extracted dimension fact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
	/// Stated explicitly in the source.
	High,
	/// Inferred with reasonable support.
	#[default]
	Med,
	/// Weak or indirect evidence.
	Low,
}

/// A named fact extracted for a node (e.g. "sample_size" -> "n=412").
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DimensionFact {
	/// Extracted value, as displayed.
	pub value: String,
	/// How much the extraction can be trusted.
	#[serde(default)]
	pub confidence: Confidence,
}

/// A paper or study in the graph.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Node {
	/// Unique identifier for this node. Used to reference nodes in edges.
	pub id: String,
	/// Paper title.
	pub title: String,
	/// Projection coordinates for the topology map view; ignored by the layout.
	pub umap_x: f64,
	/// See `umap_x`.
	pub umap_y: f64,
	/// Category driving the node color.
	pub country: String,
	/// Relevance in [0, 1]; drives the node radius.
	pub score: f64,
	/// Publication year; 0 when unknown.
	pub year: i32,
	/// Citation count.
	pub citations: u32,
	/// Abstract text (`abstract` in JSON).
	#[serde(rename = "abstract")]
	pub abstract_text: String,
	/// Author names, first author first.
	pub authors: Vec<String>,
	/// Extracted facts keyed by dimension name.
	pub dimensions: BTreeMap<String, DimensionFact>,
}

impl Node {
	/// Short display label: first author's surname plus year, e.g. "Okafor 2021".
	///
	/// Returns `None` when the node has no authors to distinguish it by.
	pub fn short_label(&self) -> Option<String> {
		let first = self.authors.first()?.trim();
		// "Surname, Given" or "Given Surname"
		let surname = match first.split_once(',') {
			Some((surname, _)) => surname.trim(),
			None => first.split_whitespace().last()?,
		};
		if surname.is_empty() {
			return None;
		}
		if self.year > 0 {
			Some(format!("{} {}", surname, self.year))
		} else {
			Some(surname.to_string())
		}
	}
}

/// An undirected, weighted relationship between two nodes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Edge {
	/// Id of one endpoint.
	pub source_id: String,
	/// Id of the other endpoint. Direction carries no meaning.
	pub target_id: String,
	/// Relationship strength in (0, 1].
	#[serde(default = "default_weight")]
	pub weight: f64,
}

fn default_weight() -> f64 {
	0.5
}

impl Edge {
	/// Build an edge between two node ids.
	pub fn new(source_id: impl Into<String>, target_id: impl Into<String>, weight: f64) -> Self {
		Self {
			source_id: source_id.into(),
			target_id: target_id.into(),
			weight,
		}
	}

	/// Order-independent key for duplicate detection.
	pub fn pair_key(&self) -> (&str, &str) {
		if self.source_id <= self.target_id {
			(&self.source_id, &self.target_id)
		} else {
			(&self.target_id, &self.source_id)
		}
	}
}

/// Complete graph data: nodes and edges.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	/// All nodes, in layout order.
	#[serde(default)]
	pub nodes: Vec<Node>,
	/// Relationships between nodes. Edges to unknown ids are skipped.
	#[serde(default)]
	pub edges: Vec<Edge>,
}

/// Document embedded in the host page under `#graph-data`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphPayload {
	/// Nodes and edges, at the top level of the document.
	#[serde(flatten)]
	pub data: GraphData,
	/// Optional overrides for the layout physics.
	#[serde(default)]
	pub layout: SimulationConfig,
	/// Expand the seed set with synthetic satellites before layout.
	#[serde(default)]
	pub expand: bool,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node_with_authors(authors: &[&str], year: i32) -> Node {
		Node {
			id: "n".into(),
			authors: authors.iter().map(|a| a.to_string()).collect(),
			year,
			..Node::default()
		}
	}

	#[test]
	fn short_label_uses_first_author_surname() {
		let node = node_with_authors(&["Amara Okafor", "Li Wei"], 2021);
		assert_eq!(node.short_label().as_deref(), Some("Okafor 2021"));
	}

	#[test]
	fn short_label_handles_comma_form() {
		let node = node_with_authors(&["Lindqvist, Sara"], 2019);
		assert_eq!(node.short_label().as_deref(), Some("Lindqvist 2019"));
	}

	#[test]
	fn short_label_requires_authors() {
		assert_eq!(node_with_authors(&[], 2020).short_label(), None);
		assert_eq!(node_with_authors(&["   "], 2020).short_label(), None);
	}

	#[test]
	fn pair_key_is_order_independent() {
		let a = Edge::new("x", "y", 0.5);
		let b = Edge::new("y", "x", 0.9);
		assert_eq!(a.pair_key(), b.pair_key());
	}

	#[test]
	fn payload_deserializes_with_defaults() {
		let json = r#"{
			"nodes": [
				{"id": "p1", "title": "Trial", "country": "UK", "score": 0.8,
				 "abstract": "text", "authors": ["Jane Doe"],
				 "dimensions": {"sample_size": {"value": "n=120", "confidence": "high"}}},
				{"id": "p2"}
			],
			"edges": [{"source_id": "p1", "target_id": "p2"}],
			"layout": {"iterations": 50},
			"expand": true
		}"#;
		let payload: GraphPayload = serde_json::from_str(json).unwrap();
		assert_eq!(payload.data.nodes.len(), 2);
		assert_eq!(payload.data.nodes[0].abstract_text, "text");
		assert_eq!(
			payload.data.nodes[0].dimensions["sample_size"].confidence,
			Confidence::High
		);
		assert_eq!(payload.data.edges[0].weight, 0.5);
		assert_eq!(payload.layout.iterations, 50);
		assert_eq!(payload.layout.damping, SimulationConfig::default().damping);
		assert!(payload.expand);
	}
}
