//! research-graph: force-directed knowledge graph for the research cockpit.
//!
//! This crate provides a WASM-based graph view that lays out analysis
//! results with a spring-embedder simulation and supports pan, zoom, hover
//! and click-to-select on a canvas.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::topology;
pub use components::force_graph::{
	Confidence, DimensionFact, Edge, ForceGraphCanvas, GraphData, GraphPayload, Node,
	SimulationConfig,
};

/// Seed for the synthetic expansion of demo data.
const DEMO_SEED: u64 = 42;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("research-graph: logging initialized");
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], edges: [...], layout?, expand? }
fn load_graph_payload() -> Option<GraphPayload> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphPayload>(&json_text) {
		Ok(payload) => {
			info!(
				"research-graph: loaded {} nodes, {} edges",
				payload.data.nodes.len(),
				payload.data.edges.len()
			);
			Some(payload)
		}
		Err(e) => {
			warn!("research-graph: failed to parse graph data: {}", e);
			None
		}
	}
}

fn demo_node(id: &str, title: &str, country: &str, score: f64, year: i32, author: &str) -> Node {
	Node {
		id: id.into(),
		title: title.into(),
		country: country.into(),
		score,
		year,
		authors: vec![author.into()],
		..Node::default()
	}
}

/// Seed set used when the page embeds no data.
fn demo_payload() -> GraphPayload {
	let nodes = vec![
		demo_node("p1", "Sleep duration and cognitive decline", "USA", 0.92, 2021, "Maya Patel"),
		demo_node("p2", "Shift work and metabolic risk", "UK", 0.81, 2020, "Tom Fairhurst"),
		demo_node("p3", "Circadian disruption in adolescents", "China", 0.74, 2022, "Li Wei"),
		demo_node("p4", "Napping and memory consolidation", "Germany", 0.66, 2019, "Jonas Keller"),
		demo_node("p5", "Light exposure and mood", "Canada", 0.58, 2023, "Claire Dubois"),
	];
	let edges = vec![
		Edge::new("p1", "p2", 0.8),
		Edge::new("p1", "p3", 0.6),
		Edge::new("p2", "p4", 0.5),
		Edge::new("p3", "p5", 0.7),
	];
	GraphPayload {
		data: GraphData { nodes, edges },
		layout: SimulationConfig::default(),
		expand: true,
	}
}

/// Side panel describing the selected node.
#[component]
fn NodeDetails(node: Node) -> impl IntoView {
	let dimensions = node
		.dimensions
		.iter()
		.map(|(name, fact)| {
			view! { <li>{format!("{}: {} ({:?})", name, fact.value, fact.confidence)}</li> }
		})
		.collect_view();
	view! {
		<aside class="node-details">
			<h2>{node.title.clone()}</h2>
			<p class="meta">
				{format!("{} · {} · {} citations", node.authors.join(", "), node.year, node.citations)}
			</p>
			<p>{node.abstract_text.clone()}</p>
			<ul>{dimensions}</ul>
		</aside>
	}
}

/// Main application component.
/// Loads graph data from DOM and renders the force-directed visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let payload = load_graph_payload().unwrap_or_else(demo_payload);
	let graph_data = if payload.expand {
		topology::combine(&payload.data.nodes, &payload.data.edges, DEMO_SEED)
	} else {
		payload.data
	};
	let layout = payload.layout;

	let (selected, set_selected) = signal(None::<String>);
	let lookup = graph_data.clone();
	let details = move || {
		let id = selected.get()?;
		let node = lookup.nodes.iter().find(|n| n.id == id)?.clone();
		Some(view! { <NodeDetails node=node /> })
	};
	let graph_signal = Signal::derive(move || graph_data.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Research Cockpit · Knowledge Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=graph_signal
				selected=selected
				on_select=Callback::new(move |id: Option<String>| set_selected.set(id))
				config=layout
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Knowledge Graph"</h1>
				<p class="subtitle">"Click a study to select it. Drag to pan. Scroll or use the buttons to zoom."</p>
			</div>
			{details}
		</div>
	}
}
