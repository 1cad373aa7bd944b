//! Force-directed knowledge graph component.
//!
//! Renders an interactive force-directed graph on an HTML canvas with:
//! - A spring-embedder layout that runs for a fixed tick budget, then freezes
//! - Pan, zoom, hover and click-to-select interactions
//! - Color by category, radius by relevance score, halos on focus
//! - Optional synthetic expansion of seed data for stress-testing
//!
//! # Example
//!
//! ```ignore
//! use research_graph::{Edge, ForceGraphCanvas, GraphData, Node};
//!
//! let data = GraphData {
//!     nodes: vec![
//!         Node { id: "a".into(), score: 0.9, ..Node::default() },
//!         Node { id: "b".into(), score: 0.4, ..Node::default() },
//!     ],
//!     edges: vec![Edge::new("a", "b", 0.7)],
//! };
//!
//! view! {
//!     <ForceGraphCanvas
//!         data=Signal::derive(move || data.clone())
//!         on_select=Callback::new(|id| log::info!("selected {:?}", id))
//!     />
//! }
//! ```

mod component;
mod frame;
mod render;
pub mod scale;
pub mod simulation;
mod state;
pub mod theme;
pub mod topology;
mod types;

pub use component::ForceGraphCanvas;
pub use simulation::SimulationConfig;
pub use types::{Confidence, DimensionFact, Edge, GraphData, GraphPayload, Node};
