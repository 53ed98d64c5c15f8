//! galaxy-graph: force-directed "galaxy" views for competitive-programming training.
//!
//! This crate provides a WASM canvas component that lays out the topic skill
//! tree and the curated problem similarity graph with a physics simulation,
//! with pan/zoom, hover tooltips and click-through.

use std::collections::{HashMap, HashSet};

use getrandom as _;
use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::galaxy::{
	CuratedSubgraph, Edge, GalaxyCanvas, GalaxyConfig, GalaxyError, GalaxyHandle, GraphData, Node,
	ProblemGalaxy, SkillTreeGalaxy, TopicStats, TopicsResponse,
};

/// Id of the script element carrying the JSON payload.
const PAYLOAD_ELEMENT: &str = "galaxy-data";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("galaxy-graph: logging initialized");
}

/// Page payload, tagged by `"mode"`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GalaxyPayload {
	/// Topic skill tree with per-topic solve counts.
	Skills {
		/// Topic map with tier labels and colors.
		topics: TopicsResponse,
		/// Solve counts keyed by topic id.
		#[serde(default)]
		stats: HashMap<String, TopicStats>,
		/// Overrides for the view's tunables. Omitted fields keep their defaults.
		#[serde(default)]
		config: Option<GalaxyConfig>,
	},
	/// Curated problem subgraph.
	Problems {
		/// Topic map, used for problem tiers and colors.
		topics: TopicsResponse,
		/// Problems and similarity edges.
		subgraph: CuratedSubgraph,
		/// Ids of solved problems.
		#[serde(default)]
		solved: HashSet<String>,
		/// Overrides for the view's tunables. Omitted fields keep their defaults.
		#[serde(default)]
		config: Option<GalaxyConfig>,
	},
}

/// Parse a payload from JSON text.
pub fn parse_payload(json: &str) -> Result<GalaxyPayload, GalaxyError> {
	Ok(serde_json::from_str(json)?)
}

/// Load the payload from the script element with id="galaxy-data".
fn load_payload() -> Result<GalaxyPayload, GalaxyError> {
	let window: Window = web_sys::window().ok_or_else(|| GalaxyError::MissingElement("window".into()))?;
	let document = window
		.document()
		.ok_or_else(|| GalaxyError::MissingElement("document".into()))?;
	let script: HtmlScriptElement = document
		.get_element_by_id(PAYLOAD_ELEMENT)
		.and_then(|el| el.dyn_into().ok())
		.ok_or_else(|| GalaxyError::MissingElement(PAYLOAD_ELEMENT.into()))?;
	let payload = parse_payload(&script.text()?)?;
	match &payload {
		GalaxyPayload::Skills { topics, stats, .. } => info!(
			"galaxy-graph: loaded {} topics, {} with stats",
			topics.topics.len(),
			stats.len()
		),
		GalaxyPayload::Problems {
			subgraph, solved, ..
		} => info!(
			"galaxy-graph: loaded {} problems, {} edges, {} solved",
			subgraph.nodes.len(),
			subgraph.edges.len(),
			solved.len()
		),
	}
	Ok(payload)
}

/// Main application component.
/// Loads the payload from the DOM and mounts the matching galaxy view.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let view = match load_payload() {
		Ok(GalaxyPayload::Skills {
			topics,
			stats,
			config,
		}) => {
			let topics = Signal::derive(move || topics.clone());
			let stats = Signal::derive(move || stats.clone());
			match config {
				Some(config) => {
					info!("galaxy-graph: using payload config");
					view! { <SkillTreeGalaxy topics=topics stats=stats config=config /> }.into_any()
				}
				None => view! { <SkillTreeGalaxy topics=topics stats=stats /> }.into_any(),
			}
		}
		Ok(GalaxyPayload::Problems {
			topics,
			subgraph,
			solved,
			config,
		}) => {
			let topics = Signal::derive(move || topics.clone());
			let subgraph = Signal::derive(move || subgraph.clone());
			let solved = Signal::derive(move || solved.clone());
			match config {
				Some(config) => {
					info!("galaxy-graph: using payload config");
					view! { <ProblemGalaxy topics=topics subgraph=subgraph solved=solved config=config /> }
						.into_any()
				}
				None => {
					view! { <ProblemGalaxy topics=topics subgraph=subgraph solved=solved /> }.into_any()
				}
			}
		}
		Err(e) => {
			warn!("galaxy-graph: {e}");
			view! { <div class="galaxy-empty">"No galaxy data on this page."</div> }.into_any()
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Galaxy" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			{view}
			<div class="graph-overlay">
				<h1>"Galaxy"</h1>
				<p class="subtitle">"Scroll to zoom. Drag to pan. Hover a star for details."</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_skill_payload() {
		let json = r##"{
			"mode": "skills",
			"topics": {
				"topics": { "basics": { "name": "Basics", "icon": "📘", "prereqs": [], "tier": 0 } },
				"tier_labels": ["Bronze"],
				"tier_colors": ["#cd7f32"]
			},
			"stats": { "basics": { "solved": 2, "total": 5 } }
		}"##;
		match parse_payload(json).unwrap() {
			GalaxyPayload::Skills {
				topics,
				stats,
				config,
			} => {
				assert_eq!(topics.topics["basics"].icon, "📘");
				assert_eq!(stats["basics"].total, 5);
				assert!(config.is_none());
			}
			other => panic!("unexpected payload {other:?}"),
		}
	}

	#[test]
	fn parses_problem_payload_with_defaults() {
		let json = r#"{
			"mode": "problems",
			"topics": { "topics": {} },
			"subgraph": {
				"nodes": [{ "id": "4A", "name": "Watermelon", "rating": 800, "topic": "math" }],
				"edges": [{ "source": "4A", "target": "1B", "score": 0.4 }]
			}
		}"#;
		match parse_payload(json).unwrap() {
			GalaxyPayload::Problems {
				subgraph, solved, ..
			} => {
				assert_eq!(subgraph.nodes.len(), 1);
				assert_eq!(subgraph.edges[0].score, 0.4);
				assert!(solved.is_empty());
			}
			other => panic!("unexpected payload {other:?}"),
		}
	}

	#[test]
	fn payload_config_overrides_a_subset() {
		let json = r#"{
			"mode": "problems",
			"topics": { "topics": {} },
			"subgraph": { "nodes": [], "edges": [] },
			"config": { "simulation": { "seed": 7 }, "camera": { "max_zoom": 3.0 } }
		}"#;
		let GalaxyPayload::Problems {
			config: Some(config),
			..
		} = parse_payload(json).unwrap()
		else {
			panic!("expected a problem payload with config");
		};
		let defaults = GalaxyConfig::default();
		assert_eq!(config.simulation.seed, Some(7));
		assert_eq!(
			config.simulation.charge_strength,
			defaults.simulation.charge_strength
		);
		assert_eq!(config.camera.max_zoom, 3.0);
		assert_eq!(config.camera.min_zoom, defaults.camera.min_zoom);
		assert_eq!(config.input.mouse_click_threshold, defaults.input.mouse_click_threshold);
	}

	#[test]
	fn unknown_mode_is_a_parse_error() {
		let err = parse_payload(r#"{ "mode": "cosmos" }"#).unwrap_err();
		assert!(matches!(err, GalaxyError::Parse(_)));
	}
}
