//! Mapping from domain data to the generic galaxy graph.
//!
//! Both functions are pure: they never touch their inputs, and empty inputs give
//! an empty [`GraphData`]. Edges are emitted as-is even when they point at ids
//! outside the node set; the simulation and renderer drop those.

use std::collections::{HashMap, HashSet};

use super::theme::{COMPLETE_COLOR, SIMILARITY_EDGE_COLOR, TierPalette};
use super::types::{
	CuratedSubgraph, Edge, GraphData, Node, NodeDetail, TopicStats, TopicsResponse,
};

/// Spring weight of every prerequisite edge.
const PREREQ_EDGE_WEIGHT: f64 = 0.8;

fn tier_color(topics: &TopicsResponse, palette: &TierPalette, tier: u32) -> String {
	topics
		.tier_color(tier)
		.map(str::to_string)
		.unwrap_or_else(|| palette.get(tier).to_css_rgb())
}

/// Build the skill-tree graph: one node per topic, one edge per prerequisite.
///
/// `prereqs_met` decides whether a topic is unlocked; locked topics above tier 0
/// are drawn dimmed.
pub fn topics_to_galaxy(
	topics: &TopicsResponse,
	stats: &HashMap<String, TopicStats>,
	prereqs_met: impl Fn(&str) -> bool,
	palette: &TierPalette,
) -> GraphData {
	let nodes = topics
		.topics
		.iter()
		.map(|(id, topic)| {
			let stats = stats.get(id).copied().unwrap_or_default();
			let pct = stats.fraction();
			let color = tier_color(topics, palette, topic.tier);
			let unlocked = topic.tier == 0 || prereqs_met(id);
			Node {
				id: id.clone(),
				label: topic.name.clone(),
				icon: topic.icon.clone(),
				x: 0.0,
				y: 0.0,
				radius: 10.0 + stats.total as f64 * 1.2,
				glow_color: if pct >= 1.0 {
					COMPLETE_COLOR.to_string()
				} else {
					color.clone()
				},
				color,
				glow_intensity: 0.3 + pct * 0.7,
				opacity: if unlocked { 1.0 } else { 0.35 },
				tier: topic.tier,
				metadata: NodeDetail::Skill {
					stats,
					tier_label: topics.tier_label(topic.tier).map(str::to_string),
					prereqs: topic.prereqs.clone(),
				},
			}
		})
		.collect();

	let edges = topics
		.topics
		.iter()
		.flat_map(|(id, topic)| {
			let color = tier_color(topics, palette, topic.tier);
			topic.prereqs.iter().map(move |prereq| Edge {
				source: prereq.clone(),
				target: id.clone(),
				weight: PREREQ_EDGE_WEIGHT,
				color: color.clone(),
			})
		})
		.collect();

	GraphData { nodes, edges }
}

/// Solved fraction a prerequisite needs before dependent topics unlock.
pub const UNLOCK_FRACTION: f64 = 0.5;

/// Whether every prerequisite of `id` is at least half solved. Unknown topics
/// and topics without prerequisites count as unlocked.
pub fn prereqs_met(topics: &TopicsResponse, stats: &HashMap<String, TopicStats>, id: &str) -> bool {
	let Some(topic) = topics.topics.get(id) else {
		return true;
	};
	topic.prereqs.iter().all(|p| {
		stats
			.get(p)
			.is_some_and(|s| s.total > 0 && s.fraction() >= UNLOCK_FRACTION)
	})
}

/// Build the problem similarity graph from the curated subgraph.
///
/// Node tier and color come from the problem's topic; unknown topics fall back
/// to tier 0.
pub fn problems_to_galaxy(
	subgraph: &CuratedSubgraph,
	topics: &TopicsResponse,
	solved: &HashSet<String>,
	palette: &TierPalette,
) -> GraphData {
	let nodes = subgraph
		.nodes
		.iter()
		.map(|problem| {
			let topic = topics.topics.get(&problem.topic);
			let tier = topic.map(|t| t.tier).unwrap_or(0);
			let color = tier_color(topics, palette, tier);
			let is_solved = solved.contains(&problem.id);
			Node {
				id: problem.id.clone(),
				label: problem.name.clone(),
				icon: topic.map(|t| t.icon.clone()).unwrap_or_default(),
				x: 0.0,
				y: 0.0,
				radius: 3.0 + problem.rating as f64 / 400.0,
				glow_color: if is_solved {
					COMPLETE_COLOR.to_string()
				} else {
					color.clone()
				},
				color,
				glow_intensity: if is_solved { 1.0 } else { 0.3 },
				opacity: 1.0,
				tier,
				metadata: NodeDetail::Problem {
					rating: problem.rating,
					topic: problem.topic.clone(),
					solved: is_solved,
				},
			}
		})
		.collect();

	let edges = subgraph
		.edges
		.iter()
		.map(|e| Edge {
			source: e.source.clone(),
			target: e.target.clone(),
			weight: e.score.max(0.0),
			color: SIMILARITY_EDGE_COLOR.to_string(),
		})
		.collect();

	GraphData { nodes, edges }
}
