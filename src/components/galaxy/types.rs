//! Graph data structures for the galaxy view.
//!
//! Two families of types live here: the collaborator inputs (topic map, topic
//! stats, curated problem subgraph) as they arrive from the API payload, and the
//! generic [`Node`]/[`Edge`] model consumed by the simulation and renderer.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Solve counts for a single topic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TopicStats {
	/// Problems solved by the team in this topic.
	#[serde(default)]
	pub solved: u32,
	/// Problems catalogued under this topic.
	#[serde(default)]
	pub total: u32,
}

impl TopicStats {
	/// Solved fraction in `0.0..=1.0`. Zero when the topic has no problems.
	pub fn fraction(&self) -> f64 {
		if self.total == 0 {
			return 0.0;
		}
		(self.solved as f64 / self.total as f64).min(1.0)
	}

	/// Whole-number percentage, as shown in the tooltip.
	pub fn percent(&self) -> u32 {
		(self.fraction() * 100.0).round() as u32
	}
}

/// A topic in the skill tree.
#[derive(Clone, Debug, Deserialize)]
pub struct Topic {
	/// Display name.
	pub name: String,
	/// Short icon string (usually an emoji).
	#[serde(default)]
	pub icon: String,
	/// Topic ids that must be learned first.
	#[serde(default)]
	pub prereqs: Vec<String>,
	/// Difficulty tier, 0 being the entry level.
	#[serde(default)]
	pub tier: u32,
}

/// The topic map together with per-tier labels and colors.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TopicsResponse {
	/// Topics keyed by id.
	pub topics: BTreeMap<String, Topic>,
	/// Human readable label per tier index.
	#[serde(default)]
	pub tier_labels: Vec<String>,
	/// CSS hex color per tier index.
	#[serde(default)]
	pub tier_colors: Vec<String>,
}

impl TopicsResponse {
	/// Color for `tier`, if the payload defines one.
	pub fn tier_color(&self, tier: u32) -> Option<&str> {
		self.tier_colors.get(tier as usize).map(String::as_str)
	}

	/// Label for `tier`, if the payload defines one.
	pub fn tier_label(&self, tier: u32) -> Option<&str> {
		self.tier_labels.get(tier as usize).map(String::as_str)
	}
}

/// A problem in the curated similarity subgraph.
#[derive(Clone, Debug, Deserialize)]
pub struct SubgraphNode {
	/// Problem id, e.g. `1520F`.
	pub id: String,
	/// Problem title.
	pub name: String,
	/// Difficulty rating.
	#[serde(default)]
	pub rating: u32,
	/// Topic id the problem is filed under.
	#[serde(default)]
	pub topic: String,
}

/// A similarity link between two problems.
#[derive(Clone, Debug, Deserialize)]
pub struct SubgraphEdge {
	/// Source problem id.
	pub source: String,
	/// Target problem id.
	pub target: String,
	/// Similarity score, typically in `0.0..=1.0`.
	#[serde(default)]
	pub score: f64,
}

/// Curated problem subgraph as returned by the API.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CuratedSubgraph {
	/// Problems.
	#[serde(default)]
	pub nodes: Vec<SubgraphNode>,
	/// Similarity edges. May reference problems outside `nodes`.
	#[serde(default)]
	pub edges: Vec<SubgraphEdge>,
}

/// Tooltip payload attached to a node.
///
/// The two galaxy views attach different details; the tooltip branches on the
/// variant instead of probing fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NodeDetail {
	/// A topic in the skill tree.
	Skill {
		/// Solve counts for the topic.
		stats: TopicStats,
		/// Label of the topic's tier.
		tier_label: Option<String>,
		/// Prerequisite topic ids.
		prereqs: Vec<String>,
	},
	/// A problem in the similarity graph.
	Problem {
		/// Difficulty rating.
		rating: u32,
		/// Topic id.
		topic: String,
		/// Whether the team has solved it.
		solved: bool,
	},
	/// No tooltip details.
	#[default]
	Plain,
}

/// A node of the galaxy graph in world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Unique identifier within a graph snapshot.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Icon shown next to the label in the tooltip.
	pub icon: String,
	/// World x position.
	pub x: f64,
	/// World y position.
	pub y: f64,
	/// Core radius in world units. Always positive.
	pub radius: f64,
	/// Core fill color (CSS hex).
	pub color: String,
	/// Glow color (CSS hex).
	pub glow_color: String,
	/// Glow strength in `0.0..=1.0`.
	pub glow_intensity: f64,
	/// Overall opacity in `0.0..=1.0`.
	pub opacity: f64,
	/// Ordinal grouping used for coloring and the vertical tier bias.
	pub tier: u32,
	/// Tooltip details.
	pub metadata: NodeDetail,
}

impl Node {
	/// A plain node at the origin with a radius of 5.
	pub fn new(id: impl Into<String>) -> Self {
		let id = id.into();
		Self {
			label: id.clone(),
			id,
			icon: String::new(),
			x: 0.0,
			y: 0.0,
			radius: 5.0,
			color: "#7b8794".to_string(),
			glow_color: "#7b8794".to_string(),
			glow_intensity: 0.3,
			opacity: 1.0,
			tier: 0,
			metadata: NodeDetail::Plain,
		}
	}

	/// Place the node at a world position.
	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.x = x;
		self.y = y;
		self
	}

	/// Set the core radius.
	pub fn with_radius(mut self, radius: f64) -> Self {
		self.radius = radius;
		self
	}

	/// Set the tier.
	pub fn with_tier(mut self, tier: u32) -> Self {
		self.tier = tier;
		self
	}

	/// Whether the node carries a position. Nodes at the exact origin are treated
	/// as unplaced and get seeded by the simulation.
	pub fn is_placed(&self) -> bool {
		self.x != 0.0 || self.y != 0.0
	}
}

/// A weighted edge between two nodes, referenced by id.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Non-negative weight. Drives line alpha and spring strength.
	pub weight: f64,
	/// Line color (CSS hex).
	pub color: String,
}

impl Edge {
	/// A white edge of the given weight.
	pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			weight,
			color: "#ffffff".to_string(),
		}
	}
}

/// A complete graph snapshot: nodes and edges.
///
/// Edges may reference ids that are not in `nodes`; consumers drop them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// Nodes in draw order.
	pub nodes: Vec<Node>,
	/// Edges, possibly dangling.
	pub edges: Vec<Edge>,
}

impl GraphData {
	/// Whether the snapshot has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Carry positions over from a previous snapshot, matched by node id.
	pub fn seed_from(&mut self, previous: &[Node]) {
		let positions: HashMap<&str, (f64, f64)> = previous
			.iter()
			.map(|n| (n.id.as_str(), (n.x, n.y)))
			.collect();
		for node in &mut self.nodes {
			if let Some(&(x, y)) = positions.get(node.id.as_str()) {
				node.x = x;
				node.y = y;
			}
		}
	}
}

/// A hovered node and the pointer position that hovered it.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverInfo {
	/// Snapshot of the hovered node.
	pub node: Node,
	/// Pointer x in canvas pixels.
	pub screen_x: f64,
	/// Pointer y in canvas pixels.
	pub screen_y: f64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stats_fraction_handles_empty_topics() {
		assert_eq!(TopicStats::default().fraction(), 0.0);
		let stats = TopicStats { solved: 3, total: 4 };
		assert_eq!(stats.fraction(), 0.75);
		assert_eq!(stats.percent(), 75);
		let over = TopicStats { solved: 5, total: 4 };
		assert_eq!(over.fraction(), 1.0);
	}

	#[test]
	fn seed_from_copies_positions_by_id() {
		let mut data = GraphData {
			nodes: vec![Node::new("a"), Node::new("b")],
			edges: Vec::new(),
		};
		data.seed_from(&[Node::new("b").at(12.0, -4.0), Node::new("z").at(1.0, 1.0)]);
		assert!(!data.nodes[0].is_placed());
		assert_eq!((data.nodes[1].x, data.nodes[1].y), (12.0, -4.0));
	}

	#[test]
	fn topics_payload_deserializes_with_defaults() {
		let json = r##"{
			"topics": {
				"dp": { "name": "Dynamic Programming", "prereqs": ["greedy"], "tier": 2 },
				"greedy": { "name": "Greedy", "icon": "G" }
			},
			"tier_labels": ["Bronze", "Silver", "Gold"],
			"tier_colors": ["#cd7f32", "#c0c0c0", "#ffd700"]
		}"##;
		let topics: TopicsResponse = serde_json::from_str(json).unwrap();
		assert_eq!(topics.topics.len(), 2);
		assert_eq!(topics.topics["greedy"].tier, 0);
		assert_eq!(topics.tier_color(2), Some("#ffd700"));
		assert_eq!(topics.tier_label(7), None);
	}
}
